//! HTTP middleware for axum.
//!
//! - `export_key` - shared-secret gate for exports, stats, and maintenance

pub mod export_key;

pub use export_key::{require_export_key, ExportKeyState};
