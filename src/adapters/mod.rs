//! Adapters - Implementations of port interfaces and outer surfaces.
//!
//! - `storage` - Event log backends (JSONL files, in-memory)
//! - `export` - CSV rendering for researcher downloads
//! - `http` - axum routers

pub mod export;
pub mod http;
pub mod storage;

pub use storage::{InMemoryEventLog, JsonlEventLog};
