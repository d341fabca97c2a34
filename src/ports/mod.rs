//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `EventLog` - Append-only per-category record store

mod event_log;

pub use event_log::{EventLog, EventLogError, RecordFilter};
