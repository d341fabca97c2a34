//! Storage Adapters
//!
//! Implementations of the EventLog port.
//!
//! ## Available Adapters
//!
//! - **JsonlEventLog** - One `<category>.jsonl` file per category on disk
//! - **InMemoryEventLog** - Keeps records in memory (testing)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryEventLog, JsonlEventLog};
//!
//! // Production: file-based log
//! let log = JsonlEventLog::new("./data");
//!
//! // Testing: in-memory log
//! let log = InMemoryEventLog::new();
//! ```

mod in_memory_event_log;
mod jsonl_event_log;

pub use in_memory_event_log::InMemoryEventLog;
pub use jsonl_event_log::JsonlEventLog;
