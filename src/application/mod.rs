//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Session commands write to the event log and keep the [`SessionIndex`]
//! current; queries recompute their view from the log.

pub mod handlers;
mod session_index;

pub use handlers::*;
pub use session_index::{IndexedSession, SessionIndex};
pub(crate) use session_index::upcast_records;
