//! Tracked-event ingestion.

mod record_event_batch;

pub use record_event_batch::{RecordEventBatchCommand, RecordEventBatchHandler, RecordEventBatchResult};
