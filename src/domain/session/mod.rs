//! Session domain.
//!
//! A session is a creation record plus an ordered series of partial updates.
//! This module holds the write-side shapes (creation, patches), the merge that
//! folds them into one record, the typed read view of that record, and the
//! derived completion status.

mod errors;
mod event_category;
mod merge;
mod patch;
mod record;
mod status;
mod upcaster;

pub use errors::SessionError;
pub use event_category::EventCategory;
pub use merge::{apply_patch, merge_sessions};
pub use patch::{SessionCreation, SessionPatch, UpdateKind};
pub use record::{fields, DocInteraction, DocTotals, PageTiming, SessionRecord};
pub use status::{
    CompletionRules, CompletionStatus, DEFAULT_PAGE_ORDER, DEFAULT_POST_SUBMISSION_PAGES,
};
pub use upcaster::{
    LegacyRecordV1ToV2, RecordUpcaster, UpcastError, UpcasterRegistry, CURRENT_SCHEMA_VERSION,
};
