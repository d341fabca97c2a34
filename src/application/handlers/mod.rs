//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod admin;
pub mod analytics;
pub mod events;
pub mod session;

pub use admin::{
    AdminError, DeleteAllDataCommand, DeleteAllDataHandler, RemoveParticipantCommand,
    RemoveParticipantHandler, RemoveParticipantResult,
};
pub use analytics::{
    AnalyticsError, DashboardView, ExportDataHandler, GetDashboardHandler, GetStudyStatsHandler,
    MergedSessionsReader,
};
pub use events::{RecordEventBatchCommand, RecordEventBatchHandler, RecordEventBatchResult};
pub use session::{
    CompleteSessionCommand, CompleteSessionHandler, CompleteSessionResult, CreateSessionCommand,
    CreateSessionHandler, CreateSessionResult, GiveConsentCommand, GiveConsentHandler,
    ResumeOutcome, ResumeSessionHandler, ResumeSessionQuery, ResumeState, SaveProgressCommand,
    SaveProgressHandler, SaveSnapshotCommand, SaveSnapshotHandler, SaveSnapshotResult,
};
