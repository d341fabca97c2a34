//! Analytics - pure, read-only aggregation of merged sessions.
//!
//! Nothing here performs I/O or fails on partial data: missing fields read
//! as zero or empty and unvisited pages are left out of denominators.

mod documents;
mod drop_off;
mod pages;
mod quality;
mod session_analysis;
mod statistics;
mod study_stats;
mod time_estimation;

pub use documents::{document_stats, DocumentStats};
pub use drop_off::{drop_off, DropOff, DropOffPoint};
pub use pages::{page_stats, PageStats};
pub use quality::{quality_summary, FieldErrorRate, OverDocumentationSummary, QualitySummary};
pub use session_analysis::{AnalysisSettings, AnalyzedSession};
pub use statistics::{histogram, mean, median, rate, HistogramBin, Summary};
pub use study_stats::{roster, ConditionSummary, RosterEntry, StatusCounts, StudyStats};
pub use time_estimation::{
    time_estimation, ConditionEstimate, TimeEstimation, WithinSubjectAccuracy,
};
