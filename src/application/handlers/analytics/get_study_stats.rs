//! GetStudyStatsHandler - Query handler for the study aggregate.

use std::sync::Arc;

use crate::domain::analytics::{AnalysisSettings, StudyStats};

use super::{AnalyticsError, MergedSessionsReader};

pub struct GetStudyStatsHandler {
    reader: MergedSessionsReader,
    settings: Arc<AnalysisSettings>,
}

impl GetStudyStatsHandler {
    pub fn new(reader: MergedSessionsReader, settings: Arc<AnalysisSettings>) -> Self {
        Self { reader, settings }
    }

    pub async fn handle(&self) -> Result<StudyStats, AnalyticsError> {
        let sessions = self.reader.analyzed(&self.settings).await?;
        Ok(StudyStats::compute(&sessions, &self.settings))
    }
}
