//! GetDashboardHandler - stats plus the per-session roster.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::analytics::{roster, AnalysisSettings, RosterEntry, StudyStats};

use super::{AnalyticsError, MergedSessionsReader};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub stats: StudyStats,
    pub roster: Vec<RosterEntry>,
}

pub struct GetDashboardHandler {
    reader: MergedSessionsReader,
    settings: Arc<AnalysisSettings>,
}

impl GetDashboardHandler {
    pub fn new(reader: MergedSessionsReader, settings: Arc<AnalysisSettings>) -> Self {
        Self { reader, settings }
    }

    pub async fn handle(&self) -> Result<DashboardView, AnalyticsError> {
        let sessions = self.reader.analyzed(&self.settings).await?;
        Ok(DashboardView {
            stats: StudyStats::compute(&sessions, &self.settings),
            roster: roster(&sessions, &self.settings),
        })
    }
}
