//! ExportDataHandler - raw and derived exports.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::domain::analytics::{AnalysisSettings, AnalyzedSession};
use crate::domain::session::{EventCategory, SessionRecord};

use super::{AnalyticsError, MergedSessionsReader};

/// Derived keys added to every exported session.
pub mod derived {
    pub const COMPLETION_STATUS: &str = "completion_status";
    pub const LEGACY_STATUS: &str = "legacy_status";
    pub const LAST_PAGE: &str = "last_page";
    pub const QUALITY: &str = "quality";
}

pub struct ExportDataHandler {
    reader: MergedSessionsReader,
    settings: Arc<AnalysisSettings>,
}

impl ExportDataHandler {
    pub fn new(reader: MergedSessionsReader, settings: Arc<AnalysisSettings>) -> Self {
        Self { reader, settings }
    }

    /// Merged sessions with status, last page, and quality score attached.
    pub async fn sessions(&self) -> Result<Vec<Map<String, Value>>, AnalyticsError> {
        let merged = self.reader.merged().await?;
        Ok(merged
            .into_iter()
            .map(|mut values| {
                let analyzed =
                    AnalyzedSession::analyze(SessionRecord::from_fields(values.clone()), &self.settings);
                values.insert(
                    derived::COMPLETION_STATUS.to_string(),
                    Value::String(analyzed.status.as_str().to_string()),
                );
                values.insert(
                    derived::LEGACY_STATUS.to_string(),
                    Value::String(analyzed.status.legacy_label().to_string()),
                );
                values.insert(derived::LAST_PAGE.to_string(), Value::String(analyzed.last_page));
                values.insert(
                    derived::QUALITY.to_string(),
                    serde_json::to_value(&analyzed.quality).unwrap_or(Value::Null),
                );
                values
            })
            .collect())
    }

    /// Exported sessions plus every raw category, keyed by table name.
    pub async fn all_json(&self) -> Result<Map<String, Value>, AnalyticsError> {
        let mut all = Map::new();
        all.insert(
            "sessions".to_string(),
            Value::Array(self.sessions().await?.into_iter().map(Value::Object).collect()),
        );
        for category in EventCategory::ALL {
            if category == EventCategory::Sessions {
                continue;
            }
            let records = self.reader.log().read_all(category).await?;
            all.insert(
                category.as_str().to_string(),
                Value::Array(records.into_iter().map(Value::Object).collect()),
            );
        }
        Ok(all)
    }

    /// Raw records of one category.
    pub async fn table(&self, name: &str) -> Result<Vec<Map<String, Value>>, AnalyticsError> {
        let category: EventCategory = name
            .parse()
            .map_err(|_| AnalyticsError::UnknownTable(name.to_string()))?;
        Ok(self.reader.log().read_all(category).await?)
    }

    /// Analyzed sessions, for the CSV renderer.
    pub async fn analyzed(&self) -> Result<Vec<AnalyzedSession>, AnalyticsError> {
        Ok(self.reader.analyzed(&self.settings).await?)
    }
}
