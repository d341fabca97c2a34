//! In-Memory Event Log Adapter
//!
//! Keeps every category in memory. Useful for testing.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::domain::session::{fields, EventCategory};
use crate::ports::{EventLog, EventLogError, RecordFilter};

/// In-memory event log
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventLog {
    categories: Arc<RwLock<HashMap<EventCategory, Vec<Map<String, Value>>>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores records verbatim, without stamping. Lets tests plant records
    /// shaped like older client generations.
    pub async fn seed(&self, category: EventCategory, records: Vec<Map<String, Value>>) {
        self.categories
            .write()
            .await
            .entry(category)
            .or_default()
            .extend(records);
    }

    /// Number of records in a category
    pub async fn count(&self, category: EventCategory) -> usize {
        self.categories
            .read()
            .await
            .get(&category)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(
        &self,
        category: EventCategory,
        mut record: Map<String, Value>,
    ) -> Result<Map<String, Value>, EventLogError> {
        record.insert(
            fields::WRITTEN_AT.to_string(),
            Value::String(Timestamp::now().to_rfc3339()),
        );
        self.categories
            .write()
            .await
            .entry(category)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn read_all(
        &self,
        category: EventCategory,
    ) -> Result<Vec<Map<String, Value>>, EventLogError> {
        Ok(self
            .categories
            .read()
            .await
            .get(&category)
            .cloned()
            .unwrap_or_default())
    }

    async fn retain_all(
        &self,
        keep: &RecordFilter<'_>,
    ) -> Result<BTreeMap<EventCategory, usize>, EventLogError> {
        let mut categories = self.categories.write().await;
        let mut removed = BTreeMap::new();
        for (category, records) in categories.iter_mut() {
            let before = records.len();
            records.retain(|record| keep(*category, record));
            if records.len() != before {
                removed.insert(*category, before - records.len());
            }
        }
        Ok(removed)
    }

    async fn delete_category(&self, category: EventCategory) -> Result<(), EventLogError> {
        self.categories.write().await.remove(&category);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), EventLogError> {
        self.categories.write().await.clear();
        Ok(())
    }
}
