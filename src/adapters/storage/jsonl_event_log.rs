//! JSONL Event Log Adapter
//!
//! Stores each category as `<category>.jsonl` under a base directory, one
//! JSON object per line. Lines are only ever appended; the administrative
//! rewrites go through a temp file and an atomic rename.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

use crate::domain::foundation::Timestamp;
use crate::domain::session::{fields, EventCategory};
use crate::ports::{EventLog, EventLogError, RecordFilter};

/// File-backed event log.
///
/// Appends take the maintenance lock shared and serialise on `append_lock`
/// so concurrent writers never interleave partial lines. Administrative
/// operations take the maintenance lock exclusively.
#[derive(Debug)]
pub struct JsonlEventLog {
    base_path: PathBuf,
    maintenance: RwLock<()>,
    append_lock: Mutex<()>,
}

impl JsonlEventLog {
    /// Create a log rooted at `base_path`. The directory is created lazily.
    ///
    /// # Example
    /// ```ignore
    /// let log = JsonlEventLog::new("./data");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            maintenance: RwLock::new(()),
            append_lock: Mutex::new(()),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn category_path(&self, category: EventCategory) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", category.as_str()))
    }

    fn temp_path(&self, category: EventCategory) -> PathBuf {
        self.base_path.join(format!("{}.jsonl.tmp", category.as_str()))
    }

    async fn ensure_dir(&self) -> Result<(), EventLogError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| EventLogError::io(self.base_path.display(), e))
    }

    fn serialize_line(
        category: EventCategory,
        record: &Map<String, Value>,
    ) -> Result<String, EventLogError> {
        let mut line = serde_json::to_string(record)
            .map_err(|source| EventLogError::Serialization { category, source })?;
        line.push('\n');
        Ok(line)
    }

    /// Reads a category without taking the maintenance lock.
    async fn read_unlocked(
        &self,
        category: EventCategory,
    ) -> Result<Vec<Map<String, Value>>, EventLogError> {
        let path = self.category_path(category);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(EventLogError::io(path.display(), e)),
        };

        let (records, skipped) = parse_lines(&content);
        if skipped > 0 {
            tracing::warn!(category = %category, skipped, "Skipped unparseable log lines");
        }
        Ok(records)
    }

    async fn remove_file(&self, category: EventCategory) -> Result<(), EventLogError> {
        let path = self.category_path(category);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EventLogError::io(path.display(), e)),
        }
    }

    async fn rewrite(
        &self,
        category: EventCategory,
        records: &[Map<String, Value>],
    ) -> Result<(), EventLogError> {
        let mut content = String::new();
        for record in records {
            content.push_str(&Self::serialize_line(category, record)?);
        }

        let temp_path = self.temp_path(category);
        let final_path = self.category_path(category);

        fs::write(&temp_path, content)
            .await
            .map_err(|e| EventLogError::io(temp_path.display(), e))?;
        fs::rename(&temp_path, &final_path)
            .await
            .map_err(|e| EventLogError::io(final_path.display(), e))
    }
}

/// Parses JSONL bytes, returning the objects and the count of skipped lines.
///
/// Lines are split on raw bytes so one line with invalid UTF-8 is skipped
/// like any other unparseable line.
fn parse_lines(content: &[u8]) -> (Vec<Map<String, Value>>, usize) {
    let mut records = Vec::new();
    let mut skipped = 0;
    for line in content.split(|b| *b == b'\n') {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<Value>(line) {
            Ok(Value::Object(record)) => records.push(record),
            _ => skipped += 1,
        }
    }
    (records, skipped)
}

#[async_trait]
impl EventLog for JsonlEventLog {
    async fn append(
        &self,
        category: EventCategory,
        mut record: Map<String, Value>,
    ) -> Result<Map<String, Value>, EventLogError> {
        record.insert(
            fields::WRITTEN_AT.to_string(),
            Value::String(Timestamp::now().to_rfc3339()),
        );
        let line = Self::serialize_line(category, &record)?;

        let _shared = self.maintenance.read().await;
        let _writer = self.append_lock.lock().await;

        self.ensure_dir().await?;
        let path = self.category_path(category);
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| EventLogError::io(path.display(), e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| EventLogError::io(path.display(), e))?;
        file.flush()
            .await
            .map_err(|e| EventLogError::io(path.display(), e))?;

        Ok(record)
    }

    async fn read_all(
        &self,
        category: EventCategory,
    ) -> Result<Vec<Map<String, Value>>, EventLogError> {
        let _shared = self.maintenance.read().await;
        self.read_unlocked(category).await
    }

    async fn retain_all(
        &self,
        keep: &RecordFilter<'_>,
    ) -> Result<BTreeMap<EventCategory, usize>, EventLogError> {
        let _exclusive = self.maintenance.write().await;
        let mut removed = BTreeMap::new();

        for category in EventCategory::ALL {
            let records = self.read_unlocked(category).await?;
            let before = records.len();
            let kept: Vec<_> = records
                .into_iter()
                .filter(|record| keep(category, record))
                .collect();
            if kept.len() == before {
                continue;
            }
            self.rewrite(category, &kept).await?;
            removed.insert(category, before - kept.len());
        }

        Ok(removed)
    }

    async fn delete_category(&self, category: EventCategory) -> Result<(), EventLogError> {
        let _exclusive = self.maintenance.write().await;
        self.remove_file(category).await
    }

    async fn delete_all(&self) -> Result<(), EventLogError> {
        let _exclusive = self.maintenance.write().await;
        for category in EventCategory::ALL {
            self.remove_file(category).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn appends_are_stamped_and_read_back_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let log = JsonlEventLog::new(temp_dir.path());

        let stored = log
            .append(EventCategory::Sessions, map(json!({"session_id": "a"})))
            .await
            .unwrap();
        log.append(EventCategory::Sessions, map(json!({"session_id": "b"})))
            .await
            .unwrap();

        assert!(stored.contains_key("_written_at"));
        let records = log.read_all(EventCategory::Sessions).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["session_id"], "a");
        assert_eq!(records[1]["session_id"], "b");
        assert!(temp_dir.path().join("sessions.jsonl").exists());
    }

    #[tokio::test]
    async fn missing_category_reads_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let log = JsonlEventLog::new(temp_dir.path().join("not-yet-created"));

        let records = log.read_all(EventCategory::Clicks).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn corrupt_lines_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("page_events.jsonl"),
            "{\"n\":1}\n{broken\n\n[1,2]\n{\"n\":2}\n",
        )
        .unwrap();
        let log = JsonlEventLog::new(temp_dir.path());

        let records = log.read_all(EventCategory::PageEvents).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["n"], 2);
    }

    #[tokio::test]
    async fn invalid_utf8_line_does_not_hide_the_rest() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("sessions.jsonl"),
            b"{\"session_id\":\"a\"}\n\xff\xfe\n{\"session_id\":\"b\"}\n",
        )
        .unwrap();
        let log = JsonlEventLog::new(temp_dir.path());

        let records = log.read_all(EventCategory::Sessions).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["session_id"], "a");
        assert_eq!(records[1]["session_id"], "b");
    }

    #[tokio::test]
    async fn retain_all_accepts_a_borrowing_filter() {
        let temp_dir = TempDir::new().unwrap();
        let log = JsonlEventLog::new(temp_dir.path());
        for id in ["a", "b", "c"] {
            log.append(EventCategory::Sessions, map(json!({"session_id": id})))
                .await
                .unwrap();
        }

        let doomed: Vec<String> = vec!["a".to_string(), "c".to_string()];
        let keep = |_: EventCategory, record: &Map<String, Value>| {
            !doomed.iter().any(|id| record["session_id"] == id.as_str())
        };
        let removed = log.retain_all(&keep).await.unwrap();

        assert_eq!(removed.get(&EventCategory::Sessions), Some(&2));
        assert_eq!(doomed.len(), 2);
        let records = log.read_all(EventCategory::Sessions).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["session_id"], "b");
    }

    #[tokio::test]
    async fn retain_all_rewrites_only_affected_categories() {
        let temp_dir = TempDir::new().unwrap();
        let log = JsonlEventLog::new(temp_dir.path());
        for id in ["keep", "drop", "keep"] {
            log.append(EventCategory::Clicks, map(json!({"session_id": id})))
                .await
                .unwrap();
        }
        log.append(EventCategory::Scrolls, map(json!({"session_id": "keep"})))
            .await
            .unwrap();

        let removed = log
            .retain_all(&|_, record: &Map<String, Value>| record["session_id"] != "drop")
            .await
            .unwrap();

        assert_eq!(removed.get(&EventCategory::Clicks), Some(&1));
        assert!(!removed.contains_key(&EventCategory::Scrolls));
        assert_eq!(log.read_all(EventCategory::Clicks).await.unwrap().len(), 2);
        assert!(!temp_dir.path().join("clicks.jsonl.tmp").exists());
    }

    #[tokio::test]
    async fn delete_all_removes_every_file() {
        let temp_dir = TempDir::new().unwrap();
        let log = JsonlEventLog::new(temp_dir.path());
        log.append(EventCategory::Sessions, map(json!({"session_id": "a"})))
            .await
            .unwrap();
        log.append(EventCategory::OtherEvents, map(json!({"type": "hover"})))
            .await
            .unwrap();

        log.delete_all().await.unwrap();

        assert!(log.read_all(EventCategory::Sessions).await.unwrap().is_empty());
        assert!(!temp_dir.path().join("other_events.jsonl").exists());
    }

    #[tokio::test]
    async fn concurrent_appends_never_interleave_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log = Arc::new(JsonlEventLog::new(temp_dir.path()));

        let mut handles = Vec::new();
        for i in 0..32 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                log.append(
                    EventCategory::Navigation,
                    map(json!({"session_id": format!("s{}", i), "payload": "x".repeat(512)})),
                )
                .await
                .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let records = log.read_all(EventCategory::Navigation).await.unwrap();
        assert_eq!(records.len(), 32);
    }

    #[test]
    fn parse_lines_counts_skipped() {
        let (records, skipped) = parse_lines(b"{\"a\":1}\r\nnope\n\"str\"\n\xff\xfe\n");
        assert_eq!(records.len(), 1);
        assert_eq!(skipped, 3);
    }
}
