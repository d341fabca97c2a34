//! Record upcaster infrastructure for schema evolution.
//!
//! Session records written by earlier deployments use a different shape:
//! renamed keys and a stored three-state completion label. Upcasters bring
//! every record to the current shape on read so the merge and analytics code
//! only ever see one schema. Stored lines are never rewritten.
//!
//! # Architecture
//!
//! - `RecordUpcaster` trait - Transforms a single version step (v1 → v2)
//! - `UpcasterRegistry` - Chains upcasters until the current version is reached
//! - `UpcastError` - Error types for failed transformations

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::record::fields;

/// Schema version stamped on records written by this service.
pub const CURRENT_SCHEMA_VERSION: u64 = 2;

/// Errors that can occur during record upcasting.
#[derive(Debug, Error)]
pub enum UpcastError {
    /// No upcaster is registered for an intermediate version.
    #[error("no upcaster from schema v{from} toward v{to}")]
    MissingStep { from: u64, to: u64 },
}

/// Transforms a record from one schema version to the next.
///
/// Implementations must be deterministic and must not fail on records that
/// are already partly in the target shape: mixed records exist in the wild.
pub trait RecordUpcaster: Send + Sync {
    /// Version this upcaster reads.
    fn source_version(&self) -> u64;

    /// Transform the record to `source_version() + 1`.
    fn upcast(&self, record: Map<String, Value>) -> Result<Map<String, Value>, UpcastError>;
}

/// Generation 1 → 2.
///
/// - `condition` → `condition_code`
/// - `consent` → `consent_given`
/// - `completed` → `is_complete`
/// - `pid` / `PROLIFIC_PID` → `prolific_pid`
/// - stored `status` / `completion_status` labels are dropped; status is derived.
pub struct LegacyRecordV1ToV2;

impl LegacyRecordV1ToV2 {
    const RENAMES: [(&'static str, &'static str); 5] = [
        ("condition", fields::CONDITION_CODE),
        ("consent", fields::CONSENT_GIVEN),
        ("completed", fields::IS_COMPLETE),
        ("pid", fields::PROLIFIC_PID),
        ("PROLIFIC_PID", fields::PROLIFIC_PID),
    ];

    const LEGACY_STATUS_LABELS: [&'static str; 3] = ["complete", "partial", "incomplete"];
}

impl RecordUpcaster for LegacyRecordV1ToV2 {
    fn source_version(&self) -> u64 {
        1
    }

    fn upcast(&self, mut record: Map<String, Value>) -> Result<Map<String, Value>, UpcastError> {
        for (old, new) in Self::RENAMES {
            if let Some(value) = record.remove(old) {
                // A record carrying both spellings keeps the current one.
                record.entry(new.to_string()).or_insert(value);
            }
        }

        for key in ["status", "completion_status"] {
            let is_legacy_label = record
                .get(key)
                .and_then(Value::as_str)
                .map(|label| Self::LEGACY_STATUS_LABELS.contains(&label))
                .unwrap_or(false);
            if is_legacy_label {
                record.remove(key);
            }
        }

        Ok(record)
    }
}

/// Registry that chains record upcasters up to the current version.
pub struct UpcasterRegistry {
    upcasters: HashMap<u64, Arc<dyn RecordUpcaster>>,
    current_version: u64,
}

impl UpcasterRegistry {
    /// Creates an empty registry targeting `current_version`.
    pub fn new(current_version: u64) -> Self {
        Self {
            upcasters: HashMap::new(),
            current_version,
        }
    }

    /// Registry with every known upcaster, targeting [`CURRENT_SCHEMA_VERSION`].
    pub fn standard() -> Self {
        let mut registry = Self::new(CURRENT_SCHEMA_VERSION);
        registry.register(Arc::new(LegacyRecordV1ToV2));
        registry
    }

    pub fn register(&mut self, upcaster: Arc<dyn RecordUpcaster>) {
        self.upcasters.insert(upcaster.source_version(), upcaster);
    }

    /// Version of a record; records without a `_schema` stamp are generation 1.
    pub fn version_of(record: &Map<String, Value>) -> u64 {
        record
            .get(fields::SCHEMA)
            .and_then(Value::as_u64)
            .unwrap_or(1)
    }

    /// Upcasts a record to the current version, stamping the result.
    pub fn upcast_to_current(
        &self,
        record: Map<String, Value>,
    ) -> Result<Map<String, Value>, UpcastError> {
        let mut version = Self::version_of(&record);
        if version >= self.current_version {
            return Ok(record);
        }

        let mut current = record;
        while version < self.current_version {
            let upcaster = self
                .upcasters
                .get(&version)
                .ok_or(UpcastError::MissingStep {
                    from: version,
                    to: self.current_version,
                })?;
            current = upcaster.upcast(current)?;
            version += 1;
        }

        current.insert(fields::SCHEMA.to_string(), Value::from(version));
        Ok(current)
    }
}

impl Default for UpcasterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
