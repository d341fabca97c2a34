//! Authoritative session view: creation record + every update, in log order.
//!
//! Each update is applied as a shallow patch: a key present in the update
//! replaces the whole value under that key, keys absent from the update are
//! left untouched. This is per-field last-write-wins, not per-record.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::domain::foundation::lenient;

use super::record::fields;

/// Applies one patch to a merged record. The id and the update-kind tag are
/// never copied across.
pub fn apply_patch(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        if key == fields::SESSION_ID || key == fields::UPDATE_KIND {
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

/// Folds creation and update records into one merged record per session.
///
/// - Output order is creation order.
/// - A repeated creation record for a known id is applied as a patch.
/// - Updates for an id without a creation record are dropped.
pub fn merge_sessions<C, U>(creations: C, updates: U) -> Vec<Map<String, Value>>
where
    C: IntoIterator<Item = Map<String, Value>>,
    U: IntoIterator<Item = Map<String, Value>>,
{
    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, Map<String, Value>> = HashMap::new();

    for creation in creations {
        let Some(id) = record_id(&creation) else {
            continue;
        };
        match merged.get_mut(&id) {
            Some(existing) => apply_patch(existing, &creation),
            None => {
                let mut record = creation;
                record.insert(fields::SESSION_ID.to_string(), Value::String(id.clone()));
                order.push(id.clone());
                merged.insert(id, record);
            }
        }
    }

    for update in updates {
        let Some(id) = record_id(&update) else {
            continue;
        };
        if let Some(existing) = merged.get_mut(&id) {
            apply_patch(existing, &update);
        }
    }

    order
        .into_iter()
        .filter_map(|id| merged.remove(&id))
        .collect()
}

fn record_id(record: &Map<String, Value>) -> Option<String> {
    record
        .get(fields::SESSION_ID)
        .and_then(lenient::as_string)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}
