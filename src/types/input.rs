use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One unit's field values, keyed by field key.
pub type InputRecord = BTreeMap<String, String>;

/// Ordered candidate records; the preview shows one unit at a time.
pub type InputSet = Vec<InputRecord>;

/// A committed field edit, scoped to the unit that was active when it happened.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InputChange {
    pub unit_index: usize,
    pub key: String,
    pub value: String,
}
