use serde::{Deserialize, Serialize};

use super::Position;

/// A field placed on a page, as consumed by the field renderer.
///
/// `data` is empty in a materialized schemas list; the resolver injects the
/// active unit's value before the descriptor reaches a renderer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Position,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub data: String,
    /// Style attributes carried through untouched (font size, alignment, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// One descriptor list per page.
pub type SchemasList = Vec<Vec<FieldDescriptor>>;

/// The list shown before the first materialization resolves: one empty page.
#[must_use]
pub fn placeholder_schemas() -> SchemasList {
    vec![Vec::new()]
}
