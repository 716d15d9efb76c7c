use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::InputRecord;

/// Document template: base paper, per-page field declarations and optional
/// sample data used for placeholders.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub base_pdf: BasePdf,
    #[serde(default)]
    pub schemas: Vec<SchemaPage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampledata: Option<Vec<InputRecord>>,
}

impl Template {
    /// Decode a template from its JSON form.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or does not describe a template.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The record placeholders are drawn from (the first sample-data entry).
    #[must_use]
    pub fn sample_record(&self) -> Option<&InputRecord> {
        self.sampledata.as_ref().and_then(|records| records.first())
    }
}

/// The paper fields are laid out on.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum BasePdf {
    /// Blank paper of one size, repeated once per schema page.
    Blank(BlankPaper),
    /// Explicit pages, each with its own size and optional background.
    Pages(Vec<PageSpec>),
    /// An encoded PDF document; sizing it needs an external layout provider.
    Document(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct BlankPaper {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PageSpec {
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Declaration of one field inside a template page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SchemaSpec {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

fn default_kind() -> String {
    "text".to_string()
}

/// Fields of one page keyed by field key, in declaration order.
///
/// Serialized as a JSON object. Order matters (it drives tab order), so the
/// entries are kept in a `Vec` rather than a sorted map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaPage {
    entries: Vec<(String, SchemaSpec)>,
}

impl SchemaPage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field. A key that is already present is replaced in place.
    pub fn insert(&mut self, key: impl Into<String>, spec: SchemaSpec) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = spec;
        } else {
            self.entries.push((key, spec));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SchemaSpec> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, spec)| spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaSpec)> {
        self.entries.iter().map(|(k, spec)| (k.as_str(), spec))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SchemaPage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, spec) in &self.entries {
            map.serialize_entry(key, spec)?;
        }
        map.end()
    }
}

struct SchemaPageVisitor;

impl<'de> Visitor<'de> for SchemaPageVisitor {
    type Value = SchemaPage;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field keys to schema declarations")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut page = SchemaPage::new();
        while let Some((key, spec)) = access.next_entry::<String, SchemaSpec>()? {
            page.insert(key, spec);
        }
        Ok(page)
    }
}

impl<'de> Deserialize<'de> for SchemaPage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SchemaPageVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_page_keeps_declaration_order() {
        let json = r#"{
            "zeta": { "type": "text", "position": { "x": 1, "y": 2 }, "width": 10, "height": 5 },
            "alpha": { "type": "qrcode", "position": { "x": 3, "y": 4 }, "width": 20, "height": 20 },
            "mid": { "position": { "x": 0, "y": 0 }, "width": 1, "height": 1, "fontSize": 12 }
        }"#;
        let page: SchemaPage = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = page.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);

        let mid = page.get("mid").unwrap();
        assert_eq!(mid.kind, "text", "missing type defaults to text");
        assert_eq!(mid.attributes.get("fontSize"), Some(&serde_json::json!(12)));
    }

    #[test]
    fn test_base_pdf_variants() {
        let blank: BasePdf = serde_json::from_str(r#"{ "width": 210, "height": 297 }"#).unwrap();
        assert!(matches!(blank, BasePdf::Blank(p) if p.width == 210.0 && p.height == 297.0));

        let pages: BasePdf =
            serde_json::from_str(r#"[{ "width": 100, "height": 50, "background": "bg0" }]"#)
                .unwrap();
        match pages {
            BasePdf::Pages(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].background.as_deref(), Some("bg0"));
            }
            other => panic!("expected explicit pages, got {other:?}"),
        }

        let doc: BasePdf = serde_json::from_str(r#""data:application/pdf;base64,AAAA""#).unwrap();
        assert!(matches!(doc, BasePdf::Document(_)));
    }

    #[test]
    fn test_template_sample_record() {
        let template = Template::from_json(
            r#"{
                "basePdf": { "width": 210, "height": 297 },
                "schemas": [{ "name": { "position": { "x": 0, "y": 0 }, "width": 10, "height": 10 } }],
                "sampledata": [{ "name": "Jane" }, { "name": "John" }]
            }"#,
        )
        .unwrap();
        assert_eq!(
            template.sample_record().and_then(|r| r.get("name")).map(String::as_str),
            Some("Jane")
        );
        assert_eq!(template.schemas.len(), 1);
    }

    #[test]
    fn test_duplicate_key_replaces_in_place() {
        let mut page = SchemaPage::new();
        let spec = |w: f64| SchemaSpec {
            kind: "text".into(),
            position: Position::default(),
            width: w,
            height: 1.0,
            attributes: serde_json::Map::new(),
        };
        page.insert("a", spec(1.0));
        page.insert("b", spec(2.0));
        page.insert("a", spec(3.0));
        assert_eq!(page.len(), 2);
        assert_eq!(page.iter().next().map(|(k, s)| (k, s.width)), Some(("a", 3.0)));
    }
}
