//! Schema materialization.
//!
//! Turning a template into per-page field descriptors is asynchronous. Each
//! template change opens a new generation; a resolution is only applied if it
//! belongs to the latest generation, so a slow resolution for an old template
//! can never overwrite the list for a newer one.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, TplviewError};
use crate::types::{placeholder_schemas, BasePdf, FieldDescriptor, SchemasList, Template};

/// Produces the per-page descriptor lists for a template.
pub trait SchemaMaterializer {
    fn materialize(&self, template: &Template) -> impl Future<Output = Result<SchemasList>>;
}

/// Default materializer: reads the field declarations straight off the template.
///
/// Descriptor ids are `"{page}:{key}"`; declaration order is preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSchemas;

impl TemplateSchemas {
    /// Synchronous form of [`SchemaMaterializer::materialize`].
    ///
    /// # Errors
    /// Fails when the template declares fields on more pages than its base PDF has.
    pub fn materialize_now(template: &Template) -> Result<SchemasList> {
        let explicit_pages = match &template.base_pdf {
            BasePdf::Pages(pages) => Some(pages.len()),
            BasePdf::Blank(_) | BasePdf::Document(_) => None,
        };
        if let Some(pages) = explicit_pages {
            if template.schemas.len() > pages {
                return Err(TplviewError::Schema(format!(
                    "fields declared on {} pages but the base PDF has {pages}",
                    template.schemas.len()
                )));
            }
        }

        let mut list: SchemasList = template
            .schemas
            .iter()
            .enumerate()
            .map(|(page, fields)| {
                fields
                    .iter()
                    .map(|(key, spec)| FieldDescriptor {
                        id: format!("{page}:{key}"),
                        key: key.to_string(),
                        kind: spec.kind.clone(),
                        position: spec.position,
                        width: spec.width,
                        height: spec.height,
                        data: String::new(),
                        attributes: spec.attributes.clone(),
                    })
                    .collect()
            })
            .collect();

        // Pages without declarations still get an (empty) entry.
        let page_count = explicit_pages.unwrap_or(0).max(list.len()).max(1);
        list.resize_with(page_count, Vec::new);
        Ok(list)
    }
}

impl SchemaMaterializer for TemplateSchemas {
    async fn materialize(&self, template: &Template) -> Result<SchemasList> {
        Self::materialize_now(template)
    }
}

/// A pending materialization handed to the host.
#[derive(Debug, Clone)]
pub struct MaterializeRequest {
    pub generation: u64,
    pub template: Arc<Template>,
}

/// What happened to a resolution handed to [`SchemaSlot::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaResolution {
    /// The list was replaced.
    Applied,
    /// The materializer failed; the previous list is kept.
    Failed,
    /// A newer generation has been requested; the result was dropped.
    Stale,
}

impl SchemaResolution {
    /// Whether the preview changed (schemas list or schema error) and a host
    /// should render a new frame.
    #[must_use]
    pub fn changes_state(self) -> bool {
        !matches!(self, Self::Stale)
    }
}

/// Holds the current schemas list and the generation counter guarding it.
#[derive(Debug, Clone)]
pub struct SchemaSlot {
    list: SchemasList,
    latest: u64,
    error: Option<String>,
}

impl Default for SchemaSlot {
    fn default() -> Self {
        Self {
            list: placeholder_schemas(),
            latest: 0,
            error: None,
        }
    }
}

impl SchemaSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new generation. Results from older generations become stale.
    pub fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    #[must_use]
    pub fn latest_generation(&self) -> u64 {
        self.latest
    }

    #[must_use]
    pub fn list(&self) -> &SchemasList {
        &self.list
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.list.len()
    }

    /// Message of the last failed materialization, cleared by the next success.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn resolve(&mut self, generation: u64, result: Result<SchemasList>) -> SchemaResolution {
        if generation != self.latest {
            debug!(generation, latest = self.latest, "discarding stale schema resolution");
            return SchemaResolution::Stale;
        }
        match result {
            Ok(list) => {
                self.list = list;
                self.error = None;
                SchemaResolution::Applied
            }
            Err(e) => {
                self.error = Some(e.to_string());
                SchemaResolution::Failed
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn template(json: &str) -> Template {
        Template::from_json(json).unwrap()
    }

    #[test]
    fn test_materialize_assigns_ids_in_order() {
        let t = template(
            r#"{
                "basePdf": { "width": 210, "height": 297 },
                "schemas": [
                    { "name": { "position": { "x": 10, "y": 10 }, "width": 50, "height": 8 },
                      "age": { "position": { "x": 10, "y": 20 }, "width": 20, "height": 8 } },
                    { "sign": { "type": "image", "position": { "x": 0, "y": 0 }, "width": 40, "height": 20 } }
                ]
            }"#,
        );
        let list = pollster::block_on(TemplateSchemas.materialize(&t)).unwrap();
        assert_eq!(list.len(), 2);
        let ids: Vec<&str> = list[0].iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["0:name", "0:age"]);
        assert_eq!(list[1][0].kind, "image");
        assert!(list[1][0].data.is_empty());
    }

    #[test]
    fn test_materialize_pads_explicit_pages() {
        let t = template(
            r#"{
                "basePdf": [{ "width": 100, "height": 100 }, { "width": 100, "height": 100 }],
                "schemas": [{ "a": { "position": { "x": 0, "y": 0 }, "width": 1, "height": 1 } }]
            }"#,
        );
        let list = TemplateSchemas::materialize_now(&t).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[1].is_empty());
    }

    #[test]
    fn test_materialize_without_schemas_yields_one_page() {
        let t = template(r#"{ "basePdf": { "width": 210, "height": 297 } }"#);
        assert_eq!(TemplateSchemas::materialize_now(&t).unwrap(), placeholder_schemas());
    }

    #[test]
    fn test_materialize_rejects_extra_schema_pages() {
        let t = template(
            r#"{
                "basePdf": [{ "width": 100, "height": 100 }],
                "schemas": [{}, {}]
            }"#,
        );
        assert!(matches!(TemplateSchemas::materialize_now(&t), Err(TplviewError::Schema(_))));
    }

    #[test]
    fn test_slot_last_generation_wins() {
        let mut slot = SchemaSlot::new();
        let first = slot.begin();
        let second = slot.begin();

        let newer = vec![Vec::new(), Vec::new()];
        assert_eq!(slot.resolve(second, Ok(newer.clone())), SchemaResolution::Applied);
        // The older request finishes late and must not clobber the newer list.
        assert_eq!(slot.resolve(first, Ok(vec![Vec::new()])), SchemaResolution::Stale);
        assert_eq!(slot.list(), &newer);
    }

    #[test]
    fn test_slot_failure_keeps_previous_list() {
        let mut slot = SchemaSlot::new();
        let g = slot.begin();
        slot.resolve(g, Ok(vec![Vec::new(), Vec::new(), Vec::new()]));

        let g = slot.begin();
        assert_eq!(
            slot.resolve(g, Err(TplviewError::Schema("boom".into()))),
            SchemaResolution::Failed
        );
        assert_eq!(slot.page_count(), 3);
        assert_eq!(slot.error(), Some("Schema materialization: boom"));

        let g = slot.begin();
        slot.resolve(g, Ok(placeholder_schemas()));
        assert_eq!(slot.error(), None);
    }
}
