//! Asynchronous schema materialization tests
//!
//! Exercise `materialize_shared` against a preview shared the way the
//! browser binding shares it, including out-of-order completion.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::cell::RefCell;
use std::rc::Rc;

use tplview::error::Result;
use tplview::{
    materialize_shared, SchemaMaterializer, SchemaResolution, SchemasList, Size, Template,
    TemplateSchemas, TplviewError,
};
use tplview::Preview;

fn template(pages: usize) -> Template {
    let schemas = vec![r#"{ "f": { "position": { "x": 0, "y": 0 }, "width": 1, "height": 1 } }"#; pages];
    Template::from_json(&format!(
        r#"{{ "basePdf": {{ "width": 210, "height": 297 }}, "schemas": [{}] }}"#,
        schemas.join(",")
    ))
    .unwrap()
}

fn shared(pages: usize) -> Rc<RefCell<Preview>> {
    Rc::new(RefCell::new(Preview::new(
        template(pages),
        Vec::new(),
        Size::new(800.0, 600.0),
    )))
}

/// Materializer that always fails.
struct Broken;

impl SchemaMaterializer for Broken {
    async fn materialize(&self, _template: &Template) -> Result<SchemasList> {
        Err(TplviewError::Schema("font table missing".into()))
    }
}

#[test]
fn test_materialize_shared_applies_result() {
    let preview = shared(4);
    let request = preview.borrow_mut().request_schemas();
    let resolution = pollster::block_on(materialize_shared(&preview, &TemplateSchemas, request));
    assert_eq!(resolution, SchemaResolution::Applied);
    assert_eq!(preview.borrow().page_count(), 4);
    assert_eq!(preview.borrow().schemas()[3][0].id, "3:f");
}

#[test]
fn test_out_of_order_completion_keeps_newest() {
    let preview = shared(4);
    let first = preview.borrow_mut().request_schemas();
    let second = preview.borrow_mut().set_template(template(2));

    // The newer request completes first; the older one lands afterwards.
    let r2 = pollster::block_on(materialize_shared(&preview, &TemplateSchemas, second));
    let r1 = pollster::block_on(materialize_shared(&preview, &TemplateSchemas, first));

    assert_eq!(r2, SchemaResolution::Applied);
    assert_eq!(r1, SchemaResolution::Stale);
    assert_eq!(preview.borrow().page_count(), 2);
}

#[test]
fn test_failure_is_observable_and_non_fatal() {
    let preview = shared(3);
    let request = preview.borrow_mut().request_schemas();
    pollster::block_on(materialize_shared(&preview, &TemplateSchemas, request));

    let request = preview.borrow_mut().set_template(template(1));
    let resolution = pollster::block_on(materialize_shared(&preview, &Broken, request));
    assert_eq!(resolution, SchemaResolution::Failed);

    let p = preview.borrow();
    assert_eq!(p.page_count(), 3);
    assert!(p.schema_error().unwrap().contains("font table missing"));
    assert!(!p.frame().is_error());
}

#[test]
fn test_events_flow_while_materialization_pending() {
    let preview = shared(3);
    let request = preview.borrow_mut().request_schemas();

    // Nothing is borrowed between request and resolution.
    preview.borrow_mut().set_unit_cursor(5);
    assert_eq!(preview.borrow_mut().handle_scroll(10_000.0), None, "placeholder has one page");

    pollster::block_on(materialize_shared(&preview, &TemplateSchemas, request));
    assert_eq!(preview.borrow_mut().handle_scroll(10_000.0), Some(2));
}

#[test]
fn test_resolutions_that_change_the_frame_request_a_render() {
    let preview = shared(1);
    let renders = Rc::new(RefCell::new(0_usize));
    let resolve = |request, broken: bool| {
        let resolution = if broken {
            pollster::block_on(materialize_shared(&preview, &Broken, request))
        } else {
            pollster::block_on(materialize_shared(&preview, &TemplateSchemas, request))
        };
        if resolution.changes_state() {
            *renders.borrow_mut() += 1;
        }
        resolution
    };

    let stale = preview.borrow_mut().request_schemas();
    let current = preview.borrow_mut().set_template(template(3));
    assert_eq!(resolve(current, false), SchemaResolution::Applied);
    assert_eq!(*renders.borrow(), 1);
    assert_eq!(preview.borrow().frame().pages().unwrap().page_count, 3);

    assert_eq!(resolve(stale, false), SchemaResolution::Stale);
    assert_eq!(*renders.borrow(), 1, "stale results leave the frame untouched");

    let failing = preview.borrow_mut().set_template(template(2));
    assert_eq!(resolve(failing, true), SchemaResolution::Failed);
    assert_eq!(*renders.borrow(), 2);
    assert!(preview.borrow().schema_error().is_some());
}
