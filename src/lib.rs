//! tplview - paginated template preview engine
//!
//! Keeps the view state of a multi-page template preview consistent:
//! - Unit cursor (which input record is shown) and page cursor
//! - Scroll offset ↔ page mapping in both directions, from one offset table
//! - Asynchronous schema materialization with last-request-wins semantics
//! - Per-unit field values, placeholders and edit events
//!
//! Layout, schema parsing and field drawing sit behind traits
//! ([`layout::LayoutProvider`], [`schema::SchemaMaterializer`],
//! [`render::FieldRenderer`]) with default implementations.
//!
//! # Usage (Rust)
//!
//! ```no_run
//! use tplview::{Preview, Size, Template, TemplateSchemas};
//!
//! # fn main() -> tplview::error::Result<()> {
//! let template = Template::from_json(r#"{ "basePdf": { "width": 210, "height": 297 } }"#)?;
//! let mut preview = Preview::new(template, Vec::new(), Size::new(800.0, 600.0));
//! let request = preview.request_schemas();
//! preview.apply_schemas(request.generation, TemplateSchemas::materialize_now(&request.template));
//! let frame = preview.frame();
//! # let _ = frame;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod layout;
pub mod render;
pub mod schema;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use config::PreviewConfig;
pub use cursor::CursorState;
pub use editor::{apply_input_change, Editing, FieldResolver};
pub use error::TplviewError;
pub use render::{FieldRenderer, FieldView, Frame, PageFrame, PreviewFrame};
pub use schema::{MaterializeRequest, SchemaMaterializer, SchemaResolution, TemplateSchemas};
pub use viewer::{materialize_shared, Preview, ScrollCommand, ScrollSync};
#[cfg(target_arch = "wasm32")]
pub use viewer::TplView;

pub use types::*;

/// Render one frame of `template_json` with `inputs_json` in a viewport of
/// `width`x`height` pixels and return it as JSON.
///
/// Schemas are materialized synchronously; the preview is read-only.
///
/// # Errors
/// Returns an error if the template or inputs JSON is invalid.
pub fn render_frame_json(
    template_json: &str,
    inputs_json: &str,
    width: f64,
    height: f64,
) -> error::Result<String> {
    let template = Template::from_json(template_json)?;
    let inputs: InputSet = serde_json::from_str(inputs_json)?;
    let mut preview = Preview::new(template, inputs, Size::new(width, height));
    let request = preview.request_schemas();
    preview.apply_schemas(
        request.generation,
        TemplateSchemas::materialize_now(&request.template),
    );
    Ok(serde_json::to_string(&preview.frame())?)
}

/// JS entry point for [`render_frame_json`].
///
/// # Errors
/// Returns an error if the template or inputs JSON is invalid.
#[wasm_bindgen(js_name = renderFrame)]
pub fn render_frame(
    template_json: &str,
    inputs_json: &str,
    width: f64,
    height: f64,
) -> Result<String, JsValue> {
    render_frame_json(template_json, inputs_json, width, height)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
