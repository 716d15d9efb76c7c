//! Render tree produced by the preview composer.
//!
//! The composer does not draw anything itself. It emits a [`Frame`]: either
//! an error view or, per page, the page box and its resolved fields. A host
//! walks the frame with a [`FieldRenderer`] and reports edits back through
//! [`crate::viewer::Preview::handle_field_change`].

use serde::Serialize;

use crate::cursor::CursorState;
use crate::types::{FieldDescriptor, PageSize, Size};

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Frame {
    /// Layout failed; nothing but the error is shown.
    Error { message: String, viewport: Size },
    /// The paginated preview.
    Pages(PreviewFrame),
}

impl Frame {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    #[must_use]
    pub fn pages(&self) -> Option<&PreviewFrame> {
        match self {
            Self::Pages(frame) => Some(frame),
            Self::Error { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewFrame {
    pub scale: f64,
    /// Height of the scrollable content in pixels
    pub total_height: f64,
    /// Same height in millimeters, as the content box is sized
    pub total_height_mm: f64,
    pub cursor: CursorState,
    pub unit_count: usize,
    pub page_count: usize,
    pub editable: bool,
    pub pages: Vec<PageFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFrame {
    pub index: usize,
    /// Scroll offset of the page's top edge, in pixels
    pub top: f64,
    pub size: PageSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub fields: Vec<FieldView>,
}

/// Everything a field renderer needs to draw one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    /// Descriptor with the active unit's value injected into `data`
    pub descriptor: FieldDescriptor,
    pub editable: bool,
    pub placeholder: String,
    pub tab_index: usize,
    /// CSS border
    pub border: String,
}

/// Draws fields. Implemented by the host (DOM, canvas, test recorder, ...).
pub trait FieldRenderer {
    /// Called once per page before its fields.
    fn begin_page(&mut self, _page: &PageFrame) {}

    fn render_field(&mut self, page: usize, field: &FieldView);
}

impl PreviewFrame {
    /// Walk every page and field in order.
    pub fn render_with<R: FieldRenderer + ?Sized>(&self, renderer: &mut R) {
        for page in &self.pages {
            renderer.begin_page(page);
            for field in &page.fields {
                renderer.render_field(page.index, field);
            }
        }
    }

    /// Find a field by descriptor id.
    #[must_use]
    pub fn field(&self, id: &str) -> Option<&FieldView> {
        self.pages
            .iter()
            .flat_map(|p| p.fields.iter())
            .find(|f| f.descriptor.id == id)
    }
}
