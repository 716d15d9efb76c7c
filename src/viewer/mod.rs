//! Preview composer.
//!
//! `Preview` owns the view state of a template preview: the unit and page
//! cursors, the materialized schemas list, the current layout and the
//! scroll synchronizer. Every public mutator runs the recomputation
//! pipeline (layout → geometry → cursor clamping) to completion before it
//! returns, so the next event always sees consistent state.

mod scroll;
#[cfg(target_arch = "wasm32")]
mod wasm;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::PreviewConfig;
use crate::cursor::CursorState;
use crate::editor::{Editing, FieldResolver};
use crate::error::Result;
use crate::layout::{FitToViewport, LayoutProvider, PageGeometry, PreviewLayout, Unit};
use crate::render::{FieldRenderer, Frame, PageFrame, PreviewFrame};
use crate::schema::{MaterializeRequest, SchemaMaterializer, SchemaResolution, SchemaSlot};
use crate::types::{InputChange, InputSet, SchemasList, Size, Template};

pub use scroll::{ScrollCommand, ScrollSync};
#[cfg(target_arch = "wasm32")]
pub use wasm::TplView;

/// View state of one template preview.
pub struct Preview {
    config: PreviewConfig,
    provider: Box<dyn LayoutProvider>,
    template: Arc<Template>,
    inputs: InputSet,
    viewport: Size,
    cursor: CursorState,
    schemas: SchemaSlot,
    layout: PreviewLayout,
    scroll: ScrollSync,
    editing: Editing,
    needs_layout: bool,
}

impl Preview {
    /// Create a read-only preview laid out by [`FitToViewport`].
    ///
    /// The schemas list starts as a single empty page; call
    /// [`Preview::request_schemas`] to materialize the template.
    #[must_use]
    pub fn new(template: Template, inputs: InputSet, viewport: Size) -> Self {
        let mut preview = Self {
            config: PreviewConfig::default(),
            provider: Box::new(FitToViewport::default()),
            template: Arc::new(template),
            inputs,
            viewport,
            cursor: CursorState::new(),
            schemas: SchemaSlot::new(),
            layout: PreviewLayout::default(),
            scroll: ScrollSync::default(),
            editing: Editing::ReadOnly,
            needs_layout: true,
        };
        preview.sync();
        preview
    }

    /// Builder form of [`Preview::set_config`].
    ///
    /// # Errors
    /// Returns [`crate::TplviewError::Config`] if the config is out of range.
    pub fn with_config(mut self, config: PreviewConfig) -> Result<Self> {
        self.set_config(config)?;
        Ok(self)
    }

    /// Replace the config and lay out again with its zoom and ruler height.
    ///
    /// # Errors
    /// Returns [`crate::TplviewError::Config`] if the config is out of range;
    /// the previous config stays in effect.
    pub fn set_config(&mut self, config: PreviewConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.needs_layout = true;
        self.sync();
        Ok(())
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl LayoutProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self.needs_layout = true;
        self.sync();
        self
    }

    #[must_use]
    pub fn with_editing(mut self, editing: Editing) -> Self {
        self.editing = editing;
        self
    }

    pub fn set_editing(&mut self, editing: Editing) {
        self.editing = editing;
    }

    // ---- Accessors ----

    #[must_use]
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    #[must_use]
    pub fn inputs(&self) -> &InputSet {
        &self.inputs
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    #[must_use]
    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.inputs.len()
    }

    /// Number of pages the pager offers (length of the schemas list).
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.schemas.page_count()
    }

    #[must_use]
    pub fn schemas(&self) -> &SchemasList {
        self.schemas.list()
    }

    /// Message of the last failed schema materialization.
    #[must_use]
    pub fn schema_error(&self) -> Option<&str> {
        self.schemas.error()
    }

    #[must_use]
    pub fn layout(&self) -> &PreviewLayout {
        &self.layout
    }

    #[must_use]
    pub fn geometry(&self) -> &PageGeometry {
        self.scroll.geometry()
    }

    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.editing.is_editable()
    }

    // ---- Template, inputs, viewport ----

    /// Open a materialization for the current template.
    pub fn request_schemas(&mut self) -> MaterializeRequest {
        MaterializeRequest {
            generation: self.schemas.begin(),
            template: Arc::clone(&self.template),
        }
    }

    /// Replace the template. Layout is recomputed immediately; the schemas
    /// list is kept until the returned request resolves.
    pub fn set_template(&mut self, template: Template) -> MaterializeRequest {
        self.template = Arc::new(template);
        self.needs_layout = true;
        self.sync();
        let request = self.request_schemas();
        info!(generation = request.generation, "template changed");
        request
    }

    /// Hand back the result of a materialization.
    ///
    /// Results for anything but the latest request are discarded. A failure
    /// keeps the previous list and is reported by [`Preview::schema_error`].
    pub fn apply_schemas(&mut self, generation: u64, result: Result<SchemasList>) -> SchemaResolution {
        let resolution = self.schemas.resolve(generation, result);
        match resolution {
            SchemaResolution::Applied => {
                debug!(generation, pages = self.schemas.page_count(), "schemas applied");
                self.clamp_cursors();
            }
            SchemaResolution::Failed => {
                warn!(
                    generation,
                    error = self.schemas.error().unwrap_or_default(),
                    "schema materialization failed; keeping previous schemas"
                );
            }
            SchemaResolution::Stale => {}
        }
        resolution
    }

    pub fn set_inputs(&mut self, inputs: InputSet) {
        self.inputs = inputs;
        self.clamp_cursors();
    }

    pub fn resize(&mut self, viewport: Size) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.needs_layout = true;
        self.sync();
    }

    /// Run pending recomputation: layout, geometry, cursor clamping.
    pub fn sync(&mut self) {
        if self.needs_layout {
            self.needs_layout = false;
            self.layout = self.provider.layout(
                &self.template,
                self.viewport,
                self.config.zoom,
                self.config.ruler_height,
            );
            let geometry = if let Some(error) = &self.layout.error {
                warn!(%error, "layout failed");
                PageGeometry::empty()
            } else {
                PageGeometry::new(
                    &self.layout.page_sizes,
                    self.config.zoom,
                    self.config.ruler_height,
                    self.layout.scale,
                )
            };
            self.scroll.set_geometry(geometry);
        }
        self.clamp_cursors();
    }

    fn clamp_cursors(&mut self) {
        let before = self.cursor;
        if self.cursor.clamp(self.inputs.len(), self.schemas.page_count()) {
            debug!(?before, after = ?self.cursor, "cursor clamped");
        }
    }

    // ---- Pager and scroll events ----

    /// Unit pager: make `unit` active (clamped). Returns the applied cursor.
    pub fn set_unit_cursor(&mut self, unit: usize) -> usize {
        self.cursor.set_unit(unit);
        self.clamp_cursors();
        self.cursor.unit()
    }

    pub fn next_unit(&mut self) -> usize {
        self.set_unit_cursor(self.cursor.unit().saturating_add(1))
    }

    pub fn prev_unit(&mut self) -> usize {
        self.set_unit_cursor(self.cursor.unit().saturating_sub(1))
    }

    /// Page pager: move to `page` (clamped) and return where the container
    /// must scroll to. `None` while the layout is failed.
    pub fn go_to_page(&mut self, page: usize) -> Option<ScrollCommand> {
        if self.layout.is_failed() {
            return None;
        }
        let page_count = self.schemas.page_count();
        Some(self.scroll.scroll_to_page(&mut self.cursor, page, page_count))
    }

    pub fn next_page(&mut self) -> Option<ScrollCommand> {
        self.go_to_page(self.cursor.page().saturating_add(1))
    }

    pub fn prev_page(&mut self) -> Option<ScrollCommand> {
        self.go_to_page(self.cursor.page().saturating_sub(1))
    }

    /// The container scrolled to `top`. Moves the page cursor only; returns
    /// the new page when it changed.
    pub fn handle_scroll(&mut self, top: f64) -> Option<usize> {
        if self.layout.is_failed() {
            return None;
        }
        let page_count = self.schemas.page_count();
        self.scroll.on_scroll(&mut self.cursor, top, page_count)
    }

    // ---- Editing ----

    /// A field renderer committed `value` for `key`.
    ///
    /// Emits `{unitIndex, key, value}` for the active unit when the preview
    /// is editable; returns the emitted change. Edits are dropped while the
    /// input set is empty, as there is no unit to address.
    pub fn handle_field_change(&mut self, key: &str, value: &str) -> Option<InputChange> {
        if self.inputs.is_empty() {
            debug!(key, "edit dropped: no input units");
            return None;
        }
        let change = self.resolver().change(key, value);
        self.editing.emit(change)
    }

    /// Drain edits queued by [`Editing::Queued`].
    pub fn take_changes(&mut self) -> Vec<InputChange> {
        self.editing.take_queued()
    }

    fn resolver(&self) -> FieldResolver<'_> {
        FieldResolver::new(
            &self.inputs,
            self.cursor.unit(),
            &self.template,
            self.editing.is_editable(),
        )
    }

    // ---- Rendering ----

    /// Build the render tree for the current state.
    #[must_use]
    pub fn frame(&self) -> Frame {
        if let Some(error) = &self.layout.error {
            return Frame::Error {
                message: error.to_string(),
                viewport: self.viewport,
            };
        }

        let resolver = self.resolver();
        let geometry = self.scroll.geometry();
        let pages = self
            .schemas
            .list()
            .iter()
            .zip(&self.layout.page_sizes)
            .enumerate()
            .map(|(index, (fields, size))| PageFrame {
                index,
                top: geometry.page_offset(index),
                size: *size,
                background: self.layout.backgrounds.get(index).cloned().flatten(),
                fields: fields
                    .iter()
                    .enumerate()
                    .map(|(i, descriptor)| resolver.view(descriptor, i, &self.config))
                    .collect(),
            })
            .collect();

        Frame::Pages(PreviewFrame {
            scale: self.layout.scale,
            total_height: geometry.total_height(Unit::Pixel),
            total_height_mm: geometry.total_height(Unit::Millimeter),
            cursor: self.cursor,
            unit_count: self.unit_count(),
            page_count: self.page_count(),
            editable: self.is_editable(),
            pages,
        })
    }

    /// Build a frame and walk it with `renderer` (skipped for an error frame).
    pub fn render_with<R: FieldRenderer + ?Sized>(&self, renderer: &mut R) -> Frame {
        let frame = self.frame();
        if let Frame::Pages(pages) = &frame {
            pages.render_with(renderer);
        }
        frame
    }
}

/// Materialize `request` and apply the result to a shared preview.
///
/// The preview is not borrowed while the materializer runs, so scroll and
/// pager events keep flowing; a template change in the meantime makes this
/// result stale.
pub async fn materialize_shared<M: SchemaMaterializer>(
    preview: &Rc<RefCell<Preview>>,
    materializer: &M,
    request: MaterializeRequest,
) -> SchemaResolution {
    let result = materializer.materialize(&request.template).await;
    preview.borrow_mut().apply_schemas(request.generation, result)
}
