//! Browser binding for [`Preview`].
//!
//! `TplView` owns the DOM scroll container. Scroll events feed
//! [`Preview::handle_scroll`]; the page pager writes `scrollTop` from the
//! returned [`ScrollCommand`]. Schema materialization runs on the browser
//! event loop via `spawn_local`, with the preview shared through
//! `Rc<RefCell<_>>` so events keep being handled while it is pending.
//! The render callback fires after every state change that alters the frame,
//! including a materialization that resolves later.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement};

use super::{materialize_shared, Preview, ScrollCommand};
use crate::config::PreviewConfig;
use crate::editor::Editing;
use crate::error::TplviewError;
use crate::schema::{MaterializeRequest, TemplateSchemas};
use crate::types::{InputSet, Size, Template};

fn scroll_top_f64(element: &HtmlElement) -> f64 {
    Reflect::get(element.as_ref(), &JsValue::from_str("scrollTop"))
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or_else(|| f64::from(element.scroll_top()))
}

fn set_scroll_top(element: &HtmlElement, command: ScrollCommand) {
    let _ = Reflect::set(
        element.as_ref(),
        &JsValue::from_str("scrollTop"),
        &JsValue::from_f64(command.top),
    );
}

type SharedCallback = Rc<RefCell<Option<Function>>>;

fn notify(callback: &SharedCallback, value: &JsValue) {
    let callback = callback.borrow().clone();
    if let Some(f) = callback {
        let _ = f.call1(&JsValue::NULL, value);
    }
}

fn invoke_render_callback(callback: &SharedCallback) {
    let callback = callback.borrow().clone();
    if let Some(f) = callback {
        let _ = f.call0(&JsValue::NULL);
    }
}

/// Template preview bound to a scrollable DOM element.
#[wasm_bindgen]
pub struct TplView {
    state: Rc<RefCell<Preview>>,
    container: HtmlElement,
    scroll_closure: Option<Closure<dyn FnMut(Event)>>,
    page_callback: SharedCallback,
    render_callback: SharedCallback,
    change_callback: Option<Function>,
}

#[wasm_bindgen]
impl TplView {
    /// Create a read-only preview of `template_json` inside `container`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: HtmlElement,
        template_json: &str,
        width: f64,
        height: f64,
    ) -> Result<TplView, JsValue> {
        console_error_panic_hook::set_once();

        let template = Template::from_json(template_json)?;
        let preview = Preview::new(template, InputSet::new(), Size::new(width, height));
        let mut view = TplView {
            state: Rc::new(RefCell::new(preview)),
            container,
            scroll_closure: None,
            page_callback: Rc::new(RefCell::new(None)),
            render_callback: Rc::new(RefCell::new(None)),
            change_callback: None,
        };
        view.attach_scroll_listener()?;
        let request = view.state.borrow_mut().request_schemas();
        view.spawn_materialize(request);
        Ok(view)
    }

    fn attach_scroll_listener(&mut self) -> Result<(), JsValue> {
        let weak_state = Rc::downgrade(&self.state);
        let container = self.container.clone();
        let page_callback = Rc::clone(&self.page_callback);
        let render_callback = Rc::clone(&self.render_callback);
        let closure = Closure::wrap(Box::new(move |_event: Event| {
            let Some(state) = weak_state.upgrade() else {
                return;
            };
            let top = scroll_top_f64(&container);
            let changed = state.borrow_mut().handle_scroll(top);
            if let Some(page) = changed {
                notify(&page_callback, &JsValue::from_f64(page as f64));
                invoke_render_callback(&render_callback);
            }
        }) as Box<dyn FnMut(Event)>);
        self.container
            .add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())?;
        self.scroll_closure = Some(closure);
        Ok(())
    }

    fn spawn_materialize(&self, request: MaterializeRequest) {
        let state = Rc::clone(&self.state);
        let render_callback = Rc::clone(&self.render_callback);
        wasm_bindgen_futures::spawn_local(async move {
            let resolution = materialize_shared(&state, &TemplateSchemas, request).await;
            if resolution.changes_state() {
                invoke_render_callback(&render_callback);
            }
        });
    }

    fn request_render(&self) {
        invoke_render_callback(&self.render_callback);
    }

    /// Replace the template; schemas are materialized asynchronously.
    #[wasm_bindgen]
    pub fn load_template(&mut self, template_json: &str) -> Result<(), JsValue> {
        let template = Template::from_json(template_json)?;
        let request = self.state.borrow_mut().set_template(template);
        self.request_render();
        self.spawn_materialize(request);
        Ok(())
    }

    /// Apply a (possibly partial) JSON config.
    #[wasm_bindgen]
    pub fn set_config(&mut self, config_json: &str) -> Result<(), JsValue> {
        let config = PreviewConfig::from_json(config_json)?;
        self.state.borrow_mut().set_config(config)?;
        self.request_render();
        Ok(())
    }

    /// Replace the input set (an array of `{ key: value }` records).
    #[wasm_bindgen]
    pub fn set_inputs(&mut self, inputs: JsValue) -> Result<(), JsValue> {
        let inputs: InputSet = serde_wasm_bindgen::from_value(inputs)
            .map_err(|e| TplviewError::Other(format!("invalid inputs: {e}")))?;
        self.state.borrow_mut().set_inputs(inputs);
        self.request_render();
        Ok(())
    }

    /// Register the edit handler. `None` makes the preview read-only.
    #[wasm_bindgen]
    pub fn set_change_callback(&mut self, callback: Option<Function>) {
        let editing = if callback.is_some() {
            Editing::queued()
        } else {
            Editing::ReadOnly
        };
        self.change_callback = callback;
        self.state.borrow_mut().set_editing(editing);
        self.request_render();
    }

    /// Register a callback invoked with the new page index when scrolling
    /// moves the page cursor.
    #[wasm_bindgen]
    pub fn set_page_callback(&mut self, callback: Option<Function>) {
        *self.page_callback.borrow_mut() = callback;
    }

    /// Register a callback invoked with no arguments whenever the frame
    /// changed and the host should call [`TplView::frame`] again.
    #[wasm_bindgen]
    pub fn set_render_callback(&mut self, callback: Option<Function>) {
        *self.render_callback.borrow_mut() = callback;
    }

    #[wasm_bindgen]
    pub fn resize(&mut self, width: f64, height: f64) {
        self.state.borrow_mut().resize(Size::new(width, height));
        self.request_render();
    }

    #[wasm_bindgen]
    pub fn unit_cursor(&self) -> usize {
        self.state.borrow().cursor().unit()
    }

    #[wasm_bindgen]
    pub fn page_cursor(&self) -> usize {
        self.state.borrow().cursor().page()
    }

    #[wasm_bindgen]
    pub fn unit_count(&self) -> usize {
        self.state.borrow().unit_count()
    }

    #[wasm_bindgen]
    pub fn page_count(&self) -> usize {
        self.state.borrow().page_count()
    }

    /// Unit pager. Returns the applied unit index.
    #[wasm_bindgen]
    pub fn set_unit(&mut self, unit: usize) -> usize {
        let applied = self.state.borrow_mut().set_unit_cursor(unit);
        self.request_render();
        applied
    }

    /// Page pager: scrolls the container to `page`. Returns the applied page.
    #[wasm_bindgen]
    pub fn go_to_page(&mut self, page: usize) -> usize {
        let (command, applied) = {
            let mut s = self.state.borrow_mut();
            let command = s.go_to_page(page);
            (command, s.cursor().page())
        };
        if let Some(command) = command {
            set_scroll_top(&self.container, command);
            self.request_render();
        }
        applied
    }

    /// A field renderer committed a value.
    #[wasm_bindgen]
    pub fn field_changed(&mut self, key: &str, value: &str) -> Result<(), JsValue> {
        let changes = {
            let mut s = self.state.borrow_mut();
            s.handle_field_change(key, value);
            s.take_changes()
        };
        let Some(callback) = self.change_callback.clone() else {
            return Ok(());
        };
        for change in changes {
            let event = serde_wasm_bindgen::to_value(&change)
                .map_err(|e| TplviewError::Other(format!("serialization error: {e}")))?;
            callback.call1(&JsValue::NULL, &event)?;
        }
        Ok(())
    }

    /// Current render tree.
    #[wasm_bindgen]
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        let frame = self.state.borrow().frame();
        serde_wasm_bindgen::to_value(&frame)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Message of the last failed schema materialization, if any.
    #[wasm_bindgen]
    pub fn schema_error(&self) -> Option<String> {
        self.state.borrow().schema_error().map(str::to_string)
    }
}

impl Drop for TplView {
    fn drop(&mut self) {
        if let Some(closure) = self.scroll_closure.take() {
            let _ = self
                .container
                .remove_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
        }
    }
}
