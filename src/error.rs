//! Structured error types for tplview.

use crate::layout::LayoutError;

/// All errors that can occur while loading templates and driving a preview.
#[derive(Debug, thiserror::Error)]
pub enum TplviewError {
    /// The layout provider rejected the template/viewport combination.
    #[error("Layout: {0}")]
    Layout(#[from] LayoutError),

    /// Schema materialization failed.
    #[error("Schema materialization: {0}")]
    Schema(String),

    /// Template, input or config JSON could not be decoded.
    #[error("Template JSON: {0}")]
    Template(#[from] serde_json::Error),

    /// A config value is out of range.
    #[error("Invalid config: {0}")]
    Config(String),

    /// A change event addressed a unit that does not exist.
    #[error("Unit index {index} out of range ({len} units)")]
    UnitOutOfRange { index: usize, len: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TplviewError>;

impl From<String> for TplviewError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for TplviewError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<TplviewError> for wasm_bindgen::JsValue {
    fn from(e: TplviewError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
