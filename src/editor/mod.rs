//! Field value resolution and edit routing.
//!
//! Values are always read from the active unit's record; edits are never
//! applied here. They are turned into [`InputChange`] events scoped to the
//! active unit and handed to whoever owns the input set.

pub(crate) mod mutation;

use std::fmt;

use tracing::debug;

use crate::config::PreviewConfig;
use crate::render::FieldView;
use crate::types::{FieldDescriptor, InputChange, InputRecord, InputSet, Template};

pub use mutation::apply_input_change;

/// Receives committed edits.
pub type ChangeHandler = Box<dyn FnMut(&InputChange)>;

/// Whether, and how, the preview accepts edits.
#[derive(Default)]
pub enum Editing {
    /// Edits are dropped and fields render with neutral styling.
    #[default]
    ReadOnly,
    /// Each edit is passed to the handler as it is committed.
    Callback(ChangeHandler),
    /// Edits are queued until the host drains them with [`Editing::take_queued`].
    ///
    /// For hosts that must not be re-entered while the preview is borrowed.
    Queued(Vec<InputChange>),
}

impl fmt::Debug for Editing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => f.write_str("ReadOnly"),
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Queued(queue) => f.debug_tuple("Queued").field(&queue.len()).finish(),
        }
    }
}

impl Editing {
    pub fn callback(handler: impl FnMut(&InputChange) + 'static) -> Self {
        Self::Callback(Box::new(handler))
    }

    #[must_use]
    pub fn queued() -> Self {
        Self::Queued(Vec::new())
    }

    #[must_use]
    pub fn is_editable(&self) -> bool {
        !matches!(self, Self::ReadOnly)
    }

    /// Deliver `change`. Returns it back when it was accepted.
    pub fn emit(&mut self, change: InputChange) -> Option<InputChange> {
        match self {
            Self::ReadOnly => {
                debug!(key = %change.key, "edit dropped: preview is read-only");
                None
            }
            Self::Callback(handler) => {
                handler(&change);
                Some(change)
            }
            Self::Queued(queue) => {
                queue.push(change.clone());
                Some(change)
            }
        }
    }

    /// Drain queued edits (empty unless [`Editing::Queued`]).
    pub fn take_queued(&mut self) -> Vec<InputChange> {
        match self {
            Self::Queued(queue) => std::mem::take(queue),
            Self::ReadOnly | Self::Callback(_) => Vec::new(),
        }
    }
}

/// Resolves field values for one unit.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    unit: usize,
    record: Option<&'a InputRecord>,
    sample: Option<&'a InputRecord>,
    editable: bool,
}

impl<'a> FieldResolver<'a> {
    #[must_use]
    pub fn new(inputs: &'a InputSet, unit: usize, template: &'a Template, editable: bool) -> Self {
        Self {
            unit,
            record: inputs.get(unit),
            sample: template.sample_record(),
            editable,
        }
    }

    #[must_use]
    pub fn unit(&self) -> usize {
        self.unit
    }

    /// The active unit's value for `key`, or `""` when absent.
    #[must_use]
    pub fn value(&self, key: &str) -> &'a str {
        self.record
            .and_then(|record| record.get(key))
            .map_or("", String::as_str)
    }

    /// Placeholder from the template's first sample record, or `""`.
    #[must_use]
    pub fn placeholder(&self, key: &str) -> &'a str {
        self.sample
            .and_then(|record| record.get(key))
            .map_or("", String::as_str)
    }

    /// Change event for an edit of `key` made while this unit is active.
    #[must_use]
    pub fn change(&self, key: &str, value: &str) -> InputChange {
        InputChange {
            unit_index: self.unit,
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// Resolve the field at `index` on its page.
    #[must_use]
    pub fn view(&self, descriptor: &FieldDescriptor, index: usize, config: &PreviewConfig) -> FieldView {
        let mut descriptor = descriptor.clone();
        descriptor.data = self.value(&descriptor.key).to_string();
        let placeholder = self.placeholder(&descriptor.key).to_string();
        let border = if self.editable {
            config.editable_border.clone()
        } else {
            config.readonly_border.clone()
        };
        FieldView {
            descriptor,
            editable: self.editable,
            placeholder,
            tab_index: index + config.tab_index_base,
            border,
        }
    }
}
