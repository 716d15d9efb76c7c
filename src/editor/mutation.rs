//! Folding change events back into an input set.
//!
//! The preview never mutates inputs; hosts that keep their own input set use
//! this to apply the events the preview emits.

use crate::error::{Result, TplviewError};
use crate::types::{InputChange, InputSet};

/// Apply `change` to `inputs`.
///
/// An empty value clears the key. Records other than `change.unit_index` are
/// left untouched.
///
/// # Errors
/// Returns [`TplviewError::UnitOutOfRange`] if the unit does not exist.
pub fn apply_input_change(inputs: &mut InputSet, change: &InputChange) -> Result<()> {
    let len = inputs.len();
    let record = inputs
        .get_mut(change.unit_index)
        .ok_or(TplviewError::UnitOutOfRange {
            index: change.unit_index,
            len,
        })?;

    if change.value.is_empty() {
        record.remove(&change.key);
    } else {
        record.insert(change.key.clone(), change.value.clone());
    }
    Ok(())
}
