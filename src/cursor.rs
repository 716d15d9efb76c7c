//! Unit and page cursors.
//!
//! Setters store what they are given; callers that know the collection
//! lengths clamp with [`CursorState::clamp`] or read through the
//! `clamped_*` accessors.

use serde::Serialize;

/// Which unit (input record) and which page are active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorState {
    unit: usize,
    page: usize,
}

impl CursorState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn unit(&self) -> usize {
        self.unit
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_unit(&mut self, unit: usize) {
        self.unit = unit;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    #[must_use]
    pub fn clamped_unit(&self, unit_count: usize) -> usize {
        clamp_index(self.unit, unit_count)
    }

    #[must_use]
    pub fn clamped_page(&self, page_count: usize) -> usize {
        clamp_index(self.page, page_count)
    }

    /// Pull both cursors back inside `[0, len)` (0 for an empty collection).
    ///
    /// Returns true if either cursor moved.
    pub fn clamp(&mut self, unit_count: usize, page_count: usize) -> bool {
        let unit = self.clamped_unit(unit_count);
        let page = self.clamped_page(page_count);
        let changed = unit != self.unit || page != self.page;
        self.unit = unit;
        self.page = page;
        changed
    }
}

/// Clamp to the last valid index.
#[must_use]
pub fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_origin() {
        let cursor = CursorState::new();
        assert_eq!((cursor.unit(), cursor.page()), (0, 0));
    }

    #[test]
    fn test_setters_do_not_validate() {
        let mut cursor = CursorState::new();
        cursor.set_unit(9);
        cursor.set_page(4);
        assert_eq!((cursor.unit(), cursor.page()), (9, 4));
        assert_eq!(cursor.clamped_unit(3), 2);
        assert_eq!(cursor.clamped_page(10), 4);
    }

    #[test]
    fn test_clamp_to_last_index() {
        let mut cursor = CursorState::new();
        cursor.set_unit(5);
        cursor.set_page(5);
        assert!(cursor.clamp(2, 3));
        assert_eq!((cursor.unit(), cursor.page()), (1, 2));
        assert!(!cursor.clamp(2, 3), "already in range");
    }

    #[test]
    fn test_clamp_empty_collections_to_zero() {
        let mut cursor = CursorState::new();
        cursor.set_unit(3);
        cursor.clamp(0, 0);
        assert_eq!((cursor.unit(), cursor.page()), (0, 0));
    }
}
