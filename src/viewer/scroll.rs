//! Scroll ↔ page synchronization.
//!
//! Two directions share one [`PageGeometry`]:
//! - reactive: a scroll event moves the page cursor and nothing else, so it
//!   can never trigger another scroll;
//! - imperative: a pager action computes the page's offset, returns it as a
//!   [`ScrollCommand`] for the host to apply, and moves the page cursor.
//!
//! Because both read the same offset table, the scroll event produced by a
//! programmatic scroll to `offset(p)` resolves back to `p`.

use serde::Serialize;
use tracing::trace;

use crate::cursor::{clamp_index, CursorState};
use crate::layout::PageGeometry;

/// Scroll position the host must apply to its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollCommand {
    /// Vertical scroll offset in pixels
    pub top: f64,
}

/// Keeps the page cursor and the container's scroll offset consistent.
#[derive(Debug, Clone, Default)]
pub struct ScrollSync {
    geometry: PageGeometry,
}

impl ScrollSync {
    #[must_use]
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    #[must_use]
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn set_geometry(&mut self, geometry: PageGeometry) {
        self.geometry = geometry;
    }

    /// Handle a scroll event at offset `top`.
    ///
    /// `page_count` is the number of pages the pager knows about; the derived
    /// page is clamped to it. Returns the new page when the cursor moved.
    pub fn on_scroll(&self, cursor: &mut CursorState, top: f64, page_count: usize) -> Option<usize> {
        let page = clamp_index(self.geometry.page_at(top)?, page_count);
        if page == cursor.page() {
            return None;
        }
        trace!(top, from = cursor.page(), to = page, "scroll moved page cursor");
        cursor.set_page(page);
        Some(page)
    }

    /// Jump to `page` (clamped to `page_count`): moves the cursor and returns
    /// the offset to scroll the container to.
    pub fn scroll_to_page(&self, cursor: &mut CursorState, page: usize, page_count: usize) -> ScrollCommand {
        let page = clamp_index(page, page_count);
        let top = self.geometry.page_offset(page);
        trace!(page, top, "programmatic scroll");
        cursor.set_page(page);
        ScrollCommand { top }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::PageSize;

    fn sync(heights: &[f64]) -> ScrollSync {
        let sizes: Vec<PageSize> = heights.iter().map(|&h| PageSize::new(210.0, h)).collect();
        ScrollSync::new(PageGeometry::new(&sizes, 2.0, 10.0, 1.0))
    }

    #[test]
    fn test_scroll_to_page_scenario() {
        let sync = sync(&[100.0, 150.0, 200.0]);
        let mut cursor = CursorState::new();
        let command = sync.scroll_to_page(&mut cursor, 2, 3);
        assert_eq!(command.top, 520.0);
        assert_eq!(cursor.page(), 2);
    }

    #[test]
    fn test_fixed_point() {
        let sync = sync(&[100.0, 150.0, 200.0]);
        for target in 0..3 {
            let mut cursor = CursorState::new();
            cursor.set_page(if target == 0 { 2 } else { 0 });
            let command = sync.scroll_to_page(&mut cursor, target, 3);
            // The resulting scroll event must not move the cursor again.
            assert_eq!(sync.on_scroll(&mut cursor, command.top, 3), None);
            assert_eq!(cursor.page(), target);
        }
    }

    #[test]
    fn test_scroll_updates_only_on_change() {
        let sync = sync(&[100.0, 150.0, 200.0]);
        let mut cursor = CursorState::new();
        assert_eq!(sync.on_scroll(&mut cursor, 100.0, 3), None);
        assert_eq!(sync.on_scroll(&mut cursor, 300.0, 3), Some(1));
        assert_eq!(sync.on_scroll(&mut cursor, 300.0, 3), None, "idempotent");
        assert_eq!(sync.on_scroll(&mut cursor, 600.0, 3), Some(2));
    }

    #[test]
    fn test_scroll_clamped_to_pager_pages() {
        // Geometry knows three pages but only two have been materialized.
        let sync = sync(&[100.0, 150.0, 200.0]);
        let mut cursor = CursorState::new();
        assert_eq!(sync.on_scroll(&mut cursor, 600.0, 2), Some(1));
        assert_eq!(sync.scroll_to_page(&mut cursor, 9, 2).top, 210.0);
    }

    #[test]
    fn test_empty_geometry_ignores_scroll() {
        let sync = ScrollSync::default();
        let mut cursor = CursorState::new();
        assert_eq!(sync.on_scroll(&mut cursor, 50.0, 1), None);
        assert_eq!(sync.scroll_to_page(&mut cursor, 0, 1).top, 0.0);
    }
}
