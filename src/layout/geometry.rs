//! Pre-computed vertical page layout.
//!
//! Page top edges are computed once per layout pass, so both the
//! scroll→page lookup and the page→scroll offset read from the same table.
//! Edges are snapped to whole pixels: browsers report `scrollTop` in whole
//! (or device) pixels, and an integral edge survives that round trip.

use crate::types::PageSize;

/// Pixels per millimeter at 96 DPI.
pub const ZOOM: f64 = 3.779_527_559_1;

/// Height in pixels of the ruler drawn above every page.
pub const RULER_HEIGHT: f64 = 30.0;

/// Unit a length is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Viewport pixels, the unit of scroll offsets.
    Pixel,
    /// Physical millimeters (pixels divided by the zoom constant).
    Millimeter,
}

/// Vertical layout of the pages in the scroll container.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    /// Top edge of each page in pixels, plus a final entry for the content bottom
    page_positions: Vec<f64>,
    /// Pixels per millimeter
    zoom: f64,
    /// Ruler height in pixels
    ruler_height: f64,
    /// Rendering scale
    scale: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::empty()
    }
}

impl PageGeometry {
    /// Build the geometry for `page_sizes`.
    ///
    /// Each page occupies `(height_mm * zoom + ruler_height) * scale` pixels.
    /// Edges are the running sum rounded to the nearest pixel, and every page
    /// keeps at least one pixel.
    #[must_use]
    pub fn new(page_sizes: &[PageSize], zoom: f64, ruler_height: f64, scale: f64) -> Self {
        let mut page_positions: Vec<f64> = Vec::with_capacity(page_sizes.len() + 1);
        let mut y: f64 = 0.0;
        for size in page_sizes {
            page_positions.push(snap(y, page_positions.last().copied()));
            y += (size.height * zoom + ruler_height) * scale;
        }
        page_positions.push(snap(y, page_positions.last().copied())); // Final edge

        Self {
            page_positions,
            zoom,
            ruler_height,
            scale,
        }
    }

    /// Geometry with no pages; every lookup lands on page 0.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            page_positions: vec![0.0],
            zoom: ZOOM,
            ruler_height: RULER_HEIGHT,
            scale: 1.0,
        }
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_positions.len().saturating_sub(1)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.page_count() == 0
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn ruler_height(&self) -> f64 {
        self.ruler_height
    }

    /// Scroll offset in pixels at which `page` starts.
    ///
    /// Indices past the last page return the content bottom.
    #[must_use]
    pub fn page_offset(&self, page: usize) -> f64 {
        let last = self.page_count();
        self.page_positions
            .get(page.min(last))
            .copied()
            .unwrap_or(0.0)
    }

    /// Height of `page` in pixels, ruler included.
    #[must_use]
    pub fn page_height(&self, page: usize) -> Option<f64> {
        let top = self.page_positions.get(page)?;
        let bottom = self.page_positions.get(page + 1)?;
        Some(bottom - top)
    }

    /// Total scrollable content height.
    #[must_use]
    pub fn total_height(&self, unit: Unit) -> f64 {
        let px = self.page_positions.last().copied().unwrap_or(0.0);
        match unit {
            Unit::Pixel => px,
            Unit::Millimeter if self.zoom > 0.0 => px / self.zoom,
            Unit::Millimeter => 0.0,
        }
    }

    /// Page whose interval `[offset(p), offset(p + 1))` contains `offset`.
    ///
    /// Offsets above the first page map to page 0 and offsets past the end map
    /// to the last page. An offset exactly on a boundary belongs to the later
    /// page, so `page_at(page_offset(p)) == Some(p)`. Returns `None` for
    /// non-finite offsets and empty geometry.
    #[must_use]
    pub fn page_at(&self, offset: f64) -> Option<usize> {
        if !offset.is_finite() || self.is_empty() {
            return None;
        }
        let tops = self.page_positions.get(..self.page_count())?;
        let at_or_above = tops.partition_point(|&top| top <= offset);
        Some(at_or_above.saturating_sub(1))
    }
}

/// Round `y` to a whole pixel, kept strictly above the previous edge.
fn snap(y: f64, previous: Option<f64>) -> f64 {
    let edge = y.round();
    match previous {
        Some(previous) if !(edge > previous) => previous + 1.0,
        _ => edge,
    }
}
