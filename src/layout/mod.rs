//! Page geometry and layout computation.
//!
//! This module handles:
//! - Pre-computing page top edges from physical page heights, zoom, ruler and scale
//! - Mapping a scroll offset back to the page it falls in (binary search)
//! - The layout provider seam that sizes a template for a viewport

mod geometry;
mod provider;

pub use geometry::{PageGeometry, Unit, RULER_HEIGHT, ZOOM};
pub use provider::{FitToViewport, LayoutError, LayoutProvider, PreviewLayout};
