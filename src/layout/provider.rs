//! Layout provider seam.
//!
//! A provider turns a template and a viewport into page sizes, page
//! backgrounds and a rendering scale. Failures are reported in-band so the
//! composer can swap the whole preview for an error view.

use serde::Serialize;

use crate::types::{BasePdf, PageSize, Size, Template};

/// Why a template could not be laid out for a viewport.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutError {
    #[error("template has no pages")]
    NoPages,

    #[error("page {page} has invalid size {width}x{height}mm")]
    InvalidPageSize { page: usize, width: f64, height: f64 },

    #[error("viewport {width}x{height}px has no drawable area")]
    InvalidViewport { width: f64, height: f64 },

    #[error("pages do not fit the viewport at any scale")]
    ScaleUnderflow,

    #[error("base PDF documents need an external layout provider")]
    UnsupportedBasePdf,
}

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewLayout {
    /// Background reference per page (`None` for blank paper)
    pub backgrounds: Vec<Option<String>>,
    /// Physical size per page
    pub page_sizes: Vec<PageSize>,
    /// Physical→viewport scale factor
    pub scale: f64,
    /// Fatal layout error; when set the preview shows nothing else
    pub error: Option<LayoutError>,
}

impl Default for PreviewLayout {
    fn default() -> Self {
        Self {
            backgrounds: Vec::new(),
            page_sizes: Vec::new(),
            scale: 1.0,
            error: None,
        }
    }
}

impl PreviewLayout {
    #[must_use]
    pub fn failed(error: LayoutError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Sizes a template for a viewport.
pub trait LayoutProvider {
    /// `zoom` converts page millimeters to pixels; `ruler_offset` is the
    /// vertical space (px) reserved above each page.
    fn layout(&self, template: &Template, viewport: Size, zoom: f64, ruler_offset: f64) -> PreviewLayout;
}

/// Default provider: scales the widest/tallest page down to fit the viewport,
/// never up, rounded down to whole percent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitToViewport;

impl FitToViewport {
    fn try_layout(
        &self,
        template: &Template,
        viewport: Size,
        zoom: f64,
        ruler_offset: f64,
    ) -> Result<PreviewLayout, LayoutError> {
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            return Err(LayoutError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let (page_sizes, backgrounds) = match &template.base_pdf {
            BasePdf::Blank(paper) => {
                let count = template.schemas.len().max(1);
                (
                    vec![PageSize::new(paper.width, paper.height); count],
                    vec![None; count],
                )
            }
            BasePdf::Pages(pages) => (
                pages
                    .iter()
                    .map(|p| PageSize::new(p.width, p.height))
                    .collect::<Vec<_>>(),
                pages.iter().map(|p| p.background.clone()).collect(),
            ),
            BasePdf::Document(_) => return Err(LayoutError::UnsupportedBasePdf),
        };

        if page_sizes.is_empty() {
            return Err(LayoutError::NoPages);
        }
        if let Some((page, size)) = page_sizes.iter().enumerate().find(|(_, s)| !s.is_valid()) {
            return Err(LayoutError::InvalidPageSize {
                page,
                width: size.width,
                height: size.height,
            });
        }

        let paper_width = page_sizes.iter().map(|s| s.width).fold(0.0, f64::max) * zoom;
        let paper_height = page_sizes.iter().map(|s| s.height).fold(0.0, f64::max) * zoom;
        let scale = fit(viewport.width, paper_width).min(fit(viewport.height - ruler_offset, paper_height));
        if !(scale > 0.0) {
            return Err(LayoutError::ScaleUnderflow);
        }

        Ok(PreviewLayout {
            backgrounds,
            page_sizes,
            scale,
            error: None,
        })
    }
}

impl LayoutProvider for FitToViewport {
    fn layout(&self, template: &Template, viewport: Size, zoom: f64, ruler_offset: f64) -> PreviewLayout {
        self.try_layout(template, viewport, zoom, ruler_offset)
            .unwrap_or_else(PreviewLayout::failed)
    }
}

/// Fraction of `paper` that fits in `available`, capped at 1 and floored to 0.01.
fn fit(available: f64, paper: f64) -> f64 {
    if paper <= 0.0 {
        return 0.0;
    }
    ((available / paper).min(1.0) * 100.0).floor() / 100.0
}
