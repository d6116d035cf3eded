//! Filter-policy pre-pass.
//!
//! Replaces every [`Figure::Filtered`] before any other pass runs, so
//! discovery, measuring and content generation only ever see the plain
//! figure kinds.

use crate::config::FilterPolicy;
use crate::elements::{
    Document, Figure, FilterRasterizer, FilteredFigure, ImageFigure, Page, TransformFigure,
    TransformKind,
};
use crate::error::{Error, Result};
use crate::geometry::Matrix;
use std::borrow::Cow;
use std::sync::Arc;

fn contains_filtered(figures: &[Figure]) -> bool {
    figures.iter().any(|f| matches!(f, Figure::Filtered(_)))
}

/// Flatten every filtered figure of a document according to `policy`.
///
/// Documents without filtered figures are returned as-is.
pub fn flatten_document<'d>(
    document: &'d Document,
    policy: FilterPolicy,
    rasterizer: Option<&dyn FilterRasterizer>,
) -> Result<Cow<'d, Document>> {
    if !document.pages.iter().any(|p| contains_filtered(&p.figures)) {
        return Ok(Cow::Borrowed(document));
    }

    let pages = document
        .pages
        .iter()
        .map(|page| {
            let mut figures = Vec::with_capacity(page.figures.len());
            flatten_into(&page.figures, policy, rasterizer, &mut figures)?;
            Ok(Page {
                width: page.width,
                height: page.height,
                background: page.background,
                figures,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Cow::Owned(Document { pages }))
}

/// Append `figures` to `out`, replacing filtered figures.
pub fn flatten_into(
    figures: &[Figure],
    policy: FilterPolicy,
    rasterizer: Option<&dyn FilterRasterizer>,
    out: &mut Vec<Figure>,
) -> Result<()> {
    for figure in figures {
        let Figure::Filtered(filtered) = figure else {
            out.push(figure.clone());
            continue;
        };
        match policy {
            FilterPolicy::Rasterize => {
                let rasterizer = rasterizer.ok_or_else(|| Error::RasterizerUnavailable {
                    filter: filtered.filter.name.clone(),
                })?;
                out.extend(rasterize(filtered, rasterizer)?);
            },
            FilterPolicy::IgnoreFilter => {
                log::warn!(
                    "Filter '{}' ignored, drawing unfiltered content",
                    filtered.filter.name
                );
                flatten_into(&filtered.figures, policy, rasterizer, out)?;
            },
            FilterPolicy::SkipFiltered => {
                log::warn!(
                    "Filter '{}' skipped with {} figure(s)",
                    filtered.filter.name,
                    filtered.figures.len()
                );
            },
        }
    }
    Ok(())
}

/// Bake a filtered figure into an image stretched over its bounds.
fn rasterize(filtered: &FilteredFigure, rasterizer: &dyn FilterRasterizer) -> Result<[Figure; 4]> {
    let image = rasterizer.rasterize(&filtered.filter, &filtered.figures, filtered.bounds)?;
    let b = filtered.bounds;
    let transform = |kind| Figure::Transform(TransformFigure { kind, tag: None });
    Ok([
        transform(TransformKind::Save),
        transform(TransformKind::Apply(Matrix::new(b.width(), 0.0, 0.0, b.height(), b.x0, b.y0))),
        Figure::Image(ImageFigure {
            image: Arc::new(image),
            tag: filtered.tag.clone(),
        }),
        transform(TransformKind::Restore),
    ])
}
