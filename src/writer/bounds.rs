//! Transform replay and device-space bounds of figures.
//!
//! [`TransformState`] is the running matrix plus its save stack. It is
//! threaded explicitly through [`measure`] and through content generation,
//! so both passes see the same matrix at every figure.

use crate::elements::{Figure, Page, TransformFigure, TransformKind};
use crate::error::{Error, Result};
use crate::geometry::{Matrix, Rect};
use indexmap::IndexMap;

/// Tag -> every device-space rectangle the tagged figures cover, in
/// figure order.
pub type TaggedBoundsTable = IndexMap<String, Vec<Rect>>;

/// Matrix that maps the scene's y-down page space onto PDF user space.
pub fn page_flip(height: f64) -> Matrix {
    Matrix::new(1.0, 0.0, 0.0, -1.0, 0.0, height)
}

/// Current transform and the stack of saved transforms for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformState {
    current: Matrix,
    saved: Vec<Matrix>,
}

impl TransformState {
    /// State at the start of a page: the page flip, nothing saved.
    ///
    /// # Examples
    ///
    /// ```
    /// use scene_pdf::geometry::Point;
    /// use scene_pdf::writer::bounds::TransformState;
    ///
    /// let state = TransformState::new(100.0);
    /// assert_eq!(state.depth(), 0);
    /// assert_eq!(state.current().transform_point(Point::new(0.0, 0.0)), Point::new(0.0, 100.0));
    /// ```
    pub fn new(page_height: f64) -> Self {
        Self::with_matrix(page_flip(page_height))
    }

    /// State starting from an arbitrary matrix.
    pub fn with_matrix(current: Matrix) -> Self {
        Self {
            current,
            saved: Vec::new(),
        }
    }

    /// Current transform.
    pub fn current(&self) -> Matrix {
        self.current
    }

    /// Number of open saves.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Replay one transform figure.
    pub fn apply(&mut self, figure: &TransformFigure, page_index: usize) -> Result<()> {
        match figure.kind {
            TransformKind::Apply(m) => {
                self.current = self.current.concat(&m);
            },
            TransformKind::Save => self.saved.push(self.current),
            TransformKind::Restore => {
                self.current = self.saved.pop().ok_or_else(|| Error::UnbalancedState {
                    page: page_index,
                    reason: "restore with no matching save".to_string(),
                })?;
            },
        }
        Ok(())
    }

    /// Check that every save was restored.
    pub fn finish(&self, page_index: usize) -> Result<()> {
        if self.saved.is_empty() {
            Ok(())
        } else {
            Err(Error::UnbalancedState {
                page: page_index,
                reason: format!("{} save(s) never restored", self.saved.len()),
            })
        }
    }
}

/// Replay a figure and return its device-space bounding box.
///
/// Transforms update `state` and measure as degenerate, as do clip paths
/// and optional-content markers. Stroked paths include half the line width
/// whatever their paint.
pub fn measure(figure: &Figure, state: &mut TransformState, page_index: usize) -> Result<Rect> {
    let rect = match figure {
        Figure::Transform(t) => {
            state.apply(t, page_index)?;
            Rect::NAN
        },
        Figure::Path(path) => {
            if path.is_clipping {
                Rect::NAN
            } else {
                state.current.transform_rect(&path.painted_bounds())
            }
        },
        Figure::Text(text) => state.current.transform_rect(&text.local_bounds()),
        Figure::Image(_) => state.current.transform_rect(&Rect::new(0.0, 0.0, 1.0, 1.0)),
        Figure::Filtered(filtered) => state.current.transform_rect(&filtered.bounds),
        Figure::OptionalContent(_) => Rect::NAN,
    };
    Ok(rect)
}

/// Replay a page and collect the device bounds of every tagged figure.
///
/// Fails on an unbalanced restore or on saves left open at the end.
pub fn tagged_bounds(page: &Page, page_index: usize) -> Result<TaggedBoundsTable> {
    let mut table = TaggedBoundsTable::new();
    let mut state = TransformState::new(page.height);

    for figure in &page.figures {
        let rect = measure(figure, &mut state, page_index)?;
        let Some(tag) = figure.tag() else {
            continue;
        };
        if !rect.is_degenerate() {
            table.entry(tag.to_string()).or_default().push(rect);
        }
    }
    state.finish(page_index)?;

    log::debug!("Page {}: {} tagged region(s)", page_index, table.len());
    Ok(table)
}
