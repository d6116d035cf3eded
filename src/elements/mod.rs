//! Figure IR: the recorded drawing operations of a scene.
//!
//! A [`Document`] is a list of [`Page`]s, each owning an ordered list of
//! [`Figure`]s. Figures are plain data; the writer passes match on them
//! independently (measuring, resource discovery, content generation).
//!
//! ## Example
//!
//! ```
//! use scene_pdf::elements::{Color, Document, PageRecorder};
//!
//! let mut page = PageRecorder::new(100.0, 100.0);
//! page.rect(5.0, 5.0, 10.0, 10.0);
//! page.fill(Color::black(), Default::default());
//!
//! let mut doc = Document::new();
//! doc.push(page.finish());
//! assert_eq!(doc.pages[0].figures.len(), 1);
//! ```

mod image;
mod paint;
mod path;
mod recorder;
mod text;

pub use image::{ColorSpace, ContentId, ImageFormat, ImageResource};
pub use paint::{Color, Gradient, GradientGeometry, GradientStop, Paint};
pub use path::{
    segments_bounds, Dash, FillRule, LineCap, LineJoin, LineStyle, PathFigure, Segment,
};
pub use recorder::PageRecorder;
pub use text::{run_kerning, PlacedGlyph, TextBaseline, TextFigure};

use crate::error::Result;
use crate::geometry::{Matrix, Rect};
use std::fmt;
use std::sync::Arc;

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    /// Filled, stroked or clipping path
    Path(PathFigure),
    /// Text run
    Text(TextFigure),
    /// Transform-stack operation
    Transform(TransformFigure),
    /// Raster image drawn in the unit square
    Image(ImageFigure),
    /// Optional-content bracket
    OptionalContent(OptionalContentMarker),
    /// Figures drawn through a filter effect
    Filtered(FilteredFigure),
}

impl Figure {
    /// Tag used for link geometry, if any.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Figure::Path(p) => p.tag.as_deref(),
            Figure::Text(t) => t.tag.as_deref(),
            Figure::Transform(t) => t.tag.as_deref(),
            Figure::Image(i) => i.tag.as_deref(),
            Figure::Filtered(f) => f.tag.as_deref(),
            Figure::OptionalContent(_) => None,
        }
    }
}

/// What a transform figure does to the transform stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformKind {
    /// Right-multiply the current matrix
    Apply(Matrix),
    /// Push a copy of the current state
    Save,
    /// Pop the last saved state
    Restore,
}

/// Transform-stack operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformFigure {
    /// Operation
    pub kind: TransformKind,
    /// Optional tag
    pub tag: Option<String>,
}

/// Raster image painted into the unit square of the current space.
///
/// Row 0 of the image lands at y = 0 of the square.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFigure {
    /// Shared, decoded image
    pub image: Arc<ImageResource>,
    /// Optional tag
    pub tag: Option<String>,
}

/// Visibility expression over named layers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupExpr {
    /// Visible when the layer is on
    Layer(String),
    /// Visible when the operand is not
    Not(Box<GroupExpr>),
    /// Visible when every operand is
    And(Vec<GroupExpr>),
    /// Visible when any operand is
    Or(Vec<GroupExpr>),
}

impl GroupExpr {
    /// Expression for a single layer.
    pub fn layer(name: impl Into<String>) -> Self {
        GroupExpr::Layer(name.into())
    }

    /// Every layer name mentioned, in first-seen order.
    pub fn layers(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_layers(&mut out);
        out
    }

    fn collect_layers<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            GroupExpr::Layer(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            },
            GroupExpr::Not(inner) => inner.collect_layers(out),
            GroupExpr::And(items) | GroupExpr::Or(items) => {
                for item in items {
                    item.collect_layers(out);
                }
            },
        }
    }
}

impl fmt::Display for GroupExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |f: &mut fmt::Formatter<'_>, items: &[GroupExpr], op: &str| {
            write!(f, "(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", op)?;
                }
                write!(f, "{}", item)?;
            }
            write!(f, ")")
        };
        match self {
            GroupExpr::Layer(name) => write!(f, "{}", name),
            GroupExpr::Not(inner) => write!(f, "!{}", inner),
            GroupExpr::And(items) => join(f, items, "&"),
            GroupExpr::Or(items) => join(f, items, "|"),
        }
    }
}

/// Start or end of an optional-content bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Opens the bracket
    Start,
    /// Closes the innermost bracket
    End,
}

/// Optional-content bracket around the figures between Start and End.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalContentMarker {
    /// Start or end
    pub kind: MarkerKind,
    /// Visibility expression of the bracket
    pub group: GroupExpr,
}

/// Opaque filter effect description, interpreted by a [`FilterRasterizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterEffect {
    /// Effect name, e.g. "blur"
    pub name: String,
    /// Effect parameters in the rasterizer's order
    pub parameters: Vec<f64>,
}

/// Figures drawn through a filter effect.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredFigure {
    /// Effect to apply
    pub filter: FilterEffect,
    /// Content the effect applies to
    pub figures: Vec<Figure>,
    /// Local-space region the filtered output covers
    pub bounds: Rect,
    /// Optional tag, carried by the rasterized image
    pub tag: Option<String>,
}

/// Bakes filtered content into an image.
pub trait FilterRasterizer: fmt::Debug + Send + Sync {
    /// Render `figures` through `filter` over `bounds` (local space).
    fn rasterize(&self, filter: &FilterEffect, figures: &[Figure], bounds: Rect)
        -> Result<ImageResource>;
}

/// One page of a scene, in a y-down space with the origin at the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Width in points
    pub width: f64,
    /// Height in points
    pub height: f64,
    /// Color painted under every figure
    pub background: Option<Color>,
    /// Drawing operations in order
    pub figures: Vec<Figure>,
}

impl Page {
    /// Empty page.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: None,
            figures: Vec::new(),
        }
    }
}

/// An ordered list of pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Pages in order
    pub pages: Vec<Page>,
}

impl Document {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page.
    pub fn push(&mut self, page: Page) {
        self.pages.push(page);
    }
}
