//! Path figures and line styling.

use super::paint::Paint;
use crate::geometry::{Matrix, Point, Rect};

/// One path construction step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Begin a new subpath
    MoveTo(Point),
    /// Straight line to a point
    LineTo(Point),
    /// Cubic Bézier with two control points and an end point
    CubicTo(Point, Point, Point),
    /// Close the current subpath
    Close,
}

impl Segment {
    /// Map every point of the segment through `m`.
    pub fn transformed(&self, m: &Matrix) -> Segment {
        match self {
            Segment::MoveTo(p) => Segment::MoveTo(m.transform_point(*p)),
            Segment::LineTo(p) => Segment::LineTo(m.transform_point(*p)),
            Segment::CubicTo(c1, c2, p) => Segment::CubicTo(
                m.transform_point(*c1),
                m.transform_point(*c2),
                m.transform_point(*p),
            ),
            Segment::Close => Segment::Close,
        }
    }
}

/// Bounding box of every point in a segment list, control points included.
pub fn segments_bounds(segments: &[Segment]) -> Rect {
    Rect::from_points(segments.iter().flat_map(|s| match s {
        Segment::MoveTo(p) | Segment::LineTo(p) => vec![*p],
        Segment::CubicTo(c1, c2, p) => vec![*c1, *c2, *p],
        Segment::Close => Vec::new(),
    }))
}

/// Rule deciding which regions of a self-intersecting path are inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Nonzero winding number
    #[default]
    NonZero,
    /// Even-odd
    EvenOdd,
}

/// Line cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Butt cap (default)
    #[default]
    Butt = 0,
    /// Round cap
    Round = 1,
    /// Projecting square cap
    Square = 2,
}

/// Line join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Miter join (default)
    #[default]
    Miter = 0,
    /// Round join
    Round = 1,
    /// Bevel join
    Bevel = 2,
}

/// Dash pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Dash {
    /// Alternating on/off lengths
    pub array: Vec<f64>,
    /// Offset into the pattern at the start of each subpath
    pub phase: f64,
}

/// Stroke geometry parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    /// Line width
    pub width: f64,
    /// Cap style
    pub cap: LineCap,
    /// Join style
    pub join: LineJoin,
    /// Miter limit
    pub miter_limit: f64,
    /// Dash pattern, solid when `None`
    pub dash: Option<Dash>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: None,
        }
    }
}

impl LineStyle {
    /// Solid line of the given width.
    pub fn with_width(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }
}

/// A filled, stroked or clipping path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFigure {
    /// Construction steps
    pub segments: Vec<Segment>,
    /// Fill paint
    pub fill: Option<Paint>,
    /// Stroke paint
    pub stroke: Option<Paint>,
    /// Stroke geometry
    pub line_style: LineStyle,
    /// Intersect the clip with this path instead of painting it
    pub is_clipping: bool,
    /// Inside test used for fill and clip
    pub fill_rule: FillRule,
    /// Optional tag for link geometry
    pub tag: Option<String>,
}

impl PathFigure {
    /// A path with no paints.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            fill: None,
            stroke: None,
            line_style: LineStyle::default(),
            is_clipping: false,
            fill_rule: FillRule::NonZero,
            tag: None,
        }
    }

    /// Closed rectangle path.
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(vec![
            Segment::MoveTo(Point::new(x, y)),
            Segment::LineTo(Point::new(x + width, y)),
            Segment::LineTo(Point::new(x + width, y + height)),
            Segment::LineTo(Point::new(x, y + height)),
            Segment::Close,
        ])
    }

    /// Set the fill paint.
    pub fn with_fill(mut self, paint: impl Into<Paint>) -> Self {
        self.fill = Some(paint.into());
        self
    }

    /// Set the stroke paint and line style.
    pub fn with_stroke(mut self, paint: impl Into<Paint>, style: LineStyle) -> Self {
        self.stroke = Some(paint.into());
        self.line_style = style;
        self
    }

    /// Set the tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Local-space bounds of every path point.
    pub fn local_bounds(&self) -> Rect {
        segments_bounds(&self.segments)
    }

    /// Local bounds grown by half the stroke width when stroked.
    pub fn painted_bounds(&self) -> Rect {
        let bounds = self.local_bounds();
        if self.stroke.is_some() {
            bounds.inflate(self.line_style.width / 2.0)
        } else {
            bounds
        }
    }
}
