//! Scene recorder that turns drawing calls into figures.

use super::{
    Figure, FilterEffect, FilteredFigure, FillRule, GroupExpr, ImageFigure, ImageResource,
    LineStyle, MarkerKind, OptionalContentMarker, Page, Paint, PathFigure, Segment, TextBaseline,
    TextFigure, TransformFigure, TransformKind,
};
use crate::elements::Color;
use crate::fonts::Font;
use crate::geometry::{Matrix, Point, Rect};
use std::sync::Arc;

/// Records drawing calls for one page.
///
/// Path construction calls accumulate segments; `fill`, `stroke`,
/// `fill_and_stroke` and `clip` turn them into one path figure and start a
/// new path. Nothing is validated here: an unbalanced `restore` is reported
/// when the page is compiled.
#[derive(Debug, Clone)]
pub struct PageRecorder {
    page: Page,
    segments: Vec<Segment>,
    tag: Option<String>,
    open_groups: Vec<GroupExpr>,
}

impl PageRecorder {
    /// Start a page of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            page: Page::new(width, height),
            segments: Vec::new(),
            tag: None,
            open_groups: Vec::new(),
        }
    }

    /// Set the page background.
    pub fn set_background(&mut self, color: Color) -> &mut Self {
        self.page.background = Some(color);
        self
    }

    /// Tag attached to every figure recorded from now on.
    pub fn set_tag(&mut self, tag: Option<&str>) -> &mut Self {
        self.tag = tag.map(str::to_string);
        self
    }

    /// Begin a subpath.
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.segments.push(Segment::MoveTo(Point::new(x, y)));
        self
    }

    /// Straight line.
    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.segments.push(Segment::LineTo(Point::new(x, y)));
        self
    }

    /// Cubic Bézier.
    pub fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> &mut Self {
        self.segments.push(Segment::CubicTo(
            Point::new(x1, y1),
            Point::new(x2, y2),
            Point::new(x, y),
        ));
        self
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) -> &mut Self {
        self.segments.push(Segment::Close);
        self
    }

    /// Closed rectangle subpath.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.move_to(x, y)
            .line_to(x + width, y)
            .line_to(x + width, y + height)
            .line_to(x, y + height)
            .close_path()
    }

    fn take_path(&mut self) -> PathFigure {
        let mut path = PathFigure::new(std::mem::take(&mut self.segments));
        path.tag = self.tag.clone();
        path
    }

    /// Fill the current path.
    pub fn fill(&mut self, paint: impl Into<Paint>, rule: FillRule) -> &mut Self {
        let mut path = self.take_path();
        path.fill = Some(paint.into());
        path.fill_rule = rule;
        self.page.figures.push(Figure::Path(path));
        self
    }

    /// Stroke the current path.
    pub fn stroke(&mut self, paint: impl Into<Paint>, style: LineStyle) -> &mut Self {
        let mut path = self.take_path();
        path.stroke = Some(paint.into());
        path.line_style = style;
        self.page.figures.push(Figure::Path(path));
        self
    }

    /// Fill then stroke the current path.
    pub fn fill_and_stroke(
        &mut self,
        fill: impl Into<Paint>,
        rule: FillRule,
        stroke: impl Into<Paint>,
        style: LineStyle,
    ) -> &mut Self {
        let mut path = self.take_path();
        path.fill = Some(fill.into());
        path.fill_rule = rule;
        path.stroke = Some(stroke.into());
        path.line_style = style;
        self.page.figures.push(Figure::Path(path));
        self
    }

    /// Intersect the clip region with the current path.
    pub fn clip(&mut self, rule: FillRule) -> &mut Self {
        let mut path = self.take_path();
        path.is_clipping = true;
        path.fill_rule = rule;
        self.page.figures.push(Figure::Path(path));
        self
    }

    /// Draw text with the given paints.
    pub fn draw_text(
        &mut self,
        text: &str,
        font: Font,
        position: Point,
        baseline: TextBaseline,
        fill: Option<Paint>,
        stroke: Option<(Paint, LineStyle)>,
    ) -> &mut Self {
        let mut figure = TextFigure::new(text, font, position)
            .with_baseline(baseline)
            .with_fill(fill);
        if let Some((paint, style)) = stroke {
            figure = figure.with_stroke(paint, style);
        }
        figure.tag = self.tag.clone();
        self.page.figures.push(Figure::Text(figure));
        self
    }

    fn push_transform(&mut self, kind: TransformKind) -> &mut Self {
        self.page.figures.push(Figure::Transform(TransformFigure {
            kind,
            tag: self.tag.clone(),
        }));
        self
    }

    /// Save the transform and graphics state.
    pub fn save(&mut self) -> &mut Self {
        self.push_transform(TransformKind::Save)
    }

    /// Restore the last saved state.
    pub fn restore(&mut self) -> &mut Self {
        self.push_transform(TransformKind::Restore)
    }

    /// Concatenate a matrix onto the current transform.
    pub fn transform(&mut self, matrix: Matrix) -> &mut Self {
        self.push_transform(TransformKind::Apply(matrix))
    }

    /// Draw an image into the unit square of the current space.
    pub fn draw_image(&mut self, image: Arc<ImageResource>) -> &mut Self {
        self.page.figures.push(Figure::Image(ImageFigure {
            image,
            tag: self.tag.clone(),
        }));
        self
    }

    /// Open an optional-content bracket.
    pub fn begin_optional_content(&mut self, group: GroupExpr) -> &mut Self {
        self.open_groups.push(group.clone());
        self.page
            .figures
            .push(Figure::OptionalContent(OptionalContentMarker {
                kind: MarkerKind::Start,
                group,
            }));
        self
    }

    /// Close the innermost optional-content bracket.
    pub fn end_optional_content(&mut self) -> &mut Self {
        match self.open_groups.pop() {
            Some(group) => {
                self.page
                    .figures
                    .push(Figure::OptionalContent(OptionalContentMarker {
                        kind: MarkerKind::End,
                        group,
                    }));
            },
            None => log::warn!("end_optional_content without an open group ignored"),
        }
        self
    }

    /// Record figures that are drawn through a filter effect.
    pub fn draw_filtered(
        &mut self,
        filter: FilterEffect,
        figures: Vec<Figure>,
        bounds: Rect,
    ) -> &mut Self {
        self.page.figures.push(Figure::Filtered(FilteredFigure {
            filter,
            figures,
            bounds,
            tag: self.tag.clone(),
        }));
        self
    }

    /// Append an already-built figure.
    pub fn push(&mut self, figure: Figure) -> &mut Self {
        self.page.figures.push(figure);
        self
    }

    /// Finish the page. Segments never painted are dropped.
    pub fn finish(self) -> Page {
        if !self.segments.is_empty() {
            log::debug!("Dropping {} unpainted path segments", self.segments.len());
        }
        self.page
    }
}
