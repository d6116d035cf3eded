//! Text figures and their horizontal/vertical layout.
//!
//! Layout lives here so the bounds replayer and the content stream writer
//! compute the same origin and advances from the same code.

use super::paint::{Color, Paint};
use super::path::LineStyle;
use crate::fonts::encoding::split_runs;
use crate::fonts::{Font, FontProvider};
use crate::geometry::{Point, Rect};

/// Which part of the text box the figure's position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    /// Position is the top of the ascent
    Top,
    /// Position is the bottom of the descent
    Bottom,
    /// Position is halfway between ascent and descent
    Middle,
    /// Position is on the baseline
    #[default]
    Baseline,
}

/// A run of text in one font.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFigure {
    /// Characters to show
    pub text: String,
    /// Face and size
    pub font: Font,
    /// Anchor point, left edge of the text
    pub position: Point,
    /// Vertical meaning of `position`
    pub baseline: TextBaseline,
    /// Fill paint
    pub fill: Option<Paint>,
    /// Stroke paint
    pub stroke: Option<Paint>,
    /// Stroke geometry
    pub line_style: LineStyle,
    /// Optional tag for link geometry
    pub tag: Option<String>,
}

/// Glyph placement produced by [`TextFigure::layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph {
    /// Character
    pub ch: char,
    /// Pen position from the text origin, in 1/1000 em
    pub x: f64,
}

impl TextFigure {
    /// Black text on the baseline at `position`.
    pub fn new(text: impl Into<String>, font: Font, position: Point) -> Self {
        Self {
            text: text.into(),
            font,
            position,
            baseline: TextBaseline::Baseline,
            fill: Some(Paint::Solid(Color::black())),
            stroke: None,
            line_style: LineStyle::default(),
            tag: None,
        }
    }

    /// Set the baseline mode.
    pub fn with_baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    /// Set or clear the fill paint.
    pub fn with_fill(mut self, paint: Option<Paint>) -> Self {
        self.fill = paint;
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

    /// Text origin on the baseline, in local space (y grows downward).
    pub fn origin(&self) -> Point {
        let metrics = self.font.family.provider().metrics();
        let s = self.font.scale();
        let y = self.position.y;
        let baseline_y = match self.baseline {
            TextBaseline::Top => y + metrics.ascent * s,
            TextBaseline::Bottom => y + metrics.descent * s,
            TextBaseline::Middle => y + (metrics.ascent + metrics.descent) / 2.0 * s,
            TextBaseline::Baseline => y,
        };
        Point::new(self.position.x, baseline_y)
    }

    /// Pen positions of every character and the total advance, in 1/1000 em.
    ///
    /// Kerning is applied between neighbours inside single-byte runs only,
    /// mirroring what the show operators can express.
    pub fn layout(&self) -> (Vec<PlacedGlyph>, f64) {
        let provider = self.font.family.provider();
        let mut glyphs = Vec::with_capacity(self.text.len());
        let mut pen = 0.0;
        for run in split_runs(&self.text) {
            let kerns = run_kerning(provider, run.text, run.encodable);
            for (ch, kern) in run.text.chars().zip(kerns) {
                pen += kern;
                glyphs.push(PlacedGlyph { ch, x: pen });
                pen += provider.advance(ch);
            }
        }
        (glyphs, pen)
    }

    /// Advance box in local space: origin to advance, ascent to descent.
    pub fn local_bounds(&self) -> Rect {
        let metrics = self.font.family.provider().metrics();
        let s = self.font.scale();
        let origin = self.origin();
        let (_, advance) = self.layout();
        Rect::new(
            origin.x,
            origin.y - metrics.ascent * s,
            origin.x + advance * s,
            origin.y - metrics.descent * s,
        )
    }
}

/// Kerning applied before each character of a run, in 1/1000 em.
///
/// The first entry is always zero; glyph-indexed runs are never kerned.
pub fn run_kerning(provider: &dyn FontProvider, text: &str, encodable: bool) -> Vec<f64> {
    let mut kerns = Vec::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        let kern = match prev {
            Some(left) if encodable => provider.kerning(left, ch),
            _ => 0.0,
        };
        kerns.push(kern);
        prev = Some(ch);
    }
    kerns
}
