//! Content stream generation.
//!
//! [`ContentStreamBuilder`] collects operators and writes them according
//! to ISO 32000-1:2008 Sections 8-9. [`generate_page`] replays a page's
//! figures through it, tracking the transform with the same
//! [`TransformState`] the bounds pass uses, and records every gradient
//! use so the shading pass can build pattern `/P{i}` and soft mask
//! `/S{i}` for slot `i`.

use super::bounds::{page_flip, TransformState};
use super::discovery::DiscoveredResources;
use super::font_embedder::EmbeddedFamily;
use super::object_serializer::{format_real, write_name};
use crate::config::TextMode;
use crate::elements::{
    run_kerning, Color, FillRule, Figure, Gradient, ImageFigure, LineCap, LineJoin, LineStyle,
    MarkerKind, OptionalContentMarker, Page, Paint, PathFigure, Segment, TextFigure,
    TransformKind,
};
use crate::error::{Error, Result};
use crate::fonts::encoding::{encode_char, encode_str, split_runs};
use crate::geometry::{Matrix, Rect};
use indexmap::IndexSet;
use std::io::Write;

/// Operations that can be added to a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Concatenate matrix (cm)
    Transform([f64; 6]),
    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,
    /// Set font and size (Tf)
    SetFont(String, f64),
    /// Set text matrix (Tm)
    SetTextMatrix([f64; 6]),
    /// Set text rendering mode (Tr)
    SetTextRenderMode(u8),
    /// Show single-byte text (Tj)
    ShowText(Vec<u8>),
    /// Show two-byte glyph indices as a hex string (Tj)
    ShowHexText(Vec<u16>),
    /// Show text with positioning (TJ)
    ShowTextArray(Vec<TextArrayItem>),
    /// Set fill color RGB (rg)
    SetFillColorRGB(f64, f64, f64),
    /// Set stroke color RGB (RG)
    SetStrokeColorRGB(f64, f64, f64),
    /// Set line width (w)
    SetLineWidth(f64),
    /// Set line cap style (J)
    SetLineCap(LineCap),
    /// Set line join style (j)
    SetLineJoin(LineJoin),
    /// Set miter limit (M)
    SetMiterLimit(f64),
    /// Set dash pattern (d)
    SetDashPattern(Vec<f64>, f64),
    /// Move to (m)
    MoveTo(f64, f64),
    /// Line to (l)
    LineTo(f64, f64),
    /// Curve to (c)
    CurveTo(f64, f64, f64, f64, f64, f64),
    /// Rectangle (re)
    Rectangle(f64, f64, f64, f64),
    /// Close path (h)
    ClosePath,
    /// Stroke (S)
    Stroke,
    /// Fill (f)
    Fill,
    /// Fill using even-odd rule (f*)
    FillEvenOdd,
    /// Fill and stroke (B)
    FillStroke,
    /// Fill and stroke using even-odd rule (B*)
    FillStrokeEvenOdd,
    /// End path without filling/stroking (n)
    EndPath,
    /// Clip using non-zero winding rule (W)
    Clip,
    /// Clip using even-odd rule (W*)
    ClipEvenOdd,
    /// Paint XObject (Do)
    PaintXObject(String),
    /// Set graphics state from ExtGState dictionary (gs)
    SetExtGState(String),
    /// Set fill color space (cs)
    SetFillColorSpace(String),
    /// Set stroke color space (CS)
    SetStrokeColorSpace(String),
    /// Set fill pattern (scn)
    SetFillPattern(String),
    /// Set stroke pattern (SCN)
    SetStrokePattern(String),
    /// Paint shading (sh)
    PaintShading(String),
    /// Begin optional content (BDC with /OC)
    BeginOptionalContent(String),
    /// End marked content (EMC)
    EndMarkedContent,
}

/// Item in a TJ array (text or positioning adjustment).
#[derive(Debug, Clone, PartialEq)]
pub enum TextArrayItem {
    /// Single-byte encoded text
    Text(Vec<u8>),
    /// Positioning adjustment in 1/1000 em (positive moves left)
    Adjustment(f64),
}

/// Builder for content streams.
#[derive(Debug, Default)]
pub struct ContentStreamBuilder {
    operations: Vec<ContentStreamOp>,
}

impl ContentStreamBuilder {
    /// Create a new content stream builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation to the stream.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Add multiple operations.
    pub fn ops(&mut self, ops: impl IntoIterator<Item = ContentStreamOp>) -> &mut Self {
        self.operations.extend(ops);
        self
    }

    /// Operations added so far.
    pub fn operations(&self) -> &[ContentStreamOp] {
        &self.operations
    }

    /// Save graphics state.
    pub fn save_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::SaveState)
    }

    /// Restore graphics state.
    pub fn restore_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::RestoreState)
    }

    /// Concatenate a matrix.
    pub fn transform(&mut self, m: &Matrix) -> &mut Self {
        self.op(ContentStreamOp::Transform(m.to_array()))
    }

    /// Select a named graphics state.
    pub fn set_ext_gstate(&mut self, name: &str) -> &mut Self {
        self.op(ContentStreamOp::SetExtGState(name.to_string()))
    }

    /// Set an RGB fill color.
    pub fn fill_color(&mut self, color: Color) -> &mut Self {
        self.op(ContentStreamOp::SetFillColorRGB(color.r, color.g, color.b))
    }

    /// Set an RGB stroke color.
    pub fn stroke_color(&mut self, color: Color) -> &mut Self {
        self.op(ContentStreamOp::SetStrokeColorRGB(color.r, color.g, color.b))
    }

    /// Set width, cap, join, miter limit and dash.
    pub fn line_style(&mut self, style: &LineStyle) -> &mut Self {
        self.op(ContentStreamOp::SetLineWidth(style.width))
            .op(ContentStreamOp::SetLineCap(style.cap))
            .op(ContentStreamOp::SetLineJoin(style.join))
            .op(ContentStreamOp::SetMiterLimit(style.miter_limit));
        if let Some(dash) = &style.dash {
            self.op(ContentStreamOp::SetDashPattern(dash.array.clone(), dash.phase));
        }
        self
    }

    /// Append path construction operators.
    pub fn path(&mut self, segments: &[Segment]) -> &mut Self {
        for segment in segments {
            let op = match *segment {
                Segment::MoveTo(p) => ContentStreamOp::MoveTo(p.x, p.y),
                Segment::LineTo(p) => ContentStreamOp::LineTo(p.x, p.y),
                Segment::CubicTo(c1, c2, p) => {
                    ContentStreamOp::CurveTo(c1.x, c1.y, c2.x, c2.y, p.x, p.y)
                },
                Segment::Close => ContentStreamOp::ClosePath,
            };
            self.op(op);
        }
        self
    }

    /// Rectangle subpath.
    pub fn rect(&mut self, rect: &Rect) -> &mut Self {
        self.op(ContentStreamOp::Rectangle(rect.x0, rect.y0, rect.width(), rect.height()))
    }

    /// Build the content stream to bytes.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        for op in &self.operations {
            self.write_op(&mut buf, op)?;
            writeln!(buf)?;
        }

        Ok(buf)
    }

    /// Write a single operation to the buffer.
    fn write_op<W: Write>(&self, w: &mut W, op: &ContentStreamOp) -> std::io::Result<()> {
        match op {
            ContentStreamOp::SaveState => write!(w, "q"),
            ContentStreamOp::RestoreState => write!(w, "Q"),
            ContentStreamOp::Transform(m) => {
                write_numbers(w, m)?;
                write!(w, "cm")
            },
            ContentStreamOp::BeginText => write!(w, "BT"),
            ContentStreamOp::EndText => write!(w, "ET"),
            ContentStreamOp::SetFont(name, size) => {
                write_name(w, name)?;
                write!(w, " {} Tf", format_real(*size))
            },
            ContentStreamOp::SetTextMatrix(m) => {
                write_numbers(w, m)?;
                write!(w, "Tm")
            },
            ContentStreamOp::SetTextRenderMode(mode) => write!(w, "{} Tr", mode),
            ContentStreamOp::ShowText(bytes) => {
                write!(w, "(")?;
                write_escaped_bytes(w, bytes)?;
                write!(w, ") Tj")
            },
            ContentStreamOp::ShowHexText(glyphs) => {
                write!(w, "<")?;
                for gid in glyphs {
                    write!(w, "{:04X}", gid)?;
                }
                write!(w, "> Tj")
            },
            ContentStreamOp::ShowTextArray(items) => {
                write!(w, "[")?;
                for item in items {
                    match item {
                        TextArrayItem::Text(bytes) => {
                            write!(w, "(")?;
                            write_escaped_bytes(w, bytes)?;
                            write!(w, ")")?;
                        },
                        TextArrayItem::Adjustment(adj) => {
                            write!(w, "{}", format_real(*adj))?;
                        },
                    }
                    write!(w, " ")?;
                }
                write!(w, "] TJ")
            },
            ContentStreamOp::SetFillColorRGB(r, g, b) => {
                write_numbers(w, &[*r, *g, *b])?;
                write!(w, "rg")
            },
            ContentStreamOp::SetStrokeColorRGB(r, g, b) => {
                write_numbers(w, &[*r, *g, *b])?;
                write!(w, "RG")
            },
            ContentStreamOp::SetLineWidth(width) => write!(w, "{} w", format_real(*width)),
            ContentStreamOp::SetLineCap(cap) => write!(w, "{} J", *cap as u8),
            ContentStreamOp::SetLineJoin(join) => write!(w, "{} j", *join as u8),
            ContentStreamOp::SetMiterLimit(limit) => write!(w, "{} M", format_real(*limit)),
            ContentStreamOp::SetDashPattern(pattern, phase) => {
                write!(w, "[")?;
                for (i, p) in pattern.iter().enumerate() {
                    if i > 0 {
                        write!(w, " ")?;
                    }
                    write!(w, "{}", format_real(*p))?;
                }
                write!(w, "] {} d", format_real(*phase))
            },
            ContentStreamOp::MoveTo(x, y) => {
                write_numbers(w, &[*x, *y])?;
                write!(w, "m")
            },
            ContentStreamOp::LineTo(x, y) => {
                write_numbers(w, &[*x, *y])?;
                write!(w, "l")
            },
            ContentStreamOp::CurveTo(x1, y1, x2, y2, x3, y3) => {
                write_numbers(w, &[*x1, *y1, *x2, *y2, *x3, *y3])?;
                write!(w, "c")
            },
            ContentStreamOp::Rectangle(x, y, w_val, h) => {
                write_numbers(w, &[*x, *y, *w_val, *h])?;
                write!(w, "re")
            },
            ContentStreamOp::ClosePath => write!(w, "h"),
            ContentStreamOp::Stroke => write!(w, "S"),
            ContentStreamOp::Fill => write!(w, "f"),
            ContentStreamOp::FillEvenOdd => write!(w, "f*"),
            ContentStreamOp::FillStroke => write!(w, "B"),
            ContentStreamOp::FillStrokeEvenOdd => write!(w, "B*"),
            ContentStreamOp::EndPath => write!(w, "n"),
            ContentStreamOp::Clip => write!(w, "W"),
            ContentStreamOp::ClipEvenOdd => write!(w, "W*"),
            ContentStreamOp::PaintXObject(name) => {
                write_name(w, name)?;
                write!(w, " Do")
            },
            ContentStreamOp::SetExtGState(name) => {
                write_name(w, name)?;
                write!(w, " gs")
            },
            ContentStreamOp::SetFillColorSpace(name) => {
                write_name(w, name)?;
                write!(w, " cs")
            },
            ContentStreamOp::SetStrokeColorSpace(name) => {
                write_name(w, name)?;
                write!(w, " CS")
            },
            ContentStreamOp::SetFillPattern(name) => {
                write_name(w, name)?;
                write!(w, " scn")
            },
            ContentStreamOp::SetStrokePattern(name) => {
                write_name(w, name)?;
                write!(w, " SCN")
            },
            ContentStreamOp::PaintShading(name) => {
                write_name(w, name)?;
                write!(w, " sh")
            },
            ContentStreamOp::BeginOptionalContent(name) => {
                write!(w, "/OC ")?;
                write_name(w, name)?;
                write!(w, " BDC")
            },
            ContentStreamOp::EndMarkedContent => write!(w, "EMC"),
        }
    }
}

/// Write each number followed by a space.
fn write_numbers<W: Write>(w: &mut W, values: &[f64]) -> std::io::Result<()> {
    for v in values {
        write!(w, "{} ", format_real(*v))?;
    }
    Ok(())
}

fn write_escaped_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> std::io::Result<()> {
    for &byte in bytes {
        match byte {
            b'(' => write!(w, "\\(")?,
            b')' => write!(w, "\\)")?,
            b'\\' => write!(w, "\\\\")?,
            b'\n' => write!(w, "\\n")?,
            b'\r' => write!(w, "\\r")?,
            b'\t' => write!(w, "\\t")?,
            _ => w.write_all(&[byte])?,
        }
    }
    Ok(())
}

/// Resource name of alpha state `i`.
pub fn alpha_name(i: usize) -> String {
    format!("A{}", i)
}

/// Resource name of family `i`'s single-byte font.
pub fn simple_font_name(i: usize) -> String {
    format!("F{}", i)
}

/// Resource name of family `i`'s glyph-indexed font.
pub fn composite_font_name(i: usize) -> String {
    format!("U{}", i)
}

/// Resource name of image `i`.
pub fn image_name(i: usize) -> String {
    format!("Im{}", i)
}

/// Resource name of the pattern for gradient usage `i` on a page.
pub fn pattern_name(i: usize) -> String {
    format!("P{}", i)
}

/// Resource name of the soft mask state for gradient usage `i` on a page.
pub fn soft_mask_name(i: usize) -> String {
    format!("S{}", i)
}

/// Resource name of optional-content group expression `i`.
pub fn group_name(i: usize) -> String {
    format!("OC{}", i)
}

/// A gradient painted somewhere on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientUsage {
    /// The gradient, in the owner's local space
    pub gradient: Gradient,
    /// Current transform where the gradient was used
    pub matrix: Matrix,
    /// Local-space box the owner paints, stroke included
    pub bounds: Rect,
}

/// Document-level resource indices a page refers to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsedResources {
    /// Alpha states
    pub alphas: IndexSet<usize>,
    /// Families shown through their single-byte font
    pub simple_fonts: IndexSet<usize>,
    /// Families shown through their glyph-indexed font
    pub composite_fonts: IndexSet<usize>,
    /// Images
    pub images: IndexSet<usize>,
    /// Optional-content group expressions
    pub groups: IndexSet<usize>,
}

/// Output of content generation for one page.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Uncompressed content stream
    pub content: Vec<u8>,
    /// Gradient uses in emission order; slot `i` is `/P{i}` and `/S{i}`
    pub gradients: Vec<GradientUsage>,
    /// Resources referenced by the content
    pub used: UsedResources,
}

/// Document-wide inputs to content generation.
#[derive(Debug, Clone, Copy)]
pub struct CodegenContext<'a> {
    /// Discovered resources
    pub resources: &'a DiscoveredResources,
    /// Embedded fonts, aligned with `resources.families`
    pub fonts: &'a [EmbeddedFamily],
    /// How text is written
    pub text_mode: TextMode,
}

#[derive(Debug, Clone, Copy)]
enum PaintPass<'p> {
    Fill(&'p Paint),
    Stroke(&'p Paint),
    Both(Color, Color),
}

/// One combined pass when both paints are solid with equal alpha,
/// otherwise a fill pass then a stroke pass.
fn plan_passes<'p>(fill: Option<&'p Paint>, stroke: Option<&'p Paint>) -> Vec<PaintPass<'p>> {
    match (fill, stroke) {
        (Some(Paint::Solid(f)), Some(Paint::Solid(s))) if f.a == s.a => {
            vec![PaintPass::Both(*f, *s)]
        },
        (fill, stroke) => fill
            .map(PaintPass::Fill)
            .into_iter()
            .chain(stroke.map(PaintPass::Stroke))
            .collect(),
    }
}

/// Generate the content stream of one page.
pub fn generate_page(
    page: &Page,
    page_index: usize,
    ctx: &CodegenContext<'_>,
) -> Result<PageContent> {
    let mut codegen = PageCodegen {
        ctx,
        page_index,
        builder: ContentStreamBuilder::new(),
        state: TransformState::new(page.height),
        gradients: Vec::new(),
        used: UsedResources::default(),
    };

    codegen.builder.transform(&page_flip(page.height));
    if let Some(background) = page.background {
        codegen.background(page, background)?;
    }
    for figure in &page.figures {
        codegen.figure(figure)?;
    }
    codegen.state.finish(page_index)?;

    log::debug!(
        "Page {}: {} operators, {} gradient usage(s)",
        page_index,
        codegen.builder.operations().len(),
        codegen.gradients.len()
    );
    Ok(PageContent {
        content: codegen.builder.build()?,
        gradients: codegen.gradients,
        used: codegen.used,
    })
}

struct PageCodegen<'a> {
    ctx: &'a CodegenContext<'a>,
    page_index: usize,
    builder: ContentStreamBuilder,
    state: TransformState,
    gradients: Vec<GradientUsage>,
    used: UsedResources,
}

impl PageCodegen<'_> {
    fn figure(&mut self, figure: &Figure) -> Result<()> {
        match figure {
            Figure::Transform(t) => {
                self.state.apply(t, self.page_index)?;
                match t.kind {
                    TransformKind::Apply(m) => self.builder.transform(&m),
                    TransformKind::Save => self.builder.save_state(),
                    TransformKind::Restore => self.builder.restore_state(),
                };
                Ok(())
            },
            Figure::Path(path) => self.path(path),
            Figure::Text(text) => match self.ctx.text_mode {
                TextMode::SubsetAndEmbed => self.text(text),
                TextMode::ConvertTextToPaths => self.text_as_path(text),
            },
            Figure::Image(image) => self.image(image),
            Figure::OptionalContent(marker) => self.optional_content(marker),
            Figure::Filtered(filtered) => Err(Error::InvalidStructure(format!(
                "filtered figure '{}' reached content generation unflattened",
                filtered.filter.name
            ))),
        }
    }

    fn alpha(&mut self, alpha: f64) -> Result<String> {
        let index = self.ctx.resources.alpha_index(alpha).ok_or_else(|| {
            Error::ResourceLookup(format!("alpha value {} was not discovered", alpha))
        })?;
        self.used.alphas.insert(index);
        Ok(alpha_name(index))
    }

    /// Select a paint for filling or stroking. Gradients register a usage
    /// slot; non-opaque ones also select the slot's soft mask.
    fn set_paint(&mut self, paint: &Paint, stroke: bool, owner_bounds: Rect) -> Result<()> {
        match paint {
            Paint::Solid(color) => {
                let alpha = self.alpha(color.a)?;
                self.builder.set_ext_gstate(&alpha);
                if stroke {
                    self.builder.stroke_color(*color);
                } else {
                    self.builder.fill_color(*color);
                }
            },
            Paint::Gradient(gradient) => {
                if gradient.stops.is_empty() {
                    return Err(Error::InvalidStructure("gradient has no color stops".to_string()));
                }
                let index = self.gradients.len();
                self.gradients.push(GradientUsage {
                    gradient: gradient.clone(),
                    matrix: self.state.current(),
                    bounds: owner_bounds,
                });
                if !gradient.is_opaque() {
                    self.builder.set_ext_gstate(&soft_mask_name(index));
                }
                let opaque = self.alpha(1.0)?;
                self.builder.set_ext_gstate(&opaque);
                if stroke {
                    self.builder
                        .op(ContentStreamOp::SetStrokeColorSpace("Pattern".to_string()))
                        .op(ContentStreamOp::SetStrokePattern(pattern_name(index)));
                } else {
                    self.builder
                        .op(ContentStreamOp::SetFillColorSpace("Pattern".to_string()))
                        .op(ContentStreamOp::SetFillPattern(pattern_name(index)));
                }
            },
        }
        Ok(())
    }

    fn background(&mut self, page: &Page, color: Color) -> Result<()> {
        let alpha = self.alpha(color.a)?;
        self.builder
            .save_state()
            .set_ext_gstate(&alpha)
            .fill_color(color)
            .rect(&Rect::new(0.0, 0.0, page.width, page.height))
            .op(ContentStreamOp::Fill)
            .restore_state();
        Ok(())
    }

    fn path(&mut self, path: &PathFigure) -> Result<()> {
        if path.is_clipping {
            self.builder.path(&path.segments).op(match path.fill_rule {
                FillRule::NonZero => ContentStreamOp::Clip,
                FillRule::EvenOdd => ContentStreamOp::ClipEvenOdd,
            });
            self.builder.op(ContentStreamOp::EndPath);
            return Ok(());
        }

        let bounds = path.painted_bounds();
        for pass in plan_passes(path.fill.as_ref(), path.stroke.as_ref()) {
            self.builder.save_state();
            let paint_op = match pass {
                PaintPass::Fill(paint) => {
                    self.set_paint(paint, false, bounds)?;
                    match path.fill_rule {
                        FillRule::NonZero => ContentStreamOp::Fill,
                        FillRule::EvenOdd => ContentStreamOp::FillEvenOdd,
                    }
                },
                PaintPass::Stroke(paint) => {
                    self.set_paint(paint, true, bounds)?;
                    self.builder.line_style(&path.line_style);
                    ContentStreamOp::Stroke
                },
                PaintPass::Both(fill, stroke) => {
                    let alpha = self.alpha(fill.a)?;
                    self.builder
                        .set_ext_gstate(&alpha)
                        .fill_color(fill)
                        .stroke_color(stroke)
                        .line_style(&path.line_style);
                    match path.fill_rule {
                        FillRule::NonZero => ContentStreamOp::FillStroke,
                        FillRule::EvenOdd => ContentStreamOp::FillStrokeEvenOdd,
                    }
                },
            };
            self.builder.path(&path.segments).op(paint_op).restore_state();
        }
        Ok(())
    }

    fn text(&mut self, text: &TextFigure) -> Result<()> {
        let mut bounds = text.local_bounds();
        if text.stroke.is_some() {
            bounds = bounds.inflate(text.line_style.width / 2.0);
        }

        let passes = plan_passes(text.fill.as_ref(), text.stroke.as_ref());
        if passes.is_empty() {
            // Invisible text keeps its fonts referenced
            self.builder.save_state();
            self.show_text(text, 3)?;
            self.builder.restore_state();
            return Ok(());
        }

        for pass in passes {
            self.builder.save_state();
            let mode = match pass {
                PaintPass::Fill(paint) => {
                    self.set_paint(paint, false, bounds)?;
                    0
                },
                PaintPass::Stroke(paint) => {
                    self.set_paint(paint, true, bounds)?;
                    self.builder.line_style(&text.line_style);
                    1
                },
                PaintPass::Both(fill, stroke) => {
                    let alpha = self.alpha(fill.a)?;
                    self.builder
                        .set_ext_gstate(&alpha)
                        .fill_color(fill)
                        .stroke_color(stroke)
                        .line_style(&text.line_style);
                    2
                },
            };
            self.show_text(text, mode)?;
            self.builder.restore_state();
        }
        Ok(())
    }

    /// Text object showing every run of `text` with render mode `mode`.
    fn show_text(&mut self, text: &TextFigure, mode: u8) -> Result<()> {
        let family = &text.font.family;
        let provider = family.provider();
        let family_index = self.ctx.resources.family_index(family).ok_or_else(|| {
            Error::ResourceLookup(format!("font family '{}' was not discovered", family.key()))
        })?;
        let embedded = self.ctx.fonts.get(family_index).ok_or_else(|| {
            Error::ResourceLookup(format!("font family '{}' was not embedded", family.key()))
        })?;

        let s = text.font.scale();
        let origin = text.origin();
        let (glyphs, _) = text.layout();

        self.builder
            .op(ContentStreamOp::BeginText)
            .op(ContentStreamOp::SetTextRenderMode(mode));

        let mut index = 0;
        for run in split_runs(&text.text) {
            let start = glyphs.get(index).map_or(0.0, |g| g.x);
            index += run.text.chars().count();
            let x = origin.x + start * s;

            let name = if run.encodable {
                embedded.simple.ok_or_else(|| missing_font(family.key(), "single-byte"))?;
                self.used.simple_fonts.insert(family_index);
                simple_font_name(family_index)
            } else {
                embedded.composite.ok_or_else(|| missing_font(family.key(), "glyph-indexed"))?;
                self.used.composite_fonts.insert(family_index);
                composite_font_name(family_index)
            };
            self.builder
                .op(ContentStreamOp::SetFont(name, text.font.size))
                .op(ContentStreamOp::SetTextMatrix([1.0, 0.0, 0.0, -1.0, x, origin.y]));

            if run.encodable {
                let kerns = run_kerning(provider, run.text, true);
                if kerns.iter().any(|k| *k != 0.0) {
                    let mut items = Vec::new();
                    let mut chunk = Vec::new();
                    for (ch, kern) in run.text.chars().zip(kerns) {
                        if kern != 0.0 {
                            if !chunk.is_empty() {
                                items.push(TextArrayItem::Text(std::mem::take(&mut chunk)));
                            }
                            items.push(TextArrayItem::Adjustment(-kern));
                        }
                        chunk.extend(encode_char(ch));
                    }
                    if !chunk.is_empty() {
                        items.push(TextArrayItem::Text(chunk));
                    }
                    self.builder.op(ContentStreamOp::ShowTextArray(items));
                } else {
                    self.builder.op(ContentStreamOp::ShowText(encode_str(run.text)));
                }
            } else {
                let gids = run
                    .text
                    .chars()
                    .map(|ch| {
                        embedded.glyph(ch).ok_or_else(|| Error::GlyphNotFound {
                            font: provider.postscript_name().to_string(),
                            codepoint: ch as u32,
                        })
                    })
                    .collect::<Result<Vec<u16>>>()?;
                self.builder.op(ContentStreamOp::ShowHexText(gids));
            }
        }
        self.builder.op(ContentStreamOp::EndText);
        Ok(())
    }

    /// Draw text as glyph outlines placed at the layout's pen positions.
    fn text_as_path(&mut self, text: &TextFigure) -> Result<()> {
        let provider = text.font.family.provider();
        let s = text.font.scale();
        let origin = text.origin();
        let (glyphs, _) = text.layout();

        let mut segments = Vec::new();
        for glyph in glyphs {
            let outline = provider.outline(glyph.ch).ok_or_else(|| Error::GlyphNotFound {
                font: provider.postscript_name().to_string(),
                codepoint: glyph.ch as u32,
            })?;
            // Glyph space is y-up; the page space is y-down
            let placement = Matrix::new(s, 0.0, 0.0, -s, origin.x + glyph.x * s, origin.y);
            segments.extend(outline.iter().map(|seg| seg.transformed(&placement)));
        }

        let mut path = PathFigure::new(segments);
        path.fill = text.fill.clone();
        path.stroke = text.stroke.clone();
        path.line_style = text.line_style.clone();
        path.tag = text.tag.clone();
        self.path(&path)
    }

    fn image(&mut self, figure: &ImageFigure) -> Result<()> {
        let index = self
            .ctx
            .resources
            .image_index(&figure.image)
            .ok_or_else(|| Error::ResourceLookup("image was not discovered".to_string()))?;
        self.used.images.insert(index);
        let opaque = self.alpha(1.0)?;
        self.builder
            .save_state()
            .set_ext_gstate(&opaque)
            // Row 0 at the top of the unit square
            .transform(&Matrix::new(1.0, 0.0, 0.0, -1.0, 0.0, 1.0))
            .op(ContentStreamOp::PaintXObject(image_name(index)))
            .restore_state();
        Ok(())
    }

    fn optional_content(&mut self, marker: &OptionalContentMarker) -> Result<()> {
        match marker.kind {
            MarkerKind::Start => {
                let index = self.ctx.resources.group_index(&marker.group).ok_or_else(|| {
                    Error::ResourceLookup(format!(
                        "optional content group '{}' was not discovered",
                        marker.group
                    ))
                })?;
                self.used.groups.insert(index);
                self.builder.op(ContentStreamOp::BeginOptionalContent(group_name(index)));
            },
            MarkerKind::End => {
                self.builder.op(ContentStreamOp::EndMarkedContent);
            },
        }
        Ok(())
    }
}

fn missing_font(family: &str, kind: &str) -> Error {
    Error::ResourceLookup(format!("font family '{}' has no {} font", family, kind))
}
