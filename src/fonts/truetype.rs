//! TrueType/OpenType faces backed by `ttf-parser`.
//!
//! The face is embedded whole and glyphs keep their original indices, so the
//! "subset" handed to the embedder is the full program plus the glyph map for
//! the requested characters.

use std::collections::HashMap;
use std::sync::Arc;

use ttf_parser::{Face, GlyphId, OutlineBuilder};

use super::provider::{FaceMetrics, FontProgramKind, FontProvider, FontSubset};
use crate::elements::Segment;
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};

/// Parsed TrueType/OpenType face that owns its bytes.
#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    data: Arc<Vec<u8>>,
    postscript_name: String,
    units_per_em: f64,
    metrics: FaceMetrics,
    kind: FontProgramKind,
    /// Unicode scalar value -> glyph id, for the BMP
    unicode_to_glyph: HashMap<u32, u16>,
    /// Glyph id -> advance in 1/1000 em
    glyph_widths: Vec<f64>,
}

impl TrueTypeFont {
    /// Parse a face from raw TTF/OTF bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Font("font file is empty".to_string()));
        }
        let face = Face::parse(&data, 0).map_err(|e| Error::Font(e.to_string()))?;

        let units_per_em = f64::from(face.units_per_em());
        let to_pdf = |v: i16| f64::from(v) * 1000.0 / units_per_em;

        let postscript_name = face
            .names()
            .into_iter()
            .find(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|name| name.to_string())
            .map(|name| name.chars().filter(|c| !c.is_whitespace()).collect())
            .unwrap_or_else(|| "EmbeddedFont".to_string());

        let bbox = face.global_bounding_box();
        let metrics = FaceMetrics {
            ascent: to_pdf(face.ascender()),
            descent: to_pdf(face.descender()),
            cap_height: to_pdf(face.capital_height().unwrap_or(face.ascender())),
            italic_angle: f64::from(face.italic_angle().unwrap_or(0.0)),
            bbox: Rect::new(
                to_pdf(bbox.x_min),
                to_pdf(bbox.y_min),
                to_pdf(bbox.x_max),
                to_pdf(bbox.y_max),
            ),
            fixed_pitch: face.is_monospaced(),
            serif: false,
            italic: face.is_italic(),
            bold: face.is_bold(),
        };

        let kind = if face.tables().cff.is_some() {
            FontProgramKind::OpenType
        } else {
            FontProgramKind::TrueType
        };

        let mut unicode_to_glyph = HashMap::new();
        for codepoint in 0..=0xFFFF_u32 {
            if let Some(ch) = char::from_u32(codepoint) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    unicode_to_glyph.insert(codepoint, glyph_id.0);
                }
            }
        }

        let glyph_widths = (0..face.number_of_glyphs())
            .map(|gid| {
                let advance = face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0);
                f64::from(advance) * 1000.0 / units_per_em
            })
            .collect();

        log::debug!(
            "Parsed font '{}' ({} glyphs, {:?})",
            postscript_name,
            face.number_of_glyphs(),
            kind
        );

        Ok(Self {
            postscript_name,
            units_per_em,
            metrics,
            kind,
            unicode_to_glyph,
            glyph_widths,
            data: Arc::new(data),
        })
    }

    /// Raw font program bytes.
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /// Glyph id for a character.
    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        if let Some(gid) = self.unicode_to_glyph.get(&(ch as u32)) {
            return Some(*gid);
        }
        // Astral characters are not cached
        if (ch as u32) > 0xFFFF {
            return self.face().and_then(|face| face.glyph_index(ch)).map(|g| g.0);
        }
        None
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }
}

impl FontProvider for TrueTypeFont {
    fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    fn metrics(&self) -> &FaceMetrics {
        &self.metrics
    }

    fn advance(&self, ch: char) -> f64 {
        self.glyph_id(ch)
            .and_then(|gid| self.glyph_widths.get(gid as usize).copied())
            .unwrap_or(500.0)
    }

    fn kerning(&self, left: char, right: char) -> f64 {
        let (Some(l), Some(r)) = (self.glyph_id(left), self.glyph_id(right)) else {
            return 0.0;
        };
        let Some(face) = self.face() else {
            return 0.0;
        };
        if let Some(kern) = face.tables().kern {
            for subtable in kern.subtables {
                if !subtable.horizontal || subtable.variable {
                    continue;
                }
                if let Some(k) = subtable.glyphs_kerning(GlyphId(l), GlyphId(r)) {
                    return f64::from(k) * 1000.0 / self.units_per_em;
                }
            }
        }
        0.0
    }

    fn outline(&self, ch: char) -> Option<Vec<Segment>> {
        let gid = self.glyph_id(ch)?;
        let face = self.face()?;
        let mut builder = SegmentBuilder {
            scale: 1000.0 / self.units_per_em,
            current: Point::default(),
            segments: Vec::new(),
        };
        // Blank glyphs (spaces) have no outline but are valid
        if face.outline_glyph(GlyphId(gid), &mut builder).is_none() {
            return Some(Vec::new());
        }
        Some(builder.segments)
    }

    fn subset(&self, chars: &[char]) -> Result<FontSubset> {
        let mut glyphs = HashMap::with_capacity(chars.len());
        for &ch in chars {
            let gid = self.glyph_id(ch).ok_or_else(|| Error::GlyphNotFound {
                font: self.postscript_name.clone(),
                codepoint: ch as u32,
            })?;
            glyphs.insert(ch, gid);
        }
        Ok(FontSubset {
            program: self.data.as_ref().clone(),
            kind: self.kind,
            glyphs,
        })
    }
}

/// Collects a glyph outline as path segments in 1/1000 em.
struct SegmentBuilder {
    scale: f64,
    current: Point,
    segments: Vec<Segment>,
}

impl SegmentBuilder {
    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(f64::from(x) * self.scale, f64::from(y) * self.scale)
    }
}

impl OutlineBuilder for SegmentBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.current = self.point(x, y);
        self.segments.push(Segment::MoveTo(self.current));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.current = self.point(x, y);
        self.segments.push(Segment::LineTo(self.current));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        // Degree elevation: control points sit 2/3 of the way to the quad's control point
        let q = self.point(x1, y1);
        let end = self.point(x, y);
        let p0 = self.current;
        let c1 = Point::new(p0.x + 2.0 / 3.0 * (q.x - p0.x), p0.y + 2.0 / 3.0 * (q.y - p0.y));
        let c2 = Point::new(end.x + 2.0 / 3.0 * (q.x - end.x), end.y + 2.0 / 3.0 * (q.y - end.y));
        self.segments.push(Segment::CubicTo(c1, c2, end));
        self.current = end;
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let c1 = self.point(x1, y1);
        let c2 = self.point(x2, y2);
        self.current = self.point(x, y);
        self.segments.push(Segment::CubicTo(c1, c2, self.current));
    }

    fn close(&mut self) {
        self.segments.push(Segment::Close);
    }
}
