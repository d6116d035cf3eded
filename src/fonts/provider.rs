//! Glyph, metrics and subsetting capability consumed by the compiler.
//!
//! All lengths are in glyph space units of 1/1000 em, the unit PDF font
//! dictionaries use, with y pointing up.

use crate::elements::Segment;
use crate::error::Result;
use crate::geometry::Rect;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Face-wide metrics, in 1/1000 em.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceMetrics {
    /// Ascent above the baseline (positive)
    pub ascent: f64,
    /// Descent below the baseline (negative)
    pub descent: f64,
    /// Height of capital letters
    pub cap_height: f64,
    /// Italic angle in degrees, counter-clockwise from vertical
    pub italic_angle: f64,
    /// Union of all glyph bounding boxes
    pub bbox: Rect,
    /// All glyphs have the same advance
    pub fixed_pitch: bool,
    /// Glyphs have serifs
    pub serif: bool,
    /// Face is italic or oblique
    pub italic: bool,
    /// Face is bold (drives the stem width placeholder)
    pub bold: bool,
}

/// Container format of an embedded font program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontProgramKind {
    /// glyf-based TrueType, embedded as `/FontFile2`
    TrueType,
    /// CFF-based OpenType, embedded as `/FontFile3` with `/Subtype /OpenType`
    OpenType,
}

/// Result of subsetting a face to the characters a document uses.
#[derive(Debug, Clone)]
pub struct FontSubset {
    /// Font program bytes
    pub program: Vec<u8>,
    /// Program container format
    pub kind: FontProgramKind,
    /// Glyph index of every requested character inside `program`
    pub glyphs: HashMap<char, u16>,
}

impl FontSubset {
    /// Glyph index for a character that was part of the request.
    pub fn glyph(&self, ch: char) -> Option<u16> {
        self.glyphs.get(&ch).copied()
    }
}

/// External source of glyph metrics, outlines and font programs.
pub trait FontProvider: fmt::Debug + Send + Sync {
    /// PostScript name of the face.
    fn postscript_name(&self) -> &str;

    /// Standard 14 name, for faces every viewer ships.
    ///
    /// Text in such a face that fits the single-byte table is not embedded.
    fn builtin_name(&self) -> Option<&str> {
        None
    }

    /// Face-wide metrics.
    fn metrics(&self) -> &FaceMetrics;

    /// Horizontal advance of a character.
    fn advance(&self, ch: char) -> f64;

    /// Kerning adjustment between two consecutive characters (negative tightens).
    fn kerning(&self, _left: char, _right: char) -> f64 {
        0.0
    }

    /// Outline of a character's glyph, origin on the baseline.
    fn outline(&self, _ch: char) -> Option<Vec<Segment>> {
        None
    }

    /// Produce a font program containing at least the given characters.
    ///
    /// A character without a glyph is a [`GlyphNotFound`](crate::Error::GlyphNotFound) error.
    fn subset(&self, chars: &[char]) -> Result<FontSubset>;
}

/// A font face identified by the file it came from.
///
/// Two families with the same key are the same family, however many
/// `Arc`s point at them.
#[derive(Debug, Clone)]
pub struct FontFamily {
    key: String,
    provider: Arc<dyn FontProvider>,
}

impl FontFamily {
    /// Create a family from its file identity and provider.
    pub fn new(key: impl Into<String>, provider: Arc<dyn FontProvider>) -> Self {
        Self {
            key: key.into(),
            provider,
        }
    }

    /// File identity of the family.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Metrics and glyph provider.
    pub fn provider(&self) -> &dyn FontProvider {
        self.provider.as_ref()
    }
}

impl PartialEq for FontFamily {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

/// A family at a given size.
#[derive(Debug, Clone)]
pub struct Font {
    /// Face
    pub family: Arc<FontFamily>,
    /// Em size in scene units
    pub size: f64,
}

impl Font {
    /// Create a font.
    pub fn new(family: Arc<FontFamily>, size: f64) -> Self {
        Self { family, size }
    }

    /// Scale from 1/1000 em to scene units.
    pub fn scale(&self) -> f64 {
        self.size / 1000.0
    }
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        self.family == other.family && self.size == other.size
    }
}
