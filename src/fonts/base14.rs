//! Standard 14 faces that every viewer ships.
//!
//! Metrics are the AFM values in units of 1/1000 em. Only the Latin text
//! faces are offered; Symbol and ZapfDingbats do not use WinAnsiEncoding.

use super::encoding::is_encodable;
use super::provider::{FaceMetrics, FontProvider, FontSubset};
use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Advance widths for ASCII 0x20..=0x7E.
type AsciiWidths = [u16; 95];

#[rustfmt::skip]
const HELVETICA_WIDTHS: AsciiWidths = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: AsciiWidths = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN_WIDTHS: AsciiWidths = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_WIDTHS: AsciiWidths = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 930,
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
    722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
    333, 278, 333, 581, 500, 333,
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
    556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
    394, 220, 394, 520,
];

/// Font width data.
#[derive(Debug, Clone, Copy)]
enum Base14Widths {
    /// Proportional face with per-character ASCII widths
    Proportional(&'static AsciiWidths),
    /// Monospace face with fixed width
    Monospace(f64),
}

impl Base14Widths {
    fn width_for_char(&self, ch: char) -> f64 {
        match self {
            Base14Widths::Proportional(widths) => {
                let cp = ch as u32;
                if (0x20..=0x7E).contains(&cp) {
                    f64::from(widths[(cp - 0x20) as usize])
                } else {
                    500.0 // Default for characters outside ASCII
                }
            },
            Base14Widths::Monospace(width) => *width,
        }
    }
}

/// One of the twelve Latin standard faces.
#[derive(Debug, Clone)]
pub struct Base14Font {
    name: &'static str,
    metrics: FaceMetrics,
    widths: Base14Widths,
}

impl Base14Font {
    /// Names accepted by [`Base14Font::new`].
    pub const NAMES: [&'static str; 12] = [
        "Helvetica",
        "Helvetica-Bold",
        "Helvetica-Oblique",
        "Helvetica-BoldOblique",
        "Times-Roman",
        "Times-Bold",
        "Times-Italic",
        "Times-BoldItalic",
        "Courier",
        "Courier-Bold",
        "Courier-Oblique",
        "Courier-BoldOblique",
    ];

    /// Look up a standard face by name.
    pub fn new(name: &str) -> Option<Self> {
        let name = *Self::NAMES.iter().find(|n| **n == name)?;
        let bold = name.contains("Bold");
        let italic = name.contains("Oblique") || name.contains("Italic");

        // (ascent, descent, cap height, bbox, italic angle)
        let (ascent, descent, cap_height, bbox, italic_angle) = match name {
            "Helvetica" => (718.0, -207.0, 718.0, [-166.0, -225.0, 1000.0, 931.0], 0.0),
            "Helvetica-Oblique" => (718.0, -207.0, 718.0, [-170.0, -225.0, 1116.0, 931.0], -12.0),
            "Helvetica-Bold" => (718.0, -207.0, 718.0, [-170.0, -228.0, 1003.0, 962.0], 0.0),
            "Helvetica-BoldOblique" => {
                (718.0, -207.0, 718.0, [-174.0, -228.0, 1114.0, 962.0], -12.0)
            },
            "Times-Roman" => (683.0, -217.0, 662.0, [-168.0, -218.0, 1000.0, 898.0], 0.0),
            "Times-Italic" => (683.0, -217.0, 653.0, [-169.0, -217.0, 1010.0, 883.0], -15.5),
            "Times-Bold" => (676.0, -205.0, 676.0, [-168.0, -218.0, 1000.0, 935.0], 0.0),
            "Times-BoldItalic" => (699.0, -205.0, 669.0, [-200.0, -218.0, 996.0, 921.0], -15.0),
            "Courier" => (629.0, -157.0, 562.0, [-23.0, -250.0, 715.0, 805.0], 0.0),
            "Courier-Oblique" => (629.0, -157.0, 562.0, [-27.0, -250.0, 849.0, 805.0], -12.0),
            "Courier-Bold" => (626.0, -142.0, 562.0, [-113.0, -250.0, 749.0, 801.0], 0.0),
            _ => (626.0, -142.0, 562.0, [-57.0, -250.0, 869.0, 801.0], -12.0),
        };

        let widths = match name {
            n if n.starts_with("Courier") => Base14Widths::Monospace(600.0),
            "Helvetica" | "Helvetica-Oblique" => Base14Widths::Proportional(&HELVETICA_WIDTHS),
            "Helvetica-Bold" | "Helvetica-BoldOblique" => {
                Base14Widths::Proportional(&HELVETICA_BOLD_WIDTHS)
            },
            "Times-Roman" | "Times-Italic" => Base14Widths::Proportional(&TIMES_ROMAN_WIDTHS),
            _ => Base14Widths::Proportional(&TIMES_BOLD_WIDTHS),
        };

        Some(Self {
            name,
            metrics: FaceMetrics {
                ascent,
                descent,
                cap_height,
                italic_angle,
                bbox: Rect::new(bbox[0], bbox[1], bbox[2], bbox[3]),
                fixed_pitch: name.starts_with("Courier"),
                serif: name.starts_with("Times"),
                italic,
                bold,
            },
            widths,
        })
    }
}

impl FontProvider for Base14Font {
    fn postscript_name(&self) -> &str {
        self.name
    }

    fn builtin_name(&self) -> Option<&str> {
        Some(self.name)
    }

    fn metrics(&self) -> &FaceMetrics {
        &self.metrics
    }

    fn advance(&self, ch: char) -> f64 {
        self.widths.width_for_char(ch)
    }

    fn subset(&self, chars: &[char]) -> Result<FontSubset> {
        // No program to embed; report the first character the viewer's copy cannot show.
        let missing = chars
            .iter()
            .find(|c| !is_encodable(**c))
            .or_else(|| chars.first())
            .copied()
            .unwrap_or('\u{FFFD}');
        Err(Error::GlyphNotFound {
            font: self.name.to_string(),
            codepoint: missing as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names() {
        for name in Base14Font::NAMES {
            let font = Base14Font::new(name).unwrap();
            assert_eq!(font.postscript_name(), name);
            assert_eq!(font.builtin_name(), Some(name));
        }
        assert!(Base14Font::new("Symbol").is_none());
        assert!(Base14Font::new("Arial").is_none());
    }

    #[test]
    fn test_helvetica_widths() {
        let font = Base14Font::new("Helvetica").unwrap();
        assert_eq!(font.advance(' '), 278.0);
        assert_eq!(font.advance('A'), 667.0);
        assert_eq!(font.advance('W'), 944.0);
        assert_eq!(font.advance('i'), 222.0);
        assert_eq!(font.advance('~'), 584.0);
        assert_eq!(font.advance('\u{E9}'), 500.0);
    }

    #[test]
    fn test_courier_is_monospace() {
        let font = Base14Font::new("Courier-Bold").unwrap();
        assert_eq!(font.advance('i'), 600.0);
        assert_eq!(font.advance('M'), 600.0);
        assert!(font.metrics().fixed_pitch);
        assert!(font.metrics().bold);
    }

    #[test]
    fn test_metrics_flags() {
        let times = Base14Font::new("Times-Italic").unwrap();
        assert!(times.metrics().serif);
        assert!(times.metrics().italic);
        assert_eq!(times.metrics().ascent, 683.0);
        assert_eq!(times.metrics().descent, -217.0);
    }

    #[test]
    fn test_subset_fails_for_glyph_indexed_chars() {
        let font = Base14Font::new("Helvetica").unwrap();
        let err = font.subset(&['a', '\u{4E2D}']).unwrap_err();
        match err {
            Error::GlyphNotFound { font, codepoint } => {
                assert_eq!(font, "Helvetica");
                assert_eq!(codepoint, 0x4E2D);
            },
            other => panic!("unexpected error: {}", other),
        }
    }
}
