//! Integration tests for font discovery and embedding through the public
//! compile API, using an in-memory face.

mod common;

use common::{init_logging, object, objects_with, page_contents, reference};
use proptest::prelude::*;
use scene_pdf::elements::{Color, Document, Figure, Page, Paint, Segment, TextFigure};
use scene_pdf::fonts::{
    Base14Font, FaceMetrics, Font, FontFamily, FontProgramKind, FontProvider, FontSubset,
};
use scene_pdf::geometry::{Point, Rect};
use scene_pdf::writer::discover;
use scene_pdf::{compile, CompileOptions, Error, ErrorKind, Result, TextMode};
use std::collections::HashSet;
use std::sync::Arc;

const PROGRAM: &[u8] = b"\x00\x01\x00\x00 test font program";

#[derive(Debug)]
struct TestFace {
    name: &'static str,
    kind: FontProgramKind,
    metrics: FaceMetrics,
}

impl TestFace {
    fn new(name: &'static str, kind: FontProgramKind) -> Self {
        Self {
            name,
            kind,
            metrics: FaceMetrics {
                ascent: 800.0,
                descent: -200.0,
                cap_height: 700.0,
                italic_angle: 0.0,
                bbox: Rect::new(0.0, -200.0, 1000.0, 800.0),
                fixed_pitch: false,
                serif: false,
                italic: false,
                bold: false,
            },
        }
    }
}

impl FontProvider for TestFace {
    fn postscript_name(&self) -> &str {
        self.name
    }

    fn metrics(&self) -> &FaceMetrics {
        &self.metrics
    }

    fn advance(&self, _ch: char) -> f64 {
        600.0
    }

    fn kerning(&self, left: char, right: char) -> f64 {
        if (left, right) == ('T', 'o') {
            -100.0
        } else {
            0.0
        }
    }

    fn outline(&self, ch: char) -> Option<Vec<Segment>> {
        (ch != '?').then(|| {
            vec![
                Segment::MoveTo(Point::new(0.0, 0.0)),
                Segment::LineTo(Point::new(500.0, 0.0)),
                Segment::LineTo(Point::new(250.0, 700.0)),
                Segment::Close,
            ]
        })
    }

    fn subset(&self, chars: &[char]) -> Result<FontSubset> {
        let glyphs = chars
            .iter()
            .filter(|c| **c != '☃')
            .enumerate()
            .map(|(i, c)| (*c, i as u16 + 3))
            .collect();
        Ok(FontSubset {
            program: PROGRAM.to_vec(),
            kind: self.kind,
            glyphs,
        })
    }
}

fn family(key: &str, name: &'static str) -> Arc<FontFamily> {
    Arc::new(FontFamily::new(
        key,
        Arc::new(TestFace::new(name, FontProgramKind::TrueType)),
    ))
}

fn text(s: &str, family: &Arc<FontFamily>, y: f64) -> Figure {
    Figure::Text(TextFigure::new(s, Font::new(family.clone(), 12.0), Point::new(10.0, y)))
}

fn document(figures: Vec<Figure>) -> Document {
    let mut page = Page::new(300.0, 300.0);
    page.figures = figures;
    let mut doc = Document::new();
    doc.push(page);
    doc
}

fn uncompressed() -> CompileOptions {
    CompileOptions::default().with_compress(false)
}

#[test]
fn test_mixed_text_embeds_both_fonts_over_one_program() {
    init_logging();
    let sans = family("fonts/TestSans.ttf", "Test Sans");
    let pdf = compile(&document(vec![text("To Ω", &sans, 40.0)]), &uncompressed()).unwrap();

    let simple = objects_with(&pdf, "/Subtype /TrueType");
    let composite = objects_with(&pdf, "/Subtype /Type0");
    let cid = objects_with(&pdf, "/Subtype /CIDFontType2");
    assert_eq!((simple.len(), composite.len(), cid.len()), (1, 1, 1));

    let base_font = regex::Regex::new(r"/BaseFont /[A-Z]{6}\+TestSans ").unwrap();
    assert!(base_font.is_match(&simple[0].text()));
    assert!(base_font.is_match(&composite[0].text()));
    assert!(simple[0].text().contains("/FirstChar 32 /LastChar 111"));
    assert!(simple[0].text().contains("/Encoding /WinAnsiEncoding"));
    assert!(cid[0].text().contains("/CIDToGIDMap /Identity"));

    let descriptors = objects_with(&pdf, "/Type /FontDescriptor");
    assert_eq!(descriptors.len(), 2);
    let programs = descriptors
        .iter()
        .map(|d| reference(&d.text(), "FontFile2").unwrap())
        .collect::<HashSet<_>>();
    assert_eq!(programs.len(), 1);
    let program = object(&pdf, *programs.iter().next().unwrap());
    assert!(program
        .dict_text()
        .contains(&format!("/Length1 {}", PROGRAM.len())));
    assert_eq!(program.stream_data().unwrap(), PROGRAM);

    let to_unicode = object(&pdf, reference(&composite[0].text(), "ToUnicode").unwrap());
    assert!(to_unicode.stream_text().unwrap().contains("<0006> <03A9>"));

    let page = &objects_with(&pdf, "/Type /Page ")[0];
    assert!(page.dict_text().contains(&format!(
        "/Font << /F0 {} 0 R /U0 {} 0 R >>",
        simple[0].number, composite[0].number
    )));
    let content = &page_contents(&pdf)[0];
    assert!(content.contains("[(T) 100 (o ) ] TJ\n"));
    assert!(content.contains("<0006> Tj\n"));
}

#[test]
fn test_compressed_font_program_inflates() {
    let sans = family("fonts/TestSans.ttf", "Test Sans");
    let pdf = compile(&document(vec![text("abc", &sans, 40.0)]), &CompileOptions::default())
        .unwrap();
    let descriptor = &objects_with(&pdf, "/Type /FontDescriptor")[0];
    let program = object(&pdf, reference(&descriptor.text(), "FontFile2").unwrap());
    assert!(program.dict_text().contains("/Filter [/FlateDecode]"));
    assert_eq!(program.stream_data().unwrap(), PROGRAM);
}

#[test]
fn test_open_type_program_kind() {
    let face = Arc::new(FontFamily::new(
        "fonts/TestSerif.otf",
        Arc::new(TestFace::new("TestSerif", FontProgramKind::OpenType)),
    ));
    let pdf = compile(&document(vec![text("aΩ", &face, 40.0)]), &uncompressed()).unwrap();

    assert_eq!(objects_with(&pdf, "/Subtype /CIDFontType0").len(), 1);
    assert_eq!(objects_with(&pdf, "/Subtype /OpenType").len(), 1);
    assert_eq!(objects_with(&pdf, "/FontFile3").len(), 2);
    assert!(objects_with(&pdf, "/Subtype /Type1").is_empty());
}

#[test]
fn test_families_named_in_first_seen_order() {
    let a = family("a.ttf", "FaceA");
    let b = family("b.ttf", "FaceB");
    let pdf = compile(
        &document(vec![text("x", &b, 20.0), text("y", &a, 40.0), text("z", &b, 60.0)]),
        &uncompressed(),
    )
    .unwrap();

    let content = &page_contents(&pdf)[0];
    let f0 = content.find("/F0 12 Tf").unwrap();
    let f1 = content.find("/F1 12 Tf").unwrap();
    assert!(f0 < f1);
    let face_b = objects_with(&pdf, "+FaceB")
        .into_iter()
        .find(|o| o.text().contains("/Type /Font "))
        .unwrap();
    let page = &objects_with(&pdf, "/Type /Page ")[0];
    assert!(page.dict_text().contains(&format!("/F0 {} 0 R", face_b.number)));
}

#[test]
fn test_builtin_face_is_not_embedded() {
    let helvetica = Arc::new(FontFamily::new(
        "Helvetica",
        Arc::new(Base14Font::new("Helvetica").unwrap()),
    ));
    let pdf = compile(&document(vec![text("Hello", &helvetica, 40.0)]), &uncompressed()).unwrap();

    let fonts = objects_with(&pdf, "/Type /Font");
    assert_eq!(fonts.len(), 1);
    assert!(fonts[0].text().contains("/Subtype /Type1 /BaseFont /Helvetica"));
    assert!(objects_with(&pdf, "/FontFile2").is_empty());
}

#[test]
fn test_empty_text_embeds_no_font() {
    let sans = family("fonts/TestSans.ttf", "Test Sans");
    let helvetica = Arc::new(FontFamily::new(
        "Helvetica",
        Arc::new(Base14Font::new("Helvetica").unwrap()),
    ));
    let pdf = compile(
        &document(vec![text("", &sans, 40.0), text("", &helvetica, 60.0)]),
        &uncompressed(),
    )
    .unwrap();

    assert!(objects_with(&pdf, "/FontFile2").is_empty());
    assert!(objects_with(&pdf, "/Length1").is_empty());
    assert!(objects_with(&pdf, "/Type /Font").is_empty());
    let page = &objects_with(&pdf, "/Type /Page ")[0];
    assert!(!page.dict_text().contains("/Font"));
    assert!(!page_contents(&pdf)[0].contains("Tf"));
}

#[test]
fn test_missing_glyph_is_lookup_error() {
    let sans = family("fonts/TestSans.ttf", "Test Sans");
    let err = compile(&document(vec![text("a☃", &sans, 40.0)]), &uncompressed()).unwrap_err();
    assert!(matches!(err, Error::GlyphNotFound { codepoint: 0x2603, .. }));
    assert_eq!(err.kind(), ErrorKind::Lookup);
}

#[test]
fn test_text_as_paths_embeds_nothing() {
    let sans = family("fonts/TestSans.ttf", "Test Sans");
    let options = uncompressed().with_text_mode(TextMode::ConvertTextToPaths);
    let mut figure = TextFigure::new("AΩ", Font::new(sans, 10.0), Point::new(0.0, 50.0));
    figure.fill = Some(Paint::Solid(Color::rgb(0.0, 0.0, 1.0)));
    let pdf = compile(&document(vec![Figure::Text(figure)]), &options).unwrap();

    assert!(objects_with(&pdf, "/Type /Font").is_empty());
    let content = &page_contents(&pdf)[0];
    assert!(!content.contains("BT"));
    // Second glyph starts one advance (600 units at 10pt) to the right
    assert!(content.contains("0 0 1 rg\n0 50 m\n5 50 l\n2.5 43 l\nh\n6 50 m\n"));
}

#[test]
fn test_text_as_paths_missing_outline() {
    let sans = family("fonts/TestSans.ttf", "Test Sans");
    let options = CompileOptions::default().with_text_mode(TextMode::ConvertTextToPaths);
    let err = compile(&document(vec![text("a?", &sans, 40.0)]), &options).unwrap_err();
    assert!(matches!(err, Error::GlyphNotFound { codepoint: 0x3F, .. }));
}

proptest! {
    #[test]
    fn prop_partition_covers_used_characters(
        runs in prop::collection::vec("[a-zA-Z0-9 éüß€ΩЖ中☺]{0,12}", 1..5)
    ) {
        let sans = family("fonts/TestSans.ttf", "Test Sans");
        let figures = runs
            .iter()
            .enumerate()
            .map(|(i, s)| text(s, &sans, 20.0 * i as f64))
            .collect();
        let doc = document(figures);
        let resources = discover(&doc, TextMode::SubsetAndEmbed);

        let used = runs.iter().flat_map(|s| s.chars()).collect::<HashSet<char>>();
        match resources.families.values().next() {
            None => prop_assert!(used.is_empty()),
            Some(usage) => {
                let partition = usage.partition();
                let encodable = partition.encodable.iter().copied().collect::<HashSet<_>>();
                let other = partition.non_encodable.iter().copied().collect::<HashSet<_>>();
                prop_assert!(encodable.is_disjoint(&other));
                prop_assert_eq!(
                    encodable.union(&other).copied().collect::<HashSet<_>>(),
                    used
                );
            },
        }
    }
}
