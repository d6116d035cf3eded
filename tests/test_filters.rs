//! Integration tests for filtered figures under each filter policy.

mod common;

use common::{init_logging, objects_with, page_contents};
use scene_pdf::elements::{
    Color, Document, Figure, FilterEffect, FilterRasterizer, ImageResource, PageRecorder,
    PathFigure,
};
use scene_pdf::geometry::Rect;
use scene_pdf::{compile, CompileOptions, Error, ErrorKind, FilterPolicy, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct CountingRasterizer {
    calls: AtomicUsize,
}

impl FilterRasterizer for CountingRasterizer {
    fn rasterize(
        &self,
        filter: &FilterEffect,
        figures: &[Figure],
        bounds: Rect,
    ) -> Result<ImageResource> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(filter.name, "drop-shadow");
        assert_eq!(figures.len(), 1);
        assert_eq!(bounds, Rect::new(10.0, 20.0, 30.0, 60.0));
        ImageResource::from_rgba8(2, 1, &[255, 0, 0, 128, 0, 0, 255, 255])
    }
}

fn filtered_document() -> Document {
    let inner = Figure::Path(
        PathFigure::rect(12.0, 22.0, 10.0, 10.0).with_fill(Color::rgb(0.0, 0.5, 0.0)),
    );
    let mut recorder = PageRecorder::new(100.0, 100.0);
    recorder.set_tag(Some("shadow")).draw_filtered(
        FilterEffect {
            name: "drop-shadow".to_string(),
            parameters: vec![3.0, 3.0, 0.5],
        },
        vec![inner],
        Rect::new(10.0, 20.0, 30.0, 60.0),
    );
    let mut doc = Document::new();
    doc.push(recorder.finish());
    doc
}

#[test]
fn test_rasterize_embeds_image() {
    init_logging();
    let rasterizer = Arc::new(CountingRasterizer::default());
    let options = CompileOptions::default()
        .with_compress(false)
        .with_rasterizer(rasterizer.clone())
        .with_link("shadow", "https://example.com/shadow");
    let pdf = compile(&filtered_document(), &options).unwrap();
    assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 1);

    let images = objects_with(&pdf, "/Subtype /Image");
    // Color plane plus its alpha plane
    assert_eq!(images.len(), 2);
    assert!(images.iter().any(|i| i.dict_text().contains("/SMask")));

    let content = &page_contents(&pdf)[0];
    assert!(content.contains(
        "q\n20 0 0 40 10 20 cm\nq\n/A0 gs\n1 0 0 -1 0 1 cm\n/Im0 Do\nQ\nQ\n"
    ));
    assert!(!content.contains("0 0.5 0 rg"));

    // The substituted image keeps the filtered figure's tag
    let annots = objects_with(&pdf, "/Subtype /Link");
    assert_eq!(annots.len(), 1);
    assert!(annots[0].text().contains("/Rect [10 40 30 80]"));
}

#[test]
fn test_rasterize_without_rasterizer_lists_remedies() {
    let err = compile(&filtered_document(), &CompileOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedEnvironment);
    assert!(matches!(err, Error::RasterizerUnavailable { ref filter } if filter == "drop-shadow"));
    let message = err.to_string();
    assert!(message.contains("FilterRasterizer"));
    assert!(message.contains("IgnoreFilter"));
    assert!(message.contains("SkipFiltered"));
}

#[test]
fn test_ignore_filter_draws_content() {
    let options = CompileOptions::default()
        .with_compress(false)
        .with_filter_policy(FilterPolicy::IgnoreFilter);
    let pdf = compile(&filtered_document(), &options).unwrap();

    assert!(objects_with(&pdf, "/Subtype /Image").is_empty());
    let content = &page_contents(&pdf)[0];
    assert!(content.contains("0 0.5 0 rg\n12 22 m\n"));
}

#[test]
fn test_skip_filtered_drops_content() {
    let options = CompileOptions::default()
        .with_compress(false)
        .with_filter_policy(FilterPolicy::SkipFiltered)
        .with_link("shadow", "https://example.com/shadow");
    let pdf = compile(&filtered_document(), &options).unwrap();

    assert!(objects_with(&pdf, "/Subtype /Image").is_empty());
    assert!(objects_with(&pdf, "/Subtype /Link").is_empty());
    assert_eq!(page_contents(&pdf)[0], "1 0 0 -1 0 100 cm\n");
}
