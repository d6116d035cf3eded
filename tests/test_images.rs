//! Integration tests for image embedding: decoding, JPEG passthrough,
//! alpha planes and deduplication across pages.

mod common;

use common::{init_logging, object, objects_with, page_contents, reference};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use scene_pdf::elements::{ColorSpace, Document, ImageFormat, ImageResource, PageRecorder};
use scene_pdf::geometry::Matrix;
use scene_pdf::{compile, CompileOptions, ErrorKind};
use std::io::Write;
use std::sync::Arc;

fn png_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Encode an RGBA8 PNG with unfiltered scanlines.
fn rgba_png(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, 6, 0, 0, 0]);

    let mut raw = Vec::new();
    for row in rgba.chunks(width as usize * 4) {
        raw.push(0);
        raw.extend_from_slice(row);
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).unwrap();
    let idat = encoder.finish().unwrap();

    let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    png_chunk(&mut png, b"IHDR", &ihdr);
    png_chunk(&mut png, b"IDAT", &idat);
    png_chunk(&mut png, b"IEND", &[]);
    png
}

fn jpeg_bytes() -> Vec<u8> {
    // SOI, SOF0 for 4x2 with 3 components, then a stand-in scan and EOI
    vec![
        0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x02, 0x00, 0x04, 0x03, 0x01, 0x22,
        0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xFF, 0xDA, 0x00, 0x02, 0xFF, 0xD9,
    ]
}

fn draw_at(recorder: &mut PageRecorder, image: &Arc<ImageResource>, x: f64, y: f64) {
    recorder
        .save()
        .transform(Matrix::new(20.0, 0.0, 0.0, 10.0, x, y))
        .draw_image(image.clone())
        .restore();
}

#[test]
fn test_png_decodes_with_alpha_plane() {
    init_logging();
    let png = rgba_png(2, 1, &[255, 0, 0, 255, 0, 0, 255, 64]);
    let image = ImageResource::from_bytes(png).unwrap();
    assert_eq!((image.width, image.height), (2, 1));
    assert_eq!(image.color_space, ColorSpace::DeviceRGB);
    assert_eq!(image.data, vec![255, 0, 0, 0, 0, 255]);
    assert_eq!(image.alpha, Some(vec![255, 64]));

    let mut recorder = PageRecorder::new(100.0, 100.0);
    draw_at(&mut recorder, &Arc::new(image), 5.0, 5.0);
    let mut doc = Document::new();
    doc.push(recorder.finish());
    let pdf = compile(&doc, &CompileOptions::default()).unwrap();

    let color = objects_with(&pdf, "/SMask")
        .into_iter()
        .find(|o| o.dict_text().contains("/Subtype /Image"))
        .unwrap();
    assert!(color.dict_text().contains("/Width 2 /Height 1 /ColorSpace /DeviceRGB"));
    assert_eq!(color.stream_data().unwrap(), vec![255, 0, 0, 0, 0, 255]);

    let mask = object(&pdf, reference(&color.dict_text(), "SMask").unwrap());
    assert!(mask.dict_text().contains("/ColorSpace /DeviceGray"));
    assert_eq!(mask.stream_data().unwrap(), vec![255, 64]);

    let page = &objects_with(&pdf, "/Type /Page ")[0];
    assert!(page
        .dict_text()
        .contains(&format!("/XObject << /Im0 {} 0 R >>", color.number)));
}

#[test]
fn test_jpeg_passes_through() {
    let image = ImageResource::from_bytes(jpeg_bytes()).unwrap();
    assert_eq!(image.format, ImageFormat::Jpeg);

    let mut recorder = PageRecorder::new(100.0, 100.0);
    draw_at(&mut recorder, &Arc::new(image), 0.0, 0.0);
    let mut doc = Document::new();
    doc.push(recorder.finish());
    let pdf = compile(&doc, &CompileOptions::default()).unwrap();

    let images = objects_with(&pdf, "/Subtype /Image");
    assert_eq!(images.len(), 1);
    let dict = images[0].dict_text();
    assert!(dict.contains("/Width 4 /Height 2"));
    assert!(dict.contains("/Filter /DCTDecode"));
    assert!(!dict.contains("FlateDecode"));
    assert_eq!(images[0].stream_data().unwrap(), jpeg_bytes());
}

#[test]
fn test_same_image_embedded_once() {
    let pixels = [10, 20, 30, 255, 40, 50, 60, 255];
    // Two separately decoded copies share a content identity
    let first = Arc::new(ImageResource::from_rgba8(2, 1, &pixels).unwrap());
    let second = Arc::new(ImageResource::from_rgba8(2, 1, &pixels).unwrap());

    let mut a = PageRecorder::new(100.0, 100.0);
    draw_at(&mut a, &first, 0.0, 0.0);
    draw_at(&mut a, &second, 50.0, 50.0);
    let mut b = PageRecorder::new(100.0, 100.0);
    draw_at(&mut b, &second, 10.0, 10.0);
    let mut doc = Document::new();
    doc.push(a.finish());
    doc.push(b.finish());

    let pdf = compile(&doc, &CompileOptions::default().with_compress(false)).unwrap();
    let images = objects_with(&pdf, "/Subtype /Image");
    assert_eq!(images.len(), 1);
    assert!(!images[0].dict_text().contains("/SMask"));

    let contents = page_contents(&pdf);
    assert_eq!(contents[0].matches("/Im0 Do\n").count(), 2);
    assert!(contents[0]
        .contains("q\n20 0 0 10 50 50 cm\nq\n/A0 gs\n1 0 0 -1 0 1 cm\n/Im0 Do\nQ\nQ\n"));
    assert_eq!(contents[1].matches("/Im0 Do\n").count(), 1);
    for page in objects_with(&pdf, "/Type /Page ") {
        assert!(page
            .dict_text()
            .contains(&format!("/XObject << /Im0 {} 0 R >>", images[0].number)));
    }
}

#[test]
fn test_tagged_image_link_covers_placement() {
    let image = Arc::new(ImageResource::from_rgba8(1, 1, &[0, 0, 0, 255]).unwrap());
    let mut recorder = PageRecorder::new(100.0, 100.0);
    recorder.set_tag(Some("photo"));
    draw_at(&mut recorder, &image, 30.0, 40.0);
    let mut doc = Document::new();
    doc.push(recorder.finish());

    let options = CompileOptions::default().with_link("photo", "https://example.com/photo");
    let pdf = compile(&doc, &options).unwrap();
    let annots = objects_with(&pdf, "/Subtype /Link");
    assert_eq!(annots.len(), 1);
    // Scene box 30,40 to 50,50 flipped on a 100pt page
    assert!(annots[0].text().contains("/Rect [30 50 50 60]"));
}

#[test]
fn test_undecodable_bytes_are_image_errors() {
    let err = ImageResource::from_bytes(vec![1, 2, 3, 4]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    let err = ImageResource::from_rgba8(2, 2, &[0; 3]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
