//! Image handling for PDF generation.
//!
//! Per ISO 32000-1 Section 8.9, images are represented as XObjects.
//!
//! # Supported Formats
//!
//! - **JPEG**: Pass-through embedding using DCTDecode filter
//! - **Raw**: 8-bit samples, FlateDecode when compression is enabled
//!
//! An alpha plane is embedded as a separate DeviceGray image referenced
//! through `/SMask`.

use super::object_graph::ObjectGraph;
use crate::elements::{ImageFormat, ImageResource};
use crate::error::Result;
use crate::object::{dict, Dict, Object, ObjectId, Stream};

/// Build the Image XObject dictionary, without filter or soft mask.
pub fn build_xobject_dict(image: &ImageResource) -> Dict {
    dict(vec![
        ("Type", Object::name("XObject")),
        ("Subtype", Object::name("Image")),
        ("Width", Object::Integer(image.width as i64)),
        ("Height", Object::Integer(image.height as i64)),
        ("ColorSpace", Object::name(image.color_space.pdf_name())),
        ("BitsPerComponent", Object::Integer(image.bits_per_component as i64)),
    ])
}

/// Build the soft mask (alpha plane) XObject dictionary, if the image has one.
pub fn build_soft_mask_dict(image: &ImageResource) -> Option<Dict> {
    image.alpha.as_ref().map(|_| {
        dict(vec![
            ("Type", Object::name("XObject")),
            ("Subtype", Object::name("Image")),
            ("Width", Object::Integer(image.width as i64)),
            ("Height", Object::Integer(image.height as i64)),
            ("ColorSpace", Object::name("DeviceGray")),
            ("BitsPerComponent", Object::Integer(8)),
        ])
    })
}

/// Add an image, and its alpha plane when present, to the graph.
pub fn add_image(graph: &mut ObjectGraph, image: &ImageResource, compress: bool) -> Result<ObjectId> {
    let soft_mask = match (build_soft_mask_dict(image), &image.alpha) {
        (Some(mask_dict), Some(alpha)) => {
            Some(graph.add(Stream::with_compression(mask_dict, alpha, compress)?))
        },
        _ => None,
    };

    let mut xobject = build_xobject_dict(image);
    if let Some(mask) = soft_mask {
        xobject.insert("SMask".to_string(), Object::Reference(mask));
    }

    let stream = match image.format {
        ImageFormat::Jpeg => {
            xobject.insert("Filter".to_string(), Object::name("DCTDecode"));
            Stream::new(xobject, image.data.clone())
        },
        ImageFormat::Raw => Stream::with_compression(xobject, &image.data, compress)?,
    };
    Ok(graph.add(stream))
}

/// Add every image in order; handle `i` is `/Im{i}`.
pub fn add_images<'a>(
    graph: &mut ObjectGraph,
    images: impl IntoIterator<Item = &'a ImageResource>,
    compress: bool,
) -> Result<Vec<ObjectId>> {
    let ids = images
        .into_iter()
        .map(|image| add_image(graph, image, compress))
        .collect::<Result<Vec<_>>>()?;
    log::debug!("Embedded {} image(s)", ids.len());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ColorSpace;
    use crate::writer::object_serializer::ObjectSerializer;

    fn serialize(graph: &ObjectGraph, id: ObjectId) -> String {
        let numbers = (1..=graph.len() as u32).collect::<Vec<_>>();
        ObjectSerializer::new(&numbers)
            .serialize_to_string(graph.get(id).unwrap())
            .unwrap()
    }

    #[test]
    fn test_raw_image_uncompressed() {
        let image =
            ImageResource::from_raw(2, 1, ColorSpace::DeviceGray, vec![0x10, 0x20], None).unwrap();
        let mut graph = ObjectGraph::new();
        let id = add_image(&mut graph, &image, false).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(
            serialize(&graph, id),
            "<< /Length 2 /Type /XObject /Subtype /Image /Width 2 /Height 1 \
             /ColorSpace /DeviceGray /BitsPerComponent 8 >>\nstream\n\x10\x20\nendstream"
        );
    }

    #[test]
    fn test_alpha_plane_becomes_smask() {
        let image = ImageResource::from_rgba8(1, 1, &[255, 0, 0, 64]).unwrap();
        let mut graph = ObjectGraph::new();
        let id = add_image(&mut graph, &image, true).unwrap();
        assert_eq!(graph.len(), 2);
        let text = serialize(&graph, id);
        assert!(text.contains("/SMask 1 0 R"));
        assert!(text.contains("/Filter [/FlateDecode]"));
        let mask = serialize(&graph, ObjectId(0));
        assert!(mask.contains("/ColorSpace /DeviceGray"));
    }

    #[test]
    fn test_jpeg_passthrough() {
        let data = vec![
            0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x02, 0x00, 0x04, 0x01, 0x01, 0x11,
            0x00,
        ];
        let image = ImageResource::from_jpeg(data.clone()).unwrap();
        let mut graph = ObjectGraph::new();
        let id = add_image(&mut graph, &image, true).unwrap();
        match graph.get(id) {
            Some(Object::Stream(s)) => {
                assert_eq!(&s.data[..], &data[..]);
                assert_eq!(s.dict.get("Filter"), Some(&Object::name("DCTDecode")));
                assert_eq!(s.dict.get("ColorSpace"), Some(&Object::name("DeviceGray")));
            },
            other => panic!("expected stream, got {:?}", other),
        }
    }

    #[test]
    fn test_add_images_keeps_order() {
        let a = ImageResource::from_raw(1, 1, ColorSpace::DeviceGray, vec![1], None).unwrap();
        let b = ImageResource::from_rgba8(1, 1, &[0, 0, 0, 0]).unwrap();
        let mut graph = ObjectGraph::new();
        let ids = add_images(&mut graph, [&a, &b], false).unwrap();
        assert_eq!(ids, vec![ObjectId(0), ObjectId(2)]);
    }
}
