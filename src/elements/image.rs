//! Raster image resources.
//!
//! Images are decoded once into a color plane plus an optional alpha plane
//! and identified by a SHA-256 digest of their content, so the same picture
//! drawn many times is embedded once.

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Color space of the color plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// One component per pixel
    DeviceGray,
    /// Three components per pixel
    DeviceRGB,
    /// Four components per pixel (JPEG only)
    DeviceCMYK,
}

impl ColorSpace {
    /// PDF name of the color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }

    /// Components per pixel.
    pub fn components(&self) -> usize {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRGB => 3,
            ColorSpace::DeviceCMYK => 4,
        }
    }
}

/// Encoding of the color plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Uncompressed 8-bit samples (compressed with Flate on output when enabled)
    Raw,
    /// Baseline JPEG passed through with `/DCTDecode`
    Jpeg,
}

/// Content digest used to deduplicate images.
pub type ContentId = [u8; 32];

/// A decoded image ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResource {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Color space of `data`
    pub color_space: ColorSpace,
    /// Bits per sample
    pub bits_per_component: u8,
    /// Encoding of `data`
    pub format: ImageFormat,
    /// Color plane
    pub data: Vec<u8>,
    /// Optional 8-bit alpha plane, one byte per pixel
    pub alpha: Option<Vec<u8>>,
    id: ContentId,
}

impl ImageResource {
    /// Build from raw 8-bit samples.
    ///
    /// The sample count must match `width * height * components`.
    pub fn from_raw(
        width: u32,
        height: u32,
        color_space: ColorSpace,
        data: Vec<u8>,
        alpha: Option<Vec<u8>>,
    ) -> Result<Self> {
        let pixels = width as usize * height as usize;
        if data.len() != pixels * color_space.components() {
            return Err(Error::Image(format!(
                "expected {} samples for {}x{} {}, got {}",
                pixels * color_space.components(),
                width,
                height,
                color_space.pdf_name(),
                data.len()
            )));
        }
        if let Some(a) = &alpha {
            if a.len() != pixels {
                return Err(Error::Image(format!(
                    "alpha plane has {} bytes, expected {}",
                    a.len(),
                    pixels
                )));
            }
        }
        Ok(Self::assemble(width, height, color_space, 8, ImageFormat::Raw, data, alpha))
    }

    /// Build from interleaved RGBA8, splitting alpha into its own plane.
    ///
    /// A fully opaque alpha plane is dropped.
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        let pixels = width as usize * height as usize;
        if rgba.len() != pixels * 4 {
            return Err(Error::Image(format!(
                "expected {} RGBA bytes for {}x{}, got {}",
                pixels * 4,
                width,
                height,
                rgba.len()
            )));
        }
        let mut rgb = Vec::with_capacity(pixels * 3);
        let mut alpha = Vec::with_capacity(pixels);
        for px in rgba.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
            alpha.push(px[3]);
        }
        let alpha = if alpha.iter().all(|&a| a == 255) {
            None
        } else {
            Some(alpha)
        };
        Ok(Self::assemble(width, height, ColorSpace::DeviceRGB, 8, ImageFormat::Raw, rgb, alpha))
    }

    /// Keep JPEG bytes as-is, reading only the frame header.
    pub fn from_jpeg(data: Vec<u8>) -> Result<Self> {
        let (width, height, components) = parse_jpeg_header(&data)?;
        let color_space = match components {
            1 => ColorSpace::DeviceGray,
            3 => ColorSpace::DeviceRGB,
            4 => ColorSpace::DeviceCMYK,
            n => {
                return Err(Error::Image(format!("unsupported JPEG component count: {}", n)));
            },
        };
        Ok(Self::assemble(width, height, color_space, 8, ImageFormat::Jpeg, data, None))
    }

    /// Decode PNG bytes.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)
            .map_err(|e| Error::Image(format!("failed to decode PNG: {}", e)))?;
        Self::from_dynamic(img)
    }

    /// Detect the format from magic bytes and decode.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.starts_with(&[0xFF, 0xD8]) {
            Self::from_jpeg(data)
        } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            Self::from_png(&data)
        } else {
            let img = image::load_from_memory(&data)
                .map_err(|e| Error::Image(format!("unrecognized image data: {}", e)))?;
            Self::from_dynamic(img)
        }
    }

    fn from_dynamic(img: image::DynamicImage) -> Result<Self> {
        use image::GenericImageView;

        let (width, height) = img.dimensions();
        match img {
            image::DynamicImage::ImageLuma8(gray) => {
                Self::from_raw(width, height, ColorSpace::DeviceGray, gray.into_raw(), None)
            },
            image::DynamicImage::ImageRgb8(rgb) => {
                Self::from_raw(width, height, ColorSpace::DeviceRGB, rgb.into_raw(), None)
            },
            other => Self::from_rgba8(width, height, &other.to_rgba8().into_raw()),
        }
    }

    fn assemble(
        width: u32,
        height: u32,
        color_space: ColorSpace,
        bits_per_component: u8,
        format: ImageFormat,
        data: Vec<u8>,
        alpha: Option<Vec<u8>>,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([format as u8, color_space as u8, bits_per_component]);
        hasher.update(width.to_be_bytes());
        hasher.update(height.to_be_bytes());
        hasher.update((data.len() as u64).to_be_bytes());
        hasher.update(&data);
        if let Some(a) = &alpha {
            hasher.update(a);
        }
        let id = hasher.finalize().into();
        Self {
            width,
            height,
            color_space,
            bits_per_component,
            format,
            data,
            alpha,
            id,
        }
    }

    /// Content identity.
    pub fn content_id(&self) -> &ContentId {
        &self.id
    }
}

/// Read width, height and component count from a JPEG SOF marker.
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, u8)> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return Err(Error::Image("missing JPEG SOI marker".to_string()));
    }
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        // Fill bytes and standalone markers carry no length
        if marker == 0xFF || marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += if marker == 0xFF { 1 } else { 2 };
            continue;
        }
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            if pos + 9 >= data.len() {
                break;
            }
            let height = u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32;
            let width = u16::from_be_bytes([data[pos + 7], data[pos + 8]]) as u32;
            let components = data[pos + 9];
            return Ok((width, height, components));
        }
        pos += 2 + len;
    }
    Err(Error::Image("no JPEG frame header found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_splits_alpha() {
        let rgba = [255, 0, 0, 128, 0, 255, 0, 255];
        let img = ImageResource::from_rgba8(2, 1, &rgba).unwrap();
        assert_eq!(img.data, vec![255, 0, 0, 0, 255, 0]);
        assert_eq!(img.alpha, Some(vec![128, 255]));
        assert_eq!(img.color_space, ColorSpace::DeviceRGB);
    }

    #[test]
    fn test_opaque_alpha_dropped() {
        let rgba = [1, 2, 3, 255];
        let img = ImageResource::from_rgba8(1, 1, &rgba).unwrap();
        assert!(img.alpha.is_none());
    }

    #[test]
    fn test_raw_size_mismatch() {
        let err = ImageResource::from_raw(2, 2, ColorSpace::DeviceRGB, vec![0; 5], None);
        assert!(matches!(err, Err(Error::Image(_))));
    }

    #[test]
    fn test_content_identity() {
        let a = ImageResource::from_raw(1, 1, ColorSpace::DeviceGray, vec![7], None).unwrap();
        let b = ImageResource::from_raw(1, 1, ColorSpace::DeviceGray, vec![7], None).unwrap();
        let c = ImageResource::from_raw(1, 1, ColorSpace::DeviceGray, vec![8], None).unwrap();
        assert_eq!(a.content_id(), b.content_id());
        assert_ne!(a.content_id(), c.content_id());
    }

    #[test]
    fn test_jpeg_header() {
        // SOI, APP0 (length 4), SOF0 with 16x8, 3 components
        let data = vec![
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00,
            0x08, 0x00, 0x10, 0x03, 0x01, 0x22, 0x00,
        ];
        let img = ImageResource::from_jpeg(data).unwrap();
        assert_eq!((img.width, img.height), (16, 8));
        assert_eq!(img.color_space, ColorSpace::DeviceRGB);
        assert_eq!(img.format, ImageFormat::Jpeg);
    }

    #[test]
    fn test_not_a_jpeg() {
        assert!(ImageResource::from_jpeg(vec![0, 1, 2]).is_err());
    }
}
