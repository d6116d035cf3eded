//! Stream compression.
//!
//! Streams are stored as zlib containers (`/FlateDecode`).

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// Compress `data` into a zlib container suitable for `/FlateDecode`.
pub fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut decoded = Vec::new();
        ZlibDecoder::new(data).read_to_end(&mut decoded).unwrap();
        decoded
    }

    #[test]
    fn test_compress_header_and_trailer() {
        let data = b"BT /F0 12 Tf (Hello) Tj ET";
        let out = compress(data).unwrap();
        // Deflate, 32K window, default level
        assert_eq!(&out[..2], &[0x78, 0x9C]);
        // Adler-32 of the input, big-endian
        let (mut a, mut b) = (1u32, 0u32);
        for &byte in data.iter() {
            a = (a + byte as u32) % 65521;
            b = (b + a) % 65521;
        }
        assert_eq!(&out[out.len() - 4..], &((b << 16) | a).to_be_bytes());
    }

    #[test]
    fn test_compress_roundtrips_through_zlib_decoder() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i * 31 % 251) as u8).collect();
        let out = compress(&data).unwrap();
        assert!(out.len() < data.len());
        assert_eq!(inflate(&out), data);
    }

    #[test]
    fn test_compress_empty_input() {
        let out = compress(b"").unwrap();
        assert!(inflate(&out).is_empty());
        assert_eq!(&out[out.len() - 4..], &[0, 0, 0, 1]);
    }
}
