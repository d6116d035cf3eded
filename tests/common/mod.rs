//! Helpers shared by the integration tests: logging setup and a minimal
//! reader for the files the compiler writes.

#![allow(dead_code)]

use regex::bytes::Regex;
use std::io::Read;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One `N 0 obj ... endobj` block.
#[derive(Debug, Clone)]
pub struct RawObject {
    pub number: u32,
    pub offset: usize,
    pub body: Vec<u8>,
}

impl RawObject {
    /// Body text with binary bytes replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Dictionary part of the body (everything before `stream`).
    pub fn dict_text(&self) -> String {
        let text = self.text();
        match text.find("\nstream\n") {
            Some(end) => text[..end].to_string(),
            None => text,
        }
    }

    /// Stream payload, inflated when the dictionary declares FlateDecode.
    pub fn stream_data(&self) -> Option<Vec<u8>> {
        let start = find(&self.body, b"\nstream\n")? + b"\nstream\n".len();
        let end = rfind(&self.body, b"\nendstream")?;
        let raw = &self.body[start..end];
        if self.dict_text().contains("/FlateDecode") {
            let mut out = Vec::new();
            flate2::read::ZlibDecoder::new(raw).read_to_end(&mut out).ok()?;
            Some(out)
        } else {
            Some(raw.to_vec())
        }
    }

    /// Decoded stream payload as text.
    pub fn stream_text(&self) -> Option<String> {
        self.stream_data().map(|d| String::from_utf8_lossy(&d).into_owned())
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Split a file into its objects, in file order.
pub fn objects(pdf: &[u8]) -> Vec<RawObject> {
    let header = Regex::new(r"(?m)^(\d+) 0 obj\n").unwrap();
    let mut out = Vec::new();
    for caps in header.captures_iter(pdf) {
        let whole = caps.get(0).unwrap();
        let number = std::str::from_utf8(&caps[1]).unwrap().parse().unwrap();
        let rest = &pdf[whole.end()..];
        let len = find(rest, b"\nendobj\n").expect("object without endobj");
        out.push(RawObject {
            number,
            offset: whole.start(),
            body: rest[..len].to_vec(),
        });
    }
    out
}

/// Objects whose dictionary contains `needle`.
pub fn objects_with(pdf: &[u8], needle: &str) -> Vec<RawObject> {
    objects(pdf)
        .into_iter()
        .filter(|o| o.dict_text().contains(needle))
        .collect()
}

/// Object by number.
pub fn object(pdf: &[u8], number: u32) -> RawObject {
    objects(pdf)
        .into_iter()
        .find(|o| o.number == number)
        .unwrap_or_else(|| panic!("object {} not found", number))
}

/// Follow `/<key> N 0 R` inside `text`.
pub fn reference(text: &str, key: &str) -> Option<u32> {
    let re = regex::Regex::new(&format!(r"/{} (\d+) 0 R", regex::escape(key))).unwrap();
    re.captures(text).map(|c| c[1].parse().unwrap())
}

/// Decoded content stream of every page, in page-tree order.
pub fn page_contents(pdf: &[u8]) -> Vec<String> {
    objects_with(pdf, "/Type /Page ")
        .iter()
        .map(|page| {
            let contents = reference(&page.dict_text(), "Contents").expect("page without contents");
            object(pdf, contents).stream_text().expect("contents not a stream")
        })
        .collect()
}
