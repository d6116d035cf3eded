//! PDF object serialization.
//!
//! Serializes objects to their byte representation according to
//! ISO 32000-1:2008 and lays out the file: header, indirect objects,
//! cross-reference table and trailer.

use crate::error::Result;
use crate::object::{Dict, Object};
use std::io::Write;

/// Format a real number: at most five decimals, trailing zeros dropped,
/// integral values without a decimal point.
pub fn format_real(value: f64) -> String {
    if !value.is_finite() {
        log::warn!("Non-finite number {} written as 0", value);
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let formatted = format!("{:.5}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Serializer for objects, resolving handles through a numbering table.
///
/// `numbers[i]` is the object number assigned to the object at position
/// `i` of the graph.
#[derive(Debug, Clone, Copy)]
pub struct ObjectSerializer<'a> {
    numbers: &'a [u32],
}

impl<'a> ObjectSerializer<'a> {
    /// Create a serializer over a numbering table.
    pub fn new(numbers: &'a [u32]) -> Self {
        Self { numbers }
    }

    /// Serialize an object to bytes.
    pub fn serialize(&self, obj: &Object) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_object(&mut buf, obj)?;
        Ok(buf)
    }

    /// Serialize an object to a string (for debugging and tests).
    pub fn serialize_to_string(&self, obj: &Object) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.serialize(obj)?).into_owned())
    }

    /// Write an object.
    pub fn write_object<W: Write>(&self, w: &mut W, obj: &Object) -> std::io::Result<()> {
        match obj {
            Object::Null => write!(w, "null"),
            Object::Boolean(b) => write!(w, "{}", if *b { "true" } else { "false" }),
            Object::Integer(i) => write!(w, "{}", i),
            Object::Real(r) => write!(w, "{}", format_real(*r)),
            Object::String(s) => self.write_string(w, s),
            Object::Name(n) => write_name(w, n),
            Object::Array(arr) => self.write_array(w, arr),
            Object::Dictionary(dict) => self.write_dictionary(w, dict, None),
            Object::Stream(stream) => {
                self.write_dictionary(w, &stream.dict, Some(stream.data.len()))?;
                write!(w, "\nstream\n")?;
                w.write_all(&stream.data)?;
                write!(w, "\nendstream")
            },
            Object::Reference(id) => {
                let number = self.numbers.get(id.index()).copied().unwrap_or(0);
                write!(w, "{} 0 R", number)
            },
        }
    }

    /// Write a string.
    ///
    /// Uses literal syntax `(...)` with escaping for printable ASCII,
    /// hex syntax `<...>` otherwise.
    fn write_string<W: Write>(&self, w: &mut W, data: &[u8]) -> std::io::Result<()> {
        let is_printable = data
            .iter()
            .all(|&b| b == b'\n' || b == b'\r' || b == b'\t' || (0x20..=0x7E).contains(&b));

        if is_printable {
            write!(w, "(")?;
            for &byte in data {
                match byte {
                    b'(' => write!(w, "\\(")?,
                    b')' => write!(w, "\\)")?,
                    b'\\' => write!(w, "\\\\")?,
                    b'\n' => write!(w, "\\n")?,
                    b'\r' => write!(w, "\\r")?,
                    b'\t' => write!(w, "\\t")?,
                    _ => w.write_all(&[byte])?,
                }
            }
            write!(w, ")")
        } else {
            write!(w, "<")?;
            for byte in data {
                write!(w, "{:02X}", byte)?;
            }
            write!(w, ">")
        }
    }

    fn write_array<W: Write>(&self, w: &mut W, arr: &[Object]) -> std::io::Result<()> {
        write!(w, "[")?;
        for (i, obj) in arr.iter().enumerate() {
            if i > 0 {
                write!(w, " ")?;
            }
            self.write_object(w, obj)?;
        }
        write!(w, "]")
    }

    /// Write a dictionary in insertion order. Stream dictionaries get
    /// `/Length` first.
    fn write_dictionary<W: Write>(
        &self,
        w: &mut W,
        dict: &Dict,
        stream_length: Option<usize>,
    ) -> std::io::Result<()> {
        write!(w, "<<")?;
        if let Some(len) = stream_length {
            write!(w, " /Length {}", len)?;
        }
        for (key, value) in dict {
            if stream_length.is_some() && key == "Length" {
                continue;
            }
            write!(w, " ")?;
            write_name(w, key)?;
            write!(w, " ")?;
            self.write_object(w, value)?;
        }
        write!(w, " >>")
    }
}

/// Write a name with a leading `/`, escaping delimiters as `#xx`.
pub fn write_name<W: Write>(w: &mut W, name: &str) -> std::io::Result<()> {
    write!(w, "/")?;
    for byte in name.bytes() {
        match byte {
            b'!'
            | b'"'
            | b'$'..=b'&'
            | b'\''
            | b'*'..=b'.'
            | b'0'..=b'9'
            | b';'
            | b'='
            | b'?'
            | b'@'
            | b'A'..=b'Z'
            | b'^'..=b'z'
            | b'|'
            | b'~' => {
                w.write_all(&[byte])?;
            },
            _ => {
                write!(w, "#{:02X}", byte)?;
            },
        }
    }
    Ok(())
}

/// Writer that tracks the byte offset of everything written through it.
#[derive(Debug)]
struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.count += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// File-level layout: header, object blocks, xref and trailer.
///
/// Records the offset of every object block as it is written.
#[derive(Debug)]
pub struct PdfFileWriter<W> {
    out: CountingWriter<W>,
    offsets: Vec<u64>,
}

impl<W: Write> PdfFileWriter<W> {
    /// Wrap a sink.
    pub fn new(inner: W) -> Self {
        Self {
            out: CountingWriter { inner, count: 0 },
            offsets: Vec::new(),
        }
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.out.count
    }

    /// `%PDF-<version>` line.
    pub fn write_header(&mut self, version: &str) -> Result<()> {
        write!(self.out, "%PDF-{}\n", version)?;
        Ok(())
    }

    /// One `n 0 obj ... endobj` block. Objects must arrive in number order.
    pub fn write_object(
        &mut self,
        number: u32,
        obj: &Object,
        serializer: &ObjectSerializer<'_>,
    ) -> Result<()> {
        self.offsets.push(self.out.count);
        write!(self.out, "{} 0 obj\n", number)?;
        serializer.write_object(&mut self.out, obj)?;
        write!(self.out, "\nendobj\n")?;
        Ok(())
    }

    /// Cross-reference table, trailer and end-of-file marker.
    pub fn write_xref_and_trailer(&mut self, root: u32, info: Option<u32>) -> Result<()> {
        let xref_offset = self.out.count;
        let size = self.offsets.len() + 1;

        write!(self.out, "xref\n0 {}\n", size)?;
        write!(self.out, "0000000000 65535 f \n")?;
        for offset in &self.offsets {
            write!(self.out, "{:010} 00000 n \n", offset)?;
        }

        write!(self.out, "trailer\n<< /Size {} /Root {} 0 R", size, root)?;
        if let Some(info) = info {
            write!(self.out, " /Info {} 0 R", info)?;
        }
        write!(self.out, " >>\nstartxref\n{}\n%%EOF\n", xref_offset)?;
        self.out.flush()?;
        Ok(())
    }
}
