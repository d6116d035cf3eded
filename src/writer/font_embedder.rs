//! Font embedding.
//!
//! Each discovered family is split into the characters the single-byte
//! table can encode and those it cannot. The first half becomes a simple
//! font with `/WinAnsiEncoding`, the second a Type0 font over a CID font
//! addressed by glyph index. Both share one font program stream, subset
//! once per family. Standard 14 faces that need no glyph-indexed text are
//! referenced by name only.

use super::discovery::{DiscoveredResources, FamilyUsage};
use super::object_graph::ObjectGraph;
use crate::error::{Error, Result};
use crate::fonts::encoding::encode_char;
use crate::fonts::{FaceMetrics, FontProgramKind, FontProvider, FontSubset};
use crate::object::{dict, Object, ObjectId, Stream};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Descriptor flag bits (ISO 32000-1, Table 123).
const FLAG_FIXED_PITCH: i64 = 1;
const FLAG_SERIF: i64 = 1 << 1;
const FLAG_SYMBOLIC: i64 = 1 << 2;
const FLAG_NONSYMBOLIC: i64 = 1 << 5;
const FLAG_ITALIC: i64 = 1 << 6;

/// Stem width placeholders.
const STEM_V_REGULAR: i64 = 80;
const STEM_V_BOLD: i64 = 140;

/// Font objects written for one family.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedFamily {
    /// Single-byte font, referenced as `/F{i}`
    pub simple: Option<ObjectId>,
    /// Glyph-indexed Type0 font, referenced as `/U{i}`
    pub composite: Option<ObjectId>,
    /// Glyph index of every non-encodable character
    pub glyphs: HashMap<char, u16>,
}

impl EmbeddedFamily {
    /// Glyph index used to show a character through the composite font.
    pub fn glyph(&self, ch: char) -> Option<u16> {
        self.glyphs.get(&ch).copied()
    }
}

/// Deterministic six-letter subset prefixes, unique within a document.
#[derive(Debug, Default)]
pub struct SubsetTagger {
    used: HashSet<String>,
}

impl SubsetTagger {
    /// Empty tagger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the tag for a family's partition from a digest of its
    /// identity and characters. A collision re-derives with a counter.
    ///
    /// # Examples
    ///
    /// ```
    /// use scene_pdf::writer::font_embedder::SubsetTagger;
    ///
    /// let mut tagger = SubsetTagger::new();
    /// let tag = tagger.tag("DejaVuSans.ttf", "simple", &['a', 'b']);
    /// assert_eq!(tag.len(), 6);
    /// assert!(tag.chars().all(|c| c.is_ascii_uppercase()));
    /// ```
    pub fn tag(&mut self, family_key: &str, partition: &str, chars: &[char]) -> String {
        let mut counter: u32 = 0;
        loop {
            let mut hasher = Sha256::new();
            hasher.update(family_key.as_bytes());
            hasher.update([0]);
            hasher.update(partition.as_bytes());
            hasher.update([0]);
            for ch in chars {
                let mut buf = [0u8; 4];
                hasher.update(ch.encode_utf8(&mut buf).as_bytes());
            }
            if counter > 0 {
                hasher.update(counter.to_be_bytes());
            }
            let digest = hasher.finalize();
            let tag: String = digest[..6].iter().map(|b| (b'A' + b % 26) as char).collect();
            if self.used.insert(tag.clone()) {
                return tag;
            }
            counter += 1;
        }
    }
}

/// Writes font objects into the graph.
pub struct FontEmbedder<'a> {
    graph: &'a mut ObjectGraph,
    compress: bool,
    tagger: SubsetTagger,
}

impl<'a> FontEmbedder<'a> {
    /// Embedder writing into `graph`.
    pub fn new(graph: &'a mut ObjectGraph, compress: bool) -> Self {
        Self {
            graph,
            compress,
            tagger: SubsetTagger::new(),
        }
    }

    /// Embed every discovered family. The result is positionally aligned
    /// with `resources.families`.
    pub fn embed_all(&mut self, resources: &DiscoveredResources) -> Result<Vec<EmbeddedFamily>> {
        let embedded = resources
            .families
            .values()
            .map(|usage| self.embed_family(usage))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("Embedded {} font families", embedded.len());
        Ok(embedded)
    }

    /// Embed one family.
    pub fn embed_family(&mut self, usage: &FamilyUsage) -> Result<EmbeddedFamily> {
        // Only empty strings used this family; no text operator will name it
        if usage.chars.is_empty() {
            log::debug!("Font '{}' shows no characters, not embedded", usage.family.key());
            return Ok(EmbeddedFamily::default());
        }

        let provider = usage.family.provider();
        let partition = usage.partition();

        if let (Some(builtin), true) = (provider.builtin_name(), partition.non_encodable.is_empty())
        {
            let font = self.graph.add(Object::dict(vec![
                ("Type", Object::name("Font")),
                ("Subtype", Object::name("Type1")),
                ("BaseFont", Object::name(builtin)),
                ("Encoding", Object::name("WinAnsiEncoding")),
            ]));
            log::debug!("Font '{}' referenced as built-in {}", usage.family.key(), builtin);
            return Ok(EmbeddedFamily {
                simple: Some(font),
                ..Default::default()
            });
        }

        let all: Vec<char> = usage.chars.iter().copied().collect();
        let subset = provider.subset(&all)?;
        let program = self.add_font_program(&subset)?;
        let mut embedded = EmbeddedFamily::default();

        if !partition.encodable.is_empty() {
            let tag = self.tagger.tag(usage.family.key(), "simple", &partition.encodable);
            embedded.simple = Some(self.add_simple_font(
                provider,
                &tag,
                &partition.encodable,
                program,
                subset.kind,
            ));
        }

        if !partition.non_encodable.is_empty() {
            let tag = self.tagger.tag(usage.family.key(), "composite", &partition.non_encodable);
            let mut glyphs = HashMap::new();
            for &ch in &partition.non_encodable {
                let gid = subset.glyph(ch).ok_or_else(|| Error::GlyphNotFound {
                    font: provider.postscript_name().to_string(),
                    codepoint: ch as u32,
                })?;
                glyphs.insert(ch, gid);
            }
            embedded.composite =
                Some(self.add_composite_font(provider, &tag, &glyphs, program, subset.kind)?);
            embedded.glyphs = glyphs;
        }

        log::debug!(
            "Embedded font '{}': {} single-byte, {} glyph-indexed characters",
            usage.family.key(),
            partition.encodable.len(),
            partition.non_encodable.len()
        );
        Ok(embedded)
    }

    fn add_font_program(&mut self, subset: &FontSubset) -> Result<ObjectId> {
        let mut d = dict(vec![("Length1", Object::Integer(subset.program.len() as i64))]);
        if subset.kind == FontProgramKind::OpenType {
            d.insert("Subtype".to_string(), Object::name("OpenType"));
        }
        let stream = Stream::with_compression(d, &subset.program, self.compress)?;
        Ok(self.graph.add(Object::Stream(stream)))
    }

    fn add_descriptor(
        &mut self,
        provider: &dyn FontProvider,
        base_font: &str,
        symbolic: bool,
        program: ObjectId,
        kind: FontProgramKind,
    ) -> ObjectId {
        let metrics = provider.metrics();
        let program_key = match kind {
            FontProgramKind::TrueType => "FontFile2",
            FontProgramKind::OpenType => "FontFile3",
        };
        self.graph.add(Object::dict(vec![
            ("Type", Object::name("FontDescriptor")),
            ("FontName", Object::name(base_font)),
            ("Flags", Object::Integer(descriptor_flags(metrics, symbolic))),
            (
                "FontBBox",
                Object::reals(&[metrics.bbox.x0, metrics.bbox.y0, metrics.bbox.x1, metrics.bbox.y1]),
            ),
            ("ItalicAngle", Object::Real(metrics.italic_angle)),
            ("Ascent", Object::Real(metrics.ascent)),
            ("Descent", Object::Real(metrics.descent)),
            ("CapHeight", Object::Real(metrics.cap_height)),
            (
                "StemV",
                Object::Integer(if metrics.bold { STEM_V_BOLD } else { STEM_V_REGULAR }),
            ),
            (program_key, Object::Reference(program)),
        ]))
    }

    fn add_simple_font(
        &mut self,
        provider: &dyn FontProvider,
        tag: &str,
        chars: &[char],
        program: ObjectId,
        kind: FontProgramKind,
    ) -> ObjectId {
        let base_font = format!("{}+{}", tag, sanitize_font_name(provider.postscript_name()));
        let descriptor = self.add_descriptor(provider, &base_font, false, program, kind);

        let codes: BTreeMap<u8, char> = chars
            .iter()
            .filter_map(|&ch| encode_char(ch).map(|code| (code, ch)))
            .collect();
        let first = codes.keys().next().copied().unwrap_or(0);
        let last = codes.keys().next_back().copied().unwrap_or(0);
        let widths: Vec<Object> = (first..=last)
            .map(|code| match codes.get(&code) {
                Some(&ch) => Object::Real(provider.advance(ch)),
                None => Object::Integer(0),
            })
            .collect();

        self.graph.add(Object::dict(vec![
            ("Type", Object::name("Font")),
            ("Subtype", Object::name("TrueType")),
            ("BaseFont", Object::name(&base_font)),
            ("FirstChar", Object::Integer(first as i64)),
            ("LastChar", Object::Integer(last as i64)),
            ("Widths", Object::Array(widths)),
            ("FontDescriptor", Object::Reference(descriptor)),
            ("Encoding", Object::name("WinAnsiEncoding")),
        ]))
    }

    fn add_composite_font(
        &mut self,
        provider: &dyn FontProvider,
        tag: &str,
        glyphs: &HashMap<char, u16>,
        program: ObjectId,
        kind: FontProgramKind,
    ) -> Result<ObjectId> {
        let base_font = format!("{}+{}", tag, sanitize_font_name(provider.postscript_name()));
        let descriptor = self.add_descriptor(provider, &base_font, true, program, kind);

        let widths: BTreeMap<u16, f64> = glyphs
            .iter()
            .map(|(&ch, &gid)| (gid, provider.advance(ch)))
            .collect();

        let mut cid_font = dict(vec![
            ("Type", Object::name("Font")),
            (
                "Subtype",
                Object::name(match kind {
                    FontProgramKind::TrueType => "CIDFontType2",
                    FontProgramKind::OpenType => "CIDFontType0",
                }),
            ),
            ("BaseFont", Object::name(&base_font)),
            (
                "CIDSystemInfo",
                Object::dict(vec![
                    ("Registry", Object::string("Adobe")),
                    ("Ordering", Object::string("Identity")),
                    ("Supplement", Object::Integer(0)),
                ]),
            ),
            ("FontDescriptor", Object::Reference(descriptor)),
            ("W", cid_widths(&widths)),
        ]);
        if kind == FontProgramKind::TrueType {
            cid_font.insert("CIDToGIDMap".to_string(), Object::name("Identity"));
        }
        let cid_font = self.graph.add(Object::Dictionary(cid_font));

        let cmap = to_unicode_cmap(glyphs);
        let to_unicode = Stream::with_compression(dict(vec![]), cmap.as_bytes(), self.compress)?;
        let to_unicode = self.graph.add(Object::Stream(to_unicode));

        Ok(self.graph.add(Object::dict(vec![
            ("Type", Object::name("Font")),
            ("Subtype", Object::name("Type0")),
            ("BaseFont", Object::name(&base_font)),
            ("Encoding", Object::name("Identity-H")),
            ("DescendantFonts", Object::Array(vec![Object::Reference(cid_font)])),
            ("ToUnicode", Object::Reference(to_unicode)),
        ])))
    }
}

fn descriptor_flags(metrics: &FaceMetrics, symbolic: bool) -> i64 {
    let mut flags = if symbolic {
        FLAG_SYMBOLIC
    } else {
        FLAG_NONSYMBOLIC
    };
    if metrics.fixed_pitch {
        flags |= FLAG_FIXED_PITCH;
    }
    if metrics.serif {
        flags |= FLAG_SERIF;
    }
    if metrics.italic {
        flags |= FLAG_ITALIC;
    }
    flags
}

/// Keep the characters a font name may carry.
fn sanitize_font_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "Font".to_string()
    } else {
        cleaned
    }
}

/// `/W` array grouping runs of consecutive glyph indices:
/// `[g [w w ...] g' [w ...]]`.
fn cid_widths(widths: &BTreeMap<u16, f64>) -> Object {
    let mut out = Vec::new();
    let mut run: Vec<Object> = Vec::new();
    let mut run_start: Option<u16> = None;
    let mut prev: Option<u16> = None;

    for (&gid, &width) in widths {
        let contiguous = matches!(prev, Some(p) if p.checked_add(1) == Some(gid));
        if !contiguous {
            if let Some(start) = run_start {
                out.push(Object::Integer(start as i64));
                out.push(Object::Array(std::mem::take(&mut run)));
            }
            run_start = Some(gid);
        }
        run.push(Object::Real(width));
        prev = Some(gid);
    }
    if let Some(start) = run_start {
        out.push(Object::Integer(start as i64));
        out.push(Object::Array(run));
    }
    Object::Array(out)
}

/// ToUnicode CMap mapping glyph indices back to characters.
fn to_unicode_cmap(glyphs: &HashMap<char, u16>) -> String {
    let mut cmap = String::new();

    cmap.push_str("/CIDInit /ProcSet findresource begin\n");
    cmap.push_str("12 dict begin\n");
    cmap.push_str("begincmap\n");
    cmap.push_str("/CIDSystemInfo <<\n");
    cmap.push_str("  /Registry (Adobe)\n");
    cmap.push_str("  /Ordering (UCS)\n");
    cmap.push_str("  /Supplement 0\n");
    cmap.push_str(">> def\n");
    cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
    cmap.push_str("/CMapType 2 def\n");
    cmap.push_str("1 begincodespacerange\n");
    cmap.push_str("<0000> <FFFF>\n");
    cmap.push_str("endcodespacerange\n");

    let mut mappings: Vec<(u16, u32)> = glyphs.iter().map(|(&ch, &gid)| (gid, ch as u32)).collect();
    mappings.sort_unstable();
    mappings.dedup_by_key(|(gid, _)| *gid);

    // At most 100 entries per bfchar section
    for chunk in mappings.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for &(gid, unicode) in chunk {
            if unicode <= 0xFFFF {
                cmap.push_str(&format!("<{:04X}> <{:04X}>\n", gid, unicode));
            } else {
                let high = ((unicode - 0x10000) >> 10) + 0xD800;
                let low = ((unicode - 0x10000) & 0x3FF) + 0xDC00;
                cmap.push_str(&format!("<{:04X}> <{:04X}{:04X}>\n", gid, high, low));
            }
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\n");
    cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
    cmap.push_str("end\n");
    cmap.push_str("end\n");
    cmap
}
