//! Compilation options.

use crate::elements::FilterRasterizer;
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

/// Prefix of a link destination that toggles an optional-content layer.
pub const LAYER_TOGGLE_PREFIX: &str = "ocg-toggle:";

/// Prefix of a link destination that names a tag in the same document.
pub const INTERNAL_LINK_PREFIX: &str = "#";

/// How text figures are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// Embed the used glyphs and show text with text operators
    #[default]
    SubsetAndEmbed,
    /// Draw glyph outlines as paths; no fonts are embedded
    ConvertTextToPaths,
}

/// What to do with figures drawn through a filter effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPolicy {
    /// Bake them into an image with the configured rasterizer
    #[default]
    Rasterize,
    /// Draw the content without the effect
    IgnoreFilter,
    /// Leave the content out
    SkipFiltered,
}

/// Document information dictionary entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Document keywords
    pub keywords: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Producer application
    pub producer: Option<String>,
}

impl DocumentInfo {
    /// True when no entry is set; no info object is written then.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Set entries in dictionary order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Keywords", &self.keywords),
            ("Creator", &self.creator),
            ("Producer", &self.producer),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

/// Configuration for compiling a document.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// PDF version written in the header (e.g., "1.7")
    pub version: String,
    /// How text is written
    pub text_mode: TextMode,
    /// Whether to Flate-compress stream bodies
    pub compress: bool,
    /// Tag -> destination: a URI, `#tag`, or `ocg-toggle:layer`
    pub link_destinations: IndexMap<String, String>,
    /// Handling of filtered figures
    pub filter_policy: FilterPolicy,
    /// Rasterizer used by [`FilterPolicy::Rasterize`]
    pub rasterizer: Option<Arc<dyn FilterRasterizer>>,
    /// Layers that start hidden
    pub hidden_layers: IndexSet<String>,
    /// Document information entries
    pub info: DocumentInfo,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            text_mode: TextMode::SubsetAndEmbed,
            compress: true,
            link_destinations: IndexMap::new(),
            filter_policy: FilterPolicy::Rasterize,
            rasterizer: None,
            hidden_layers: IndexSet::new(),
            info: DocumentInfo::default(),
        }
    }
}

impl CompileOptions {
    /// Set the header version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Choose how text is written.
    pub fn with_text_mode(mut self, mode: TextMode) -> Self {
        self.text_mode = mode;
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Register a link destination for a tag.
    pub fn with_link(mut self, tag: impl Into<String>, destination: impl Into<String>) -> Self {
        self.link_destinations.insert(tag.into(), destination.into());
        self
    }

    /// Choose the filter policy.
    pub fn with_filter_policy(mut self, policy: FilterPolicy) -> Self {
        self.filter_policy = policy;
        self
    }

    /// Supply a filter rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn FilterRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// Start a layer hidden.
    pub fn with_hidden_layer(mut self, layer: impl Into<String>) -> Self {
        self.hidden_layers.insert(layer.into());
        self
    }

    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.info.title = Some(title.into());
        self
    }

    /// Set document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.info.author = Some(author.into());
        self
    }

    /// Set the producer entry.
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.info.producer = Some(producer.into());
        self
    }
}
