//! Error types for scene compilation.
//!
//! Every failure the compiler can report is fatal except unresolved link
//! destinations, which never reach this module (they are logged and skipped).

/// Result type alias for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compiling a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A page popped its transform stack while it was empty, or ended with saves left open
    #[error("Unbalanced graphics state on page {page}: {reason}")]
    UnbalancedState {
        /// Zero-based page index
        page: usize,
        /// What went wrong
        reason: String,
    },

    /// Object graph or document structure is inconsistent (root, reserved slots, stops)
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// A character routed to glyph-indexed encoding has no glyph in its font
    #[error("No glyph for character U+{codepoint:04X} in font '{font}'")]
    GlyphNotFound {
        /// PostScript name of the font
        font: String,
        /// Unicode scalar value that could not be mapped
        codepoint: u32,
    },

    /// A resource that an earlier pass should have discovered is missing
    #[error("Resource lookup failed: {0}")]
    ResourceLookup(String),

    /// A filter effect must be rasterized but no rasterizer is configured
    #[error(
        "Filter effect '{filter}' must be rasterized but no rasterizer is configured; \
         either supply a FilterRasterizer in CompileOptions, \
         or choose FilterPolicy::IgnoreFilter to draw the unfiltered content, \
         or FilterPolicy::SkipFiltered to drop filtered content"
    )]
    RasterizerUnavailable {
        /// Name of the filter effect
        filter: String,
    },

    /// Font data could not be parsed or embedded
    #[error("Font error: {0}")]
    Font(String),

    /// Image data could not be decoded
    #[error("Image error: {0}")]
    Image(String),

    /// IO error from the output sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unbalanced state stacks or a malformed object graph
    Structural,
    /// An invariant established by an earlier pass does not hold
    Lookup,
    /// A required external capability is absent
    UnsupportedEnvironment,
    /// Caller-supplied font or image data is unusable
    InvalidInput,
    /// The output sink failed
    Io,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnbalancedState { .. } | Error::InvalidStructure(_) => ErrorKind::Structural,
            Error::GlyphNotFound { .. } | Error::ResourceLookup(_) => ErrorKind::Lookup,
            Error::RasterizerUnavailable { .. } => ErrorKind::UnsupportedEnvironment,
            Error::Font(_) | Error::Image(_) => ErrorKind::InvalidInput,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether this error aborts compilation.
    ///
    /// Always true today; unresolved link tags are skipped before an error is built.
    pub fn is_fatal(&self) -> bool {
        true
    }
}
