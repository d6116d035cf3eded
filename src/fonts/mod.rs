//! Fonts: the single-byte encoding table and glyph/metrics providers.
//!
//! The compiler never parses font files itself; it talks to a
//! [`FontProvider`]. Two providers ship with the crate: [`Base14Font`] for
//! the standard faces every viewer has, and [`TrueTypeFont`] for embedded
//! TrueType/OpenType programs.

pub mod base14;
pub mod encoding;
pub mod provider;
pub mod truetype;

pub use base14::Base14Font;
pub use provider::{FaceMetrics, Font, FontFamily, FontProgramKind, FontProvider, FontSubset};
pub use truetype::TrueTypeFont;
