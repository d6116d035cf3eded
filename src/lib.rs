// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::should_implement_trait)]

//! # Scene PDF
//!
//! Compiles page-based vector scenes into byte-exact PDF files.
//!
//! ## Core Features
//!
//! - **Figure IR**: paths, text runs, raster images, affine transforms,
//!   optional-content brackets and filtered groups, recorded per page
//! - **Font Embedding**: each family is split into a single-byte TrueType
//!   font and a glyph-indexed Type0 font, both over one shared font program
//! - **Gradients**: linear and radial shading patterns with stop alpha
//!   realised as a luminosity soft mask
//! - **Links**: external URIs, same-document destinations and layer toggles
//!   resolved from tagged figure bounds
//! - **Optional Content**: layers and visibility expressions
//! - **Deterministic Output**: object numbers, resource names and subset
//!   tags depend only on the input
//!
//! ## Architecture
//!
//! Every PDF object is appended to one arena as it is built and referenced
//! through in-memory handles. Numbers are assigned in a single pass right
//! before serialization, so forward references never need backpatching.
//!
//! ## Quick Start
//!
//! ```
//! use scene_pdf::config::CompileOptions;
//! use scene_pdf::elements::{Color, Document, FillRule, PageRecorder};
//!
//! # fn main() -> scene_pdf::Result<()> {
//! let mut recorder = PageRecorder::new(200.0, 100.0);
//! recorder
//!     .set_background(Color::white())
//!     .rect(10.0, 10.0, 50.0, 20.0)
//!     .fill(Color::rgb(0.8, 0.1, 0.1), FillRule::NonZero);
//!
//! let mut doc = Document::new();
//! doc.push(recorder.finish());
//!
//! let options = CompileOptions::default().with_title("Quick Start");
//! let bytes = scene_pdf::compile(&doc, &options)?;
//! assert!(bytes.starts_with(b"%PDF-1.7"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Object model and geometry
pub mod geometry;
pub mod object;

// Scene description
pub mod elements;
pub mod fonts;

// PDF writing
pub mod writer;

pub use config::{CompileOptions, FilterPolicy, TextMode};
pub use error::{Error, ErrorKind, Result};
pub use writer::{compile, compile_to, PdfCompiler};
