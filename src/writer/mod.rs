//! PDF writing module: compiles a [`Document`](crate::elements::Document)
//! into PDF bytes.
//!
//! ## Architecture
//!
//! ```text
//! Document
//!     ↓
//! [filters] (filtered figures flattened per policy)
//!     ↓
//! [discovery] (fonts, alphas, images, layers)
//!     ↓
//! [font_embedder] / [graphics_state] / [image_handler] / [layers]
//!     ↓
//! [content_stream] (figures → content stream bytes, gradient usages)
//!     ↓
//! [shading] (patterns and luminosity soft masks)
//!     ↓
//! [bounds] + [annotation_builder] (tagged rectangles → link annotations)
//!     ↓
//! [ObjectGraph] (unnumbered arena)
//!     ↓
//! [object_serializer] (numbering, xref, trailer)
//!     ↓
//! PDF bytes
//! ```
//!
//! ## Usage
//!
//! ```
//! use scene_pdf::config::CompileOptions;
//! use scene_pdf::elements::{Color, Document, Page, PathFigure, Figure};
//! use scene_pdf::writer::PdfCompiler;
//!
//! let mut page = Page::new(100.0, 100.0);
//! page.figures.push(Figure::Path(
//!     PathFigure::rect(5.0, 5.0, 10.0, 10.0).with_fill(Color::black()),
//! ));
//! let mut doc = Document::new();
//! doc.push(page);
//!
//! let compiler = PdfCompiler::new(CompileOptions::default().with_compress(false));
//! let bytes = compiler.compile(&doc).unwrap();
//! assert!(String::from_utf8_lossy(&bytes).contains("5 5 m"));
//! ```

pub mod annotation_builder;
pub mod bounds;
pub mod compress;
pub mod content_stream;
pub mod discovery;
pub mod filters;
pub mod font_embedder;
pub mod graphics_state;
pub mod image_handler;
pub mod layers;
pub mod object_graph;
pub mod object_serializer;
mod pdf_writer;
pub mod shading;

pub use annotation_builder::{LinkAction, LinkAnnotation, LinkResolver};
pub use bounds::{tagged_bounds, TaggedBoundsTable, TransformState};
pub use content_stream::{ContentStreamBuilder, ContentStreamOp, TextArrayItem};
pub use discovery::{discover, DiscoveredResources};
pub use font_embedder::{EmbeddedFamily, FontEmbedder};
pub use graphics_state::{ExtGStateBuilder, SoftMask};
pub use layers::{Layer, OptionalContent};
pub use object_graph::ObjectGraph;
pub use object_serializer::ObjectSerializer;
pub use pdf_writer::{compile, compile_to, PdfCompiler};
pub use shading::{ShadingColorSpace, ShadingSynthesizer};
