// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::enum_variant_names)]
#![allow(clippy::collapsible_if)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # PDF Text Layer
//!
//! Page text layers for interactive PDF viewers: reconstruct words, lines and
//! blocks from decoded glyphs, index them in reading order, and drive text
//! selection across pages.
//!
//! ## Core Features
//!
//! - **Duplicate Filter**: drops glyphs painted twice for fake bold (R-tree backed)
//! - **Oriented Bounding Boxes**: rotation-aware boxes for horizontal, vertical and
//!   arbitrarily rotated text
//! - **Reading Order**: per-orientation ordering of words, lines and blocks
//! - **Text Layer Index**: point queries, global word indexing and lazy word ranges
//! - **Selection Model**: anchor/focus selection with partial words, cross-page
//!   ranges and cancellable async page loading
//!
//! ## Architecture
//!
//! ```text
//! GlyphSource ─► TextLayerPipeline ─► TextLayer ─► TextSelection
//!                 (dedup, clustering,   (index)     (anchor/focus,
//!                  reading order)                    per-page cache)
//! ```
//!
//! Clustering sits behind the [`layout::WordExtractor`] and
//! [`layout::PageSegmenter`] traits; the crate ships a baseline-gap
//! implementation of both.
//!
//! ## Quick Start
//!
//! ```
//! use pdf_text_layer::geometry::OrientedRect;
//! use pdf_text_layer::layout::Letter;
//! use pdf_text_layer::{LayoutConfig, TextLayerPipeline, TextSelection};
//!
//! # fn main() -> pdf_text_layer::Result<()> {
//! let letters: Vec<Letter> = "Hello World"
//!     .chars()
//!     .enumerate()
//!     .map(|(i, c)| {
//!         let x = i as f64 * 6.0;
//!         Letter::new(c.to_string(), OrientedRect::from_edges(x, 0.0, x + 6.0, 10.0), 10.0, i)
//!     })
//!     .collect();
//!
//! let pipeline = TextLayerPipeline::with_config(LayoutConfig::default());
//! let layer = pipeline.process_page(1, letters, Vec::new())?;
//! assert_eq!(layer.text(), "Hello World");
//!
//! let mut selection = TextSelection::new(1);
//! selection.select_word(1, layer.word_at(1)?)?;
//! let copied = selection.get_selection_for_page_as(&layer, |w| w.text(), |w, s, e| {
//!     w.text_between(s, e).unwrap_or_default()
//! })?;
//! assert_eq!(copied, vec!["World"]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry primitives
pub mod geometry;

// Layout reconstruction
pub mod layout;

// Per-page pipeline
pub mod pipeline;

// Indexed page text
pub mod text_layer;

// Selection model
pub mod selection;

// Lazy per-document loading
pub mod document;

// Re-exports
pub use config::LayoutConfig;
pub use document::{DocumentTextLayers, GlyphSource, PageGlyphs, TextLayerLoader};
pub use error::{Error, Result};
pub use pipeline::TextLayerPipeline;
pub use selection::{CancelFlag, SelectionEndpoint, TextSelection};
pub use text_layer::{Annotation, LinkAction, TextLayer, WordRange};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
