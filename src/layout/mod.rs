//! Layout reconstruction for a page of glyphs.
//!
//! This module turns an unordered set of letters into a typed hierarchy:
//! - duplicate glyph removal (R-tree backed)
//! - clustering of letters into words, lines and blocks (pluggable)
//! - rotation-aware bounding boxes at every level
//! - reading order and index assignment

pub mod aggregator;
pub mod bounding_box;
pub mod clustering;
pub mod dedup;
pub mod letter;
pub mod reading_order;
pub mod text_block;

// Re-export main types
pub use aggregator::build_blocks;
pub use bounding_box::compute_bounding_box;
pub use clustering::{
    BaselineSegmenter, BaselineWordExtractor, BlockCandidate, LineCandidate, PageSegmenter,
    WordCandidate, WordExtractor,
};
pub use dedup::{remove_duplicate_letters, DuplicateLetterFilter};
pub use letter::{
    dominant_orientation, LayoutElement, Letter, TextOrientation, ORIENTATION_TOLERANCE_DEGREES,
};
pub use reading_order::{order_blocks, order_by_reading_order, order_lines};
pub use text_block::{TextBlock, TextLine, Word};
