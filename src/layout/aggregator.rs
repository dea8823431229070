//! Assembly of clustered candidates into the indexed block/line/word tree.
//!
//! Candidates arrive in whatever order the segmenter produced them. Every
//! level is put in reading order first, then a single pass hands out the
//! page-global word and line indices, so that blocks partition the words of
//! the page with no gaps.

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::geometry::OrientedRect;
use crate::layout::bounding_box::compute_bounding_box;
use crate::layout::clustering::BlockCandidate;
use crate::layout::letter::{LayoutElement, Letter, TextOrientation};
use crate::layout::reading_order::{order_blocks, order_by_reading_order, order_lines};
use crate::layout::text_block::{TextBlock, TextLine, Word};

/// An ordered group of elements with its bounding box, before indexing.
#[derive(Debug)]
struct Group<T> {
    members: Vec<T>,
    bounding_box: OrientedRect,
    orientation: TextOrientation,
}

impl<T: LayoutElement> Group<T> {
    /// Order `members` with `order` and compute the group box. Empty input yields `None`.
    fn build(members: Vec<T>, order: fn(Vec<T>) -> Result<Vec<T>>) -> Result<Option<Self>> {
        if members.is_empty() {
            return Ok(None);
        }
        let members = order(members)?;
        let (bounding_box, orientation) = compute_bounding_box(&members)?;
        Ok(Some(Self {
            members,
            bounding_box,
            orientation,
        }))
    }
}

impl<T> LayoutElement for Group<T> {
    fn bounding_box(&self) -> &OrientedRect {
        &self.bounding_box
    }

    fn text_orientation(&self) -> TextOrientation {
        self.orientation
    }
}

type WordGroup = Group<Letter>;
type LineGroup = Group<WordGroup>;
type BlockGroup = Group<LineGroup>;

/// Build the ordered, indexed blocks of a page from clustered candidates.
///
/// Empty candidates at any level are dropped.
///
/// # Errors
///
/// `InvalidState` when ordering or bounding-box construction meets corrupt
/// geometry.
pub fn build_blocks(
    candidates: Vec<BlockCandidate>,
    config: &LayoutConfig,
) -> Result<Vec<TextBlock>> {
    let mut groups: Vec<BlockGroup> = Vec::with_capacity(candidates.len());
    for block in candidates {
        let mut lines: Vec<LineGroup> = Vec::with_capacity(block.len());
        for line in block {
            let mut words: Vec<WordGroup> = Vec::with_capacity(line.len());
            for word in line {
                if let Some(group) = Group::build(word, order_by_reading_order)? {
                    words.push(group);
                }
            }
            if let Some(group) = Group::build(words, order_by_reading_order)? {
                lines.push(group);
            }
        }
        if let Some(group) = Group::build(lines, order_lines)? {
            groups.push(group);
        }
    }
    let groups = order_blocks(groups, config.block_row_tolerance);

    let mut blocks = Vec::with_capacity(groups.len());
    let mut word_index = 0;
    let mut line_index = 0;
    for (block_index, block) in groups.into_iter().enumerate() {
        let mut lines = Vec::with_capacity(block.members.len());
        for line in block.members {
            let mut words = Vec::with_capacity(line.members.len());
            for word in line.members {
                words.push(Word::new(word.members, word_index, line_index, block_index)?);
                word_index += 1;
            }
            lines.push(TextLine::new(words, line_index, block_index)?);
            line_index += 1;
        }
        blocks.push(TextBlock::new(lines, block_index)?);
    }

    log::trace!(
        "Aggregated {} blocks, {} lines, {} words",
        blocks.len(),
        line_index,
        word_index
    );
    Ok(blocks)
}
