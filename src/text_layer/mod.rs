//! The per-page text layer: an immutable, indexed view over blocks, lines
//! and words plus the link annotations of the page.
//!
//! A layer is built once, after which it is only read. It is `Send + Sync`
//! and can be shared between threads behind an `Arc`.

mod annotation;

pub use annotation::{Annotation, LinkAction};

use crate::error::{Error, Result};
use crate::geometry::{euclidean_distance, OrientedRect, Point};
use crate::layout::{TextBlock, TextLine, Word};
use serde::Serialize;
use std::fmt;
use std::iter::FusedIterator;

/// Text layer of one page.
#[derive(Debug, Clone, Serialize)]
pub struct TextLayer {
    page_number: usize,
    blocks: Vec<TextBlock>,
    annotations: Vec<Annotation>,
    count: usize,
}

impl TextLayer {
    /// Create a text layer from blocks in reading order.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` when `page_number` is 0
    /// - `InvalidArgument` when the blocks do not partition a contiguous word
    ///   range starting at 0, or block and line indices are not consecutive
    pub fn new(
        page_number: usize,
        blocks: Vec<TextBlock>,
        annotations: Vec<Annotation>,
    ) -> Result<Self> {
        if page_number == 0 {
            return Err(Error::OutOfRange {
                what: "page number",
                value: page_number,
                min: 1,
                max: usize::MAX,
            });
        }

        let mut next_word = 0;
        let mut next_line = 0;
        for (i, block) in blocks.iter().enumerate() {
            if block.index_in_page() != i {
                return Err(Error::InvalidArgument(format!(
                    "block at position {} has index {}",
                    i,
                    block.index_in_page()
                )));
            }
            if block.word_start_index() != next_word || block.line_start_index() != next_line {
                return Err(Error::InvalidArgument(format!(
                    "block {} starts at word {} line {}, expected word {} line {}",
                    i,
                    block.word_start_index(),
                    block.line_start_index(),
                    next_word,
                    next_line
                )));
            }
            next_word = block.word_end_index() + 1;
            next_line += block.lines().len();
        }

        Ok(Self {
            page_number,
            blocks,
            annotations,
            count: next_word,
        })
    }

    /// A layer without any text.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `page_number` is 0.
    pub fn empty(page_number: usize) -> Result<Self> {
        Self::new(page_number, Vec::new(), Vec::new())
    }

    /// 1-based page number.
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// Total number of words on the page.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the page has no words.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Blocks in reading order.
    pub fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }

    /// Link annotations of the page.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Lines in reading order.
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> + '_ {
        self.blocks.iter().flat_map(|b| b.lines().iter())
    }

    /// Words in reading order.
    pub fn iter(&self) -> WordRange<'_> {
        self.range(0, self.count)
    }

    /// Position of the block owning the page-global word index.
    fn block_position(&self, index: usize) -> Option<usize> {
        if index >= self.count {
            return None;
        }
        let position = self.blocks.partition_point(|b| b.word_end_index() < index);
        (position < self.blocks.len()).then_some(position)
    }

    /// Word with the given page-global index.
    pub fn get(&self, index: usize) -> Option<&Word> {
        self.block_position(index)
            .and_then(|b| self.blocks[b].word_at(index))
    }

    /// Word with the given page-global index.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `index >= count()`.
    pub fn word_at(&self, index: usize) -> Result<&Word> {
        self.get(index)
            .ok_or_else(|| Error::index_out_of_range("word index", index, self.count))
    }

    /// Line holding `word`.
    pub fn line_of(&self, word: &Word) -> Option<&TextLine> {
        self.blocks
            .get(word.text_block_index())
            .and_then(|b| b.line_of_word(word.index_in_page()))
    }

    /// Word whose box contains `point`.
    pub fn find_word_over(&self, point: &Point) -> Option<&Word> {
        self.blocks
            .iter()
            .filter(|b| b.contains(point))
            .find_map(|b| b.find_word_over(point))
    }

    /// Line whose box contains `point`.
    pub fn find_line_over(&self, point: &Point) -> Option<&TextLine> {
        self.blocks
            .iter()
            .filter(|b| b.contains(point))
            .find_map(|b| b.find_line_over(point))
    }

    /// Annotation whose box contains `point`.
    pub fn find_annotation_over(&self, point: &Point) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.contains(point))
    }

    /// Word whose baseline start or end is closest to `point`.
    ///
    /// `None` only for an empty page.
    pub fn find_nearest_word(&self, point: &Point) -> Option<&Word> {
        self.iter()
            .map(|w| {
                let bbox = w.bounding_box();
                let distance = euclidean_distance(&bbox.bottom_left, point)
                    .min(euclidean_distance(&bbox.bottom_right, point));
                (w, distance)
            })
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(w, _)| w)
    }

    /// Every word from `start` to `end`, both inclusive, in reading order.
    ///
    /// `start` and `end` are words of this layer or copies of them.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` when either word index is not on this page
    /// - `InvalidArgument` when a word is not the one this layer holds at
    ///   its index, or when `start` comes after `end`
    pub fn get_words(&self, start: &Word, end: &Word) -> Result<WordRange<'_>> {
        for word in [start, end] {
            let own = self.word_at(word.index_in_page())?;
            if !is_same_word(own, word) {
                return Err(Error::InvalidArgument(format!(
                    "word {} does not belong to page {}",
                    word.index_in_page(),
                    self.page_number
                )));
            }
        }
        self.words_between(start.index_in_page(), end.index_in_page())
    }

    /// Every word with an index in `start..=end`, in reading order.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `end >= count()`, `InvalidArgument` when `start > end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_text_layer::TextLayer;
    ///
    /// let layer = TextLayer::empty(1).unwrap();
    /// assert!(layer.words_between(0, 0).is_err());
    /// ```
    pub fn words_between(&self, start: usize, end: usize) -> Result<WordRange<'_>> {
        if end >= self.count {
            return Err(Error::index_out_of_range("word index", end, self.count));
        }
        if start > end {
            return Err(Error::InvalidArgument(format!(
                "word range start {} is after end {}",
                start, end
            )));
        }
        Ok(self.range(start, end - start + 1))
    }

    /// Cursor over `len` words starting at index `start`.
    fn range(&self, start: usize, len: usize) -> WordRange<'_> {
        let Some(block) = self.block_position(start) else {
            return WordRange::empty(&self.blocks);
        };
        let lines = self.blocks[block].lines();
        let line = lines
            .partition_point(|l| l.word_end_index() < start)
            .min(lines.len().saturating_sub(1));
        let word = start - lines.get(line).map_or(start, TextLine::word_start_index);
        WordRange {
            blocks: &self.blocks,
            block,
            line,
            word,
            remaining: len,
        }
    }

    /// Plain text of the page: words separated by spaces, lines by a newline
    /// and blocks by an empty line.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TextLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{}", block)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a TextLayer {
    type Item = &'a Word;
    type IntoIter = WordRange<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy walk over a contiguous run of words of a page.
///
/// The walk descends the block/line tree, so ranges inside one line, one
/// block or across blocks cost only the words they yield. Nothing is cached;
/// clone a range before consuming it to walk it again.
#[derive(Debug, Clone)]
pub struct WordRange<'a> {
    blocks: &'a [TextBlock],
    block: usize,
    line: usize,
    word: usize,
    remaining: usize,
}

impl<'a> WordRange<'a> {
    fn empty(blocks: &'a [TextBlock]) -> Self {
        Self {
            blocks,
            block: 0,
            line: 0,
            word: 0,
            remaining: 0,
        }
    }
}

impl<'a> Iterator for WordRange<'a> {
    type Item = &'a Word;

    fn next(&mut self) -> Option<&'a Word> {
        if self.remaining == 0 {
            return None;
        }
        let lines = self.blocks.get(self.block)?.lines();
        let words = lines.get(self.line)?.words();
        let word = words.get(self.word)?;

        self.remaining -= 1;
        self.word += 1;
        if self.word == words.len() {
            self.word = 0;
            self.line += 1;
            if self.line == lines.len() {
                self.line = 0;
                self.block += 1;
            }
        }
        Some(word)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for WordRange<'_> {}

impl FusedIterator for WordRange<'_> {}

/// Whether `candidate` is `own` or a copy of it.
///
/// Copies compare by indices, letters and corners, a NaN coordinate being
/// equal to itself.
fn is_same_word(own: &Word, candidate: &Word) -> bool {
    std::ptr::eq(own, candidate)
        || (own.index_in_page() == candidate.index_in_page()
            && own.text_line_index() == candidate.text_line_index()
            && own.text_block_index() == candidate.text_block_index()
            && same_corners(own.bounding_box(), candidate.bounding_box())
            && own
                .letters()
                .iter()
                .map(|l| &l.text)
                .eq(candidate.letters().iter().map(|l| &l.text)))
}

fn same_corners(a: &OrientedRect, b: &OrientedRect) -> bool {
    let same = |p: f64, q: f64| p == q || (p.is_nan() && q.is_nan());
    a.corners()
        .iter()
        .zip(b.corners().iter())
        .all(|(p, q)| same(p.x, q.x) && same(p.y, q.y))
}
