//! Word, line and block hierarchy of a page.
//!
//! The three levels are immutable once built. Each carries its own rotation
//! aware bounding box (computed from its children) and the page-global
//! indices assigned by the aggregator.

use crate::error::{Error, Result};
use crate::geometry::{euclidean_distance, OrientedRect, Point};
use crate::layout::bounding_box::compute_bounding_box;
use crate::layout::letter::{LayoutElement, Letter, TextOrientation};
use serde::Serialize;
use std::fmt;

/// A word: a non-empty run of letters in reading order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    letters: Vec<Letter>,
    bounding_box: OrientedRect,
    text_orientation: TextOrientation,
    index_in_page: usize,
    text_line_index: usize,
    text_block_index: usize,
}

impl Word {
    /// Build a word from letters already in reading order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `letters` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_text_layer::geometry::OrientedRect;
    /// use pdf_text_layer::layout::{Letter, Word};
    ///
    /// let letters = vec![
    ///     Letter::new("o", OrientedRect::from_edges(0.0, 0.0, 6.0, 10.0), 10.0, 0),
    ///     Letter::new("k", OrientedRect::from_edges(6.0, 0.0, 12.0, 10.0), 10.0, 1),
    /// ];
    /// let word = Word::new(letters, 0, 0, 0).unwrap();
    /// assert_eq!(word.text(), "ok");
    /// assert_eq!(word.bounding_box().width(), 12.0);
    /// ```
    pub fn new(
        letters: Vec<Letter>,
        index_in_page: usize,
        text_line_index: usize,
        text_block_index: usize,
    ) -> Result<Self> {
        if letters.is_empty() {
            return Err(Error::InvalidArgument("a word needs at least one letter".to_string()));
        }
        let (bounding_box, text_orientation) = compute_bounding_box(&letters)?;
        Ok(Self {
            letters,
            bounding_box,
            text_orientation,
            index_in_page,
            text_line_index,
            text_block_index,
        })
    }

    /// A word with no letters, used for selection targets that carry no text
    /// (an image or a link area, say).
    ///
    /// Offset computations on such a word always report "whole word".
    pub fn without_letters(
        bounding_box: OrientedRect,
        index_in_page: usize,
        text_line_index: usize,
        text_block_index: usize,
    ) -> Self {
        Self {
            letters: Vec::new(),
            bounding_box,
            text_orientation: TextOrientation::from_rotation(bounding_box.rotation()),
            index_in_page,
            text_line_index,
            text_block_index,
        }
    }

    /// Letters in reading order.
    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    /// Number of letters.
    pub fn letter_count(&self) -> usize {
        self.letters.len()
    }

    /// Bounding box of the whole word.
    pub fn bounding_box(&self) -> &OrientedRect {
        &self.bounding_box
    }

    /// Orientation of the word.
    pub fn text_orientation(&self) -> TextOrientation {
        self.text_orientation
    }

    /// Global index of the word on its page.
    pub fn index_in_page(&self) -> usize {
        self.index_in_page
    }

    /// Global index of the line holding the word.
    pub fn text_line_index(&self) -> usize {
        self.text_line_index
    }

    /// Index of the block holding the word.
    pub fn text_block_index(&self) -> usize {
        self.text_block_index
    }

    /// Characters of the word, produced lazily from the letters.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.letters.iter().flat_map(|l| l.text.chars())
    }

    /// Text of the word.
    pub fn text(&self) -> String {
        self.to_string()
    }

    /// Text of the letters `start..=end`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `end` is not a letter index, `InvalidArgument` when
    /// `start > end`.
    pub fn text_between(&self, start: usize, end: usize) -> Result<String> {
        Ok(self.letter_range(start, end)?.iter().map(|l| l.text.as_str()).collect())
    }

    /// Bounding box of the letters `start..=end`, for partial-word highlights.
    ///
    /// # Errors
    ///
    /// Same as [`text_between`](Self::text_between).
    pub fn letters_bounding_box(&self, start: usize, end: usize) -> Result<OrientedRect> {
        let (bbox, _) = compute_bounding_box(self.letter_range(start, end)?)?;
        Ok(bbox)
    }

    fn letter_range(&self, start: usize, end: usize) -> Result<&[Letter]> {
        if end >= self.letters.len() {
            return Err(Error::index_out_of_range("letter index", end, self.letters.len()));
        }
        if start > end {
            return Err(Error::InvalidArgument(format!(
                "letter range start {} is after end {}",
                start, end
            )));
        }
        Ok(&self.letters[start..=end])
    }

    /// Whether the word box contains `point`.
    pub fn contains(&self, point: &Point) -> bool {
        self.bounding_box.contains(point)
    }

    /// Index of the letter whose box contains `point`.
    pub fn find_letter_index_over(&self, point: &Point) -> Option<usize> {
        self.letters.iter().position(|l| l.bounding_box.contains(point))
    }

    /// Index of the letter whose bottom-right corner is closest to `point`.
    ///
    /// `None` only for a word without letters.
    pub fn find_nearest_letter_index(&self, point: &Point) -> Option<usize> {
        self.letters
            .iter()
            .map(|l| euclidean_distance(&l.bounding_box.bottom_right, point))
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for letter in &self.letters {
            f.write_str(&letter.text)?;
        }
        Ok(())
    }
}

impl LayoutElement for Word {
    fn bounding_box(&self) -> &OrientedRect {
        &self.bounding_box
    }

    fn text_orientation(&self) -> TextOrientation {
        self.text_orientation
    }
}

/// A line: a non-empty run of consecutive words.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    words: Vec<Word>,
    bounding_box: OrientedRect,
    text_orientation: TextOrientation,
    index_in_page: usize,
    text_block_index: usize,
    word_start_index: usize,
}

impl TextLine {
    /// Build a line from words in reading order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `words` is empty, when word indices are not
    /// consecutive, or when a word points at another line or block.
    pub fn new(words: Vec<Word>, index_in_page: usize, text_block_index: usize) -> Result<Self> {
        let Some(first) = words.first() else {
            return Err(Error::InvalidArgument("a line needs at least one word".to_string()));
        };
        let word_start_index = first.index_in_page;

        for (offset, word) in words.iter().enumerate() {
            if word.index_in_page != word_start_index + offset {
                return Err(Error::InvalidArgument(format!(
                    "line {}: word index {} where {} was expected",
                    index_in_page,
                    word.index_in_page,
                    word_start_index + offset
                )));
            }
            if word.text_line_index != index_in_page || word.text_block_index != text_block_index {
                return Err(Error::InvalidArgument(format!(
                    "word {} belongs to line {} of block {}, not line {} of block {}",
                    word.index_in_page,
                    word.text_line_index,
                    word.text_block_index,
                    index_in_page,
                    text_block_index
                )));
            }
        }

        let (bounding_box, text_orientation) = compute_bounding_box(&words)?;
        Ok(Self {
            words,
            bounding_box,
            text_orientation,
            index_in_page,
            text_block_index,
            word_start_index,
        })
    }

    /// Words in reading order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Bounding box of the line.
    pub fn bounding_box(&self) -> &OrientedRect {
        &self.bounding_box
    }

    /// Orientation of the line.
    pub fn text_orientation(&self) -> TextOrientation {
        self.text_orientation
    }

    /// Global index of the line on its page.
    pub fn index_in_page(&self) -> usize {
        self.index_in_page
    }

    /// Index of the block holding the line.
    pub fn text_block_index(&self) -> usize {
        self.text_block_index
    }

    /// Global index of the first word.
    pub fn word_start_index(&self) -> usize {
        self.word_start_index
    }

    /// Global index of the last word.
    pub fn word_end_index(&self) -> usize {
        self.word_start_index + self.words.len() - 1
    }

    /// Word with the given page-global index, if it is on this line.
    pub fn word_at(&self, index: usize) -> Option<&Word> {
        index
            .checked_sub(self.word_start_index)
            .and_then(|local| self.words.get(local))
    }

    /// Whether the line box contains `point`.
    pub fn contains(&self, point: &Point) -> bool {
        self.bounding_box.contains(point)
    }

    /// Word whose box contains `point`.
    pub fn find_word_over(&self, point: &Point) -> Option<&Word> {
        self.words.iter().find(|w| w.contains(point))
    }
}

impl fmt::Display for TextLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", word)?;
        }
        Ok(())
    }
}

impl LayoutElement for TextLine {
    fn bounding_box(&self) -> &OrientedRect {
        &self.bounding_box
    }

    fn text_orientation(&self) -> TextOrientation {
        self.text_orientation
    }
}

/// A block: a non-empty run of consecutive lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    lines: Vec<TextLine>,
    bounding_box: OrientedRect,
    text_orientation: TextOrientation,
    index_in_page: usize,
    line_start_index: usize,
    word_start_index: usize,
    word_end_index: usize,
}

impl TextBlock {
    /// Build a block from lines in reading order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `lines` is empty, when line or word indices are
    /// not consecutive, or when a line points at another block.
    pub fn new(lines: Vec<TextLine>, index_in_page: usize) -> Result<Self> {
        let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
            return Err(Error::InvalidArgument("a block needs at least one line".to_string()));
        };
        let line_start_index = first.index_in_page;
        let word_start_index = first.word_start_index;
        let word_end_index = last.word_end_index();

        let mut expected_word = word_start_index;
        for (offset, line) in lines.iter().enumerate() {
            if line.index_in_page != line_start_index + offset {
                return Err(Error::InvalidArgument(format!(
                    "block {}: line index {} where {} was expected",
                    index_in_page,
                    line.index_in_page,
                    line_start_index + offset
                )));
            }
            if line.text_block_index != index_in_page {
                return Err(Error::InvalidArgument(format!(
                    "line {} belongs to block {}, not {}",
                    line.index_in_page, line.text_block_index, index_in_page
                )));
            }
            if line.word_start_index != expected_word {
                return Err(Error::InvalidArgument(format!(
                    "block {}: line {} starts at word {} where {} was expected",
                    index_in_page, line.index_in_page, line.word_start_index, expected_word
                )));
            }
            expected_word = line.word_end_index() + 1;
        }

        let (bounding_box, text_orientation) = compute_bounding_box(&lines)?;
        Ok(Self {
            lines,
            bounding_box,
            text_orientation,
            index_in_page,
            line_start_index,
            word_start_index,
            word_end_index,
        })
    }

    /// Lines in reading order.
    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    /// Bounding box of the block.
    pub fn bounding_box(&self) -> &OrientedRect {
        &self.bounding_box
    }

    /// Orientation of the block.
    pub fn text_orientation(&self) -> TextOrientation {
        self.text_orientation
    }

    /// Index of the block on its page.
    pub fn index_in_page(&self) -> usize {
        self.index_in_page
    }

    /// Global index of the first line.
    pub fn line_start_index(&self) -> usize {
        self.line_start_index
    }

    /// Global index of the first word.
    pub fn word_start_index(&self) -> usize {
        self.word_start_index
    }

    /// Global index of the last word.
    pub fn word_end_index(&self) -> usize {
        self.word_end_index
    }

    /// Number of words in the block.
    pub fn word_count(&self) -> usize {
        self.word_end_index - self.word_start_index + 1
    }

    /// Whether the page-global word index falls in this block.
    pub fn contains_word_index(&self, index: usize) -> bool {
        (self.word_start_index..=self.word_end_index).contains(&index)
    }

    /// Words of the block in reading order.
    pub fn words(&self) -> impl Iterator<Item = &Word> + '_ {
        self.lines.iter().flat_map(|l| l.words.iter())
    }

    /// Word with the given page-global index, if it is in this block.
    pub fn word_at(&self, index: usize) -> Option<&Word> {
        if !self.contains_word_index(index) {
            return None;
        }
        self.lines.iter().find_map(|l| l.word_at(index))
    }

    /// Line holding the word with the given page-global index.
    pub fn line_of_word(&self, index: usize) -> Option<&TextLine> {
        self.lines
            .iter()
            .find(|l| (l.word_start_index..=l.word_end_index()).contains(&index))
    }

    /// Whether the block box contains `point`.
    pub fn contains(&self, point: &Point) -> bool {
        self.bounding_box.contains(point)
    }

    /// Line whose box contains `point`.
    pub fn find_line_over(&self, point: &Point) -> Option<&TextLine> {
        self.lines.iter().find(|l| l.contains(point))
    }

    /// Word whose box contains `point`.
    pub fn find_word_over(&self, point: &Point) -> Option<&Word> {
        self.lines.iter().find_map(|l| l.find_word_over(point))
    }
}

impl fmt::Display for TextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl LayoutElement for TextBlock {
    fn bounding_box(&self) -> &OrientedRect {
        &self.bounding_box
    }

    fn text_orientation(&self) -> TextOrientation {
        self.text_orientation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_letters(text: &str, x: f64, baseline: f64) -> Vec<Letter> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let left = x + i as f64 * 6.0;
                Letter::new(
                    c.to_string(),
                    OrientedRect::from_edges(left, baseline - 10.0, left + 6.0, baseline),
                    10.0,
                    i,
                )
            })
            .collect()
    }

    fn mock_word(
        text: &str,
        x: f64,
        baseline: f64,
        index: usize,
        line: usize,
        block: usize,
    ) -> Word {
        Word::new(mock_letters(text, x, baseline), index, line, block).unwrap()
    }

    #[test]
    fn test_word_requires_letters() {
        assert!(matches!(Word::new(Vec::new(), 0, 0, 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_word_text_and_box() {
        let word = mock_word("Hello", 10.0, 20.0, 3, 1, 0);
        assert_eq!(word.text(), "Hello");
        assert_eq!(word.to_string(), "Hello");
        assert_eq!(word.chars().count(), 5);
        assert_eq!(word.letter_count(), 5);
        assert_eq!(word.bounding_box().width(), 30.0);
        assert_eq!(word.text_orientation(), TextOrientation::Horizontal);
        assert_eq!(word.index_in_page(), 3);
        assert_eq!(word.text_line_index(), 1);
    }

    #[test]
    fn test_word_text_between() {
        let word = mock_word("Example", 0.0, 10.0, 0, 0, 0);
        assert_eq!(word.text_between(2, 4).unwrap(), "amp");
        assert_eq!(word.text_between(6, 6).unwrap(), "e");
        assert!(matches!(word.text_between(0, 7), Err(Error::OutOfRange { .. })));
        assert!(matches!(word.text_between(4, 2), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_word_letters_bounding_box() {
        let word = mock_word("Example", 0.0, 10.0, 0, 0, 0);
        let bbox = word.letters_bounding_box(2, 4).unwrap();
        assert_eq!(bbox, OrientedRect::from_edges(12.0, 0.0, 30.0, 10.0));
    }

    #[test]
    fn test_find_letter_over_and_nearest() {
        let word = mock_word("abc", 0.0, 10.0, 0, 0, 0);
        assert_eq!(word.find_letter_index_over(&Point::new(7.0, 5.0)), Some(1));
        assert_eq!(word.find_letter_index_over(&Point::new(50.0, 5.0)), None);
        assert_eq!(word.find_nearest_letter_index(&Point::new(50.0, 5.0)), Some(2));
        assert_eq!(word.find_nearest_letter_index(&Point::new(-5.0, 10.0)), Some(0));
    }

    #[test]
    fn test_word_without_letters() {
        let bbox = OrientedRect::from_edges(0.0, 0.0, 40.0, 40.0);
        let word = Word::without_letters(bbox, 2, 0, 0);
        assert_eq!(word.letter_count(), 0);
        assert_eq!(word.text(), "");
        assert!(word.contains(&Point::new(20.0, 20.0)));
        assert_eq!(word.find_nearest_letter_index(&Point::new(1.0, 1.0)), None);
    }

    #[test]
    fn test_line_indices() {
        let words = vec![
            mock_word("one", 0.0, 10.0, 4, 2, 1),
            mock_word("two", 30.0, 10.0, 5, 2, 1),
        ];
        let line = TextLine::new(words, 2, 1).unwrap();
        assert_eq!(line.word_start_index(), 4);
        assert_eq!(line.word_end_index(), 5);
        assert_eq!(line.word_at(5).map(Word::text), Some("two".to_string()));
        assert!(line.word_at(3).is_none());
        assert!(line.word_at(6).is_none());
        assert_eq!(line.to_string(), "one two");
    }

    #[test]
    fn test_line_rejects_bad_words() {
        assert!(TextLine::new(Vec::new(), 0, 0).is_err());

        let gap = vec![mock_word("a", 0.0, 10.0, 0, 0, 0), mock_word("b", 20.0, 10.0, 2, 0, 0)];
        assert!(matches!(TextLine::new(gap, 0, 0), Err(Error::InvalidArgument(_))));

        let foreign = vec![mock_word("a", 0.0, 10.0, 0, 1, 0)];
        assert!(matches!(TextLine::new(foreign, 0, 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_block_indices_and_lookup() {
        let line0 = TextLine::new(
            vec![mock_word("top", 0.0, 10.0, 0, 0, 0), mock_word("line", 30.0, 10.0, 1, 0, 0)],
            0,
            0,
        )
        .unwrap();
        let line1 = TextLine::new(vec![mock_word("bottom", 0.0, 30.0, 2, 1, 0)], 1, 0).unwrap();
        let block = TextBlock::new(vec![line0, line1], 0).unwrap();

        assert_eq!(block.word_start_index(), 0);
        assert_eq!(block.word_end_index(), 2);
        assert_eq!(block.word_count(), 3);
        assert_eq!(block.line_start_index(), 0);
        assert_eq!(block.word_at(2).map(Word::text), Some("bottom".to_string()));
        assert!(block.word_at(3).is_none());
        assert_eq!(block.line_of_word(1).map(TextLine::index_in_page), Some(0));
        assert_eq!(block.words().count(), 3);
        assert_eq!(block.to_string(), "top line\nbottom");

        let hit = block.find_word_over(&Point::new(33.0, 5.0));
        assert_eq!(hit.map(Word::text), Some("line".to_string()));
        let line = block.find_line_over(&Point::new(3.0, 25.0));
        assert_eq!(line.map(TextLine::index_in_page), Some(1));
        assert!(block.find_word_over(&Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_block_rejects_word_gap_between_lines() {
        let line0 = TextLine::new(vec![mock_word("a", 0.0, 10.0, 0, 0, 0)], 0, 0).unwrap();
        let line1 = TextLine::new(vec![mock_word("b", 0.0, 30.0, 2, 1, 0)], 1, 0).unwrap();
        assert!(matches!(TextBlock::new(vec![line0, line1], 0), Err(Error::InvalidArgument(_))));
        assert!(TextBlock::new(Vec::new(), 0).is_err());
    }
}
