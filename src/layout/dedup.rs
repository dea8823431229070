//! Removal of duplicated glyphs.
//!
//! Some producers paint the same glyph several times at (almost) the same
//! position, typically to fake a bold face. Left alone, those copies show up
//! as doubled letters in words and in copied text.
//!
//! A letter is a duplicate when an already accepted letter with the exact
//! same text has its bottom-left corner within `width / chars / divisor` of
//! the letter's own bottom-left corner on both axes. Accepted bottom-left
//! corners live in an R-tree, so pages with thousands of glyphs stay
//! sub-quadratic.

use crate::layout::letter::Letter;
use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};

/// Bottom-left corner of an accepted letter, tagged with its output index.
type AcceptedCorner = GeomWithData<[f64; 2], usize>;

/// Default divisor applied to the per-character width.
pub const DEFAULT_TOLERANCE_DIVISOR: f64 = 3.0;

/// Filter that drops letters duplicating an already accepted letter.
#[derive(Debug, Clone)]
pub struct DuplicateLetterFilter {
    tolerance_divisor: f64,
}

impl Default for DuplicateLetterFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DuplicateLetterFilter {
    /// Create a filter with the default tolerance.
    pub fn new() -> Self {
        Self {
            tolerance_divisor: DEFAULT_TOLERANCE_DIVISOR,
        }
    }

    /// Create a filter with a custom tolerance divisor.
    pub fn with_tolerance_divisor(divisor: f64) -> Self {
        Self {
            tolerance_divisor: divisor,
        }
    }

    /// Positional tolerance used when `letter` is the candidate.
    fn tolerance(&self, letter: &Letter) -> f64 {
        letter.bounding_box.width() / letter.char_count().max(1) as f64 / self.tolerance_divisor
    }

    /// Filter duplicates, keeping the first occurrence of each letter.
    ///
    /// Deterministic and single pass; the relative order of kept letters is
    /// the input order.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_text_layer::geometry::OrientedRect;
    /// use pdf_text_layer::layout::{DuplicateLetterFilter, Letter};
    ///
    /// let bbox = OrientedRect::from_edges(0.0, 0.0, 6.0, 10.0);
    /// let letters = vec![
    ///     Letter::new("A", bbox, 10.0, 0),
    ///     Letter::new("A", bbox, 10.0, 1),
    ///     Letter::new("B", bbox, 10.0, 2),
    /// ];
    /// let kept = DuplicateLetterFilter::new().filter(letters);
    /// assert_eq!(kept.len(), 2);
    /// ```
    pub fn filter(&self, letters: Vec<Letter>) -> Vec<Letter> {
        let input_len = letters.len();
        let mut accepted: Vec<Letter> = Vec::with_capacity(input_len);
        let mut corners: RTree<AcceptedCorner> = RTree::new();

        for letter in letters {
            let corner = letter.bounding_box.bottom_left;
            let tolerance = self.tolerance(&letter);

            // Without a usable position a letter can neither match nor be matched.
            if !corner.is_finite() || !tolerance.is_finite() {
                accepted.push(letter);
                continue;
            }

            let search = AABB::from_corners(
                [corner.x - tolerance, corner.y - tolerance],
                [corner.x + tolerance, corner.y + tolerance],
            );
            let is_duplicate = corners
                .locate_in_envelope(&search)
                .any(|candidate| accepted[candidate.data].text == letter.text);

            if is_duplicate {
                log::trace!(
                    "Dropping duplicate letter '{}' (sequence {}) at ({:.2}, {:.2})",
                    letter.text,
                    letter.sequence_number,
                    corner.x,
                    corner.y
                );
                continue;
            }

            corners.insert(AcceptedCorner::new([corner.x, corner.y], accepted.len()));
            accepted.push(letter);
        }

        if accepted.len() < input_len {
            log::debug!(
                "Duplicate filter removed {} of {} letters",
                input_len - accepted.len(),
                input_len
            );
        }
        accepted
    }
}

/// Filter duplicates with the default tolerance.
pub fn remove_duplicate_letters(letters: Vec<Letter>) -> Vec<Letter> {
    DuplicateLetterFilter::new().filter(letters)
}
