//! Mapping of pointer positions to character offsets inside a word.

use crate::geometry::{project_point_on_line, Point};
use crate::layout::Word;

/// Letter under (or nearest to) `point`, and where along that letter the
/// point falls.
///
/// The letter is the one whose box contains the point, or else the one whose
/// bottom-right corner is closest. The distance is the projection parameter
/// of the point on the letter baseline: 0 at the baseline start, 1 at its
/// end. With `inclusive` it is clamped to `[0, 1]`; otherwise it may fall
/// outside for points beyond the letter.
///
/// Returns `None` for a word without letters, meaning "whole word".
///
/// # Examples
///
/// ```
/// use pdf_text_layer::geometry::{OrientedRect, Point};
/// use pdf_text_layer::layout::{Letter, Word};
/// use pdf_text_layer::selection::calculate_char_index_and_offset;
///
/// let letters = vec![
///     Letter::new("a", OrientedRect::from_edges(0.0, 0.0, 10.0, 10.0), 10.0, 0),
///     Letter::new("b", OrientedRect::from_edges(10.0, 0.0, 20.0, 10.0), 10.0, 1),
/// ];
/// let word = Word::new(letters, 0, 0, 0).unwrap();
/// let (index, distance) =
///     calculate_char_index_and_offset(&word, &Point::new(12.5, 5.0), true).unwrap();
/// assert_eq!(index, 1);
/// assert_eq!(distance, 0.25);
/// ```
pub fn calculate_char_index_and_offset(
    word: &Word,
    point: &Point,
    inclusive: bool,
) -> Option<(usize, f64)> {
    let index = word
        .find_letter_index_over(point)
        .or_else(|| word.find_nearest_letter_index(point))?;
    let letter = word.letters().get(index)?;
    let (distance, _) = project_point_on_line(
        point,
        &letter.bounding_box.bottom_left,
        &letter.bounding_box.bottom_right,
    );
    let distance = if inclusive {
        distance.clamp(0.0, 1.0)
    } else {
        distance
    };
    Some((index, distance))
}
