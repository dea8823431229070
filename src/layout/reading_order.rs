//! Reading order determination for layout elements.
//!
//! Three granularities are handled here:
//!
//! - letters inside a word and words inside a line follow the baseline
//!   direction of the dominant orientation ([`order_by_reading_order`]);
//! - lines inside a block are stacked along the "up" normal of that
//!   direction ([`order_lines`]);
//! - blocks on a page are ordered with a precedence graph sorted
//!   topologically ([`order_blocks`]).
//!
//! All sorts are stable, so elements that compare equal keep their input order.

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::layout::letter::{dominant_orientation, LayoutElement, TextOrientation};
use std::cmp::Ordering;
use std::collections::VecDeque;

/// Order letters or words along their reading direction.
///
/// Empty and single-element inputs are returned unchanged.
///
/// # Errors
///
/// `InvalidState` when elements disagree on orientation and their mean
/// rotation is NaN, which means a corrupt box came in from upstream.
///
/// # Examples
///
/// ```
/// use pdf_text_layer::geometry::OrientedRect;
/// use pdf_text_layer::layout::{order_by_reading_order, Letter};
///
/// let letters = vec![
///     Letter::new("b", OrientedRect::from_edges(10.0, 0.0, 16.0, 10.0), 10.0, 1),
///     Letter::new("a", OrientedRect::from_edges(0.0, 0.0, 6.0, 10.0), 10.0, 0),
/// ];
/// let ordered = order_by_reading_order(letters).unwrap();
/// assert_eq!(ordered[0].text, "a");
/// ```
pub fn order_by_reading_order<E: LayoutElement>(mut elements: Vec<E>) -> Result<Vec<E>> {
    if elements.len() < 2 {
        return Ok(elements);
    }

    let bl = |e: &E| e.bounding_box().bottom_left;
    match dominant_orientation(&elements) {
        TextOrientation::Horizontal => elements.sort_by(|a, b| bl(a).x.total_cmp(&bl(b).x)),
        TextOrientation::Rotate180 => elements.sort_by(|a, b| bl(b).x.total_cmp(&bl(a).x)),
        // Reading up the page: Y decreases along the baseline.
        TextOrientation::Rotate90 => elements.sort_by(|a, b| bl(b).y.total_cmp(&bl(a).y)),
        TextOrientation::Rotate270 => elements.sort_by(|a, b| bl(a).y.total_cmp(&bl(b).y)),
        TextOrientation::Other => {
            let angle = mean_rotation(&elements)?;
            let compare = quadrant_comparator(angle)?;
            elements.sort_by(|a, b| compare(&bl(a), &bl(b)));
        },
    }
    Ok(elements)
}

/// Order lines of a block from the top of the text downwards.
///
/// Lines are compared by the projection of their baseline start onto the
/// "up" normal of the block orientation; the line furthest up comes first.
///
/// # Errors
///
/// `InvalidState` when the mean rotation of arbitrarily oriented lines is NaN.
pub fn order_lines<E: LayoutElement>(mut lines: Vec<E>) -> Result<Vec<E>> {
    if lines.len() < 2 {
        return Ok(lines);
    }

    let angle = match dominant_orientation(&lines).canonical_angle() {
        Some(angle) => angle,
        None => mean_rotation(&lines)?,
    };
    let up = Point::new(0.0, -1.0).rotate(angle);
    let height = |e: &E| e.bounding_box().bottom_left.dot(&up);
    lines.sort_by(|a, b| height(b).total_cmp(&height(a)));
    Ok(lines)
}

/// Order blocks on a page.
///
/// Reading order rules:
/// 1. Blocks whose tops are within `row_tolerance` are on the same row, left precedes right
/// 2. Otherwise the block with the smaller top (higher on the page) precedes
///
/// The rules are not transitive for staggered layouts; if the precedence
/// graph has a cycle the input order is kept.
pub fn order_blocks<E: LayoutElement>(blocks: Vec<E>, row_tolerance: f64) -> Vec<E> {
    if blocks.len() < 2 {
        return blocks;
    }

    let n = blocks.len();
    let envelopes: Vec<_> = blocks.iter().map(|b| b.bounding_box().envelope()).collect();

    // Edge i -> j means block i precedes block j.
    let mut graph: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in 0..n {
            if i != j && precedes(&envelopes[i], &envelopes[j], row_tolerance) {
                graph[i].push(j);
            }
        }
    }

    match kahn_sort(&graph) {
        Some(order) => permute(blocks, &order),
        None => {
            log::debug!(
                "Block precedence graph has a cycle, keeping segmenter order for {} blocks",
                n
            );
            blocks
        },
    }
}

/// Determine if the block with envelope `a` precedes the one with envelope `b`.
fn precedes(a: &Rect, b: &Rect, row_tolerance: f64) -> bool {
    if (a.top() - b.top()).abs() < row_tolerance {
        a.left() < b.left()
    } else {
        // Y grows downward: smaller top is higher on the page.
        a.top() < b.top()
    }
}

/// Topological sort using Kahn's algorithm.
///
/// Ties are broken by node index so the result is deterministic. Returns
/// `None` when the graph has a cycle.
fn kahn_sort(graph: &[Vec<usize>]) -> Option<Vec<usize>> {
    let n = graph.len();

    let mut in_degree = vec![0usize; n];
    for edges in graph {
        for &node in edges {
            in_degree[node] += 1;
        }
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut result = Vec::with_capacity(n);

    while let Some(node) = queue.pop_front() {
        result.push(node);
        for &next in &graph[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    (result.len() == n).then_some(result)
}

/// Rearrange `elements` so that position `k` holds `elements[order[k]]`.
fn permute<E>(elements: Vec<E>, order: &[usize]) -> Vec<E> {
    let mut slots: Vec<Option<E>> = elements.into_iter().map(Some).collect();
    order.iter().filter_map(|&i| slots.get_mut(i).and_then(Option::take)).collect()
}

/// Arithmetic mean of the element rotations.
fn mean_rotation<E: LayoutElement>(elements: &[E]) -> Result<f64> {
    let sum: f64 = elements.iter().map(|e| e.bounding_box().rotation()).sum();
    let mean = sum / elements.len() as f64;
    if mean.is_nan() {
        return Err(Error::InvalidState(
            "mean rotation of arbitrarily oriented elements is NaN".to_string(),
        ));
    }
    Ok(mean)
}

type PointComparator = fn(&Point, &Point) -> Ordering;

/// Baseline-start comparator for a mean rotation in `(-180, 180]`.
fn quadrant_comparator(angle: f64) -> Result<PointComparator> {
    let compare: PointComparator = if angle > 0.0 && angle <= 90.0 {
        |a, b| a.x.total_cmp(&b.x).then_with(|| b.y.total_cmp(&a.y))
    } else if angle > 90.0 && angle <= 180.0 {
        |a, b| b.x.total_cmp(&a.x).then_with(|| b.y.total_cmp(&a.y))
    } else if angle > -180.0 && angle <= -90.0 {
        |a, b| b.x.total_cmp(&a.x).then_with(|| a.y.total_cmp(&b.y))
    } else if angle > -90.0 && angle <= 0.0 {
        |a, b| a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
    } else {
        return Err(Error::InvalidState(format!(
            "mean rotation {} is outside (-180, 180]",
            angle
        )));
    };
    Ok(compare)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::OrientedRect;
    use crate::layout::letter::Letter;

    fn letter_at(text: &str, x: f64, y: f64, angle: f64) -> Letter {
        Letter::new(
            text,
            OrientedRect::from_baseline(Point::new(x, y), angle, 6.0, 10.0),
            10.0,
            0,
        )
    }

    fn texts(letters: &[Letter]) -> String {
        letters.iter().map(|l| l.text.as_str()).collect()
    }

    fn upright_box(text: &str, left: f64, top: f64) -> Letter {
        Letter::new(text, OrientedRect::from_edges(left, top, left + 50.0, top + 12.0), 12.0, 0)
    }

    #[test]
    fn test_empty_and_single_are_unchanged() {
        assert!(order_by_reading_order(Vec::<Letter>::new()).unwrap().is_empty());
        let one = vec![letter_at("a", 5.0, 5.0, 33.0)];
        assert_eq!(order_by_reading_order(one.clone()).unwrap(), one);
    }

    #[test]
    fn test_horizontal_order() {
        let letters = vec![
            letter_at("c", 12.0, 0.0, 0.0),
            letter_at("a", 0.0, 0.0, 0.0),
            letter_at("b", 6.0, 0.0, 0.0),
        ];
        assert_eq!(texts(&order_by_reading_order(letters).unwrap()), "abc");
    }

    #[test]
    fn test_rotate180_order() {
        let letters = vec![
            letter_at("b", 94.0, 0.0, 180.0),
            letter_at("a", 100.0, 0.0, 180.0),
            letter_at("c", 88.0, 0.0, 180.0),
        ];
        assert_eq!(texts(&order_by_reading_order(letters).unwrap()), "abc");
    }

    #[test]
    fn test_rotate90_reads_up_the_page() {
        let letters = vec![
            letter_at("b", 0.0, 94.0, 90.0),
            letter_at("c", 0.0, 88.0, 90.0),
            letter_at("a", 0.0, 100.0, 90.0),
        ];
        assert_eq!(texts(&order_by_reading_order(letters).unwrap()), "abc");
    }

    #[test]
    fn test_rotate270_reads_down_the_page() {
        let letters = vec![
            letter_at("c", 0.0, 112.0, 270.0),
            letter_at("a", 0.0, 100.0, 270.0),
            letter_at("b", 0.0, 106.0, 270.0),
        ];
        assert_eq!(texts(&order_by_reading_order(letters).unwrap()), "abc");
    }

    #[test]
    fn test_other_quadrants() {
        // 45 degrees: rising to the right.
        let rising = vec![
            letter_at("b", 4.0, 96.0, 45.0),
            letter_at("a", 0.0, 100.0, 45.0),
        ];
        assert_eq!(texts(&order_by_reading_order(rising).unwrap()), "ab");

        // 135 degrees: rising to the left.
        let rising_left = vec![
            letter_at("a", 100.0, 100.0, 135.0),
            letter_at("b", 96.0, 96.0, 135.0),
        ];
        assert_eq!(texts(&order_by_reading_order(rising_left).unwrap()), "ab");

        // -135 degrees: falling to the left.
        let falling_left = vec![
            letter_at("b", 96.0, 104.0, -135.0),
            letter_at("a", 100.0, 100.0, -135.0),
        ];
        assert_eq!(texts(&order_by_reading_order(falling_left).unwrap()), "ab");

        // -45 degrees: falling to the right.
        let falling = vec![
            letter_at("b", 4.0, 104.0, -45.0),
            letter_at("a", 0.0, 100.0, -45.0),
        ];
        assert_eq!(texts(&order_by_reading_order(falling).unwrap()), "ab");
    }

    #[test]
    fn test_nan_mean_rotation_is_invalid_state() {
        let mut bad = letter_at("b", 4.0, 96.0, 45.0);
        bad.bounding_box.bottom_right = Point::new(f64::NAN, f64::NAN);
        bad.bounding_box.top_left = Point::new(f64::NAN, f64::NAN);
        let letters = vec![letter_at("a", 0.0, 100.0, 45.0), bad];
        assert!(matches!(order_by_reading_order(letters), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_quadrant_comparator_rejects_out_of_range() {
        assert!(quadrant_comparator(-180.0).is_err());
        assert!(quadrant_comparator(f64::INFINITY).is_err());
        assert!(quadrant_comparator(180.0).is_ok());
    }

    #[test]
    fn test_order_lines_top_first() {
        let lines = vec![
            letter_at("2", 0.0, 40.0, 0.0),
            letter_at("3", 0.0, 60.0, 0.0),
            letter_at("1", 0.0, 20.0, 0.0),
        ];
        assert_eq!(texts(&order_lines(lines).unwrap()), "123");
    }

    #[test]
    fn test_order_lines_rotated() {
        // Rotate90 text: "up" points to the left, so the leftmost line comes first.
        let lines = vec![
            letter_at("2", 40.0, 100.0, 90.0),
            letter_at("1", 20.0, 100.0, 90.0),
        ];
        assert_eq!(texts(&order_lines(lines).unwrap()), "12");

        // Upside-down text: "up" points down the page.
        let lines = vec![
            letter_at("1", 100.0, 60.0, 180.0),
            letter_at("2", 100.0, 40.0, 180.0),
        ];
        assert_eq!(texts(&order_lines(lines).unwrap()), "12");
    }

    #[test]
    fn test_precedes_same_row() {
        let left = upright_box("L", 0.0, 0.0).bounding_box.envelope();
        let right = upright_box("R", 100.0, 1.0).bounding_box.envelope();
        assert!(precedes(&left, &right, 5.0));
        assert!(!precedes(&right, &left, 5.0));
    }

    #[test]
    fn test_precedes_different_rows() {
        let top = upright_box("T", 0.0, 50.0).bounding_box.envelope();
        let bottom = upright_box("B", 0.0, 100.0).bounding_box.envelope();
        assert!(precedes(&top, &bottom, 5.0));
        assert!(!precedes(&bottom, &top, 5.0));
    }

    #[test]
    fn test_order_blocks_grid() {
        let blocks = vec![
            upright_box("D", 100.0, 100.0),
            upright_box("A", 0.0, 50.0),
            upright_box("C", 0.0, 100.0),
            upright_box("B", 100.0, 50.0),
        ];
        assert_eq!(texts(&order_blocks(blocks, 5.0)), "ABCD");
    }

    #[test]
    fn test_order_blocks_cycle_keeps_input() {
        // A/B and B/C share a row but A/C do not, which creates a cycle.
        let blocks = vec![
            upright_box("C", 0.0, 8.0),
            upright_box("B", 50.0, 4.0),
            upright_box("A", 100.0, 0.0),
        ];
        assert_eq!(texts(&order_blocks(blocks, 5.0)), "CBA");
    }

    #[test]
    fn test_kahn_sort_branching() {
        let graph = vec![vec![1, 2], vec![3], vec![3], vec![]];
        assert_eq!(kahn_sort(&graph), Some(vec![0, 1, 2, 3]));
    }

    #[test]
    fn test_kahn_sort_cycle() {
        let graph = vec![vec![1], vec![0]];
        assert_eq!(kahn_sort(&graph), None);
    }
}
