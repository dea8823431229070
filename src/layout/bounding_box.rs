//! Rotation-aware bounding boxes for groups of layout elements.
//!
//! The same algorithm serves words (from letters), lines (from words) and
//! blocks (from lines):
//!
//! - elements sharing a canonical orientation get an extremal box computed
//!   directly, with one formula per orientation since "left" and "bottom"
//!   move with the rotation;
//! - anything else goes through a least-squares fit of the baselines, an
//!   axis-aligned box in the fitted frame, and a choice among the four
//!   corner rotations of that box driven by the first-to-last baseline angle.

use crate::error::{Error, Result};
use crate::geometry::{angle_distance, fit_line_angle, vector_angle, OrientedRect, Point, Rect};
use crate::layout::letter::{dominant_orientation, LayoutElement, TextOrientation};

/// Compute the bounding box and orientation of a group of elements.
///
/// Elements are expected in reading order. A single element returns its own
/// box and orientation unchanged.
///
/// # Errors
///
/// - `InvalidArgument` for an empty slice
/// - `InvalidState` when an element has non-finite geometry
///
/// # Examples
///
/// ```
/// use pdf_text_layer::geometry::OrientedRect;
/// use pdf_text_layer::layout::{compute_bounding_box, Letter, TextOrientation};
///
/// let letters = vec![
///     Letter::new("H", OrientedRect::from_edges(0.0, 0.0, 6.0, 10.0), 10.0, 0),
///     Letter::new("i", OrientedRect::from_edges(6.0, 2.0, 9.0, 10.0), 10.0, 1),
/// ];
/// let (bbox, orientation) = compute_bounding_box(&letters).unwrap();
/// assert_eq!(orientation, TextOrientation::Horizontal);
/// assert_eq!(bbox, OrientedRect::from_edges(0.0, 0.0, 9.0, 10.0));
/// ```
pub fn compute_bounding_box<E: LayoutElement>(
    elements: &[E],
) -> Result<(OrientedRect, TextOrientation)> {
    if let Some(position) = elements.iter().position(|e| !e.bounding_box().is_finite()) {
        return Err(Error::InvalidState(format!(
            "element {} of {} has a non-finite bounding box",
            position,
            elements.len()
        )));
    }
    match elements {
        [] => Err(Error::InvalidArgument(
            "cannot compute the bounding box of zero elements".to_string(),
        )),
        [single] => Ok((*single.bounding_box(), single.text_orientation())),
        _ => {
            let orientation = dominant_orientation(elements);
            let bbox = match orientation {
                TextOrientation::Other => arbitrary_angle_box(elements)?,
                canonical => canonical_box(elements, canonical)?,
            };
            Ok((bbox, orientation))
        },
    }
}

/// Extremal box for elements that all share one canonical orientation.
fn canonical_box<E: LayoutElement>(
    elements: &[E],
    orientation: TextOrientation,
) -> Result<OrientedRect> {
    let corners: Vec<Point> = elements
        .iter()
        .flat_map(|e| e.bounding_box().corners())
        .collect();
    let env = Rect::enclosing(corners.iter()).ok_or_else(|| {
        Error::InvalidArgument("cannot compute the bounding box of zero elements".to_string())
    })?;
    let (left, top, right, bottom) = (env.left(), env.top(), env.right(), env.bottom());

    let bbox = match orientation {
        TextOrientation::Horizontal => OrientedRect::from_edges(left, top, right, bottom),
        // Upside down: the baseline runs right to left along the top edge.
        TextOrientation::Rotate180 => OrientedRect::new(
            Point::new(right, bottom),
            Point::new(left, bottom),
            Point::new(right, top),
            Point::new(left, top),
        ),
        // Reading up the page: the baseline is the right edge, bottom to top.
        TextOrientation::Rotate90 => OrientedRect::new(
            Point::new(left, bottom),
            Point::new(left, top),
            Point::new(right, bottom),
            Point::new(right, top),
        ),
        // Reading down the page: the baseline is the left edge, top to bottom.
        TextOrientation::Rotate270 => OrientedRect::new(
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, top),
            Point::new(left, bottom),
        ),
        TextOrientation::Other => {
            return Err(Error::InvalidState(
                "canonical bounding box requested for arbitrary orientation".to_string(),
            ))
        },
    };
    Ok(bbox)
}

/// Oriented box for elements without a shared canonical orientation.
fn arbitrary_angle_box<E: LayoutElement>(elements: &[E]) -> Result<OrientedRect> {
    let (first, last) = match (elements.first(), elements.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(Error::InvalidArgument(
                "cannot compute the bounding box of zero elements".to_string(),
            ))
        },
    };

    let baseline_points: Vec<Point> = elements
        .iter()
        .flat_map(|e| [e.baseline_start(), e.baseline_end()])
        .collect();
    let fitted = fit_line_angle(&baseline_points)?;

    // Axis-aligned box in a frame where the fitted line is horizontal.
    let origin = Point::new(0.0, 0.0);
    let unrotated: Vec<Point> = elements
        .iter()
        .flat_map(|e| e.bounding_box().corners())
        .map(|p| p.rotate(-fitted))
        .collect();
    let env = Rect::enclosing(unrotated.iter()).ok_or_else(|| {
        Error::InvalidState("no corners to enclose in the fitted frame".to_string())
    })?;
    let candidate = OrientedRect::from_edges(env.left(), env.top(), env.right(), env.bottom())
        .rotate_about(&origin, fitted);
    if !candidate.is_finite() {
        return Err(Error::InvalidState(
            "arbitrary-angle bounding box is not finite".to_string(),
        ));
    }

    // The fit only knows the line up to 180 degrees; the reading direction
    // comes from the first and last element.
    let reading_angle = vector_angle(&first.baseline_start(), &last.baseline_end());
    if cfg!(debug_assertions) {
        warn_if_not_monotonic(elements, reading_angle);
    }

    let winding = candidate.corners();
    let best = (0..4)
        .map(|shift| {
            OrientedRect::from_winding([
                winding[shift],
                winding[(shift + 1) % 4],
                winding[(shift + 2) % 4],
                winding[(shift + 3) % 4],
            ])
        })
        .min_by(|a, b| {
            angle_distance(a.rotation(), reading_angle)
                .total_cmp(&angle_distance(b.rotation(), reading_angle))
        })
        .unwrap_or(candidate);

    Ok(best)
}

/// The tie-break above trusts the element order. Flag inputs that go backwards.
fn warn_if_not_monotonic<E: LayoutElement>(elements: &[E], reading_angle: f64) {
    let direction = Point::new(1.0, 0.0).rotate(reading_angle);
    let positions: Vec<f64> = elements
        .iter()
        .map(|e| e.baseline_start().dot(&direction))
        .collect();
    if positions.windows(2).any(|w| w[1] < w[0]) {
        log::warn!(
            "Bounding box input of {} elements is not monotonic along {:.2} degrees",
            elements.len(),
            reading_angle
        );
    }
}
