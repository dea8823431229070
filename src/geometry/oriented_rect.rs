//! Oriented (non axis-aligned) rectangles.

use super::{bound_angle_180, vector_angle, Point, Rect, EPSILON};
use serde::{Deserialize, Serialize};

/// A rectangle that may be rotated by an arbitrary angle.
///
/// The four corners are named relative to the text they enclose, not to the
/// page: `bottom_left -> bottom_right` is the baseline, `bottom_left -> top_left`
/// points "up" from the baseline. For upright text this matches the page, for
/// upside-down text `bottom_left` is the corner with the largest X and smallest Y.
///
/// Rectangles are plain values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedRect {
    /// Top-left corner
    pub top_left: Point,
    /// Top-right corner
    pub top_right: Point,
    /// Bottom-left corner (baseline start)
    pub bottom_left: Point,
    /// Bottom-right corner (baseline end)
    pub bottom_right: Point,
}

impl OrientedRect {
    /// Create a rectangle from its four corners.
    pub fn new(top_left: Point, top_right: Point, bottom_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// Create an upright rectangle from its edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_text_layer::geometry::OrientedRect;
    ///
    /// let r = OrientedRect::from_edges(10.0, 20.0, 40.0, 32.0);
    /// assert_eq!(r.width(), 30.0);
    /// assert_eq!(r.height(), 12.0);
    /// assert_eq!(r.rotation(), 0.0);
    /// ```
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            top_left: Point::new(left, top),
            top_right: Point::new(right, top),
            bottom_left: Point::new(left, bottom),
            bottom_right: Point::new(right, bottom),
        }
    }

    /// Create a rectangle from its baseline start, baseline angle and size.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_text_layer::geometry::{OrientedRect, Point};
    ///
    /// let r = OrientedRect::from_baseline(Point::new(0.0, 0.0), 90.0, 10.0, 4.0);
    /// assert!((r.rotation() - 90.0).abs() < 1e-9);
    /// assert!((r.width() - 10.0).abs() < 1e-9);
    /// // Text rotated a quarter turn reads up the page.
    /// assert!((r.bottom_right.y + 10.0).abs() < 1e-9);
    /// ```
    pub fn from_baseline(start: Point, degrees: f64, width: f64, height: f64) -> Self {
        let along = Point::new(1.0, 0.0).rotate(degrees);
        let up = Point::new(0.0, -1.0).rotate(degrees);
        let bottom_right = start.offset(&along, width);
        Self {
            top_left: start.offset(&up, height),
            top_right: bottom_right.offset(&up, height),
            bottom_left: start,
            bottom_right,
        }
    }

    /// Corners in winding order: bottom-left, bottom-right, top-right, top-left.
    pub fn corners(&self) -> [Point; 4] {
        [self.bottom_left, self.bottom_right, self.top_right, self.top_left]
    }

    /// Rebuild a rectangle from corners given in [`corners`](Self::corners) order.
    pub fn from_winding(corners: [Point; 4]) -> Self {
        Self {
            bottom_left: corners[0],
            bottom_right: corners[1],
            top_right: corners[2],
            top_left: corners[3],
        }
    }

    /// Length of the baseline.
    pub fn width(&self) -> f64 {
        self.bottom_left.to(&self.bottom_right).length()
    }

    /// Distance from baseline to top edge.
    pub fn height(&self) -> f64 {
        self.bottom_left.to(&self.top_left).length()
    }

    /// Baseline angle in degrees, within `(-180, 180]`.
    ///
    /// Falls back to the left edge when the baseline has no length, and to 0
    /// for a rectangle collapsed to a point. Non-finite corners yield NaN.
    pub fn rotation(&self) -> f64 {
        if !self.is_finite() {
            f64::NAN
        } else if self.width() > EPSILON {
            vector_angle(&self.bottom_left, &self.bottom_right)
        } else if self.height() > EPSILON {
            bound_angle_180(vector_angle(&self.bottom_left, &self.top_left) - 90.0)
        } else {
            0.0
        }
    }

    /// Mean of the four corners.
    pub fn centroid(&self) -> Point {
        let c = self.corners();
        Point::new(
            c.iter().map(|p| p.x).sum::<f64>() / 4.0,
            c.iter().map(|p| p.y).sum::<f64>() / 4.0,
        )
    }

    /// Signed area via the shoelace formula (positive for visual counter-clockwise winding).
    fn signed_area(&self) -> f64 {
        let c = self.corners();
        let mut sum = 0.0;
        for i in 0..4 {
            let a = c[i];
            let b = c[(i + 1) % 4];
            sum += a.x * b.y - b.x * a.y;
        }
        // Y grows downward, flip so that upright text has a positive area.
        -sum / 2.0
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Axis-aligned envelope of the corners.
    pub fn envelope(&self) -> Rect {
        let c = self.corners();
        // Four corners, never empty.
        Rect::enclosing(c.iter()).unwrap_or(Rect::new(c[0].x, c[0].y, 0.0, 0.0))
    }

    /// Point containment, edges inclusive.
    ///
    /// Works for any rotation. A degenerate rectangle (zero area) falls back to
    /// its axis-aligned envelope.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_text_layer::geometry::{OrientedRect, Point};
    ///
    /// let r = OrientedRect::from_baseline(Point::new(0.0, 0.0), 45.0, 10.0, 2.0);
    /// assert!(r.contains(&Point::new(3.0, -4.0)));
    /// assert!(!r.contains(&Point::new(3.0, 3.0)));
    /// ```
    pub fn contains(&self, point: &Point) -> bool {
        if self.area() < EPSILON {
            return self.envelope().contains_point(point);
        }

        let c = self.corners();
        let mut has_positive = false;
        let mut has_negative = false;
        for i in 0..4 {
            let a = c[i];
            let b = c[(i + 1) % 4];
            let edge = a.to(&b);
            let to_point = a.to(point);
            let cross = edge.x * to_point.y - edge.y * to_point.x;
            if cross > EPSILON {
                has_positive = true;
            } else if cross < -EPSILON {
                has_negative = true;
            }
            if has_positive && has_negative {
                return false;
            }
        }
        true
    }

    /// Rotate every corner around `origin`.
    pub fn rotate_about(&self, origin: &Point, degrees: f64) -> Self {
        Self {
            top_left: self.top_left.rotate_about(origin, degrees),
            top_right: self.top_right.rotate_about(origin, degrees),
            bottom_left: self.bottom_left.rotate_about(origin, degrees),
            bottom_right: self.bottom_right.rotate_about(origin, degrees),
        }
    }

    /// Whether every corner is finite.
    pub fn is_finite(&self) -> bool {
        self.corners().iter().all(Point::is_finite)
    }
}
