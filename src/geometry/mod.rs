//! Geometric primitives for text layout reconstruction.
//!
//! All coordinates live in page space with the origin at the top-left corner
//! and Y growing downward. Angles are expressed in degrees and measured
//! *visually*: counter-clockwise as seen on screen, so a baseline pointing up
//! the page has an angle of +90.

mod oriented_rect;

pub use oriented_rect::OrientedRect;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Below this length a vector is treated as zero.
pub const EPSILON: f64 = 1e-9;

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate (grows downward)
    pub y: f64,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_text_layer::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `self` to `other`.
    pub fn to(&self, other: &Point) -> Point {
        Point::new(other.x - self.x, other.y - self.y)
    }

    /// Translate by a vector scaled by `factor`.
    pub fn offset(&self, vector: &Point, factor: f64) -> Point {
        Point::new(self.x + vector.x * factor, self.y + vector.y * factor)
    }

    /// Dot product, treating both points as vectors.
    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Length of the point seen as a vector.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Rotate counter-clockwise (visually) around the origin.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_text_layer::geometry::Point;
    ///
    /// // Pointing right, rotated a quarter turn, now points up the page.
    /// let p = Point::new(1.0, 0.0).rotate(90.0);
    /// assert!(p.x.abs() < 1e-12);
    /// assert!((p.y + 1.0).abs() < 1e-12);
    /// ```
    pub fn rotate(&self, degrees: f64) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point::new(self.x * cos + self.y * sin, -self.x * sin + self.y * cos)
    }

    /// Rotate counter-clockwise (visually) around `origin`.
    pub fn rotate_about(&self, origin: &Point, degrees: f64) -> Point {
        let rotated = origin.to(self).rotate(degrees);
        Point::new(origin.x + rotated.x, origin.y + rotated.y)
    }
}

/// An axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f64,
    /// Y coordinate of top-left corner
    pub y: f64,
    /// Width of rectangle
    pub width: f64,
    /// Height of rectangle
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_text_layer::geometry::Rect;
    ///
    /// let rect = Rect::from_points(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn from_points(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Smallest rectangle enclosing every point.
    ///
    /// Returns `None` for an empty iterator.
    pub fn enclosing<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in iter {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Rect::from_points(x0, y0, x1, y1))
    }

    /// Left edge x-coordinate.
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Right edge x-coordinate.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Top edge y-coordinate.
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Bottom edge y-coordinate.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if this rectangle intersects with another.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Check if this rectangle contains a point (edges inclusive).
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Smallest rectangle containing both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::from_points(x0, y0, x1, y1)
    }
}

/// Compute the Euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use pdf_text_layer::geometry::{Point, euclidean_distance};
///
/// let p1 = Point::new(0.0, 0.0);
/// let p2 = Point::new(3.0, 4.0);
///
/// assert_eq!(euclidean_distance(&p1, &p2), 5.0);
/// ```
pub fn euclidean_distance(p1: &Point, p2: &Point) -> f64 {
    (p2.x - p1.x).hypot(p2.y - p1.y)
}

/// Normalise an angle in degrees into `(-180, 180]`.
///
/// # Examples
///
/// ```
/// use pdf_text_layer::geometry::bound_angle_180;
///
/// assert_eq!(bound_angle_180(270.0), -90.0);
/// assert_eq!(bound_angle_180(-180.0), 180.0);
/// assert_eq!(bound_angle_180(45.0), 45.0);
/// ```
pub fn bound_angle_180(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Circular distance between two angles, in `[0, 180]`.
pub fn angle_distance(a: f64, b: f64) -> f64 {
    bound_angle_180(a - b).abs()
}

/// Visual angle of the vector `from -> to`, in `(-180, 180]`.
///
/// Returns 0 for coincident points.
pub fn vector_angle(from: &Point, to: &Point) -> f64 {
    let v = from.to(to);
    if v.length() < EPSILON {
        return 0.0;
    }
    // Y grows downward, so flip it to measure counter-clockwise on screen.
    bound_angle_180((-v.y).atan2(v.x).to_degrees())
}

/// Orthogonal projection of `p` onto the line through `a` and `b`.
///
/// Returns the scalar parameter `s = ((p - a) . (b - a)) / |b - a|^2` and the
/// projected point `a + s (b - a)`. A zero-length segment yields `s = 0` and `a`.
///
/// # Examples
///
/// ```
/// use pdf_text_layer::geometry::{Point, project_point_on_line};
///
/// let (s, foot) = project_point_on_line(
///     &Point::new(5.0, 3.0),
///     &Point::new(0.0, 0.0),
///     &Point::new(10.0, 0.0),
/// );
/// assert_eq!(s, 0.5);
/// assert_eq!(foot, Point::new(5.0, 0.0));
/// ```
pub fn project_point_on_line(p: &Point, a: &Point, b: &Point) -> (f64, Point) {
    let ab = a.to(b);
    let len2 = ab.dot(&ab);
    if len2 < EPSILON * EPSILON {
        return (0.0, *a);
    }
    let s = a.to(p).dot(&ab) / len2;
    (s, a.offset(&ab, s))
}

/// Angle of the total-least-squares line through `points`, in `[-90, 90]`.
///
/// The fit is orientation-agnostic (it also handles vertical lines), which
/// means the result is only defined up to 180 degrees. A set of coincident
/// points yields 0.
///
/// # Errors
///
/// `InvalidState` when the input is empty or contains non-finite coordinates.
pub fn fit_line_angle(points: &[Point]) -> Result<f64> {
    if points.is_empty() {
        return Err(Error::InvalidState("cannot fit a line through zero points".to_string()));
    }
    if points.iter().any(|p| !p.is_finite()) {
        return Err(Error::InvalidState("non-finite coordinate in line fit".to_string()));
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    // Work in a Y-up frame so the resulting angle is visual.
    let mean_y = points.iter().map(|p| -p.y).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for p in points {
        let dx = p.x - mean_x;
        let dy = -p.y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let angle = 0.5 * (2.0 * sxy).atan2(sxx - syy).to_degrees();
    if angle.is_nan() {
        return Err(Error::InvalidState("line fit produced a NaN angle".to_string()));
    }
    Ok(angle)
}
