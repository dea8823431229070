//! Letters and text orientation.

use crate::geometry::{angle_distance, bound_angle_180, OrientedRect, Point};
use serde::{Deserialize, Serialize};

/// Letters within this many degrees of a canonical angle snap to it.
pub const ORIENTATION_TOLERANCE_DEGREES: f64 = 0.01;

/// Orientation of a piece of text.
///
/// Angles are visual (counter-clockwise on screen): `Rotate90` text reads up
/// the page, `Rotate270` text reads down it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextOrientation {
    /// Upright text, baseline at 0 degrees
    Horizontal,
    /// Baseline at 90 degrees
    Rotate90,
    /// Upside-down text, baseline at 180 degrees
    Rotate180,
    /// Baseline at 270 (-90) degrees
    Rotate270,
    /// Any other angle
    Other,
}

impl TextOrientation {
    /// Classify a baseline angle.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_text_layer::layout::TextOrientation;
    ///
    /// assert_eq!(TextOrientation::from_rotation(0.004), TextOrientation::Horizontal);
    /// assert_eq!(TextOrientation::from_rotation(-90.0), TextOrientation::Rotate270);
    /// assert_eq!(TextOrientation::from_rotation(270.0), TextOrientation::Rotate270);
    /// assert_eq!(TextOrientation::from_rotation(30.0), TextOrientation::Other);
    /// ```
    pub fn from_rotation(degrees: f64) -> Self {
        const CANONICAL: [(f64, TextOrientation); 4] = [
            (0.0, TextOrientation::Horizontal),
            (90.0, TextOrientation::Rotate90),
            (180.0, TextOrientation::Rotate180),
            (-90.0, TextOrientation::Rotate270),
        ];
        if !degrees.is_finite() {
            return TextOrientation::Other;
        }
        let bounded = bound_angle_180(degrees);
        CANONICAL
            .iter()
            .find(|(angle, _)| angle_distance(bounded, *angle) <= ORIENTATION_TOLERANCE_DEGREES)
            .map(|(_, orientation)| *orientation)
            .unwrap_or(TextOrientation::Other)
    }

    /// Baseline angle of a canonical orientation, `None` for [`Other`](Self::Other).
    pub fn canonical_angle(&self) -> Option<f64> {
        match self {
            TextOrientation::Horizontal => Some(0.0),
            TextOrientation::Rotate90 => Some(90.0),
            TextOrientation::Rotate180 => Some(180.0),
            TextOrientation::Rotate270 => Some(-90.0),
            TextOrientation::Other => None,
        }
    }
}

/// Anything that occupies an oriented box on the page: letters, words, lines
/// and blocks.
pub trait LayoutElement {
    /// Oriented bounding box of the element.
    fn bounding_box(&self) -> &OrientedRect;

    /// Text orientation of the element.
    fn text_orientation(&self) -> TextOrientation;

    /// Start of the baseline.
    fn baseline_start(&self) -> Point {
        self.bounding_box().bottom_left
    }

    /// End of the baseline.
    fn baseline_end(&self) -> Point {
        self.bounding_box().bottom_right
    }
}

impl<T: LayoutElement + ?Sized> LayoutElement for &T {
    fn bounding_box(&self) -> &OrientedRect {
        (**self).bounding_box()
    }

    fn text_orientation(&self) -> TextOrientation {
        (**self).text_orientation()
    }
}

/// Orientation shared by every element, or `Other` when they disagree.
///
/// An empty slice is `Other`.
pub fn dominant_orientation<E: LayoutElement>(elements: &[E]) -> TextOrientation {
    let Some(first) = elements.first() else {
        return TextOrientation::Other;
    };
    let orientation = first.text_orientation();
    if elements.iter().all(|e| e.text_orientation() == orientation) {
        orientation
    } else {
        TextOrientation::Other
    }
}

/// The smallest text unit: one decoded glyph with its box.
///
/// Letters come from the glyph source already decoded and are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Letter {
    /// Decoded text, usually a single character but ligatures may carry more
    pub text: String,
    /// Glyph rectangle in page space
    pub bounding_box: OrientedRect,
    /// Font size in points
    pub point_size: f64,
    /// Position of the glyph in the content stream
    pub sequence_number: usize,
}

impl Letter {
    /// Create a new letter.
    pub fn new(
        text: impl Into<String>,
        bounding_box: OrientedRect,
        point_size: f64,
        sequence_number: usize,
    ) -> Self {
        Self {
            text: text.into(),
            bounding_box,
            point_size,
            sequence_number,
        }
    }

    /// Number of characters in the letter text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the letter is made of whitespace only.
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

impl LayoutElement for Letter {
    fn bounding_box(&self) -> &OrientedRect {
        &self.bounding_box
    }

    fn text_orientation(&self) -> TextOrientation {
        TextOrientation::from_rotation(self.bounding_box.rotation())
    }
}
