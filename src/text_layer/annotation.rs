//! Interactive link regions of a page.

use crate::geometry::{OrientedRect, Point};
use serde::{Deserialize, Serialize};

/// Action triggered by activating a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkAction {
    /// URI action - navigate to a web URL
    Uri(String),
    /// GoTo action - navigate to a page of the same document
    GoTo {
        /// 1-based target page
        page_number: usize,
    },
    /// Other action types (Launch, Named, etc.)
    Other {
        /// Action type (/S field)
        action_type: String,
    },
}

/// A link region on a page.
///
/// Annotations are independent of the word hierarchy but answer the same
/// point queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Active area of the link
    pub bounding_box: OrientedRect,
    /// What the link does
    pub action: LinkAction,
}

impl Annotation {
    /// Create a new annotation.
    pub fn new(bounding_box: OrientedRect, action: LinkAction) -> Self {
        Self {
            bounding_box,
            action,
        }
    }

    /// Whether the active area contains `point`.
    pub fn contains(&self, point: &Point) -> bool {
        self.bounding_box.contains(point)
    }

    /// Target URL of a URI link.
    pub fn uri(&self) -> Option<&str> {
        match &self.action {
            LinkAction::Uri(uri) => Some(uri),
            _ => None,
        }
    }
}
