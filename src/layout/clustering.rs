//! Spatial clustering of letters into words, lines and blocks.
//!
//! Clustering is a pluggable step: the aggregator only needs candidates
//! (groups of letters) and takes care of ordering and indexing them. The
//! [`WordExtractor`] and [`PageSegmenter`] traits are the seam; the default
//! implementations here use simple distance rules measured in the frame of
//! the text baseline, so they work for rotated text as well.
//!
//! Candidate neighbours come from an R-tree of envelopes inflated by the
//! reach of each rule, so only nearby pairs are ever compared.

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::geometry::{angle_distance, OrientedRect, Point};
use crate::layout::bounding_box::compute_bounding_box;
use crate::layout::letter::{LayoutElement, Letter, TextOrientation};
use crate::layout::reading_order::order_by_reading_order;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

/// Letters of one word, in any order.
pub type WordCandidate = Vec<Letter>;

/// Words of one line, in any order.
pub type LineCandidate = Vec<WordCandidate>;

/// Lines of one block, in any order.
pub type BlockCandidate = Vec<LineCandidate>;

/// Arbitrarily rotated elements within this many degrees share a frame.
const ANGLE_TOLERANCE_DEGREES: f64 = 5.0;

/// Words on the same baseline further apart than this many heights are on
/// different lines (columns, table cells).
const LINE_GAP_HEIGHTS: f64 = 3.0;

/// Extra reach, in heights, added to every neighbour envelope.
///
/// Rules for arbitrarily rotated text measure in a frame up to
/// `ANGLE_TOLERANCE_DEGREES` off the element's own.
const REACH_SLACK_HEIGHTS: f64 = 0.5;

/// Inflated envelope of an element, tagged with its index.
type Reach = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Groups letters into word candidates.
pub trait WordExtractor: Send + Sync {
    /// Get the name of this extractor.
    fn name(&self) -> &str;

    /// Group letters into words. Every returned word is non-empty.
    fn extract_words(&self, letters: &[Letter]) -> Result<Vec<WordCandidate>>;
}

/// Groups word candidates into lines and blocks.
pub trait PageSegmenter: Send + Sync {
    /// Get the name of this segmenter.
    fn name(&self) -> &str;

    /// Group words into blocks of lines. Every returned block and line is non-empty.
    fn segment(&self, words: Vec<WordCandidate>) -> Result<Vec<BlockCandidate>>;
}

/// Word extractor joining letters that sit on the same baseline with a small gap.
///
/// Whitespace letters never join a word, so explicit spaces always split.
#[derive(Debug, Clone)]
pub struct BaselineWordExtractor {
    gap_ratio: f64,
    baseline_tolerance_ratio: f64,
}

impl BaselineWordExtractor {
    /// Create an extractor.
    ///
    /// * `gap_ratio` - largest gap between letters, relative to letter height
    /// * `baseline_tolerance_ratio` - largest baseline offset, relative to letter height
    pub fn new(gap_ratio: f64, baseline_tolerance_ratio: f64) -> Self {
        Self {
            gap_ratio,
            baseline_tolerance_ratio,
        }
    }

    /// Create an extractor from the layout configuration.
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.word_gap_ratio, config.line_tolerance_ratio)
    }

    fn joins(&self, a: &Letter, b: &Letter) -> bool {
        let Some(angle) = shared_frame(a, b) else {
            return false;
        };
        let (sa, sb) = (Span::of(a, angle), Span::of(b, angle));
        let height = sa.height.max(sb.height);
        (sa.base - sb.base).abs() <= self.baseline_tolerance_ratio * height
            && sa.gap_to(&sb) <= self.gap_ratio * height
    }
}

impl Default for BaselineWordExtractor {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl WordExtractor for BaselineWordExtractor {
    fn name(&self) -> &str {
        "baseline-gap"
    }

    fn extract_words(&self, letters: &[Letter]) -> Result<Vec<WordCandidate>> {
        let glyphs: Vec<&Letter> = letters.iter().filter(|l| !l.is_whitespace()).collect();
        let reach = self.gap_ratio + self.baseline_tolerance_ratio;
        let clusters = grow_clusters(&glyphs, reach, |i, j| self.joins(glyphs[i], glyphs[j]));
        log::trace!(
            "{} grouped {} glyphs into {} words",
            self.name(),
            glyphs.len(),
            clusters.len()
        );
        Ok(clusters
            .into_iter()
            .map(|cluster| cluster.into_iter().map(|i| glyphs[i].clone()).collect())
            .collect())
    }
}

/// Segmenter grouping collinear words into lines and stacked lines into blocks.
#[derive(Debug, Clone)]
pub struct BaselineSegmenter {
    line_tolerance_ratio: f64,
    block_gap_ratio: f64,
}

impl BaselineSegmenter {
    /// Create a segmenter.
    ///
    /// * `line_tolerance_ratio` - largest baseline offset between words of a line,
    ///   relative to height
    /// * `block_gap_ratio` - largest free space between lines of a block, relative to height
    pub fn new(line_tolerance_ratio: f64, block_gap_ratio: f64) -> Self {
        Self {
            line_tolerance_ratio,
            block_gap_ratio,
        }
    }

    /// Create a segmenter from the layout configuration.
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.line_tolerance_ratio, config.block_gap_ratio)
    }

    fn same_line(&self, a: &Piece, b: &Piece) -> bool {
        let Some(angle) = shared_frame(a, b) else {
            return false;
        };
        let (sa, sb) = (Span::of(a, angle), Span::of(b, angle));
        let height = sa.height.max(sb.height);
        (sa.base - sb.base).abs() <= self.line_tolerance_ratio * height
            && sa.gap_to(&sb) <= LINE_GAP_HEIGHTS * height
    }

    fn same_block(&self, a: &Piece, b: &Piece) -> bool {
        let Some(angle) = shared_frame(a, b) else {
            return false;
        };
        let (sa, sb) = (Span::of(a, angle), Span::of(b, angle));
        let (upper, lower) = if sa.base >= sb.base { (sa, sb) } else { (sb, sa) };
        // Free space between the baseline of the upper line and the top of the lower one.
        let free = upper.base - lower.base - lower.height;
        let height = sa.height.max(sb.height);
        sa.gap_to(&sb) <= 0.0 && free <= self.block_gap_ratio * height
    }
}

impl Default for BaselineSegmenter {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl PageSegmenter for BaselineSegmenter {
    fn name(&self) -> &str {
        "baseline-stack"
    }

    fn segment(&self, words: Vec<WordCandidate>) -> Result<Vec<BlockCandidate>> {
        let word_pieces = words
            .iter()
            .map(|w| Piece::of(w.as_slice()))
            .collect::<Result<Vec<_>>>()?;
        let line_reach = self.line_tolerance_ratio + LINE_GAP_HEIGHTS;
        let line_clusters = grow_clusters(&word_pieces, line_reach, |i, j| {
            self.same_line(&word_pieces[i], &word_pieces[j])
        });

        let line_pieces = line_clusters
            .iter()
            .map(|cluster| {
                let members: Vec<&Piece> = cluster.iter().map(|&i| &word_pieces[i]).collect();
                Piece::of(&members)
            })
            .collect::<Result<Vec<_>>>()?;
        let block_clusters = grow_clusters(&line_pieces, self.block_gap_ratio, |i, j| {
            self.same_block(&line_pieces[i], &line_pieces[j])
        });

        log::trace!(
            "{} grouped {} words into {} lines and {} blocks",
            self.name(),
            words.len(),
            line_clusters.len(),
            block_clusters.len()
        );

        let mut word_slots: Vec<Option<WordCandidate>> = words.into_iter().map(Some).collect();
        let mut lines: Vec<Option<LineCandidate>> = line_clusters
            .into_iter()
            .map(|cluster| {
                Some(cluster.into_iter().filter_map(|i| word_slots[i].take()).collect())
            })
            .collect();
        Ok(block_clusters
            .into_iter()
            .map(|cluster| cluster.into_iter().filter_map(|i| lines[i].take()).collect())
            .collect())
    }
}

/// Box and orientation of an intermediate group.
#[derive(Debug, Clone, Copy)]
struct Piece {
    bounding_box: OrientedRect,
    orientation: TextOrientation,
}

impl Piece {
    fn of<E: LayoutElement>(elements: &[E]) -> Result<Self> {
        let ordered = order_by_reading_order(elements.iter().collect::<Vec<&E>>())?;
        let (bounding_box, orientation) = compute_bounding_box(&ordered)?;
        Ok(Self {
            bounding_box,
            orientation,
        })
    }
}

impl LayoutElement for Piece {
    fn bounding_box(&self) -> &OrientedRect {
        &self.bounding_box
    }

    fn text_orientation(&self) -> TextOrientation {
        self.orientation
    }
}

/// Extent of an element measured along and across a baseline direction.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: f64,
    end: f64,
    /// Position of the baseline along the "up" normal
    base: f64,
    height: f64,
}

impl Span {
    fn of<E: LayoutElement>(element: &E, angle: f64) -> Self {
        let along = Point::new(1.0, 0.0).rotate(angle);
        let up = Point::new(0.0, -1.0).rotate(angle);
        let bbox = element.bounding_box();
        let a = bbox.bottom_left.dot(&along);
        let b = bbox.bottom_right.dot(&along);
        Self {
            start: a.min(b),
            end: a.max(b),
            base: bbox.bottom_left.dot(&up),
            height: bbox.height(),
        }
    }

    /// Free space between the two extents along the baseline, negative when they overlap.
    fn gap_to(&self, other: &Span) -> f64 {
        self.start.max(other.start) - self.end.min(other.end)
    }
}

/// Baseline angle shared by two elements, `None` when they are not oriented alike.
fn shared_frame<E: LayoutElement>(a: &E, b: &E) -> Option<f64> {
    let orientation = a.text_orientation();
    if orientation != b.text_orientation() {
        return None;
    }
    match orientation.canonical_angle() {
        Some(angle) => Some(angle),
        None => {
            let (ra, rb) = (a.bounding_box().rotation(), b.bounding_box().rotation());
            (angle_distance(ra, rb) <= ANGLE_TOLERANCE_DEGREES).then_some(ra)
        },
    }
}

/// Axis-aligned envelope of `element` grown by `reach` heights on every side.
///
/// `None` for corrupt geometry; such an element only ever forms its own cluster.
fn reach_envelope<E: LayoutElement>(element: &E, reach: f64) -> Option<AABB<[f64; 2]>> {
    let bbox = element.bounding_box();
    let margin = (reach.max(0.0) + REACH_SLACK_HEIGHTS) * bbox.height();
    if !bbox.is_finite() || !margin.is_finite() {
        return None;
    }
    let r = bbox.envelope();
    Some(AABB::from_corners(
        [r.x - margin, r.y - margin],
        [r.x + r.width + margin, r.y + r.height + margin],
    ))
}

/// Region growing over `elements`: `linked(i, j)` says whether `i` reaches `j`.
///
/// `linked` is only asked about pairs whose envelopes, inflated by `reach`
/// heights, intersect. Two elements further apart than the sum of their
/// reaches are never linked.
///
/// Clusters come out in order of their smallest member, members sorted.
fn grow_clusters<E: LayoutElement>(
    elements: &[E],
    reach: f64,
    linked: impl Fn(usize, usize) -> bool,
) -> Vec<Vec<usize>> {
    let n = elements.len();
    let envelopes: Vec<Option<AABB<[f64; 2]>>> =
        elements.iter().map(|e| reach_envelope(e, reach)).collect();
    let tree: RTree<Reach> = RTree::bulk_load(
        envelopes
            .iter()
            .enumerate()
            .filter_map(|(i, envelope)| envelope.map(|e| Reach::new(Rectangle::from_aabb(e), i)))
            .collect(),
    );

    let mut visited = vec![false; n];
    let mut clusters: Vec<Vec<usize>> = vec![];

    for i in 0..n {
        if visited[i] {
            continue;
        }

        let mut cluster = vec![i];
        visited[i] = true;

        let mut j = 0;
        while j < cluster.len() {
            let current = cluster[j];
            let mut neighbours: Vec<usize> = match &envelopes[current] {
                Some(envelope) => tree
                    .locate_in_envelope_intersecting(envelope)
                    .map(|r| r.data)
                    .collect(),
                None => Vec::new(),
            };
            // Tree order is not input order.
            neighbours.sort_unstable();
            for k in neighbours {
                if !visited[k] && linked(current, k) {
                    cluster.push(k);
                    visited[k] = true;
                }
            }
            j += 1;
        }

        cluster.sort_unstable();
        clusters.push(cluster);
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Letters of `text` on an upright baseline, 6 points wide, 10 high.
    /// A space advances the pen without producing a glyph box gap.
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

    fn word_texts(words: &[WordCandidate]) -> Vec<String> {
        let mut texts: Vec<String> = words
            .iter()
            .map(|w| {
                let ordered = order_by_reading_order(w.clone()).unwrap();
                ordered.iter().map(|l| l.text.as_str()).collect()
            })
            .collect();
        texts.sort();
        texts
    }

    #[test]
    fn test_extract_empty() {
        let words = BaselineWordExtractor::default().extract_words(&[]).unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn test_spaces_split_words() {
        let letters = mock_letters("Hello World", 0.0, 20.0);
        let words = BaselineWordExtractor::default().extract_words(&letters).unwrap();
        assert_eq!(word_texts(&words), vec!["Hello", "World"]);
    }

    #[test]
    fn test_gaps_split_words() {
        let mut letters = mock_letters("ab", 0.0, 20.0);
        letters.extend(mock_letters("cd", 40.0, 20.0));
        let words = BaselineWordExtractor::default().extract_words(&letters).unwrap();
        assert_eq!(word_texts(&words), vec!["ab", "cd"]);
    }

    #[test]
    fn test_different_baselines_split_words() {
        let mut letters = mock_letters("ab", 0.0, 20.0);
        letters.extend(mock_letters("cd", 12.0, 40.0));
        let words = BaselineWordExtractor::default().extract_words(&letters).unwrap();
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn test_rotated_letters_form_one_word() {
        let letters: Vec<Letter> = (0..4)
            .map(|i| {
                let start = Point::new(50.0, 100.0 - i as f64 * 6.0);
                Letter::new("x", OrientedRect::from_baseline(start, 90.0, 6.0, 10.0), 10.0, i)
            })
            .collect();
        let words = BaselineWordExtractor::default().extract_words(&letters).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].len(), 4);
    }

    #[test]
    fn test_mixed_orientations_never_join() {
        let upright = mock_letters("a", 50.0, 100.0);
        let rotated = Letter::new(
            "b",
            OrientedRect::from_baseline(Point::new(56.0, 100.0), 90.0, 6.0, 10.0),
            10.0,
            1,
        );
        let letters = vec![upright[0].clone(), rotated];
        let words = BaselineWordExtractor::default().extract_words(&letters).unwrap();
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn test_segment_paragraph_into_one_block() {
        let mut letters = mock_letters("first line", 0.0, 20.0);
        letters.extend(mock_letters("second line", 0.0, 32.0));
        let words = BaselineWordExtractor::default().extract_words(&letters).unwrap();
        let blocks = BaselineSegmenter::default().segment(words).unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 2);
        assert!(blocks[0].iter().all(|line| line.len() == 2));
    }

    #[test]
    fn test_segment_separates_distant_paragraphs() {
        let mut letters = mock_letters("top", 0.0, 20.0);
        letters.extend(mock_letters("bottom", 0.0, 200.0));
        let words = BaselineWordExtractor::default().extract_words(&letters).unwrap();
        let blocks = BaselineSegmenter::default().segment(words).unwrap();
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_segment_separates_columns() {
        let mut letters = mock_letters("left", 0.0, 20.0);
        letters.extend(mock_letters("right", 300.0, 20.0));
        let words = BaselineWordExtractor::default().extract_words(&letters).unwrap();
        let blocks = BaselineSegmenter::default().segment(words).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.len() == 1 && b[0].len() == 1));
    }

    #[test]
    fn test_grow_clusters_chains() {
        // 0-1 and 1-2 linked, 3 alone.
        let letters = mock_letters("abcd", 0.0, 20.0);
        let clusters = grow_clusters(&letters, 1.0, |i, j| i.abs_diff(j) == 1 && i.max(j) < 3);
        assert_eq!(clusters, vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn test_grow_clusters_skips_distant_pairs() {
        let mut letters = mock_letters("ab", 0.0, 20.0);
        letters.extend(mock_letters("cd", 500.0, 20.0));
        let asked = std::sync::Mutex::new(Vec::new());
        let clusters = grow_clusters(&letters, 1.0, |i, j| {
            asked.lock().unwrap().push((i, j));
            true
        });
        assert_eq!(clusters, vec![vec![0, 1], vec![2, 3]]);
        assert!(asked.lock().unwrap().iter().all(|&(i, j)| (i < 2) == (j < 2)));
    }

    #[test]
    fn test_grow_clusters_isolates_corrupt_geometry() {
        let mut letters = mock_letters("abc", 0.0, 20.0);
        letters[1].bounding_box.top_left.x = f64::NAN;
        let clusters = grow_clusters(&letters, 1.0, |_, _| true);
        assert_eq!(clusters, vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn test_extract_many_lines() {
        let letters: Vec<Letter> = (0..200)
            .flat_map(|row| mock_letters("lorem ipsum dolor", 0.0, 20.0 + row as f64 * 14.0))
            .collect();
        let words = BaselineWordExtractor::default().extract_words(&letters).unwrap();
        assert_eq!(words.len(), 600);
        assert!(words.iter().all(|w| w.len() == 5));
    }

    #[test]
    fn test_trait_names() {
        assert_eq!(BaselineWordExtractor::default().name(), "baseline-gap");
        assert_eq!(BaselineSegmenter::default().name(), "baseline-stack");
    }
}
