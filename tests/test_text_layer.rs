//! Integration tests for the page text layer index.

use pdf_text_layer::geometry::{OrientedRect, Point};
use pdf_text_layer::layout::{Letter, Word};
use pdf_text_layer::{Annotation, Error, LinkAction, TextLayer, TextLayerPipeline};
use std::sync::Arc;

// ============================================================================
// Helper Functions
// ============================================================================

fn mock_line(text: &str, x: f64, baseline: f64) -> Vec<Letter> {
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

/// Page with two paragraphs and a link over "docs":
///
/// ```text
/// Read the docs
/// for details
///
/// Second block here
/// ```
fn mock_page(page_number: usize) -> TextLayer {
    let mut letters = mock_line("Read the docs", 0.0, 20.0);
    letters.extend(mock_line("for details", 0.0, 34.0));
    letters.extend(mock_line("Second block here", 0.0, 120.0));
    let link = Annotation::new(
        OrientedRect::from_edges(54.0, 10.0, 78.0, 20.0),
        LinkAction::Uri("https://example.com/docs".to_string()),
    );
    TextLayerPipeline::new()
        .process_page(page_number, letters, vec![link])
        .unwrap()
}

fn texts<'a>(words: impl Iterator<Item = &'a Word>) -> Vec<String> {
    words.map(Word::text).collect()
}

// ============================================================================
// Index Tests
// ============================================================================

#[test]
fn test_index_partition() {
    let layer = mock_page(1);
    assert_eq!(layer.count(), 8);
    assert_eq!(layer.blocks().len(), 2);

    let flattened: Vec<&Word> = layer.iter().collect();
    assert_eq!(flattened.len(), layer.count());
    for (i, word) in flattened.iter().enumerate() {
        assert_eq!(layer.word_at(i).unwrap(), *word);
        assert_eq!(word.index_in_page(), i);
    }
    assert!(matches!(layer.word_at(8), Err(Error::OutOfRange { .. })));
    assert!(layer.get(8).is_none());
}

#[test]
fn test_block_word_ranges_are_contiguous() {
    let layer = mock_page(1);
    let mut next = 0;
    for block in layer.blocks() {
        assert_eq!(block.word_start_index(), next);
        next = block.word_end_index() + 1;
    }
    assert_eq!(next, layer.count());
}

#[test]
fn test_text_of_page() {
    let layer = mock_page(1);
    assert_eq!(layer.text(), "Read the docs\nfor details\n\nSecond block here");
    assert_eq!(layer.lines().count(), 3);
}

// ============================================================================
// Range Tests
// ============================================================================

#[test]
fn test_full_range_round_trip() {
    let layer = mock_page(1);
    let first = layer.word_at(0).unwrap();
    let last = layer.word_at(layer.count() - 1).unwrap();
    let range = layer.get_words(first, last).unwrap();
    assert_eq!(range.len(), layer.count());
    assert!(range.eq(layer.iter()));
}

#[test]
fn test_range_from_copied_words() {
    let layer = mock_page(1);
    let start = layer.word_at(2).unwrap().clone();
    let end = layer.word_at(5).unwrap().clone();
    let range = layer.get_words(&start, &end).unwrap();
    assert_eq!(texts(range), vec!["docs", "for", "details", "Second"]);
}

#[test]
fn test_ranges_inside_and_across_blocks() {
    let layer = mock_page(1);
    assert_eq!(texts(layer.words_between(1, 1).unwrap()), vec!["the"]);
    assert_eq!(texts(layer.words_between(2, 4).unwrap()), vec!["docs", "for", "details"]);
    assert_eq!(
        texts(layer.words_between(4, 6).unwrap()),
        vec!["details", "Second", "block"]
    );
}

#[test]
fn test_range_is_restartable() {
    let layer = mock_page(1);
    let range = layer.words_between(3, 7).unwrap();
    let again = range.clone();
    assert_eq!(range.count(), 5);
    assert_eq!(texts(again), vec!["for", "details", "Second", "block", "here"]);
}

#[test]
fn test_invalid_ranges() {
    let layer = mock_page(1);
    assert!(matches!(layer.words_between(3, 2), Err(Error::InvalidArgument(_))));
    assert!(matches!(layer.words_between(0, 99), Err(Error::OutOfRange { .. })));

    let other = TextLayerPipeline::new()
        .process_page(2, mock_line("elsewhere", 0.0, 20.0), Vec::new())
        .unwrap();
    let stranger = other.word_at(0).unwrap();
    let own = layer.word_at(3).unwrap();
    assert!(matches!(layer.get_words(stranger, own), Err(Error::InvalidArgument(_))));
}

// ============================================================================
// Point Query Tests
// ============================================================================

#[test]
fn test_point_queries() {
    let layer = mock_page(1);
    let over_docs = Point::new(60.0, 15.0);
    assert_eq!(layer.find_word_over(&over_docs).map(Word::text).as_deref(), Some("docs"));
    assert_eq!(layer.find_line_over(&over_docs).unwrap().to_string(), "Read the docs");
    assert_eq!(
        layer.find_annotation_over(&over_docs).and_then(Annotation::uri),
        Some("https://example.com/docs")
    );

    let nowhere = Point::new(500.0, 500.0);
    assert!(layer.find_word_over(&nowhere).is_none());
    assert!(layer.find_line_over(&nowhere).is_none());
    assert!(layer.find_annotation_over(&nowhere).is_none());
}

#[test]
fn test_find_nearest_word() {
    let layer = mock_page(1);
    let below_here = Point::new(100.0, 130.0);
    assert_eq!(layer.find_nearest_word(&below_here).unwrap().text(), "here");
    assert!(TextLayer::empty(1).unwrap().find_nearest_word(&below_here).is_none());
}

#[test]
fn test_line_of_word() {
    let layer = mock_page(1);
    let details = layer.word_at(4).unwrap();
    assert_eq!(layer.line_of(details).unwrap().to_string(), "for details");
}

// ============================================================================
// Sharing Tests
// ============================================================================

#[test]
fn test_layer_is_shared_across_threads() {
    let layer = Arc::new(mock_page(1));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let layer = Arc::clone(&layer);
            std::thread::spawn(move || layer.word_at(i).map(Word::text).unwrap_or_default())
        })
        .collect();
    let words: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(words, vec!["Read", "the", "docs", "for"]);
}

#[test]
fn test_layer_serializes_to_json() {
    let layer = mock_page(3);
    let json = serde_json::to_value(&layer).unwrap();
    assert_eq!(json["page_number"], 3);
    assert_eq!(json["blocks"].as_array().map(Vec::len), Some(2));
}
