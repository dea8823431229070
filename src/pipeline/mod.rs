//! Page text layer pipeline with pluggable clustering.
//!
//! ```text
//! Letter[] (decoded glyphs)
//!     ↓
//! [DuplicateLetterFilter] (optional)
//!     ↓
//! [WordExtractor] (letters → word candidates)
//!     ↓
//! [PageSegmenter] (words → lines → blocks)
//!     ↓
//! [build_blocks] (reading order + indices)
//!     ↓
//! TextLayer
//! ```
//!
//! The pipeline is a pure function of the glyphs it is given. It holds no
//! page state, so one pipeline can serve several pages concurrently.

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::layout::{
    build_blocks, BaselineSegmenter, BaselineWordExtractor, DuplicateLetterFilter, Letter,
    PageSegmenter, WordExtractor,
};
use crate::text_layer::{Annotation, TextLayer};

/// The text layer pipeline - orchestrates the full flow for one page.
pub struct TextLayerPipeline {
    config: LayoutConfig,
    word_extractor: Box<dyn WordExtractor>,
    segmenter: Box<dyn PageSegmenter>,
}

impl TextLayerPipeline {
    /// Create a new pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    /// Create a pipeline with custom configuration and the default clustering.
    pub fn with_config(config: LayoutConfig) -> Self {
        let word_extractor = Box::new(BaselineWordExtractor::from_config(&config));
        let segmenter = Box::new(BaselineSegmenter::from_config(&config));
        Self {
            config,
            word_extractor,
            segmenter,
        }
    }

    /// Replace the word extractor.
    pub fn with_word_extractor(mut self, extractor: Box<dyn WordExtractor>) -> Self {
        self.word_extractor = extractor;
        self
    }

    /// Replace the page segmenter.
    pub fn with_segmenter(mut self, segmenter: Box<dyn PageSegmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Build the text layer of one page.
    ///
    /// 1. Drop duplicate glyphs (when enabled)
    /// 2. Cluster letters into words, lines and blocks
    /// 3. Order and index the hierarchy
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an invalid configuration
    /// - `OutOfRange` for page number 0
    /// - `InvalidState` when glyph geometry is corrupt
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_text_layer::geometry::OrientedRect;
    /// use pdf_text_layer::layout::Letter;
    /// use pdf_text_layer::TextLayerPipeline;
    ///
    /// let letters: Vec<Letter> = "Hi there"
    ///     .chars()
    ///     .enumerate()
    ///     .map(|(i, c)| {
    ///         let x = i as f64 * 6.0;
    ///         Letter::new(c.to_string(), OrientedRect::from_edges(x, 0.0, x + 6.0, 10.0), 10.0, i)
    ///     })
    ///     .collect();
    ///
    /// let layer = TextLayerPipeline::new().process_page(1, letters, Vec::new()).unwrap();
    /// assert_eq!(layer.count(), 2);
    /// assert_eq!(layer.text(), "Hi there");
    /// ```
    pub fn process_page(
        &self,
        page_number: usize,
        letters: Vec<Letter>,
        annotations: Vec<Annotation>,
    ) -> Result<TextLayer> {
        self.config.validate()?;
        if let Some(corrupt) = letters.iter().find(|l| !l.bounding_box.is_finite()) {
            return Err(Error::InvalidState(format!(
                "page {}: letter '{}' (sequence {}) has non-finite geometry",
                page_number, corrupt.text, corrupt.sequence_number
            )));
        }

        let letters_in = letters.len();
        let letters = if self.config.remove_duplicate_letters {
            DuplicateLetterFilter::with_tolerance_divisor(self.config.duplicate_tolerance_divisor)
                .filter(letters)
        } else {
            letters
        };

        let words = self.word_extractor.extract_words(&letters)?;
        let word_count = words.len();
        let candidates = self.segmenter.segment(words)?;
        let blocks = build_blocks(candidates, &self.config)?;

        log::debug!(
            "Page {}: {} letters in, {} after filter, {} words ({}), {} blocks ({})",
            page_number,
            letters_in,
            letters.len(),
            word_count,
            self.word_extractor.name(),
            blocks.len(),
            self.segmenter.name()
        );

        TextLayer::new(page_number, blocks, annotations)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }
}

impl Default for TextLayerPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextLayerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayerPipeline")
            .field("config", &self.config)
            .field("word_extractor", &self.word_extractor.name())
            .field("segmenter", &self.segmenter.name())
            .finish()
    }
}
