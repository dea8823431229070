//! Configuration for text layer construction.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Text layer processing configuration.
///
/// # Examples
///
/// ```
/// use pdf_text_layer::LayoutConfig;
///
/// let config = LayoutConfig::new()
///     .with_duplicate_removal(false)
///     .with_cancellation_check_interval(16);
/// assert!(!config.remove_duplicate_letters);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Drop letters that duplicate an already accepted letter.
    pub remove_duplicate_letters: bool,

    /// Duplicate tolerance is `letter width / char count / divisor`.
    pub duplicate_tolerance_divisor: f64,

    /// Default word extractor: largest gap along the baseline, relative to
    /// the letter height, that still joins two letters.
    pub word_gap_ratio: f64,

    /// Default segmenter: largest baseline offset, relative to word height,
    /// for two words to share a line.
    pub line_tolerance_ratio: f64,

    /// Default segmenter: largest gap between consecutive lines, relative to
    /// line height, for them to share a block.
    pub block_gap_ratio: f64,

    /// Block ordering: blocks whose tops differ by less than this (points)
    /// are on the same row.
    pub block_row_tolerance: f64,

    /// Number of enumerated items between two cancellation checks.
    pub cancellation_check_interval: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            remove_duplicate_letters: true,
            duplicate_tolerance_divisor: 3.0,
            word_gap_ratio: 0.3,
            line_tolerance_ratio: 0.5,
            block_gap_ratio: 1.0,
            block_row_tolerance: 5.0,
            cancellation_check_interval: 64,
        }
    }

    /// Parse a configuration from JSON. Missing fields take their default.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Enable or disable duplicate letter removal.
    pub fn with_duplicate_removal(mut self, enable: bool) -> Self {
        self.remove_duplicate_letters = enable;
        self
    }

    /// Set the duplicate tolerance divisor.
    pub fn with_duplicate_tolerance_divisor(mut self, divisor: f64) -> Self {
        self.duplicate_tolerance_divisor = divisor;
        self
    }

    /// Set the default word extractor gap ratio.
    pub fn with_word_gap_ratio(mut self, ratio: f64) -> Self {
        self.word_gap_ratio = ratio;
        self
    }

    /// Set the default segmenter line tolerance.
    pub fn with_line_tolerance_ratio(mut self, ratio: f64) -> Self {
        self.line_tolerance_ratio = ratio;
        self
    }

    /// Set the default segmenter block gap ratio.
    pub fn with_block_gap_ratio(mut self, ratio: f64) -> Self {
        self.block_gap_ratio = ratio;
        self
    }

    /// Set the cancellation check interval.
    pub fn with_cancellation_check_interval(mut self, interval: usize) -> Self {
        self.cancellation_check_interval = interval;
        self
    }

    /// Set the block ordering row tolerance.
    pub fn with_block_row_tolerance(mut self, tolerance: f64) -> Self {
        self.block_row_tolerance = tolerance;
        self
    }

    /// Check that every numeric setting is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("duplicate_tolerance_divisor", self.duplicate_tolerance_divisor),
            ("word_gap_ratio", self.word_gap_ratio),
            ("line_tolerance_ratio", self.line_tolerance_ratio),
            ("block_gap_ratio", self.block_gap_ratio),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }

        if !self.block_row_tolerance.is_finite() || self.block_row_tolerance < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "block_row_tolerance must be finite and non-negative, got {}",
                self.block_row_tolerance
            )));
        }

        if self.cancellation_check_interval == 0 {
            return Err(Error::InvalidArgument(
                "cancellation_check_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
