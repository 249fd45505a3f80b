//! Segmentation options and configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options controlling heading detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentOptions {
    /// A block whose font size exceeds the running median body size by this
    /// ratio is a heading candidate
    pub font_size_ratio: f32,

    /// Maximum word count for pattern and style cues
    pub heading_max_tokens: usize,

    /// Treat Title Case lines as matching the pattern cue
    pub detect_title_case: bool,

    /// Section markers added to the built-in dictionary (case-insensitive)
    pub extra_markers: Vec<String>,

    /// Regular expressions added to the built-in heading patterns
    pub extra_patterns: Vec<String>,
}

impl SegmentOptions {
    /// Create new segment options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font size ratio.
    pub fn with_font_size_ratio(mut self, ratio: f32) -> Self {
        self.font_size_ratio = ratio;
        self
    }

    /// Set the heading token threshold.
    pub fn with_heading_max_tokens(mut self, tokens: usize) -> Self {
        self.heading_max_tokens = tokens;
        self
    }

    /// Enable or disable Title Case detection.
    pub fn with_title_case(mut self, detect: bool) -> Self {
        self.detect_title_case = detect;
        self
    }

    /// Add a section marker.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.extra_markers.push(marker.into());
        self
    }

    /// Add a heading pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.extra_patterns.push(pattern.into());
        self
    }

    /// Check the thresholds.
    pub fn validate(&self) -> Result<()> {
        if !self.font_size_ratio.is_finite() || self.font_size_ratio <= 1.0 {
            return Err(Error::config(format!(
                "segment.font_size_ratio must be greater than 1.0, got {}",
                self.font_size_ratio
            )));
        }
        if self.heading_max_tokens == 0 {
            return Err(Error::config("segment.heading_max_tokens must be positive"));
        }
        if self.extra_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(Error::config("segment.extra_markers contains a blank marker"));
        }
        Ok(())
    }
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            font_size_ratio: 1.2,
            heading_max_tokens: 12,
            detect_title_case: true,
            extra_markers: Vec::new(),
            extra_patterns: Vec::new(),
        }
    }
}
