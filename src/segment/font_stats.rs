//! Font size statistics for the font-size heading cue.

use std::collections::BTreeMap;

use crate::model::TextBlock;

/// Fallback body size when a document carries no usable font sizes.
const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Document-wide font size histogram.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Font size (0.1pt buckets) → characters set in that size
    pub size_histogram: BTreeMap<i32, usize>,
    /// Text-weighted median size, valid after [`FontStatistics::analyze`]
    pub median_size: f32,
}

impl FontStatistics {
    /// Collect statistics over a document's non-blank blocks.
    pub fn from_blocks(blocks: &[TextBlock]) -> Self {
        let mut stats = Self::default();
        for block in blocks.iter().filter(|b| !b.is_blank()) {
            stats.add_size(block.font_size, block.text.chars().count());
        }
        stats.analyze();
        stats
    }

    /// Add a font size observation weighted by character count.
    pub fn add_size(&mut self, size: f32, weight: usize) {
        if !size.is_finite() || size <= 0.0 || weight == 0 {
            return;
        }
        let key = (size * 10.0).round() as i32; // Round to 0.1 precision
        *self.size_histogram.entry(key).or_insert(0) += weight;
    }

    /// Calculate the median size.
    pub fn analyze(&mut self) {
        let total: usize = self.size_histogram.values().sum();
        if total == 0 {
            self.median_size = DEFAULT_BODY_SIZE;
            return;
        }

        let half = total.div_ceil(2);
        let mut seen = 0;
        for (key, count) in &self.size_histogram {
            seen += count;
            if seen >= half {
                self.median_size = *key as f32 / 10.0;
                return;
            }
        }
    }
}

/// Median of the body font sizes seen so far in reading order.
#[derive(Debug, Clone, Default)]
pub struct RunningMedian {
    sorted: Vec<f32>,
}

impl RunningMedian {
    /// Create an empty running median.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a body block's font size.
    pub fn push(&mut self, size: f32) {
        if !size.is_finite() || size <= 0.0 {
            return;
        }
        let at = self.sorted.partition_point(|s| *s <= size);
        self.sorted.insert(at, size);
    }

    /// Current median, or None before the first observation.
    pub fn median(&self) -> Option<f32> {
        let n = self.sorted.len();
        if n == 0 {
            return None;
        }
        if n % 2 == 1 {
            Some(self.sorted[n / 2])
        } else {
            Some((self.sorted[n / 2 - 1] + self.sorted[n / 2]) / 2.0)
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Check if nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}
