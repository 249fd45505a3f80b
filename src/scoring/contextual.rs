//! Rule-based contextual relevance.
//!
//! Combines the structural confidence of the section heading, how typical
//! the section length is for the corpus, and whether query keywords appear
//! verbatim in the heading.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tolerance used when checking that weights sum to one.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Component weights of the contextual score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextualWeights {
    /// Weight of the heading's structural confidence
    pub structure: f64,
    /// Weight of the length bump
    pub length: f64,
    /// Weight of heading keyword overlap
    pub heading_overlap: f64,
    /// The length bump reaches 0 at this multiple of the median length
    pub length_spread: f64,
}

impl ContextualWeights {
    /// Check that the weights are non-negative and sum to 1.
    pub fn validate(&self) -> Result<()> {
        let parts = [self.structure, self.length, self.heading_overlap];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::config(format!(
                "contextual weights must be non-negative, got {:?}",
                parts
            )));
        }
        let sum: f64 = parts.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::config(format!(
                "contextual weights must sum to 1.0, got {}",
                sum
            )));
        }
        if !self.length_spread.is_finite() || self.length_spread <= 1.0 {
            return Err(Error::config(format!(
                "contextual.length_spread must be greater than 1.0, got {}",
                self.length_spread
            )));
        }
        Ok(())
    }

    /// Weighted combination, clamped to `[0, 1]`.
    pub fn combine(&self, structure: f64, length: f64, heading_overlap: f64) -> f64 {
        (self.structure * structure + self.length * length + self.heading_overlap * heading_overlap)
            .clamp(0.0, 1.0)
    }
}

impl Default for ContextualWeights {
    fn default() -> Self {
        Self {
            structure: 0.4,
            length: 0.3,
            heading_overlap: 0.3,
            length_spread: 3.0,
        }
    }
}

/// Triangular bump over token length.
///
/// Rises linearly from 0 at length 0 to 1 at the median, then falls to 0 at
/// `spread × median`. A corpus with median length 0 carries no length signal.
pub fn length_bump(length: usize, median: f64, spread: f64) -> f64 {
    if median <= 0.0 {
        return 0.0;
    }
    let length = length as f64;
    if length <= median {
        return length / median;
    }
    let upper = median * spread;
    if length >= upper {
        0.0
    } else {
        (upper - length) / (upper - median)
    }
}

/// Fraction of heading tokens that are query keywords.
pub fn heading_overlap(heading_tokens: &[String], query_terms: &BTreeSet<&str>) -> f64 {
    if heading_tokens.is_empty() {
        return 0.0;
    }
    let hits = heading_tokens
        .iter()
        .filter(|t| query_terms.contains(t.as_str()))
        .count();
    hits as f64 / heading_tokens.len() as f64
}
