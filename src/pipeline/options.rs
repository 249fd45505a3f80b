//! Run configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::extract::PassageOptions;
use crate::scoring::{Bm25Params, ContextualWeights, EnsembleWeights};
use crate::segment::SegmentOptions;
use crate::text::TokenizerChoice;

/// Options for a ranking run.
///
/// Deserializes from JSON with every field optional:
///
/// ```json
/// {
///   "weights": { "tfidf": 0.35, "bm25": 0.35, "contextual": 0.30 },
///   "bm25": { "k1": 1.5, "b": 0.75 },
///   "top_k": 5,
///   "segment": { "font_size_ratio": 1.2, "heading_max_tokens": 12 },
///   "timeout_ms": 30000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankOptions {
    /// Sub-score weights of the combined score
    pub weights: EnsembleWeights,

    /// BM25 parameters
    pub bm25: Bm25Params,

    /// Contextual score component weights
    pub contextual: ContextualWeights,

    /// Number of ranked sections returned
    pub top_k: usize,

    /// Heading detection thresholds
    pub segment: SegmentOptions,

    /// Passage length limits
    pub passage: PassageOptions,

    /// Batch timeout for the segmentation stage (None = wait forever)
    pub timeout_ms: Option<u64>,

    /// Segmentation worker threads (None = available parallelism)
    pub max_workers: Option<usize>,

    /// Sections with fewer characters are scored but never ranked (0 = off)
    pub min_section_chars: usize,

    /// Tokenizer backend
    pub tokenizer: TokenizerChoice,
}

impl RankOptions {
    /// Create new rank options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&data)
    }

    /// Parse options from a JSON string.
    pub fn from_json_str(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|e| Error::config(format!("invalid configuration: {}", e)))
    }

    /// Set the ensemble weights.
    pub fn with_weights(mut self, tfidf: f64, bm25: f64, contextual: f64) -> Self {
        self.weights = EnsembleWeights::new(tfidf, bm25, contextual);
        self
    }

    /// Set the BM25 parameters.
    pub fn with_bm25(mut self, k1: f64, b: f64) -> Self {
        self.bm25 = Bm25Params::new(k1, b);
        self
    }

    /// Set the contextual weights.
    pub fn with_contextual(mut self, contextual: ContextualWeights) -> Self {
        self.contextual = contextual;
        self
    }

    /// Set the number of results.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set segmentation options.
    pub fn with_segment_options(mut self, segment: SegmentOptions) -> Self {
        self.segment = segment;
        self
    }

    /// Set passage options.
    pub fn with_passage_options(mut self, passage: PassageOptions) -> Self {
        self.passage = passage;
        self
    }

    /// Set the batch timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis().min(u64::MAX as u128) as u64);
        self
    }

    /// Set the number of segmentation workers.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    /// Run segmentation on a single worker.
    pub fn sequential(self) -> Self {
        self.with_max_workers(1)
    }

    /// Set the minimum rankable section length.
    pub fn with_min_section_chars(mut self, chars: usize) -> Self {
        self.min_section_chars = chars;
        self
    }

    /// Set the tokenizer backend.
    pub fn with_tokenizer(mut self, tokenizer: TokenizerChoice) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Batch timeout as a duration.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Worker count to use for this machine.
    pub fn worker_count(&self) -> usize {
        self.max_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check every setting. Called before any document is touched.
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.bm25.validate()?;
        self.contextual.validate()?;
        self.segment.validate()?;
        self.passage.validate()?;

        if self.top_k == 0 {
            return Err(Error::config("top_k must be positive"));
        }
        if self.timeout_ms == Some(0) {
            return Err(Error::config("timeout_ms must be positive when set"));
        }
        if self.max_workers == Some(0) {
            return Err(Error::config("max_workers must be positive when set"));
        }
        Ok(())
    }
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            weights: EnsembleWeights::default(),
            bm25: Bm25Params::default(),
            contextual: ContextualWeights::default(),
            top_k: 5,
            segment: SegmentOptions::default(),
            passage: PassageOptions::default(),
            timeout_ms: None,
            max_workers: None,
            min_section_chars: 0,
            tokenizer: TokenizerChoice::default(),
        }
    }
}
