//! # sectionrank
//!
//! Persona-driven section ranking and passage extraction for parsed documents.
//!
//! This library takes text blocks with page and typography metadata,
//! partitions each document into sections, ranks every section against a
//! persona and task, and extracts the most relevant sentences of the best
//! sections.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sectionrank::{rank_documents, BlockSource, JsonFileSource, Query};
//! use std::sync::Arc;
//!
//! fn main() -> sectionrank::Result<()> {
//!     let sources: Vec<Arc<dyn BlockSource>> = vec![
//!         Arc::new(JsonFileSource::from_path("annual-report.json")),
//!         Arc::new(JsonFileSource::from_path("research-paper.json")),
//!     ];
//!     let query = Query::new("Investment Analyst", "assess market risk");
//!
//!     let output = rank_documents(&sources, &query)?;
//!     for record in output.records() {
//!         println!("#{} {} (p. {})", record.rank, record.section_heading, record.page_range);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Layout-agnostic segmentation**: wording, font size and emphasis cues
//! - **Ensemble scoring**: TF-IDF cosine, BM25 and a structural heuristic
//! - **Deterministic ranking**: total tie-break order, no hidden state
//! - **Partial failure**: bad or slow documents are excluded with a reason
//! - **Parallel segmentation**: Uses Rayon, one task per document

pub mod error;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod segment;
pub mod text;

// Re-export commonly used types
pub use error::{Error, Result};
pub use extract::{PassageExtractor, PassageOptions};
pub use model::{
    BoundingBox, DocumentOutcome, DocumentStatus, ExcludedDocument, ExtractedPassage,
    OutputRecord, PageRange, Query, RankedCandidate, RankedResult, RankingOutput, RunStats,
    ScoreBreakdown, Section, SectionKind, SentenceSpan, TextBlock,
};
pub use pipeline::{BlockSource, JsonFileSource, MemorySource, Pipeline, RankOptions};
pub use report::{ChallengeInput, ChallengeReport, JsonFormat};
pub use scoring::{
    rank_candidates, Bm25Params, ContextualWeights, CorpusStatistics, EnsembleScorer,
    EnsembleWeights,
};
pub use segment::{SegmentOptions, Segmenter};
pub use text::{Tokenizer, TokenizerBackend, TokenizerChoice};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Rank documents with default options.
///
/// # Example
///
/// ```no_run
/// use sectionrank::{rank_documents, BlockSource, MemorySource, Query, TextBlock};
/// use std::sync::Arc;
///
/// let blocks = vec![TextBlock::new("memo", 1, 0, "Risk Factors", 14.0).bold()];
/// let sources: Vec<Arc<dyn BlockSource>> = vec![Arc::new(MemorySource::new("memo", blocks))];
/// let output = rank_documents(&sources, &Query::new("Analyst", "assess risk")).unwrap();
/// println!("{} results", output.results.len());
/// ```
pub fn rank_documents(sources: &[Arc<dyn BlockSource>], query: &Query) -> Result<RankingOutput> {
    let pipeline = Pipeline::new(RankOptions::default())?;
    Ok(pipeline.run(sources, query))
}

/// Rank documents with custom options.
pub fn rank_documents_with_options(
    sources: &[Arc<dyn BlockSource>],
    query: &Query,
    options: RankOptions,
) -> Result<RankingOutput> {
    let pipeline = Pipeline::new(options)?;
    Ok(pipeline.run(sources, query))
}

/// Segment one document's blocks with default options.
///
/// # Example
///
/// ```
/// use sectionrank::{segment_blocks, TextBlock};
///
/// let blocks = vec![
///     TextBlock::new("doc", 1, 0, "1. Introduction", 14.0).bold(),
///     TextBlock::new("doc", 1, 1, "this report covers the first quarter.", 10.0),
/// ];
/// let sections = segment_blocks(&blocks).unwrap();
/// assert_eq!(sections.len(), 1);
/// ```
pub fn segment_blocks(blocks: &[TextBlock]) -> Result<Vec<Section>> {
    let segmenter = Segmenter::new(&SegmentOptions::default())?;
    Ok(segmenter.segment(blocks))
}

/// Builder for configuring and running a ranking.
///
/// # Example
///
/// ```no_run
/// use sectionrank::{Query, SectionRank};
///
/// let report = SectionRank::new()
///     .with_top_k(10)
///     .with_timeout_ms(30_000)
///     .with_json_file("annual-report.json")
///     .with_json_file("research-paper.json")
///     .run(&Query::new("Investment Analyst", "assess market risk"))?
///     .to_report();
/// # Ok::<(), sectionrank::Error>(())
/// ```
pub struct SectionRank {
    options: RankOptions,
    sources: Vec<Arc<dyn BlockSource>>,
}

impl SectionRank {
    /// Create a new SectionRank builder.
    pub fn new() -> Self {
        Self {
            options: RankOptions::default(),
            sources: Vec::new(),
        }
    }

    /// Replace all options.
    pub fn with_options(mut self, options: RankOptions) -> Self {
        self.options = options;
        self
    }

    /// Load options from a JSON configuration file.
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.options = RankOptions::from_json_file(path)?;
        Ok(self)
    }

    /// Set the ensemble weights.
    pub fn with_weights(mut self, tfidf: f64, bm25: f64, contextual: f64) -> Self {
        self.options = self.options.with_weights(tfidf, bm25, contextual);
        self
    }

    /// Set the number of results.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.options = self.options.with_top_k(top_k);
        self
    }

    /// Set the batch timeout in milliseconds.
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.options = self.options.with_timeout(Duration::from_millis(ms));
        self
    }

    /// Segment on a single worker.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Use a lexicon tokenizer, falling back to the rule tokenizer.
    pub fn with_lexicon(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.options = self
            .options
            .with_tokenizer(TokenizerChoice::Lexicon { path: path.into() });
        self
    }

    /// Add a document source.
    pub fn with_source(mut self, source: Arc<dyn BlockSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Add in-memory blocks as a document.
    pub fn with_blocks(self, document_id: impl Into<String>, blocks: Vec<TextBlock>) -> Self {
        self.with_source(Arc::new(MemorySource::new(document_id, blocks)))
    }

    /// Add a JSON block file, named after its file stem.
    pub fn with_json_file(self, path: impl Into<std::path::PathBuf>) -> Self {
        self.with_source(Arc::new(JsonFileSource::from_path(path)))
    }

    /// Run the ranking.
    pub fn run(self, query: &Query) -> Result<SectionRankResult> {
        let pipeline = Pipeline::new(self.options)?;
        let output = pipeline.run(&self.sources, query);
        let input_documents = self
            .sources
            .iter()
            .map(|s| s.document_id().to_string())
            .collect();
        Ok(SectionRankResult {
            output,
            input_documents,
        })
    }
}

impl Default for SectionRank {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a ranking run.
pub struct SectionRankResult {
    /// The ranking output
    pub output: RankingOutput,
    /// Document ids in input order
    input_documents: Vec<String>,
}

impl SectionRankResult {
    /// Flat output records in rank order.
    pub fn records(&self) -> Vec<OutputRecord> {
        self.output.records()
    }

    /// Build a challenge report.
    pub fn to_report(&self) -> ChallengeReport {
        ChallengeReport::new(&self.output, self.input_documents.clone())
    }

    /// Convert to JSON records.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        report::to_json(&self.output, format)
    }

    /// Get the ranking output.
    pub fn output(&self) -> &RankingOutput {
        &self.output
    }
}
