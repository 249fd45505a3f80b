//! Scoring, ranking and run-level output types.

use super::{PageRange, Query, Section};
use serde::{Deserialize, Serialize};

/// Per-signal relevance of one section to the query.
///
/// All sub-scores are normalized to `[0, 1]` before combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Cosine similarity of TF-IDF vectors
    pub tfidf_score: f64,
    /// Min-max normalized BM25
    pub bm25_score: f64,
    /// Structural / length / heading heuristic
    pub contextual_score: f64,
    /// Weighted combination of the three
    pub combined_score: f64,
}

/// A section with its scores and 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// The ranked section
    pub section: Section,
    /// How the score was obtained
    pub score_breakdown: ScoreBreakdown,
    /// 1-based position after sorting
    pub rank: usize,
}

/// Sentence indices covered by a passage (inclusive on both ends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSpan {
    /// First sentence index
    pub first: usize,
    /// Last sentence index
    pub last: usize,
}

impl SentenceSpan {
    /// Number of sentences in the span.
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// Always false; a span holds at least one sentence.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// The most query-relevant sentence run of a ranked section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPassage {
    /// Rank of the candidate the passage was taken from
    pub candidate_rank: usize,
    /// Sentences covered
    pub sentence_span: SentenceSpan,
    /// Passage text, taken verbatim from the section body
    pub sentence_text: String,
    /// Similarity of the best sentence to the query
    pub local_relevance_score: f64,
}

/// A ranked candidate with its extracted passage, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// Ranked section
    pub candidate: RankedCandidate,
    /// Representative passage (None for sections without body sentences)
    pub passage: Option<ExtractedPassage>,
}

/// What happened to one input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutcome {
    /// Document identifier
    pub document_id: String,
    /// Outcome
    pub status: DocumentStatus,
}

/// Outcome of segmenting one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Segmented and pooled into the corpus
    Segmented {
        /// Number of sections produced
        sections: usize,
    },
    /// Segmented, but produced zero sections
    Empty,
    /// Loading, validation or segmentation failed
    Failed {
        /// Error description
        reason: String,
    },
    /// Not segmented before the batch timeout
    TimedOut {
        /// Error description
        reason: String,
    },
}

impl DocumentOutcome {
    /// Reason the document was excluded from ranking, if it was.
    pub fn exclusion_reason(&self) -> Option<&str> {
        match &self.status {
            DocumentStatus::Failed { reason } | DocumentStatus::TimedOut { reason } => {
                Some(reason.as_str())
            }
            _ => None,
        }
    }
}

/// A document left out of ranking, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedDocument {
    /// Document identifier
    pub document_id: String,
    /// Non-empty reason
    pub reason: String,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Documents submitted
    pub document_count: usize,
    /// Documents that produced sections
    pub segmented_count: usize,
    /// Sections pooled into the corpus
    pub section_count: usize,
    /// Sections eligible for ranking
    pub candidate_count: usize,
    /// Vocabulary size of the run corpus
    pub vocabulary_size: usize,
    /// Wall time in milliseconds
    pub elapsed_ms: u64,
}

/// Flat per-candidate record handed to serializers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Document identifier
    pub document_id: String,
    /// Section heading (empty for preambles)
    pub section_heading: String,
    /// Pages spanned
    pub page_range: PageRange,
    /// 1-based rank
    pub rank: usize,
    /// Combined relevance
    pub combined_score: f64,
    /// Per-signal scores
    pub score_breakdown: ScoreBreakdown,
    /// Extracted passage (empty when none)
    pub extracted_passage_text: String,
    /// Whether the section body contains figures
    pub has_numbers: bool,
}

/// Result of a ranking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingOutput {
    /// Query the run was evaluated against
    pub query: Query,
    /// Top-K results in rank order
    pub results: Vec<RankedResult>,
    /// One outcome per input document, in input order
    pub documents: Vec<DocumentOutcome>,
    /// Non-fatal warnings (e.g., tokenizer fallback)
    pub warnings: Vec<String>,
    /// Run counters
    pub stats: RunStats,
}

impl RankingOutput {
    /// Documents excluded from ranking, with reasons.
    pub fn excluded(&self) -> Vec<ExcludedDocument> {
        self.documents
            .iter()
            .filter_map(|d| {
                d.exclusion_reason().map(|reason| ExcludedDocument {
                    document_id: d.document_id.clone(),
                    reason: reason.to_string(),
                })
            })
            .collect()
    }

    /// Documents that were segmented but yielded no sections.
    pub fn empty_documents(&self) -> Vec<&str> {
        self.documents
            .iter()
            .filter(|d| d.status == DocumentStatus::Empty)
            .map(|d| d.document_id.as_str())
            .collect()
    }

    /// Flat output records in rank order.
    pub fn records(&self) -> Vec<OutputRecord> {
        self.results
            .iter()
            .map(|r| {
                let c = &r.candidate;
                OutputRecord {
                    document_id: c.section.document_id.clone(),
                    section_heading: c.section.heading().to_string(),
                    page_range: c.section.page_range,
                    rank: c.rank,
                    combined_score: c.score_breakdown.combined_score,
                    score_breakdown: c.score_breakdown,
                    extracted_passage_text: r
                        .passage
                        .as_ref()
                        .map(|p| p.sentence_text.clone())
                        .unwrap_or_default(),
                    has_numbers: c.section.has_numbers(),
                }
            })
            .collect()
    }

    /// Check if no candidate was ranked.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
