//! Ensemble relevance scoring.
//!
//! Every section of a run is one document of a run-scoped corpus. Two
//! lexical signals (TF-IDF cosine and normalized BM25) are computed against
//! that corpus and blended with a rule-based contextual signal.

mod bm25;
mod contextual;
mod corpus;
mod ensemble;
mod tfidf;

pub use bm25::{bm25_raw_scores, bm25_scores, min_max_normalize, Bm25Params};
pub use contextual::{heading_overlap, length_bump, ContextualWeights, WEIGHT_TOLERANCE};
pub use corpus::{term_counts, CorpusStatistics};
pub use ensemble::{compare_candidates, rank_candidates, EnsembleScorer, EnsembleWeights};
pub use tfidf::tfidf_scores;
