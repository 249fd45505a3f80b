//! Data model for section ranking.
//!
//! Blocks come in from the structural parser, sections are built by the
//! segmenter, and the remaining types carry scores and results for a single
//! run. Nothing here is cached across runs.

mod block;
mod query;
mod ranking;
mod section;

pub use block::{BoundingBox, TextBlock};
pub use query::Query;
pub use ranking::{
    DocumentOutcome, DocumentStatus, ExcludedDocument, ExtractedPassage, OutputRecord,
    RankedCandidate, RankedResult, RankingOutput, RunStats, ScoreBreakdown, SentenceSpan,
};
pub use section::{PageRange, Section, SectionKind};
