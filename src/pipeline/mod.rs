//! Run orchestration.
//!
//! Documents are segmented in parallel, one task per document. Scoring
//! starts only after every task has reported or the batch timeout has
//! elapsed, because corpus statistics need the complete set of sections.
//!
//! # Example
//!
//! ```no_run
//! use sectionrank::pipeline::{BlockSource, JsonFileSource, Pipeline, RankOptions};
//! use sectionrank::Query;
//! use std::sync::Arc;
//!
//! fn main() -> sectionrank::Result<()> {
//!     let pipeline = Pipeline::new(RankOptions::new().with_top_k(3))?;
//!     let sources: Vec<Arc<dyn BlockSource>> =
//!         vec![Arc::new(JsonFileSource::from_path("report.json"))];
//!
//!     let output = pipeline.run(&sources, &Query::new("Investment Analyst", "assess market risk"));
//!     for record in output.records() {
//!         println!("{} {} {}", record.rank, record.document_id, record.section_heading);
//!     }
//!     Ok(())
//! }
//! ```

mod options;
mod runner;
mod source;

pub use options::RankOptions;
pub use runner::{segment_document, Pipeline};
pub use source::{BlockSource, JsonFileSource, MemorySource};
