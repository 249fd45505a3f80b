//! Output documents for ranking runs.

mod challenge;
mod json;

pub use challenge::{
    ChallengeInfo, ChallengeInput, ChallengeReport, ExcludedEntry, ExtractedSection,
    InputDocument, JobToBeDone, Persona, ReportMetadata, SubsectionAnalysis,
};
pub use json::{to_json, JsonFormat};
