//! JSON rendering for ranking output.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{ExcludedDocument, OutputRecord, Query, RankingOutput, RunStats};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

#[derive(Serialize)]
struct RecordsDocument<'a> {
    query: &'a Query,
    results: Vec<OutputRecord>,
    excluded_documents: Vec<ExcludedDocument>,
    empty_documents: Vec<&'a str>,
    warnings: &'a [String],
    stats: &'a RunStats,
}

/// Convert ranking output to flat JSON records.
pub fn to_json(output: &RankingOutput, format: JsonFormat) -> Result<String> {
    let document = RecordsDocument {
        query: &output.query,
        results: output.records(),
        excluded_documents: output.excluded(),
        empty_documents: output.empty_documents(),
        warnings: &output.warnings,
        stats: &output.stats,
    };
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&document),
        JsonFormat::Compact => serde_json::to_string(&document),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
