//! Challenge-style input and report documents.
//!
//! The input names a collection of documents, a persona and a job to be
//! done. The report lists the ranked sections, the passage extracted from
//! each, and the documents that had to be left out.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::json::JsonFormat;
use crate::error::{Error, Result};
use crate::model::{Query, RankingOutput};

/// Characters of body text used as a title for heading-less sections.
const UNTITLED_PREVIEW_CHARS: usize = 60;

/// Optional challenge identification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeInfo {
    /// Challenge identifier
    #[serde(default)]
    pub challenge_id: String,
    /// Test case name
    #[serde(default)]
    pub test_case_name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDocument {
    /// File name, also used as the document id
    pub filename: String,
    /// Human-readable title
    #[serde(default)]
    pub title: String,
}

/// Who the ranking is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Role description
    pub role: String,
}

/// What the persona needs to get done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobToBeDone {
    /// Task description
    pub task: String,
}

/// A challenge input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeInput {
    /// Challenge identification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_info: Option<ChallengeInfo>,
    /// Documents to rank
    pub documents: Vec<InputDocument>,
    /// Persona
    pub persona: Persona,
    /// Job to be done
    pub job_to_be_done: JobToBeDone,
}

impl ChallengeInput {
    /// Load an input file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// The query described by the persona and task.
    pub fn query(&self) -> Query {
        Query::new(&self.persona.role, &self.job_to_be_done.task)
    }

    /// Document file names in input order.
    pub fn filenames(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.filename.clone()).collect()
    }
}

/// Report metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Documents submitted
    pub input_documents: Vec<String>,
    /// Persona description
    pub persona: String,
    /// Task description
    pub job_to_be_done: String,
    /// RFC 3339 processing time
    pub processing_timestamp: String,
}

/// A ranked section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSection {
    /// Document the section came from
    pub document: String,
    /// Section heading
    pub section_title: String,
    /// 1-based rank
    pub importance_rank: usize,
    /// First page of the section
    pub page_number: u32,
}

/// The passage extracted from a ranked section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    /// Document the passage came from
    pub document: String,
    /// Passage text
    pub refined_text: String,
    /// First page of the section
    pub page_number: u32,
}

/// A document left out of ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedEntry {
    /// Document id
    pub document: String,
    /// Reason for exclusion
    pub reason: String,
}

/// Challenge output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeReport {
    /// Run metadata
    pub metadata: ReportMetadata,
    /// Ranked sections
    pub extracted_sections: Vec<ExtractedSection>,
    /// Passages of the ranked sections that have one
    pub subsection_analysis: Vec<SubsectionAnalysis>,
    /// Failed or timed-out documents
    pub excluded_documents: Vec<ExcludedEntry>,
}

impl ChallengeReport {
    /// Build a report stamped with the current time.
    pub fn new(output: &RankingOutput, input_documents: Vec<String>) -> Self {
        Self::with_timestamp(output, input_documents, Utc::now())
    }

    /// Build a report with an explicit processing time.
    pub fn with_timestamp(
        output: &RankingOutput,
        input_documents: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let extracted_sections = output
            .results
            .iter()
            .map(|r| {
                let section = &r.candidate.section;
                ExtractedSection {
                    document: section.document_id.clone(),
                    section_title: section
                        .heading_text
                        .clone()
                        .unwrap_or_else(|| untitled(&section.body_text)),
                    importance_rank: r.candidate.rank,
                    page_number: section.page_range.start,
                }
            })
            .collect();

        let subsection_analysis = output
            .results
            .iter()
            .filter_map(|r| {
                r.passage.as_ref().map(|p| SubsectionAnalysis {
                    document: r.candidate.section.document_id.clone(),
                    refined_text: p.sentence_text.clone(),
                    page_number: r.candidate.section.page_range.start,
                })
            })
            .collect();

        let excluded_documents = output
            .excluded()
            .into_iter()
            .map(|e| ExcludedEntry {
                document: e.document_id,
                reason: e.reason,
            })
            .collect();

        Self {
            metadata: ReportMetadata {
                input_documents,
                persona: output.query.persona_description.clone(),
                job_to_be_done: output.query.task_description.clone(),
                processing_timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            },
            extracted_sections,
            subsection_analysis,
            excluded_documents,
        }
    }

    /// Serialize the report.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let result = match format {
            JsonFormat::Pretty => serde_json::to_string_pretty(self),
            JsonFormat::Compact => serde_json::to_string(self),
        };
        result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
    }
}

/// Title for a section without a heading: the start of its first line.
fn untitled(body: &str) -> String {
    let line = body.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return "Untitled section".to_string();
    }
    match line.char_indices().nth(UNTITLED_PREVIEW_CHARS) {
        None => line.to_string(),
        Some((cut, _)) => {
            let head = &line[..cut];
            let head = head.rfind(' ').map_or(head, |space| &head[..space]);
            format!("{}...", head.trim_end())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DocumentOutcome, DocumentStatus, ExtractedPassage, PageRange, RankedCandidate,
        RankedResult, RunStats, ScoreBreakdown, Section, SectionKind, SentenceSpan,
    };
    use chrono::TimeZone;

    fn result(doc: &str, heading: Option<&str>, body: &str, rank: usize) -> RankedResult {
        RankedResult {
            candidate: RankedCandidate {
                section: Section {
                    document_id: doc.to_string(),
                    page_range: PageRange { start: 3, end: 4 },
                    heading_text: heading.map(String::from),
                    body_text: body.to_string(),
                    constituent_block_ids: vec![0],
                    structural_confidence: 0.5,
                    kind: SectionKind::Content,
                },
                score_breakdown: ScoreBreakdown::default(),
                rank,
            },
            passage: (!body.is_empty()).then(|| ExtractedPassage {
                candidate_rank: rank,
                sentence_span: SentenceSpan { first: 0, last: 0 },
                sentence_text: body.to_string(),
                local_relevance_score: 0.4,
            }),
        }
    }

    fn output() -> RankingOutput {
        RankingOutput {
            query: Query::new("Travel Planner", "plan a 4-day trip"),
            results: vec![
                result("guide.pdf", Some("Coastal Adventures"), "Go kayaking at dawn.", 1),
                result("tips.pdf", None, "", 2),
            ],
            documents: vec![DocumentOutcome {
                document_id: "broken.pdf".to_string(),
                status: DocumentStatus::TimedOut {
                    reason: "timed out".to_string(),
                },
            }],
            warnings: Vec::new(),
            stats: RunStats::default(),
        }
    }

    #[test]
    fn test_report_contents() {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let report = ChallengeReport::with_timestamp(
            &output(),
            vec!["guide.pdf".into(), "tips.pdf".into(), "broken.pdf".into()],
            timestamp,
        );

        assert_eq!(report.metadata.persona, "Travel Planner");
        assert_eq!(report.metadata.processing_timestamp, "2024-03-01T12:30:00Z");
        assert_eq!(report.extracted_sections.len(), 2);
        assert_eq!(report.extracted_sections[0].section_title, "Coastal Adventures");
        assert_eq!(report.extracted_sections[0].page_number, 3);
        assert_eq!(report.extracted_sections[1].section_title, "Untitled section");
        assert_eq!(report.subsection_analysis.len(), 1);
        assert_eq!(report.subsection_analysis[0].refined_text, "Go kayaking at dawn.");
        assert_eq!(report.excluded_documents[0].document, "broken.pdf");
    }

    #[test]
    fn test_report_json() {
        let report = ChallengeReport::new(&output(), vec!["guide.pdf".into()]);
        let pretty = report.to_json(JsonFormat::Pretty).unwrap();
        assert!(pretty.contains("\"importance_rank\": 1"));
        assert!(pretty.contains('\n'));

        let compact = report.to_json(JsonFormat::Compact).unwrap();
        assert!(!compact.contains('\n'));
        let parsed: ChallengeReport = serde_json::from_str(&compact).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_untitled_preview() {
        assert_eq!(untitled("Short first line\nsecond"), "Short first line");
        let long = "word ".repeat(30);
        let title = untitled(&long);
        assert!(title.ends_with("..."));
        assert!(title.chars().count() <= UNTITLED_PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_challenge_input() {
        let input: ChallengeInput = serde_json::from_str(
            r#"{
                "challenge_info": {"challenge_id": "round_1b_002", "test_case_name": "travel"},
                "documents": [{"filename": "guide.pdf", "title": "Guide"}],
                "persona": {"role": "Travel Planner"},
                "job_to_be_done": {"task": "Plan a trip of 4 days"}
            }"#,
        )
        .unwrap();

        assert_eq!(input.filenames(), vec!["guide.pdf".to_string()]);
        assert_eq!(input.query().text(), "Travel Planner Plan a trip of 4 days");
    }
}
