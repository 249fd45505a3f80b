//! Section-level types.

use serde::{Deserialize, Serialize};

/// A contiguous, non-overlapping run of blocks bounded by a detected heading
/// or by the document boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Document the section belongs to
    pub document_id: String,

    /// Pages spanned by the section
    pub page_range: PageRange,

    /// Heading text (None for a preamble or heading-less document)
    pub heading_text: Option<String>,

    /// Normalized body text, one line per body block
    pub body_text: String,

    /// Positions of the blocks forming the section, in order
    pub constituent_block_ids: Vec<usize>,

    /// Fraction of heading cues matched by the heading block
    pub structural_confidence: f64,

    /// Coarse classification of the section
    pub kind: SectionKind,
}

impl Section {
    /// Heading followed by body, the text used for scoring.
    pub fn scoring_text(&self) -> String {
        match &self.heading_text {
            Some(heading) if !self.body_text.is_empty() => {
                format!("{}\n{}", heading, self.body_text)
            }
            Some(heading) => heading.clone(),
            None => self.body_text.clone(),
        }
    }

    /// Heading text, or an empty string.
    pub fn heading(&self) -> &str {
        self.heading_text.as_deref().unwrap_or("")
    }

    /// Check if the section has a detected heading.
    pub fn has_heading(&self) -> bool {
        self.heading_text.is_some()
    }

    /// Position of the first block, used as a final ordering key.
    pub fn first_block(&self) -> usize {
        self.constituent_block_ids.first().copied().unwrap_or(0)
    }

    /// Number of blocks in the section.
    pub fn block_count(&self) -> usize {
        self.constituent_block_ids.len()
    }

    /// Whitespace-separated word count of heading and body.
    pub fn word_count(&self) -> usize {
        self.heading().split_whitespace().count() + self.body_text.split_whitespace().count()
    }

    /// Whether the body contains any digit.
    pub fn has_numbers(&self) -> bool {
        self.body_text.chars().any(|c| c.is_ascii_digit())
    }
}

/// Inclusive range of 1-indexed page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageRange {
    /// First page
    pub start: u32,
    /// Last page
    pub end: u32,
}

impl PageRange {
    /// Range covering a single page.
    pub fn single(page: u32) -> Self {
        Self {
            start: page,
            end: page,
        }
    }

    /// Widen the range to include a page.
    pub fn include(&mut self, page: u32) {
        self.start = self.start.min(page);
        self.end = self.end.max(page);
    }

    /// Number of pages spanned.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start) + 1
    }

    /// Always false; a range spans at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Coarse, domain-agnostic section type derived from the heading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Introductions, overviews, background
    Introduction,
    /// Conclusions and summaries
    Conclusion,
    /// Methods, approaches, processes
    Methodology,
    /// Results, findings, data
    Results,
    /// Discussion and analysis
    Discussion,
    /// References and bibliographies
    References,
    /// Anything else
    #[default]
    Content,
}

impl SectionKind {
    /// Classify a heading.
    pub fn classify(heading: Option<&str>) -> Self {
        let Some(heading) = heading else {
            return SectionKind::Content;
        };
        let lower = heading.to_lowercase();
        let has_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if has_any(&["introduction", "intro", "overview", "background"]) {
            SectionKind::Introduction
        } else if has_any(&["conclusion", "summary", "final", "closing"]) {
            SectionKind::Conclusion
        } else if has_any(&["method", "approach", "technique", "process"]) {
            SectionKind::Methodology
        } else if has_any(&["result", "finding", "outcome", "data"]) {
            SectionKind::Results
        } else if has_any(&["discussion", "analysis", "interpretation"]) {
            SectionKind::Discussion
        } else if has_any(&["reference", "bibliograph"]) {
            SectionKind::References
        } else {
            SectionKind::Content
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(heading: Option<&str>, body: &str) -> Section {
        Section {
            document_id: "doc".to_string(),
            page_range: PageRange::single(1),
            heading_text: heading.map(str::to_string),
            body_text: body.to_string(),
            constituent_block_ids: vec![3, 4],
            structural_confidence: 0.0,
            kind: SectionKind::classify(heading),
        }
    }

    #[test]
    fn test_scoring_text() {
        assert_eq!(section(Some("Results"), "Body").scoring_text(), "Results\nBody");
        assert_eq!(section(Some("Results"), "").scoring_text(), "Results");
        assert_eq!(section(None, "Body").scoring_text(), "Body");
    }

    #[test]
    fn test_page_range() {
        let mut range = PageRange::single(3);
        range.include(5);
        range.include(2);
        assert_eq!(range, PageRange { start: 2, end: 5 });
        assert_eq!(range.len(), 4);
        assert_eq!(range.to_string(), "2-5");
        assert_eq!(PageRange::single(7).to_string(), "7");
    }

    #[test]
    fn test_section_kind_classify() {
        assert_eq!(
            SectionKind::classify(Some("1. Introduction")),
            SectionKind::Introduction
        );
        assert_eq!(
            SectionKind::classify(Some("Executive Summary")),
            SectionKind::Conclusion
        );
        assert_eq!(
            SectionKind::classify(Some("Methodology")),
            SectionKind::Methodology
        );
        assert_eq!(
            SectionKind::classify(Some("Market Analysis")),
            SectionKind::Discussion
        );
        assert_eq!(SectionKind::classify(None), SectionKind::Content);
    }

    #[test]
    fn test_section_helpers() {
        let s = section(Some("Results"), "Revenue grew 12% in 2023.");
        assert_eq!(s.first_block(), 3);
        assert_eq!(s.block_count(), 2);
        assert_eq!(s.word_count(), 6);
        assert!(s.has_numbers());
    }
}
