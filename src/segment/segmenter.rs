//! Structural segmentation of a document's text blocks into sections.

use super::cues::{CueMatch, HeadingCues};
use super::font_stats::{FontStatistics, RunningMedian};
use super::options::SegmentOptions;
use crate::error::{Error, Result};
use crate::model::{PageRange, Section, SectionKind, TextBlock};
use crate::text::TextNormalizer;

/// Splits an ordered block sequence into sections at detected headings.
///
/// Segmentation is total: every block lands in exactly one section, sections
/// are contiguous and keep the input order. Layout-only input (no heading
/// cues anywhere) yields a single section with confidence 0.
#[derive(Debug, Clone)]
pub struct Segmenter {
    options: SegmentOptions,
    cues: HeadingCues,
    normalizer: TextNormalizer,
}

impl Segmenter {
    /// Create a segmenter, compiling the heading patterns.
    pub fn new(options: &SegmentOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options: options.clone(),
            cues: HeadingCues::new(options)?,
            normalizer: TextNormalizer::default(),
        })
    }

    /// Get the segmentation options.
    pub fn options(&self) -> &SegmentOptions {
        &self.options
    }

    /// Segment one document's blocks, in reading order.
    pub fn segment(&self, blocks: &[TextBlock]) -> Vec<Section> {
        if blocks.is_empty() {
            return Vec::new();
        }

        let matches = self.detect_headings(blocks);
        let document_id = blocks[0].document_id.clone();

        let mut sections = Vec::new();
        let mut current: Option<SectionBuilder> = None;

        for (index, (block, cue)) in blocks.iter().zip(&matches).enumerate() {
            if cue.is_heading() {
                if let Some(done) = current.take() {
                    sections.push(done.finish());
                }
                let heading = self.normalizer.normalize(&block.text);
                let mut builder = SectionBuilder::new(
                    &document_id,
                    block.page_number,
                    Some(heading),
                    cue.confidence(),
                );
                builder.block_ids.push(index);
                current = Some(builder);
                continue;
            }

            let builder = current.get_or_insert_with(|| {
                SectionBuilder::new(&document_id, block.page_number, None, 0.0)
            });
            builder.push_body(index, block.page_number, self.normalizer.normalize(&block.text));
        }

        if let Some(done) = current {
            sections.push(done.finish());
        }

        log::debug!(
            "Segmenter: '{}' {} blocks -> {} sections ({} with headings)",
            document_id,
            blocks.len(),
            sections.len(),
            sections.iter().filter(|s| s.has_heading()).count()
        );

        sections
    }

    /// Evaluate the heading cues for every block, index aligned with the input.
    pub fn detect_headings(&self, blocks: &[TextBlock]) -> Vec<CueMatch> {
        let stats = FontStatistics::from_blocks(blocks);
        let mut body_sizes = RunningMedian::new();
        let mut matches = Vec::with_capacity(blocks.len());

        for (index, block) in blocks.iter().enumerate() {
            if block.is_blank() {
                matches.push(CueMatch::default());
                continue;
            }

            let reference = body_sizes.median().unwrap_or(stats.median_size);
            let cue = CueMatch {
                pattern: self.cues.matches_pattern(&block.text),
                font: block.font_size > reference * self.options.font_size_ratio,
                style: self.style_cue(blocks, index),
            };

            if !cue.is_heading() {
                body_sizes.push(block.font_size);
            }
            matches.push(cue);
        }

        matches
    }

    fn is_short(&self, block: &TextBlock) -> bool {
        block.word_count() <= self.options.heading_max_tokens
    }

    /// Short styled block followed by something that reads like body text.
    fn style_cue(&self, blocks: &[TextBlock], index: usize) -> bool {
        let block = &blocks[index];
        if !block.is_emphasized() || !self.is_short(block) {
            return false;
        }
        match blocks[index + 1..].iter().find(|b| !b.is_blank()) {
            Some(next) => !(next.is_emphasized() && self.is_short(next)),
            None => false,
        }
    }
}

struct SectionBuilder {
    document_id: String,
    page_range: PageRange,
    heading_text: Option<String>,
    body_lines: Vec<String>,
    block_ids: Vec<usize>,
    confidence: f64,
}

impl SectionBuilder {
    fn new(document_id: &str, page: u32, heading_text: Option<String>, confidence: f64) -> Self {
        Self {
            document_id: document_id.to_string(),
            page_range: PageRange::single(page),
            heading_text,
            body_lines: Vec::new(),
            block_ids: Vec::new(),
            confidence,
        }
    }

    fn push_body(&mut self, index: usize, page: u32, text: String) {
        self.block_ids.push(index);
        self.page_range.include(page);
        if !text.is_empty() {
            self.body_lines.push(text);
        }
    }

    fn finish(self) -> Section {
        let kind = SectionKind::classify(self.heading_text.as_deref());
        Section {
            document_id: self.document_id,
            page_range: self.page_range,
            heading_text: self.heading_text,
            body_text: self.body_lines.join("\n"),
            constituent_block_ids: self.block_ids,
            structural_confidence: self.confidence,
            kind,
        }
    }
}

/// Check a document's blocks before segmentation.
///
/// Rejects blocks belonging to another document, unusable font sizes,
/// page 0, and blocks out of reading order.
pub fn validate_blocks(document_id: &str, blocks: &[TextBlock]) -> Result<()> {
    let mut previous: Option<(u32, u32)> = None;

    for (index, block) in blocks.iter().enumerate() {
        if block.document_id != document_id {
            return Err(Error::input(
                document_id,
                format!(
                    "block {} belongs to document '{}'",
                    index, block.document_id
                ),
            ));
        }
        if !block.font_size.is_finite() || block.font_size < 0.0 {
            return Err(Error::input(
                document_id,
                format!("block {} has invalid font size {}", index, block.font_size),
            ));
        }
        if block.page_number == 0 {
            return Err(Error::input(
                document_id,
                format!("block {} has page number 0", index),
            ));
        }

        let position = (block.page_number, block.reading_order_index);
        if let Some(prev) = previous {
            if position <= prev {
                return Err(Error::input(
                    document_id,
                    format!(
                        "block {} (page {}, order {}) is out of reading order",
                        index, block.page_number, block.reading_order_index
                    ),
                ));
            }
        }
        previous = Some(position);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> Segmenter {
        Segmenter::new(&SegmentOptions::default()).unwrap()
    }

    fn body(order: u32, text: &str) -> TextBlock {
        TextBlock::new("doc", 1, order, text, 10.0)
    }

    fn assert_covering(sections: &[Section], block_count: usize) {
        let ids: Vec<usize> = sections
            .iter()
            .flat_map(|s| s.constituent_block_ids.iter().copied())
            .collect();
        assert_eq!(ids, (0..block_count).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_input() {
        assert!(segmenter().segment(&[]).is_empty());
    }

    #[test]
    fn test_no_headings_single_section() {
        let blocks = vec![
            body(0, "the quarterly numbers were reviewed by the board in detail."),
            body(1, "revenue grew faster than operating costs during the period."),
            body(2, "the team expects similar results during the next quarter."),
        ];
        let sections = segmenter().segment(&blocks);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].structural_confidence, 0.0);
        assert!(sections[0].heading_text.is_none());
        assert_covering(&sections, 3);
    }

    #[test]
    fn test_headings_split_sections() {
        let blocks = vec![
            body(0, "prepared for internal review only."),
            TextBlock::new("doc", 1, 1, "1. Market Overview", 16.0).bold(),
            body(2, "demand for storage rose sharply across all regions this year."),
            body(3, "prices remained stable despite the supply constraints."),
            TextBlock::new("doc", 2, 4, "2. Risk Factors", 16.0).bold(),
            TextBlock::new(
                "doc",
                2,
                5,
                "currency exposure remains the largest single risk to margins.",
                10.0,
            ),
        ];
        let sections = segmenter().segment(&blocks);

        assert_eq!(sections.len(), 3);
        assert!(sections[0].heading_text.is_none());
        assert_eq!(sections[0].structural_confidence, 0.0);
        assert_eq!(sections[1].heading(), "1. Market Overview");
        assert_eq!(sections[1].structural_confidence, 1.0);
        assert_eq!(sections[1].constituent_block_ids, vec![1, 2, 3]);
        assert_eq!(
            sections[1].body_text,
            "demand for storage rose sharply across all regions this year.\n\
             prices remained stable despite the supply constraints."
        );
        assert_eq!(sections[2].page_range, PageRange::single(2));
        assert_covering(&sections, 6);
    }

    #[test]
    fn test_font_cue_uses_running_median() {
        let blocks = vec![
            body(0, "the opening paragraph is set in the regular body size."),
            TextBlock::new("doc", 1, 1, "an unusually large line of text", 14.0),
            body(2, "more body text follows the larger line in the document."),
        ];
        let matches = segmenter().detect_headings(&blocks);

        assert!(!matches[0].is_heading());
        assert!(matches[1].font);
        assert!(!matches[1].pattern);
        assert!(!matches[2].is_heading());
    }

    #[test]
    fn test_style_cue_needs_body_after() {
        let blocks = vec![
            TextBlock::new("doc", 1, 0, "note on scope", 10.0).bold(),
            TextBlock::new("doc", 1, 1, "second emphasized label", 10.0).italic(),
            body(2, "the scope covers hardware and software spending only."),
        ];
        let matches = segmenter().detect_headings(&blocks);

        assert!(!matches[0].style);
        assert!(matches[1].style);
    }

    #[test]
    fn test_blank_blocks_join_current_section() {
        let blocks = vec![
            TextBlock::new("doc", 1, 0, "   ", 30.0).bold(),
            TextBlock::new("doc", 1, 1, "INTRODUCTION", 10.0),
            body(2, ""),
            body(3, "the study covers twelve markets."),
        ];
        let sections = segmenter().segment(&blocks);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].constituent_block_ids, vec![0]);
        assert_eq!(sections[0].body_text, "");
        assert_eq!(sections[1].kind, SectionKind::Introduction);
        assert_eq!(sections[1].body_text, "the study covers twelve markets.");
        assert_covering(&sections, 4);
    }

    #[test]
    fn test_validate_blocks() {
        let good = vec![body(0, "a"), body(1, "b"), TextBlock::new("doc", 2, 0, "c", 10.0)];
        assert!(validate_blocks("doc", &good).is_ok());
        assert!(validate_blocks("doc", &[]).is_ok());

        let other = vec![TextBlock::new("other", 1, 0, "a", 10.0)];
        assert!(matches!(
            validate_blocks("doc", &other),
            Err(Error::Input { .. })
        ));

        let backwards = vec![body(3, "a"), body(2, "b")];
        assert!(validate_blocks("doc", &backwards).is_err());

        let bad_size = vec![TextBlock::new("doc", 1, 0, "a", f32::INFINITY)];
        assert!(validate_blocks("doc", &bad_size).is_err());

        let page_zero = vec![TextBlock::new("doc", 0, 0, "a", 10.0)];
        assert!(validate_blocks("doc", &page_zero).is_err());
    }
}
