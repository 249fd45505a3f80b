//! Structural heading cues.
//!
//! The pattern cue combines a fixed set of layout-independent heading
//! patterns with a dictionary of section markers that recur across research
//! papers, business reports, technical specifications and course material.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::options::SegmentOptions;
use crate::error::{Error, Result};

/// Built-in section markers, lowercase.
pub const DEFAULT_MARKERS: &[&str] = &[
    // research
    "abstract",
    "introduction",
    "background",
    "related work",
    "literature review",
    "methodology",
    "methods",
    "method",
    "materials and methods",
    "experimental setup",
    "experiments",
    "evaluation",
    "results",
    "findings",
    "discussion",
    "analysis",
    "limitations",
    "future work",
    "conclusion",
    "conclusions",
    "references",
    "bibliography",
    "acknowledgements",
    "acknowledgments",
    "appendix",
    // business
    "executive summary",
    "summary",
    "overview",
    "market analysis",
    "market overview",
    "financial highlights",
    "financial statements",
    "risk factors",
    "outlook",
    "strategy",
    "recommendations",
    "key takeaways",
    // technical and learning material
    "objectives",
    "scope",
    "requirements",
    "specification",
    "architecture",
    "implementation",
    "installation",
    "usage",
    "chapter",
    "section",
    "part",
    "lesson",
    "exercises",
    "glossary",
    "table of contents",
];

/// Structural patterns, applied to trimmed text.
const DEFAULT_PATTERNS: &[&str] = &[
    // 1. Introduction / 2.3 Results
    r"^\d+(\.\d+)*\.?\s+\S",
    // IV. Discussion
    r"^[IVXLC]+\.\s+\S",
    // B. Appendix
    r"^[A-Z]\.\s+\S",
    // ALL CAPS
    r"^[^a-z]*[A-Z]{2,}[^a-z]*$",
    // Label ending in a colon
    r"^[A-Za-z][A-Za-z\s&/\-]{2,60}:$",
];

/// Leading numbering stripped before marker lookup.
const NUMBERING_PATTERN: &str = r"^(\d+(\.\d+)*\.?|[IVXLC]+\.|[A-Z]\.)\s+";

/// Short connector words allowed in lowercase inside Title Case.
const TITLE_CONNECTORS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "vs", "with",
];

/// Which cues a block matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueMatch {
    /// Numbered / marker / structural pattern
    pub pattern: bool,
    /// Font size above the running median by the configured ratio
    pub font: bool,
    /// Bold or italic, short, followed by body text
    pub style: bool,
}

impl CueMatch {
    /// Number of matched cues (0..=3).
    pub fn count(&self) -> u8 {
        self.pattern as u8 + self.font as u8 + self.style as u8
    }

    /// Whether the block starts a new section.
    pub fn is_heading(&self) -> bool {
        self.count() > 0
    }

    /// Fraction of matched cues: 0, 1/3, 2/3 or 1.
    pub fn confidence(&self) -> f64 {
        f64::from(self.count()) / 3.0
    }
}

/// Compiled pattern cue.
#[derive(Debug, Clone)]
pub struct HeadingCues {
    patterns: Vec<Regex>,
    numbering: Regex,
    markers: Vec<String>,
    max_tokens: usize,
    detect_title_case: bool,
}

impl HeadingCues {
    /// Compile the built-in and configured patterns.
    pub fn new(options: &SegmentOptions) -> Result<Self> {
        let mut patterns = Vec::with_capacity(DEFAULT_PATTERNS.len() + options.extra_patterns.len());
        for pattern in DEFAULT_PATTERNS
            .iter()
            .copied()
            .chain(options.extra_patterns.iter().map(String::as_str))
        {
            let regex = Regex::new(pattern).map_err(|e| {
                Error::config(format!("invalid heading pattern '{}': {}", pattern, e))
            })?;
            patterns.push(regex);
        }

        let numbering = Regex::new(NUMBERING_PATTERN)
            .map_err(|e| Error::config(format!("invalid numbering pattern: {}", e)))?;

        let mut markers: Vec<String> = DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect();
        markers.extend(options.extra_markers.iter().map(|m| m.trim().to_lowercase()));

        Ok(Self {
            patterns,
            numbering,
            markers,
            max_tokens: options.heading_max_tokens,
            detect_title_case: options.detect_title_case,
        })
    }

    /// Whether the text looks like a heading by its wording alone.
    pub fn matches_pattern(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || text.split_whitespace().count() > self.max_tokens {
            return false;
        }
        if text.ends_with(['.', ',', ';', '!', '?']) && !self.numbering.is_match(text) {
            return false;
        }

        self.patterns.iter().any(|p| p.is_match(text))
            || self.matches_marker(text)
            || (self.detect_title_case && is_title_case(text))
    }

    /// Whether the text, stripped of numbering and a trailing colon, starts
    /// with a known section marker.
    pub fn matches_marker(&self, text: &str) -> bool {
        let stripped = self.numbering.replace(text.trim(), "");
        let label = stripped
            .trim()
            .trim_end_matches(':')
            .trim()
            .to_lowercase();
        if label.is_empty() {
            return false;
        }
        self.markers.iter().any(|marker| {
            label == *marker
                || label
                    .strip_prefix(marker.as_str())
                    .is_some_and(|rest| rest.starts_with(|c: char| !c.is_alphanumeric()))
        })
    }
}

/// Every word starts uppercase, except short connectors after the first word.
fn is_title_case(text: &str) -> bool {
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphabetic))
        .collect();
    if words.is_empty() {
        return false;
    }
    words.iter().enumerate().all(|(i, word)| {
        let first = word.chars().find(|c| c.is_alphabetic());
        match first {
            Some(c) if c.is_uppercase() => true,
            Some(_) => i > 0 && TITLE_CONNECTORS.contains(&word.to_lowercase().as_str()),
            None => true,
        }
    })
}
