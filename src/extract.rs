//! Sentence-level passage extraction from ranked sections.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{ExtractedPassage, Query, RankedCandidate, SentenceSpan};
use crate::scoring::{bm25_scores, tfidf_scores, Bm25Params, CorpusStatistics, EnsembleWeights};
use crate::text::{split_sentences, Tokenizer};

/// Passage length limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassageOptions {
    /// Sentences shorter than this (in characters) are not picked as the
    /// best sentence, unless the section has nothing longer
    pub min_sentence_chars: usize,
    /// Maximum sentences per passage
    pub max_passage_sentences: usize,
    /// Maximum passage length in characters
    pub max_passage_chars: usize,
}

impl PassageOptions {
    /// Create passage options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sentence cap.
    pub fn with_max_sentences(mut self, sentences: usize) -> Self {
        self.max_passage_sentences = sentences;
        self
    }

    /// Set the character cap.
    pub fn with_max_chars(mut self, chars: usize) -> Self {
        self.max_passage_chars = chars;
        self
    }

    /// Set the minimum sentence length.
    pub fn with_min_sentence_chars(mut self, chars: usize) -> Self {
        self.min_sentence_chars = chars;
        self
    }

    /// Check the caps.
    pub fn validate(&self) -> Result<()> {
        if self.max_passage_sentences == 0 {
            return Err(Error::config("passage.max_passage_sentences must be positive"));
        }
        if self.max_passage_chars == 0 {
            return Err(Error::config("passage.max_passage_chars must be positive"));
        }
        Ok(())
    }
}

impl Default for PassageOptions {
    fn default() -> Self {
        Self {
            min_sentence_chars: 20,
            max_passage_sentences: 3,
            max_passage_chars: 500,
        }
    }
}

/// Picks the most query-relevant run of sentences from each ranked section.
///
/// Sentences are scored with the lexical half of the ensemble (TF-IDF and
/// BM25, weights rescaled to sum to 1) against a corpus made of the
/// section's own sentences. The best sentence wins, earliest on ties, and
/// the passage grows forward over following sentences that share a query
/// term, within the configured caps.
#[derive(Clone)]
pub struct PassageExtractor {
    tokenizer: Arc<dyn Tokenizer>,
    weights: EnsembleWeights,
    bm25: Bm25Params,
    options: PassageOptions,
}

impl std::fmt::Debug for PassageExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassageExtractor")
            .field("tokenizer", &self.tokenizer.backend())
            .field("weights", &self.weights)
            .field("bm25", &self.bm25)
            .field("options", &self.options)
            .finish()
    }
}

impl PassageExtractor {
    /// Create an extractor.
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        weights: EnsembleWeights,
        bm25: Bm25Params,
        options: PassageOptions,
    ) -> Result<Self> {
        options.validate()?;
        bm25.validate()?;
        Ok(Self {
            tokenizer,
            weights,
            bm25,
            options,
        })
    }

    /// Get the passage options.
    pub fn options(&self) -> &PassageOptions {
        &self.options
    }

    /// Extract one passage per candidate that has body sentences.
    pub fn extract(&self, candidates: &[RankedCandidate], query: &Query) -> Vec<ExtractedPassage> {
        let query_tokens = self.tokenizer.tokenize(&query.text());
        candidates
            .iter()
            .filter_map(|c| self.extract_one(c, &query_tokens))
            .collect()
    }

    /// Extract the passage of a single candidate.
    pub fn extract_one(
        &self,
        candidate: &RankedCandidate,
        query_tokens: &[String],
    ) -> Option<ExtractedPassage> {
        let body = candidate.section.body_text.as_str();
        let bounds = split_sentences(body);
        if bounds.is_empty() {
            return None;
        }

        let sentences: Vec<Vec<String>> = bounds
            .iter()
            .map(|b| self.tokenizer.tokenize(b.slice(body)))
            .collect();
        let corpus = CorpusStatistics::build(&sentences);
        let tfidf = tfidf_scores(&corpus, query_tokens);
        let bm25 = bm25_scores(&corpus, query_tokens, &self.bm25);
        let (wt, wb) = self.weights.lexical();
        let scores: Vec<f64> = tfidf
            .iter()
            .zip(&bm25)
            .map(|(t, b)| (wt * t + wb * b).clamp(0.0, 1.0))
            .collect();

        let long_enough: Vec<usize> = (0..bounds.len())
            .filter(|&i| bounds[i].slice(body).chars().count() >= self.options.min_sentence_chars)
            .collect();
        let eligible = if long_enough.is_empty() {
            (0..bounds.len()).collect()
        } else {
            long_enough
        };

        let mut best = eligible[0];
        for &i in &eligible[1..] {
            if scores[i] > scores[best] {
                best = i;
            }
        }

        let mut last = best;
        while last + 1 < bounds.len()
            && last + 1 - best < self.options.max_passage_sentences
            && tfidf[last + 1] > 0.0
        {
            let grown = &body[bounds[best].start..bounds[last + 1].end];
            if grown.chars().count() > self.options.max_passage_chars {
                break;
            }
            last += 1;
        }

        let text = &body[bounds[best].start..bounds[last].end];
        Some(ExtractedPassage {
            candidate_rank: candidate.rank,
            sentence_span: SentenceSpan { first: best, last },
            sentence_text: truncate_at_word(text, self.options.max_passage_chars).to_string(),
            local_relevance_score: scores[best],
        })
    }
}

/// Cut text to at most `max_chars` characters, at a word boundary when one
/// exists.
fn truncate_at_word(text: &str, max_chars: usize) -> &str {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text;
    };
    let head = &text[..cut];
    match head.rfind(char::is_whitespace) {
        Some(space) if space > 0 => head[..space].trim_end(),
        _ => head,
    }
}
