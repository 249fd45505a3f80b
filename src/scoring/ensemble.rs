//! Ensemble scoring and deterministic ranking.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::bm25::{bm25_scores, Bm25Params};
use super::contextual::{heading_overlap, length_bump, ContextualWeights, WEIGHT_TOLERANCE};
use super::corpus::CorpusStatistics;
use super::tfidf::tfidf_scores;
use crate::error::{Error, Result};
use crate::model::{Query, RankedCandidate, ScoreBreakdown, Section};
use crate::text::Tokenizer;

/// Weights of the three sub-scores in the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleWeights {
    /// TF-IDF cosine weight
    pub tfidf: f64,
    /// Normalized BM25 weight
    pub bm25: f64,
    /// Contextual heuristic weight
    pub contextual: f64,
}

impl EnsembleWeights {
    /// Create weights. Call [`EnsembleWeights::validate`] before use.
    pub fn new(tfidf: f64, bm25: f64, contextual: f64) -> Self {
        Self {
            tfidf,
            bm25,
            contextual,
        }
    }

    /// Check that the weights are non-negative and sum to 1.
    ///
    /// A mismatch is an error; weights are never silently renormalized.
    pub fn validate(&self) -> Result<()> {
        let parts = [self.tfidf, self.bm25, self.contextual];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::config(format!(
                "ensemble weights must be non-negative, got {:?}",
                parts
            )));
        }
        let sum: f64 = parts.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::config(format!(
                "ensemble weights must sum to 1.0, got {} (tfidf {}, bm25 {}, contextual {})",
                sum, self.tfidf, self.bm25, self.contextual
            )));
        }
        Ok(())
    }

    /// Weighted combination, clamped to `[0, 1]`.
    pub fn combine(&self, tfidf: f64, bm25: f64, contextual: f64) -> f64 {
        (self.tfidf * tfidf + self.bm25 * bm25 + self.contextual * contextual).clamp(0.0, 1.0)
    }

    /// The TF-IDF and BM25 weights rescaled to sum to 1.
    ///
    /// Used where only lexical signals apply. Equal shares when both are 0.
    pub fn lexical(&self) -> (f64, f64) {
        let sum = self.tfidf + self.bm25;
        if sum <= 0.0 {
            (0.5, 0.5)
        } else {
            (self.tfidf / sum, self.bm25 / sum)
        }
    }
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            tfidf: 0.35,
            bm25: 0.35,
            contextual: 0.30,
        }
    }
}

/// Scores sections against a query.
#[derive(Clone)]
pub struct EnsembleScorer {
    tokenizer: Arc<dyn Tokenizer>,
    weights: EnsembleWeights,
    bm25: Bm25Params,
    contextual: ContextualWeights,
}

impl std::fmt::Debug for EnsembleScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnsembleScorer")
            .field("tokenizer", &self.tokenizer.backend())
            .field("weights", &self.weights)
            .field("bm25", &self.bm25)
            .field("contextual", &self.contextual)
            .finish()
    }
}

impl EnsembleScorer {
    /// Create a scorer. Parameters are validated here.
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        weights: EnsembleWeights,
        bm25: Bm25Params,
        contextual: ContextualWeights,
    ) -> Result<Self> {
        weights.validate()?;
        bm25.validate()?;
        contextual.validate()?;
        Ok(Self {
            tokenizer,
            weights,
            bm25,
            contextual,
        })
    }

    /// Get the tokenizer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Get the ensemble weights.
    pub fn weights(&self) -> &EnsembleWeights {
        &self.weights
    }

    /// Get the BM25 parameters.
    pub fn bm25_params(&self) -> &Bm25Params {
        &self.bm25
    }

    /// Tokenize every section's heading and body, in input order.
    pub fn tokenize_sections(&self, sections: &[Section]) -> Vec<Vec<String>> {
        sections
            .iter()
            .map(|s| self.tokenizer.tokenize(&s.scoring_text()))
            .collect()
    }

    /// Score every section, index aligned with the input.
    pub fn score(&self, query: &Query, sections: &[Section]) -> Vec<ScoreBreakdown> {
        let documents = self.tokenize_sections(sections);
        let corpus = CorpusStatistics::build(&documents);
        self.score_with_corpus(query, sections, &corpus)
    }

    /// Score sections against a corpus built from the same sections.
    pub fn score_with_corpus(
        &self,
        query: &Query,
        sections: &[Section],
        corpus: &CorpusStatistics,
    ) -> Vec<ScoreBreakdown> {
        debug_assert_eq!(sections.len(), corpus.document_count());

        let query_tokens = self.tokenizer.tokenize(&query.text());
        let query_terms: BTreeSet<&str> = query_tokens.iter().map(String::as_str).collect();

        let tfidf = tfidf_scores(corpus, &query_tokens);
        let bm25 = bm25_scores(corpus, &query_tokens, &self.bm25);
        let median = corpus.median_length();

        let breakdowns: Vec<ScoreBreakdown> = sections
            .iter()
            .enumerate()
            .map(|(i, section)| {
                let heading_tokens = match &section.heading_text {
                    Some(heading) => self.tokenizer.tokenize(heading),
                    None => Vec::new(),
                };
                let contextual = self.contextual.combine(
                    section.structural_confidence,
                    length_bump(corpus.document_length(i), median, self.contextual.length_spread),
                    heading_overlap(&heading_tokens, &query_terms),
                );
                ScoreBreakdown {
                    tfidf_score: tfidf[i],
                    bm25_score: bm25[i],
                    contextual_score: contextual,
                    combined_score: self.weights.combine(tfidf[i], bm25[i], contextual),
                }
            })
            .collect();

        log::debug!(
            "EnsembleScorer: {} sections, {} query terms, vocabulary {}",
            sections.len(),
            query_terms.len(),
            corpus.vocabulary_size()
        );

        breakdowns
    }
}

/// Total order used for ranking: combined score descending, then structural
/// confidence descending, then `(document_id, first page)` ascending, then
/// first block ascending.
pub fn compare_candidates(
    a: (&Section, &ScoreBreakdown),
    b: (&Section, &ScoreBreakdown),
) -> Ordering {
    b.1.combined_score
        .total_cmp(&a.1.combined_score)
        .then_with(|| b.0.structural_confidence.total_cmp(&a.0.structural_confidence))
        .then_with(|| a.0.document_id.cmp(&b.0.document_id))
        .then_with(|| a.0.page_range.start.cmp(&b.0.page_range.start))
        .then_with(|| a.0.first_block().cmp(&b.0.first_block()))
}

/// Sort sections by [`compare_candidates`] and assign 1-based ranks.
///
/// `breakdowns` must be index aligned with `sections`.
pub fn rank_candidates(
    sections: Vec<Section>,
    breakdowns: Vec<ScoreBreakdown>,
) -> Vec<RankedCandidate> {
    let mut paired: Vec<(Section, ScoreBreakdown)> = sections.into_iter().zip(breakdowns).collect();
    paired.sort_by(|a, b| compare_candidates((&a.0, &a.1), (&b.0, &b.1)));

    paired
        .into_iter()
        .enumerate()
        .map(|(i, (section, score_breakdown))| RankedCandidate {
            section,
            score_breakdown,
            rank: i + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PageRange, SectionKind};
    use crate::text::RuleTokenizer;

    fn section(doc: &str, page: u32, heading: Option<&str>, body: &str, confidence: f64) -> Section {
        Section {
            document_id: doc.to_string(),
            page_range: PageRange::single(page),
            heading_text: heading.map(String::from),
            body_text: body.to_string(),
            constituent_block_ids: vec![page as usize],
            structural_confidence: confidence,
            kind: SectionKind::classify(heading),
        }
    }

    fn scorer() -> EnsembleScorer {
        EnsembleScorer::new(
            Arc::new(RuleTokenizer::new()),
            EnsembleWeights::default(),
            Bm25Params::default(),
            ContextualWeights::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_weights_validation() {
        assert!(EnsembleWeights::default().validate().is_ok());
        assert!(EnsembleWeights::new(0.4, 0.4, 0.4).validate().is_err());
        assert!(EnsembleWeights::new(1.2, -0.2, 0.0).validate().is_err());
        assert!(EnsembleWeights::new(0.5, 0.5, 0.0).validate().is_ok());
    }

    #[test]
    fn test_lexical_weights() {
        assert_eq!(EnsembleWeights::default().lexical(), (0.5, 0.5));
        assert_eq!(EnsembleWeights::new(0.0, 0.0, 1.0).lexical(), (0.5, 0.5));
        let (t, b) = EnsembleWeights::new(0.6, 0.2, 0.2).lexical();
        assert!((t - 0.75).abs() < 1e-12);
        assert!((b - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_scorer_configuration() {
        let result = EnsembleScorer::new(
            Arc::new(RuleTokenizer::new()),
            EnsembleWeights::new(0.4, 0.4, 0.4),
            Bm25Params::default(),
            ContextualWeights::default(),
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_scores_are_bounded_and_aligned() {
        let sections = vec![
            section("a", 1, Some("Market Analysis"), "market risk rose sharply", 1.0),
            section("a", 2, Some("Methodology"), "we sampled cells under a microscope", 0.67),
            section("b", 1, None, "", 0.0),
        ];
        let query = Query::new("Investment Analyst", "assess market risk");
        let scores = scorer().score(&query, &sections);

        assert_eq!(scores.len(), 3);
        for s in &scores {
            for v in [s.tfidf_score, s.bm25_score, s.contextual_score, s.combined_score] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
        assert!(scores[0].combined_score > scores[1].combined_score);
        assert_eq!(scores[2].tfidf_score, 0.0);
    }

    #[test]
    fn test_rank_tie_break_chain() {
        let tie = ScoreBreakdown {
            combined_score: 0.5,
            ..ScoreBreakdown::default()
        };
        let sections = vec![
            section("b", 1, Some("Overview"), "x", 0.5),
            section("a", 3, Some("Overview"), "x", 0.5),
            section("a", 1, Some("Overview"), "x", 0.5),
            section("c", 1, Some("Overview"), "x", 1.0),
        ];
        let ranked = rank_candidates(sections, vec![tie; 4]);

        let order: Vec<(&str, u32)> = ranked
            .iter()
            .map(|c| (c.section.document_id.as_str(), c.section.page_range.start))
            .collect();
        assert_eq!(order, vec![("c", 1), ("a", 1), ("a", 3), ("b", 1)]);
        assert_eq!(
            ranked.iter().map(|c| c.rank).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_rank_by_combined_score() {
        let sections = vec![
            section("a", 1, None, "x", 0.0),
            section("a", 2, None, "y", 0.0),
        ];
        let scores = vec![
            ScoreBreakdown {
                combined_score: 0.2,
                ..ScoreBreakdown::default()
            },
            ScoreBreakdown {
                combined_score: 0.9,
                ..ScoreBreakdown::default()
            },
        ];
        let ranked = rank_candidates(sections, scores);
        assert_eq!(ranked[0].section.page_range.start, 2);
        assert_eq!(ranked[0].rank, 1);
    }
}
