//! BM25 Okapi scoring, min-max normalized across the batch.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::corpus::CorpusStatistics;
use crate::error::{Error, Result};

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term frequency saturation
    pub k1: f64,
    /// Length normalization strength, in `[0, 1]`
    pub b: f64,
}

impl Bm25Params {
    /// Create parameters.
    pub fn new(k1: f64, b: f64) -> Self {
        Self { k1, b }
    }

    /// Check `k1 > 0` and `0 <= b <= 1`.
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 <= 0.0 {
            return Err(Error::config(format!(
                "bm25.k1 must be positive, got {}",
                self.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::config(format!(
                "bm25.b must be within [0, 1], got {}",
                self.b
            )));
        }
        Ok(())
    }
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// Raw BM25 score of every corpus document, using each query term once.
pub fn bm25_raw_scores(
    corpus: &CorpusStatistics,
    query_tokens: &[String],
    params: &Bm25Params,
) -> Vec<f64> {
    let terms: BTreeSet<&str> = query_tokens.iter().map(String::as_str).collect();
    let avgdl = corpus.average_length();
    let Bm25Params { k1, b } = *params;

    (0..corpus.document_count())
        .map(|doc| {
            let tf_map = corpus.term_frequencies(doc);
            let dl = corpus.document_length(doc) as f64;
            let length_norm = if avgdl > 0.0 {
                1.0 - b + b * dl / avgdl
            } else {
                1.0
            };

            let mut score = 0.0;
            for term in &terms {
                let Some(&tf) = tf_map.get(*term) else {
                    continue;
                };
                let tf = tf as f64;
                let tf_norm = (tf * (k1 + 1.0)) / (tf + k1 * length_norm);
                score += corpus.bm25_idf(term) * tf_norm;
            }
            score
        })
        .collect()
}

/// Min-max scale to `[0, 1]`. An all-equal batch maps to 0.5 everywhere.
pub fn min_max_normalize(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range.is_nan() || range <= 0.0 {
        return vec![0.5; raw.len()];
    }
    raw.iter()
        .map(|s| ((s - min) / range).clamp(0.0, 1.0))
        .collect()
}

/// Normalized BM25 score of every corpus document.
pub fn bm25_scores(
    corpus: &CorpusStatistics,
    query_tokens: &[String],
    params: &Bm25Params,
) -> Vec<f64> {
    min_max_normalize(&bm25_raw_scores(corpus, query_tokens, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    fn corpus() -> CorpusStatistics {
        CorpusStatistics::build(&[
            tokens("rust programming systems language fast"),
            tokens("python programming scripting easy"),
            tokens("java enterprise programming verbose"),
            tokens("rust memory safety zero cost abstractions"),
        ])
    }

    #[test]
    fn test_matching_documents_score_higher() {
        let raw = bm25_raw_scores(&corpus(), &tokens("rust"), &Bm25Params::default());
        assert!(raw[0] > 0.0);
        assert!(raw[3] > 0.0);
        assert_eq!(raw[1], 0.0);
        assert_eq!(raw[2], 0.0);
    }

    #[test]
    fn test_term_frequency_saturates() {
        let corpus = CorpusStatistics::build(&[tokens("rust rust rust"), tokens("rust programming")]);
        let raw = bm25_raw_scores(&corpus, &tokens("rust"), &Bm25Params::default());
        assert!(raw[0] > raw[1]);
    }

    #[test]
    fn test_repeated_query_terms_count_once() {
        let corpus = corpus();
        let params = Bm25Params::default();
        let once = bm25_raw_scores(&corpus, &tokens("rust"), &params);
        let twice = bm25_raw_scores(&corpus, &tokens("rust rust"), &params);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalized_range() {
        let scores = bm25_scores(&corpus(), &tokens("rust programming"), &Bm25Params::default());
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
        assert!(scores.iter().any(|s| *s == 1.0));
        assert!(scores.iter().any(|s| *s == 0.0));
    }

    #[test]
    fn test_all_equal_maps_to_half() {
        assert_eq!(min_max_normalize(&[0.0, 0.0, 0.0]), vec![0.5, 0.5, 0.5]);
        assert_eq!(min_max_normalize(&[2.0]), vec![0.5]);
        assert!(min_max_normalize(&[]).is_empty());
        assert_eq!(min_max_normalize(&[1.0, 3.0, 2.0]), vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_params_validation() {
        assert!(Bm25Params::default().validate().is_ok());
        assert!(Bm25Params::new(0.0, 0.75).validate().is_err());
        assert!(Bm25Params::new(1.2, 1.5).validate().is_err());
        assert!(Bm25Params::new(1.2, f64::NAN).validate().is_err());
    }
}
