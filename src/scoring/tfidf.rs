//! TF-IDF cosine similarity.

use std::collections::BTreeMap;

use super::corpus::{term_counts, CorpusStatistics};

/// Cosine similarity between the query and every corpus document.
///
/// Both sides are weighted as raw term count × smoothed idf over the corpus
/// vocabulary. Query terms missing from the vocabulary are ignored. A zero
/// vector on either side scores 0.
pub fn tfidf_scores(corpus: &CorpusStatistics, query_tokens: &[String]) -> Vec<f64> {
    let query: BTreeMap<&str, f64> = term_counts(query_tokens)
        .into_iter()
        .filter(|(term, _)| corpus.contains(term))
        .map(|(term, count)| (term, count as f64 * corpus.tfidf_idf(term)))
        .collect();
    let query_norm = query.values().map(|w| w * w).sum::<f64>().sqrt();

    (0..corpus.document_count())
        .map(|doc| {
            if query_norm == 0.0 {
                return 0.0;
            }
            let mut dot = 0.0;
            let mut norm = 0.0;
            for (term, count) in corpus.term_frequencies(doc) {
                let weight = *count as f64 * corpus.tfidf_idf(term);
                norm += weight * weight;
                if let Some(q) = query.get(term.as_str()) {
                    dot += weight * q;
                }
            }
            if norm == 0.0 {
                0.0
            } else {
                (dot / (norm.sqrt() * query_norm)).clamp(0.0, 1.0)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_identical_document_scores_one() {
        let corpus = CorpusStatistics::build(&[tokens("market risk"), tokens("protein folding")]);
        let scores = tfidf_scores(&corpus, &tokens("market risk"));
        assert!((scores[0] - 1.0).abs() < 1e-9);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn test_partial_overlap_ranks_between() {
        let corpus = CorpusStatistics::build(&[
            tokens("market risk exposure"),
            tokens("market growth"),
            tokens("cell biology"),
        ]);
        let scores = tfidf_scores(&corpus, &tokens("market risk"));
        assert!(scores[0] > scores[1]);
        assert!(scores[1] > scores[2]);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn test_unknown_query_terms() {
        let corpus = CorpusStatistics::build(&[tokens("market risk"), vec![]]);
        assert_eq!(tfidf_scores(&corpus, &tokens("galaxy")), vec![0.0, 0.0]);
        assert_eq!(tfidf_scores(&corpus, &[]), vec![0.0, 0.0]);
    }
}
