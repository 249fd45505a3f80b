//! Run-scoped corpus statistics shared by the lexical scorers.

use std::collections::BTreeMap;

/// Term frequencies of one token sequence, in vocabulary order.
pub fn term_counts(tokens: &[String]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Vocabulary, document frequencies and length statistics for one run.
///
/// Built once after every document has been segmented and never mutated
/// afterwards. Each tokenized section is one corpus document. All maps are
/// ordered so that floating-point sums are evaluated in the same order on
/// every run.
#[derive(Debug, Clone, Default)]
pub struct CorpusStatistics {
    document_frequency: BTreeMap<String, usize>,
    term_frequencies: Vec<BTreeMap<String, usize>>,
    document_lengths: Vec<usize>,
    average_length: f64,
    median_length: f64,
}

impl CorpusStatistics {
    /// Build statistics over tokenized documents.
    pub fn build(documents: &[Vec<String>]) -> Self {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut term_frequencies = Vec::with_capacity(documents.len());
        let mut document_lengths = Vec::with_capacity(documents.len());

        for tokens in documents {
            let counts: BTreeMap<String, usize> = term_counts(tokens)
                .into_iter()
                .map(|(term, count)| (term.to_string(), count))
                .collect();
            for term in counts.keys() {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
            term_frequencies.push(counts);
            document_lengths.push(tokens.len());
        }

        let total: usize = document_lengths.iter().sum();
        let average_length = if document_lengths.is_empty() {
            0.0
        } else {
            total as f64 / document_lengths.len() as f64
        };

        let mut sorted = document_lengths.clone();
        sorted.sort_unstable();
        let median_length = match sorted.len() {
            0 => 0.0,
            n if n % 2 == 1 => sorted[n / 2] as f64,
            n => (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0,
        };

        Self {
            document_frequency,
            term_frequencies,
            document_lengths,
            average_length,
            median_length,
        }
    }

    /// Number of documents (sections) in the corpus.
    pub fn document_count(&self) -> usize {
        self.document_lengths.len()
    }

    /// Number of distinct terms.
    pub fn vocabulary_size(&self) -> usize {
        self.document_frequency.len()
    }

    /// Whether `term` occurs anywhere in the corpus.
    pub fn contains(&self, term: &str) -> bool {
        self.document_frequency.contains_key(term)
    }

    /// Number of documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    /// Term frequencies of one document.
    pub fn term_frequencies(&self, document: usize) -> &BTreeMap<String, usize> {
        &self.term_frequencies[document]
    }

    /// Token count of one document.
    pub fn document_length(&self, document: usize) -> usize {
        self.document_lengths[document]
    }

    /// Mean document length in tokens.
    pub fn average_length(&self) -> f64 {
        self.average_length
    }

    /// Median document length in tokens.
    pub fn median_length(&self) -> f64 {
        self.median_length
    }

    /// Smoothed TF-IDF inverse document frequency: `ln((1+N)/(1+df)) + 1`.
    pub fn tfidf_idf(&self, term: &str) -> f64 {
        let n = self.document_count() as f64;
        let df = self.document_frequency(term) as f64;
        ((1.0 + n) / (1.0 + df)).ln() + 1.0
    }

    /// BM25 inverse document frequency: `ln((N - df + 0.5)/(df + 0.5) + 1)`.
    pub fn bm25_idf(&self, term: &str) -> f64 {
        let n = self.document_count() as f64;
        let df = self.document_frequency(term) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }
}
