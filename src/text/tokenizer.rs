//! Tokenizer capability with a lexicon-backed backend and a rule fallback.
//!
//! Both backends lowercase, split on non-alphanumeric characters and drop
//! stop words, short tokens and pure numbers. Only the lexicon backend
//! lemmatizes. Callers depend on [`Tokenizer`] alone; the backend is picked
//! once per run by [`select_tokenizer`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::normalize::TextNormalizer;
use crate::error::{Error, Result};

/// Tokens of this many characters or fewer are discarded.
const MAX_SHORT_TOKEN_CHARS: usize = 2;

/// Fixed English stop-word set shared by both backends.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "either",
    "etc", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into", "is",
    "it", "its", "itself", "just", "may", "me", "might", "more", "most", "must", "my", "myself",
    "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "same", "shall", "she", "should", "so", "some", "such",
    "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "thus", "to", "too", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "whom", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Which tokenizer implementation produced the tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerBackend {
    /// Whitespace/punctuation split with stop-word removal
    Rule,
    /// Rule split plus lexicon lemmatization
    Lexicon,
}

/// Converts text into normalized tokens.
///
/// Implementations must be deterministic and must never fail.
pub trait Tokenizer: Send + Sync {
    /// Tokenize text.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// The backend in use.
    fn backend(&self) -> TokenizerBackend;
}

/// Requested tokenizer backend, as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum TokenizerChoice {
    /// Always use the rule tokenizer
    #[default]
    Rule,
    /// Use a lexicon file, falling back to the rule tokenizer
    Lexicon {
        /// Path to the lexicon JSON file
        path: PathBuf,
    },
}

/// The tokenizer picked for a run and the reason for any fallback.
pub struct TokenizerSelection {
    /// Tokenizer to use
    pub tokenizer: Arc<dyn Tokenizer>,
    /// Set when the requested backend was unavailable
    pub warning: Option<Error>,
}

/// Pick the tokenizer backend for a run.
///
/// A lexicon that cannot be loaded is reported as
/// [`Error::ModelUnavailable`] in the returned warning, and the rule
/// tokenizer is used instead.
pub fn select_tokenizer(choice: &TokenizerChoice) -> TokenizerSelection {
    match choice {
        TokenizerChoice::Rule => TokenizerSelection {
            tokenizer: Arc::new(RuleTokenizer::new()),
            warning: None,
        },
        TokenizerChoice::Lexicon { path } => match Lexicon::from_path(path) {
            Ok(lexicon) => {
                log::debug!(
                    "Loaded lexicon {} ({} lemmas)",
                    path.display(),
                    lexicon.lemma_count()
                );
                TokenizerSelection {
                    tokenizer: Arc::new(LexiconTokenizer::new(lexicon)),
                    warning: None,
                }
            }
            Err(e) => {
                log::warn!("{}; falling back to rule tokenizer", e);
                TokenizerSelection {
                    tokenizer: Arc::new(RuleTokenizer::new()),
                    warning: Some(e),
                }
            }
        },
    }
}

/// Rule-based fallback tokenizer. No lemmatization.
#[derive(Debug, Clone)]
pub struct RuleTokenizer {
    normalizer: TextNormalizer,
    stop_words: HashSet<&'static str>,
}

impl RuleTokenizer {
    /// Create a rule tokenizer with the fixed stop-word set.
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::default(),
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    fn words<'a>(&'a self, lowered: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(move |w| keep_word(w) && !self.stop_words.contains(*w))
    }
}

impl Default for RuleTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for RuleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = self.normalizer.normalize(text).to_lowercase();
        self.words(&lowered).map(str::to_string).collect()
    }

    fn backend(&self) -> TokenizerBackend {
        TokenizerBackend::Rule
    }
}

/// Lemma table and extra stop words for the rich backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lexicon {
    /// Surface form (lowercase) → lemma
    #[serde(default)]
    pub lemmas: HashMap<String, String>,

    /// Stop words on top of the built-in set
    #[serde(default)]
    pub stop_words: Vec<String>,
}

impl Lexicon {
    /// Build a lexicon from (surface, lemma) pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            lemmas: pairs
                .into_iter()
                .map(|(form, lemma)| (form.into().to_lowercase(), lemma.into().to_lowercase()))
                .collect(),
            stop_words: Vec::new(),
        }
    }

    /// Load a lexicon JSON file.
    ///
    /// Any failure, including an empty lemma table, is reported as
    /// [`Error::ModelUnavailable`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::ModelUnavailable(format!("{}: {}", path.display(), e)))?;
        let lexicon: Lexicon = serde_json::from_str(&data)
            .map_err(|e| Error::ModelUnavailable(format!("{}: {}", path.display(), e)))?;
        if lexicon.lemmas.is_empty() {
            return Err(Error::ModelUnavailable(format!(
                "{}: lexicon has no lemmas",
                path.display()
            )));
        }
        Ok(lexicon)
    }

    /// Number of lemma entries.
    pub fn lemma_count(&self) -> usize {
        self.lemmas.len()
    }
}

/// Lexicon-backed tokenizer with lemmatization.
#[derive(Debug, Clone)]
pub struct LexiconTokenizer {
    base: RuleTokenizer,
    lemmas: HashMap<String, String>,
    extra_stop_words: HashSet<String>,
}

impl LexiconTokenizer {
    /// Create a tokenizer over a loaded lexicon.
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            base: RuleTokenizer::new(),
            extra_stop_words: lexicon
                .stop_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            lemmas: lexicon.lemmas,
        }
    }
}

impl Tokenizer for LexiconTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = self.base.normalizer.normalize(text).to_lowercase();
        self.base
            .words(&lowered)
            .filter(|w| !self.extra_stop_words.contains(*w))
            .map(|w| self.lemmas.get(w).cloned().unwrap_or_else(|| w.to_string()))
            .filter(|lemma| keep_word(lemma))
            .collect()
    }

    fn backend(&self) -> TokenizerBackend {
        TokenizerBackend::Lexicon
    }
}

fn keep_word(word: &str) -> bool {
    word.chars().count() > MAX_SHORT_TOKEN_CHARS && !word.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_rule_tokenize() {
        let tokenizer = RuleTokenizer::new();
        let tokens = tokenizer.tokenize("The Investment Analyst must assess market-risk in 2024!");
        assert_eq!(
            tokens,
            vec!["investment", "analyst", "assess", "market", "risk"]
        );
        assert_eq!(tokenizer.backend(), TokenizerBackend::Rule);
    }

    #[test]
    fn test_rule_tokenize_empty() {
        let tokenizer = RuleTokenizer::new();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("of the and 42").is_empty());
    }

    #[test]
    fn test_lexicon_tokenize_lemmatizes() {
        let mut lexicon = Lexicon::from_pairs([("markets", "market"), ("risks", "risk")]);
        lexicon.stop_words.push("analyst".to_string());
        let tokenizer = LexiconTokenizer::new(lexicon);
        let tokens = tokenizer.tokenize("Analyst reviews Markets and RISKS");
        assert_eq!(tokens, vec!["reviews", "market", "risk"]);
        assert_eq!(tokenizer.backend(), TokenizerBackend::Lexicon);
    }

    #[test]
    fn test_select_rule() {
        let selection = select_tokenizer(&TokenizerChoice::Rule);
        assert_eq!(selection.tokenizer.backend(), TokenizerBackend::Rule);
        assert!(selection.warning.is_none());
    }

    #[test]
    fn test_select_missing_lexicon_falls_back() {
        let selection = select_tokenizer(&TokenizerChoice::Lexicon {
            path: PathBuf::from("/nonexistent/lexicon.json"),
        });
        assert_eq!(selection.tokenizer.backend(), TokenizerBackend::Rule);
        assert!(matches!(selection.warning, Some(Error::ModelUnavailable(_))));
    }

    #[test]
    fn test_select_lexicon_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"lemmas": {{"findings": "finding"}}, "stop_words": []}}"#
        )
        .unwrap();

        let selection = select_tokenizer(&TokenizerChoice::Lexicon {
            path: file.path().to_path_buf(),
        });
        assert!(selection.warning.is_none());
        assert_eq!(selection.tokenizer.backend(), TokenizerBackend::Lexicon);
        assert_eq!(selection.tokenizer.tokenize("Key findings"), vec!["key", "finding"]);
    }

    #[test]
    fn test_empty_lexicon_is_unavailable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"lemmas": {{}}}}"#).unwrap();
        let result = Lexicon::from_path(file.path());
        assert!(matches!(result, Err(Error::ModelUnavailable(_))));
    }

    #[test]
    fn test_choice_deserialize() {
        let choice: TokenizerChoice =
            serde_json::from_str(r#"{"backend": "lexicon", "path": "lex.json"}"#).unwrap();
        assert_eq!(
            choice,
            TokenizerChoice::Lexicon {
                path: PathBuf::from("lex.json")
            }
        );
        let choice: TokenizerChoice = serde_json::from_str(r#"{"backend": "rule"}"#).unwrap();
        assert_eq!(choice, TokenizerChoice::Rule);
    }
}
