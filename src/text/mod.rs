//! Text normalization, tokenization and sentence splitting.

mod normalize;
mod sentence;
mod tokenizer;

pub use normalize::{NormalizeOptions, TextNormalizer};
pub use sentence::{split_sentences, SentenceBounds};
pub use tokenizer::{
    select_tokenizer, Lexicon, LexiconTokenizer, RuleTokenizer, Tokenizer, TokenizerBackend,
    TokenizerChoice, TokenizerSelection,
};
