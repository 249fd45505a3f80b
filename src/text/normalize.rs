//! Text normalization applied to block text before segmentation output and
//! tokenization.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Options for text normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Apply Unicode NFKC (also folds ligatures such as "ﬁ" into "fi")
    pub normalize_unicode: bool,

    /// Remove Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Remove Private Use Area (PUA) characters
    pub remove_pua: bool,

    /// Join words hyphenated across line breaks
    pub fix_hyphenation: bool,

    /// Collapse every whitespace run (including line breaks) into one space
    pub collapse_whitespace: bool,
}

impl NormalizeOptions {
    /// Leave text untouched apart from trimming.
    pub fn none() -> Self {
        Self {
            normalize_unicode: false,
            remove_replacement_char: false,
            remove_pua: false,
            fix_hyphenation: false,
            collapse_whitespace: false,
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            remove_replacement_char: true,
            remove_pua: true,
            fix_hyphenation: true,
            collapse_whitespace: true,
        }
    }
}

/// Block text normalizer.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    options: NormalizeOptions,
    hyphenation_regex: Regex,
    whitespace_regex: Regex,
}

impl TextNormalizer {
    /// Create a normalizer with the given options.
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            hyphenation_regex: Regex::new(r"([A-Za-z])-[ \t]*\r?\n[ \t]*([a-z])")
                .expect("hyphenation pattern is valid"),
            whitespace_regex: Regex::new(r"\s+").expect("whitespace pattern is valid"),
        }
    }

    /// Normalize one block of text.
    pub fn normalize(&self, text: &str) -> String {
        let mut result = if self.options.normalize_unicode {
            text.nfkc().collect::<String>()
        } else {
            text.to_string()
        };

        if self.options.remove_replacement_char {
            result = result.replace('\u{FFFD}', "");
        }

        if self.options.remove_pua {
            result = result.chars().filter(|c| !is_private_use(*c)).collect();
        }

        // Must run before whitespace collapsing removes the line breaks
        if self.options.fix_hyphenation {
            result = self
                .hyphenation_regex
                .replace_all(&result, "$1$2")
                .into_owned();
        }

        if self.options.collapse_whitespace {
            result = self.whitespace_regex.replace_all(&result, " ").into_owned();
        }

        result.trim().to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(NormalizeOptions::default())
    }
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}
