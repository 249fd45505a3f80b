//! Simple sentence boundary detection.

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "e.g", "i.e", "etc", "vs", "mr", "mrs", "ms", "dr", "prof", "fig", "no", "al", "inc", "ltd",
    "co", "approx", "eq", "sec",
];

const CLOSERS: &[char] = &['"', '\'', ')', ']', '\u{201D}', '\u{2019}'];

/// Byte range of one sentence within the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceBounds {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl SentenceBounds {
    /// Slice the sentence out of its source text.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the range is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split text into sentences.
///
/// A sentence ends at `.`, `!` or `?` (plus any closing quotes or brackets)
/// followed by whitespace or the end of text, or at a line break. Returned
/// ranges are trimmed and never blank.
pub fn split_sentences(text: &str) -> Vec<SentenceBounds> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];

        if c == '\n' {
            push_trimmed(text, start, pos, &mut sentences);
            start = pos + c.len_utf8();
            i += 1;
            continue;
        }

        if matches!(c, '.' | '!' | '?') {
            let mut j = i + 1;
            while j < chars.len() && CLOSERS.contains(&chars[j].1) {
                j += 1;
            }
            let at_boundary = j >= chars.len() || chars[j].1.is_whitespace();
            if at_boundary && !(c == '.' && ends_with_abbreviation(&text[start..pos])) {
                let end = if j < chars.len() { chars[j].0 } else { text.len() };
                push_trimmed(text, start, end, &mut sentences);
                start = end;
                i = j;
                continue;
            }
        }

        i += 1;
    }

    push_trimmed(text, start, text.len(), &mut sentences);
    sentences
}

fn push_trimmed(text: &str, start: usize, end: usize, out: &mut Vec<SentenceBounds>) {
    let slice = &text[start..end];
    let trimmed_start = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return;
    }
    let s = start + trimmed_start;
    out.push(SentenceBounds {
        start: s,
        end: s + trimmed.len(),
    });
}

fn ends_with_abbreviation(before: &str) -> bool {
    let word = before
        .rsplit(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("")
        .to_lowercase();
    // Single letters ("J. Smith", "A. Overview") are initials or markers
    (word.chars().count() == 1 && word.chars().all(char::is_alphabetic))
        || ABBREVIATIONS.contains(&word.as_str())
}
