use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Splits text into maximal runs of word characters.
///
/// Letters, digits and underscore (Unicode-aware) form tokens; everything
/// else separates them. No case folding or stemming happens here.
pub struct Tokenizer;

impl Tokenizer {
    /// Lazily yields tokens borrowed from `text`. Calling again restarts.
    pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
        WORD.find_iter(text).map(|m| m.as_str())
    }

    pub fn tokenize(text: &str) -> Vec<&str> {
        Self::tokens(text).collect()
    }
}
