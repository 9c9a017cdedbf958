use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::fuzzy_matcher::FuzzyMatcher;
use super::keyword_index::KeywordIndex;
use super::occurrence::{FileOccurrences, Occurrence};
use super::tokenizer::Tokenizer;
use crate::shared::transcript::Transcript;

/// Where the literal re-search for a matched token starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorPolicy {
    /// One cursor for the whole transcript, advanced across all keywords.
    ///
    /// A keyword resolved later can miss an occurrence that sits before a
    /// position already consumed by an earlier keyword.
    #[default]
    Shared,
    /// Each keyword starts searching from the beginning of the text.
    PerKeyword,
}

/// Finds keyword matches in one transcript and maps them to text positions.
pub struct OccurrenceResolver {
    keywords: KeywordIndex,
    matcher: FuzzyMatcher,
    top_n: Option<usize>,
    cursor_policy: CursorPolicy,
}

impl OccurrenceResolver {
    pub fn new(
        keywords: KeywordIndex,
        matcher: FuzzyMatcher,
        top_n: Option<usize>,
        cursor_policy: CursorPolicy,
    ) -> Self {
        Self {
            keywords,
            matcher,
            top_n,
            cursor_policy,
        }
    }

    /// Occurrences are grouped by keyword in list order; within a keyword
    /// they follow token order.
    pub fn resolve(&self, transcript: &Transcript) -> FileOccurrences {
        let tokens = Tokenizer::tokenize(&transcript.text);
        let mut cursor = TextCursor::new(&transcript.text);
        let mut occurrences = Vec::new();

        for entry in self.keywords.top(self.top_n) {
            let matches = self.matching_tokens(&entry.keyword, &tokens);
            if matches.is_empty() {
                continue;
            }

            if self.cursor_policy == CursorPolicy::PerKeyword {
                cursor.reset();
            }

            for (token, score) in matches {
                occurrences.push(Occurrence {
                    keyword_id: entry.id,
                    keyword: entry.keyword.clone(),
                    position: cursor.find_next(token),
                    score,
                    matched_token: token.to_string(),
                });
            }
        }

        FileOccurrences {
            file: transcript.file.clone(),
            occurrences,
        }
    }

    fn matching_tokens<'t>(&self, keyword: &str, tokens: &[&'t str]) -> Vec<(&'t str, u8)> {
        // Transcripts repeat words a lot; score each distinct token once.
        let mut scores: HashMap<&str, u8> = HashMap::new();
        tokens
            .iter()
            .filter_map(|&token| {
                let score = *scores
                    .entry(token)
                    .or_insert_with(|| self.matcher.score(keyword, token));
                (score >= self.matcher.cutoff()).then_some((token, score))
            })
            .collect()
    }
}

/// Forward-only literal search over the transcript text.
///
/// Tracks the byte offset where the next search starts and reports hits as
/// character offsets.
struct TextCursor<'a> {
    text: &'a str,
    next_byte: usize,
}

impl<'a> TextCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, next_byte: 0 }
    }

    fn reset(&mut self) {
        self.next_byte = 0;
    }

    /// Finds `needle` at or after the cursor. A miss leaves the cursor put.
    fn find_next(&mut self, needle: &str) -> Option<usize> {
        let found = self.text[self.next_byte..].find(needle)? + self.next_byte;
        let first_char_len = self.text[found..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.next_byte = found + first_char_len;
        Some(self.text[..found].chars().count())
    }
}
