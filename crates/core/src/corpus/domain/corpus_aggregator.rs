use indexmap::IndexMap;

use super::keyword_counts::{KeywordCounts, TranscriptCounts};
use crate::matching::domain::fuzzy_matcher::FuzzyMatcher;
use crate::matching::domain::keyword_index::KeywordIndex;
use crate::matching::domain::tokenizer::Tokenizer;
use crate::shared::transcript::Transcript;

/// Counts, per keyword, how many tokens across a corpus clear the cutoff.
///
/// Counts are additive over transcripts, so the result does not depend on
/// processing order and per-transcript contributions can be checkpointed
/// and summed later.
pub struct CorpusAggregator {
    keywords: KeywordIndex,
    matcher: FuzzyMatcher,
}

impl CorpusAggregator {
    pub fn new(keywords: KeywordIndex, matcher: FuzzyMatcher) -> Self {
        Self { keywords, matcher }
    }

    pub fn zeroed(&self) -> KeywordCounts {
        KeywordCounts::zeroed(&self.keywords)
    }

    pub fn count(&self, transcripts: &[Transcript]) -> KeywordCounts {
        let mut totals = self.zeroed();
        for transcript in transcripts {
            totals.absorb(&self.count_transcript(transcript));
        }
        totals
    }

    /// Matching-token count per keyword for one transcript.
    ///
    /// Every token that clears the cutoff counts, so a word repeated three
    /// times counts three times. A token counts here exactly when the
    /// per-file resolver would report it as an occurrence.
    pub fn count_transcript(&self, transcript: &Transcript) -> TranscriptCounts {
        let mut frequencies: IndexMap<&str, usize> = IndexMap::new();
        for token in Tokenizer::tokens(&transcript.text) {
            *frequencies.entry(token).or_insert(0) += 1;
        }

        let mut counts = IndexMap::new();
        for entry in self.keywords.iter() {
            let bests =
                self.matcher
                    .extract_bests(&entry.keyword, frequencies.keys().copied(), None);
            let matched: usize = bests.iter().map(|c| frequencies[c.choice]).sum();
            if matched > 0 {
                counts.insert(entry.keyword.clone(), matched);
            }
        }

        TranscriptCounts {
            file: transcript.file.clone(),
            counts,
        }
    }
}
