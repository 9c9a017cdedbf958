use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::matching::domain::keyword_index::KeywordIndex;
use crate::persistence::domain::checkpoint_record::CheckpointRecord;

/// Corpus-wide match counts, keyed by keyword in keyword-list order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordCounts {
    counts: IndexMap<String, usize>,
}

impl KeywordCounts {
    /// Every keyword of the index at zero.
    pub fn zeroed(keywords: &KeywordIndex) -> Self {
        Self {
            counts: keywords.iter().map(|k| (k.keyword.clone(), 0)).collect(),
        }
    }

    pub fn get(&self, keyword: &str) -> Option<usize> {
        self.counts.get(keyword).copied()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Adds one transcript's contribution.
    pub fn absorb(&mut self, contribution: &TranscriptCounts) {
        for (keyword, count) in &contribution.counts {
            *self.counts.entry(keyword.clone()).or_insert(0) += count;
        }
    }
}

/// Matches found in a single transcript. Keywords without matches are left
/// out, which keeps checkpoints small.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptCounts {
    pub file: String,
    pub counts: IndexMap<String, usize>,
}

impl CheckpointRecord for TranscriptCounts {
    fn record_id(&self) -> &str {
        &self.file
    }
}
