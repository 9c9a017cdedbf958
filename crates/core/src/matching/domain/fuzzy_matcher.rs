use std::collections::BTreeSet;

use super::tokenizer::Tokenizer;
use crate::shared::constants::DEFAULT_SCORE_CUTOFF;

/// How strings are normalized before a token-set comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMode {
    /// Drop code points 128..=255 (Latin-1 supplement) before normalizing.
    ///
    /// Accented Latin letters such as `é` disappear, so "télé" compares as
    /// "tl". [`FuzzyMatcher`] always scores this way, in both run modes.
    ForceAscii,
    /// Keep every character. Only reachable through [`token_set_ratio`].
    Unicode,
}

/// A choice that cleared the cutoff in [`FuzzyMatcher::extract_bests`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredChoice<'a> {
    pub choice: &'a str,
    pub score: u8,
}

/// Token-set similarity scorer with a match cutoff.
///
/// Scores are integers in `[0, 100]`. Word order inside either string does
/// not affect the score, so "prix essence" and "essence prix" match fully.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    cutoff: u8,
}

impl FuzzyMatcher {
    pub fn new(cutoff: u8) -> Self {
        Self {
            cutoff: cutoff.min(100),
        }
    }

    pub fn cutoff(&self) -> u8 {
        self.cutoff
    }

    /// Token-set ratio with ASCII forcing. Both run modes score through this.
    pub fn score(&self, keyword: &str, token: &str) -> u8 {
        token_set_ratio(keyword, token, ProcessMode::ForceAscii)
    }

    pub fn is_match(&self, keyword: &str, token: &str) -> bool {
        self.score(keyword, token) >= self.cutoff
    }

    /// Every choice scoring at least the cutoff, best first.
    ///
    /// Scores are the ones [`FuzzyMatcher::score`] gives, so a choice is
    /// returned exactly when `is_match` holds for it. Ties keep their input
    /// order. `limit = None` returns all of them.
    pub fn extract_bests<'a, I>(
        &self,
        query: &str,
        choices: I,
        limit: Option<usize>,
    ) -> Vec<ScoredChoice<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let query = process(query, ProcessMode::ForceAscii);
        let mut scored: Vec<ScoredChoice<'a>> = choices
            .into_iter()
            .filter_map(|choice| {
                let processed = process(choice, ProcessMode::ForceAscii);
                let score = processed_token_set_ratio(&query, &processed);
                (score >= self.cutoff).then_some(ScoredChoice { choice, score })
            })
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        if let Some(limit) = limit {
            scored.truncate(limit);
        }
        scored
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SCORE_CUTOFF)
    }
}

/// Indel similarity of two strings, rounded half-to-even.
///
/// Either string being empty scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let total = a.len() + b.len();
    let matched = 2 * lcs_len(&a, &b);
    round_percent(matched, total)
}

/// Max of the three intersection/remainder comparisons over word sets.
pub fn token_set_ratio(a: &str, b: &str, mode: ProcessMode) -> u8 {
    processed_token_set_ratio(&process(a, mode), &process(b, mode))
}

fn processed_token_set_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let sect = join(tokens_a.intersection(&tokens_b));
    let diff_ab = join(tokens_a.difference(&tokens_b));
    let diff_ba = join(tokens_b.difference(&tokens_a));

    let combined_ab = format!("{sect} {diff_ab}").trim().to_string();
    let combined_ba = format!("{sect} {diff_ba}").trim().to_string();

    [
        ratio(&sect, &combined_ab),
        ratio(&sect, &combined_ba),
        ratio(&combined_ab, &combined_ba),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

/// Normalizes to lowercase words separated by single spaces.
fn process(s: &str, mode: ProcessMode) -> String {
    let filtered: String = match mode {
        ProcessMode::ForceAscii => s
            .chars()
            .filter(|c| !(128..=255).contains(&(*c as u32)))
            .collect(),
        ProcessMode::Unicode => s.to_string(),
    };
    let words: Vec<&str> = Tokenizer::tokens(&filtered).collect();
    words.join(" ").to_lowercase()
}

fn join<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn round_percent(numerator: usize, denominator: usize) -> u8 {
    let scaled = 100 * numerator;
    let quotient = scaled / denominator;
    let twice_remainder = 2 * (scaled % denominator);
    let rounded = if twice_remainder > denominator
        || (twice_remainder == denominator && quotient % 2 == 1)
    {
        quotient + 1
    } else {
        quotient
    };
    rounded as u8
}
