// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Keyword extraction based on word frequencies.

use std::collections::{hash_map::Entry, HashMap};

use crate::{
    frequency::{compute_frequencies, starts_upper_case},
    stop_words::is_stop_word,
    tagger::Tagger,
    text::sanitize,
    utils::nan_safe_f32_cmp,
};

/// Words shorter than this are never keywords.
const MIN_KEYWORD_CHARS: usize = 3;

/// The number of leading characters which form the root key of longer words.
const ROOT_KEY_CHARS: usize = 5;

/// Abstract nominalizations are less descriptive than concrete words.
const ABSTRACT_SUFFIXES: [&str; 4] = ["ing", "ment", "ence", "tion"];
const ABSTRACT_PENALTY: f32 = 0.6;

const CAPITALIZATION_BONUS: f32 = 1.5;

/// A scored keyword or sentence text.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredCandidate {
    pub text: String,
    pub score: f32,
}

/// Derives the key under which lexical variants of a word are merged.
///
/// This is the lower cased word, cut to its first five characters for longer words. It is a crude
/// approximation of a stem, eg "Developer" and "development" share the key "devel".
pub fn root_key(word: &str) -> String {
    let word_lc = word.to_lowercase();
    match word_lc.char_indices().nth(ROOT_KEY_CHARS) {
        Some((end, _)) => word_lc[..end].to_string(),
        None => word_lc,
    }
}

/// Computes the relevance of a word which occurs `count` times.
///
/// The score is zero for stop words and short words.
pub(crate) fn relevance(word: &str, count: usize, tagger: &impl Tagger) -> f32 {
    let word_lc = word.to_lowercase();
    if is_stop_word(&word_lc) || word.chars().count() < MIN_KEYWORD_CHARS {
        return 0.;
    }

    let mut multiplier = tagger.tag(word).multiplier();
    if ABSTRACT_SUFFIXES
        .iter()
        .any(|suffix| word_lc.ends_with(suffix))
    {
        multiplier *= ABSTRACT_PENALTY;
    }
    if starts_upper_case(word) {
        multiplier *= CAPITALIZATION_BONUS;
    }

    #[allow(clippy::cast_precision_loss)]
    let count = count as f32;
    count * multiplier
}

/// Scores all distinct words of the sanitized text.
///
/// The candidates are in first seen order, words with a zero score are dropped.
pub(crate) fn score_words(text: &str, tagger: &impl Tagger) -> Vec<ScoredCandidate> {
    compute_frequencies(text)
        .iter()
        .filter_map(|(word, count)| {
            let score = relevance(word, count, tagger);
            (score > 0.).then(|| ScoredCandidate {
                text: word.to_string(),
                score,
            })
        })
        .collect()
}

/// Keeps only the best scored candidate per root key.
///
/// Among equal scores the earlier candidate wins. The survivors keep the position of the first
/// candidate of their root key.
pub(crate) fn dedup_variants(candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    let mut positions = HashMap::<String, usize>::new();
    let mut deduped = Vec::<ScoredCandidate>::with_capacity(candidates.len());
    for candidate in candidates {
        match positions.entry(root_key(&candidate.text)) {
            Entry::Occupied(entry) => {
                let best = &mut deduped[*entry.get()];
                if candidate.score > best.score {
                    *best = candidate;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(deduped.len());
                deduped.push(candidate);
            }
        }
    }

    deduped
}

/// Extracts up to `count` scored keywords, best first.
///
/// Equal scores keep their first seen order.
pub(crate) fn extract_scored_keywords(
    text: &str,
    count: usize,
    tagger: &impl Tagger,
) -> Vec<ScoredCandidate> {
    if count == 0 {
        return Vec::new();
    }
    let text = sanitize(text);
    let mut candidates = dedup_variants(score_words(&text, tagger));
    candidates.sort_by(|a, b| nan_safe_f32_cmp(&b.score, &a.score));
    candidates.truncate(count);

    candidates
}

/// Extracts up to `count` keywords, best first.
pub fn extract_key_points(text: &str, count: usize, tagger: &impl Tagger) -> Vec<String> {
    extract_scored_keywords(text, count, tagger)
        .into_iter()
        .map(|candidate| candidate.text)
        .collect()
}
