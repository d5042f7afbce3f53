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

use std::collections::{hash_map::Entry, HashMap};

use crate::text::tokenize_words;

/// Word occurrence counts with case variants merged.
///
/// Each lower cased form has one canonical spelling: the first seen variant starting with an upper
/// case letter if there is one, otherwise the first seen variant. Terms iterate in the order their
/// lower cased form was first seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TermFrequencyTable {
    terms: Vec<(String, usize)>,
    positions: HashMap<String, usize>,
}

/// Counts the words of the text.
pub fn compute_frequencies(text: &str) -> TermFrequencyTable {
    TermFrequencyTable::from_words(tokenize_words(text).map(|token| token.word))
}

pub(crate) fn starts_upper_case(word: &str) -> bool {
    word.chars().next().map_or(false, char::is_uppercase)
}

impl TermFrequencyTable {
    /// Counts the words.
    pub fn from_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        let mut table = Self::default();
        for word in words {
            match table.positions.entry(word.to_lowercase()) {
                Entry::Occupied(entry) => {
                    let (canonical, count) = &mut table.terms[*entry.get()];
                    *count += 1;
                    if !starts_upper_case(canonical) && starts_upper_case(word) {
                        *canonical = word.to_string();
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(table.terms.len());
                    table.terms.push((word.to_string(), 1));
                }
            }
        }

        table
    }

    /// Gets the merged count of all case variants of the word.
    pub fn count(&self, word: &str) -> usize {
        self.positions
            .get(&word.to_lowercase())
            .map_or(0, |&position| self.terms[position].1)
    }

    /// Gets the canonical spelling of the word.
    pub fn canonical(&self, word: &str) -> Option<&str> {
        self.positions
            .get(&word.to_lowercase())
            .map(|&position| self.terms[position].0.as_str())
    }

    /// The highest count of any term, zero if empty.
    pub fn max_count(&self) -> usize {
        self.terms.iter().map(|(_, count)| *count).max().unwrap_or_default()
    }

    /// Iterates over the canonical terms and their counts in first seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.terms.iter().map(|(word, count)| (word.as_str(), *count))
    }

    /// The number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
