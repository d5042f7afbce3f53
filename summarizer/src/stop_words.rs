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

use std::collections::HashSet;

use once_cell::sync::Lazy;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
        "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "cannot", "could", "couldn't", "did", "didn't",
        "do", "does", "doesn't", "doing", "don't", "down", "during", "each", "even", "ever",
        "every", "few", "for", "from", "further", "had", "hadn't", "has", "hasn't", "have",
        "haven't", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his",
        "how", "however", "i", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself",
        "just", "let", "like", "made", "make", "many", "may", "me", "might", "more", "most",
        "much", "must", "my", "myself", "never", "no", "nor", "not", "now", "of", "off", "on",
        "once", "one", "only", "or", "other", "ought", "our", "ours", "ourselves", "out", "over",
        "own", "per", "same", "shall", "she", "should", "shouldn't", "since", "so", "some",
        "still", "such", "than", "that", "that's", "the", "their", "theirs", "them",
        "themselves", "then", "there", "there's", "these", "they", "this", "those", "though",
        "through", "thus", "to", "too", "under", "until", "up", "upon", "us", "very", "was",
        "wasn't", "we", "were", "weren't", "what", "when", "where", "whether", "which", "while",
        "who", "whom", "whose", "why", "will", "with", "within", "without", "won't", "would",
        "wouldn't", "yet", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Checks if the lower cased word carries no meaning on its own.
pub(crate) fn is_stop_word(word_lc: &str) -> bool {
    STOP_WORDS.contains(word_lc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_are_lower_case() {
        assert!(STOP_WORDS
            .iter()
            .all(|word| word.to_lowercase() == *word));
    }

    #[test]
    fn test_is_stop_word() {
        assert!(is_stop_word("the"));
        assert!(is_stop_word("however"));
        assert!(!is_stop_word("The"));
        assert!(!is_stop_word("summary"));
    }
}
