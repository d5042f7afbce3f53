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

//! Splitting of plain text into words and sentences.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Sentences with at most this many characters are considered noise.
pub const MIN_SENTENCE_CHARS: usize = 20;

// matches headers like "Page 12", "chapter 3" or "Section 4 of 9"
static BOILERPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:page|chapter|section)\s+\d+(?:\s+of\s+\d+)?\b").unwrap()
});
static PERIODS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").unwrap());
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A word of a source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    /// The word as it appears in the source.
    pub word: &'a str,
    /// The byte range of the word in the source.
    pub span: Range<usize>,
}

/// A sentence which is long enough to be scored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sentence {
    text: String,
    index: usize,
    len: usize,
}

impl Sentence {
    /// Creates a sentence from already trimmed text.
    pub(crate) fn new(text: impl Into<String>, index: usize) -> Self {
        let text = text.into();
        let len = text.chars().count();
        Self { text, index, len }
    }

    /// The trimmed sentence text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The position of the sentence among the retained sentences of its source.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The number of characters.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false, empty fragments never become sentences.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn into_text(self) -> String {
        self.text
    }
}

/// Splits the text into words.
///
/// Word boundaries follow the unicode segmentation rules. Tokens without any alphabetic character,
/// like numbers or symbols, are skipped.
pub fn tokenize_words(text: &str) -> impl Iterator<Item = Token<'_>> {
    text.unicode_word_indices()
        .filter(|(_, word)| word.chars().any(char::is_alphabetic))
        .map(|(start, word)| Token {
            word,
            span: start..start + word.len(),
        })
}

/// Splits the text into sentences, dropping fragments of at most [`MIN_SENTENCE_CHARS`] characters.
pub fn split_sentences(text: &str) -> Vec<Sentence> {
    split_sentences_longer_than(text, MIN_SENTENCE_CHARS)
}

/// Splits the text into sentences, dropping fragments of at most `min_chars` characters.
///
/// The index of each sentence counts only the retained sentences.
pub fn split_sentences_longer_than(text: &str, min_chars: usize) -> Vec<Sentence> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() > min_chars)
        .enumerate()
        .map(|(index, sentence)| Sentence::new(sentence, index))
        .collect()
}

/// Normalizes extracted text before it is scored.
///
/// Page, chapter and section markers are removed, runs of periods or dashes are collapsed to a
/// single one and all whitespace is collapsed to single spaces.
pub fn sanitize(text: &str) -> String {
    let text = BOILERPLATE.replace_all(text, " ");
    let text = PERIODS.replace_all(&text, ".");
    let text = DASHES.replace_all(&text, "-");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_skips_non_alphabetic() {
        let words = tokenize_words("In 2023 the R2D2 unit cost $1,000 - 42!")
            .map(|token| token.word)
            .collect::<Vec<_>>();
        assert_eq!(words, ["In", "the", "R2D2", "unit", "cost"]);
    }

    #[test]
    fn test_tokenize_spans() {
        let text = "Grüße aus Köln";
        for token in tokenize_words(text) {
            assert_eq!(&text[token.span.clone()], token.word);
        }
        assert_eq!(tokenize_words(text).count(), 3);
    }

    #[test]
    fn test_tokenize_empty() {
        assert_eq!(tokenize_words("").count(), 0);
        assert_eq!(tokenize_words("  1 2 3 ... ").count(), 0);
    }

    #[test]
    fn test_split_sentences_drops_short_fragments() {
        let sentences = split_sentences(
            "Chapter one. The quick brown fox jumps over the lazy dog. Ok. \
             Another sentence which is long enough to count.",
        );
        let texts = sentences.iter().map(Sentence::text).collect::<Vec<_>>();
        assert_eq!(texts, [
            "The quick brown fox jumps over the lazy dog.",
            "Another sentence which is long enough to count.",
        ]);
        assert_eq!(sentences[0].index(), 0);
        assert_eq!(sentences[1].index(), 1);
        assert_eq!(sentences[0].len(), 44);
    }

    #[test]
    fn test_split_sentences_boundary_length() {
        // exactly 20 characters is still noise
        assert!(split_sentences("abcdefghij abcdefghi").is_empty());
        assert_eq!(split_sentences("abcdefghij abcdefghij").len(), 1);
    }

    #[test]
    fn test_split_sentences_is_deterministic() {
        let text = "The first sentence is here. And the second one follows it. A third closes.";
        assert_eq!(split_sentences(text), split_sentences(text));
    }

    #[test]
    fn test_sanitize_whitespace() {
        assert_eq!(sanitize("  a\n\nb\t c \r\n"), "a b c");
    }

    #[test]
    fn test_sanitize_boilerplate() {
        assert_eq!(
            sanitize("PAGE 12 The text continues. Chapter 3 Section 4 of 9 and ends."),
            "The text continues. and ends."
        );
        // only markers followed by a number are removed
        assert_eq!(sanitize("the front page is nice"), "the front page is nice");
    }

    #[test]
    fn test_sanitize_repeated_punctuation() {
        assert_eq!(sanitize("Wait..... what -- really---"), "Wait. what - really-");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize(" \n\t "), "");
    }
}
