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

//! Extractive sentence scoring.
//!
//! A sentence score is a weighted sum of four components:
//! - the tf-idf of its words, where the term frequencies are relative to the most frequent word of
//!   all candidate sentences and the document frequencies count candidate sentences,
//! - its position, earlier sentences score higher,
//! - its length in words, saturating at [`SATURATED_WORD_COUNT`] words,
//! - the cosine similarity of its embedding to the centroid of all sentence embeddings.

use std::collections::{HashMap, HashSet};

use crate::{
    config::Weights,
    embedding::{centroid, cosine_similarity, embed_words, Embedding, WordEmbeddings},
    frequency::TermFrequencyTable,
    stop_words::is_stop_word,
    text::{sanitize, split_sentences_longer_than, tokenize_words, Sentence},
    utils::nan_safe_f32_cmp,
};

/// Sentences with at least this many words get the full length score.
const SATURATED_WORD_COUNT: usize = 30;

/// Shorter words don't contribute to the tf-idf.
const MIN_CONTENT_CHARS: usize = 2;

/// A scored sentence.
///
/// Scores are floored at zero, a sentence with a zero score is still a candidate of the summary.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredSentence {
    pub text: String,
    /// The index of the sentence among the candidates.
    pub index: usize,
    pub score: f32,
}

struct Words {
    /// All words as they appear in the sentence.
    all: Vec<String>,
    /// The lower cased words which are not stop words.
    meaningful: Vec<String>,
    /// The meaningful words which are not too short.
    content: Vec<String>,
}

impl Words {
    fn new(sentence: &str) -> Self {
        let all = tokenize_words(sentence)
            .map(|token| token.word.to_string())
            .collect::<Vec<_>>();
        let meaningful = all
            .iter()
            .map(|word| word.to_lowercase())
            .filter(|word_lc| !is_stop_word(word_lc))
            .collect::<Vec<_>>();
        let content = meaningful
            .iter()
            .filter(|word_lc| word_lc.chars().count() > MIN_CONTENT_CHARS)
            .cloned()
            .collect();

        Self {
            all,
            meaningful,
            content,
        }
    }
}

/// Scores the candidate sentences, in the same order.
///
/// The frequencies are computed over all candidates, so the scores depend on the set of candidates
/// eg of a whole document or of a single chunk.
#[allow(clippy::cast_precision_loss)]
pub fn score_sentences(
    sentences: &[Sentence],
    weights: &Weights,
    embeddings: &impl WordEmbeddings,
) -> Vec<ScoredSentence> {
    if sentences.is_empty() {
        return Vec::new();
    }

    let words = sentences
        .iter()
        .map(|sentence| Words::new(sentence.text()))
        .collect::<Vec<_>>();
    let frequencies = TermFrequencyTable::from_words(
        words
            .iter()
            .flat_map(|words| &words.all)
            .map(String::as_str),
    );
    let max_count = frequencies.max_count().max(1) as f32;
    let mut document_frequencies = HashMap::<&str, usize>::new();
    for words in &words {
        for word in words.content.iter().collect::<HashSet<_>>() {
            *document_frequencies.entry(word.as_str()).or_default() += 1;
        }
    }

    let total = sentences.len() as f32;
    let tf_idf = |words: &Words| {
        words
            .content
            .iter()
            .map(|word| {
                let tf = frequencies.count(word) as f32 / max_count;
                let df = document_frequencies
                    .get(word.as_str())
                    .copied()
                    .unwrap_or_default();
                let idf = (total / (df + 1) as f32).ln();
                tf * idf
            })
            .sum::<f32>()
    };

    let vectors = words
        .iter()
        .map(|words| embed_words(embeddings, words.meaningful.iter().map(String::as_str)))
        .collect::<Vec<_>>();
    let document_vector = centroid(
        vectors.iter().filter(|vector| !vector.is_zero()),
        embeddings.dimension(),
    )
    .unwrap_or_else(|| Embedding::zeros(embeddings.dimension()));

    sentences
        .iter()
        .zip(&words)
        .zip(&vectors)
        .enumerate()
        .map(|(index, ((sentence, words), vector))| {
            let position = (total - index as f32) / total;
            let length = (words.all.len() as f32 / SATURATED_WORD_COUNT as f32).min(1.);
            let semantic = cosine_similarity(vector.view(), document_vector.view());
            let score = weights.tf_idf * tf_idf(words)
                + weights.position * position
                + weights.length * length
                + weights.semantic * semantic;

            ScoredSentence {
                text: sentence.text().to_string(),
                index,
                score: score.max(0.),
            }
        })
        .collect()
}

/// Selects the indices of the `count` best scored sentences, in ascending order.
///
/// Equal scores prefer the earlier sentence.
pub(crate) fn select_top(scored: &[ScoredSentence], count: usize) -> Vec<usize> {
    let mut ranked = scored.iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| nan_safe_f32_cmp(&b.score, &a.score));
    let mut selected = ranked
        .into_iter()
        .take(count)
        .map(|sentence| sentence.index)
        .collect::<Vec<_>>();
    selected.sort_unstable();

    selected
}

/// Reduces the sentences to the `count` best ones in their original order.
///
/// If there are not more than `count` sentences they are returned as they are.
pub(crate) fn summarize_sentences(
    sentences: Vec<Sentence>,
    count: usize,
    weights: &Weights,
    embeddings: &impl WordEmbeddings,
) -> Vec<String> {
    if sentences.len() <= count {
        return sentences.into_iter().map(Sentence::into_text).collect();
    }

    let mut scored = score_sentences(&sentences, weights, embeddings);
    select_top(&scored, count)
        .into_iter()
        .map(|index| std::mem::take(&mut scored[index].text))
        .collect()
}

/// Summarizes the text as up to `count` of its sentences in document order.
///
/// Sentences with at most `min_sentence_chars` characters are never part of the summary.
pub fn summarize_text_as_points(
    text: &str,
    count: usize,
    min_sentence_chars: usize,
    weights: &Weights,
    embeddings: &impl WordEmbeddings,
) -> Vec<String> {
    let sentences = split_sentences_longer_than(&sanitize(text), min_sentence_chars);
    summarize_sentences(sentences, count, weights, embeddings)
}
