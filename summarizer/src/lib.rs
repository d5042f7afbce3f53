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

//! Summarize a text of any size as a few of its sentences and a few keywords.
//!
//! The summary is extractive: sentences are ranked by a weighted sum of their tf-idf, position,
//! length and semantic similarity to the whole text, keywords are ranked by their frequency and an
//! optional part of speech signal. Long texts are chunked, summarized per chunk in parallel and
//! merged by stratified sampling, so the size of the summary grows with the size of the text.

#![forbid(unsafe_op_in_unsafe_fn)]
#![forbid(unsafe_code)]
#![deny(
    clippy::pedantic,
    noop_method_call,
    rust_2018_idioms,
    unused_qualifications
)]
#![warn(unreachable_pub, rustdoc::missing_crate_level_docs)]
#![allow(
    clippy::items_after_statements,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

mod cancel;
mod chunker;
mod config;
mod embedding;
mod error;
mod frequency;
mod keywords;
mod orchestrator;
mod sentences;
mod stop_words;
mod tagger;
mod text;
mod utils;

pub use crate::{
    cancel::CancellationToken,
    chunker::{chunk, Chunk, ChunkStats},
    config::{Config, ConfigError, KeywordCounts, Representative, Weights},
    embedding::{
        centroid,
        cosine_similarity,
        Embedding,
        EmbeddingError,
        NoEmbeddings,
        StaticEmbeddings,
        WordEmbeddings,
    },
    error::Error,
    frequency::{compute_frequencies, TermFrequencyTable},
    keywords::{root_key, ScoredCandidate},
    orchestrator::{target_points, Strategy, Summarizer, Summary, TextSource},
    sentences::{score_sentences, ScoredSentence},
    tagger::{LexiconTagger, NoTagger, Tag, Tagger},
    text::{
        sanitize,
        split_sentences,
        split_sentences_longer_than,
        tokenize_words,
        Sentence,
        Token,
        MIN_SENTENCE_CHARS,
    },
};

/// Extracts up to `count` keywords of the text, best first.
///
/// # Examples
///
/// ```
/// let keywords = xayn_summarizer::extract_key_points("Rust is fast. Rust is safe.", 1);
/// assert_eq!(keywords, ["Rust"]);
/// ```
pub fn extract_key_points(text: &str, count: usize) -> Vec<String> {
    keywords::extract_key_points(text, count, &NoTagger)
}

/// Summarizes the text as up to `count` of its sentences in document order.
pub fn summarize_text_as_points(text: &str, count: usize) -> Vec<String> {
    let config = Config::default();
    sentences::summarize_text_as_points(
        text,
        count,
        config.min_sentence_chars(),
        &config.weights(),
        &NoEmbeddings,
    )
}

/// Summarizes a text which spans about `pages` pages with the default configuration.
///
/// # Examples
///
/// ```
/// use xayn_summarizer::{run_adaptive_summary, Strategy};
///
/// let text = "This is a very short document with just one paragraph.";
/// let summary = run_adaptive_summary(text, 1).unwrap();
/// assert_eq!(summary.summary_points, [text]);
/// assert_eq!(summary.strategy, Strategy::Trivial);
/// ```
pub fn run_adaptive_summary(
    source: impl Into<TextSource>,
    pages: usize,
) -> Result<Summary, Error> {
    Summarizer::default().run_adaptive_summary(source, pages, &CancellationToken::new())
}
