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

//! Configuration, logging, caching and text files around the summarizer.

#![forbid(unsafe_code, unsafe_op_in_unsafe_fn)]
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

pub mod cache;
pub mod cli;
pub mod config;
pub mod logging;
pub mod source;

use std::{
    fs::File,
    io::{self, BufReader},
    path::Path,
};

use displaydoc::Display;
use thiserror::Error;
use tracing::info;
use xayn_summarizer::{
    CancellationToken,
    EmbeddingError,
    LexiconTagger,
    StaticEmbeddings,
    Strategy,
    Summarizer,
    Summary,
};

use crate::{
    cache::{CacheError, SingleFlight, SummaryCache},
    source::Document,
};

#[derive(Debug, Display, Error)]
pub enum SetupError {
    /// Invalid summarizer configuration: {0}
    Config(#[from] xayn_summarizer::ConfigError),
    /// Failed to read a capability file: {0}
    Io(#[from] io::Error),
    /// Invalid word embeddings: {0}
    Embeddings(#[from] EmbeddingError),
    /// Invalid tagger lexicon: {0}
    Tagger(#[from] serde_json::Error),
}

#[derive(Debug, Display, Error)]
pub enum RunError {
    /// {0}
    Summary(#[from] xayn_summarizer::Error),
    /// {0}
    Cache(#[from] CacheError),
}

/// A summarizer equipped with the capabilities of the tooling.
///
/// Without files the embeddings and the lexicon are empty, which is equivalent to their absence.
pub type FileSummarizer = Summarizer<StaticEmbeddings, LexiconTagger>;

/// Creates a summarizer with optional word embeddings and tagger lexicon files.
pub fn build_summarizer(
    config: &xayn_summarizer::Config,
    embeddings: Option<&Path>,
    tagger: Option<&Path>,
) -> Result<FileSummarizer, SetupError> {
    let embeddings = embeddings
        .map(|path| -> Result<_, SetupError> {
            let embeddings = StaticEmbeddings::from_reader(BufReader::new(File::open(path)?))?;
            info!(words = embeddings.len(), "loaded word embeddings");
            Ok(embeddings)
        })
        .transpose()?
        .unwrap_or_default();
    let tagger = tagger
        .map(|path| -> Result<LexiconTagger, SetupError> {
            let tagger = serde_json::from_reader(BufReader::new(File::open(path)?))?;
            Ok(tagger)
        })
        .transpose()?
        .unwrap_or_default();

    Ok(config
        .clone()
        .build()?
        .with_embeddings(embeddings)
        .with_tagger(tagger))
}

/// Summarizes the document unless its summary is cached.
pub fn summarize_document<C>(
    summarizer: &FileSummarizer,
    cache: &SingleFlight<C>,
    document: Document,
    cancellation: &CancellationToken,
) -> Result<Summary, RunError>
where
    C: SummaryCache,
{
    let Document { source, pages, key } = document;
    cache.get_or_compute(&key, || {
        summarizer
            .run_adaptive_summary(source, pages, cancellation)
            .map_err(Into::into)
    })
}

/// Renders the summary as human readable text.
pub fn render(summary: &Summary) -> String {
    let strategy = match summary.strategy {
        Strategy::Empty => "empty text".to_string(),
        Strategy::Trivial => "whole text".to_string(),
        Strategy::SinglePass => "single pass".to_string(),
        Strategy::Chunked { chunks, strata } => format!("{strata} strata of {chunks} chunks"),
    };
    let points = summary
        .summary_points
        .iter()
        .map(|point| format!("- {point}\n"))
        .collect::<String>();

    format!(
        "Summary ({strategy}):\n{points}Keywords: {}\n",
        summary.keywords.join(", "),
    )
}
