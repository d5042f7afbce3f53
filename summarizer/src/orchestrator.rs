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

//! The adaptive summary.
//!
//! Depending on the size of the text it is
//! - returned as it is if it is trivially short,
//! - summarized in a single pass if it is of moderate size,
//! - chunked, summarized per chunk and merged by stratified sampling of the chunk summaries
//!   otherwise.

use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    cancel::CancellationToken,
    chunker::{chunk, Chunk, ChunkStats},
    config::{Config, Representative},
    embedding::{NoEmbeddings, WordEmbeddings},
    error::Error,
    keywords,
    sentences::{self, summarize_sentences},
    tagger::{NoTagger, Tagger},
    text::{sanitize, Sentence},
};

/// The minimum and maximum number of strata of a chunked summary.
const MIN_STRATA: usize = 5;
const MAX_STRATA: usize = 10;

/// Every stratum covers about this many chunks before the maximum number of strata is reached.
const CHUNKS_PER_STRATUM: usize = 50;

/// The minimum and maximum number of points per chunk summary.
const MIN_CHUNK_POINTS: usize = 2;
const MAX_CHUNK_POINTS: usize = 5;

/// At most this many chunks are sampled for keywords.
const KEYWORD_SAMPLES: usize = 10;

/// Separator of pre-chunked texts which are summarized as a whole.
const CHUNK_SEPARATOR: &str = "\n\n";

/// The text to summarize.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextSource {
    /// A whole text.
    Full(String),
    /// A text which was already split into ordered chunks, eg per page.
    Chunked {
        chunks: Vec<String>,
        /// Whether the text was likely extracted from scanned images.
        likely_image_only: bool,
    },
}

impl TextSource {
    /// Creates a chunked source and guesses whether it was extracted from scanned images.
    pub fn from_chunks(chunks: Vec<String>, pages: usize) -> Self {
        let likely_image_only = ChunkStats::from_chunks(&chunks).likely_image_only(pages);
        Self::Chunked {
            chunks,
            likely_image_only,
        }
    }
}

impl From<String> for TextSource {
    fn from(text: String) -> Self {
        Self::Full(text)
    }
}

impl From<&str> for TextSource {
    fn from(text: &str) -> Self {
        Self::Full(text.to_string())
    }
}

/// How a summary was derived.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// The text was empty after sanitization.
    #[default]
    Empty,
    /// The text was short enough to be its own summary.
    Trivial,
    /// The text was summarized as a whole.
    SinglePass,
    /// The text was summarized per chunk.
    Chunked {
        /// The number of chunks.
        chunks: usize,
        /// The number of strata which contributed a chunk summary.
        strata: usize,
    },
}

/// The result of an adaptive summary.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// The summary sentences in document order.
    pub summary_points: Vec<String>,
    /// The keywords, best first.
    pub keywords: Vec<String>,
    pub strategy: Strategy,
}

/// Maps the number of pages of a document to the number of points of its summary.
pub fn target_points(pages: usize) -> usize {
    match pages {
        0..=10 => 5,
        11..=50 => 10,
        51..=100 => 15,
        101..=200 => 25,
        201..=400 => 35,
        _ => 50,
    }
}

/// The number of strata for the given number of chunks.
pub(crate) fn strata_count(chunks: usize) -> usize {
    (chunks / CHUNKS_PER_STRATUM).clamp(MIN_STRATA, MAX_STRATA)
}

/// Selects one representative chunk summary per stratum.
///
/// The `indices` are the ascending chunk indices of the available chunk summaries. Returns the
/// positions of the representatives within `indices` in stratum order, strata without an available
/// chunk summary are skipped. The last stratum extends to the last chunk.
///
/// The middle representative is the chunk summary closest to the middle of its stratum, the
/// earlier one if two are equally close.
pub(crate) fn select_representatives(
    indices: &[usize],
    chunk_count: usize,
    representative: Representative,
) -> Vec<usize> {
    let strata = strata_count(chunk_count);
    let per_stratum = (chunk_count / strata).max(1);

    (0..strata)
        .map_while(|stratum| {
            let start = stratum * per_stratum;
            (start < chunk_count).then(|| {
                let end = if stratum + 1 == strata {
                    chunk_count
                } else {
                    (start + per_stratum).min(chunk_count)
                };
                let first = indices.partition_point(|&index| index < start);
                let len = indices[first..].partition_point(|&index| index < end);
                (start..end, first..first + len)
            })
        })
        .filter(|(_, positions)| !positions.is_empty())
        .map(|(stratum, positions)| match representative {
            Representative::First => positions.start,
            Representative::Middle => {
                let middle = (stratum.start + stratum.end - 1) / 2;
                let first = positions.start;
                positions
                    .min_by_key(|&position| indices[position].abs_diff(middle))
                    .unwrap_or(first)
            }
        })
        .collect()
}

/// Summarizes texts of any size.
///
/// The summarizer is created from a [`Config`] and can be equipped with word embeddings and a
/// tagger, without them the semantic sentence score is zero and all words are tagged as other.
#[derive(Debug)]
pub struct Summarizer<E = NoEmbeddings, T = NoTagger> {
    config: Config,
    embeddings: E,
    tagger: T,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new_unchecked(Config::default(), NoEmbeddings, NoTagger)
    }
}

impl<E, T> Summarizer<E, T> {
    pub(crate) fn new_unchecked(config: Config, embeddings: E, tagger: T) -> Self {
        Self {
            config,
            embeddings,
            tagger,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the word embeddings of the semantic sentence score.
    pub fn with_embeddings<F>(self, embeddings: F) -> Summarizer<F, T>
    where
        F: WordEmbeddings,
    {
        Summarizer::new_unchecked(self.config, embeddings, self.tagger)
    }

    /// Replaces the tagger of the keyword relevance.
    pub fn with_tagger<U>(self, tagger: U) -> Summarizer<E, U>
    where
        U: Tagger,
    {
        Summarizer::new_unchecked(self.config, self.embeddings, tagger)
    }
}

impl<E, T> Summarizer<E, T>
where
    E: WordEmbeddings,
    T: Tagger,
{
    /// Extracts up to `count` keywords, best first.
    pub fn extract_key_points(&self, text: &str, count: usize) -> Vec<String> {
        keywords::extract_key_points(text, count, &self.tagger)
    }

    /// Summarizes the text as up to `count` of its sentences in document order.
    pub fn summarize_text_as_points(&self, text: &str, count: usize) -> Vec<String> {
        sentences::summarize_text_as_points(
            text,
            count,
            self.config.min_sentence_chars(),
            &self.config.weights(),
            &self.embeddings,
        )
    }

    /// Summarizes a text which spans about `pages` pages.
    ///
    /// The size of the summary grows with the number of pages, see [`target_points`].
    ///
    /// # Errors
    /// Fails if the summary is cancelled or if a chunked source is likely extracted from scanned
    /// images.
    pub fn run_adaptive_summary(
        &self,
        source: impl Into<TextSource>,
        pages: usize,
        cancellation: &CancellationToken,
    ) -> Result<Summary, Error> {
        cancellation.check()?;

        let chunks = match source.into() {
            TextSource::Full(text) => {
                if let Some(summary) = self.summarize_small(&text, pages) {
                    return Ok(summary);
                }
                chunk(&text, self.config.chunk_size())
                    .into_iter()
                    .map(Chunk::into_text)
                    .collect()
            }
            TextSource::Chunked {
                likely_image_only: true,
                ..
            } => {
                warn!(pages, "text is likely extracted from images");
                return Err(Error::NeedsOcr);
            }
            TextSource::Chunked { chunks, .. } => {
                if let Some(summary) = self.summarize_small(&chunks.join(CHUNK_SEPARATOR), pages) {
                    return Ok(summary);
                }
                chunks
            }
        };

        let summary = self.summarize_chunks(&chunks, target_points(pages), cancellation);
        if let Err(Error::Cancelled) = summary {
            warn!(chunks = chunks.len(), "adaptive summary cancelled");
        }

        summary
    }

    /// Summarizes texts below the single pass threshold, otherwise returns `None`.
    fn summarize_small(&self, text: &str, pages: usize) -> Option<Summary> {
        let sanitized = sanitize(text);
        let chars = sanitized.chars().count();
        let keywords = self.config.keywords();

        if chars == 0 {
            debug!("empty text");
            Some(Summary::default())
        } else if chars < self.config.trivial_max_chars() && pages <= 1 {
            debug!(chars, pages, "trivial summary");
            Some(Summary {
                keywords: self.extract_key_points(text, keywords.trivial),
                summary_points: vec![sanitized],
                strategy: Strategy::Trivial,
            })
        } else if chars < self.config.single_pass_max_chars() {
            let points = target_points(pages).min(self.config.max_single_pass_points());
            debug!(chars, pages, points, "single pass summary");
            Some(Summary {
                summary_points: self.summarize_text_as_points(text, points),
                keywords: self.extract_key_points(text, keywords.single_pass),
                strategy: Strategy::SinglePass,
            })
        } else {
            None
        }
    }

    fn summarize_chunk(
        &self,
        index: usize,
        chunk: &str,
        points: usize,
        cancellation: &CancellationToken,
    ) -> Result<Option<(usize, Vec<String>)>, Error> {
        cancellation.check()?;
        let points = self.summarize_text_as_points(chunk, points);

        Ok((!points.is_empty()).then_some((index, points)))
    }

    fn summarize_chunks(
        &self,
        chunks: &[String],
        target: usize,
        cancellation: &CancellationToken,
    ) -> Result<Summary, Error> {
        let chunk_count = chunks.len();
        if chunk_count == 0 {
            return Ok(Summary::default());
        }
        let points_per_chunk = (target / chunk_count).clamp(MIN_CHUNK_POINTS, MAX_CHUNK_POINTS);
        debug!(chunk_count, target, points_per_chunk, "chunked summary");

        let partials = if self.config.parallel() {
            chunks
                .par_iter()
                .enumerate()
                .map(|(index, chunk)| {
                    self.summarize_chunk(index, chunk, points_per_chunk, cancellation)
                })
                .collect::<Vec<_>>()
        } else {
            chunks
                .iter()
                .enumerate()
                .map(|(index, chunk)| {
                    self.summarize_chunk(index, chunk, points_per_chunk, cancellation)
                })
                .collect()
        };
        let mut partials = partials
            .into_iter()
            .filter_map(Result::transpose)
            .collect::<Result<Vec<_>, _>>()?;
        cancellation.check()?;

        let indices = partials.iter().map(|(index, _)| *index).collect::<Vec<_>>();
        let representatives =
            select_representatives(&indices, chunk_count, self.config.representative());
        let strata = representatives.len();
        let selected = representatives
            .into_iter()
            .flat_map(|position| std::mem::take(&mut partials[position].1))
            .collect::<Vec<_>>();

        let summary_points = if selected.len() > target {
            let sentences = selected
                .into_iter()
                .enumerate()
                .map(|(index, text)| Sentence::new(text, index))
                .collect();
            summarize_sentences(
                sentences,
                target,
                &self.config.weights(),
                &self.embeddings,
            )
        } else {
            selected
        };

        let keywords = self.sample_keywords(chunks, cancellation)?;
        info!(
            chunks = chunk_count,
            strata,
            points = summary_points.len(),
            keywords = keywords.len(),
            "chunked summary finished"
        );

        Ok(Summary {
            summary_points,
            keywords,
            strategy: Strategy::Chunked {
                chunks: chunk_count,
                strata,
            },
        })
    }

    /// Extracts keywords from evenly spaced sample chunks and refines them.
    fn sample_keywords(
        &self,
        chunks: &[String],
        cancellation: &CancellationToken,
    ) -> Result<Vec<String>, Error> {
        let keywords = self.config.keywords();
        let step = (chunks.len() / KEYWORD_SAMPLES).max(1);
        let mut sampled = Vec::new();
        for chunk in chunks.iter().step_by(step) {
            cancellation.check()?;
            sampled.extend(self.extract_key_points(chunk, keywords.per_chunk));
        }

        Ok(self.extract_key_points(&sampled.join(" "), keywords.refined))
    }
}

#[cfg(test)]
mod tests {
    use xayn_test_utils::fixtures;

    use super::*;
    use crate::{
        embedding::Embedding,
        tagger::{LexiconTagger, Tag},
    };

    const SHORT_TEXT: &str = "This is a very short document with just one paragraph.";

    fn sequential() -> Summarizer {
        Config::default().with_parallel(false).build().unwrap()
    }

    /// Requests the cancellation on the first lookup, ie while the first chunk is scored.
    struct CancelOnLookup(CancellationToken);

    impl WordEmbeddings for CancelOnLookup {
        fn dimension(&self) -> usize {
            2
        }

        fn vector(&self, _word: &str) -> Option<Embedding> {
            self.0.cancel();
            None
        }
    }

    fn assert_in_document_order(text: &str, points: &[String]) {
        let positions = points
            .iter()
            .map(|point| text.find(point.as_str()).unwrap())
            .collect::<Vec<_>>();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_target_points() {
        let table = [
            (0, 5),
            (10, 5),
            (11, 10),
            (50, 10),
            (51, 15),
            (100, 15),
            (101, 25),
            (200, 25),
            (201, 35),
            (400, 35),
            (401, 50),
            (5_000, 50),
        ];
        for (pages, points) in table {
            assert_eq!(target_points(pages), points, "pages: {pages}");
        }
    }

    #[test]
    fn test_strata_count() {
        assert_eq!(strata_count(0), 5);
        assert_eq!(strata_count(299), 5);
        assert_eq!(strata_count(300), 6);
        assert_eq!(strata_count(499), 9);
        assert_eq!(strata_count(10_000), 10);
    }

    #[test]
    fn test_first_representatives() {
        let indices = (0..20).collect::<Vec<_>>();
        let selected = select_representatives(&indices, 20, Representative::First);
        assert_eq!(selected, [0, 4, 8, 12, 16]);
    }

    #[test]
    fn test_middle_representatives() {
        let indices = (0..20).collect::<Vec<_>>();
        let selected = select_representatives(&indices, 20, Representative::Middle);
        assert_eq!(selected, [1, 5, 9, 13, 17]);
    }

    #[test]
    fn test_representatives_skip_empty_strata() {
        let indices = [1, 2, 9, 15];
        let first = select_representatives(&indices, 20, Representative::First);
        assert_eq!(first, [0, 2, 3]);
        let middle = select_representatives(&indices, 20, Representative::Middle);
        assert_eq!(middle, [0, 2, 3]);
        let middle = select_representatives(&[4, 7], 20, Representative::Middle);
        assert_eq!(middle, [0]);
        let middle = select_representatives(&[4, 5, 7], 20, Representative::Middle);
        assert_eq!(middle, [1]);
    }

    #[test]
    fn test_last_stratum_extends_to_the_end() {
        // 7 chunks in 5 strata of one chunk, the last stratum covers the chunks 4 to 6
        let selected = select_representatives(&[5, 6], 7, Representative::First);
        assert_eq!(selected, [0]);
    }

    #[test]
    fn test_representatives_are_bounded_by_strata() {
        for chunk_count in [1, 3, 7, 49, 120, 333, 1_000] {
            let indices = (0..chunk_count).collect::<Vec<_>>();
            for representative in [Representative::First, Representative::Middle] {
                let selected = select_representatives(&indices, chunk_count, representative);
                assert!(selected.len() <= strata_count(chunk_count));
                assert_eq!(selected.len(), chunk_count.min(strata_count(chunk_count)));
                assert!(selected.windows(2).all(|pair| pair[0] < pair[1]));
            }
        }
    }

    #[test]
    fn test_trivial_summary() {
        let summary = Summarizer::default()
            .run_adaptive_summary(SHORT_TEXT, 1, &CancellationToken::new())
            .unwrap();
        assert_eq!(summary.summary_points, [SHORT_TEXT]);
        assert!(summary.keywords.len() <= 3);
        assert_eq!(summary.strategy, Strategy::Trivial);
    }

    #[test]
    fn test_short_text_spanning_pages_is_not_trivial() {
        let summary = Summarizer::default()
            .run_adaptive_summary(SHORT_TEXT, 2, &CancellationToken::new())
            .unwrap();
        assert_eq!(summary.summary_points, [SHORT_TEXT]);
        assert_eq!(summary.strategy, Strategy::SinglePass);
    }

    #[test]
    fn test_empty_summary() {
        for text in ["", "  \n\n ", "Page 1 of 3"] {
            let summary = Summarizer::default()
                .run_adaptive_summary(text, 1, &CancellationToken::new())
                .unwrap();
            assert_eq!(summary, Summary::default());
        }
    }

    #[test]
    fn test_single_pass_summary() {
        let text = fixtures::paragraph(0, 12);
        let summary = sequential()
            .run_adaptive_summary(text.as_str(), 3, &CancellationToken::new())
            .unwrap();
        assert_eq!(summary.strategy, Strategy::SinglePass);
        assert_eq!(summary.summary_points.len(), 5);
        assert!(!summary.keywords.is_empty());
        assert!(summary.keywords.len() <= 5);
        assert_in_document_order(&text, &summary.summary_points);
    }

    #[test]
    fn test_chunked_summary() {
        let text = fixtures::document(30, 4);
        let summary = sequential()
            .run_adaptive_summary(text.as_str(), 30, &CancellationToken::new())
            .unwrap();
        let Strategy::Chunked { chunks, strata } = summary.strategy else {
            panic!("unexpected strategy {:?}", summary.strategy);
        };
        assert!(chunks > 1);
        assert!(strata <= strata_count(chunks));
        assert!(!summary.summary_points.is_empty());
        assert!(summary.summary_points.len() <= target_points(30));
        assert!(!summary.keywords.is_empty());
        assert!(summary.keywords.len() <= 8);
        assert_in_document_order(&text, &summary.summary_points);
    }

    #[test]
    fn test_chunked_summary_is_compressed_to_target() {
        let summarizer = Config::default()
            .with_chunk_size(300)
            .and_then(|config| config.with_single_pass_max_chars(1_000))
            .unwrap()
            .with_parallel(false)
            .build()
            .unwrap();
        let text = fixtures::document(8, 4);
        let summary = summarizer
            .run_adaptive_summary(text.as_str(), 8, &CancellationToken::new())
            .unwrap();
        assert!(matches!(summary.strategy, Strategy::Chunked { .. }));
        assert_eq!(summary.summary_points.len(), target_points(8));
        assert_in_document_order(&text, &summary.summary_points);
    }

    #[test]
    fn test_parallel_and_sequential_summaries_are_equal() {
        let text = fixtures::document(30, 4);
        let parallel = Summarizer::default()
            .run_adaptive_summary(text.as_str(), 30, &CancellationToken::new())
            .unwrap();
        let sequential = sequential()
            .run_adaptive_summary(text.as_str(), 30, &CancellationToken::new())
            .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_cancelled_summary() {
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let text = fixtures::document(30, 4);
        for summarizer in [Summarizer::default(), sequential()] {
            let result = summarizer.run_adaptive_summary(text.as_str(), 30, &cancellation);
            assert!(matches!(result, Err(Error::Cancelled)));
        }
    }

    #[test]
    fn test_cancelled_between_chunks() {
        let text = fixtures::document(30, 4);
        for parallel in [false, true] {
            let cancellation = CancellationToken::new();
            let summarizer = Config::default()
                .with_parallel(parallel)
                .build()
                .unwrap()
                .with_embeddings(CancelOnLookup(cancellation.clone()));
            let result = summarizer.run_adaptive_summary(text.as_str(), 30, &cancellation);
            assert!(cancellation.is_cancelled());
            assert!(matches!(result, Err(Error::Cancelled)), "parallel: {parallel}");
        }
    }

    #[test]
    fn test_image_only_source_needs_ocr() {
        let source = TextSource::from_chunks(vec!["12".into(), String::new()], 2);
        let result =
            Summarizer::default().run_adaptive_summary(source, 2, &CancellationToken::new());
        assert!(matches!(result, Err(Error::NeedsOcr)));
    }

    #[test]
    fn test_small_chunked_source_is_summarized_whole() {
        let chunks = vec![fixtures::paragraph(0, 4), fixtures::paragraph(1, 4)];
        let source = TextSource::Chunked {
            chunks: chunks.clone(),
            likely_image_only: false,
        };
        let summarizer = sequential();
        let summary = summarizer
            .run_adaptive_summary(source, 2, &CancellationToken::new())
            .unwrap();
        let whole = summarizer
            .run_adaptive_summary(chunks.join("\n\n"), 2, &CancellationToken::new())
            .unwrap();
        assert_eq!(summary, whole);
        assert_eq!(summary.strategy, Strategy::SinglePass);
    }

    #[test]
    fn test_tagger_changes_keywords() {
        let text = "The harbor is busy. Ships enter the harbor daily. Lisbon has a harbor.";
        let untagged = Summarizer::default().extract_key_points(text, 1);
        assert_eq!(untagged, ["harbor"]);
        let tagged = Summarizer::default()
            .with_tagger(LexiconTagger::new([("Lisbon", Tag::PlaceName)]))
            .extract_key_points(text, 1);
        assert_eq!(tagged, ["Lisbon"]);
    }

    #[test]
    fn test_strategy_serialization() {
        let summary = Summary {
            summary_points: vec!["A point.".into()],
            keywords: vec!["point".into()],
            strategy: Strategy::Chunked {
                chunks: 12,
                strata: 5,
            },
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "summary_points": ["A point."],
                "keywords": ["point"],
                "strategy": { "kind": "chunked", "chunks": 12, "strata": 5 },
            }),
        );
    }
}
