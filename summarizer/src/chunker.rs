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

//! Splitting of long documents into bounded chunks.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

// a page break or a blank line, including the whitespace up to the next unit
static UNIT_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\x0c|\r?\n[ \t]*\r?\n)\s*").unwrap());

/// Chunks with more characters than this carry meaningful content.
const MEANINGFUL_CHARS: usize = 50;

/// Pages with fewer characters on average are likely scanned images.
const MIN_CHARS_PER_PAGE: f32 = 100.;

/// Sources with a smaller share of meaningful chunks are likely scanned images.
const MIN_MEANINGFUL_RATIO: f32 = 0.2;

/// A contiguous slice of a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    index: usize,
    text: String,
    len: usize,
}

impl Chunk {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        Self { index, text, len }
    }

    /// The position of the chunk in its document.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The number of characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// A unit which is never split across chunks.
struct Unit {
    bytes: Range<usize>,
    chars: usize,
}

impl Unit {
    fn new(text: &str, bytes: Range<usize>) -> Self {
        let chars = text[bytes.clone()].chars().count();
        Self { bytes, chars }
    }
}

/// Splits the text into pages and paragraphs, and paragraphs which are too long into sentences.
///
/// The units cover the text without gaps, separators belong to the preceding unit.
fn units(text: &str, max_chunk_size: usize) -> impl Iterator<Item = Unit> + '_ {
    let mut ends = UNIT_BREAK
        .find_iter(text)
        .map(|separator| separator.end())
        .filter(|&end| end < text.len())
        .collect::<Vec<_>>();
    ends.push(text.len());

    let mut start = 0;
    ends.into_iter()
        .map(move |end| {
            let unit = Unit::new(text, start..end);
            start = end;
            unit
        })
        .flat_map(move |unit| {
            if unit.chars > max_chunk_size {
                let offset = unit.bytes.start;
                text[unit.bytes]
                    .split_sentence_bound_indices()
                    .map(|(start, sentence)| {
                        Unit::new(text, offset + start..offset + start + sentence.len())
                    })
                    .collect::<Vec<_>>()
            } else {
                vec![unit]
            }
        })
}

/// Splits the text into chunks of at most `max_chunk_size` characters.
///
/// Pages, paragraphs and, for overlong paragraphs, sentences are never split, so a single unit
/// larger than the bound yields a larger chunk. The chunks partition the text: their concatenation
/// is the text. Trailing whitespace is attached to the last chunk and whitespace-only texts yield no
/// chunks.
pub fn chunk(text: &str, max_chunk_size: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buffer = 0..0;
    let mut buffer_chars = 0;
    for unit in units(text, max_chunk_size) {
        if buffer_chars > 0 && buffer_chars + unit.chars > max_chunk_size {
            chunks.push(Chunk::new(chunks.len(), &text[buffer.clone()]));
            buffer = unit.bytes.start..unit.bytes.start;
            buffer_chars = 0;
        }
        buffer.end = unit.bytes.end;
        buffer_chars += unit.chars;
    }

    let rest = &text[buffer];
    if !rest.trim().is_empty() {
        chunks.push(Chunk::new(chunks.len(), rest));
    } else if let Some(last) = chunks.last_mut() {
        *last = Chunk::new(last.index, format!("{}{rest}", last.text));
    }

    chunks
}

/// Coverage statistics of a chunked text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkStats {
    /// The number of chunks.
    pub chunks: usize,
    /// The number of characters of all chunks.
    pub chars: usize,
    /// The number of chunks with more than 50 non-whitespace-trimmed characters.
    pub meaningful_chunks: usize,
}

impl ChunkStats {
    pub fn from_chunks<S>(chunks: impl IntoIterator<Item = S>) -> Self
    where
        S: AsRef<str>,
    {
        chunks
            .into_iter()
            .fold(Self::default(), |mut stats, chunk| {
                let chunk = chunk.as_ref();
                stats.chunks += 1;
                stats.chars += chunk.chars().count();
                if chunk.trim().chars().count() > MEANINGFUL_CHARS {
                    stats.meaningful_chunks += 1;
                }
                stats
            })
    }

    /// The share of chunks with meaningful content, zero without chunks.
    #[allow(clippy::cast_precision_loss)]
    pub fn meaningful_ratio(&self) -> f32 {
        if self.chunks == 0 {
            0.
        } else {
            self.meaningful_chunks as f32 / self.chunks as f32
        }
    }

    /// Guesses whether the text was extracted from a document of scanned images.
    ///
    /// This is the case if there are no chunks, less than 100 characters per page on average or
    /// less than a fifth of the chunks are meaningful.
    #[allow(clippy::cast_precision_loss)]
    pub fn likely_image_only(&self, pages: usize) -> bool {
        let chars_per_page = self.chars as f32 / pages.max(1) as f32;
        self.chunks == 0
            || chars_per_page < MIN_CHARS_PER_PAGE
            || self.meaningful_ratio() < MIN_MEANINGFUL_RATIO
    }
}

#[cfg(test)]
mod tests {
    use xayn_test_utils::fixtures;

    use super::*;

    fn concat(chunks: &[Chunk]) -> String {
        chunks.iter().map(Chunk::text).collect()
    }

    #[test]
    fn test_chunks_are_lossless() {
        for (pages, size) in [(1, 100), (3, 500), (8, 2_000), (20, 5_000)] {
            let text = fixtures::document(pages, 3);
            let chunks = chunk(&text, size);
            assert_eq!(concat(&chunks), text);
            for (index, chunk) in chunks.iter().enumerate() {
                assert_eq!(chunk.index(), index);
                assert_eq!(chunk.len(), chunk.text().chars().count());
            }
        }
    }

    #[test]
    fn test_chunks_respect_the_bound() {
        let text = fixtures::document(10, 4);
        let chunks = chunk(&text, 1_000);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|chunk| chunk.len() <= 1_000));
    }

    #[test]
    fn test_paragraphs_are_accumulated() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let chunks = chunk(text, 40);
        let texts = chunks.iter().map(Chunk::text).collect::<Vec<_>>();
        assert_eq!(texts, [
            "First paragraph.\n\nSecond paragraph.\n\n",
            "Third paragraph.",
        ]);
    }

    #[test]
    fn test_crlf_paragraphs_are_units() {
        let text = "First paragraph.\r\n\r\nSecond paragraph.\r\n \r\nThird paragraph.";
        let units = units(text, usize::MAX)
            .map(|unit| &text[unit.bytes])
            .collect::<Vec<_>>();
        assert_eq!(units, [
            "First paragraph.\r\n\r\n",
            "Second paragraph.\r\n \r\n",
            "Third paragraph.",
        ]);
    }

    #[test]
    fn test_page_breaks_are_boundaries() {
        let text = "Page one text.\x0cPage two text.\x0cPage three text.";
        let chunks = chunk(text, 20);
        let texts = chunks.iter().map(Chunk::text).collect::<Vec<_>>();
        assert_eq!(texts, [
            "Page one text.\x0c",
            "Page two text.\x0c",
            "Page three text.",
        ]);
    }

    #[test]
    fn test_overlong_paragraphs_split_at_sentences() {
        let text = "A first sentence here. A second sentence here. A third one.";
        let chunks = chunk(text, 30);
        let texts = chunks.iter().map(Chunk::text).collect::<Vec<_>>();
        assert_eq!(texts, [
            "A first sentence here. ",
            "A second sentence here. ",
            "A third one.",
        ]);
    }

    #[test]
    fn test_overlong_sentence_is_kept_whole() {
        let text = "This single sentence is much longer than the tiny chunk size.";
        let chunks = chunk(text, 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text(), text);
    }

    #[test]
    fn test_trailing_whitespace_joins_last_chunk() {
        let text = "First paragraph.\n\nSecond paragraph.\n\n  \n";
        let chunks = chunk(text, 20);
        assert_eq!(chunks.len(), 2);
        assert_eq!(concat(&chunks), text);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk("", 100).is_empty());
        assert!(chunk(" \n\n ", 100).is_empty());
    }

    #[test]
    fn test_stats() {
        let long = "x".repeat(60);
        let stats = ChunkStats::from_chunks([long.as_str(), "short", "  ", long.as_str()]);
        assert_eq!(stats.chunks, 4);
        assert_eq!(stats.chars, 127);
        assert_eq!(stats.meaningful_chunks, 2);
        assert!((stats.meaningful_ratio() - 0.5).abs() < f32::EPSILON);
        assert!(!stats.likely_image_only(1));
        assert!(stats.likely_image_only(2));
    }

    #[test]
    fn test_image_only_heuristic() {
        assert!(ChunkStats::default().likely_image_only(0));

        let long = "x".repeat(500);
        let mostly_empty = [long.as_str(), "", "", "", "", "", ""];
        let stats = ChunkStats::from_chunks(mostly_empty);
        assert!(stats.meaningful_ratio() < 0.2);
        assert!(stats.likely_image_only(1));

        let stats = ChunkStats::from_chunks([long.as_str(), long.as_str()]);
        assert!(!stats.likely_image_only(5));
        assert!(stats.likely_image_only(11));
    }
}
