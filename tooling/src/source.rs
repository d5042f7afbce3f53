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

//! Plain text documents.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use xayn_summarizer::TextSource;

use crate::cache::DocumentKey;

const PAGE_BREAK: char = '\x0c';

#[derive(Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Pages of texts without page breaks are estimated with this many characters.
    pub chars_per_page: usize,
    /// Whether texts with page breaks are passed as one chunk per page.
    ///
    /// Such texts are checked for being extracted from scanned images.
    pub chunk_by_pages: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chars_per_page: 3_000,
            chunk_by_pages: false,
        }
    }
}

/// Estimates the number of pages of the text.
///
/// Texts with page breaks have as many pages as non-blank pages, others one page per
/// `chars_per_page` started characters. Every text has at least one page.
pub fn estimate_pages(text: &str, chars_per_page: usize) -> usize {
    let pages = if text.contains(PAGE_BREAK) {
        text.split(PAGE_BREAK)
            .filter(|page| !page.trim().is_empty())
            .count()
    } else {
        let chars_per_page = chars_per_page.max(1);
        (text.chars().count() + chars_per_page - 1) / chars_per_page
    };

    pages.max(1)
}

/// A text ready to be summarized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub source: TextSource,
    pub pages: usize,
    pub key: DocumentKey,
}

impl Document {
    /// Creates a document, the number of `pages` is estimated if it is missing.
    pub fn new(text: String, pages: Option<usize>, config: &Config) -> Self {
        let pages = pages.unwrap_or_else(|| estimate_pages(&text, config.chars_per_page));
        let key = DocumentKey::new(&text, pages);
        let source = if config.chunk_by_pages && text.contains(PAGE_BREAK) {
            let chunks = text.split(PAGE_BREAK).map(str::to_string).collect();
            TextSource::from_chunks(chunks, pages)
        } else {
            TextSource::Full(text)
        };

        Self { source, pages, key }
    }

    /// Reads the document from a UTF-8 text file.
    pub fn read(path: &Path, pages: Option<usize>, config: &Config) -> Result<Self, io::Error> {
        fs::read_to_string(path).map(|text| Self::new(text, pages, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_pages_by_length() {
        assert_eq!(estimate_pages("", 3_000), 1);
        assert_eq!(estimate_pages(&"a".repeat(3_000), 3_000), 1);
        assert_eq!(estimate_pages(&"a".repeat(3_001), 3_000), 2);
        assert_eq!(estimate_pages(&"ä".repeat(6_000), 3_000), 2);
        assert_eq!(estimate_pages("text", 0), 4);
    }

    #[test]
    fn test_estimate_pages_by_page_breaks() {
        assert_eq!(estimate_pages("one\x0ctwo\x0cthree", 1), 3);
        assert_eq!(estimate_pages("one\x0c \n\x0cthree\x0c", 1), 2);
        assert_eq!(estimate_pages("\x0c\x0c", 1), 1);
    }

    #[test]
    fn test_full_document() {
        let document = Document::new("Some text.".into(), None, &Config::default());
        assert_eq!(document.source, TextSource::Full("Some text.".into()));
        assert_eq!(document.pages, 1);
        assert_eq!(document.key, DocumentKey::new("Some text.", 1));
    }

    #[test]
    fn test_chunked_document() {
        let config = Config {
            chunk_by_pages: true,
            ..Config::default()
        };
        let document = Document::new("one\x0ctwo".into(), Some(5), &config);
        assert_eq!(document.pages, 5);
        assert_eq!(
            document.source,
            TextSource::Chunked {
                chunks: vec!["one".into(), "two".into()],
                likely_image_only: true,
            },
        );
    }

    #[test]
    fn test_read_missing_file() {
        let directory = tempfile::tempdir().unwrap();
        Document::read(&directory.path().join("missing.txt"), None, &Config::default())
            .unwrap_err();
    }
}
