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

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Summarizes a text file as a few of its sentences and keywords.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// The UTF-8 text file to summarize.
    ///
    /// Form feeds in the text are treated as page breaks.
    #[arg(required_unless_present = "print_config")]
    pub file: Option<PathBuf>,

    /// Number of pages of the text, estimated from its length if missing.
    #[arg(short, long)]
    pub pages: Option<usize>,

    /// Print the summary as json.
    #[arg(long)]
    pub json: bool,

    /// Word embeddings in the whitespace separated text format, one `word v1 v2 ...` per line.
    #[arg(long)]
    pub embeddings: Option<PathBuf>,

    /// Tagger lexicon as json object of words to tags, eg `{"berlin": "place_name"}`.
    #[arg(long)]
    pub tagger: Option<PathBuf>,

    /// Directory of the summary cache.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Neither read nor write the summary cache.
    #[arg(long)]
    pub no_cache: bool,

    /// File to log to additionally to logging to stderr.
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Use given configuration file.
    ///
    /// Instead of a path "inline" toml configuration file can also be
    /// passed in by prefixing it with `inline:`.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Print the config and exit instead of summarizing.
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// The config values set by the arguments.
    ///
    /// These are prioritized over the config files and environment.
    pub fn to_config_overrides(&self) -> impl Serialize {
        let mut map = Map::new();
        if let Some(log_file) = &self.log_file {
            map.insert(String::from("logging"), json!({ "file": log_file }));
        }
        let mut cache = Map::new();
        if let Some(cache_dir) = &self.cache_dir {
            cache.insert(String::from("directory"), json!(cache_dir));
        }
        if self.no_cache {
            cache.insert(String::from("enabled"), json!(false));
        }
        if !cache.is_empty() {
            map.insert(String::from("cache"), Value::Object(cache));
        }

        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let args = Args::parse_from(["summarize", "book.txt", "--no-cache", "-l", "log.json"]);
        assert_eq!(args.file, Some(PathBuf::from("book.txt")));
        let overrides = serde_json::to_value(args.to_config_overrides()).unwrap();
        assert_eq!(
            overrides,
            json!({ "logging": { "file": "log.json" }, "cache": { "enabled": false } }),
        );
    }

    #[test]
    fn test_no_overrides() {
        let args = Args::parse_from(["summarize", "--print-config"]);
        assert!(args.file.is_none());
        let overrides = serde_json::to_value(args.to_config_overrides()).unwrap();
        assert_eq!(overrides, json!({}));
    }

    #[test]
    fn test_file_is_required() {
        Args::try_parse_from(["summarize", "--json"]).unwrap_err();
    }
}
