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

use displaydoc::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    embedding::NoEmbeddings,
    orchestrator::Summarizer,
    tagger::NoTagger,
    text::MIN_SENTENCE_CHARS,
};

/// Configurations of the summarizer.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
#[must_use]
pub struct Config {
    trivial_max_chars: usize,
    single_pass_max_chars: usize,
    chunk_size: usize,
    min_sentence_chars: usize,
    max_single_pass_points: usize,
    keywords: KeywordCounts,
    weights: Weights,
    representative: Representative,
    parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trivial_max_chars: 500,
            single_pass_max_chars: 15_000,
            chunk_size: 5_000,
            min_sentence_chars: MIN_SENTENCE_CHARS,
            max_single_pass_points: 5,
            keywords: KeywordCounts::default(),
            weights: Weights::default(),
            representative: Representative::default(),
            parallel: true,
        }
    }
}

/// The number of keywords extracted on the different paths of the adaptive summary.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeywordCounts {
    /// Keywords of a trivially short text.
    pub trivial: usize,
    /// Keywords of a text summarized in a single pass.
    pub single_pass: usize,
    /// Keywords sampled from each selected chunk.
    pub per_chunk: usize,
    /// Keywords refined from the sampled chunk keywords.
    pub refined: usize,
}

impl Default for KeywordCounts {
    fn default() -> Self {
        Self {
            trivial: 3,
            single_pass: 5,
            per_chunk: 3,
            refined: 8,
        }
    }
}

/// The weights of the sentence score components.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Weights {
    pub tf_idf: f32,
    pub position: f32,
    pub length: f32,
    pub semantic: f32,
}

// the f32 fields are never NaN after validation
impl Eq for Weights {}

impl Default for Weights {
    fn default() -> Self {
        Self {
            tf_idf: 0.6,
            position: 0.2,
            length: 0.1,
            semantic: 0.1,
        }
    }
}

impl Weights {
    fn is_valid(&self) -> bool {
        let weights = [self.tf_idf, self.position, self.length, self.semantic];
        weights.iter().all(|weight| (0. ..=1.).contains(weight))
            && weights.iter().sum::<f32>() > 0.
    }
}

/// Which chunk summary represents a stratum of a long document.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Representative {
    /// The summary of the first chunk of the stratum which yielded any points.
    #[default]
    First,
    /// The summary of the chunk closest to the middle of the stratum which yielded any points.
    Middle,
}

/// Errors of the summarizer configuration.
#[derive(Copy, Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid chunk size, expected positive value
    ChunkSize,
    /// Invalid single pass threshold, expected value not below the trivial threshold
    SinglePass,
    /// Invalid number of single pass points, expected positive value
    SinglePassPoints,
    /// Invalid keyword counts, expected positive values
    KeywordCounts,
    /// Invalid weights, expected values from the unit interval with a positive sum
    Weights,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ChunkSize);
        }
        if self.single_pass_max_chars < self.trivial_max_chars {
            return Err(ConfigError::SinglePass);
        }
        if self.max_single_pass_points == 0 {
            return Err(ConfigError::SinglePassPoints);
        }
        let KeywordCounts {
            trivial,
            single_pass,
            per_chunk,
            refined,
        } = self.keywords;
        if [trivial, single_pass, per_chunk, refined].contains(&0) {
            return Err(ConfigError::KeywordCounts);
        }
        if !self.weights.is_valid() {
            return Err(ConfigError::Weights);
        }

        Ok(())
    }

    /// Texts below this many characters spanning at most one page are returned as they are.
    pub fn trivial_max_chars(&self) -> usize {
        self.trivial_max_chars
    }

    /// Sets the trivial text threshold.
    ///
    /// # Errors
    /// Fails if the threshold exceeds the single pass threshold.
    pub fn with_trivial_max_chars(mut self, chars: usize) -> Result<Self, ConfigError> {
        self.trivial_max_chars = chars;
        self.validate()?;

        Ok(self)
    }

    /// Texts below this many characters are summarized in a single pass instead of chunks.
    pub fn single_pass_max_chars(&self) -> usize {
        self.single_pass_max_chars
    }

    /// Sets the single pass threshold.
    ///
    /// # Errors
    /// Fails if the threshold is below the trivial threshold.
    pub fn with_single_pass_max_chars(mut self, chars: usize) -> Result<Self, ConfigError> {
        self.single_pass_max_chars = chars;
        self.validate()?;

        Ok(self)
    }

    /// The maximum number of characters of a chunk, unless a single unit is larger.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Sets the chunk size.
    ///
    /// # Errors
    /// Fails if the chunk size is zero.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self, ConfigError> {
        self.chunk_size = chunk_size;
        self.validate()?;

        Ok(self)
    }

    /// Sentences with at most this many characters are dropped.
    pub fn min_sentence_chars(&self) -> usize {
        self.min_sentence_chars
    }

    /// Sets the minimum sentence length.
    pub fn with_min_sentence_chars(mut self, chars: usize) -> Self {
        self.min_sentence_chars = chars;
        self
    }

    /// The upper bound of summary points on the single pass path.
    pub fn max_single_pass_points(&self) -> usize {
        self.max_single_pass_points
    }

    /// Sets the upper bound of single pass summary points.
    ///
    /// # Errors
    /// Fails if the bound is zero.
    pub fn with_max_single_pass_points(mut self, points: usize) -> Result<Self, ConfigError> {
        self.max_single_pass_points = points;
        self.validate()?;

        Ok(self)
    }

    /// The keyword counts.
    pub fn keywords(&self) -> KeywordCounts {
        self.keywords
    }

    /// Sets the keyword counts.
    ///
    /// # Errors
    /// Fails if any count is zero.
    pub fn with_keywords(mut self, keywords: KeywordCounts) -> Result<Self, ConfigError> {
        self.keywords = keywords;
        self.validate()?;

        Ok(self)
    }

    /// The weights of the sentence score components.
    pub fn weights(&self) -> Weights {
        self.weights
    }

    /// Sets the weights.
    ///
    /// # Errors
    /// Fails if a weight is outside of the unit interval or all weights are zero.
    pub fn with_weights(mut self, weights: Weights) -> Result<Self, ConfigError> {
        self.weights = weights;
        self.validate()?;

        Ok(self)
    }

    /// The policy to pick stratum representatives.
    pub fn representative(&self) -> Representative {
        self.representative
    }

    /// Sets the policy to pick stratum representatives.
    pub fn with_representative(mut self, representative: Representative) -> Self {
        self.representative = representative;
        self
    }

    /// Whether chunks are summarized in parallel.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Sets whether chunks are summarized in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Creates a summarizer without tagger and embeddings.
    ///
    /// # Errors
    /// Fails if the configuration is invalid.
    pub fn build(self) -> Result<Summarizer<NoEmbeddings, NoTagger>, ConfigError> {
        self.validate()?;

        Ok(Summarizer::new_unchecked(self, NoEmbeddings, NoTagger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            Config::default().with_chunk_size(0).unwrap_err(),
            ConfigError::ChunkSize
        );
        assert_eq!(
            Config::default().with_single_pass_max_chars(10).unwrap_err(),
            ConfigError::SinglePass
        );
        assert_eq!(
            Config::default().with_max_single_pass_points(0).unwrap_err(),
            ConfigError::SinglePassPoints
        );
        assert_eq!(
            Config::default()
                .with_keywords(KeywordCounts {
                    refined: 0,
                    ..KeywordCounts::default()
                })
                .unwrap_err(),
            ConfigError::KeywordCounts
        );
        assert_eq!(
            Config::default()
                .with_weights(Weights {
                    tf_idf: 1.5,
                    ..Weights::default()
                })
                .unwrap_err(),
            ConfigError::Weights
        );
        assert_eq!(
            Config::default()
                .with_weights(Weights {
                    tf_idf: 0.,
                    position: 0.,
                    length: 0.,
                    semantic: 0.,
                })
                .unwrap_err(),
            ConfigError::Weights
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config = serde_json::from_str::<Config>(
            r#"{"chunk_size": 1000, "keywords": {"refined": 10}, "representative": "middle"}"#,
        )
        .unwrap();
        assert_eq!(config.chunk_size(), 1000);
        assert_eq!(config.keywords().refined, 10);
        assert_eq!(config.keywords().per_chunk, 3);
        assert_eq!(config.representative(), Representative::Middle);
        assert_eq!(config.weights(), Weights::default());
    }

    #[test]
    fn test_deserialize_unknown_field() {
        assert!(serde_json::from_str::<Config>(r#"{"chunk": 1000}"#).is_err());
    }
}
