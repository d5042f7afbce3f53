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

//! Word embeddings for the semantic part of the sentence score.

use std::{
    collections::HashMap,
    io::{self, BufRead},
};

use derive_more::{Deref, From};
use displaydoc::Display;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A word or centroid embedding.
///
/// The serde is identical to a `Vec<f32>`.
#[derive(Clone, Debug, Default, Deref, From, PartialEq)]
pub struct Embedding(Array1<f32>);

impl Embedding {
    /// Creates the zero vector.
    pub fn zeros(dimension: usize) -> Self {
        Array1::<f32>::zeros(dimension).into()
    }

    /// Checks if all values are zero.
    pub fn is_zero(&self) -> bool {
        self.iter().all(|&value| value == 0.)
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(vec: Vec<f32>) -> Self {
        Array1::from_vec(vec).into()
    }
}

impl<const N: usize> From<[f32; N]> for Embedding {
    fn from(array: [f32; N]) -> Self {
        Vec::from(array).into()
    }
}

impl Serialize for Embedding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(&self.0)
    }
}

impl<'de> Deserialize<'de> for Embedding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<f32>::deserialize(deserializer).map(Self::from)
    }
}

/// Looks up embeddings of single words.
pub trait WordEmbeddings: Send + Sync {
    /// The dimension shared by all vectors of this source.
    fn dimension(&self) -> usize;

    /// Gets the vector of the lower cased word if the source knows it.
    fn vector(&self, word: &str) -> Option<Embedding>;
}

impl<T> WordEmbeddings for &T
where
    T: WordEmbeddings + ?Sized,
{
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn vector(&self, word: &str) -> Option<Embedding> {
        (**self).vector(word)
    }
}

/// The absent embedding source, which knows no words.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEmbeddings;

impl WordEmbeddings for NoEmbeddings {
    fn dimension(&self) -> usize {
        0
    }

    fn vector(&self, _word: &str) -> Option<Embedding> {
        None
    }
}

/// Errors of the word embeddings.
#[derive(Debug, Display, Error)]
pub enum EmbeddingError {
    /// Failed to read the embeddings: {0}
    Io(#[from] io::Error),
    /// Invalid value `{value}` in line {line}
    Value { line: usize, value: String },
    /// Invalid dimension {actual} for `{word}`, expected {expected}
    Dimension {
        word: String,
        expected: usize,
        actual: usize,
    },
}

/// An in-memory table of word embeddings.
#[derive(Clone, Debug, Default)]
pub struct StaticEmbeddings {
    dimension: usize,
    vectors: HashMap<String, Embedding>,
}

impl StaticEmbeddings {
    /// Creates an empty table for vectors of the dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
        }
    }

    /// Adds the vector of the word, keyed by its lower cased form.
    ///
    /// # Errors
    /// Fails if the vector doesn't match the dimension of the table.
    pub fn insert(
        &mut self,
        word: &str,
        vector: impl Into<Embedding>,
    ) -> Result<(), EmbeddingError> {
        let vector = vector.into();
        if vector.len() != self.dimension {
            return Err(EmbeddingError::Dimension {
                word: word.to_string(),
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.vectors.insert(word.to_lowercase(), vector);

        Ok(())
    }

    /// Reads embeddings in the whitespace separated text format, one `word v1 v2 ...` per line.
    ///
    /// The first vector determines the dimension, empty lines are skipped.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, EmbeddingError> {
        let mut embeddings: Option<Self> = None;
        for (line, content) in reader.lines().enumerate() {
            let content = content?;
            let mut parts = content.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let vector = parts
                .map(|value| {
                    value.parse::<f32>().map_err(|_| EmbeddingError::Value {
                        line: line + 1,
                        value: value.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            embeddings
                .get_or_insert_with(|| Self::new(vector.len()))
                .insert(word, vector)?;
        }

        Ok(embeddings.unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl WordEmbeddings for StaticEmbeddings {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector(&self, word: &str) -> Option<Embedding> {
        self.vectors.get(word).cloned()
    }
}

/// Computes the cosine similarity of two vectors.
///
/// The value is bounded in `[-1, 1]`. It is zero if either vector has zero magnitude or if the
/// dimensions differ.
pub fn cosine_similarity(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    if a.len() != b.len() {
        return 0.;
    }
    let norms = a.dot(&a).sqrt() * b.dot(&b).sqrt();
    if norms > 0. && norms.is_finite() {
        (a.dot(&b) / norms).clamp(-1., 1.)
    } else {
        0.
    }
}

/// Computes the element-wise mean of the vectors of the given dimension.
///
/// Vectors of another dimension are skipped. Returns `None` if no vector is left.
#[allow(clippy::cast_precision_loss)]
pub fn centroid<'a>(
    vectors: impl IntoIterator<Item = &'a Embedding>,
    dimension: usize,
) -> Option<Embedding> {
    let mut sum = Array1::<f32>::zeros(dimension);
    let mut count = 0_usize;
    for vector in vectors {
        if vector.len() == dimension {
            sum += &vector.0;
            count += 1;
        }
    }

    (count > 0).then(|| (sum / count as f32).into())
}

/// Embeds a sequence of lower cased words as the centroid of the vectors of the known words.
///
/// The result is the zero vector if no word is known.
pub(crate) fn embed_words<'a>(
    embeddings: &impl WordEmbeddings,
    words: impl IntoIterator<Item = &'a str>,
) -> Embedding {
    let dimension = embeddings.dimension();
    if dimension == 0 {
        return Embedding::zeros(0);
    }
    let vectors = words
        .into_iter()
        .filter_map(|word| embeddings.vector(word))
        .collect::<Vec<_>>();

    centroid(&vectors, dimension).unwrap_or_else(|| Embedding::zeros(dimension))
}
