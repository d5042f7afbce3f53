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

//! Part of speech and named entity signals for keyword scoring.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The lexical class of a word.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Noun,
    Verb,
    Adjective,
    PersonalName,
    PlaceName,
    OrganizationName,
    Other,
}

impl Tag {
    /// The keyword relevance multiplier of the class.
    pub(crate) fn multiplier(self) -> f32 {
        match self {
            Self::PersonalName | Self::PlaceName | Self::OrganizationName => 3.0,
            Self::Noun => 1.5,
            Self::Verb | Self::Adjective => 0.5,
            Self::Other => 0.8,
        }
    }
}

/// Classifies single words.
pub trait Tagger: Send + Sync {
    /// Tags the word as it appears in the text.
    fn tag(&self, word: &str) -> Tag;
}

impl<T> Tagger for &T
where
    T: Tagger + ?Sized,
{
    fn tag(&self, word: &str) -> Tag {
        (**self).tag(word)
    }
}

/// The absent tagger, every word is [`Tag::Other`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTagger;

impl Tagger for NoTagger {
    fn tag(&self, _word: &str) -> Tag {
        Tag::Other
    }
}

/// A tagger backed by a fixed word list.
///
/// Lookups are case-insensitive, unknown words are [`Tag::Other`].
///
/// The serde is a map from words to tags, eg `{"berlin": "place_name", "run": "verb"}`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(from = "HashMap<String, Tag>", into = "HashMap<String, Tag>")]
pub struct LexiconTagger {
    lexicon: HashMap<String, Tag>,
}

impl LexiconTagger {
    pub fn new(lexicon: impl IntoIterator<Item = (impl AsRef<str>, Tag)>) -> Self {
        lexicon.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.lexicon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }
}

impl<S> FromIterator<(S, Tag)> for LexiconTagger
where
    S: AsRef<str>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (S, Tag)>,
    {
        let lexicon = iter
            .into_iter()
            .map(|(word, tag)| (word.as_ref().to_lowercase(), tag))
            .collect();
        Self { lexicon }
    }
}

impl From<HashMap<String, Tag>> for LexiconTagger {
    fn from(lexicon: HashMap<String, Tag>) -> Self {
        lexicon.into_iter().collect()
    }
}

impl From<LexiconTagger> for HashMap<String, Tag> {
    fn from(tagger: LexiconTagger) -> Self {
        tagger.lexicon
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, word: &str) -> Tag {
        self.lexicon
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(Tag::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tagger_is_neutral() {
        assert_eq!(NoTagger.tag("Berlin"), Tag::Other);
        assert!((NoTagger.tag("Berlin").multiplier() - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_lexicon_is_case_insensitive() {
        let tagger = LexiconTagger::new([("Berlin", Tag::PlaceName), ("run", Tag::Verb)]);
        assert_eq!(tagger.tag("berlin"), Tag::PlaceName);
        assert_eq!(tagger.tag("BERLIN"), Tag::PlaceName);
        assert_eq!(tagger.tag("Run"), Tag::Verb);
        assert_eq!(tagger.tag("walk"), Tag::Other);
    }

    #[test]
    fn test_lexicon_serde() {
        let tagger = serde_json::from_str::<LexiconTagger>(
            r#"{"Xayn": "organization_name", "model": "noun"}"#,
        )
        .unwrap();
        assert_eq!(tagger.len(), 2);
        assert_eq!(tagger.tag("xayn"), Tag::OrganizationName);
        assert_eq!(tagger.tag("models"), Tag::Other);
    }
}
