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

//! Deterministic english texts of any size.
//!
//! All sentences start upper case, end with a period and are longer than 20 characters. The
//! sentences of distinct seeds are distinct for seeds below 323 323.

const SUBJECTS: [&str; 7] = [
    "The engineer",
    "A gardener",
    "The nurse",
    "An old sailor",
    "The young painter",
    "A careful doctor",
    "The baker",
];

const VERBS: [&str; 11] = [
    "builds",
    "admires",
    "paints",
    "repairs",
    "describes",
    "visits",
    "studies",
    "protects",
    "measures",
    "photographs",
    "cleans",
];

const ADJECTIVES: [&str; 13] = [
    "sturdy", "ancient", "colorful", "quiet", "narrow", "enormous", "fragile", "golden", "hidden",
    "crowded", "silent", "distant", "wooden",
];

const OBJECTS: [&str; 17] = [
    "bridge",
    "garden",
    "lighthouse",
    "library",
    "market",
    "tower",
    "cathedral",
    "harbor",
    "castle",
    "museum",
    "orchard",
    "canal",
    "fountain",
    "windmill",
    "theater",
    "station",
    "meadow",
];

const PLACES: [&str; 19] = [
    "river", "mountains", "village", "forest", "coast", "valley", "city", "lake", "desert",
    "island", "border", "highway", "railway", "cliffs", "hills", "bay", "square", "park", "shore",
];

/// Sentences per paragraph of a [`document`].
pub const SENTENCES_PER_PARAGRAPH: usize = 5;

/// Creates the sentence of the seed.
pub fn sentence(seed: usize) -> String {
    format!(
        "{} {} the {} {} near the {}.",
        SUBJECTS[seed % SUBJECTS.len()],
        VERBS[seed % VERBS.len()],
        ADJECTIVES[seed % ADJECTIVES.len()],
        OBJECTS[seed % OBJECTS.len()],
        PLACES[seed % PLACES.len()],
    )
}

/// Creates a paragraph of `sentences` distinct sentences.
///
/// Paragraphs with the same number of sentences but different seeds share no sentence.
pub fn paragraph(seed: usize, sentences: usize) -> String {
    (seed * sentences..(seed + 1) * sentences)
        .map(sentence)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Creates a document of `pages` pages with `paragraphs` paragraphs each.
///
/// Paragraphs are separated by blank lines and pages by form feeds, no sentence repeats.
pub fn document(pages: usize, paragraphs: usize) -> String {
    (0..pages)
        .map(|page| {
            (0..paragraphs)
                .map(|paragraph_index| {
                    paragraph(page * paragraphs + paragraph_index, SENTENCES_PER_PARAGRAPH)
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .collect::<Vec<_>>()
        .join("\n\x0c")
}
