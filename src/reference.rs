//! Reference matrix built from the cover text.
//!
//! The matrix is `[sentence][word][char]`, at most `N` on every axis. It is
//! rebuilt on every encode and decode and must come out identical for the
//! same cover text, so building is pure and deterministic.

use crate::{Location, N};
use log::debug;

/// Filler for words shorter than `N` characters.
pub const PAD: char = ' ';

/// Only a full stop ends a sentence; `!` and `?` stay inside it.
const SENTENCE_TERMINATOR: char = '.';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceMatrix {
    sentences: Vec<Vec<[char; N]>>,
}

impl ReferenceMatrix {
    /// Short cover text is not an error; the matrix simply has fewer
    /// sentences or words.
    pub fn build(cover_text: &str) -> Self {
        let normalized = cover_text.replace('\n', " ");

        let sentences: Vec<Vec<[char; N]>> = normalized
            .split_inclusive(SENTENCE_TERMINATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(N)
            .map(split_words)
            .collect();

        debug!(
            "reference matrix: {} sentences, {} words",
            sentences.len(),
            sentences.iter().map(Vec::len).sum::<usize>()
        );

        Self { sentences }
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// Number of words kept for `sentence`, zero if the sentence is absent.
    pub fn word_count(&self, sentence: usize) -> usize {
        self.sentences.get(sentence).map_or(0, Vec::len)
    }

    pub fn word(&self, sentence: usize, word: usize) -> Option<&[char; N]> {
        self.sentences.get(sentence)?.get(word)
    }

    pub fn get(&self, location: Location) -> Option<char> {
        self.word(location.sentence, location.word)?
            .get(location.char_index)
            .copied()
    }

    /// Every stored character with its location, in sentence, word, char order.
    pub fn iter(&self) -> impl Iterator<Item = (Location, char)> + '_ {
        self.sentences.iter().enumerate().flat_map(|(s, words)| {
            words.iter().enumerate().flat_map(move |(w, chars)| {
                chars
                    .iter()
                    .enumerate()
                    .map(move |(c, ch)| (Location::new(s, w, c), *ch))
            })
        })
    }
}

fn split_words(sentence: &str) -> Vec<[char; N]> {
    sentence
        .replace(',', "")
        .split_whitespace()
        .filter(|word| word.chars().count() <= N)
        .take(N)
        .map(pad_word)
        .collect()
}

fn pad_word(word: &str) -> [char; N] {
    let mut padded = [PAD; N];
    for (slot, ch) in padded.iter_mut().zip(word.chars()) {
        *slot = ch;
    }
    padded
}
