//! Candidate locations for every secret character.

use crate::error::{Error, Result};
use crate::reference::{ReferenceMatrix, PAD};
use crate::Location;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Case folding used on both sides of every comparison.
pub fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Secret characters, spaces removed, that occur nowhere in the matrix.
pub fn missing_characters(secret: &str, reference: &ReferenceMatrix) -> BTreeSet<char> {
    let available: BTreeSet<char> = reference.iter().map(|(_, c)| fold_case(c)).collect();

    secret
        .chars()
        .filter(|c| *c != ' ')
        .map(fold_case)
        .filter(|c| !available.contains(c))
        .collect()
}

/// Succeeds when every non-space secret character can be found in the
/// matrix. Otherwise the error carries the whole missing set.
pub fn can_encode(secret: &str, reference: &ReferenceMatrix) -> Result<()> {
    let missing = missing_characters(secret, reference);
    if missing.is_empty() {
        return Ok(());
    }

    warn!("missing characters in reference matrix: {:?}", missing);
    Err(Error::MissingCharacters { missing })
}

#[derive(Debug, Clone, Default)]
pub struct CharacterIndex {
    matches: BTreeMap<char, Vec<Location>>,
    missing: BTreeSet<char>,
}

impl CharacterIndex {
    /// Candidates in matrix scan order. Empty for missing characters.
    pub fn candidates(&self, c: char) -> &[Location] {
        self.matches
            .get(&fold_case(c))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Characters that were looked up and found nowhere.
    pub fn missing(&self) -> &BTreeSet<char> {
        &self.missing
    }

    pub fn is_missing(&self, c: char) -> bool {
        self.missing.contains(&fold_case(c))
    }

    pub fn contains(&self, c: char) -> bool {
        self.matches.contains_key(&fold_case(c))
    }
}

/// Index every distinct secret character, plus the space so that spaces in
/// the secret can land on padding cells.
pub fn find_character_matches(secret: &str, reference: &ReferenceMatrix) -> CharacterIndex {
    let mut index = CharacterIndex::default();

    let wanted = secret
        .chars()
        .filter(|c| *c != ' ')
        .map(fold_case)
        .chain(std::iter::once(PAD));

    for target in wanted {
        if index.matches.contains_key(&target) || index.missing.contains(&target) {
            continue;
        }

        let locations: Vec<Location> = reference
            .iter()
            .filter(|(_, c)| fold_case(*c) == target)
            .map(|(loc, _)| loc)
            .collect();

        if locations.is_empty() {
            warn!("character {:?} not found in cover text", target);
            index.missing.insert(target);
        } else {
            debug!("character {:?}: {} candidates", target, locations.len());
            index.matches.insert(target, locations);
        }
    }

    index
}
