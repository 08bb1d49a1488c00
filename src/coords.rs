//! Mapping between reference matrix (sentence, word) pairs and board cells.
//!
//! The sentence picks the box, the word picks the cell inside it. The char
//! index plays no part, so all characters of one word compete for one cell.

use crate::{Cell, BLOCK};

pub fn to_coordinates(sentence: usize, word: usize) -> Cell {
    Cell::new(
        (sentence / BLOCK) * BLOCK + word / BLOCK,
        (sentence % BLOCK) * BLOCK + word % BLOCK,
    )
}

/// Inverse of [`to_coordinates`], returns `(sentence, word)`.
pub fn from_coordinates(cell: Cell) -> (usize, usize) {
    (
        (cell.row / BLOCK) * BLOCK + cell.col / BLOCK,
        (cell.row % BLOCK) * BLOCK + cell.col % BLOCK,
    )
}
