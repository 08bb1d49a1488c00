//! Hide a short message inside a cover text, a Sudoku-shaped board and an image.
//!
//! Every secret character is looked up in a reference matrix built from the
//! cover text, placed on a 9×9 board as `char_index + 1` at the cell given by
//! its sentence and word, and the order of placements is written into the
//! least-significant bits of an RGBA pixel buffer.

pub mod board;
pub mod coords;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod generator;
pub mod index;
pub mod lsb;
pub mod reference;

pub use board::Board;
pub use decoder::Decoder;
pub use encoder::{EncodedArtifact, Encoder, EncoderOptions};
pub use error::{Error, Result};
pub use generator::Placement;
pub use reference::ReferenceMatrix;

use serde::{Deserialize, Serialize};

/// Side length of the board, and the bound on every reference matrix axis.
pub const N: usize = 9;

/// Side length of a Sudoku box.
pub const BLOCK: usize = 3;

/// Ordered board cells, one per placed secret character.
pub type SequenceMap = Vec<Cell>;

/// Position of a character inside the reference matrix.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Location {
    pub sentence: usize,
    pub word: usize,
    pub char_index: usize,
}

impl Location {
    pub fn new(sentence: usize, word: usize, char_index: usize) -> Self {
        Self {
            sentence,
            word,
            char_index,
        }
    }

    /// Board cell this location lands on. Only sentence and word take part,
    /// so every character of one word shares a cell.
    pub fn cell(&self) -> Cell {
        coords::to_coordinates(self.sentence, self.word)
    }

    /// Value written to the board for this location.
    pub fn value(&self) -> u8 {
        self.char_index as u8 + 1
    }
}

/// A board cell. Serialized as a `[row, col]` pair.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(&self) -> bool {
        self.row < N && self.col < N
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell::new(row, col)
    }
}

impl From<Cell> for (usize, usize) {
    fn from(cell: Cell) -> Self {
        (cell.row, cell.col)
    }
}

mod byte_encodings {
    /// Bytes at these offsets are alpha channels and never carry payload.
    pub fn is_alpha(offset: usize) -> bool {
        offset % 4 == 3
    }

    // MSB first
    pub fn split_byte(byte: u8) -> [u8; 8] {
        [
            (byte >> 7) & 0x01,
            (byte >> 6) & 0x01,
            (byte >> 5) & 0x01,
            (byte >> 4) & 0x01,
            (byte >> 3) & 0x01,
            (byte >> 2) & 0x01,
            (byte >> 1) & 0x01,
            byte & 0x01,
        ]
    }

    pub fn zip_bit(carrier: u8, bit: u8) -> u8 {
        (carrier & 0xFE) | (bit & 0x01)
    }

    pub fn merge_bits(bits: &[u8]) -> u8 {
        (bits[0] << 7) & 0x80
            | (bits[1] << 6) & 0x40
            | (bits[2] << 5) & 0x20
            | (bits[3] << 4) & 0x10
            | (bits[4] << 3) & 0x08
            | (bits[5] << 2) & 0x04
            | (bits[6] << 1) & 0x02
            | (bits[7] & 0x01)
    }

}
