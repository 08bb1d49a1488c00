use crate::board::Board;
use crate::coords::from_coordinates;
use crate::error::{Error, Result};
use crate::index::fold_case;
use crate::reference::ReferenceMatrix;
use crate::{lsb, Cell, Location};
use log::debug;
use std::io::{BufRead, Seek};

pub struct Decoder {}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self {}
    }

    /// Loads the carrier image and recovers the message hidden with
    /// `cover_text` and `board`.
    pub fn decode<R: BufRead + Seek>(
        &self,
        cover_text: &str,
        input_image: R,
        board: &Board,
    ) -> Result<String> {
        let img = image::io::Reader::new(input_image)
            .with_guessed_format()?
            .decode()?;

        let image_bytes = img.to_rgba8().into_raw();
        self.decode_pixels(cover_text, &image_bytes, board)
    }

    pub fn decode_pixels(&self, cover_text: &str, pixels: &[u8], board: &Board) -> Result<String> {
        let reference = ReferenceMatrix::build(cover_text);
        let sequence = lsb::extract(pixels)?;

        debug!("extracted sequence map of {} cells", sequence.len());

        decode_board(board, &reference, &sequence)
    }
}

/// Reads the board in sequence order. Cells holding `0` are skipped. The
/// result is case-folded, since encoding does not keep case.
pub fn decode_board(board: &Board, reference: &ReferenceMatrix, sequence: &[Cell]) -> Result<String> {
    let mut message = String::with_capacity(sequence.len());

    for cell in sequence {
        if !cell.in_bounds() {
            return Err(Error::PayloadParse {
                reason: format!("cell ({}, {}) is off the board", cell.row, cell.col),
            });
        }

        let value = board.get(*cell);
        if value == 0 {
            debug!("skipping empty cell ({}, {})", cell.row, cell.col);
            continue;
        }

        let (sentence, word) = from_coordinates(*cell);
        let location = Location::new(sentence, word, value as usize - 1);

        let ch = reference.get(location).ok_or(Error::ReferenceLookup {
            row: cell.row,
            col: cell.col,
            value,
        })?;
        message.push(fold_case(ch));
    }

    Ok(message)
}
