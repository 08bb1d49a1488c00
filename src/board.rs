use crate::error::{Error, Result};
use crate::{Cell, BLOCK, N};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// 9×9 grid, `0` for an empty cell, `1..=9` otherwise.
///
/// Serialized as a JSON array of nine rows of nine integers, the form the
/// board is copied and pasted in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Board {
    cells: [[u8; N]; N],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: [[u8; N]; N]) -> Result<Self> {
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if *value as usize > N {
                    return Err(Error::InvalidBoard {
                        reason: format!("value {} at ({}, {}) is outside 0..={}", value, r, c, N),
                    });
                }
            }
        }
        Ok(Self { cells: rows })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| Error::InvalidBoard {
            reason: err.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn rows(&self) -> &[[u8; N]; N] {
        &self.cells
    }

    pub fn get(&self, cell: Cell) -> u8 {
        self.cells[cell.row][cell.col]
    }

    pub fn is_empty_at(&self, cell: Cell) -> bool {
        self.get(cell) == 0
    }

    pub(crate) fn set(&mut self, cell: Cell, value: u8) {
        self.cells[cell.row][cell.col] = value;
    }

    pub(crate) fn clear(&mut self, cell: Cell) {
        self.set(cell, 0);
    }

    pub fn filled(&self) -> usize {
        self.cells.iter().flatten().filter(|v| **v != 0).count()
    }

    /// Occurrences of `value` in the row, column and box of `cell`. A cell
    /// can count more than once when it shares the row or column with `cell`
    /// and also sits in its box.
    pub fn count_conflicts(&self, cell: Cell, value: u8) -> usize {
        let in_row = (0..N).filter(|c| self.cells[cell.row][*c] == value).count();
        let in_col = (0..N).filter(|r| self.cells[*r][cell.col] == value).count();
        let in_box = box_cells(cell)
            .filter(|other| self.get(*other) == value)
            .count();
        in_row + in_col + in_box
    }

    /// No other cell in the row, column or box of `cell` holds `value`.
    pub fn is_safe(&self, cell: Cell, value: u8) -> bool {
        for i in 0..N {
            if self.cells[cell.row][i] == value || self.cells[i][cell.col] == value {
                return false;
            }
        }
        box_cells(cell).all(|other| self.get(other) != value)
    }

    /// Empty and safe; the placement test used by the generator.
    pub fn accepts(&self, cell: Cell, value: u8) -> bool {
        self.is_empty_at(cell) && self.is_safe(cell, value)
    }

    /// True when no two non-empty cells break a row, column or box rule.
    pub fn is_consistent(&self) -> bool {
        (0..N).all(|row| {
            (0..N).all(|col| {
                let cell = Cell::new(row, col);
                let value = self.get(cell);
                if value == 0 {
                    return true;
                }
                let mut copy = *self;
                copy.clear(cell);
                copy.is_safe(cell, value)
            })
        })
    }
}

fn box_cells(cell: Cell) -> impl Iterator<Item = Cell> {
    let top = (cell.row / BLOCK) * BLOCK;
    let left = (cell.col / BLOCK) * BLOCK;
    (0..BLOCK).flat_map(move |r| (0..BLOCK).map(move |c| Cell::new(top + r, left + c)))
}

impl TryFrom<Vec<Vec<u8>>> for Board {
    type Error = Error;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self> {
        if rows.len() != N {
            return Err(Error::InvalidBoard {
                reason: format!("expected {} rows, got {}", N, rows.len()),
            });
        }

        let mut cells = [[0; N]; N];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != N {
                return Err(Error::InvalidBoard {
                    reason: format!("row {} has {} values, expected {}", r, row.len(), N),
                });
            }
            cells[r].copy_from_slice(row);
        }

        Board::from_rows(cells)
    }
}

impl From<Board> for Vec<Vec<u8>> {
    fn from(board: Board) -> Self {
        board.cells.iter().map(|row| row.to_vec()).collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.iter() {
            let line = row
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
