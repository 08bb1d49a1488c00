//! Placement of secret characters onto the board.
//!
//! A depth-first search over the secret, one frame per character, each frame
//! holding that character's candidates ranked against the board as it stood
//! when the frame was opened. When the search runs out of branches, or out of
//! budget, a single greedy pass places what it can and drops the rest.

use crate::board::Board;
use crate::index::{fold_case, CharacterIndex};
use crate::{Cell, Location, SequenceMap};
use log::{debug, warn};

/// How a secret fared on the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Placement {
    /// Characters in the secret, spaces included.
    pub requested: usize,
    /// Characters that made it onto the board.
    pub placed: usize,
    /// Set when the search failed and the greedy pass ran instead.
    pub exhausted: bool,
    /// Candidate attempts made by the search.
    pub steps: u64,
}

impl Placement {
    pub fn dropped(&self) -> usize {
        self.requested - self.placed
    }

    pub fn is_complete(&self) -> bool {
        self.placed == self.requested
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedBoard {
    pub board: Board,
    pub sequence: SequenceMap,
    pub placement: Placement,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Search {
    Solved,
    Exhausted,
    OutOfBudget,
}

struct Frame {
    ranked: Vec<Location>,
    cursor: usize,
}

impl Frame {
    fn open(board: &Board, candidates: &[Location]) -> Self {
        let mut ranked = candidates.to_vec();
        // stable, so equal counts keep matrix scan order
        ranked.sort_by_key(|loc| board.count_conflicts(loc.cell(), loc.value()));
        Self { ranked, cursor: 0 }
    }
}

pub struct Generator {
    budget: Option<u64>,
}

impl Generator {
    /// `budget` caps the candidate attempts of the search; `None` is unbounded.
    pub fn new(budget: Option<u64>) -> Self {
        Self { budget }
    }

    pub fn generate(&self, secret: &str, index: &CharacterIndex) -> GeneratedBoard {
        let chars: Vec<char> = secret.chars().map(fold_case).collect();
        let candidates: Vec<&[Location]> = chars.iter().map(|c| index.candidates(*c)).collect();

        let mut board = Board::new();
        let mut sequence: SequenceMap = Vec::with_capacity(chars.len());

        let (outcome, steps) = self.search(&candidates, &mut board, &mut sequence);
        debug!(
            "search finished: {:?} after {} steps for {} characters",
            outcome,
            steps,
            chars.len()
        );

        let exhausted = outcome != Search::Solved;
        if exhausted {
            warn!("could not place all characters while satisfying sudoku rules");
            board = Board::new();
            sequence.clear();
            greedy_fill(&chars, &candidates, &mut board, &mut sequence);
        }

        let placement = Placement {
            requested: chars.len(),
            placed: sequence.len(),
            exhausted,
            steps,
        };

        if !placement.is_complete() {
            warn!(
                "encoded {} of {} characters, {} dropped",
                placement.placed,
                placement.requested,
                placement.dropped()
            );
        }

        GeneratedBoard {
            board,
            sequence,
            placement,
        }
    }

    fn search(
        &self,
        candidates: &[&[Location]],
        board: &mut Board,
        sequence: &mut SequenceMap,
    ) -> (Search, u64) {
        if candidates.is_empty() {
            return (Search::Solved, 0);
        }

        let mut steps: u64 = 0;
        let mut stack: Vec<Frame> = Vec::with_capacity(candidates.len());
        stack.push(Frame::open(board, candidates[0]));

        let outcome = 'search: loop {
            let frame = match stack.last_mut() {
                Some(frame) => frame,
                None => break Search::Exhausted,
            };

            let mut chosen = None;
            while frame.cursor < frame.ranked.len() {
                if let Some(limit) = self.budget {
                    if steps >= limit {
                        break 'search Search::OutOfBudget;
                    }
                }

                let location = frame.ranked[frame.cursor];
                frame.cursor += 1;
                steps += 1;

                if board.accepts(location.cell(), location.value()) {
                    chosen = Some(location);
                    break;
                }
            }

            match chosen {
                Some(location) => {
                    board.set(location.cell(), location.value());
                    sequence.push(location.cell());

                    let depth = stack.len();
                    if depth == candidates.len() {
                        break Search::Solved;
                    }
                    stack.push(Frame::open(board, candidates[depth]));
                }
                None => {
                    stack.pop();
                    // undo the placement made by the frame below
                    if !stack.is_empty() {
                        if let Some(cell) = sequence.pop() {
                            board.clear(cell);
                        }
                    }
                }
            }
        };

        (outcome, steps)
    }
}

fn greedy_fill(
    chars: &[char],
    candidates: &[&[Location]],
    board: &mut Board,
    sequence: &mut SequenceMap,
) {
    for (position, (ch, locations)) in chars.iter().zip(candidates).enumerate() {
        let spot: Option<Cell> = locations
            .iter()
            .find(|loc| board.accepts(loc.cell(), loc.value()))
            .map(|loc| {
                board.set(loc.cell(), loc.value());
                loc.cell()
            });

        match spot {
            Some(cell) => sequence.push(cell),
            None => warn!("dropping {:?} at position {}: no free cell", ch, position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::find_character_matches;
    use crate::reference::ReferenceMatrix;
    use std::collections::HashSet;

    fn generate(cover: &str, secret: &str, budget: Option<u64>) -> GeneratedBoard {
        let reference = ReferenceMatrix::build(cover);
        let index = find_character_matches(secret, &reference);
        Generator::new(budget).generate(secret, &index)
    }

    #[test]
    fn test_second_letter_of_same_word_is_dropped() {
        let generated = generate("Ab cd. Ef gh.", "ab", None);

        assert_eq!(vec![Cell::new(0, 0)], generated.sequence);
        assert_eq!(1, generated.board.get(Cell::new(0, 0)));
        assert_eq!(1, generated.board.filled());
        assert!(generated.placement.exhausted);
        assert_eq!(2, generated.placement.requested);
        assert_eq!(1, generated.placement.placed);
        assert_eq!(1, generated.placement.dropped());
    }

    #[test]
    fn test_letters_from_different_words() {
        let generated = generate("Ab cd. Ef gh.", "ad", None);

        assert!(generated.placement.is_complete());
        assert!(!generated.placement.exhausted);
        assert_eq!(vec![Cell::new(0, 0), Cell::new(0, 1)], generated.sequence);
        assert_eq!(1, generated.board.get(Cell::new(0, 0)));
        assert_eq!(2, generated.board.get(Cell::new(0, 1)));
    }

    #[test]
    fn test_row_conflict_drops_character() {
        // 'e' would put a second 1 into row 0
        let generated = generate("Ab cd. Ef gh.", "ae", None);

        assert!(generated.placement.exhausted);
        assert_eq!(vec![Cell::new(0, 0)], generated.sequence);
    }

    #[test]
    fn test_backtracks_to_alternative_occurrence() {
        // 'a' first lands on "ax", which leaves 'x' without a cell; the search
        // must move 'a' to "bba." to make room.
        let generated = generate("ax bba.", "ax", None);

        assert!(generated.placement.is_complete());
        assert!(!generated.placement.exhausted);
        assert_eq!(vec![Cell::new(0, 1), Cell::new(0, 0)], generated.sequence);
        assert_eq!(3, generated.board.get(Cell::new(0, 1)));
        assert_eq!(2, generated.board.get(Cell::new(0, 0)));
    }

    #[test]
    fn test_spaces_use_padding_cells() {
        let generated = generate("a. x y z b.", "a b", None);

        assert!(generated.placement.is_complete());
        assert_eq!(
            vec![Cell::new(0, 0), Cell::new(0, 3), Cell::new(1, 3)],
            generated.sequence
        );
        assert_eq!(2, generated.board.get(Cell::new(0, 3)));
        assert!(generated.board.is_consistent());
    }

    #[test]
    fn test_zero_budget_falls_back_to_greedy() {
        let generated = generate("Ab cd. Ef gh.", "ad", Some(0));

        assert!(generated.placement.exhausted);
        assert_eq!(0, generated.placement.steps);
        assert!(generated.placement.is_complete());
        assert_eq!(vec![Cell::new(0, 0), Cell::new(0, 1)], generated.sequence);
    }

    #[test]
    fn test_empty_secret() {
        let generated = generate("Ab cd.", "", None);

        assert!(generated.sequence.is_empty());
        assert!(generated.placement.is_complete());
        assert_eq!(Board::new(), generated.board);
    }

    #[test]
    fn test_placements_follow_sudoku_rules() {
        let cover = "The quick brown fox jumps over the lazy dog. \
            Pack my box with five dozen liquor jugs. \
            How vexingly quick daft zebras jump. \
            Sphinx of black quartz judge my vow. \
            Bright vixens jump dozy fowl quack.";
        let generated = generate(cover, "the sphinx jumps over a lazy fox", Some(100_000));

        assert!(generated.board.is_consistent());

        let unique: HashSet<Cell> = generated.sequence.iter().copied().collect();
        assert_eq!(generated.sequence.len(), unique.len());
        assert_eq!(generated.placement.placed, generated.sequence.len());
        assert_eq!(generated.board.filled(), generated.sequence.len());
        assert!(generated.sequence.iter().all(|cell| !generated.board.is_empty_at(*cell)));
    }
}
