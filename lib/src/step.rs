//! Advancing the board by one generation.
//!
//! The neighborhood of a cell is the clamped 3×3 window around it: cells
//! beyond the edge of the board do not exist, so corner cells have 3
//! neighbors, edge cells 5 and interior cells 8. There is no wraparound.

use crate::{
    board::Board,
    rules::{RuleSet, MAX_NEIGHBORS},
};

/// Number of living cells in the clamped Moore neighborhood of
/// `(row, col)`, not counting the cell itself.
///
/// A cell off the board has no neighbors.
pub fn neighbor_count(board: &Board, row: usize, col: usize) -> u32 {
    let size = board.size();
    if row >= size || col >= size {
        return 0;
    }
    let mut count = 0;
    for i in row.saturating_sub(1)..=row.saturating_add(1).min(size - 1) {
        for j in col.saturating_sub(1)..=col.saturating_add(1).min(size - 1) {
            if (i, j) != (row, col) && board.get((i, j)).map_or(false, |s| s.is_alive()) {
                count += 1;
            }
        }
    }
    debug_assert!(count <= MAX_NEIGHBORS);
    count
}

/// Computes the next generation of `board` under `rules`.
///
/// Always returns a new board of the same size; `board` itself is only read.
pub fn step(board: &Board, rules: &RuleSet) -> Board {
    let cells = board
        .rows()
        .enumerate()
        .flat_map(|(row, cells)| {
            cells.iter().enumerate().map(move |(col, &state)| {
                rules.next_state(state, neighbor_count(board, row, col))
            })
        })
        .collect();
    Board::from_cells(board.size(), cells)
}

/// One generation of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    /// Generation number. The initial board is generation 0.
    pub number: u64,
    /// The board in this generation.
    pub board: Board,
}

impl Generation {
    /// Number of living cells in this generation.
    pub fn live_cells(&self) -> usize {
        self.board.population()
    }
}

/// An iterator over the first `count` generations starting from a board.
///
/// The first item is the initial board itself as generation 0.
pub struct Generations<'a> {
    rules: &'a RuleSet,
    board: Option<Board>,
    number: u64,
    count: u64,
}

impl<'a> Generations<'a> {
    pub fn new(initial: Board, rules: &'a RuleSet, count: u64) -> Self {
        Generations {
            rules,
            board: Some(initial),
            number: 0,
            count,
        }
    }
}

impl<'a> Iterator for Generations<'a> {
    type Item = Generation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.number >= self.count {
            return None;
        }
        let board = self.board.take()?;
        // The last generation is never stepped past.
        if self.number + 1 < self.count {
            self.board = Some(step(&board, self.rules));
        }
        let generation = Generation {
            number: self.number,
            board,
        };
        self.number += 1;
        Some(generation)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.number) as usize;
        (remaining, Some(remaining))
    }
}
