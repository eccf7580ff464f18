//! The Bimaru puzzle as a search problem.
//!
//! Wraps a propagated starting board as the state machine consumed by the
//! generic driver: placements are the actions, cloning plus application is
//! the transition, and a goal is a contradiction-free board with nothing
//! left to place.

use crate::board::Board;
use crate::moves::{self, Placement};
use crate::search::{self, Outcome, Problem};

/// A puzzle instance holding the initial board.
pub struct Puzzle {
    initial: Board,
}

impl Puzzle {
    /// Wraps a loaded (and initially propagated) board.
    pub fn new(initial: Board) -> Self {
        Self { initial }
    }

    /// A fresh copy of the starting state.
    pub fn initial(&self) -> Board {
        self.initial.clone()
    }

    /// Runs the depth-first driver to the first goal state found.
    pub fn solve(&self, max_nodes: Option<usize>) -> Outcome<Board> {
        search::depth_first_tree_search(self, self.initial(), max_nodes)
    }
}

impl Problem for Puzzle {
    type State = Board;
    type Action = Placement;

    fn actions(&self, board: &Board) -> Vec<Placement> {
        moves::placements(board)
    }

    fn result(&self, board: &Board, action: &Placement) -> Board {
        let mut next = board.clone();
        moves::apply(&mut next, action);
        next
    }

    fn is_goal(&self, board: &Board) -> bool {
        !board.is_impossible()
            && board.fleet().all_placed()
            && board.lines_settled()
            && board.fully_resolved()
    }
}
