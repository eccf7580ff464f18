//! Placement generation and application.
//!
//! A placement stamps one complete ship onto the board. Generation
//! enumerates every legal position for the largest ship class that still
//! needs placing; application commits the stamp, maintains the counters,
//! and immediately re-runs the propagator so the search tree stays pruned.

use crate::board::{Board, Cell, SegmentKind};
use crate::fleet::MAX_SHIP_LENGTH;
use crate::propagate;

/// Orientation of a ship on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// One complete ship stamped at an origin cell.
///
/// The segment pattern is implied by length and orientation: a lone
/// `Circle` for length 1, otherwise `Left..Right` or `Top..Bottom` with
/// `Middle` pieces between. Applying a placement onto cells that already
/// bear the exact pattern is a no-op, not a conflict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub row: i32,
    pub col: i32,
    pub length: usize,
    pub orientation: Orientation,
}

impl Placement {
    /// The segment kind stamped at offset `i` along the ship.
    pub fn kind_at(&self, i: usize) -> SegmentKind {
        if self.length == 1 {
            SegmentKind::Circle
        } else if i == 0 {
            match self.orientation {
                Orientation::Horizontal => SegmentKind::Left,
                Orientation::Vertical => SegmentKind::Top,
            }
        } else if i == self.length - 1 {
            match self.orientation {
                Orientation::Horizontal => SegmentKind::Right,
                Orientation::Vertical => SegmentKind::Bottom,
            }
        } else {
            SegmentKind::Middle
        }
    }

    /// Iterates the footprint as (row, col, segment kind) triples.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, SegmentKind)> + '_ {
        (0..self.length).map(move |i| {
            let (row, col) = match self.orientation {
                Orientation::Horizontal => (self.row, self.col + i as i32),
                Orientation::Vertical => (self.row + i as i32, self.col),
            };
            (row, col, self.kind_at(i))
        })
    }

    /// True when (`row`, `col`) lies inside the footprint.
    pub fn covers(&self, row: i32, col: i32) -> bool {
        let len = self.length as i32;
        match self.orientation {
            Orientation::Horizontal => {
                row == self.row && col >= self.col && col < self.col + len
            }
            Orientation::Vertical => {
                col == self.col && row >= self.row && row < self.row + len
            }
        }
    }
}

/// Enumerates every legal placement for the next ship class to be placed.
///
/// Classes are taken largest first; only the first class with a positive
/// remaining count is enumerated. Returns the empty list for an impossible
/// board — that is the terminal-failure signal the search driver relies on.
pub fn placements(board: &Board) -> Vec<Placement> {
    if board.is_impossible() {
        return Vec::new();
    }
    let Some(class) = board.fleet().next_unplaced() else {
        return Vec::new();
    };
    let length = class.length();

    let mut found = Vec::new();
    for row in 0..board.rows() {
        for col in 0..board.cols() {
            if length == 1 {
                // a submarine has no orientation to speak of
                let candidate = Placement {
                    row,
                    col,
                    length,
                    orientation: Orientation::Horizontal,
                };
                if admits(board, &candidate) {
                    found.push(candidate);
                }
            } else {
                for orientation in [Orientation::Vertical, Orientation::Horizontal] {
                    let candidate = Placement {
                        row,
                        col,
                        length,
                        orientation,
                    };
                    if admits(board, &candidate) {
                        found.push(candidate);
                    }
                }
            }
        }
    }
    found
}

/// Checks a candidate placement against the board.
fn admits(board: &Board, placement: &Placement) -> bool {
    debug_assert!((1..=MAX_SHIP_LENGTH).contains(&placement.length));

    // Footprint cells must be unknown, placeholders, or already bear the
    // exact segment the pattern would stamp. Boundary and water reject the
    // candidate outright, which also keeps the footprint on the board.
    let mut typed = 0;
    let mut unknown = 0;
    for (row, col, kind) in placement.cells() {
        match board.cell(row, col) {
            Cell::Unknown => unknown += 1,
            Cell::Placeholder => {}
            Cell::Segment { kind: existing, .. } if existing == kind => typed += 1,
            _ => return false,
        }
    }

    // stamping nothing new wastes a search step
    if typed == placement.length {
        return false;
    }

    // The no-touch border: every 8-neighbor of the footprint must still
    // admit water. Off-board neighbors count as water.
    let len = placement.length as i32;
    let (end_row, end_col) = match placement.orientation {
        Orientation::Horizontal => (placement.row + 1, placement.col + len),
        Orientation::Vertical => (placement.row + len, placement.col + 1),
    };
    for row in placement.row - 1..=end_row {
        for col in placement.col - 1..=end_col {
            if placement.covers(row, col) {
                continue;
            }
            if !board.cell(row, col).is_open() {
                return false;
            }
        }
    }

    // Line capacity: each still-unknown footprint cell draws one ship cell
    // from the line crossing it, and the line running along the ship must
    // hold all of them at once.
    for (row, col, _) in placement.cells() {
        if board.cell(row, col) == Cell::Unknown {
            let cross = match placement.orientation {
                Orientation::Horizontal => board.col_remaining(col),
                Orientation::Vertical => board.row_remaining(row),
            };
            if cross < 1 {
                return false;
            }
        }
    }
    let along = match placement.orientation {
        Orientation::Horizontal => board.row_remaining(placement.row),
        Orientation::Vertical => board.col_remaining(placement.col),
    };
    if along < unknown {
        return false;
    }

    true
}

/// Commits a placement to the board.
///
/// Line counters are decremented only for cells that were unknown; the
/// fleet counter is decremented once, and only if the stamp actually
/// changed a cell. Any real change re-runs the propagator to re-establish
/// the inference fixed point.
pub fn apply(board: &mut Board, placement: &Placement) {
    let mut changed = false;
    for (row, col, kind) in placement.cells() {
        let before = board.cell(row, col);
        if before == Cell::Unknown {
            board.take_from_lines(row, col);
        }
        board.set(
            row,
            col,
            Cell::Segment {
                kind,
                confirmed: false,
            },
        );
        changed |= board.cell(row, col) != before;
    }
    if changed {
        board.fleet_mut().take(placement.length);
        if board.fleet().in_deficit() {
            board.mark_impossible();
            return;
        }
        propagate::run(board);
    }
}
