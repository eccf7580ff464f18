//! Fixed-point constraint propagation.
//!
//! Repeatedly applies the deterministic Bimaru inference rules until a full
//! scan makes no progress, then upgrades unambiguous placeholder runs to
//! concrete ships. Propagation never chooses between alternatives; anything
//! ambiguous is left for the search driver. A contradiction is recorded on
//! the board's `impossible` flag and never raised as an error, because dead
//! branches are the normal currency of backtracking.

use crate::board::{Board, Cell, SegmentKind};
use crate::fleet::MAX_SHIP_LENGTH;
use crate::moves::{self, Orientation, Placement};

/// Drives the board to the inference fixed point.
///
/// Per iteration: negative line counters kill the branch; exhausted lines
/// flood their unknown cells with water; every ship cell shades its
/// neighborhood; and a line whose remaining count equals its unknown-cell
/// count commits those cells as placeholders. After the fixed point,
/// [`complete_runs`] converts provably-determined runs into full ships.
pub fn run(board: &mut Board) {
    if board.is_impossible() {
        return;
    }
    let mut changed = true;
    while changed {
        changed = false;
        if board.lines_in_deficit() {
            board.mark_impossible();
        }
        if board.is_impossible() {
            return;
        }

        for row in 0..board.rows() {
            for col in 0..board.cols() {
                let cell = board.cell(row, col);
                if cell == Cell::Unknown
                    && (board.row_remaining(row) == 0 || board.col_remaining(col) == 0)
                {
                    board.set(row, col, Cell::Water { confirmed: false });
                    changed = true;
                } else if cell.is_ship() {
                    changed |= shade_around(board, row, col);
                    if board.is_impossible() {
                        return;
                    }
                }
            }
        }

        for row in 0..board.rows() {
            let unknown = (0..board.cols())
                .filter(|&col| board.cell(row, col) == Cell::Unknown)
                .count() as i32;
            if unknown > 0 && unknown == board.row_remaining(row) {
                for col in 0..board.cols() {
                    if board.cell(row, col) == Cell::Unknown {
                        if !placeholder_fits(board, row, col) {
                            board.mark_impossible();
                            return;
                        }
                        board.set(row, col, Cell::Placeholder);
                        board.take_from_lines(row, col);
                        shade_around(board, row, col);
                        if board.is_impossible() {
                            return;
                        }
                        changed = true;
                    }
                }
            }
        }

        for col in 0..board.cols() {
            let unknown = (0..board.rows())
                .filter(|&row| board.cell(row, col) == Cell::Unknown)
                .count() as i32;
            if unknown > 0 && unknown == board.col_remaining(col) {
                for row in 0..board.rows() {
                    if board.cell(row, col) == Cell::Unknown {
                        if !placeholder_fits(board, row, col) {
                            board.mark_impossible();
                            return;
                        }
                        board.set(row, col, Cell::Placeholder);
                        board.take_from_lines(row, col);
                        shade_around(board, row, col);
                        if board.is_impossible() {
                            return;
                        }
                        changed = true;
                    }
                }
            }
        }
    }

    complete_runs(board);
}

/// Marks (`row`, `col`) as forced water.
///
/// Finding a ship there is the forced-water-versus-forced-ship clash that
/// kills the branch.
fn force_water(board: &mut Board, row: i32, col: i32) -> bool {
    match board.cell(row, col) {
        Cell::Unknown => {
            board.set(row, col, Cell::Water { confirmed: false });
            true
        }
        Cell::Placeholder | Cell::Segment { .. } => {
            board.mark_impossible();
            false
        }
        _ => false,
    }
}

/// Marks (`row`, `col`) as a forced ship continuation.
///
/// Water (or the board edge) where a ship must continue kills the branch.
fn force_ship(board: &mut Board, row: i32, col: i32) -> bool {
    match board.cell(row, col) {
        Cell::Unknown => {
            board.set(row, col, Cell::Placeholder);
            board.take_from_lines(row, col);
            true
        }
        Cell::Water { .. } | Cell::Boundary => {
            board.mark_impossible();
            false
        }
        _ => false,
    }
}

/// Shades the neighborhood of the ship cell at (`row`, `col`).
///
/// Diagonal neighbors of any ship cell are water. Directional segments
/// force the continuation cell in their growth direction and water the
/// opposite cell; a middle piece whose orientation is pinned by a wall or
/// water grows both ways along its ship; a circle is walled in on all four
/// sides.
fn shade_around(board: &mut Board, row: i32, col: i32) -> bool {
    let mut changed = false;
    for (dr, dc) in [(-1, -1), (-1, 1), (1, -1), (1, 1)] {
        changed |= force_water(board, row + dr, col + dc);
        if board.is_impossible() {
            return changed;
        }
    }

    let Some(kind) = board.cell(row, col).kind() else {
        return changed;
    };
    match kind {
        SegmentKind::Top => {
            changed |= force_ship(board, row + 1, col);
            changed |= force_water(board, row - 1, col);
        }
        SegmentKind::Bottom => {
            changed |= force_ship(board, row - 1, col);
            changed |= force_water(board, row + 1, col);
        }
        SegmentKind::Left => {
            changed |= force_ship(board, row, col + 1);
            changed |= force_water(board, row, col - 1);
        }
        SegmentKind::Right => {
            changed |= force_ship(board, row, col - 1);
            changed |= force_water(board, row, col + 1);
        }
        SegmentKind::Middle => {
            if board.cell(row - 1, col).is_water() || board.cell(row + 1, col).is_water() {
                changed |= force_ship(board, row, col - 1);
                changed |= force_ship(board, row, col + 1);
            } else if board.cell(row, col - 1).is_water() || board.cell(row, col + 1).is_water() {
                changed |= force_ship(board, row - 1, col);
                changed |= force_ship(board, row + 1, col);
            }
        }
        SegmentKind::Circle => {
            changed |= force_water(board, row - 1, col);
            changed |= force_water(board, row + 1, col);
            changed |= force_water(board, row, col - 1);
            changed |= force_water(board, row, col + 1);
        }
    }
    changed
}

/// Verifies that a placeholder at (`row`, `col`) is consistent with its
/// neighborhood before an exhausted-line fill commits it.
///
/// Orthogonal neighbors must be open, placeholders, or segments a ship run
/// through this cell could continue into; diagonal neighbors must admit
/// water.
fn placeholder_fits(board: &Board, row: i32, col: i32) -> bool {
    let continues = |cell: Cell, towards: SegmentKind| -> bool {
        cell.is_open()
            || cell == Cell::Placeholder
            || matches!(cell.kind(), Some(k) if k == SegmentKind::Middle || k == towards)
    };
    continues(board.cell(row, col + 1), SegmentKind::Right)
        && continues(board.cell(row, col - 1), SegmentKind::Left)
        && continues(board.cell(row + 1, col), SegmentKind::Bottom)
        && continues(board.cell(row - 1, col), SegmentKind::Top)
        && board.cell(row - 1, col - 1).is_open()
        && board.cell(row - 1, col + 1).is_open()
        && board.cell(row + 1, col - 1).is_open()
        && board.cell(row + 1, col + 1).is_open()
}

/// Upgrades every placeholder whose ship is fully determined.
///
/// A placeholder walled in on all four sides is a submarine. A run bounded
/// by water at both ends with length 2..=4, starting at a placeholder or at
/// a confirmed `Top`/`Left` hint and still containing a placeholder, is
/// committed as a complete ship through the move applier, which decrements
/// the fleet and re-propagates.
fn complete_runs(board: &mut Board) {
    for row in 0..board.rows() {
        for col in 0..board.cols() {
            if board.is_impossible() {
                return;
            }
            let cell = board.cell(row, col);
            if cell == Cell::Placeholder
                && board.cell(row - 1, col).is_water()
                && board.cell(row, col - 1).is_water()
            {
                if board.cell(row + 1, col).is_water() && board.cell(row, col + 1).is_water() {
                    board.set(
                        row,
                        col,
                        Cell::Segment {
                            kind: SegmentKind::Circle,
                            confirmed: false,
                        },
                    );
                    board.fleet_mut().take(1);
                    if board.fleet().in_deficit() {
                        board.mark_impossible();
                        return;
                    }
                    continue;
                }
                try_complete(board, row, col, Orientation::Horizontal);
                if board.is_impossible() {
                    return;
                }
                try_complete(board, row, col, Orientation::Vertical);
            } else if cell.confirmed_kind() == Some(SegmentKind::Left) {
                try_complete(board, row, col, Orientation::Horizontal);
            } else if cell.confirmed_kind() == Some(SegmentKind::Top) {
                try_complete(board, row, col, Orientation::Vertical);
            }
        }
    }
}

/// Walks the run starting at (`row`, `col`) and commits it when its length
/// is provably a single specific ship.
fn try_complete(board: &mut Board, row: i32, col: i32, orientation: Orientation) {
    let (dr, dc, end_kind) = match orientation {
        Orientation::Horizontal => (0, 1, SegmentKind::Right),
        Orientation::Vertical => (1, 0, SegmentKind::Bottom),
    };

    let mut length = 1usize;
    let mut bounded = false;
    let mut has_placeholder = board.cell(row, col) == Cell::Placeholder;
    for i in 1..=MAX_SHIP_LENGTH as i32 {
        let cell = board.cell(row + dr * i, col + dc * i);
        match cell {
            Cell::Placeholder => {
                length += 1;
                has_placeholder = true;
            }
            Cell::Segment { kind, .. } if kind == SegmentKind::Middle || kind == end_kind => {
                length += 1;
            }
            cell if cell.is_water() => {
                bounded = true;
                break;
            }
            _ => break,
        }
    }

    if bounded && (2..=MAX_SHIP_LENGTH).contains(&length) && has_placeholder {
        moves::apply(
            board,
            &Placement {
                row,
                col,
                length,
                orientation,
            },
        );
    }
}
