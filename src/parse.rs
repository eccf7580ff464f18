//! Puzzle input parsing.
//!
//! Line-oriented text format:
//!
//! ```text
//! ROWS 2 0 2 0 2 0
//! COLUMNS 0 0 3 3 0 0
//! FLEET 0 0 3 0
//! 1
//! HINT 0 2 L
//! ```
//!
//! The `FLEET` line (battleships, cruisers, destroyers, submarines) is
//! optional and defaults to the standard 1/2/3/4 composition. Hint letters
//! are the confirmed segment vocabulary `T B L R M C` plus `W` for water.
//! Every malformed-input condition is rejected here, before any search
//! begins; a well-formed puzzle that happens to have no solution is not a
//! parse error.

use std::fmt;
use std::io::BufRead;

use log::debug;

use crate::board::{Board, Cell, SegmentKind};
use crate::fleet::{Fleet, CLASSES, MAX_SHIP_LENGTH};
use crate::propagate;

/// Errors produced while loading a puzzle. All are fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input ended before the expected line.
    MissingLine(&'static str),
    /// A line did not start with the expected keyword.
    ExpectedKeyword(&'static str),
    /// A numeric field failed to parse or was negative.
    InvalidCount(String),
    /// Row, column, and fleet cell totals must agree.
    TotalsMismatch { rows: i32, cols: i32, fleet: i32 },
    /// Hint coordinates outside the grid.
    HintOutOfBounds { row: i32, col: i32 },
    /// Two hints for the same cell.
    DuplicateHint { row: i32, col: i32 },
    /// Hint letter outside the `T B L R M C W` vocabulary.
    UnknownLetter(String),
    /// Underlying reader failure.
    Io(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingLine(what) => write!(f, "input ended before the {what} line"),
            ParseError::ExpectedKeyword(word) => write!(f, "expected a line starting with {word}"),
            ParseError::InvalidCount(field) => write!(f, "invalid count in {field}"),
            ParseError::TotalsMismatch { rows, cols, fleet } => write!(
                f,
                "inconsistent totals: rows sum to {rows}, columns to {cols}, fleet occupies {fleet} cells"
            ),
            ParseError::HintOutOfBounds { row, col } => {
                write!(f, "hint at ({row}, {col}) is outside the grid")
            }
            ParseError::DuplicateHint { row, col } => {
                write!(f, "duplicate hint at ({row}, {col})")
            }
            ParseError::UnknownLetter(letter) => write!(f, "unknown hint letter {letter:?}"),
            ParseError::Io(err) => write!(f, "read failed: {err}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Reads a puzzle, settles fully-confirmed hint runs against the fleet, and
/// runs the first propagation pass.
pub fn read_board(reader: impl BufRead) -> Result<Board, ParseError> {
    let mut lines = reader.lines();
    let mut next_line = move |what: &'static str| -> Result<String, ParseError> {
        match lines.next() {
            Some(Ok(line)) => Ok(line),
            Some(Err(err)) => Err(ParseError::Io(err.to_string())),
            None => Err(ParseError::MissingLine(what)),
        }
    };

    let row_totals = keyword_counts(&next_line("ROWS")?, "ROWS")?;
    let col_totals = keyword_counts(&next_line("COLUMNS")?, "COLUMNS")?;

    // the FLEET line is optional; without it the next line is the hint count
    let mut line = next_line("hint count")?;
    let fleet = if line.trim_start().starts_with("FLEET") {
        let counts = keyword_counts(&line, "FLEET")?;
        if counts.len() != CLASSES.len() {
            return Err(ParseError::InvalidCount("FLEET".into()));
        }
        line = next_line("hint count")?;
        Fleet::new([counts[0], counts[1], counts[2], counts[3]])
    } else {
        Fleet::standard()
    };

    let rows_sum: i32 = row_totals.iter().sum();
    let cols_sum: i32 = col_totals.iter().sum();
    if rows_sum != cols_sum || rows_sum != fleet.total_cells() {
        return Err(ParseError::TotalsMismatch {
            rows: rows_sum,
            cols: cols_sum,
            fleet: fleet.total_cells(),
        });
    }

    let hint_count: usize = line
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidCount("hint count".into()))?;

    let mut board = Board::new(row_totals, col_totals, fleet);
    for _ in 0..hint_count {
        let line = next_line("HINT")?;
        let (row, col, letter) = hint_fields(&line)?;
        if row < 0 || row >= board.rows() || col < 0 || col >= board.cols() {
            return Err(ParseError::HintOutOfBounds { row, col });
        }
        if board.cell(row, col) != Cell::Unknown {
            return Err(ParseError::DuplicateHint { row, col });
        }
        match letter_cell(letter)? {
            Cell::Water { .. } => board.set(row, col, Cell::Water { confirmed: true }),
            cell => {
                board.set(row, col, cell);
                board.take_from_lines(row, col);
            }
        }
    }

    debug!(
        "parsed {}x{} board with {hint_count} hints",
        board.rows(),
        board.cols()
    );

    settle_confirmed_ships(&mut board);
    propagate::run(&mut board);
    Ok(board)
}

/// Parses `KEYWORD n0 n1 ...` into non-negative counts.
fn keyword_counts(line: &str, keyword: &'static str) -> Result<Vec<i32>, ParseError> {
    let mut fields = line.split_whitespace();
    if fields.next() != Some(keyword) {
        return Err(ParseError::ExpectedKeyword(keyword));
    }
    let counts = fields
        .map(|field| match field.parse::<i32>() {
            Ok(n) if n >= 0 => Ok(n),
            _ => Err(ParseError::InvalidCount(keyword.into())),
        })
        .collect::<Result<Vec<i32>, ParseError>>()?;
    if counts.is_empty() {
        return Err(ParseError::InvalidCount(keyword.into()));
    }
    Ok(counts)
}

/// Parses `HINT <row> <col> <letter>`.
fn hint_fields(line: &str) -> Result<(i32, i32, &str), ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.first() != Some(&"HINT") {
        return Err(ParseError::ExpectedKeyword("HINT"));
    }
    if fields.len() != 4 {
        return Err(ParseError::InvalidCount("HINT".into()));
    }
    let row = fields[1]
        .parse()
        .map_err(|_| ParseError::InvalidCount("HINT".into()))?;
    let col = fields[2]
        .parse()
        .map_err(|_| ParseError::InvalidCount("HINT".into()))?;
    Ok((row, col, fields[3]))
}

/// Maps a hint letter to its confirmed cell value.
fn letter_cell(letter: &str) -> Result<Cell, ParseError> {
    let kind = match letter {
        "W" => return Ok(Cell::Water { confirmed: true }),
        "T" => SegmentKind::Top,
        "B" => SegmentKind::Bottom,
        "L" => SegmentKind::Left,
        "R" => SegmentKind::Right,
        "M" => SegmentKind::Middle,
        "C" => SegmentKind::Circle,
        other => return Err(ParseError::UnknownLetter(other.into())),
    };
    Ok(Cell::Segment {
        kind,
        confirmed: true,
    })
}

/// Deducts hint runs that already spell out a complete ship from the fleet.
///
/// A confirmed `C` is a placed submarine; a confirmed `T`/`L` followed by
/// confirmed middles and the matching confirmed endpoint is a placed ship of
/// that length. Partial runs are left for propagation and search, which
/// deduct the fleet when they complete them.
fn settle_confirmed_ships(board: &mut Board) {
    for row in 0..board.rows() {
        for col in 0..board.cols() {
            match board.cell(row, col).confirmed_kind() {
                Some(SegmentKind::Circle) => board.fleet_mut().take(1),
                Some(SegmentKind::Top) => {
                    if let Some(length) = confirmed_run(board, row, col, 1, 0, SegmentKind::Bottom)
                    {
                        board.fleet_mut().take(length);
                    }
                }
                Some(SegmentKind::Left) => {
                    if let Some(length) = confirmed_run(board, row, col, 0, 1, SegmentKind::Right)
                    {
                        board.fleet_mut().take(length);
                    }
                }
                _ => {}
            }
        }
    }
    if board.fleet().in_deficit() {
        board.mark_impossible();
    }
}

/// Length of the fully-confirmed run from (`row`, `col`) towards
/// (`dr`, `dc`), if it ends in `end_kind` within the longest ship length.
fn confirmed_run(
    board: &Board,
    row: i32,
    col: i32,
    dr: i32,
    dc: i32,
    end_kind: SegmentKind,
) -> Option<usize> {
    for i in 1..MAX_SHIP_LENGTH as i32 {
        match board.cell(row + dr * i, col + dc * i).confirmed_kind() {
            Some(kind) if kind == end_kind => return Some(i as usize + 1),
            Some(SegmentKind::Middle) => continue,
            _ => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Board, ParseError> {
        read_board(Cursor::new(text))
    }

    #[test]
    fn test_reads_a_minimal_puzzle() {
        let board = parse("ROWS 1 0\nCOLUMNS 1 0\nFLEET 0 0 0 1\n0\n").unwrap();
        assert_eq!(board.rows(), 2);
        assert_eq!(board.cols(), 2);
        // propagation already finished this one
        assert!(board.fully_resolved());
        assert_eq!(board.cell(0, 0).kind(), Some(SegmentKind::Circle));
    }

    #[test]
    fn test_default_fleet_is_standard() {
        // 10x10 with 20 ship cells parses without a FLEET line
        let board = parse(concat!(
            "ROWS 5 2 4 1 1 3 0 1 0 3\n",
            "COLUMNS 6 1 1 2 2 2 0 2 0 4\n",
            "0\n"
        ))
        .unwrap();
        assert_eq!(board.fleet().remaining(4) + board.fleet().remaining(1), 5);
    }

    #[test]
    fn test_rejects_mismatched_totals() {
        let err = parse("ROWS 2 0\nCOLUMNS 1 0\nFLEET 0 0 1 0\n0\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::TotalsMismatch {
                rows: 2,
                cols: 1,
                fleet: 2
            }
        );
    }

    #[test]
    fn test_rejects_fleet_disagreeing_with_totals() {
        let err = parse("ROWS 1 0\nCOLUMNS 1 0\nFLEET 0 0 1 0\n0\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::TotalsMismatch {
                rows: 1,
                cols: 1,
                fleet: 2
            }
        );
    }

    #[test]
    fn test_rejects_bad_headers() {
        assert_eq!(
            parse("COLUMNS 1\nROWS 1\n0\n").unwrap_err(),
            ParseError::ExpectedKeyword("ROWS")
        );
        assert_eq!(
            parse("ROWS 1 -2\nCOLUMNS 1\n0\n").unwrap_err(),
            ParseError::InvalidCount("ROWS".into())
        );
        assert_eq!(parse("ROWS 1 0\n").unwrap_err(), ParseError::MissingLine("COLUMNS"));
        assert_eq!(
            parse("ROWS 1 0\nCOLUMNS 1 0\nFLEET 0 0 0 1\n").unwrap_err(),
            ParseError::MissingLine("hint count")
        );
    }

    #[test]
    fn test_rejects_bad_hints() {
        let header = "ROWS 1 0\nCOLUMNS 1 0\nFLEET 0 0 0 1\n";
        assert_eq!(
            parse(&format!("{header}1\nHINT 5 0 C\n")).unwrap_err(),
            ParseError::HintOutOfBounds { row: 5, col: 0 }
        );
        assert_eq!(
            parse(&format!("{header}1\nHINT 0 0 Q\n")).unwrap_err(),
            ParseError::UnknownLetter("Q".into())
        );
        assert_eq!(
            parse(&format!("{header}2\nHINT 0 0 C\nHINT 0 0 C\n")).unwrap_err(),
            ParseError::DuplicateHint { row: 0, col: 0 }
        );
        assert_eq!(
            parse(&format!("{header}1\nHINT 0 0\n")).unwrap_err(),
            ParseError::InvalidCount("HINT".into())
        );
    }

    #[test]
    fn test_water_hints_do_not_touch_the_counters() {
        let board = parse("ROWS 0 1\nCOLUMNS 0 1\nFLEET 0 0 0 1\n1\nHINT 0 0 W\n").unwrap();
        assert_eq!(board.cell(0, 0), Cell::Water { confirmed: true });
        // the submarine was still forced into the only open cell
        assert_eq!(board.cell(1, 1).kind(), Some(SegmentKind::Circle));
        assert!(board.lines_settled());
    }

    #[test]
    fn test_confirmed_circle_settles_a_submarine() {
        let board = parse("ROWS 1 0\nCOLUMNS 1 0\nFLEET 0 0 0 1\n1\nHINT 0 0 C\n").unwrap();
        assert!(board.fleet().all_placed());
        assert!(!board.is_impossible());
    }

    fn hint(board: &mut Board, row: i32, col: i32, kind: SegmentKind) {
        board.set(
            row,
            col,
            Cell::Segment {
                kind,
                confirmed: true,
            },
        );
        board.take_from_lines(row, col);
    }

    #[test]
    fn test_settles_complete_runs_of_every_length() {
        for (length, kinds) in [
            (2, vec![SegmentKind::Top, SegmentKind::Bottom]),
            (
                3,
                vec![SegmentKind::Top, SegmentKind::Middle, SegmentKind::Bottom],
            ),
            (
                4,
                vec![
                    SegmentKind::Top,
                    SegmentKind::Middle,
                    SegmentKind::Middle,
                    SegmentKind::Bottom,
                ],
            ),
        ] {
            let mut counts = [0; 4];
            counts[4 - length] = 1;
            let mut board = Board::new(vec![1; 6], vec![6, 0, 0, 0, 0, 0], Fleet::new(counts));
            for (i, &kind) in kinds.iter().enumerate() {
                hint(&mut board, i as i32, 0, kind);
            }
            settle_confirmed_ships(&mut board);
            assert_eq!(
                board.fleet().remaining(length),
                0,
                "length {length} run was not settled"
            );
        }
    }

    #[test]
    fn test_partial_runs_are_not_settled() {
        // T over M without a confirmed B leaves the fleet untouched;
        // the run completes later through propagation or search.
        let mut board = Board::new(vec![1; 6], vec![6, 0, 0, 0, 0, 0], Fleet::new([0, 1, 0, 0]));
        hint(&mut board, 0, 0, SegmentKind::Top);
        hint(&mut board, 1, 0, SegmentKind::Middle);
        settle_confirmed_ships(&mut board);
        assert_eq!(board.fleet().remaining(3), 1);

        // end-of-run hints alone settle nothing either
        let mut board = Board::new(vec![1; 6], vec![6, 0, 0, 0, 0, 0], Fleet::new([0, 1, 0, 0]));
        hint(&mut board, 2, 0, SegmentKind::Bottom);
        settle_confirmed_ships(&mut board);
        assert_eq!(board.fleet().remaining(3), 1);
    }

    #[test]
    fn test_settles_horizontal_runs() {
        let mut board = Board::new(vec![3, 0, 0], vec![1, 1, 1], Fleet::new([0, 1, 0, 0]));
        hint(&mut board, 0, 0, SegmentKind::Left);
        hint(&mut board, 0, 1, SegmentKind::Middle);
        hint(&mut board, 0, 2, SegmentKind::Right);
        settle_confirmed_ships(&mut board);
        assert!(board.fleet().all_placed());
    }
}
