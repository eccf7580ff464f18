//! Bimaru Solver
//!
//! Reads a Battleship-solitaire puzzle (row and column ship-cell totals plus
//! revealed cells), deduces as much as constraint propagation allows, and
//! searches depth-first for a complete fleet placement. The solved grid is
//! printed to stdout, one character per cell.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use bimaru::board::Board;
use bimaru::logging::init_logging;
use bimaru::parse::read_board;
use bimaru::puzzle::Puzzle;
use bimaru::search::Outcome;

/// Solves Bimaru (Battleship solitaire) puzzles.
#[derive(Parser)]
#[command(name = "bimaru")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a puzzle and print the completed grid.
    Solve {
        /// Puzzle file; stdin when omitted.
        input: Option<PathBuf>,
        /// Stop after expanding this many search nodes.
        #[arg(long)]
        max_nodes: Option<usize>,
    },
    /// Print the board after the initial propagation pass, without searching.
    Propagate {
        /// Puzzle file; stdin when omitted.
        input: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Solve { input, max_nodes }) => run_solve(input, max_nodes),
        Some(Command::Propagate { input }) => run_propagate(input),
        // default: solve from stdin
        None => run_solve(None, None),
    }
}

fn run_solve(input: Option<PathBuf>, max_nodes: Option<usize>) -> ExitCode {
    let board = match load(input) {
        Ok(board) => board,
        Err(err) => {
            eprintln!("{err:#}");
            return ExitCode::from(1);
        }
    };

    match Puzzle::new(board).solve(max_nodes) {
        Outcome::Solved(solution) => {
            print!("{solution}");
            ExitCode::SUCCESS
        }
        Outcome::Exhausted => {
            eprintln!("puzzle has no solution");
            ExitCode::from(2)
        }
        Outcome::OutOfBudget => {
            eprintln!("node budget spent before a solution was found");
            ExitCode::from(3)
        }
    }
}

fn run_propagate(input: Option<PathBuf>) -> ExitCode {
    match load(input) {
        Ok(board) => {
            print!("{board}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

/// Loads and propagates a puzzle from a file or stdin.
fn load(input: Option<PathBuf>) -> anyhow::Result<Board> {
    match input {
        Some(path) => {
            let file =
                File::open(&path).with_context(|| format!("opening {}", path.display()))?;
            read_board(BufReader::new(file))
                .with_context(|| format!("reading puzzle from {}", path.display()))
        }
        None => read_board(io::stdin().lock()).context("reading puzzle from stdin"),
    }
}
