use anyhow::{Context, Result, bail};
use clap::Parser;
use pegsolitaire_common::{board::Board, moves::format_moves, position::Position};
use pegsolitaire_solver::{DEFAULT_PRUNE_WIDTH, DedupMode, PruneLimit, PruningSearch};

use std::{
    io::{IsTerminal, Read, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Built-in board layout (english, european, or WxH for a rectangle)
    #[arg(short, long, value_name = "NAME")]
    board: Option<String>,
    /// Empty starting hole as X,Y (defaults to the board centre)
    #[arg(short, long, value_name = "X,Y")]
    empty: Option<String>,
    /// Beam width: positions kept per generation after pruning
    #[arg(short, long, default_value_t = DEFAULT_PRUNE_WIDTH, value_name = "NUM")]
    prune: usize,
    /// Explore the full breadth of every generation (no pruning)
    #[arg(long)]
    exhaustive: bool,
    /// Deduplicate by exact occupancy instead of the symmetry-folded id
    #[arg(long)]
    exact_dedup: bool,
    /// Print per-generation statistics to stderr
    #[arg(short, long)]
    verbose: bool,
    /// Preview the initial position without solving
    #[arg(long)]
    preview: bool,
    /// Path to a board layout file ('o' hole, '-' blocked)
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let board = load_board(&cli)?;
    let (x, y) = match &cli.empty {
        Some(value) => parse_cell(value)?,
        None => (board.width() / 2, board.height() / 2),
    };
    let initial = Position::initial(&board, x, y)
        .with_context(|| format!("Cannot start with the empty hole at ({x}, {y})"))?;
    println!("{}\n", initial.pretty_print());
    if cli.preview {
        return Ok(());
    }

    let mut search = PruningSearch::new(initial);
    search.prune(if cli.exhaustive {
        PruneLimit::Unbounded
    } else {
        PruneLimit::Bounded(cli.prune)
    });
    if cli.exact_dedup {
        search.set_dedup_mode(DedupMode::Exact);
    }
    if cli.verbose {
        search.on_generation(|generation, size| {
            eprintln!("generation {generation}: {size} positions");
        });
    }

    let timer = Instant::now();
    let solutions = search.search();
    let elapsed = format_elapsed(timer.elapsed());
    if solutions == 0 {
        bail!(
            "No solution found after {} generations; try a wider --prune.",
            search.generations()
        );
    }

    let moves = search.solution(0).context("Missing solution moves")?;
    println!(
        "✓ Solved in {} moves — Solutions: {solutions}, Generations: {}, Time: {elapsed}\n",
        moves.len(),
        search.generations()
    );
    println!("{}\n", format_moves(moves, &board));
    let final_position = search.final_position(0).context("Missing final position")?;
    println!("{}", final_position.pretty_print());

    Ok(())
}

fn load_board(cli: &Cli) -> Result<Board> {
    if let Some(file) = &cli.file {
        let content = std::fs::read_to_string(file)?;
        return Board::parse(&content).context("Failed to parse board file");
    }
    if let Some(name) = &cli.board {
        return preset_board(name);
    }
    if !stdin().is_terminal() {
        let mut content = String::new();
        stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
        return Board::parse(&content).context("Failed to parse board from stdin");
    }
    bail!("No board layout `file` or `--board` provided.");
}

fn preset_board(name: &str) -> Result<Board> {
    match name {
        "english" => Ok(Board::english()),
        "european" => Ok(Board::european()),
        other => {
            let Some((width, height)) = other.split_once('x') else {
                bail!("Unknown board '{other}'; expected english, european, or WxH.");
            };
            let width = width.parse().context("Invalid board width")?;
            let height = height.parse().context("Invalid board height")?;
            Ok(Board::rectangle(width, height)?)
        }
    }
}

fn parse_cell(value: &str) -> Result<(usize, usize)> {
    let Some((x, y)) = value.split_once(',') else {
        bail!("Invalid cell '{value}'; expected X,Y.");
    };
    Ok((
        x.trim().parse().context("Invalid X coordinate")?,
        y.trim().parse().context("Invalid Y coordinate")?,
    ))
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 90 {
        format!("{secs}.{:03}s", elapsed.subsec_millis())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
