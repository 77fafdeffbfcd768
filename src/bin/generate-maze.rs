//! CLI for maze generation

use std::path::PathBuf;

use clap::Parser;
use maze3d::MazeStore;

/// Generate a random three-dimensional maze and save it compressed
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of floors
    #[arg(long, default_value_t = 5)]
    floors: usize,

    /// Rows per floor
    #[arg(long, default_value_t = 10)]
    rows: usize,

    /// Columns per floor
    #[arg(long, default_value_t = 10)]
    cols: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// File, where to write the maze
    #[arg(short, long)]
    output: PathBuf,
}

/// Generate maze, write it to file
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut store = MazeStore::new(args.seed);
    let maze = store.generate_maze("generated", args.floors, args.rows, args.cols)?;
    let (start, goal) = (maze.start(), maze.goal());
    store.save_maze("generated", &args.output)?;

    println!(
        "Wrote {}x{}x{} maze from {} to {} into {}",
        args.floors,
        args.rows,
        args.cols,
        start,
        goal,
        args.output.display()
    );
    Ok(())
}
