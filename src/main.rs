//! CLI for maze solving

use std::path::PathBuf;

use clap::Parser;
use maze3d::{MazeStore, Strategy};

/// Find a path through a saved three-dimensional maze
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Search strategy: `bfs` or `dfs`
    #[arg(short, long, default_value = "bfs")]
    strategy: Strategy,

    /// Print the cells along the path
    #[arg(short, long)]
    path: bool,

    /// Compressed maze file, as written by `generate-maze`
    file: PathBuf,
}

/// Read maze from file, print output
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut store = MazeStore::new(None);
    let maze = store.load_maze(&args.file)?;
    let name = args.file.display().to_string();
    store.insert_maze(&name, maze);

    let solution = store.solve_maze(&name, args.strategy)?;
    solution.print_report();
    if args.path {
        for cell in &solution.path {
            println!("{}", cell);
        }
    }
    Ok(())
}
