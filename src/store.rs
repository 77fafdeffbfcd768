//! Named mazes and their solutions

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{anyhow, Context};

use crate::codec;
use crate::error::Result;
use crate::maze::Maze3d;
use crate::maze_generator::MazeGenerator;
use crate::search::{self, Solution, Strategy};

/// Registry of mazes and solutions, keyed by name
pub struct MazeStore {
    generator: MazeGenerator,
    mazes: HashMap<String, Maze3d>,
    solutions: HashMap<String, Solution>,
}

impl MazeStore {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            generator: MazeGenerator::new(seed),
            mazes: HashMap::new(),
            solutions: HashMap::new(),
        }
    }

    /// Generate a maze and store it under `name`, replacing any earlier one
    pub fn generate_maze(
        &mut self,
        name: &str,
        floors: usize,
        rows: usize,
        cols: usize,
    ) -> Result<&Maze3d> {
        let maze = self.generator.generate(floors, rows, cols)?;
        Ok(self.insert_maze(name, maze))
    }

    /// Store `maze` under `name`. A solution of the replaced maze is dropped.
    pub fn insert_maze(&mut self, name: &str, maze: Maze3d) -> &Maze3d {
        self.solutions.remove(name);
        self.mazes.insert(name.to_owned(), maze);
        &self.mazes[name]
    }

    pub fn get_maze(&self, name: &str) -> Option<&Maze3d> {
        self.mazes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.mazes.keys().map(String::as_str)
    }

    /// Solve maze `name` and keep the solution
    pub fn solve_maze(&mut self, name: &str, strategy: Strategy) -> anyhow::Result<&Solution> {
        let maze = self
            .mazes
            .get(name)
            .ok_or_else(|| anyhow!("No maze named `{}`", name))?;
        let solution = search::solve(maze, strategy)
            .with_context(|| format!("Failed to solve maze `{}` with {}", name, strategy))?;
        self.solutions.insert(name.to_owned(), solution);
        Ok(&self.solutions[name])
    }

    pub fn get_solution(&self, name: &str) -> Option<&Solution> {
        self.solutions.get(name)
    }

    /// Write maze `name` compressed into file `path`
    pub fn save_maze(&self, name: &str, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let maze = self
            .mazes
            .get(name)
            .ok_or_else(|| anyhow!("No maze named `{}`", name))?;
        save(maze, path)
    }

    /// Read a compressed maze from file `path`
    ///
    /// The maze is returned, not stored; use [MazeStore::insert_maze] to
    /// register it.
    pub fn load_maze(&self, path: impl AsRef<Path>) -> anyhow::Result<Maze3d> {
        load(path.as_ref())
    }
}

/// Write `maze` compressed into a new file at `path`
pub fn save(maze: &Maze3d, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create maze file {}", path.display()))?;
    codec::write_maze(maze, BufWriter::new(file))
        .with_context(|| format!("Failed to write maze file {}", path.display()))?;
    log::debug!("Saved {} cells to {}", maze.cell_count(), path.display());
    Ok(())
}

/// Read a compressed maze from the file at `path`
pub fn load(path: &Path) -> anyhow::Result<Maze3d> {
    let file =
        File::open(path).with_context(|| format!("Failed to open maze file {}", path.display()))?;
    let maze = codec::read_maze(BufReader::new(file))
        .with_context(|| format!("Failed to read maze file {}", path.display()))?;
    log::debug!("Loaded {} cells from {}", maze.cell_count(), path.display());
    Ok(maze)
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use std::process;

    use super::*;
    use crate::MazeError;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("maze3d-{}-{}.maze", process::id(), name))
    }

    #[test]
    fn generate_and_get() {
        let mut store = MazeStore::new(Some(0));
        store.generate_maze("cube", 2, 2, 2).unwrap();
        assert_eq!(store.get_maze("cube").unwrap().cell_count(), 8);
        assert!(store.get_maze("other").is_none());
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["cube"]);
    }

    #[test]
    fn generate_rejects_bad_dimensions() {
        let mut store = MazeStore::new(Some(0));
        assert!(matches!(
            store.generate_maze("flat", 0, 2, 2),
            Err(MazeError::InvalidDimension { .. })
        ));
        assert!(store.get_maze("flat").is_none());
    }

    #[test]
    fn solve_and_get_solution() {
        let mut store = MazeStore::new(Some(0));
        store.generate_maze("m", 2, 3, 3).unwrap();
        let steps = store.solve_maze("m", Strategy::BreadthFirst).unwrap().steps();
        assert_eq!(store.get_solution("m").unwrap().steps(), steps);
        assert!(store.solve_maze("missing", Strategy::DepthFirst).is_err());
    }

    #[test]
    fn replacing_maze_drops_solution() {
        let mut store = MazeStore::new(Some(0));
        store.generate_maze("m", 1, 3, 3).unwrap();
        store.solve_maze("m", Strategy::DepthFirst).unwrap();
        store.generate_maze("m", 1, 4, 4).unwrap();
        assert!(store.get_solution("m").is_none());
    }

    #[test]
    fn save_and_load() {
        let path = temp_path("save_and_load");
        let mut store = MazeStore::new(Some(9));
        store.generate_maze("m", 3, 4, 5).unwrap();
        store.save_maze("m", &path).unwrap();

        let loaded = store.load_maze(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(&loaded, store.get_maze("m").unwrap());

        store.insert_maze("copy", loaded);
        assert!(store.get_maze("copy").is_some());
    }

    #[test]
    fn load_missing_or_corrupt_file() {
        let store = MazeStore::new(None);
        assert!(store.load_maze(temp_path("does_not_exist")).is_err());

        let path = temp_path("corrupt");
        fs::write(&path, [0u8, 0, 0, 1, 0, 0]).unwrap();
        let result = store.load_maze(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn save_unknown_maze() {
        let store = MazeStore::new(None);
        assert!(store.save_maze("nope", temp_path("nope")).is_err());
    }
}
