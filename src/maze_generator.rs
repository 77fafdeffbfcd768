//! Maze generation

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::error::Result;
use crate::maze::{Cell, Direction, Maze3d, MazeBuilder};

/// Random maze generator
pub struct MazeGenerator {
    random: StdRng,
}

impl MazeGenerator {
    /// Create generator. With `seed`, generated mazes are reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            random: if let Some(state) = seed {
                StdRng::seed_from_u64(state)
            } else {
                StdRng::from_entropy()
            },
        }
    }

    /// Generate a perfect maze (exactly one path between any two cells)
    ///
    /// Randomized Prim's algorithm: start with all walls present and only
    /// `(0, 0, 0)` visited. Repeatedly take a random cell from the frontier
    /// of unvisited cells next to the visited area, and knock down the wall
    /// towards one of its visited neighbours, chosen at random.
    ///
    /// Start is `(0, 0, 0)` and goal the opposite corner
    /// `(floors - 1, rows - 1, cols - 1)`.
    ///
    /// Returns [crate::MazeError::InvalidDimension] if any dimension is zero.
    pub fn generate(&mut self, floors: usize, rows: usize, cols: usize) -> Result<Maze3d> {
        let mut builder = MazeBuilder::new(floors, rows, cols)?;
        let count = builder.cell_count();
        let mut visited = vec![false; count];
        let mut in_frontier = vec![false; count];
        let mut frontier: Vec<Cell> = Vec::new();

        let mut cell = Cell::new(0, 0, 0);
        loop {
            visited[builder.index_of(cell)] = true;
            for next in Direction::ALL
                .into_iter()
                .filter_map(|d| builder.neighbor(cell, d))
            {
                let i = builder.index_of(next);
                if !visited[i] && !in_frontier[i] {
                    in_frontier[i] = true;
                    frontier.push(next);
                }
            }

            if frontier.is_empty() {
                break;
            }
            cell = frontier.swap_remove(self.random.gen_range(0..frontier.len()));

            let towards_visited: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|&d| {
                    builder
                        .neighbor(cell, d)
                        .is_some_and(|n| visited[builder.index_of(n)])
                })
                .collect();
            // Frontier cells always border the visited area
            if let Some(&direction) = towards_visited.choose(&mut self.random) {
                builder.carve(cell, direction)?;
            }
        }

        log::debug!(
            "Generated {}x{}x{} maze with {} passages",
            floors,
            rows,
            cols,
            count - 1
        );
        Ok(builder.build())
    }
}
