//! Generate, solve and persist three-dimensional mazes
//!
//! - [maze]: the [Maze3d] grid, its byte layout and cross-sections
//! - [maze_generator]: random perfect mazes
//! - [search]: breadth-first and depth-first [Solution]s
//! - [codec]: run-length compression of serialized mazes
//! - [store]: mazes and solutions kept by name, saved to files
//!
//! # Examples
//! ## Generate and solve
//! ```
//! use maze3d::{solve, MazeGenerator, Strategy};
//!
//! let maze = MazeGenerator::new(Some(13)).generate(3, 5, 5).unwrap();
//! let bfs = solve(&maze, Strategy::BreadthFirst).unwrap();
//! let dfs = solve(&maze, Strategy::DepthFirst).unwrap();
//!
//! assert_eq!(bfs.path.first(), Some(&maze.start()));
//! assert_eq!(bfs.path.last(), Some(&maze.goal()));
//! assert!(dfs.path.len() >= bfs.path.len());
//! ```
//!
//! ## Save and restore
//! ```
//! use maze3d::{codec, MazeGenerator};
//!
//! let maze = MazeGenerator::new(Some(2)).generate(2, 4, 4).unwrap();
//! let stored: Vec<u8> = codec::write_maze(&maze, Vec::new()).unwrap();
//! let restored = codec::read_maze(stored.as_slice()).unwrap();
//! assert_eq!(restored, maze);
//! ```
//!
//! ## Hand-made corridor
//! ```
//! use maze3d::{solve, Cell, Direction::*, MazeBuilder, Strategy};
//!
//! let mut builder = MazeBuilder::new(1, 3, 3).unwrap();
//! builder
//!     .carve_path(Cell::new(0, 0, 0), &[East, East, South, South])
//!     .unwrap();
//! let maze = builder.build();
//!
//! let solution = solve(&maze, Strategy::DepthFirst).unwrap();
//! assert_eq!(solution.path.len(), 5);
//! let floor = maze.cross_section_by_z(0).unwrap();
//! assert_eq!((floor.height(), floor.width()), (3, 3));
//! ```

pub mod codec;
pub mod error;
pub mod maze;
pub mod maze_generator;
pub mod search;
pub mod store;

pub use error::{MazeError, Result};
pub use maze::{Axis, Cell, CrossSection, Direction, Maze3d, MazeBuilder, Walls};
pub use maze_generator::MazeGenerator;
pub use search::{solve, Search, SearchState, SearchStatus, Solution, Strategy};
pub use store::MazeStore;
