//! Breadth-first and depth-first search over maze passages
//!
//! A [Search] is a small state machine, `Ready → Running → Solved` or
//! `Running → Exhausted`, advanced one frontier pop at a time by
//! [Search::step]. Visited states are kept in an arena; each
//! [SearchState] refers to its predecessor by arena index, and the path is
//! recovered by walking those indices back from the goal.

use std::collections::VecDeque;
use std::fmt;
use std::iter;
use std::str::FromStr;

use anyhow::anyhow;

use crate::error::{MazeError, Result};
use crate::maze::{Cell, Maze3d};

/// Frontier discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// FIFO frontier, finds a shortest path
    BreadthFirst,
    /// LIFO frontier, finds some path
    DepthFirst,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::BreadthFirst => "BFS",
            Strategy::DepthFirst => "DFS",
        };
        f.write_str(name)
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(Strategy::BreadthFirst),
            "dfs" | "depth-first" => Ok(Strategy::DepthFirst),
            _ => Err(anyhow!("Unknown search strategy `{}`, expected bfs or dfs", s)),
        }
    }
}

/// Cell reached during a search, with the arena index of its predecessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchState {
    pub cell: Cell,
    pub parent: Option<usize>,
}

/// Progress of a [Search]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Frontier holds only the start
    Ready,
    Running,
    /// Goal was reached
    Solved,
    /// Frontier ran empty before reaching the goal
    Exhausted,
}

/// Path from start to goal, with search statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Strategy that produced the path
    pub strategy: Strategy,
    /// Cells from start to goal, both included
    pub path: Vec<Cell>,
    /// Cells taken off the frontier and marked visited
    pub nodes_visited: usize,
    /// Visited cells whose neighbours were pushed to the frontier
    pub nodes_expanded: usize,
    /// Search states created, the start included
    pub states_generated: usize,
}

impl Solution {
    /// Number of moves along the path
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Print report
    pub fn print_report(&self) {
        println!(
            "{} found a path of {} steps ({} nodes visited, {} expanded).",
            self.strategy,
            self.steps(),
            self.nodes_visited,
            self.nodes_expanded
        );
    }
}

/// Single search run over a borrowed maze
///
/// The maze is only read, so any number of searches may share it.
#[derive(Debug)]
pub struct Search<'m> {
    maze: &'m Maze3d,
    strategy: Strategy,
    goal: Cell,
    status: SearchStatus,
    /// Arena of all states; parents point into it
    states: Vec<SearchState>,
    /// Arena indices waiting to be visited
    frontier: VecDeque<usize>,
    /// Indexed by cell storage order
    visited: Vec<bool>,
    nodes_visited: usize,
    nodes_expanded: usize,
    solved: Option<usize>,
}

impl<'m> Search<'m> {
    /// Search from the maze start to the maze goal
    pub fn new(maze: &'m Maze3d, strategy: Strategy) -> Self {
        Self::seeded(maze, maze.start(), maze.goal(), strategy)
    }

    /// Search between arbitrary cells
    ///
    /// Returns [MazeError::InvalidStart] or [MazeError::InvalidGoal] when
    /// the corresponding cell is outside the maze.
    pub fn between(maze: &'m Maze3d, start: Cell, goal: Cell, strategy: Strategy) -> Result<Self> {
        if !maze.contains(start) {
            return Err(MazeError::InvalidStart(start));
        }
        if !maze.contains(goal) {
            return Err(MazeError::InvalidGoal(goal));
        }
        Ok(Self::seeded(maze, start, goal, strategy))
    }

    fn seeded(maze: &'m Maze3d, start: Cell, goal: Cell, strategy: Strategy) -> Self {
        Self {
            maze,
            strategy,
            goal,
            status: SearchStatus::Ready,
            states: vec![SearchState {
                cell: start,
                parent: None,
            }],
            frontier: VecDeque::from([0]),
            visited: vec![false; maze.cell_count()],
            nodes_visited: 0,
            nodes_expanded: 0,
            solved: None,
        }
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Arena of states created so far
    pub fn states(&self) -> &[SearchState] {
        &self.states
    }

    /// Pop one state from the frontier and process it
    ///
    /// Terminal states are sticky: stepping a solved or exhausted search
    /// does nothing.
    pub fn step(&mut self) -> SearchStatus {
        match self.status {
            SearchStatus::Solved | SearchStatus::Exhausted => return self.status,
            SearchStatus::Ready => self.status = SearchStatus::Running,
            SearchStatus::Running => (),
        }

        let popped = match self.strategy {
            Strategy::BreadthFirst => self.frontier.pop_front(),
            Strategy::DepthFirst => self.frontier.pop_back(),
        };
        let Some(id) = popped else {
            self.status = SearchStatus::Exhausted;
            return self.status;
        };

        let maze = self.maze;
        let cell = self.states[id].cell;
        let slot = maze.slot(cell);
        if self.visited[slot] {
            // Reached earlier through another parent
            return self.status;
        }
        self.visited[slot] = true;
        self.nodes_visited += 1;

        if cell == self.goal {
            self.solved = Some(id);
            self.status = SearchStatus::Solved;
            return self.status;
        }

        self.nodes_expanded += 1;
        for next in maze.open_neighbors(cell) {
            if !self.visited[maze.slot(next)] {
                self.states.push(SearchState {
                    cell: next,
                    parent: Some(id),
                });
                self.frontier.push_back(self.states.len() - 1);
            }
        }
        self.status
    }

    /// Step until the search ends
    ///
    /// Returns [MazeError::Unreachable] if the frontier runs empty, which
    /// means the maze is not connected.
    pub fn run(mut self) -> Result<Solution> {
        loop {
            match self.step() {
                SearchStatus::Solved => break,
                SearchStatus::Exhausted => {
                    log::debug!(
                        "{} exhausted after visiting {} cells",
                        self.strategy,
                        self.nodes_visited
                    );
                    return Err(MazeError::Unreachable);
                }
                SearchStatus::Ready | SearchStatus::Running => (),
            }
        }

        let path = self.solved.map(|id| self.path_to(id)).unwrap_or_default();
        log::debug!(
            "{} reached goal in {} steps, {} cells visited",
            self.strategy,
            path.len().saturating_sub(1),
            self.nodes_visited
        );
        Ok(Solution {
            strategy: self.strategy,
            path,
            nodes_visited: self.nodes_visited,
            nodes_expanded: self.nodes_expanded,
            states_generated: self.states.len(),
        })
    }

    /// Walk parent links from `id` back to the start
    fn path_to(&self, id: usize) -> Vec<Cell> {
        let mut path: Vec<Cell> = iter::successors(Some(id), |&i| self.states[i].parent)
            .map(|i| self.states[i].cell)
            .collect();
        path.reverse();
        path
    }
}

/// Find a path from the maze start to its goal
pub fn solve(maze: &Maze3d, strategy: Strategy) -> Result<Solution> {
    Search::new(maze, strategy).run()
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use petgraph::algo::astar;
    use petgraph::graph::NodeIndex;

    use super::*;
    use crate::maze::{Direction, MazeBuilder};
    use crate::maze_generator::MazeGenerator;

    /// Consecutive path cells must be joined by open passages
    fn assert_walkable(maze: &Maze3d, solution: &Solution) {
        assert_eq!(solution.path.first(), Some(&maze.start()));
        assert_eq!(solution.path.last(), Some(&maze.goal()));
        for (a, b) in solution.path.iter().tuple_windows() {
            assert!(
                maze.open_neighbors(*a).contains(b),
                "No passage from {} to {}",
                a,
                b
            );
        }
    }

    fn l_corridor() -> Maze3d {
        use Direction::*;
        let mut builder = MazeBuilder::new(1, 3, 3).unwrap();
        builder
            .carve_path(Cell::new(0, 0, 0), &[East, East, South, South])
            .unwrap();
        builder.build()
    }

    /// 1×3×3 maze without any interior walls
    fn open_floor() -> Maze3d {
        let mut builder = MazeBuilder::new(1, 3, 3).unwrap();
        for row in 0..3 {
            for col in 0..3 {
                let cell = Cell::new(0, row, col);
                if row < 2 {
                    builder.carve(cell, Direction::South).unwrap();
                }
                if col < 2 {
                    builder.carve(cell, Direction::East).unwrap();
                }
            }
        }
        builder.build()
    }

    #[test]
    fn parse_strategy() {
        assert_eq!("BFS".parse::<Strategy>().unwrap(), Strategy::BreadthFirst);
        assert_eq!("dfs".parse::<Strategy>().unwrap(), Strategy::DepthFirst);
        assert!("astar".parse::<Strategy>().is_err());
    }

    #[test]
    fn single_corridor_same_for_both() {
        let maze = l_corridor();
        let bfs = solve(&maze, Strategy::BreadthFirst).unwrap();
        let dfs = solve(&maze, Strategy::DepthFirst).unwrap();

        assert_eq!(bfs.path.len(), 5);
        assert_eq!(bfs.path, dfs.path);
        assert_eq!(
            bfs.path,
            vec![
                Cell::new(0, 0, 0),
                Cell::new(0, 0, 1),
                Cell::new(0, 0, 2),
                Cell::new(0, 1, 2),
                Cell::new(0, 2, 2),
            ]
        );
        assert_walkable(&maze, &bfs);
    }

    #[test]
    fn breadth_first_is_shortest_on_open_floor() {
        let maze = open_floor();
        let bfs = solve(&maze, Strategy::BreadthFirst).unwrap();
        assert_eq!(bfs.steps(), 4);
        assert_walkable(&maze, &bfs);
    }

    #[test]
    fn depth_first_follows_last_pushed_neighbour() {
        let maze = open_floor();
        let dfs = solve(&maze, Strategy::DepthFirst).unwrap();
        let expected = [
            (0, 0),
            (0, 1),
            (0, 2),
            (1, 2),
            (1, 1),
            (1, 0),
            (2, 0),
            (2, 1),
            (2, 2),
        ]
        .map(|(row, col)| Cell::new(0, row, col));

        assert_eq!(dfs.path, expected);
        assert_eq!(dfs.nodes_visited, 9);
        assert_walkable(&maze, &dfs);

        let bfs = solve(&maze, Strategy::BreadthFirst).unwrap();
        assert!(dfs.path.len() > bfs.path.len());
    }

    #[test]
    fn identical_runs_are_reproducible() {
        let maze = open_floor();
        for strategy in [Strategy::BreadthFirst, Strategy::DepthFirst] {
            assert_eq!(solve(&maze, strategy).unwrap(), solve(&maze, strategy).unwrap());
        }
    }

    #[test]
    fn walled_off_cell_is_unreachable() {
        let maze = l_corridor();
        let (start, isolated) = (Cell::new(0, 0, 0), Cell::new(0, 1, 1));
        for strategy in [Strategy::BreadthFirst, Strategy::DepthFirst] {
            let search = Search::between(&maze, start, isolated, strategy).unwrap();
            assert_eq!(search.run(), Err(MazeError::Unreachable));
        }

        // Goal of a builder maze may be walled off too
        let closed = MazeBuilder::new(1, 1, 2).unwrap().build();
        assert_eq!(
            solve(&closed, Strategy::BreadthFirst),
            Err(MazeError::Unreachable)
        );
    }

    #[test]
    fn start_is_goal() {
        let maze = MazeBuilder::new(1, 1, 1).unwrap().build();
        let solution = solve(&maze, Strategy::DepthFirst).unwrap();
        assert_eq!(solution.path, vec![Cell::new(0, 0, 0)]);
        assert_eq!(solution.steps(), 0);
        assert_eq!(solution.nodes_expanded, 0);
    }

    #[test]
    fn endpoints_outside_the_maze() {
        let maze = l_corridor();
        let inside = Cell::new(0, 0, 0);
        let outside = Cell::new(1, 0, 0);
        assert!(matches!(
            Search::between(&maze, outside, inside, Strategy::BreadthFirst),
            Err(MazeError::InvalidStart(c)) if c == outside
        ));
        assert!(matches!(
            Search::between(&maze, inside, outside, Strategy::BreadthFirst),
            Err(MazeError::InvalidGoal(c)) if c == outside
        ));
    }

    #[test]
    fn search_between_inner_cells() {
        let maze = l_corridor();
        let solution = Search::between(
            &maze,
            Cell::new(0, 0, 1),
            Cell::new(0, 1, 2),
            Strategy::BreadthFirst,
        )
        .unwrap()
        .run()
        .unwrap();
        assert_eq!(solution.steps(), 2);
    }

    #[test]
    fn status_transitions() {
        let maze = l_corridor();
        let mut search = Search::new(&maze, Strategy::BreadthFirst);
        assert_eq!(search.status(), SearchStatus::Ready);
        assert_eq!(search.step(), SearchStatus::Running);

        // One pop per corridor cell
        let mut pops = 1;
        while search.step() == SearchStatus::Running {
            pops += 1;
        }
        pops += 1;
        assert_eq!(search.status(), SearchStatus::Solved);
        assert_eq!(pops, 5);
        assert_eq!(search.step(), SearchStatus::Solved);
        assert!(search.states().iter().skip(1).all(|s| s.parent.is_some()));

        // Isolated cell in the middle of the corridor's floor
        let mut search = Search::between(
            &maze,
            Cell::new(0, 1, 1),
            Cell::new(0, 0, 0),
            Strategy::DepthFirst,
        )
        .unwrap();
        assert_eq!(search.step(), SearchStatus::Running);
        assert_eq!(search.step(), SearchStatus::Exhausted);
        assert_eq!(search.step(), SearchStatus::Exhausted);
    }

    #[test]
    fn search_debug_shows_progress() {
        let maze = l_corridor();
        let mut search = Search::new(&maze, Strategy::DepthFirst);
        search.step();
        let debug = format!("{:?}", search);
        assert!(debug.starts_with("Search"));
        assert!(debug.contains("Running"));
    }

    #[test]
    fn generated_mazes_are_solved_by_both() {
        let mut gen = MazeGenerator::new(Some(3));
        for (floors, rows, cols) in [(1, 1, 1), (1, 5, 5), (3, 3, 3), (4, 2, 6)] {
            let maze = gen.generate(floors, rows, cols).unwrap();
            let bfs = solve(&maze, Strategy::BreadthFirst).unwrap();
            let dfs = solve(&maze, Strategy::DepthFirst).unwrap();
            assert_walkable(&maze, &bfs);
            assert_walkable(&maze, &dfs);
            assert!(dfs.path.len() >= bfs.path.len());
        }
    }

    #[test]
    fn breadth_first_agrees_with_astar() {
        let maze = MazeGenerator::new(Some(11)).generate(3, 4, 5).unwrap();
        let graph = maze.to_graph();
        let start = NodeIndex::new(maze.slot(maze.start()));
        let goal = NodeIndex::new(maze.slot(maze.goal()));
        let (cost, _) = astar(&graph, start, |n| n == goal, |_| 1usize, |_| 0).unwrap();

        let bfs = solve(&maze, Strategy::BreadthFirst).unwrap();
        assert_eq!(bfs.steps(), cost);
    }

    #[test]
    fn concurrent_searches_share_maze() {
        let maze = MazeGenerator::new(Some(5)).generate(3, 6, 6).unwrap();
        let (bfs, dfs) = std::thread::scope(|s| {
            let bfs = s.spawn(|| solve(&maze, Strategy::BreadthFirst));
            let dfs = s.spawn(|| solve(&maze, Strategy::DepthFirst));
            (bfs.join().unwrap(), dfs.join().unwrap())
        });
        assert_eq!(bfs.unwrap().path.last(), dfs.unwrap().path.last());
    }
}
