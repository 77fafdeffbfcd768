//! Three-dimensional maze representation
//!
//! A [Maze3d] is a `floors × rows × cols` grid of cells. Every cell carries
//! a [Walls] byte with one bit per face, see [Walls] for the bit order.
//! Walls are kept on both sides of a shared face, and the outer boundary is
//! always closed.

use std::fmt;

use bitflags::bitflags;
use byteorder::{BigEndian, ByteOrder};
use itertools::iproduct;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::error::{MazeError, Result};

/// Length of the serialized header: nine big-endian `i32` values
pub const HEADER_LEN: usize = 9 * 4;

/// Largest number of cells a maze may hold
pub const MAX_CELLS: usize = i32::MAX as usize;

/// Location in the maze
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub floor: usize,
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(floor: usize, row: usize, col: usize) -> Self {
        Self { floor, row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.floor, self.row, self.col)
    }
}

bitflags! {
    /// Wall flags of a single cell
    ///
    /// | bit | face  |
    /// |-----|-------|
    /// | 0   | up    |
    /// | 1   | down  |
    /// | 2   | north |
    /// | 3   | south |
    /// | 4   | east  |
    /// | 5   | west  |
    ///
    /// Bits 6 and 7 are reserved and never set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Walls: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const NORTH = 1 << 2;
        const SOUTH = 1 << 3;
        const EAST = 1 << 4;
        const WEST = 1 << 5;
    }
}

/// Face of a cell, pointing towards one of its six neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Next floor
    Up,
    /// Previous floor
    Down,
    /// Previous row
    North,
    /// Next row
    South,
    /// Next column
    East,
    /// Previous column
    West,
}

impl Direction {
    /// Neighbour expansion order. Search results depend on it.
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Directions with a positive coordinate delta; each passage is reached
    /// exactly once when iterating cells with these.
    const FORWARD: [Direction; 3] = [Direction::Up, Direction::South, Direction::East];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Wall bit of this face
    pub fn wall(self) -> Walls {
        match self {
            Direction::Up => Walls::UP,
            Direction::Down => Walls::DOWN,
            Direction::North => Walls::NORTH,
            Direction::South => Walls::SOUTH,
            Direction::East => Walls::EAST,
            Direction::West => Walls::WEST,
        }
    }
}

/// Axis that a cross-section holds fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Fixes the column; the grid is `floors × rows`
    X,
    /// Fixes the row; the grid is `floors × cols`
    Y,
    /// Fixes the floor; the grid is `rows × cols`
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Two-dimensional slice of the maze wall states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossSection {
    axis: Axis,
    index: usize,
    grid: Vec<Vec<Walls>>,
}

impl CrossSection {
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of grid rows
    pub fn height(&self) -> usize {
        self.grid.len()
    }

    /// Number of grid columns
    pub fn width(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    pub fn get(&self, i: usize, j: usize) -> Option<Walls> {
        self.grid.get(i).and_then(|row| row.get(j)).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Walls]> {
        self.grid.iter().map(Vec::as_slice)
    }

    pub fn into_grid(self) -> Vec<Vec<Walls>> {
        self.grid
    }
}

/// Maze extent and cell addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shape {
    floors: usize,
    rows: usize,
    cols: usize,
}

impl Shape {
    /// Validate dimensions: each at least one, addressable as `i32`, and the
    /// total cell count within [MAX_CELLS].
    fn new(floors: usize, rows: usize, cols: usize) -> Result<Self> {
        let invalid = || MazeError::InvalidDimension { floors, rows, cols };
        let dims = [floors, rows, cols];
        if dims.iter().any(|&d| d == 0 || d > i32::MAX as usize) {
            return Err(invalid());
        }
        let count = floors
            .checked_mul(rows)
            .and_then(|n| n.checked_mul(cols))
            .ok_or_else(invalid)?;
        if count > MAX_CELLS {
            return Err(invalid());
        }
        Ok(Self { floors, rows, cols })
    }

    fn count(&self) -> usize {
        self.floors * self.rows * self.cols
    }

    fn contains(&self, cell: Cell) -> bool {
        cell.floor < self.floors && cell.row < self.rows && cell.col < self.cols
    }

    /// Storage position: floor-major, then row, then column
    fn index(&self, cell: Cell) -> usize {
        debug_assert!(self.contains(cell));
        (cell.floor * self.rows + cell.row) * self.cols + cell.col
    }

    fn neighbor(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        let Cell { floor, row, col } = cell;
        match direction {
            Direction::Up => (floor + 1 < self.floors).then(|| Cell::new(floor + 1, row, col)),
            Direction::Down => floor.checked_sub(1).map(|f| Cell::new(f, row, col)),
            Direction::North => row.checked_sub(1).map(|r| Cell::new(floor, r, col)),
            Direction::South => (row + 1 < self.rows).then(|| Cell::new(floor, row + 1, col)),
            Direction::East => (col + 1 < self.cols).then(|| Cell::new(floor, row, col + 1)),
            Direction::West => col.checked_sub(1).map(|c| Cell::new(floor, row, c)),
        }
    }

    fn cells(&self) -> impl Iterator<Item = Cell> {
        iproduct!(0..self.floors, 0..self.rows, 0..self.cols)
            .map(|(floor, row, col)| Cell::new(floor, row, col))
    }

    fn far_corner(&self) -> Cell {
        Cell::new(self.floors - 1, self.rows - 1, self.cols - 1)
    }
}

/// Fixed-size prefix of the serialized maze
///
/// Values are kept as read, so that out-of-range data can be reported
/// instead of silently wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub floors: i32,
    pub rows: i32,
    pub cols: i32,
    pub start: [i32; 3],
    pub goal: [i32; 3],
}

impl Header {
    /// Read header from the front of `bytes`. Returns `None` if there are
    /// fewer than [HEADER_LEN] bytes.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_LEN {
            return None;
        }
        let mut values = [0i32; 9];
        BigEndian::read_i32_into(&bytes[..HEADER_LEN], &mut values);
        let [floors, rows, cols, sf, sr, sc, gf, gr, gc] = values;
        Some(Self {
            floors,
            rows,
            cols,
            start: [sf, sr, sc],
            goal: [gf, gr, gc],
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let values = [
            self.floors,
            self.rows,
            self.cols,
            self.start[0],
            self.start[1],
            self.start[2],
            self.goal[0],
            self.goal[1],
            self.goal[2],
        ];
        let mut bytes = [0u8; HEADER_LEN];
        BigEndian::write_i32_into(&values, &mut bytes);
        bytes
    }

    /// Number of wall bytes that should follow this header
    ///
    /// `None` when the declared dimensions do not form a valid maze shape.
    pub fn declared_cell_count(&self) -> Option<usize> {
        self.shape().ok().map(|shape| shape.count())
    }

    fn shape(&self) -> Result<Shape> {
        let dim = |d: i32| usize::try_from(d).unwrap_or(0);
        Shape::new(dim(self.floors), dim(self.rows), dim(self.cols))
    }

    fn cell(coords: [i32; 3]) -> Option<Cell> {
        let [floor, row, col] = coords;
        Some(Cell::new(
            usize::try_from(floor).ok()?,
            usize::try_from(row).ok()?,
            usize::try_from(col).ok()?,
        ))
    }
}

/// Connected three-dimensional maze
///
/// Built by [crate::maze_generator::MazeGenerator], by [MazeBuilder], or
/// decoded with [Maze3d::from_bytes]. Read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze3d {
    shape: Shape,
    start: Cell,
    goal: Cell,
    walls: Vec<Walls>,
}

impl Maze3d {
    pub fn floors(&self) -> usize {
        self.shape.floors
    }

    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn cell_count(&self) -> usize {
        self.walls.len()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.shape.contains(cell)
    }

    /// Storage index of `cell`, if inside the maze
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        self.contains(cell).then(|| self.shape.index(cell))
    }

    /// Storage index of a cell known to be inside the maze
    pub(crate) fn slot(&self, cell: Cell) -> usize {
        self.shape.index(cell)
    }

    /// All cells, in storage order
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        self.shape.cells()
    }

    /// Wall flags of `cell`, `None` if outside the maze
    pub fn walls(&self, cell: Cell) -> Option<Walls> {
        self.index_of(cell).map(|i| self.walls[i])
    }

    /// Adjacent cell across `direction`, regardless of walls
    pub fn neighbor(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        if !self.contains(cell) {
            return None;
        }
        self.shape.neighbor(cell, direction)
    }

    /// Whether one can walk from `cell` towards `direction`
    pub fn is_open(&self, cell: Cell, direction: Direction) -> bool {
        self.walls(cell)
            .is_some_and(|walls| !walls.contains(direction.wall()))
    }

    /// Reachable neighbours of `cell`, in [Direction::ALL] order
    pub fn open_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |&d| self.is_open(cell, d))
            .filter_map(move |d| self.neighbor(cell, d))
    }

    /// Number of open passages between cells
    pub fn passage_count(&self) -> usize {
        self.cells()
            .map(|cell| {
                Direction::FORWARD
                    .into_iter()
                    .filter(|&d| self.is_open(cell, d))
                    .count()
            })
            .sum()
    }

    /// Build an undirected graph of the open passages
    ///
    /// Node `i` holds the cell with storage index `i`.
    pub fn to_graph(&self) -> UnGraph<Cell, ()> {
        let mut graph = UnGraph::with_capacity(self.cell_count(), self.cell_count());
        let nodes: Vec<NodeIndex> = self.cells().map(|cell| graph.add_node(cell)).collect();

        // Only positive deltas, because graph is undirected
        for cell in self.cells() {
            for direction in Direction::FORWARD {
                if !self.is_open(cell, direction) {
                    continue;
                }
                if let Some(other) = self.shape.neighbor(cell, direction) {
                    graph.add_edge(
                        nodes[self.shape.index(cell)],
                        nodes[self.shape.index(other)],
                        (),
                    );
                }
            }
        }
        graph
    }

    /// Whether an open path leads from start to goal
    pub fn goal_reachable(&self) -> bool {
        let graph = self.to_graph();
        has_path_connecting(
            &graph,
            NodeIndex::new(self.shape.index(self.start)),
            NodeIndex::new(self.shape.index(self.goal)),
            None,
        )
    }

    /// Cross-section with `axis` fixed at `index`
    ///
    /// Fails with [MazeError::IndexOutOfRange] unless `index` is within the
    /// extent of `axis`.
    pub fn cross_section(&self, axis: Axis, index: usize) -> Result<CrossSection> {
        let Shape { floors, rows, cols } = self.shape;
        let len = match axis {
            Axis::X => cols,
            Axis::Y => rows,
            Axis::Z => floors,
        };
        if index >= len {
            return Err(MazeError::IndexOutOfRange { axis, index, len });
        }

        let at = |cell: Cell| self.walls[self.shape.index(cell)];
        let grid: Vec<Vec<Walls>> = match axis {
            Axis::X => (0..floors)
                .map(|f| (0..rows).map(|r| at(Cell::new(f, r, index))).collect())
                .collect(),
            Axis::Y => (0..floors)
                .map(|f| (0..cols).map(|c| at(Cell::new(f, index, c))).collect())
                .collect(),
            Axis::Z => (0..rows)
                .map(|r| (0..cols).map(|c| at(Cell::new(index, r, c))).collect())
                .collect(),
        };
        Ok(CrossSection { axis, index, grid })
    }

    pub fn cross_section_by_x(&self, index: usize) -> Result<CrossSection> {
        self.cross_section(Axis::X, index)
    }

    pub fn cross_section_by_y(&self, index: usize) -> Result<CrossSection> {
        self.cross_section(Axis::Y, index)
    }

    pub fn cross_section_by_z(&self, index: usize) -> Result<CrossSection> {
        self.cross_section(Axis::Z, index)
    }

    pub fn header(&self) -> Header {
        // Dimensions and coordinates fit in i32, checked by Shape::new
        let coords = |c: Cell| [c.floor as i32, c.row as i32, c.col as i32];
        Header {
            floors: self.shape.floors as i32,
            rows: self.shape.rows as i32,
            cols: self.shape.cols as i32,
            start: coords(self.start),
            goal: coords(self.goal),
        }
    }

    /// Serialize into [HEADER_LEN] header bytes followed by one [Walls]
    /// byte per cell in storage order
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.walls.len());
        bytes.extend_from_slice(&self.header().to_bytes());
        bytes.extend(self.walls.iter().map(|walls| walls.bits()));
        bytes
    }

    /// Inverse of [Maze3d::to_bytes]
    ///
    /// Returns [MazeError::MalformedData] if the header is short or invalid,
    /// if the length does not match the declared dimensions, if the wall
    /// flags are not a consistent, closed maze, or if the goal cannot be
    /// reached from the start.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = Header::parse(bytes).ok_or_else(|| {
            MazeError::MalformedData(format!(
                "expected at least {} header bytes, got {}",
                HEADER_LEN,
                bytes.len()
            ))
        })?;
        let shape = header.shape().map_err(|_| {
            MazeError::MalformedData(format!(
                "invalid dimensions {}x{}x{}",
                header.floors, header.rows, header.cols
            ))
        })?;

        let endpoint = |coords: [i32; 3], what: &str| {
            Header::cell(coords)
                .filter(|&cell| shape.contains(cell))
                .ok_or_else(|| {
                    MazeError::MalformedData(format!("{} {:?} is outside the maze", what, coords))
                })
        };
        let start = endpoint(header.start, "start")?;
        let goal = endpoint(header.goal, "goal")?;

        let expected = HEADER_LEN + shape.count();
        if bytes.len() != expected {
            return Err(MazeError::MalformedData(format!(
                "expected {} bytes for {}x{}x{} maze, got {}",
                expected,
                shape.floors,
                shape.rows,
                shape.cols,
                bytes.len()
            )));
        }

        let walls = bytes[HEADER_LEN..]
            .iter()
            .enumerate()
            .map(|(i, &b)| {
                Walls::from_bits(b).ok_or_else(|| {
                    MazeError::MalformedData(format!("reserved wall bits set in cell byte {}", i))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let maze = Self {
            shape,
            start,
            goal,
            walls,
        };
        maze.check_walls()?;
        if !maze.goal_reachable() {
            return Err(MazeError::MalformedData(format!(
                "goal {} unreachable from start {}",
                goal, start
            )));
        }
        Ok(maze)
    }

    /// Verify closed boundary and mutual wall consistency
    fn check_walls(&self) -> Result<()> {
        for cell in self.cells() {
            let walls = self.walls[self.shape.index(cell)];
            for direction in Direction::ALL {
                let walled = walls.contains(direction.wall());
                match self.shape.neighbor(cell, direction) {
                    None if !walled => {
                        return Err(MazeError::MalformedData(format!(
                            "open boundary face {:?} at {}",
                            direction, cell
                        )))
                    }
                    None => (),
                    Some(other) => {
                        let back = self.walls[self.shape.index(other)]
                            .contains(direction.opposite().wall());
                        if walled != back {
                            return Err(MazeError::MalformedData(format!(
                                "inconsistent wall {:?} between {} and {}",
                                direction, cell, other
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Mutable maze under construction
///
/// Starts with every wall present, start at `(0, 0, 0)` and goal at the
/// opposite corner. Carving always opens both sides of a face, so the
/// finished [Maze3d] is consistent by construction.
///
/// Connectivity is not enforced: [MazeBuilder::build] also returns mazes
/// whose goal is walled off, which search reports as
/// [MazeError::Unreachable] and [Maze3d::from_bytes] refuses to load.
#[derive(Debug, Clone)]
pub struct MazeBuilder {
    shape: Shape,
    start: Cell,
    goal: Cell,
    walls: Vec<Walls>,
}

impl MazeBuilder {
    /// Fails with [MazeError::InvalidDimension] if any dimension is zero or
    /// the maze would be too large.
    pub fn new(floors: usize, rows: usize, cols: usize) -> Result<Self> {
        let shape = Shape::new(floors, rows, cols)?;
        Ok(Self {
            shape,
            start: Cell::new(0, 0, 0),
            goal: shape.far_corner(),
            walls: vec![Walls::all(); shape.count()],
        })
    }

    pub fn start(&mut self, cell: Cell) -> Result<&mut Self> {
        if !self.shape.contains(cell) {
            return Err(MazeError::InvalidStart(cell));
        }
        self.start = cell;
        Ok(self)
    }

    pub fn goal(&mut self, cell: Cell) -> Result<&mut Self> {
        if !self.shape.contains(cell) {
            return Err(MazeError::InvalidGoal(cell));
        }
        self.goal = cell;
        Ok(self)
    }

    pub fn cell_count(&self) -> usize {
        self.walls.len()
    }

    /// Storage index of a cell inside the maze
    pub(crate) fn index_of(&self, cell: Cell) -> usize {
        self.shape.index(cell)
    }

    /// Adjacent cell across `direction`, if inside the maze
    pub fn neighbor(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        if !self.shape.contains(cell) {
            return None;
        }
        self.shape.neighbor(cell, direction)
    }

    /// Remove the wall between `cell` and its neighbour towards `direction`
    ///
    /// Returns the neighbour. Boundary walls cannot be carved.
    pub fn carve(&mut self, cell: Cell, direction: Direction) -> Result<Cell> {
        if !self.shape.contains(cell) {
            return Err(MazeError::CellOutOfBounds(cell));
        }
        let other = self
            .shape
            .neighbor(cell, direction)
            .ok_or(MazeError::BoundaryWall { cell, direction })?;
        let (a, b) = (self.shape.index(cell), self.shape.index(other));
        self.walls[a].remove(direction.wall());
        self.walls[b].remove(direction.opposite().wall());
        Ok(other)
    }

    /// Carve a corridor following `directions`, starting from `from`
    ///
    /// Returns the last cell of the corridor.
    pub fn carve_path(&mut self, from: Cell, directions: &[Direction]) -> Result<Cell> {
        directions
            .iter()
            .try_fold(from, |cell, &direction| self.carve(cell, direction))
    }

    pub fn build(self) -> Maze3d {
        Maze3d {
            shape: self.shape,
            start: self.start,
            goal: self.goal,
            walls: self.walls,
        }
    }
}
