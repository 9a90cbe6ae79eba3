/// Grid coordinate: `x` is the column, `y` the row. The origin is the
/// bottom-left cell and `y` grows upward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardSize {
    pub cols: u32,
    pub rows: u32,
}

impl BoardSize {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    pub fn total(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.cols
            && (coord.y as u32) < self.rows
    }

    /// Panics on an out-of-range coordinate; callers are expected to stay
    /// inside the board they built.
    pub fn index_of(&self, coord: Coord) -> usize {
        assert!(
            self.contains(coord),
            "coordinate {coord:?} outside {}x{} board",
            self.cols,
            self.rows
        );
        coord.y as usize * self.cols as usize + coord.x as usize
    }

    pub fn coord_of(&self, index: usize) -> Coord {
        assert!(index < self.total(), "piece index {index} out of range");
        Coord::new(
            (index % self.cols as usize) as i32,
            (index / self.cols as usize) as i32,
        )
    }
}

/// Compass direction from `a` to `b`, or `None` unless the two cells differ
/// by exactly one step along exactly one axis.
pub fn direction_of(a: Coord, b: Coord) -> Option<Direction> {
    match (b.x - a.x, b.y - a.y) {
        (0, 1) => Some(Direction::Up),
        (0, -1) => Some(Direction::Down),
        (-1, 0) => Some(Direction::Left),
        (1, 0) => Some(Direction::Right),
        _ => None,
    }
}

pub fn neighbor(coord: Coord, dir: Direction, size: BoardSize) -> Option<Coord> {
    let (dx, dy) = dir.offset();
    let next = Coord::new(coord.x + dx, coord.y + dy);
    size.contains(next).then_some(next)
}

pub fn is_border(coord: Coord, size: BoardSize) -> bool {
    coord.x == 0
        || coord.y == 0
        || coord.x as u32 + 1 == size.cols
        || coord.y as u32 + 1 == size.rows
}
