use glam::IVec3;

/// One of the 6 face-adjacent directions between chunks.
/// Y-up convention; North is -Z, East is +X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    East = 0,
    West = 1,
    Up = 2,
    Down = 3,
    South = 4,
    North = 5,
}

/// Number of neighbor directions.
pub const DIRECTION_COUNT: usize = 6;

/// All 6 directions in index order.
pub const ALL_DIRECTIONS: [Direction; DIRECTION_COUNT] = [
    Direction::East,
    Direction::West,
    Direction::Up,
    Direction::Down,
    Direction::South,
    Direction::North,
];

impl Direction {
    /// Direction for a table index. Indices outside [0, 6) are a programmer error.
    pub fn from_index(index: usize) -> Direction {
        assert!(
            index < DIRECTION_COUNT,
            "neighbor direction index {index} out of range"
        );
        ALL_DIRECTIONS[index]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit offset vector for this direction.
    pub fn offset(self) -> IVec3 {
        match self {
            Direction::East => IVec3::new(1, 0, 0),
            Direction::West => IVec3::new(-1, 0, 0),
            Direction::Up => IVec3::new(0, 1, 0),
            Direction::Down => IVec3::new(0, -1, 0),
            Direction::South => IVec3::new(0, 0, 1),
            Direction::North => IVec3::new(0, 0, -1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::South => Direction::North,
            Direction::North => Direction::South,
        }
    }

    /// Direction along one axis for a signed step. `axis` is 0 (x), 1 (y) or 2 (z).
    pub fn along_axis(axis: usize, positive: bool) -> Direction {
        match (axis, positive) {
            (0, true) => Direction::East,
            (0, false) => Direction::West,
            (1, true) => Direction::Up,
            (1, false) => Direction::Down,
            (2, true) => Direction::South,
            (2, false) => Direction::North,
            _ => panic!("axis {axis} out of range"),
        }
    }

    /// Inverse of [`Direction::offset`]; None for anything but a unit axis vector.
    pub fn from_offset(offset: IVec3) -> Option<Direction> {
        ALL_DIRECTIONS.into_iter().find(|d| d.offset() == offset)
    }
}
