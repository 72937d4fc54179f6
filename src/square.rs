use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Board size constants
pub const SIZE: usize = 10;
pub const NUM_SQUARES: usize = SIZE * SIZE;

/// The eight queen-line directions, numbered clockwise from north.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Direction> {
        Self::ALL.get(index).copied()
    }

    /// (column, row) offset of one step in this direction
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::N => (0, 1),
            Direction::NE => (1, 1),
            Direction::E => (1, 0),
            Direction::SE => (1, -1),
            Direction::S => (0, -1),
            Direction::SW => (-1, -1),
            Direction::W => (-1, 0),
            Direction::NW => (-1, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        Self::ALL[(self.index() + 4) % 8]
    }
}

/// Handle to one of the 100 board cells.
///
/// Squares are interned: every handle points into a fixed table built at
/// compile time, so there is exactly one value per coordinate pair and
/// comparing two squares is an integer compare. Index 0 is a1 (lower-left)
/// and index 99 is j10 (upper-right).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square(u8);

const fn build_table() -> [Square; NUM_SQUARES] {
    let mut table = [Square(0); NUM_SQUARES];
    let mut i = 0;
    while i < NUM_SQUARES {
        table[i] = Square(i as u8);
        i += 1;
    }
    table
}

static SQUARES: [Square; NUM_SQUARES] = build_table();

#[rustfmt::skip]
static NAMES: [&str; NUM_SQUARES] = [
    "a1", "b1", "c1", "d1", "e1", "f1", "g1", "h1", "i1", "j1",
    "a2", "b2", "c2", "d2", "e2", "f2", "g2", "h2", "i2", "j2",
    "a3", "b3", "c3", "d3", "e3", "f3", "g3", "h3", "i3", "j3",
    "a4", "b4", "c4", "d4", "e4", "f4", "g4", "h4", "i4", "j4",
    "a5", "b5", "c5", "d5", "e5", "f5", "g5", "h5", "i5", "j5",
    "a6", "b6", "c6", "d6", "e6", "f6", "g6", "h6", "i6", "j6",
    "a7", "b7", "c7", "d7", "e7", "f7", "g7", "h7", "i7", "j7",
    "a8", "b8", "c8", "d8", "e8", "f8", "g8", "h8", "i8", "j8",
    "a9", "b9", "c9", "d9", "e9", "f9", "g9", "h9", "i9", "j9",
    "a10", "b10", "c10", "d10", "e10", "f10", "g10", "h10", "i10", "j10",
];

impl Square {
    /// True iff (col, row) lies on the board
    pub fn exists(col: i32, row: i32) -> bool {
        (0..SIZE as i32).contains(&col) && (0..SIZE as i32).contains(&row)
    }

    pub fn from_index(index: usize) -> Option<Square> {
        SQUARES.get(index).copied()
    }

    pub fn try_at(col: i32, row: i32) -> Result<Square, GameError> {
        if Self::exists(col, row) {
            Ok(SQUARES[row as usize * SIZE + col as usize])
        } else {
            Err(GameError::OffBoard { col, row })
        }
    }

    /// The square at (col, row).
    ///
    /// # Panics
    /// Panics if either coordinate is outside `0..10`.
    pub fn at(col: usize, row: usize) -> Square {
        assert!(
            col < SIZE && row < SIZE,
            "square ({col}, {row}) is off the board"
        );
        SQUARES[row * SIZE + col]
    }

    /// All squares in increasing index order
    pub fn all() -> impl Iterator<Item = Square> {
        SQUARES.iter().copied()
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn col(self) -> usize {
        self.index() % SIZE
    }

    pub fn row(self) -> usize {
        self.index() / SIZE
    }

    pub fn name(self) -> &'static str {
        NAMES[self.index()]
    }

    /// True iff `to` is a different square on the same row, column or
    /// diagonal.
    pub fn is_queen_move(self, to: Square) -> bool {
        if self == to {
            return false;
        }
        let dc = to.col() as i32 - self.col() as i32;
        let dr = to.row() as i32 - self.row() as i32;
        dc == 0 || dr == 0 || dc.abs() == dr.abs()
    }

    /// Direction of the queen move `self -> to`, or `None` if it is not one.
    pub fn direction(self, to: Square) -> Option<Direction> {
        if !self.is_queen_move(to) {
            return None;
        }
        let dc = (to.col() as i32 - self.col() as i32).signum();
        let dr = (to.row() as i32 - self.row() as i32).signum();
        Direction::ALL.into_iter().find(|d| d.delta() == (dc, dr))
    }

    /// The square `steps` cells away along `dir`, if it is on the board.
    pub fn step(self, dir: Direction, steps: usize) -> Option<Square> {
        if steps >= SIZE {
            return None;
        }
        let (dc, dr) = dir.delta();
        let col = self.col() as i32 + dc * steps as i32;
        let row = self.row() as i32 + dr * steps as i32;
        Square::try_at(col, row).ok()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Square {
    type Err = GameError;

    /// Parse `<file><rank>`, file in a..j and rank in 1..10.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidSquare(s.to_string());

        let mut chars = s.chars();
        let file = chars.next().ok_or_else(invalid)?;
        if !('a'..='j').contains(&file) {
            return Err(invalid());
        }

        let rank = match chars.as_str().as_bytes() {
            [b'1', b'0'] => 10,
            [digit @ b'1'..=b'9'] => (digit - b'0') as usize,
            _ => return Err(invalid()),
        };

        Ok(Square::at(file as usize - 'a' as usize, rank - 1))
    }
}

impl TryFrom<String> for Square {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.name().to_string()
    }
}
