use crate::error::GameError;
use crate::square::{Direction, NUM_SQUARES, SIZE, Square};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

/// Starting queens as (col, row)
const WHITE_START: [(usize, usize); 4] = [(3, 0), (0, 3), (6, 0), (9, 3)];
const BLACK_START: [(usize, usize); 4] = [(3, 9), (0, 6), (6, 9), (9, 6)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Piece {
    Empty,
    White,
    Black,
    Spear,
}

impl Piece {
    pub fn glyph(self) -> char {
        match self {
            Piece::Empty => '-',
            Piece::White => 'W',
            Piece::Black => 'B',
            Piece::Spear => 'S',
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    White,
    Black,
}

impl Player {
    pub fn opponent(&self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    /// The piece this side's queens are shown as
    pub fn piece(&self) -> Piece {
        match self {
            Player::White => Piece::White,
            Player::Black => Piece::Black,
        }
    }
}

/// One ply: move the queen on `from` to `to`, then throw a spear to `spear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub spear: Square,
}

impl Move {
    pub fn new(from: Square, to: Square, spear: Square) -> Self {
        Move { from, to, spear }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}({})", self.from, self.to, self.spear)
    }
}

impl FromStr for Move {
    type Err = GameError;

    /// Accepts `d1-d8(i8)` or `d1 d8 i8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidMove(s.to_string());
        let text = s.trim();

        let parts: Vec<&str> = match text.split_once('-') {
            Some((from, rest)) => {
                let (to, spear) = rest
                    .strip_suffix(')')
                    .and_then(|r| r.split_once('('))
                    .ok_or_else(invalid)?;
                vec![from, to, spear]
            }
            None => text.split_whitespace().collect(),
        };

        let [from, to, spear] = parts.as_slice() else {
            return Err(invalid());
        };
        let square = |name: &str| name.parse::<Square>().map_err(|_| invalid());
        Ok(Move::new(square(*from)?, square(*to)?, square(*spear)?))
    }
}

/// Whether the game on a board is still running.
///
/// A board becomes `Decided` only through `make_move` leaving the next
/// side without a move, and goes back to `InProgress` only through `undo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Decided(Player),
}

impl GameStatus {
    pub fn winner(&self) -> Option<Player> {
        match self {
            GameStatus::InProgress => None,
            GameStatus::Decided(player) => Some(*player),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Piece; NUM_SQUARES],
    turn: Player,
    status: GameStatus,
    /// Applied moves, most recent last
    history: Vec<Move>,
}

impl Board {
    /// Create a board in the standard opening position, White to move
    pub fn new() -> Self {
        let mut board = Board::empty();
        for &(col, row) in &WHITE_START {
            board.put(Piece::White, Square::at(col, row));
        }
        for &(col, row) in &BLACK_START {
            board.put(Piece::Black, Square::at(col, row));
        }
        board
    }

    /// A board with no pieces at all, White to move. Used to set up
    /// arbitrary positions with `put`.
    pub fn empty() -> Self {
        Board {
            cells: [Piece::Empty; NUM_SQUARES],
            turn: Player::White,
            status: GameStatus::InProgress,
            history: Vec::new(),
        }
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn winner(&self) -> Option<Player> {
        self.status.winner()
    }

    pub fn is_game_over(&self) -> bool {
        self.winner().is_some()
    }

    pub fn moves_played(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn get(&self, square: Square) -> Piece {
        self.cells[square.index()]
    }

    /// Set `square` to `piece` without touching turn, status or history.
    /// Call `refresh_status` once the position is set up.
    pub fn put(&mut self, piece: Piece, square: Square) {
        self.cells[square.index()] = piece;
    }

    /// Re-derive the status from the position: decided for the opponent
    /// iff the side to move has no legal move.
    pub fn refresh_status(&mut self) {
        self.status = self.derive_status();
    }

    /// Squares holding `side`'s queens, by increasing index
    pub fn queens(&self, side: Player) -> impl Iterator<Item = Square> + '_ {
        let piece = side.piece();
        Square::all().filter(move |&sq| self.get(sq) == piece)
    }

    /// Total number of squares `side`'s queens can move to
    pub fn mobility(&self, side: Player) -> usize {
        self.queens(side)
            .map(|queen| self.reachable_from(queen, None).count())
            .sum()
    }

    /// True iff no queen of `side` has a reachable square
    pub fn no_moves(&self, side: Player) -> bool {
        self.queens(side)
            .all(|queen| self.reachable_from(queen, None).next().is_none())
    }

    /// True iff `from -> to` is a queen move whose target and intermediate
    /// squares are empty. `as_empty`, if given, counts as empty wherever it
    /// appears on the line.
    pub fn is_unblocked_move(&self, from: Square, to: Square, as_empty: Option<Square>) -> bool {
        let open = |sq: Square| self.get(sq) == Piece::Empty || Some(sq) == as_empty;

        let Some(dir) = from.direction(to) else {
            return false;
        };
        if !open(to) {
            return false;
        }

        let mut steps = 1;
        while let Some(next) = from.step(dir, steps) {
            if next == to {
                return true;
            }
            if !open(next) {
                return false;
            }
            steps += 1;
        }
        false
    }

    /// True iff `from` holds a queen of the side to move
    pub fn is_legal_from(&self, from: Square) -> bool {
        self.get(from) == self.turn.piece()
    }

    /// True iff `from -> to` is a legal queen leg, ignoring the spear
    pub fn is_legal_to(&self, from: Square, to: Square) -> bool {
        self.is_legal_from(from) && self.is_unblocked_move(from, to, None)
    }

    /// True iff `from -> to (spear)` is a legal move in this position
    pub fn is_legal(&self, from: Square, to: Square, spear: Square) -> bool {
        self.is_legal_to(from, to) && self.is_unblocked_move(to, spear, Some(from))
    }

    pub fn is_legal_move(&self, mv: Move) -> bool {
        self.is_legal(mv.from, mv.to, mv.spear)
    }

    /// Apply `mv` if it is legal. Returns false, leaving the board
    /// untouched, otherwise.
    pub fn make_move(&mut self, mv: Move) -> bool {
        if !self.is_legal_move(mv) {
            return false;
        }

        let queen = self.get(mv.from);
        self.put(Piece::Empty, mv.from);
        self.put(queen, mv.to);
        self.put(Piece::Spear, mv.spear);
        self.history.push(mv);

        self.turn = self.turn.opponent();
        self.refresh_status();
        true
    }

    /// Take back the last move, returning it. Does nothing on a board
    /// with no history.
    pub fn undo(&mut self) -> Option<Move> {
        let mv = self.history.pop()?;

        // spear first: it may sit on the square the queen came from
        self.put(Piece::Empty, mv.spear);
        let queen = self.get(mv.to);
        self.put(queen, mv.from);
        self.put(Piece::Empty, mv.to);

        self.turn = self.turn.opponent();
        self.refresh_status();
        Some(mv)
    }

    /// Apply a legal move for the lifetime of the returned guard. The move
    /// is undone when the guard is dropped. Returns `None` (and changes
    /// nothing) if `mv` is illegal.
    pub fn explore(&mut self, mv: Move) -> Option<Exploration<'_>> {
        if self.make_move(mv) {
            Some(Exploration { board: self })
        } else {
            None
        }
    }

    /// Squares reachable from `from` by an unblocked queen move, treating
    /// `as_empty` as empty.
    pub fn reachable_from(&self, from: Square, as_empty: Option<Square>) -> ReachableFrom<'_> {
        ReachableFrom {
            board: self,
            cursor: ReachCursor::new(from, as_empty),
        }
    }

    /// All legal moves for `side`, whether or not it is `side`'s turn
    pub fn legal_moves(&self, side: Player) -> LegalMoves<'_> {
        LegalMoves {
            board: self,
            cursor: MoveCursor::new(side),
        }
    }

    fn derive_status(&self) -> GameStatus {
        if self.no_moves(self.turn) {
            GameStatus::Decided(self.turn.opponent())
        } else {
            GameStatus::InProgress
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..SIZE).rev() {
            f.write_str("  ")?;
            for col in 0..SIZE {
                write!(f, " {}", self.get(Square::at(col, row)))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Scope guard returned by [`Board::explore`].
pub struct Exploration<'a> {
    board: &'a mut Board,
}

impl Deref for Exploration<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Exploration<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Exploration<'_> {
    fn drop(&mut self) {
        self.board.undo();
    }
}

/// Resume state of a reachable-squares scan: the current direction and
/// how far along it the last yielded square was.
///
/// The cursor holds no reference to the board, so it can be advanced
/// against a board that is mutated in between, as long as the board is
/// back in the same position at each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReachCursor {
    from: Square,
    as_empty: Option<Square>,
    dir: usize,
    steps: usize,
}

impl ReachCursor {
    pub fn new(from: Square, as_empty: Option<Square>) -> Self {
        ReachCursor {
            from,
            as_empty,
            dir: 0,
            steps: 0,
        }
    }

    pub fn advance(&mut self, board: &Board) -> Option<Square> {
        while let Some(dir) = Direction::from_index(self.dir) {
            if let Some(next) = self.from.step(dir, self.steps + 1) {
                if board.get(next) == Piece::Empty || Some(next) == self.as_empty {
                    self.steps += 1;
                    return Some(next);
                }
            }
            self.dir += 1;
            self.steps = 0;
        }
        None
    }
}

/// Resume state of a legal-move scan: the next square to inspect for a
/// queen, the current queen with its destination cursor, and the current
/// destination with its spear cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCursor {
    piece: Piece,
    scan: usize,
    queen: Option<(Square, ReachCursor)>,
    dest: Option<(Square, Square, ReachCursor)>,
}

impl MoveCursor {
    pub fn new(side: Player) -> Self {
        MoveCursor {
            piece: side.piece(),
            scan: 0,
            queen: None,
            dest: None,
        }
    }

    pub fn advance(&mut self, board: &Board) -> Option<Move> {
        loop {
            if let Some((from, to, spears)) = self.dest.as_mut() {
                if let Some(spear) = spears.advance(board) {
                    return Some(Move::new(*from, *to, spear));
                }
                self.dest = None;
            }

            if let Some((from, dests)) = self.queen.as_mut() {
                if let Some(to) = dests.advance(board) {
                    self.dest = Some((*from, to, ReachCursor::new(to, Some(*from))));
                    continue;
                }
                self.queen = None;
            }

            let from = self.next_queen(board)?;
            self.queen = Some((from, ReachCursor::new(from, None)));
        }
    }

    fn next_queen(&mut self, board: &Board) -> Option<Square> {
        while let Some(square) = Square::from_index(self.scan) {
            self.scan += 1;
            if board.get(square) == self.piece {
                return Some(square);
            }
        }
        None
    }
}

pub struct ReachableFrom<'a> {
    board: &'a Board,
    cursor: ReachCursor,
}

impl Iterator for ReachableFrom<'_> {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        self.cursor.advance(self.board)
    }
}

pub struct LegalMoves<'a> {
    board: &'a Board,
    cursor: MoveCursor,
}

impl Iterator for LegalMoves<'_> {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        self.cursor.advance(self.board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn mv(text: &str) -> Move {
        text.parse().unwrap()
    }

    fn names(squares: impl Iterator<Item = Square>) -> Vec<&'static str> {
        squares.map(Square::name).collect()
    }

    /// Play `plies` random legal moves from the opening
    fn random_position(seed: u64, plies: usize) -> Board {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new();
        for _ in 0..plies {
            let moves: Vec<Move> = board.legal_moves(board.turn()).collect();
            match moves.choose(&mut rng) {
                Some(&m) => assert!(board.make_move(m)),
                None => break,
            }
        }
        board
    }

    /// White queens parked in a1, a10, j1 and j10. All but a1 are walled
    /// in by spears; a1 can only reach b1, because a black queen sits on c1.
    fn cornered_board() -> Board {
        let mut board = Board::empty();
        for name in ["a1", "a10", "j1", "j10"] {
            board.put(Piece::White, sq(name));
        }
        for name in ["a2", "b2", "b10", "a9", "b9", "i1", "j2", "i2", "i10", "j9", "i9"] {
            board.put(Piece::Spear, sq(name));
        }
        for name in ["c1", "c3", "e5", "h8"] {
            board.put(Piece::Black, sq(name));
        }
        board
    }

    #[test]
    fn test_initial_setup() {
        let board = Board::new();

        for name in ["d1", "a4", "g1", "j4"] {
            assert_eq!(board.get(sq(name)), Piece::White);
        }
        for name in ["a7", "d10", "g10", "j7"] {
            assert_eq!(board.get(sq(name)), Piece::Black);
        }
        assert_eq!(board.queens(Player::White).count(), 4);
        assert_eq!(board.queens(Player::Black).count(), 4);
        assert_eq!(
            Square::all().filter(|&s| board.get(s) == Piece::Empty).count(),
            92
        );

        assert_eq!(board.turn(), Player::White);
        assert_eq!(board.status(), GameStatus::InProgress);
        assert_eq!(board.moves_played(), 0);
    }

    #[test]
    fn test_put_get() {
        let mut board = Board::new();
        board.put(Piece::Black, Square::at(3, 5));
        assert_eq!(board.get(Square::at(3, 5)), Piece::Black);
        board.put(Piece::White, Square::at(9, 9));
        assert_eq!(board.get(Square::at(9, 9)), Piece::White);
        board.put(Piece::Empty, Square::at(3, 5));
        assert_eq!(board.get(Square::at(3, 5)), Piece::Empty);
    }

    #[test]
    fn test_is_unblocked_move() {
        let board = Board::new();

        assert!(board.is_unblocked_move(sq("d1"), sq("d9"), None));
        // target occupied
        assert!(!board.is_unblocked_move(sq("d1"), sq("d10"), None));
        assert!(!board.is_unblocked_move(sq("a4"), sq("d1"), None));
        // path crosses a7
        assert!(!board.is_unblocked_move(sq("a4"), sq("a9"), None));
        // not a queen line
        assert!(!board.is_unblocked_move(sq("d1"), sq("e3"), None));
        assert!(!board.is_unblocked_move(sq("e5"), sq("e5"), None));
    }

    #[test]
    fn test_is_unblocked_move_as_empty() {
        let board = Board::new();

        // spear thrown back onto the square the queen left
        assert!(board.is_unblocked_move(sq("g2"), sq("g1"), Some(sq("g1"))));
        assert!(!board.is_unblocked_move(sq("g2"), sq("g1"), None));

        // spear thrown through the square the queen left
        assert!(board.is_unblocked_move(sq("a5"), sq("a3"), Some(sq("a4"))));
        assert!(!board.is_unblocked_move(sq("a5"), sq("a3"), None));
    }

    #[test]
    fn test_is_legal() {
        let board = Board::new();

        assert!(board.is_legal_from(sq("d1")));
        assert!(!board.is_legal_from(sq("d10")));
        assert!(!board.is_legal_from(sq("e5")));

        assert!(board.is_legal_to(sq("d1"), sq("d8")));
        assert!(!board.is_legal_to(sq("d1"), sq("d10")));
        assert!(!board.is_legal_to(sq("a4"), sq("d1")));
        assert!(board.is_legal_to(sq("g1"), sq("i3")));

        assert!(!board.is_legal(sq("d1"), sq("a1"), sq("a5")));
        assert!(board.is_legal(sq("g1"), sq("g6"), sq("d9")));
        assert!(board.is_legal(sq("d1"), sq("c2"), sq("j9")));
        assert!(board.is_legal(sq("j4"), sq("h2"), sq("a9")));
        assert!(!board.is_legal(sq("a4"), sq("g4"), sq("g10")));
        assert!(!board.is_legal(sq("g1"), sq("g7"), sq("d10")));
        assert!(board.is_legal(sq("g1"), sq("g2"), sq("g1")));
        assert!(!board.is_legal(sq("i4"), sq("j5"), sq("b3")));

        assert!(board.is_legal_move(mv("g1-g2(g1)")));
        assert!(board.is_legal_move(mv("j4-h2(a9)")));
        assert!(!board.is_legal_move(mv("a4-g4(g10)")));
        assert!(!board.is_legal_move(mv("a4-a7(a4)")));
    }

    #[test]
    fn test_legality_weakens_monotonically() {
        for (seed, plies) in [(1, 0), (2, 12), (3, 30)] {
            let board = random_position(seed, plies);
            for from in Square::all() {
                for to in Square::all() {
                    if board.is_legal_to(from, to) {
                        assert!(board.is_legal_from(from));
                    }
                    if !board.is_legal_from(from) {
                        continue;
                    }
                    for spear in Square::all() {
                        if board.is_legal(from, to, spear) {
                            assert!(board.is_legal_to(from, to), "{from}-{to}({spear})");
                        }
                    }
                }
            }
        }

        // the converse does not hold
        let board = Board::new();
        assert!(board.is_legal_to(sq("d1"), sq("a1")));
        assert!(!board.is_legal(sq("d1"), sq("a1"), sq("a5")));
        assert!(board.is_legal_from(sq("d1")));
        assert!(!board.is_legal_to(sq("d1"), sq("d10")));
    }

    #[test]
    fn test_reachable_from_order() {
        let board = Board::new();
        assert_eq!(
            names(board.reachable_from(sq("d1"), None)),
            vec![
                "d2", "d3", "d4", "d5", "d6", "d7", "d8", "d9", // N
                "e2", "f3", "g4", "h5", "i6", // NE
                "e1", "f1", // E
                "c1", "b1", "a1", // W
                "c2", "b3", // NW
            ]
        );
    }

    #[test]
    fn test_reachable_from_yields_as_empty() {
        let board = Board::new();
        let from_d2: Vec<Square> = board.reachable_from(sq("d2"), Some(sq("d1"))).collect();
        assert!(from_d2.contains(&sq("d1")));
        let without: Vec<Square> = board.reachable_from(sq("d2"), None).collect();
        assert!(!without.contains(&sq("d1")));
        assert_eq!(from_d2.len(), without.len() + 1);
    }

    #[test]
    fn test_reach_cursor_stays_exhausted() {
        let mut board = Board::empty();
        board.put(Piece::White, sq("a1"));
        for name in ["a2", "b2", "b1"] {
            board.put(Piece::Spear, sq(name));
        }
        let mut cursor = ReachCursor::new(sq("a1"), None);
        assert_eq!(cursor.advance(&board), None);
        assert_eq!(cursor.advance(&board), None);

        let mut cursor = ReachCursor::new(sq("a1"), Some(sq("b1")));
        assert_eq!(cursor.advance(&board), Some(sq("b1")));
        assert_eq!(cursor.advance(&board), Some(sq("c1")));
    }

    #[test]
    fn test_legal_moves_opening_count() {
        let board = Board::new();
        assert_eq!(board.legal_moves(Player::White).count(), 2176);
        assert_eq!(board.legal_moves(Player::Black).count(), 2176);
    }

    #[test]
    fn test_legal_moves_order() {
        let board = Board::new();
        let first: Vec<Move> = board.legal_moves(Player::White).take(3).collect();
        assert_eq!(first, vec![mv("d1-d2(d3)"), mv("d1-d2(d4)"), mv("d1-d2(d5)")]);

        // queens are visited by increasing square index
        let mut queens = Vec::new();
        for m in board.legal_moves(Player::White) {
            if queens.last() != Some(&m.from) {
                queens.push(m.from);
            }
        }
        assert_eq!(names(queens.into_iter()), vec!["d1", "g1", "a4", "j4"]);
    }

    #[test]
    fn test_legal_moves_match_exhaustive_check() {
        for (seed, plies) in [(7, 0), (8, 9), (9, 25), (10, 40)] {
            let board = random_position(seed, plies);
            let side = board.turn();
            let generated: Vec<Move> = board.legal_moves(side).collect();
            let unique: HashSet<Move> = generated.iter().copied().collect();
            assert_eq!(unique.len(), generated.len(), "duplicate moves generated");

            let mut expected = 0;
            for from in board.queens(side) {
                for to in Square::all() {
                    for spear in Square::all() {
                        if board.is_legal(from, to, spear) {
                            expected += 1;
                            assert!(unique.contains(&Move::new(from, to, spear)));
                        }
                    }
                }
            }
            assert_eq!(generated.len(), expected);
        }
    }

    #[test]
    fn test_legal_moves_skip_trapped_queens() {
        let mut board = cornered_board();
        // wall in a1 completely; white still has no other queen with moves
        board.put(Piece::Spear, sq("b1"));
        assert_eq!(board.legal_moves(Player::White).next(), None);
        assert!(board.no_moves(Player::White));
        assert_eq!(board.mobility(Player::White), 0);

        // free j10: the scan must get past the trapped a1, a10 and j1
        board.put(Piece::Empty, sq("i9"));
        let moves: Vec<Move> = board.legal_moves(Player::White).collect();
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.from == sq("j10")));
    }

    #[test]
    fn test_make_move_scenario() {
        let mut board = Board::new();
        let before = board.clone();

        assert!(board.make_move(mv("d1-d8(i8)")));

        assert_eq!(board.get(sq("d1")), Piece::Empty);
        assert_eq!(board.get(sq("d8")), Piece::White);
        assert_eq!(board.get(sq("i8")), Piece::Spear);
        for square in Square::all() {
            if !["d1", "d8", "i8"].contains(&square.name()) {
                assert_eq!(board.get(square), before.get(square), "{square} changed");
            }
        }
        assert_eq!(board.turn(), Player::Black);
        assert_eq!(board.moves_played(), 1);
        assert_eq!(board.history(), &[mv("d1-d8(i8)")]);
    }

    #[test]
    fn test_illegal_move_is_noop() {
        let mut board = Board::new();
        let before = board.clone();

        assert!(!board.make_move(mv("a4-a7(a4)")));
        assert!(!board.make_move(mv("d10-d9(d8)")));
        assert!(!board.make_move(mv("e5-e6(e7)")));
        assert_eq!(board, before);
    }

    #[test]
    fn test_make_move_and_undo_sequence() {
        let mut board = Board::new();

        assert!(board.make_move(mv("d1-d8(i8)")));
        assert!(board.make_move(mv("d10-d9(c9)")));
        assert_eq!(board.get(sq("c9")), Piece::Spear);
        assert_eq!(board.get(sq("d9")), Piece::Black);
        assert_eq!(board.get(sq("d10")), Piece::Empty);
        assert!(board.make_move(mv("d8-d1(d8)")));
        assert!(board.make_move(mv("d9-c8(b8)")));

        assert_eq!(board.undo(), Some(mv("d9-c8(b8)")));
        assert_eq!(board.get(sq("d1")), Piece::White);
        assert_eq!(board.get(sq("d8")), Piece::Spear);
        assert_eq!(board.turn(), Player::Black);

        board.undo();
        board.undo();
        board.undo();
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_undo_spear_on_origin() {
        let mut board = Board::new();
        assert!(board.make_move(mv("j4-i3(j4)")));
        assert_eq!(board.get(sq("j4")), Piece::Spear);
        assert_eq!(board.get(sq("i3")), Piece::White);

        board.undo();
        assert_eq!(board.get(sq("i3")), Piece::Empty);
        assert_eq!(board.get(sq("j4")), Piece::White);
    }

    #[test]
    fn test_undo_on_empty_history_is_noop() {
        let mut board = Board::new();
        assert_eq!(board.undo(), None);
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_make_undo_round_trip_random_games() {
        let mut rng = StdRng::seed_from_u64(0xA11CE);
        for _ in 0..3 {
            let mut board = Board::new();
            while !board.is_game_over() {
                assert!(!board.no_moves(board.turn()));
                let moves: Vec<Move> = board.legal_moves(board.turn()).collect();
                let &chosen = moves.choose(&mut rng).unwrap();

                let before = board.clone();
                assert!(board.make_move(chosen));
                assert_eq!(board.moves_played(), before.moves_played() + 1);
                let after = board.clone();

                assert_eq!(board.undo(), Some(chosen));
                assert_eq!(board, before);

                assert!(board.make_move(chosen));
                assert_eq!(board, after);
            }
            assert!(board.no_moves(board.turn()));
            assert_eq!(board.winner(), Some(board.turn().opponent()));
        }
    }

    #[test]
    fn test_terminal_detection_and_reversal() {
        let mut board = cornered_board();
        assert!(board.make_move(mv("a1-b1(a1)")));
        assert_eq!(board.status(), GameStatus::InProgress);
        assert!(!board.no_moves(Player::White));

        // c2 was b1's last way out
        assert!(board.make_move(mv("c3-c2(d3)")));
        assert!(board.no_moves(Player::White));
        assert_eq!(board.turn(), Player::White);
        assert_eq!(board.status(), GameStatus::Decided(Player::Black));
        assert_eq!(board.winner(), Some(Player::Black));

        board.undo();
        assert_eq!(board.winner(), None);
        assert!(!board.no_moves(Player::White));
        assert_eq!(board.turn(), Player::Black);
    }

    #[test]
    fn test_refresh_status_after_setup() {
        let mut board = Board::empty();
        board.put(Piece::White, sq("a1"));
        for name in ["a2", "b2", "b1"] {
            board.put(Piece::Spear, sq(name));
        }
        board.put(Piece::Black, sq("j10"));
        assert_eq!(board.winner(), None);

        board.refresh_status();
        assert_eq!(board.status(), GameStatus::Decided(Player::Black));
        assert!(board.is_game_over());

        board.put(Piece::Empty, sq("b1"));
        board.refresh_status();
        assert_eq!(board.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_explore_undoes_on_drop() {
        let mut board = Board::new();
        let before = board.clone();

        {
            let mut child = board.explore(mv("g1-g6(d9)")).unwrap();
            assert_eq!(child.get(sq("g6")), Piece::White);
            assert_eq!(child.turn(), Player::Black);

            let grandchild = child.explore(mv("a7-a5(b6)")).unwrap();
            assert_eq!(grandchild.moves_played(), 2);
        }
        assert_eq!(board, before);

        assert!(board.explore(mv("g1-g10(g9)")).is_none());
        assert_eq!(board, before);
    }

    #[test]
    fn test_mobility() {
        let board = Board::new();
        assert_eq!(board.reachable_from(sq("d1"), None).count(), 20);
        assert_eq!(board.mobility(Player::White), board.mobility(Player::Black));
    }

    #[test]
    fn test_move_notation() {
        let m = mv("d1-d8(i8)");
        assert_eq!(m, Move::new(sq("d1"), sq("d8"), sq("i8")));
        assert_eq!(m.to_string(), "d1-d8(i8)");
        assert_eq!(mv("  j10 a10 a1 "), Move::new(sq("j10"), sq("a10"), sq("a1")));
        assert_eq!(mv("a10-b10(j10)").to_string(), "a10-b10(j10)");

        for bad in ["", "d1-d8", "d1-d8(i8", "d1-k8(i8)", "d1 d8", "d1 d8 i8 i9", "d1-d8(i8)x"] {
            assert!(
                matches!(bad.parse::<Move>(), Err(GameError::InvalidMove(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_move_serde() {
        let json = serde_json::to_string(&mv("d1-d8(i8)")).unwrap();
        assert_eq!(json, r#"{"from":"d1","to":"d8","spear":"i8"}"#);
        let back: Move = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mv("d1-d8(i8)"));
    }

    #[test]
    fn test_display() {
        let text = Board::new().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "   - - - B - - B - - -");
        assert_eq!(lines[3], "   B - - - - - - - - B");
        assert_eq!(lines[9], "   - - - W - - W - - -");
    }
}
