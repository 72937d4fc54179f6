//! Depth-limited minimax with alpha-beta pruning.
//!
//! The search walks a single board in place: every candidate move is
//! applied through [`Board::explore`] and undone when its guard goes out
//! of scope, and moves are enumerated with a [`MoveCursor`] so that the
//! board can be mutated between two calls to `advance`.

use crate::game::{Board, Move, MoveCursor, Player};
use log::debug;
use serde::{Deserialize, Serialize};

/// A position magnitude indicating a win (for White if positive, Black if
/// negative).
pub const WINNING_VALUE: i32 = i32::MAX - 1;

/// Bound larger than any position value.
pub const INFINITY: i32 = i32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Moves played per extra ply of search depth
    pub depth_divisor: usize,
    /// Depth searched from the opening
    pub depth_increment: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth_divisor: 19,
            depth_increment: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
}

pub struct AlphaBeta {
    config: SearchConfig,
    stats: SearchStats,
}

impl AlphaBeta {
    pub fn new(config: SearchConfig) -> Self {
        AlphaBeta {
            config,
            stats: SearchStats::default(),
        }
    }

    /// Counters from the last call to `find_move` / `find_move_at_depth`
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Search depth for `board`: deeper as the game goes on and the
    /// branching factor shrinks.
    pub fn max_depth(&self, board: &Board) -> usize {
        board.moves_played() / self.config.depth_divisor.max(1) + self.config.depth_increment
    }

    /// Best move for the side to move, searched to `max_depth(board)`.
    ///
    /// The side to move must have a legal move; `None` is returned
    /// otherwise. The board is left exactly as it was found.
    pub fn find_move(&mut self, board: &mut Board) -> Option<Move> {
        let depth = self.max_depth(board);
        self.find_move_at_depth(board, depth).map(|(mv, _)| mv)
    }

    /// Best move for the side to move and its value, searching `depth`
    /// plies (at least one).
    pub fn find_move_at_depth(&mut self, board: &mut Board, depth: usize) -> Option<(Move, i32)> {
        self.stats = SearchStats::default();
        let depth = depth.max(1);

        let (value, best) = self.search(board, depth, -INFINITY, INFINITY);

        debug!(
            "searched depth {} for {:?}: best {:?} value {} ({} nodes, {} cutoffs)",
            depth,
            board.turn(),
            best.map(|mv| mv.to_string()),
            value,
            self.stats.nodes,
            self.stats.cutoffs
        );
        best.map(|mv| (mv, value))
    }

    /// Value of `board` for White, and the move achieving it. White
    /// maximizes and Black minimizes; a later move matching the best value
    /// replaces it, so the last such move is kept.
    fn search(&mut self, board: &mut Board, depth: usize, mut alpha: i32, mut beta: i32) -> (i32, Option<Move>) {
        self.stats.nodes += 1;
        if depth == 0 || board.is_game_over() {
            return (static_score(board), None);
        }

        let side = board.turn();
        let maximizing = side == Player::White;
        let mut best_value = if maximizing { -INFINITY } else { INFINITY };
        let mut best_move = None;

        let mut cursor = MoveCursor::new(side);
        while let Some(mv) = cursor.advance(board) {
            let value = match board.explore(mv) {
                Some(mut child) => self.search(&mut child, depth - 1, alpha, beta).0,
                None => continue,
            };

            let improves = if maximizing {
                value >= best_value
            } else {
                value <= best_value
            };
            if !improves {
                continue;
            }

            best_value = value;
            best_move = Some(mv);
            if maximizing {
                alpha = alpha.max(value);
            } else {
                beta = beta.min(value);
            }
            if beta <= alpha {
                self.stats.cutoffs += 1;
                break;
            }
        }

        if best_move.is_none() {
            return (loss_for(side), None);
        }
        (best_value, best_move)
    }
}

impl Default for AlphaBeta {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

/// Heuristic value of `board` for White: the winner's extreme value once
/// the game is decided, otherwise White's queen mobility minus Black's.
pub fn static_score(board: &Board) -> i32 {
    match board.winner() {
        Some(Player::White) => WINNING_VALUE,
        Some(Player::Black) => -WINNING_VALUE,
        None => board.mobility(Player::White) as i32 - board.mobility(Player::Black) as i32,
    }
}

/// Plain minimax to `depth` plies with no pruning.
pub fn minimax(board: &mut Board, depth: usize) -> i32 {
    if depth == 0 || board.is_game_over() {
        return static_score(board);
    }

    let side = board.turn();
    let mut best: Option<i32> = None;
    let mut cursor = MoveCursor::new(side);
    while let Some(mv) = cursor.advance(board) {
        if let Some(mut child) = board.explore(mv) {
            let value = minimax(&mut child, depth - 1);
            best = Some(match (best, side) {
                (None, _) => value,
                (Some(b), Player::White) => b.max(value),
                (Some(b), Player::Black) => b.min(value),
            });
        }
    }
    best.unwrap_or_else(|| loss_for(side))
}

fn loss_for(side: Player) -> i32 {
    match side {
        Player::White => -WINNING_VALUE,
        Player::Black => WINNING_VALUE,
    }
}
