use crate::game::{Board, Move, Player};
use crate::search::{AlphaBeta, SearchConfig};
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use std::time::Duration;

/// Trait that all bots must implement
pub trait Bot: Send {
    /// Get the name of the bot
    fn name(&self) -> &str;

    /// Get the next move for the side to move on `board`.
    /// The bot has a time limit to respond
    fn get_move(&mut self, board: &Board, time_limit: Duration) -> Option<Move>;

    /// Notified when the game starts
    fn game_start(&mut self, _player: Player) {}

    /// Notified when a move is made (by either player)
    fn notify_move(&mut self, _mv: Move) {}

    /// Notified when the game ends
    fn game_end(&mut self) {}
}

/// Plays a uniformly random legal move
pub struct RandomBot {
    name: String,
    rng: StdRng,
}

impl RandomBot {
    pub fn new(name: String, seed: u64) -> Self {
        RandomBot {
            name,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Bot for RandomBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, board: &Board, _time_limit: Duration) -> Option<Move> {
        board.legal_moves(board.turn()).choose(&mut self.rng)
    }
}

/// Minimax with alpha-beta pruning over queen mobility
pub struct AlphaBetaBot {
    name: String,
    search: AlphaBeta,
}

impl AlphaBetaBot {
    pub fn new(name: String, config: SearchConfig) -> Self {
        AlphaBetaBot {
            name,
            search: AlphaBeta::new(config),
        }
    }
}

impl Bot for AlphaBetaBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, board: &Board, _time_limit: Duration) -> Option<Move> {
        if board.is_game_over() {
            return None;
        }
        // the search walks the board in place, so work on our own copy
        let mut scratch = board.clone();
        self.search.find_move(&mut scratch)
    }
}
