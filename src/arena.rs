use crate::bot::{AlphaBetaBot, Bot, RandomBot};
use crate::error::GameError;
use crate::game::{Board, Move, Player};
use crate::search::SearchConfig;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotKind {
    AlphaBeta,
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub time_per_move_ms: u64,
    pub white: BotKind,
    pub black: BotKind,
    /// Seed for random bots
    pub seed: u64,
    pub search: SearchConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            time_per_move_ms: 5_000,
            white: BotKind::AlphaBeta,
            black: BotKind::Random,
            seed: 0,
            search: SearchConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn time_per_move(&self) -> Duration {
        Duration::from_millis(self.time_per_move_ms)
    }

    /// Build the bot configured for `player`
    pub fn build_bot(&self, player: Player) -> Box<dyn Bot> {
        let (kind, seed) = match player {
            Player::White => (self.white, self.seed),
            Player::Black => (self.black, self.seed.wrapping_add(1)),
        };
        let name = format!("{:?}{:?}", kind, player);
        match kind {
            BotKind::AlphaBeta => Box::new(AlphaBetaBot::new(name, self.search)),
            BotKind::Random => Box::new(RandomBot::new(name, seed)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchResult {
    Win {
        side: Player,
        winner_name: String,
        moves: usize,
    },
    Timeout {
        violator: String,
        winner: String,
    },
    IllegalMove {
        violator: String,
        winner: String,
    },
    NoMove {
        violator: String,
        winner: String,
    },
}

impl MatchResult {
    pub fn winner(&self) -> &str {
        match self {
            MatchResult::Win { winner_name, .. } => winner_name,
            MatchResult::Timeout { winner, .. } => winner,
            MatchResult::IllegalMove { winner, .. } => winner,
            MatchResult::NoMove { winner, .. } => winner,
        }
    }
}

/// Runs one game between two bots and owns the authoritative board.
pub struct Match {
    config: MatchConfig,
    board: Board,
    white_bot: Box<dyn Bot>,
    black_bot: Box<dyn Bot>,
}

impl Match {
    pub fn new(white_bot: Box<dyn Bot>, black_bot: Box<dyn Bot>, config: MatchConfig) -> Self {
        Self::with_board(white_bot, black_bot, config, Board::new())
    }

    /// Start from a prepared position instead of the opening
    pub fn with_board(
        white_bot: Box<dyn Bot>,
        black_bot: Box<dyn Bot>,
        config: MatchConfig,
        mut board: Board,
    ) -> Self {
        board.refresh_status();
        Match {
            config,
            board,
            white_bot,
            black_bot,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Moves applied so far
    pub fn record(&self) -> &[Move] {
        self.board.history()
    }

    /// Apply a finalized move to the game and tell both bots about it.
    pub fn report_move(&mut self, mv: Move) -> Result<(), GameError> {
        if self.board.is_game_over() {
            return Err(GameError::GameOver);
        }
        if !self.board.make_move(mv) {
            return Err(GameError::IllegalMove(mv));
        }

        self.white_bot.notify_move(mv);
        self.black_bot.notify_move(mv);
        Ok(())
    }

    pub fn play(&mut self) -> MatchResult {
        self.white_bot.game_start(Player::White);
        self.black_bot.game_start(Player::Black);

        info!(
            "Match starting: {} (White) vs {} (Black)",
            self.white_bot.name(),
            self.black_bot.name()
        );
        debug!("Initial board:\n{}", self.board);

        let result = loop {
            if let Some(side) = self.board.winner() {
                let winner_name = self.bot_name(side).to_string();
                info!(
                    "{} wins as {:?} after {} moves",
                    winner_name,
                    side,
                    self.board.moves_played()
                );
                break MatchResult::Win {
                    side,
                    winner_name,
                    moves: self.board.moves_played(),
                };
            }

            if let Some(forfeit) = self.play_turn() {
                break forfeit;
            }
        };

        self.white_bot.game_end();
        self.black_bot.game_end();
        result
    }

    fn play_turn(&mut self) -> Option<MatchResult> {
        let side = self.board.turn();
        let bot = match side {
            Player::White => &mut self.white_bot,
            Player::Black => &mut self.black_bot,
        };

        let start = Instant::now();
        let mv = bot.get_move(&self.board, self.config.time_per_move());
        let elapsed = start.elapsed();

        self.handle_move_result(mv, elapsed, side)
    }

    fn handle_move_result(
        &mut self,
        mv: Option<Move>,
        elapsed: Duration,
        side: Player,
    ) -> Option<MatchResult> {
        let violator = self.bot_name(side).to_string();
        let winner = self.bot_name(side.opponent()).to_string();

        if elapsed > self.config.time_per_move() {
            warn!(
                "TIMEOUT: {} took {:?} (limit: {:?})",
                violator,
                elapsed,
                self.config.time_per_move()
            );
            return Some(MatchResult::Timeout { violator, winner });
        }

        let Some(mv) = mv else {
            warn!("{} returned no move", violator);
            return Some(MatchResult::NoMove { violator, winner });
        };

        if let Err(e) = self.report_move(mv) {
            warn!("ILLEGAL MOVE: {} - {}", violator, e);
            return Some(MatchResult::IllegalMove { violator, winner });
        }

        info!(
            "Move {}: {} plays {} (took {:?})",
            self.board.moves_played(),
            violator,
            mv,
            elapsed
        );
        debug!("\n{}", self.board);
        None
    }

    fn bot_name(&self, side: Player) -> &str {
        match side {
            Player::White => self.white_bot.name(),
            Player::Black => self.black_bot.name(),
        }
    }
}
