//! Tic-tac-toe board state machine and heuristic opponent.

mod action;
mod opponent;
mod position;
mod rules;
mod types;

pub use action::{Move, MoveError};
pub use opponent::{Reason, StrategyError, choose_move, choose_with_reason};
pub use position::Position;
pub use rules::Game;
pub use types::{Board, GameState, LINES, Phase, Player, Square};
