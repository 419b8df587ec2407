//! First-class action types for tic-tac-toe.
//!
//! Moves are domain events, not side effects. They represent
//! the player's intent and can be validated independently of execution.

use super::{Player, Position};
use serde::{Deserialize, Serialize};

/// A move in tic-tac-toe: a player placing their mark at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Move {
    /// The player making the move.
    pub player: Player,
    /// The position where the player places their mark.
    pub position: Position,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.player, self.position.label())
    }
}

/// Why a mark was refused.
///
/// Every variant is an invalid move; callers driven by human input treat
/// them all as a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The game is already won or drawn.
    #[display("Game is already over")]
    GameOver,

    /// The cell index is not on the board.
    #[display("Cell {_0} is out of range (must be 0-8)")]
    OutOfRange(usize),

    /// The square at the position is already occupied.
    #[display("Square {_0} is already occupied")]
    SquareOccupied(Position),

    /// It's not this player's turn.
    #[display("It's not {_0}'s turn")]
    WrongPlayer(Player),
}

impl std::error::Error for MoveError {}
