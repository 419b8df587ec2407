//! Fixed-priority heuristic opponent.
//!
//! One ply of lookahead only: win if possible, otherwise block, otherwise
//! take the center, a corner, or the first free square. A fork beats it.

use super::{Board, Player, Position};
use tracing::{debug, instrument};

/// Error raised when the opponent is asked to move with nothing left to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum StrategyError {
    /// The board is full. Callers must check the phase before asking for a move.
    #[display("No move available: the board is full")]
    NoMoveAvailable,
}

/// Which priority rule produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Reason {
    /// Completes a line for the mover.
    #[display("win")]
    Win,
    /// Stops the other player completing a line.
    #[display("block")]
    Block,
    /// Takes the center square.
    #[display("center")]
    Center,
    /// Takes the first free corner.
    #[display("corner")]
    Corner,
    /// Falls back to the first free square.
    #[display("first free")]
    FirstFree,
}

/// Chooses the square `me` should mark next.
///
/// Lookahead is done on copies of `board`; the caller's board is never touched.
///
/// # Errors
///
/// Returns [`StrategyError::NoMoveAvailable`] when no square is empty.
#[instrument(skip(board), fields(board = %board.display()))]
pub fn choose_move(board: &Board, me: Player, opponent: Player) -> Result<Position, StrategyError> {
    let (position, reason) = choose_with_reason(board, me, opponent)?;
    debug!(%position, %reason, "Opponent chose move");
    Ok(position)
}

/// Like [`choose_move`], but also reports which rule fired.
pub fn choose_with_reason(
    board: &Board,
    me: Player,
    opponent: Player,
) -> Result<(Position, Reason), StrategyError> {
    let free = Position::valid_moves(board);
    if free.is_empty() {
        return Err(StrategyError::NoMoveAvailable);
    }

    let completes_line = |player: Player| {
        free.iter()
            .copied()
            .find(|&pos| board.with_mark(pos, player).winner() == Some(player))
    };

    if let Some(pos) = completes_line(me) {
        return Ok((pos, Reason::Win));
    }
    if let Some(pos) = completes_line(opponent) {
        return Ok((pos, Reason::Block));
    }
    if board.is_empty(Position::Center) {
        return Ok((Position::Center, Reason::Center));
    }
    if let Some(pos) = Position::CORNERS.into_iter().find(|&pos| board.is_empty(pos)) {
        return Ok((pos, Reason::Corner));
    }
    Ok((free[0], Reason::FirstFree))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(pattern: &str) -> Board {
        Board::from_pattern(pattern).expect("valid pattern")
    }

    #[test]
    fn test_win_beats_block() {
        // O can finish the middle row; X threatens the top row.
        let b = board("XX_ OO_ X__");
        assert_eq!(
            choose_with_reason(&b, Player::O, Player::X),
            Ok((Position::MiddleRight, Reason::Win))
        );
    }

    #[test]
    fn test_block_top_row() {
        let b = board("X_X _O_ ___");
        assert_eq!(
            choose_with_reason(&b, Player::O, Player::X),
            Ok((Position::TopCenter, Reason::Block))
        );
    }

    #[test]
    fn test_first_free_corner_when_center_taken() {
        let b = board("X__ _O_ ___");
        assert_eq!(
            choose_with_reason(&b, Player::O, Player::X),
            Ok((Position::TopRight, Reason::Corner))
        );
    }

    #[test]
    fn test_first_free_fallback() {
        // Center and corners are taken and no free square completes a line.
        let b = board("XOX _X_ OXO");
        assert_eq!(
            choose_with_reason(&b, Player::O, Player::X),
            Ok((Position::MiddleLeft, Reason::FirstFree))
        );
    }

    #[test]
    fn test_full_board_is_error() {
        let b = board("XOX XOO OXX");
        assert_eq!(
            choose_move(&b, Player::O, Player::X),
            Err(StrategyError::NoMoveAvailable)
        );
    }
}
