//! Game logic and rules for tic-tac-toe.

use super::action::{Move, MoveError};
use super::types::{GameState, Phase, Player, Square};
use super::Position;
use tracing::{debug, info, instrument};

/// Tic-tac-toe board state machine.
///
/// Owns the single [`GameState`]. A mark is either applied in full (cell set,
/// phase recomputed, turn flipped) or rejected with no change at all.
#[derive(Debug, Clone, Default)]
pub struct Game {
    state: GameState,
}

impl Game {
    /// Creates a new game.
    #[instrument]
    pub fn new() -> Self {
        Self {
            state: GameState::new(),
        }
    }

    /// Returns the current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Marks `cell` (0-8) for `player`.
    ///
    /// Returns the phase after the mark.
    ///
    /// # Errors
    ///
    /// Returns a [`MoveError`] and leaves the state untouched if the game is
    /// over, the cell is off the board or occupied, or it is not `player`'s
    /// turn.
    #[instrument(skip(self), fields(turn = %self.state.turn(), phase = %self.state.phase()))]
    pub fn apply_mark(&mut self, cell: usize, player: Player) -> Result<Phase, MoveError> {
        if !self.state.phase().is_playing() {
            return Err(MoveError::GameOver);
        }
        let pos = Position::from_index(cell).ok_or(MoveError::OutOfRange(cell))?;
        if !self.state.board().is_empty(pos) {
            return Err(MoveError::SquareOccupied(pos));
        }
        if player != self.state.turn() {
            return Err(MoveError::WrongPlayer(player));
        }

        self.state.board_mut().set(pos, Square::Occupied(player));
        self.update_phase(player);
        debug!(position = %pos, phase = %self.state.phase(), "Mark applied");
        Ok(self.state.phase())
    }

    /// Applies a [`Move`]. See [`Game::apply_mark`].
    pub fn apply(&mut self, mov: Move) -> Result<Phase, MoveError> {
        self.apply_mark(mov.position.to_index(), mov.player)
    }

    /// Clears the board and hands the first move back to X.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!("Resetting board");
        self.state = GameState::new();
    }

    /// Recomputes the phase after `mover` marked a cell.
    fn update_phase(&mut self, mover: Player) {
        let board = *self.state.board();
        if let Some(winner) = board.winner() {
            self.state.set_phase(Phase::Won(winner));
        } else if board.is_full() {
            self.state.set_phase(Phase::Draw);
        } else {
            self.state.set_turn(mover.opponent());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_flips_after_mark() {
        let mut game = Game::new();
        assert_eq!(game.apply_mark(4, Player::X), Ok(Phase::Playing));
        assert_eq!(game.state().turn(), Player::O);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut game = Game::new();
        assert_eq!(game.apply_mark(9, Player::X), Err(MoveError::OutOfRange(9)));
        assert_eq!(game.state(), &GameState::new());
    }

    #[test]
    fn test_apply_move_checks_turn() {
        let mut game = Game::new();
        let mov = Move::new(Player::O, Position::Center);
        assert_eq!(game.apply(mov), Err(MoveError::WrongPlayer(Player::O)));
        assert_eq!(game.apply(Move::new(Player::X, Position::Center)), Ok(Phase::Playing));
        assert_eq!(game.state().board().get(Position::Center), Square::Occupied(Player::X));
    }

    #[test]
    fn test_turn_not_flipped_on_win() {
        let mut game = Game::new();
        for (cell, player) in [(0, Player::X), (3, Player::O), (1, Player::X), (4, Player::O)] {
            game.apply_mark(cell, player).unwrap();
        }
        assert_eq!(game.apply_mark(2, Player::X), Ok(Phase::Won(Player::X)));
        assert_eq!(game.state().turn(), Player::X);
    }
}
