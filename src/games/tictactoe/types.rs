//! Core domain types for tic-tac-toe.

use super::position::Position;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Player in the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Player {
    /// Player X (goes first, the human at the keyboard).
    X,
    /// Player O (the turtle's own opponent).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a player.
    Occupied(Player),
}

/// The eight winning lines, scanned rows, then columns, then diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Builds a board from a row-major pattern such as `"XX_ _O_ ___"`.
    ///
    /// `X` and `O` place marks; `_`, `.` and `-` are empty; whitespace is
    /// ignored. Returns `None` unless exactly nine cells are described.
    pub fn from_pattern(pattern: &str) -> Option<Self> {
        let mut board = Self::new();
        let mut count = 0;
        for c in pattern.chars().filter(|c| !c.is_whitespace()) {
            let square = match c.to_ascii_uppercase() {
                'X' => Square::Occupied(Player::X),
                'O' => Square::Occupied(Player::O),
                '_' | '.' | '-' => Square::Empty,
                _ => return None,
            };
            let pos = Position::from_index(count)?;
            board.set(pos, square);
            count += 1;
        }
        (count == 9).then_some(board)
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.to_index()]
    }

    /// Sets the square at the given position.
    ///
    /// This is raw board editing; turn order and phase are enforced by
    /// [`Game`](super::Game).
    pub fn set(&mut self, pos: Position, square: Square) {
        self.squares[pos.to_index()] = square;
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Checks if the board is full.
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|s| *s != Square::Empty)
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Checks for a winner on the board.
    ///
    /// Lines are scanned in [`LINES`] order; the first complete line wins.
    #[instrument(level = "trace", skip(self))]
    pub fn winner(&self) -> Option<Player> {
        LINES.iter().find_map(|&[a, b, c]| match self.get(a) {
            Square::Occupied(p) if self.get(b) == self.get(a) && self.get(c) == self.get(a) => {
                Some(p)
            }
            _ => None,
        })
    }

    /// Returns a copy of this board with `player` marked at `pos`.
    ///
    /// Used for side-effect-free lookahead.
    pub fn with_mark(&self, pos: Position, player: Player) -> Self {
        let mut next = *self;
        next.set(pos, Square::Occupied(player));
        next
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.squares[pos] {
                    Square::Empty => (pos + 1).to_string(),
                    Square::Occupied(Player::X) => "X".to_string(),
                    Square::Occupied(Player::O) => "O".to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Overall game status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Phase {
    /// Game is ongoing.
    #[display("playing")]
    Playing,
    /// Game ended in a win.
    #[display("{_0} wins")]
    Won(Player),
    /// Game ended in a draw.
    #[display("draw")]
    Draw,
}

impl Phase {
    /// Returns true while moves are still accepted.
    pub fn is_playing(self) -> bool {
        self == Phase::Playing
    }
}

/// Complete game state: board, turn owner and phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// The board.
    board: Board,
    /// Player entitled to move next.
    turn: Player,
    /// Game status.
    phase: Phase,
}

impl GameState {
    /// Creates a fresh game: empty board, X to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Player::X,
            phase: Phase::Playing,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move.
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Returns the game phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(super) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub(super) fn set_turn(&mut self, turn: Player) {
        self.turn = turn;
    }

    pub(super) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(Board::new().winner(), None);
    }

    #[test]
    fn test_winner_diagonal() {
        let board = Board::from_pattern("O__ _O_ __O").unwrap();
        assert_eq!(board.winner(), Some(Player::O));
    }

    #[test]
    fn test_no_winner_incomplete() {
        let board = Board::from_pattern("XX_ ___ ___").unwrap();
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_from_pattern_rejects_wrong_length() {
        assert!(Board::from_pattern("XX_").is_none());
        assert!(Board::from_pattern("XX_ ___ ___ _").is_none());
        assert!(Board::from_pattern("XZ_ ___ ___").is_none());
    }

    #[test]
    fn test_with_mark_leaves_original_untouched() {
        let board = Board::new();
        let next = board.with_mark(Position::Center, Player::X);
        assert!(board.is_empty(Position::Center));
        assert_eq!(next.get(Position::Center), Square::Occupied(Player::X));
    }

    #[test]
    fn test_display_numbers_empty_squares() {
        let board = Board::from_pattern("X__ _O_ ___").unwrap();
        assert_eq!(board.display(), "X|2|3\n-+-+-\n4|O|6\n-+-+-\n7|8|9");
    }
}
