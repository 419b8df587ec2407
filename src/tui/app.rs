//! Application state and logic.

use crate::controller::GameEvent;
use crate::games::tictactoe::{GameState, Phase, Player};
use crate::layout::Point;
use tracing::debug;

/// View-side copy of everything the controller has reported.
#[derive(Debug, Clone)]
pub struct App {
    game: GameState,
    cursor: Point,
    status_message: String,
    stopped: bool,
}

impl App {
    /// Creates a new application.
    pub fn new(cursor: Point) -> Self {
        Self {
            game: GameState::new(),
            cursor,
            status_message: "Waiting for the turtle...".to_string(),
            stopped: false,
        }
    }

    /// Last reported game state.
    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Last reported turtle position.
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Gets the current status message.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// True once the controller has stopped.
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    /// Handles a game event from the controller.
    pub fn handle_event(&mut self, event: GameEvent) {
        debug!(?event, "Handling game event");

        match event {
            GameEvent::CursorMoved(point) => self.cursor = point,
            GameEvent::StateChanged(state) => self.game = state,
            GameEvent::MarkPlaced { player, position } => {
                self.status_message = format!("{} marked {}", player, position.label());
            }
            GameEvent::TurnChanged(Player::X) => {
                self.status_message =
                    "Your turn (X): steer with w/a/s/d, mark with m or space.".to_string();
            }
            GameEvent::TurnChanged(Player::O) | GameEvent::OpponentThinking => {
                self.status_message = "Opponent (O) is thinking...".to_string();
            }
            GameEvent::GameOver(phase) => {
                self.status_message = match phase {
                    Phase::Won(Player::X) => "You win!".to_string(),
                    Phase::Won(Player::O) => "The opponent wins.".to_string(),
                    Phase::Draw | Phase::Playing => "It's a draw.".to_string(),
                } + " Press 'r' to restart or 'q' to quit.";
            }
            GameEvent::Faulted(message) => {
                self.status_message =
                    format!("Turtle fault: {message}. Press 'r' to retry or 'q' to quit.");
            }
            GameEvent::Reset => {
                self.status_message = "Game restarted.".to_string();
            }
            GameEvent::Stopped => {
                self.status_message = "Bye.".to_string();
                self.stopped = true;
            }
        }
    }
}
