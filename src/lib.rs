//! Strictly Turtle - tic-tac-toe played through a drawing turtle.
//!
//! A human steers the turtle with the keyboard and marks cells; a
//! fixed-priority heuristic opponent answers. Every mark is drawn by the
//! turtle, and a move only counts once the turtle has acknowledged it.
//!
//! # Architecture
//!
//! - **Games**: board state machine and heuristic opponent
//! - **Layout**: maps the turtle's position to a board cell
//! - **Actuator**: the turtle capability, a bounded-wait wrapper and a simulator
//! - **Input**: keyboard to [`InputEvent`] stream
//! - **Controller**: single owner of the game state, serialises all actuation
//!
//! # Example
//!
//! ```no_run
//! use strictly_turtle::{GameConfig, GameController, SimTurtle, parse_keys, scripted};
//!
//! # async fn example() {
//! let config = GameConfig::default();
//! let turtle = SimTurtle::new(*config.home(), *config.move_speed());
//! let mut controller = GameController::new(turtle, config);
//! let state = controller.run(scripted(parse_keys("m"))).await;
//! println!("{}", state.board().display());
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod actuator;
pub mod config;
pub mod controller;
pub mod games;
pub mod input;
pub mod layout;
pub mod tui;

pub use actuator::{
    AckedActuator, Actuator, ActuatorError, ActuatorErrorKind, CANVAS_SIZE, Direction, DrawnMark, Pen,
    Rgb, SimCommand, SimHandle, SimSnapshot, SimTurtle,
};
pub use config::{ConfigError, GameConfig, MarkColors};
pub use controller::{
    Actor, ControllerState, Ending, GameController, GameEvent, HUMAN, OPPONENT,
};
pub use games::tictactoe::{
    Board, Game, GameState, LINES, Move, MoveError, Phase, Player, Position, Reason, Square,
    StrategyError, choose_move, choose_with_reason,
};
pub use input::{InputEvent, RawModeGuard, parse_keys, scripted, spawn_key_reader};
pub use layout::{CellLayout, Point, Pose};
