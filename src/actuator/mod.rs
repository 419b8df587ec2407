//! Actuator capability: the turtle (simulated or physical) that moves the
//! cursor and draws marks.
//!
//! Every command is an `async fn`; the returned future completing is the
//! acknowledgement that the actuator has settled. Callers must not issue a
//! second command before the first resolves.

mod acked;
mod sim;

pub use acked::AckedActuator;
pub use sim::{CANVAS_SIZE, DrawnMark, SimCommand, SimHandle, SimSnapshot, SimTurtle};

use crate::games::tictactoe::Player;
use crate::layout::{Point, Pose};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Unit direction for velocity commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Direction {
    /// +y
    #[display("up")]
    Up,
    /// -y
    #[display("down")]
    Down,
    /// -x
    #[display("left")]
    Left,
    /// +x
    #[display("right")]
    Right,
    /// Zero velocity.
    #[display("stop")]
    Stop,
}

impl Direction {
    /// The direction as a unit vector `(dx, dy)`.
    pub fn unit(self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, 1.0),
            Direction::Down => (0.0, -1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Stop => (0.0, 0.0),
        }
    }
}

/// An RGB pen color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pure red.
    pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    /// Pure blue.
    pub const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
    /// White, the simulator's background.
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

/// Pen settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct Pen {
    /// Whether the pen touches the canvas.
    pub on: bool,
    /// Ink color.
    pub color: Rgb,
    /// Stroke width.
    pub width: u8,
}

impl Pen {
    /// A lifted pen; color and width are irrelevant.
    pub fn up() -> Self {
        Self::new(false, Rgb::WHITE, 1)
    }
}

/// What went wrong with an actuation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ActuatorErrorKind {
    /// The actuator refused or failed the command.
    #[display("rejected")]
    Rejected,
    /// No acknowledgement arrived in time.
    #[display("timeout")]
    Timeout,
    /// The actuator is gone; retrying is pointless.
    #[display("disconnected")]
    Disconnected,
}

/// Actuation error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Actuator {} error: {} at {}:{}", kind, message, file, line)]
pub struct ActuatorError {
    /// Error message.
    pub message: String,
    /// Failure category.
    pub kind: ActuatorErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ActuatorError {
    /// Creates a new actuator error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: ActuatorErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Whether issuing the command again could succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind != ActuatorErrorKind::Disconnected
    }
}

/// Commands a turtle-like actuator understands.
#[async_trait::async_trait]
pub trait Actuator: Send {
    /// Jumps to `pose` without drawing.
    async fn teleport(&mut self, pose: Pose) -> Result<(), ActuatorError>;

    /// Lifts or lowers the pen and sets its ink.
    async fn set_pen(&mut self, pen: Pen) -> Result<(), ActuatorError>;

    /// Starts moving in `direction` (velocity-style). The caller stops the
    /// motion with [`Direction::Stop`].
    async fn drive(&mut self, direction: Direction) -> Result<(), ActuatorError>;

    /// Draws `player`'s mark centered on `center` with the current pen,
    /// ending at `center`.
    async fn draw_mark(&mut self, center: Point, player: Player) -> Result<(), ActuatorError>;

    /// Wipes everything drawn so far.
    async fn clear(&mut self) -> Result<(), ActuatorError>;

    /// Latest known position.
    async fn position(&mut self) -> Result<Point, ActuatorError>;
}
