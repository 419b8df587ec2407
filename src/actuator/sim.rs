//! In-process turtle that stands in for a simulator or robot.

use super::{Actuator, ActuatorError, ActuatorErrorKind, Direction, Pen, Rgb};
use crate::games::tictactoe::Player;
use crate::layout::{Point, Pose};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument, trace};

/// Side length of the square canvas; positions are clamped to `[0, CANVAS_SIZE]`.
pub const CANVAS_SIZE: f64 = 11.0;

/// A command as received by the simulator, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCommand {
    /// Teleport request.
    Teleport(Pose),
    /// Pen change.
    SetPen(Pen),
    /// Velocity change.
    Drive(Direction),
    /// Mark drawing.
    DrawMark(Point, Player),
    /// Canvas wipe.
    Clear,
    /// Pose query.
    Position,
}

/// A mark left on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawnMark {
    /// Where the mark is centered.
    pub center: Point,
    /// Whose mark it is.
    pub player: Player,
    /// Ink used.
    pub color: Rgb,
    /// Stroke width used.
    pub width: u8,
}

/// Point-in-time view of the simulated canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct SimSnapshot {
    /// Current pose, including any motion in progress.
    pub pose: Pose,
    /// Current pen.
    pub pen: Pen,
    /// Whether a velocity command is active.
    pub moving: bool,
    /// Marks drawn since the last clear.
    pub marks: Vec<DrawnMark>,
}

#[derive(Debug)]
struct SimState {
    pose: Pose,
    velocity: (f64, f64),
    moving_since: Option<Instant>,
    speed: f64,
    pen: Pen,
    marks: Vec<DrawnMark>,
    commands: Vec<SimCommand>,
    latency: Duration,
    fail_next: u32,
    stall_next: u32,
    disconnected: bool,
}

impl SimState {
    fn pose_at(&self, now: Instant) -> Pose {
        let Some(since) = self.moving_since else {
            return self.pose;
        };
        let travelled = self.speed * now.saturating_duration_since(since).as_secs_f64();
        Pose::new(
            (self.pose.x + self.velocity.0 * travelled).clamp(0.0, CANVAS_SIZE),
            (self.pose.y + self.velocity.1 * travelled).clamp(0.0, CANVAS_SIZE),
            self.pose.theta,
        )
    }

    /// Folds motion so far into `pose` and stops.
    fn settle(&mut self, now: Instant) {
        self.pose = self.pose_at(now);
        self.velocity = (0.0, 0.0);
        self.moving_since = None;
    }
}

/// Shared handle for observing and perturbing a [`SimTurtle`] after it has
/// been handed to a controller.
#[derive(Debug, Clone)]
pub struct SimHandle {
    state: Arc<Mutex<SimState>>,
}

impl SimHandle {
    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current canvas contents and pose.
    pub fn snapshot(&self) -> SimSnapshot {
        let state = self.lock();
        SimSnapshot {
            pose: state.pose_at(Instant::now()),
            pen: state.pen,
            moving: state.moving_since.is_some(),
            marks: state.marks.clone(),
        }
    }

    /// Every command received so far.
    pub fn commands(&self) -> Vec<SimCommand> {
        self.lock().commands.clone()
    }

    /// Rejects the next `n` commands.
    pub fn fail_next(&self, n: u32) {
        self.lock().fail_next = n;
    }

    /// Never acknowledges the next `n` commands.
    pub fn stall_next(&self, n: u32) {
        self.lock().stall_next = n;
    }

    /// Fails every further command as disconnected.
    pub fn disconnect(&self) {
        self.lock().disconnected = true;
    }
}

/// Simulated turtle.
///
/// Velocity commands integrate over tokio time, so tests running with a
/// paused clock get exact positions.
#[derive(Debug)]
pub struct SimTurtle {
    handle: SimHandle,
}

impl SimTurtle {
    /// Creates a turtle at `home` that moves `speed` units per second.
    #[instrument]
    pub fn new(home: Pose, speed: f64) -> Self {
        let state = SimState {
            pose: home,
            velocity: (0.0, 0.0),
            moving_since: None,
            speed,
            pen: Pen::up(),
            marks: Vec::new(),
            commands: Vec::new(),
            latency: Duration::ZERO,
            fail_next: 0,
            stall_next: 0,
            disconnected: false,
        };
        Self {
            handle: SimHandle {
                state: Arc::new(Mutex::new(state)),
            },
        }
    }

    /// Delays every acknowledgement by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.handle.lock().latency = latency;
        self
    }

    /// A handle sharing this turtle's state.
    pub fn handle(&self) -> SimHandle {
        self.handle.clone()
    }

    /// Records `command`, applies injected faults and waits out the latency.
    async fn receive(&self, command: SimCommand) -> Result<(), ActuatorError> {
        let (stall, latency) = {
            let mut state = self.handle.lock();
            state.commands.push(command);
            trace!(?command, "Command received");
            if state.disconnected {
                return Err(ActuatorError::new(
                    ActuatorErrorKind::Disconnected,
                    "simulator disconnected",
                ));
            }
            if state.fail_next > 0 {
                state.fail_next -= 1;
                return Err(ActuatorError::new(
                    ActuatorErrorKind::Rejected,
                    format!("simulator rejected {command:?}"),
                ));
            }
            let stall = state.stall_next > 0;
            if stall {
                state.stall_next -= 1;
            }
            (stall, state.latency)
        };

        if stall {
            debug!(?command, "Stalling command");
            std::future::pending::<()>().await;
        }
        if !latency.is_zero() {
            sleep(latency).await;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Actuator for SimTurtle {
    async fn teleport(&mut self, pose: Pose) -> Result<(), ActuatorError> {
        self.receive(SimCommand::Teleport(pose)).await?;
        let mut state = self.handle.lock();
        state.settle(Instant::now());
        state.pose = Pose::new(
            pose.x.clamp(0.0, CANVAS_SIZE),
            pose.y.clamp(0.0, CANVAS_SIZE),
            pose.theta,
        );
        Ok(())
    }

    async fn set_pen(&mut self, pen: Pen) -> Result<(), ActuatorError> {
        self.receive(SimCommand::SetPen(pen)).await?;
        self.handle.lock().pen = pen;
        Ok(())
    }

    async fn drive(&mut self, direction: Direction) -> Result<(), ActuatorError> {
        self.receive(SimCommand::Drive(direction)).await?;
        let now = Instant::now();
        let mut state = self.handle.lock();
        state.settle(now);
        if direction != Direction::Stop {
            state.velocity = direction.unit();
            state.moving_since = Some(now);
        }
        Ok(())
    }

    async fn draw_mark(&mut self, center: Point, player: Player) -> Result<(), ActuatorError> {
        self.receive(SimCommand::DrawMark(center, player)).await?;
        let mut state = self.handle.lock();
        state.settle(Instant::now());
        if state.pen.on {
            let (color, width) = (state.pen.color, state.pen.width);
            state.marks.push(DrawnMark {
                center,
                player,
                color,
                width,
            });
        }
        let theta = state.pose.theta;
        state.pose = Pose::new(center.x, center.y, theta);
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), ActuatorError> {
        self.receive(SimCommand::Clear).await?;
        self.handle.lock().marks.clear();
        Ok(())
    }

    async fn position(&mut self) -> Result<Point, ActuatorError> {
        self.receive(SimCommand::Position).await?;
        Ok(self.handle.lock().pose_at(Instant::now()).point())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_drive_integrates_over_time() {
        let mut turtle = SimTurtle::new(Pose::new(5.5, 5.5, 0.0), 2.0);
        turtle.drive(Direction::Right).await.unwrap();
        sleep(Duration::from_millis(500)).await;
        turtle.drive(Direction::Stop).await.unwrap();
        sleep(Duration::from_secs(3)).await;
        assert_eq!(turtle.position().await.unwrap(), Point::new(6.5, 5.5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_motion_clamped_to_canvas() {
        let mut turtle = SimTurtle::new(Pose::new(10.0, 5.5, 0.0), 2.0);
        turtle.drive(Direction::Right).await.unwrap();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(turtle.position().await.unwrap(), Point::new(CANVAS_SIZE, 5.5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_needs_pen_down() {
        let mut turtle = SimTurtle::new(Pose::default(), 1.0);
        let handle = turtle.handle();
        turtle.draw_mark(Point::new(2.5, 8.5), Player::X).await.unwrap();
        assert!(handle.snapshot().marks.is_empty());

        turtle.set_pen(Pen::new(true, Rgb::RED, 3)).await.unwrap();
        turtle.draw_mark(Point::new(2.5, 8.5), Player::X).await.unwrap();
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.marks.len(), 1);
        assert_eq!(snapshot.marks[0].color, Rgb::RED);
        assert_eq!(snapshot.pose.point(), Point::new(2.5, 8.5));

        turtle.clear().await.unwrap();
        assert!(handle.snapshot().marks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_delays_ack() {
        let mut turtle = SimTurtle::new(Pose::default(), 1.0).with_latency(Duration::from_millis(250));
        let start = Instant::now();
        turtle.set_pen(Pen::up()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
