//! Bounded waits and retries around any [`Actuator`].

use super::{Actuator, ActuatorError, ActuatorErrorKind, Direction, Pen};
use crate::games::tictactoe::Player;
use crate::layout::{Point, Pose};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// A single actuation command, retried as a unit.
#[derive(Debug, Clone, Copy)]
enum Request {
    Teleport(Pose),
    SetPen(Pen),
    Drive(Direction),
    DrawMark(Point, Player),
    Clear,
    Position,
}

impl Request {
    fn name(self) -> &'static str {
        match self {
            Request::Teleport(_) => "teleport",
            Request::SetPen(_) => "set_pen",
            Request::Drive(_) => "drive",
            Request::DrawMark(..) => "draw_mark",
            Request::Clear => "clear",
            Request::Position => "position",
        }
    }
}

/// Acknowledgement payload.
#[derive(Debug, Clone, Copy)]
enum Ack {
    Done,
    Position(Point),
}

async fn dispatch<A: Actuator>(inner: &mut A, request: Request) -> Result<Ack, ActuatorError> {
    match request {
        Request::Teleport(pose) => inner.teleport(pose).await.map(|()| Ack::Done),
        Request::SetPen(pen) => inner.set_pen(pen).await.map(|()| Ack::Done),
        Request::Drive(direction) => inner.drive(direction).await.map(|()| Ack::Done),
        Request::DrawMark(center, player) => {
            inner.draw_mark(center, player).await.map(|()| Ack::Done)
        }
        Request::Clear => inner.clear().await.map(|()| Ack::Done),
        Request::Position => inner.position().await.map(Ack::Position),
    }
}

/// Wraps an actuator so that every command waits at most `ack_timeout` for
/// its acknowledgement and is retried up to `retries` more times.
///
/// A command that exhausts its retries surfaces the last error. A timed-out
/// attempt is dropped before the next one is issued, so at most one command
/// is ever in flight.
#[derive(Debug)]
pub struct AckedActuator<A> {
    inner: A,
    ack_timeout: Duration,
    retries: u32,
}

impl<A: Actuator> AckedActuator<A> {
    /// Wraps `inner`.
    pub fn new(inner: A, ack_timeout: Duration, retries: u32) -> Self {
        Self {
            inner,
            ack_timeout,
            retries,
        }
    }

    /// The wrapped actuator.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Issues `request` until it is acknowledged or attempts run out.
    #[instrument(skip(self), fields(command = request.name(), retries = self.retries))]
    async fn acked(&mut self, request: Request) -> Result<Ack, ActuatorError> {
        let attempts = self.retries + 1;
        let mut attempt = 1;
        loop {
            let result = match timeout(self.ack_timeout, dispatch(&mut self.inner, request)).await {
                Ok(result) => result,
                Err(_) => Err(ActuatorError::new(
                    ActuatorErrorKind::Timeout,
                    format!(
                        "{} not acknowledged within {:?}",
                        request.name(),
                        self.ack_timeout
                    ),
                )),
            };

            match result {
                Ok(ack) => {
                    debug!(attempt, "Command acknowledged");
                    return Ok(ack);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    warn!(attempt, error = %e, "Command failed, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Command failed, giving up");
                    return Err(e);
                }
            }
        }
    }

    async fn acked_unit(&mut self, request: Request) -> Result<(), ActuatorError> {
        self.acked(request).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl<A: Actuator> Actuator for AckedActuator<A> {
    async fn teleport(&mut self, pose: Pose) -> Result<(), ActuatorError> {
        self.acked_unit(Request::Teleport(pose)).await
    }

    async fn set_pen(&mut self, pen: Pen) -> Result<(), ActuatorError> {
        self.acked_unit(Request::SetPen(pen)).await
    }

    async fn drive(&mut self, direction: Direction) -> Result<(), ActuatorError> {
        self.acked_unit(Request::Drive(direction)).await
    }

    async fn draw_mark(&mut self, center: Point, player: Player) -> Result<(), ActuatorError> {
        self.acked_unit(Request::DrawMark(center, player)).await
    }

    async fn clear(&mut self) -> Result<(), ActuatorError> {
        self.acked_unit(Request::Clear).await
    }

    async fn position(&mut self) -> Result<Point, ActuatorError> {
        match self.acked(Request::Position).await? {
            Ack::Position(point) => Ok(point),
            Ack::Done => Err(ActuatorError::new(
                ActuatorErrorKind::Rejected,
                "position request acknowledged without a position",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::{SimCommand, SimTurtle};

    fn wrapped(retries: u32) -> (AckedActuator<SimTurtle>, crate::actuator::SimHandle) {
        let turtle = SimTurtle::new(Pose::new(5.5, 5.5, 0.0), 5.0);
        let handle = turtle.handle();
        (
            AckedActuator::new(turtle, Duration::from_millis(500), retries),
            handle,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_rejected_command() {
        let (mut actuator, handle) = wrapped(2);
        handle.fail_next(2);
        actuator.teleport(Pose::new(1.0, 1.0, 0.0)).await.unwrap();
        assert_eq!(handle.snapshot().pose.point(), Point::new(1.0, 1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_retries() {
        let (mut actuator, handle) = wrapped(1);
        handle.fail_next(2);
        let err = actuator.clear().await.unwrap_err();
        assert_eq!(err.kind, ActuatorErrorKind::Rejected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_command_times_out_then_retries() {
        let (mut actuator, handle) = wrapped(1);
        handle.stall_next(1);
        actuator.set_pen(Pen::up()).await.unwrap();
        let commands = handle.commands();
        assert_eq!(commands.len(), 2);
        assert!(commands.iter().all(|c| matches!(c, SimCommand::SetPen(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stall_without_retries_is_timeout() {
        let (mut actuator, handle) = wrapped(0);
        handle.stall_next(1);
        let err = actuator.position().await.unwrap_err();
        assert_eq!(err.kind, ActuatorErrorKind::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnected_is_not_retried() {
        let (mut actuator, handle) = wrapped(3);
        handle.disconnect();
        let err = actuator.drive(Direction::Up).await.unwrap_err();
        assert_eq!(err.kind, ActuatorErrorKind::Disconnected);
        assert_eq!(handle.commands().len(), 1);
    }
}
