//! Game controller: turns input events into board moves and actuation.
//!
//! The controller is the only writer of the game state. Input arrives over a
//! channel; every actuation command is awaited before the next is issued, so
//! the turtle never has two commands in flight.

use crate::actuator::{AckedActuator, Actuator, ActuatorError, Direction, Pen};
use crate::config::GameConfig;
use crate::games::tictactoe::{Game, GameState, Move, Phase, Player, Position, choose_move};
use crate::input::InputEvent;
use crate::layout::{Point, Pose};
use std::collections::VecDeque;
use std::ops::ControlFlow;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Mark played from the keyboard.
pub const HUMAN: Player = Player::X;

/// Mark played by the heuristic opponent.
pub const OPPONENT: Player = Player::O;

/// Who is waiting on an actuation acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Actor {
    /// A cursor move or mark requested from the keyboard.
    #[display("human")]
    Human,
    /// The opponent's mark.
    #[display("opponent")]
    Opponent,
    /// Returning to the start pose.
    #[display("homing")]
    Homing,
}

/// Why the controller stopped taking moves.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Ending {
    /// The game finished normally.
    #[display("game over: {_0}")]
    Outcome(Phase),
    /// The actuator failed beyond its retries.
    #[display("actuator fault: {_0}")]
    Fault(String),
}

/// Controller state.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ControllerState {
    /// Accepting cursor moves and marks from the keyboard.
    #[display("waiting for human move")]
    WaitingForHumanMove,
    /// A command is in flight.
    #[display("awaiting {_0} actuation")]
    AwaitingActuationAck(Actor),
    /// The opponent is thinking.
    #[display("opponent turn")]
    OpponentTurn,
    /// No moves accepted until reset.
    #[display("terminal ({_0})")]
    Terminal(Ending),
}

/// Reports sent to the observer.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The turtle settled at a new position.
    CursorMoved(Point),
    /// A mark was accepted and drawn.
    MarkPlaced {
        /// Who marked.
        player: Player,
        /// Where.
        position: Position,
    },
    /// The board, turn or phase changed.
    StateChanged(GameState),
    /// It is now `player`'s turn.
    TurnChanged(Player),
    /// The opponent started thinking.
    OpponentThinking,
    /// The game was won or drawn.
    GameOver(Phase),
    /// The actuator failed; reset to retry.
    Faulted(String),
    /// A new game started.
    Reset,
    /// The controller stopped.
    Stopped,
}

/// Drives one game of tic-tac-toe through an actuator.
#[derive(Debug)]
pub struct GameController<A> {
    game: Game,
    actuator: AckedActuator<A>,
    config: GameConfig,
    state: ControllerState,
    observer: Option<mpsc::UnboundedSender<GameEvent>>,
    /// Keys typed while the opponent was thinking, handled in order afterwards.
    pending: VecDeque<InputEvent>,
    input_closed: bool,
}

impl<A: Actuator> GameController<A> {
    /// Creates a controller around `actuator`.
    ///
    /// Every command sent to `actuator` is bounded by the configured ack
    /// timeout and retries.
    #[instrument(skip(actuator, config))]
    pub fn new(actuator: A, config: GameConfig) -> Self {
        let actuator = AckedActuator::new(actuator, config.ack_timeout(), *config.ack_retries());
        Self {
            game: Game::new(),
            actuator,
            config,
            state: ControllerState::WaitingForHumanMove,
            observer: None,
            pending: VecDeque::new(),
            input_closed: false,
        }
    }

    /// Sends [`GameEvent`]s to `observer`.
    pub fn with_observer(mut self, observer: mpsc::UnboundedSender<GameEvent>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Current controller state.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Current game state.
    pub fn game_state(&self) -> &GameState {
        self.game.state()
    }

    /// The wrapped actuator.
    pub fn actuator(&self) -> &A {
        self.actuator.inner()
    }

    /// Plays until `Quit` arrives or the input channel closes.
    ///
    /// Returns the final game state. Actuator faults do not end the loop;
    /// they park the controller in [`ControllerState::Terminal`] until reset.
    #[instrument(skip_all)]
    pub async fn run(&mut self, mut events: mpsc::Receiver<InputEvent>) -> GameState {
        info!("Controller starting");
        self.home(false).await;
        if self.state == ControllerState::WaitingForHumanMove {
            self.notify(GameEvent::StateChanged(*self.game.state()));
            self.notify(GameEvent::TurnChanged(HUMAN));
        }

        loop {
            let flow = if self.state == ControllerState::OpponentTurn {
                self.opponent_turn(&mut events).await
            } else {
                match self.next_event(&mut events).await {
                    Some(event) => self.handle(event).await,
                    None => {
                        info!("Input closed");
                        ControlFlow::Break(())
                    }
                }
            };
            if flow.is_break() {
                break;
            }
        }

        info!(state = %self.state, "Controller stopped");
        self.notify(GameEvent::Stopped);
        *self.game.state()
    }

    /// Handles one keyboard event outside the opponent's turn.
    #[instrument(skip(self), fields(state = %self.state))]
    pub async fn handle(&mut self, event: InputEvent) -> ControlFlow<()> {
        if event == InputEvent::Quit {
            info!("Quit requested");
            return ControlFlow::Break(());
        }

        match self.state {
            ControllerState::WaitingForHumanMove if event == InputEvent::Mark => {
                self.human_mark().await
            }
            ControllerState::WaitingForHumanMove => match event.direction() {
                Some(direction) => self.step(direction).await,
                None => debug!("Reset ignored during play"),
            },
            ControllerState::Terminal(_) if event == InputEvent::Reset => self.reset().await,
            _ => debug!("Event ignored in this state"),
        }
        ControlFlow::Continue(())
    }

    /// Next event: queued keys first, then the channel.
    async fn next_event(&mut self, events: &mut mpsc::Receiver<InputEvent>) -> Option<InputEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        if self.input_closed {
            return None;
        }
        let event = events.recv().await;
        self.input_closed = event.is_none();
        event
    }

    /// Waits out the think delay, then plays the opponent's move.
    ///
    /// `Quit` interrupts the wait. Other keys are queued for afterwards, and
    /// a closed channel still lets the opponent finish its move.
    async fn opponent_turn(&mut self, events: &mut mpsc::Receiver<InputEvent>) -> ControlFlow<()> {
        self.notify(GameEvent::OpponentThinking);
        let think = sleep(self.config.think_delay());
        tokio::pin!(think);

        loop {
            tokio::select! {
                () = &mut think => {
                    self.play_opponent().await;
                    return ControlFlow::Continue(());
                }
                event = events.recv(), if !self.input_closed => match event {
                    Some(InputEvent::Quit) => {
                        info!("Quit requested during opponent turn");
                        return ControlFlow::Break(());
                    }
                    Some(event) => {
                        debug!(%event, "Queueing key until the opponent has moved");
                        self.pending.push_back(event);
                    }
                    None => self.input_closed = true,
                },
            }
        }
    }

    /// Moves the cursor one step: drive, wait, stop.
    #[instrument(skip(self))]
    async fn step(&mut self, direction: Direction) {
        self.state = ControllerState::AwaitingActuationAck(Actor::Human);
        let result = async {
            self.actuator.drive(direction).await?;
            sleep(self.config.move_duration()).await;
            self.actuator.drive(Direction::Stop).await?;
            self.actuator.position().await
        }
        .await;

        match result {
            Ok(point) => {
                debug!(%point, "Cursor settled");
                self.state = ControllerState::WaitingForHumanMove;
                self.notify(GameEvent::CursorMoved(point));
            }
            Err(e) => self.fault(e),
        }
    }

    /// Marks the cell under the cursor for the human, if there is one and
    /// the move is legal.
    #[instrument(skip(self))]
    async fn human_mark(&mut self) {
        let point = match self.actuator.position().await {
            Ok(point) => point,
            Err(e) => return self.fault(e),
        };
        let Some(position) = self.config.layout().map_to_cell(point) else {
            debug!(%point, "Cursor is not on a cell");
            return;
        };
        let phase = match self.game.apply(Move::new(HUMAN, position)) {
            Ok(phase) => phase,
            Err(e) => {
                debug!(%position, error = %e, "Mark ignored");
                return;
            }
        };

        info!(%position, "Human marked");
        if let Err(e) = self.draw(position, HUMAN, Actor::Human).await {
            return self.fault(e);
        }
        self.after_mark(HUMAN, position, phase);
    }

    /// Chooses, applies and draws the opponent's move.
    #[instrument(skip(self))]
    async fn play_opponent(&mut self) {
        let board = *self.game.state().board();
        let position = match choose_move(&board, OPPONENT, HUMAN) {
            Ok(position) => position,
            Err(e) => {
                error!(error = %e, "Opponent asked to move on a full board");
                return self.fault_with(e.to_string());
            }
        };
        let phase = match self.game.apply(Move::new(OPPONENT, position)) {
            Ok(phase) => phase,
            Err(e) => {
                error!(%position, error = %e, "Opponent move rejected");
                return self.fault_with(e.to_string());
            }
        };

        info!(%position, "Opponent marked");
        if let Err(e) = self.draw(position, OPPONENT, Actor::Opponent).await {
            return self.fault(e);
        }
        self.after_mark(OPPONENT, position, phase);
    }

    /// Announces a drawn mark and moves to the next state.
    fn after_mark(&mut self, player: Player, position: Position, phase: Phase) {
        self.notify(GameEvent::MarkPlaced { player, position });
        self.notify(GameEvent::StateChanged(*self.game.state()));

        match phase {
            Phase::Playing if player == HUMAN => {
                self.state = ControllerState::OpponentTurn;
                self.notify(GameEvent::TurnChanged(OPPONENT));
            }
            Phase::Playing => {
                self.state = ControllerState::WaitingForHumanMove;
                self.notify(GameEvent::TurnChanged(HUMAN));
            }
            Phase::Won(_) | Phase::Draw => {
                info!(%phase, "Game over");
                self.state = ControllerState::Terminal(Ending::Outcome(phase));
                self.notify(GameEvent::GameOver(phase));
            }
        }
    }

    /// Draws `player`'s mark on `position`, then returns the turtle to where
    /// it started with the pen up.
    async fn draw(
        &mut self,
        position: Position,
        player: Player,
        actor: Actor,
    ) -> Result<(), ActuatorError> {
        self.state = ControllerState::AwaitingActuationAck(actor);
        let center = self.config.layout().center(position);
        let ink = Pen::new(
            true,
            self.config.colors().for_player(player),
            *self.config.pen_width(),
        );

        let resume = self.actuator.position().await?;
        self.actuator.set_pen(Pen::up()).await?;
        self.actuator.teleport(Pose::new(center.x, center.y, 0.0)).await?;
        self.actuator.set_pen(ink).await?;
        self.actuator.draw_mark(center, player).await?;
        self.actuator.set_pen(Pen::up()).await?;
        self.actuator.teleport(Pose::new(resume.x, resume.y, 0.0)).await?;
        debug!(%position, %player, "Mark drawn");
        Ok(())
    }

    /// Starts a new game from a terminal state.
    #[instrument(skip(self))]
    async fn reset(&mut self) {
        info!("Resetting game");
        self.game.reset();
        self.notify(GameEvent::StateChanged(*self.game.state()));
        self.home(true).await;
        if self.state == ControllerState::WaitingForHumanMove {
            self.notify(GameEvent::Reset);
            self.notify(GameEvent::TurnChanged(HUMAN));
        }
    }

    /// Stops any motion, lifts the pen and returns to the start pose,
    /// optionally wiping the canvas first.
    async fn home(&mut self, clear: bool) {
        self.state = ControllerState::AwaitingActuationAck(Actor::Homing);
        let home = *self.config.home();
        let result = async {
            self.actuator.drive(Direction::Stop).await?;
            self.actuator.set_pen(Pen::up()).await?;
            if clear {
                self.actuator.clear().await?;
            }
            self.actuator.teleport(home).await
        }
        .await;

        match result {
            Ok(()) => {
                self.state = ControllerState::WaitingForHumanMove;
                self.notify(GameEvent::CursorMoved(home.point()));
            }
            Err(e) => self.fault(e),
        }
    }

    fn fault(&mut self, err: ActuatorError) {
        self.fault_with(err.to_string());
    }

    fn fault_with(&mut self, message: String) {
        error!(%message, "Controller faulted; reset to retry");
        self.state = ControllerState::Terminal(Ending::Fault(message.clone()));
        self.notify(GameEvent::Faulted(message));
    }

    fn notify(&self, event: GameEvent) {
        if let Some(observer) = &self.observer
            && observer.send(event).is_err()
        {
            warn!("Observer dropped");
        }
    }
}
