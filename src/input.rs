//! Keyboard input: raw keys in, discrete game commands out.

use crate::actuator::Direction;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// A command produced by the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum InputEvent {
    /// `w`
    #[display("move up")]
    MoveUp,
    /// `s`
    #[display("move down")]
    MoveDown,
    /// `a`
    #[display("move left")]
    MoveLeft,
    /// `d`
    #[display("move right")]
    MoveRight,
    /// `m` or space
    #[display("mark")]
    Mark,
    /// `r`
    #[display("reset")]
    Reset,
    /// `q`
    #[display("quit")]
    Quit,
}

impl InputEvent {
    /// Maps a key character, case-insensitively. Unknown keys map to `None`.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(Self::MoveUp),
            's' => Some(Self::MoveDown),
            'a' => Some(Self::MoveLeft),
            'd' => Some(Self::MoveRight),
            'm' | ' ' => Some(Self::Mark),
            'r' => Some(Self::Reset),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }

    /// Maps a terminal key event. Key releases and chorded keys are dropped.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }
        match key.code {
            KeyCode::Char(c) => Self::from_char(c),
            _ => None,
        }
    }

    /// Direction for movement events.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::MoveUp => Some(Direction::Up),
            Self::MoveDown => Some(Direction::Down),
            Self::MoveLeft => Some(Direction::Left),
            Self::MoveRight => Some(Direction::Right),
            Self::Mark | Self::Reset | Self::Quit => None,
        }
    }
}

/// Parses a string of keys into events, dropping unknown keys.
pub fn parse_keys(keys: &str) -> Vec<InputEvent> {
    keys.chars().filter_map(InputEvent::from_char).collect()
}

/// Pre-loads a channel with `events` and closes it.
///
/// The receiver yields the events in order, then `None`.
pub fn scripted(events: impl IntoIterator<Item = InputEvent>) -> mpsc::Receiver<InputEvent> {
    let events: Vec<_> = events.into_iter().collect();
    let (tx, rx) = mpsc::channel(events.len().max(1));
    for event in events {
        if let Err(e) = tx.try_send(event) {
            warn!(error = %e, "Scripted event dropped");
        }
    }
    rx
}

/// Puts the terminal in raw mode for as long as it lives.
#[derive(Debug)]
pub struct RawModeGuard(());

impl RawModeGuard {
    /// Enables raw mode.
    #[instrument]
    pub fn enable() -> std::io::Result<Self> {
        enable_raw_mode()?;
        debug!("Raw mode enabled");
        Ok(Self(()))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "Failed to restore terminal mode");
        } else {
            debug!("Raw mode disabled");
        }
    }
}

/// Reads keys on a blocking thread and forwards recognised ones to `tx`.
///
/// The reader polls every `poll_interval` so it notices when the receiver
/// is dropped. It stops after forwarding `Quit`, when the receiver goes away,
/// or on a terminal I/O error.
#[instrument(skip(tx))]
pub fn spawn_key_reader(
    tx: mpsc::Sender<InputEvent>,
    poll_interval: Duration,
) -> JoinHandle<std::io::Result<()>> {
    tokio::task::spawn_blocking(move || {
        info!("Key reader started");
        loop {
            if tx.is_closed() {
                info!("Controller gone, key reader stopping");
                return Ok(());
            }
            if !event::poll(poll_interval)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            let Some(input) = InputEvent::from_key(key) else {
                debug!(?key, "Ignoring key");
                continue;
            };
            debug!(%input, "Key mapped");
            if tx.blocking_send(input).is_err() {
                info!("Controller gone, key reader stopping");
                return Ok(());
            }
            if input == InputEvent::Quit {
                info!("Quit pressed, key reader stopping");
                return Ok(());
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        assert_eq!(InputEvent::from_char('W'), Some(InputEvent::MoveUp));
        assert_eq!(InputEvent::from_char('q'), Some(InputEvent::Quit));
        assert_eq!(InputEvent::from_char('Q'), Some(InputEvent::Quit));
    }

    #[test]
    fn test_space_is_mark() {
        assert_eq!(InputEvent::from_char(' '), Some(InputEvent::Mark));
        assert_eq!(InputEvent::from_char('M'), Some(InputEvent::Mark));
    }

    #[test]
    fn test_unknown_keys_dropped() {
        for c in ['x', '1', '\n', 'é'] {
            assert_eq!(InputEvent::from_char(c), None);
        }
        assert_eq!(parse_keys("w?x D m"), vec![
            InputEvent::MoveUp,
            InputEvent::Mark,
            InputEvent::MoveRight,
            InputEvent::Mark,
            InputEvent::Mark,
        ]);
    }

    #[test]
    fn test_key_release_and_ctrl_dropped() {
        let press = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE);
        assert_eq!(InputEvent::from_key(press), Some(InputEvent::MoveRight));

        let mut release = press;
        release.kind = KeyEventKind::Release;
        assert_eq!(InputEvent::from_key(release), None);

        let ctrl = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(InputEvent::from_key(ctrl), None);

        let arrow = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(InputEvent::from_key(arrow), None);
    }

    #[tokio::test]
    async fn test_scripted_keeps_every_event() {
        let keys = "wasd".repeat(50);
        let mut rx = scripted(parse_keys(&keys));
        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push(event);
        }
        assert_eq!(received, parse_keys(&keys));
    }

    #[tokio::test]
    async fn test_scripted_empty_closes_immediately() {
        let mut rx = scripted(Vec::new());
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_scripted_yields_then_closes() {
        let mut rx = scripted(parse_keys("wq"));
        assert_eq!(rx.recv().await, Some(InputEvent::MoveUp));
        assert_eq!(rx.recv().await, Some(InputEvent::Quit));
        assert_eq!(rx.recv().await, None);
    }
}
