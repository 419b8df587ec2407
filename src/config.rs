//! Process-wide game configuration.

use crate::actuator::Rgb;
use crate::games::tictactoe::Player;
use crate::layout::{CellLayout, Pose};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Pen colors for each player's marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkColors {
    /// Color for X.
    pub x: Rgb,
    /// Color for O.
    pub o: Rgb,
}

impl MarkColors {
    /// Color for `player`.
    pub fn for_player(&self, player: Player) -> Rgb {
        match player {
            Player::X => self.x,
            Player::O => self.o,
        }
    }
}

impl Default for MarkColors {
    fn default() -> Self {
        Self {
            x: Rgb::RED,
            o: Rgb::BLUE,
        }
    }
}

/// Game configuration, fixed for the life of the process.
///
/// Every field has a default, so a partial TOML file is fine.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cell centers and capture tolerance.
    layout: CellLayout,

    /// Mark colors.
    colors: MarkColors,

    /// Pen width for marks.
    pen_width: u8,

    /// Start pose the turtle returns to on reset.
    home: Pose,

    /// Speed of a movement key, in canvas units per second.
    move_speed: f64,

    /// Input poll / tick period.
    #[getter(skip)]
    tick_interval_ms: u64,

    /// Pause before the opponent moves.
    #[getter(skip)]
    think_delay_ms: u64,

    /// How long a movement key drives before stopping.
    #[getter(skip)]
    move_duration_ms: u64,

    /// Bound on each actuation acknowledgement.
    #[getter(skip)]
    ack_timeout_ms: u64,

    /// Retries after a failed or unacknowledged command.
    ack_retries: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            layout: CellLayout::default(),
            colors: MarkColors::default(),
            pen_width: 3,
            home: Pose::new(5.5, 5.5, 0.0),
            move_speed: 5.0,
            tick_interval_ms: 100,
            think_delay_ms: 1000,
            move_duration_ms: 300,
            ack_timeout_ms: 2000,
            ack_retries: 2,
        }
    }
}

impl GameConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!("Config loaded successfully");
        Ok(config)
    }

    /// Parses and validates configuration from a TOML string.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self)
            .map_err(|e| ConfigError::new(format!("Failed to serialize config: {}", e)))
    }

    /// Rejects values the controller cannot run with.
    ///
    /// Overlapping capture regions are allowed but logged: the lower-indexed
    /// cell silently wins inside the overlap.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = *self.layout.tolerance();
        if tolerance <= 0.0 || !tolerance.is_finite() {
            return Err(ConfigError::new(format!(
                "Cell tolerance must be positive, got {}",
                tolerance
            )));
        }
        if self.move_speed <= 0.0 || !self.move_speed.is_finite() {
            return Err(ConfigError::new(format!(
                "Move speed must be positive, got {}",
                self.move_speed
            )));
        }
        if self.ack_timeout_ms == 0 {
            return Err(ConfigError::new("Ack timeout must be non-zero".to_string()));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::new("Tick interval must be non-zero".to_string()));
        }
        if self.layout.overlaps() {
            warn!(
                tolerance,
                spacing = self.layout.min_spacing(),
                "Cell capture regions overlap; lower-indexed cells win inside the overlap"
            );
        }
        Ok(())
    }

    /// Overrides the timing values; handy for tests and fast simulations.
    pub fn with_timing(
        mut self,
        think_delay: Duration,
        move_duration: Duration,
        ack_timeout: Duration,
    ) -> Self {
        self.think_delay_ms = saturating_millis(think_delay);
        self.move_duration_ms = saturating_millis(move_duration);
        self.ack_timeout_ms = saturating_millis(ack_timeout);
        self
    }

    /// Overrides the cell layout.
    pub fn with_layout(mut self, layout: CellLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Overrides the number of retries per command.
    pub fn with_ack_retries(mut self, retries: u32) -> Self {
        self.ack_retries = retries;
        self
    }

    /// Input poll / tick period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Pause before the opponent moves.
    pub fn think_delay(&self) -> Duration {
        Duration::from_millis(self.think_delay_ms)
    }

    /// How long a movement key drives before stopping.
    pub fn move_duration(&self) -> Duration {
        Duration::from_millis(self.move_duration_ms)
    }

    /// Bound on each actuation acknowledgement.
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    /// Distance covered by one movement key.
    pub fn step_length(&self) -> f64 {
        self.move_speed * self.move_duration().as_secs_f64()
    }
}

/// Whole milliseconds in `duration`, capped at `u64::MAX`.
fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Point;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = GameConfig::from_toml("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.think_delay(), Duration::from_millis(1000));
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.colors().x, Rgb::RED);
        assert_eq!(config.colors().o, Rgb::BLUE);
    }

    #[test]
    fn test_partial_override() {
        let config = GameConfig::from_toml("think_delay_ms = 250\nack_retries = 5\n").unwrap();
        assert_eq!(config.think_delay(), Duration::from_millis(250));
        assert_eq!(*config.ack_retries(), 5);
        assert_eq!(*config.pen_width(), 3);
    }

    #[test]
    fn test_rejects_zero_tolerance() {
        let config =
            GameConfig::default().with_layout(CellLayout::grid(Point::new(5.5, 5.5), 3.0, 0.0));
        let toml = config.to_toml().unwrap();
        let err = GameConfig::from_toml(&toml).unwrap_err();
        assert!(err.message.contains("tolerance"));
    }

    #[test]
    fn test_overlap_is_allowed() {
        let config =
            GameConfig::default().with_layout(CellLayout::grid(Point::new(5.5, 5.5), 3.0, 1.5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip_keeps_layout() {
        let config = GameConfig::default();
        let parsed = GameConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed.layout(), config.layout());
    }

    #[test]
    fn test_huge_timing_saturates() {
        let config = GameConfig::default().with_timing(
            Duration::MAX,
            Duration::from_millis(300),
            Duration::from_secs(2),
        );
        assert_eq!(config.think_delay(), Duration::from_millis(u64::MAX));
        assert_eq!(config.move_duration(), Duration::from_millis(300));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = GameConfig::from_toml("move_speed = \"fast\"").unwrap_err();
        assert!(err.message.starts_with("Failed to parse config"));
    }
}
