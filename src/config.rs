//! Round options supplied by the host
//!
//! Options are plain serde data validated with `garde` before a
//! [`Game`](crate::game::Game) accepts them. Durations travel as
//! milliseconds on the wire.


use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::Duration;

use crate::constants::round;

/// Errors raised while building a game from host supplied data
#[derive(Debug, Error)]
pub enum Error {
    /// The round options violate their bounds
    #[error("invalid options: {0}")]
    InvalidOptions(garde::Report),
    /// The category catalog is empty or contains empty categories
    #[error("invalid catalog: {0}")]
    InvalidCatalog(garde::Report),
    /// The supplied JSON could not be parsed
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validates that a duration falls within inclusive millisecond bounds
fn validate_millis<const MIN_MS: u64, const MAX_MS: u64>(val: &Duration) -> garde::Result {
    let millis = val.as_millis();
    if (u128::from(MIN_MS)..=u128::from(MAX_MS)).contains(&millis) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "outside of bounds [{MIN_MS}ms,{MAX_MS}ms]"
        )))
    }
}

fn validate_tick_interval(val: &Duration, _ctx: &()) -> garde::Result {
    validate_millis::<{ round::MIN_TICK_INTERVAL_MS }, { round::MAX_TICK_INTERVAL_MS }>(val)
}

fn validate_skip_cooldown(val: &Duration, _ctx: &()) -> garde::Result {
    validate_millis::<0, { round::MAX_SKIP_COOLDOWN_MS }>(val)
}

/// What resuming a round does to a skip cooldown that a pause interrupted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PausePolicy {
    /// The unfinished cooldown is kept and runs out after the resume
    #[default]
    PreserveCooldown,
    /// The cooldown is dropped and the round resumes in the running state
    /// on the same item
    ResumeToRunning,
}

/// Timing and presentation options of every round in a game
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Options {
    /// Seconds each player starts a round with
    #[garde(range(min = round::MIN_INITIAL_TIME, max = round::MAX_INITIAL_TIME))]
    initial_time: u64,
    /// Wall time between two clock ticks, each tick costs one second of play time
    #[garde(custom(validate_tick_interval))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    tick_interval: Duration,
    /// How long scoring stays frozen after a skip
    #[garde(custom(validate_skip_cooldown))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    skip_cooldown: Duration,
    /// Whether the category queue is shuffled when a round starts
    #[garde(skip)]
    shuffle_queue: bool,
    /// How a pause interacts with a running skip cooldown
    #[garde(skip)]
    pause_policy: PausePolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            initial_time: round::INITIAL_TIME,
            tick_interval: Duration::from_millis(round::TICK_INTERVAL_MS),
            skip_cooldown: Duration::from_millis(round::SKIP_COOLDOWN_MS),
            shuffle_queue: false,
            pause_policy: PausePolicy::default(),
        }
    }
}

impl Options {
    /// Parses and validates options from JSON, missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed input and
    /// [`Error::InvalidOptions`] when a value is out of bounds.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let options: Self = serde_json::from_str(json)?;
        options.checked()
    }

    /// Validates the options, handing them back when they are usable
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] when a value is out of bounds.
    pub fn checked(self) -> Result<Self, Error> {
        self.validate().map_err(Error::InvalidOptions)?;
        Ok(self)
    }

    /// Sets the starting time of each player in seconds
    #[must_use]
    pub fn with_initial_time(mut self, seconds: u64) -> Self {
        self.initial_time = seconds;
        self
    }

    /// Sets the wall time between two ticks
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Sets the skip cooldown
    #[must_use]
    pub fn with_skip_cooldown(mut self, cooldown: Duration) -> Self {
        self.skip_cooldown = cooldown;
        self
    }

    /// Enables or disables queue shuffling
    #[must_use]
    pub fn with_shuffle_queue(mut self, shuffle: bool) -> Self {
        self.shuffle_queue = shuffle;
        self
    }

    /// Sets the pause policy
    #[must_use]
    pub fn with_pause_policy(mut self, policy: PausePolicy) -> Self {
        self.pause_policy = policy;
        self
    }

    /// Seconds each player starts a round with
    pub fn initial_time(&self) -> u64 {
        self.initial_time
    }

    /// Wall time between two ticks
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Length of the skip cooldown
    pub fn skip_cooldown(&self) -> Duration {
        self.skip_cooldown
    }

    /// Whether queues are shuffled on round start
    pub fn shuffle_queue(&self) -> bool {
        self.shuffle_queue
    }

    /// The configured pause policy
    pub fn pause_policy(&self) -> PausePolicy {
        self.pause_policy
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_classic_game() {
        let options = Options::default();
        assert_eq!(options.initial_time(), 45);
        assert_eq!(options.tick_interval(), Duration::from_secs(1));
        assert_eq!(options.skip_cooldown(), Duration::from_secs(3));
        assert!(!options.shuffle_queue());
        assert_eq!(options.pause_policy(), PausePolicy::PreserveCooldown);
        assert!(options.checked().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let options =
            Options::from_json(r#"{"initial_time": 30, "skip_cooldown": 1500}"#).unwrap();
        assert_eq!(options.initial_time(), 30);
        assert_eq!(options.skip_cooldown(), Duration::from_millis(1500));
        assert_eq!(options.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_from_json_parses_pause_policy() {
        let options = Options::from_json(r#"{"pause_policy": "ResumeToRunning"}"#).unwrap();
        assert_eq!(options.pause_policy(), PausePolicy::ResumeToRunning);
    }

    #[test]
    fn test_zero_initial_time_is_rejected() {
        let result = Options::default().with_initial_time(0).checked();
        assert!(matches!(result, Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_tick_interval_bounds() {
        assert!(
            Options::default()
                .with_tick_interval(Duration::from_millis(50))
                .checked()
                .is_err()
        );
        assert!(
            Options::default()
                .with_tick_interval(Duration::from_secs(11))
                .checked()
                .is_err()
        );
        assert!(
            Options::default()
                .with_tick_interval(Duration::from_millis(100))
                .checked()
                .is_ok()
        );
    }

    #[test]
    fn test_zero_skip_cooldown_is_allowed() {
        assert!(
            Options::default()
                .with_skip_cooldown(Duration::ZERO)
                .checked()
                .is_ok()
        );
        assert!(
            Options::default()
                .with_skip_cooldown(Duration::from_secs(61))
                .checked()
                .is_err()
        );
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let result = Options::from_json("{ not json");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_serializes_durations_as_millis() {
        let json = serde_json::to_string(&Options::default()).unwrap();
        assert!(json.contains(r#""tick_interval":1000"#));
        assert!(json.contains(r#""skip_cooldown":3000"#));
    }
}
