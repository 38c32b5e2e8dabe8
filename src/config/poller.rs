//! Job-completion poller configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::PollerSettings;
use crate::domain::assistant::{PollDelay, DEFAULT_MAX_ATTEMPTS};

/// Largest accepted status-check budget.
pub const MAX_POLL_ATTEMPTS: u32 = 100_000;

/// Delay strategy selector
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DelayKind {
    None,
    #[default]
    Fixed,
    Exponential,
}

/// Poller configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    /// Status checks before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause strategy between checks
    #[serde(default)]
    pub delay: DelayKind,

    /// Fixed pause, or first exponential pause, in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Cap for exponential pauses in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl PollerConfig {
    pub fn poll_delay(&self) -> PollDelay {
        let initial = Duration::from_millis(self.initial_delay_ms);
        match self.delay {
            DelayKind::None => PollDelay::None,
            DelayKind::Fixed => PollDelay::Fixed(initial),
            DelayKind::Exponential => PollDelay::Exponential {
                initial,
                max: Duration::from_millis(self.max_delay_ms),
            },
        }
    }

    /// Pause a run that never completes spends before its timeout.
    pub fn worst_case_sleep(&self) -> Duration {
        self.poll_delay().total_sleep(self.max_attempts)
    }

    pub fn settings(&self) -> PollerSettings {
        PollerSettings {
            max_attempts: self.max_attempts,
            delay: self.poll_delay(),
        }
    }

    /// Validate poller configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 || self.max_attempts > MAX_POLL_ATTEMPTS {
            return Err(ValidationError::InvalidPollBudget {
                max: MAX_POLL_ATTEMPTS,
            });
        }
        match self.delay {
            DelayKind::None => {}
            DelayKind::Fixed if self.initial_delay_ms == 0 => {
                return Err(ValidationError::InvalidPollDelay)
            }
            DelayKind::Fixed => {}
            DelayKind::Exponential => {
                if self.initial_delay_ms == 0 || self.initial_delay_ms > self.max_delay_ms {
                    return Err(ValidationError::InvalidPollDelay);
                }
            }
        }
        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay: DelayKind::default(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_initial_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    2_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_fixed_with_600_attempts() {
        let config = PollerConfig::default();
        let settings = config.settings();
        assert_eq!(settings.max_attempts, 600);
        assert_eq!(settings.delay, PollDelay::Fixed(Duration::from_millis(100)));
        assert_eq!(config.worst_case_sleep(), Duration::from_millis(59_900));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_exponential_worst_case_sleep() {
        let config = PollerConfig {
            delay: DelayKind::Exponential,
            ..Default::default()
        };
        assert_eq!(config.worst_case_sleep(), Duration::from_millis(1_191_100));
    }

    #[test]
    fn test_none_delay_ignores_durations() {
        let config = PollerConfig {
            delay: DelayKind::None,
            initial_delay_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.poll_delay(), PollDelay::None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixed_delay() {
        let config = PollerConfig {
            delay: DelayKind::Fixed,
            initial_delay_ms: 250,
            ..Default::default()
        };
        assert_eq!(
            config.poll_delay(),
            PollDelay::Fixed(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_validation_rejects_zero_budget() {
        let config = PollerConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPollBudget { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_inverted_backoff() {
        let config = PollerConfig {
            delay: DelayKind::Exponential,
            initial_delay_ms: 5_000,
            max_delay_ms: 1_000,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPollDelay));
    }
}
