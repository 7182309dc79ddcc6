//! Exponential backoff policy for retrying throttled API requests
//!
//! A [`BackoffConfig`] describes the policy; [`BackoffConfig::start`] hands out a
//! [`BackoffExecution`] that yields growing wait intervals until its stop
//! condition is reached.

use std::time::Duration;
use thiserror::Error;

/// Default wait before the first retry
const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(2000);

/// Default growth factor between consecutive waits
const DEFAULT_MULTIPLIER: f64 = 1.5;

/// Default upper bound for a single wait
const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(30);

/// Default total waiting time after which retries stop
const DEFAULT_MAX_ELAPSED_TIME: Duration = Duration::from_secs(120);

/// Errors for invalid backoff settings
#[derive(Debug, Error, PartialEq)]
pub enum BackoffError {
    #[error("Initial backoff interval must be greater than zero")]
    ZeroInitialInterval,

    #[error("Backoff multiplier must be at least 1.0, got {0}")]
    MultiplierTooSmall(f64),

    #[error("Backoff multiplier must be finite, got {0}")]
    MultiplierNotFinite(f64),

    #[error("Maximum backoff interval ({max:?}) is shorter than the initial interval ({initial:?})")]
    MaxIntervalTooSmall { initial: Duration, max: Duration },
}

/// Configuration for exponential backoff between retries
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    /// Wait before the first retry
    pub initial_interval: Duration,
    /// Factor applied to the previous wait to get the next one
    pub multiplier: f64,
    /// Cap for any single wait
    pub max_interval: Duration,
    /// Retries stop once the summed waits reach this value
    pub max_elapsed_time: Duration,
    /// Optional cap on the number of waits handed out
    pub max_attempts: Option<u32>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_interval: DEFAULT_INITIAL_INTERVAL,
            multiplier: DEFAULT_MULTIPLIER,
            max_interval: DEFAULT_MAX_INTERVAL,
            max_elapsed_time: DEFAULT_MAX_ELAPSED_TIME,
            max_attempts: None,
        }
    }
}

impl BackoffConfig {
    /// Checks that the policy produces a non-decreasing, non-zero sequence
    pub fn validate(&self) -> Result<(), BackoffError> {
        if self.initial_interval.is_zero() {
            return Err(BackoffError::ZeroInitialInterval);
        }
        if self.multiplier.is_nan() || self.multiplier < 1.0 {
            return Err(BackoffError::MultiplierTooSmall(self.multiplier));
        }
        if !self.multiplier.is_finite() {
            return Err(BackoffError::MultiplierNotFinite(self.multiplier));
        }
        if self.max_interval < self.initial_interval {
            return Err(BackoffError::MaxIntervalTooSmall {
                initial: self.initial_interval,
                max: self.max_interval,
            });
        }
        Ok(())
    }

    /// Starts a fresh backoff sequence
    pub fn start(&self) -> BackoffExecution {
        BackoffExecution {
            config: self.clone(),
            current_interval: None,
            elapsed: Duration::ZERO,
            attempts: 0,
        }
    }
}

/// A running backoff sequence
#[derive(Debug, Clone)]
pub struct BackoffExecution {
    config: BackoffConfig,
    current_interval: Option<Duration>,
    elapsed: Duration,
    attempts: u32,
}

impl BackoffExecution {
    /// Returns the next wait interval, or `None` once the sequence has stopped
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.elapsed >= self.config.max_elapsed_time {
            return None;
        }
        if let Some(max) = self.config.max_attempts {
            if self.attempts >= max {
                return None;
            }
        }

        let next = self.compute_next_interval();
        self.current_interval = Some(next);
        self.elapsed += next;
        self.attempts += 1;
        Some(next)
    }

    /// Total time handed out so far
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn compute_next_interval(&self) -> Duration {
        let max = self.config.max_interval;
        match self.current_interval {
            None => self.config.initial_interval.min(max),
            Some(current) if current >= max => max,
            // Growth past what a Duration can hold saturates at the cap
            Some(current) => {
                Duration::try_from_secs_f64(current.as_secs_f64() * self.config.multiplier)
                    .map_or(max, |next| next.min(max))
            }
        }
    }
}
