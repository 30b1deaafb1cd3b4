//! Operational timing knobs of the state machine

use std::ops::RangeInclusive;
use std::time::Duration;

/// Intervals and retry budgets used by the state machine and the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tunables {
    /// Pause between two stable keepalive cycles
    pub keep_alive_interval: Duration,
    /// Receive window of a single `recv`
    pub recv_timeout: Duration,
    /// Backoff after a rejected challenge
    pub challenge_retry: Duration,
    /// Backoff after a rejected login, before the clearing logout
    pub login_retry: Duration,
    /// Backoff before the driver restarts the session from scratch
    pub timeout_retry: Duration,
    /// Backoff after a rejected or timed out keepalive
    pub keepalive_retry: Duration,
    /// Rejected bootstraps tolerated before giving up on the session, 0 for never
    pub max_bootstrap_attempts: u32,
    /// Consecutive failed stable cycles tolerated before re-authenticating, 0 for never
    pub max_keepalive_failures: u32,
    /// Local ports probed when binding the socket
    pub port_range: RangeInclusive<u16>,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            keep_alive_interval: Duration::from_secs(20),
            recv_timeout: Duration::from_secs(3),
            challenge_retry: Duration::from_secs(3),
            login_retry: Duration::from_secs(30),
            timeout_retry: Duration::from_secs(5),
            keepalive_retry: Duration::from_secs(3),
            max_bootstrap_attempts: 0,
            max_keepalive_failures: 0,
            port_range: 60000..=65535,
        }
    }
}

impl Tunables {
    /// Every interval set to zero, for driving the state machine in tests
    pub fn immediate() -> Self {
        Self {
            keep_alive_interval: Duration::ZERO,
            recv_timeout: Duration::from_millis(200),
            challenge_retry: Duration::ZERO,
            login_retry: Duration::ZERO,
            timeout_retry: Duration::ZERO,
            keepalive_retry: Duration::ZERO,
            ..Self::default()
        }
    }
}
