//! Per-provider cooldown tracking.
//!
//! Every failed attempt benches the provider for a while; the length depends
//! on the failure kind and on how many failures happened in a row (see
//! [`FailureKind`]). A success clears everything at once.
//!
//! The tracker holds no lock of its own: it lives inside the feed state and is
//! only touched under that lock. All methods take `now` explicitly.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use tokio::time::Instant;

use crate::errors::{FailureKind, ProviderError};

/// Cooldown ceiling for every failure kind.
pub const MAX_COOLDOWN: Duration = Duration::from_secs(20);

const RATE_LIMIT_STEPS: [Duration; 3] = [
    Duration::from_secs(5),
    Duration::from_secs(10),
    MAX_COOLDOWN,
];

const NETWORK_STEPS: [Duration; 3] = [
    Duration::from_secs(4),
    Duration::from_secs(8),
    MAX_COOLDOWN,
];

/// Health state of a single provider.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct HealthState {
    cooldown_until: Option<Instant>,
    consecutive_failures: u32,
}

/// Cooldown to apply after a failure.
///
/// `consecutive_failures` counts the failure being recorded, so the first
/// failure passes 1.
pub fn failure_cooldown(consecutive_failures: u32, err: &ProviderError) -> Duration {
    match err.kind {
        FailureKind::RateLimit => match err.retry_after {
            Some(hint) if !hint.is_zero() => hint.min(MAX_COOLDOWN),
            _ => step(&RATE_LIMIT_STEPS, consecutive_failures),
        },
        FailureKind::Network => step(&NETWORK_STEPS, consecutive_failures),
        FailureKind::Other => MAX_COOLDOWN,
    }
}

fn step(steps: &[Duration; 3], consecutive_failures: u32) -> Duration {
    let index = consecutive_failures.saturating_sub(1).min(2) as usize;
    steps[index]
}

/// Read-only view of one provider's health.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderHealthSnapshot {
    pub provider: String,
    pub consecutive_failures: u32,
    /// Time left on the cooldown, `None` when the provider is available.
    pub cooldown_remaining: Option<Duration>,
}

/// Cooldown state for every provider the feed has attempted.
#[derive(Debug, Default)]
pub struct ProviderHealth {
    providers: HashMap<String, HealthState>,
}

impl ProviderHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the provider may be attempted at `now`.
    ///
    /// Unknown providers are available.
    pub fn is_available(&self, provider: &str, now: Instant) -> bool {
        self.cooldown_remaining(provider, now).is_none()
    }

    /// Time left before the provider may be attempted again.
    pub fn cooldown_remaining(&self, provider: &str, now: Instant) -> Option<Duration> {
        let until = self.providers.get(provider)?.cooldown_until?;
        if until > now {
            Some(until - now)
        } else {
            None
        }
    }

    pub fn consecutive_failures(&self, provider: &str) -> u32 {
        self.providers
            .get(provider)
            .map(|state| state.consecutive_failures)
            .unwrap_or(0)
    }

    /// Reset the provider: no failures, no cooldown.
    pub fn record_success(&mut self, provider: &str) {
        if let Some(state) = self.providers.get_mut(provider) {
            if state.consecutive_failures > 0 {
                debug!(
                    "Provider {} recovered after {} failure(s)",
                    provider, state.consecutive_failures
                );
            }
            *state = HealthState::default();
        }
    }

    /// Bench the provider after a failure and return the applied cooldown.
    pub fn record_failure(&mut self, provider: &str, err: &ProviderError, now: Instant) -> Duration {
        let state = self.providers.entry(provider.to_string()).or_default();
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        let cooldown = failure_cooldown(state.consecutive_failures, err);
        state.cooldown_until = Some(now + cooldown);
        debug!(
            "Provider {} cooling down for {:?} after {} ({} in a row)",
            provider, cooldown, err.kind, state.consecutive_failures
        );
        cooldown
    }

    /// Snapshot of every tracked provider, sorted by id.
    pub fn snapshot(&self, now: Instant) -> Vec<ProviderHealthSnapshot> {
        let mut entries: Vec<ProviderHealthSnapshot> = self
            .providers
            .iter()
            .map(|(provider, state)| ProviderHealthSnapshot {
                provider: provider.clone(),
                consecutive_failures: state.consecutive_failures,
                cooldown_remaining: self.cooldown_remaining(provider, now),
            })
            .collect();
        entries.sort_by(|a, b| a.provider.cmp(&b.provider));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_rate_limit_steps_without_hint() {
        let err = ProviderError::rate_limited("cg", None);
        assert_eq!(failure_cooldown(1, &err), secs(5));
        assert_eq!(failure_cooldown(2, &err), secs(10));
        assert_eq!(failure_cooldown(3, &err), secs(20));
        assert_eq!(failure_cooldown(9, &err), secs(20));
    }

    #[test]
    fn test_rate_limit_hint_is_capped_and_ignores_count() {
        let short = ProviderError::rate_limited("cg", Some(secs(3)));
        assert_eq!(failure_cooldown(1, &short), secs(3));
        assert_eq!(failure_cooldown(5, &short), secs(3));

        let long = ProviderError::rate_limited("cg", Some(secs(120)));
        assert_eq!(failure_cooldown(1, &long), secs(20));
    }

    #[test]
    fn test_network_steps() {
        let err = ProviderError::network("cg", "timeout");
        assert_eq!(failure_cooldown(1, &err), secs(4));
        assert_eq!(failure_cooldown(2, &err), secs(8));
        assert_eq!(failure_cooldown(3, &err), secs(20));
    }

    #[test]
    fn test_other_is_flat() {
        let err = ProviderError::other("cg", "bad payload");
        assert_eq!(failure_cooldown(1, &err), secs(20));
        assert_eq!(failure_cooldown(2, &err), secs(20));
    }

    #[test]
    fn test_unknown_provider_is_available() {
        let health = ProviderHealth::new();
        assert!(health.is_available("cg", Instant::now()));
        assert_eq!(health.consecutive_failures("cg"), 0);
    }

    #[test]
    fn test_failure_benches_until_cooldown_elapses() {
        let mut health = ProviderHealth::new();
        let now = Instant::now();
        let err = ProviderError::network("cg", "timeout");

        assert_eq!(health.record_failure("cg", &err, now), secs(4));
        assert!(!health.is_available("cg", now));
        assert_eq!(health.cooldown_remaining("cg", now + secs(1)), Some(secs(3)));
        assert!(health.is_available("cg", now + secs(4)));

        assert_eq!(health.record_failure("cg", &err, now + secs(4)), secs(8));
        assert_eq!(health.consecutive_failures("cg"), 2);
        assert!(!health.is_available("cg", now + secs(11)));
        assert!(health.is_available("cg", now + secs(12)));
    }

    #[test]
    fn test_success_clears_cooldown_immediately() {
        let mut health = ProviderHealth::new();
        let now = Instant::now();
        health.record_failure("cg", &ProviderError::other("cg", "boom"), now);
        health.record_success("cg");

        assert!(health.is_available("cg", now));
        assert_eq!(health.consecutive_failures("cg"), 0);

        let cooldown = health.record_failure("cg", &ProviderError::rate_limited("cg", None), now);
        assert_eq!(cooldown, secs(5));
    }

    #[test]
    fn test_providers_are_independent() {
        let mut health = ProviderHealth::new();
        let now = Instant::now();
        health.record_failure("a", &ProviderError::other("a", "boom"), now);

        assert!(!health.is_available("a", now));
        assert!(health.is_available("b", now));

        let snapshot = health.snapshot(now);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].provider, "a");
        assert_eq!(snapshot[0].cooldown_remaining, Some(secs(20)));
    }
}
