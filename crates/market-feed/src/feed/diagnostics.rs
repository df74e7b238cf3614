//! Per-cycle attempt report for the market fallback chain.

use std::time::Duration;

use crate::errors::FailureKind;

/// What happened to one provider during a market cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum AttemptOutcome {
    /// Still cooling down from an earlier failure.
    Skipped { remaining: Duration },

    /// Attempted and failed; the provider is now benched for `cooldown`.
    Failed {
        kind: FailureKind,
        message: String,
        cooldown: Duration,
    },

    /// Attempted and delivered `coins` quotes.
    Succeeded { coins: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderAttempt {
    pub provider: String,
    pub outcome: AttemptOutcome,
}

/// Ordered record of every provider considered in one market cycle.
#[derive(Clone, Debug, Default)]
pub struct CycleReport {
    pub attempts: Vec<ProviderAttempt>,
}

impl CycleReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skip(&mut self, provider: impl Into<String>, remaining: Duration) {
        self.push(provider, AttemptOutcome::Skipped { remaining });
    }

    pub fn record_failure(
        &mut self,
        provider: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
        cooldown: Duration,
    ) {
        self.push(
            provider,
            AttemptOutcome::Failed {
                kind,
                message: message.into(),
                cooldown,
            },
        );
    }

    pub fn record_success(&mut self, provider: impl Into<String>, coins: usize) {
        self.push(provider, AttemptOutcome::Succeeded { coins });
    }

    fn push(&mut self, provider: impl Into<String>, outcome: AttemptOutcome) {
        self.attempts.push(ProviderAttempt {
            provider: provider.into(),
            outcome,
        });
    }

    /// Providers actually contacted (failed or succeeded).
    pub fn attempted(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| !matches!(a.outcome, AttemptOutcome::Skipped { .. }))
            .count()
    }

    pub fn has_success(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| matches!(a.outcome, AttemptOutcome::Succeeded { .. }))
    }

    /// One-line summary for logging.
    pub fn summary(&self) -> String {
        if self.attempts.is_empty() {
            return "no providers".to_string();
        }
        self.attempts
            .iter()
            .map(|a| match &a.outcome {
                AttemptOutcome::Skipped { remaining } => {
                    format!("{}: SKIPPED ({:.1}s left)", a.provider, remaining.as_secs_f64())
                }
                AttemptOutcome::Failed {
                    kind,
                    message,
                    cooldown,
                } => format!(
                    "{}: {} ({}, cooldown {}s)",
                    a.provider,
                    kind.as_str().to_uppercase(),
                    message,
                    cooldown.as_secs()
                ),
                AttemptOutcome::Succeeded { coins } => {
                    format!("{}: SUCCESS ({} coins)", a.provider, coins)
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
