use std::fmt;

use serde::Serialize;

/// Classification of a provider failure.
///
/// The kind decides how long the provider is benched after the failure:
///
/// | Kind | 1st failure | 2nd failure | 3rd+ failure |
/// |------|-------------|-------------|--------------|
/// | `RateLimit` (no `Retry-After`) | 5s | 10s | 20s |
/// | `RateLimit` (with `Retry-After`) | min(hint, 20s) | min(hint, 20s) | min(hint, 20s) |
/// | `Network` | 4s | 8s | 20s |
/// | `Other` | 20s | 20s | 20s |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// HTTP 429 or an equivalent throttling response.
    RateLimit,

    /// Transport-level failure: connect error, timeout, cancelled request.
    Network,

    /// Anything else: unexpected status, malformed payload, empty result.
    Other,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimit => "rate_limit",
            Self::Network => "network",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
