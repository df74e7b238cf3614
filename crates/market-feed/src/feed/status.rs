//! Status events reported by the feed alongside market updates.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::FeedError;

/// Severity of a status event.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Loading,
    Ok,
    Warning,
    Error,
}

/// Machine-readable reason attached to warnings and errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// Every attempted provider failed and at least one was throttled.
    RateLimited,
    /// Every attempted provider failed; cached data is being shown.
    OfflineCached,
    /// Data came from a provider other than the first in the chain.
    FallbackActive,
    /// Every attempted provider failed and nothing is cached.
    NoData,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl StatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::OfflineCached => "offline_cached",
            Self::FallbackActive => "fallback_active",
            Self::NoData => "no_data",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status notification.
#[derive(Clone, Debug)]
pub struct StatusEvent {
    pub kind: StatusKind,
    pub code: Option<StatusCode>,
    /// Provider that delivered (OK, fallback) or was last involved.
    pub provider: Option<String>,
    pub error: Option<Arc<FeedError>>,
}

impl StatusEvent {
    fn bare(kind: StatusKind) -> Self {
        Self {
            kind,
            code: None,
            provider: None,
            error: None,
        }
    }

    pub fn loading() -> Self {
        Self::bare(StatusKind::Loading)
    }

    pub fn ok(provider: impl Into<String>) -> Self {
        Self {
            provider: Some(provider.into()),
            ..Self::bare(StatusKind::Ok)
        }
    }

    pub fn warning(code: StatusCode) -> Self {
        Self {
            code: Some(code),
            ..Self::bare(StatusKind::Warning)
        }
    }

    pub fn error(code: StatusCode, error: FeedError) -> Self {
        Self {
            code: Some(code),
            error: Some(Arc::new(error)),
            ..Self::bare(StatusKind::Error)
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(code) = self.code {
            write!(f, "/{}", code)?;
        }
        if let Some(provider) = &self.provider {
            write!(f, " via {}", provider)?;
        }
        if let Some(error) = &self.error {
            write!(f, ": {}", error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;

    #[test]
    fn test_display() {
        assert_eq!(StatusEvent::loading().to_string(), "loading");
        assert_eq!(StatusEvent::ok("coingecko").to_string(), "ok via coingecko");
        assert_eq!(
            StatusEvent::warning(StatusCode::FallbackActive)
                .with_provider("coinlore")
                .to_string(),
            "warning/fallback_active via coinlore"
        );

        let err = FeedError::Provider(ProviderError::network("cg", "offline"));
        assert_eq!(
            StatusEvent::error(StatusCode::NoData, err).to_string(),
            "error/no_data: cg: offline"
        );
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&StatusCode::OfflineCached).unwrap(),
            "\"offline_cached\""
        );
        assert_eq!(serde_json::to_string(&StatusKind::Warning).unwrap(), "\"warning\"");
    }
}
