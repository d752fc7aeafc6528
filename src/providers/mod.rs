// src/providers/mod.rs
// Typed clients for the third-party feeds the report is assembled from.
// Each fetch returns Result<T, ProviderError>; choosing a fallback is the
// caller's explicit decision, recorded as a FetchOrigin in the report.

pub mod locations;
pub mod moz;
pub mod news;
pub mod serp;

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Why a provider call could not produce a live payload.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: &'static str },

    #[error("{provider} API error: {status}")]
    Status { provider: &'static str, status: u16 },

    #[error("{provider} transport error: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} decode error: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ProviderError {
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::MissingApiKey { provider }
            | ProviderError::Status { provider, .. }
            | ProviderError::Transport { provider, .. }
            | ProviderError::Decode { provider, .. } => provider,
        }
    }
}

/// How a report input was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "origin", content = "reason")]
pub enum FetchOrigin {
    Live,
    Fallback(FallbackReason),
}

impl FetchOrigin {
    pub fn is_live(self) -> bool {
        matches!(self, FetchOrigin::Live)
    }
}

/// Collapsed failure category carried in the report provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    MissingApiKey,
    UpstreamStatus,
    Transport,
    Decode,
}

impl From<&ProviderError> for FallbackReason {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::MissingApiKey { .. } => FallbackReason::MissingApiKey,
            ProviderError::Status { .. } => FallbackReason::UpstreamStatus,
            ProviderError::Transport { .. } => FallbackReason::Transport,
            ProviderError::Decode { .. } => FallbackReason::Decode,
        }
    }
}

/// Shared reqwest client defaults: short connect timeout, bounded total time,
/// identifiable UA.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("brand-health-analyzer/0.1")
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(15))
        .build()
        .unwrap_or_default()
}

/// Normalize feed text before classification: decode HTML entities, strip
/// tags, collapse whitespace.
pub fn normalize_feed_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = RE_TAGS.replace_all(&out, "").to_string();

    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));
    out = RE_WS.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_decodes_entities_and_strips_tags() {
        let s = "  <b>Acme&nbsp;wins</b>   award ";
        assert_eq!(normalize_feed_text(s), "Acme wins award");
    }

    #[test]
    fn fallback_reason_maps_error_variants() {
        let err = ProviderError::MissingApiKey { provider: "news" };
        assert_eq!(FallbackReason::from(&err), FallbackReason::MissingApiKey);
        let err = ProviderError::Status {
            provider: "news",
            status: 502,
        };
        assert_eq!(FallbackReason::from(&err), FallbackReason::UpstreamStatus);
    }
}
