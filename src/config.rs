//! Injected configuration.
//!
//! API keys are read from the environment exactly once at startup and passed
//! explicitly into the clients that need them; provider code never touches
//! the process environment itself.

/// Snapshot of the third-party credentials. `None` means the provider runs
/// in fallback mode.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub news: Option<String>,
    pub serp: Option<String>,
    pub moz: Option<String>,
    pub serpwow: Option<String>,
    pub openai: Option<String>,
    pub hubspot: Option<String>,
}

impl ApiKeys {
    pub fn from_env() -> Self {
        Self {
            news: non_empty("NEWS_API_KEY"),
            serp: non_empty("SERP_API_KEY"),
            moz: non_empty("MOZ_API_KEY"),
            serpwow: non_empty("SERPWOW_API_KEY"),
            openai: non_empty("OPENAI_API_KEY"),
            hubspot: non_empty("HUBSPOT_API_KEY"),
        }
    }
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
