//! Brand Health Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use brand_health_analyzer::api::{self, AppState};
use brand_health_analyzer::config::ApiKeys;
use brand_health_analyzer::crm::HubSpotClient;
use brand_health_analyzer::metrics::Metrics;
use brand_health_analyzer::notify::email::EmailSender;
use brand_health_analyzer::report::ReportEngine;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - BRAND_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("BRAND_DEV_LOG").ok().is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("brand_health_analyzer=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let metrics = Metrics::init();

    // Credentials are read once here and injected; clients never consult the
    // environment themselves.
    let keys = ApiKeys::from_env();
    let engine = ReportEngine::from_keys(&keys);
    let crm = HubSpotClient::new(keys.hubspot.clone());

    let email = EmailSender::try_from_env().unwrap_or_else(|error| {
        tracing::warn!(%error, "email notifications disabled (bad SMTP config)");
        None
    });

    let state = AppState::new(engine, crm, email);
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
