use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::ai::GeoInsights;
use crate::crm::{HubSpotClient, LeadForm, LeadOutcome};
use crate::notify::{email::EmailSender, LeadEvent};
use crate::providers::locations::LocationInsight;
use crate::providers::news::NewsDigest;
use crate::providers::FetchOrigin;
use crate::report::{BrandReport, ReportEngine};

#[derive(Clone)]
pub struct AppState {
    engine: Arc<ReportEngine>,
    crm: Arc<HubSpotClient>,
    email: Arc<Option<EmailSender>>,
}

impl AppState {
    pub fn new(engine: ReportEngine, crm: HubSpotClient, email: Option<EmailSender>) -> Self {
        Self {
            engine: Arc::new(engine),
            crm: Arc::new(crm),
            email: Arc::new(email),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/news", get(news))
        .route("/locations", get(locations))
        .route("/geo", get(geo))
        .route("/leads", post(leads))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct AnalyzeReq {
    brand: String,
}

#[derive(Deserialize)]
struct BrandQuery {
    #[serde(default)]
    brand: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

const MISSING_BRAND: (StatusCode, Json<ErrorBody>) = (
    StatusCode::BAD_REQUEST,
    Json(ErrorBody {
        error: "Brand name is required",
    }),
);

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<BrandReport>, (StatusCode, Json<ErrorBody>)> {
    let brand = body.brand.trim();
    if brand.is_empty() {
        return Err(MISSING_BRAND);
    }
    Ok(Json(state.engine.analyze_brand(brand).await))
}

#[derive(Serialize)]
struct NewsResp {
    #[serde(flatten)]
    digest: NewsDigest,
    provenance: FetchOrigin,
}

async fn news(
    State(state): State<AppState>,
    Query(q): Query<BrandQuery>,
) -> Result<Json<NewsResp>, (StatusCode, Json<ErrorBody>)> {
    let brand = required_brand(&q)?;
    let (digest, provenance) = state.engine.news_digest(&brand).await;
    Ok(Json(NewsResp { digest, provenance }))
}

#[derive(Serialize)]
struct LocationsResp {
    locations: Vec<LocationInsight>,
    provenance: FetchOrigin,
}

async fn locations(
    State(state): State<AppState>,
    Query(q): Query<BrandQuery>,
) -> Result<Json<LocationsResp>, (StatusCode, Json<ErrorBody>)> {
    let brand = required_brand(&q)?;
    let (locations, provenance) = state.engine.brand_locations(&brand).await;
    Ok(Json(LocationsResp {
        locations,
        provenance,
    }))
}

async fn geo(
    State(state): State<AppState>,
    Query(q): Query<BrandQuery>,
) -> Result<Json<GeoInsights>, (StatusCode, Json<ErrorBody>)> {
    let brand = required_brand(&q)?;
    Ok(Json(state.engine.geo_insights(&brand).await))
}

fn required_brand(q: &BrandQuery) -> Result<String, (StatusCode, Json<ErrorBody>)> {
    match q.brand.as_deref().map(str::trim) {
        Some(b) if !b.is_empty() => Ok(b.to_string()),
        _ => Err(MISSING_BRAND),
    }
}

#[derive(Serialize)]
struct LeadResp {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn leads(
    State(state): State<AppState>,
    Json(form): Json<LeadForm>,
) -> (StatusCode, Json<LeadResp>) {
    match state.crm.upsert_contact(&form).await {
        Ok(outcome) => {
            counter!("leads_submitted_total").increment(1);

            let event = LeadEvent {
                brand: form.brand_name.clone(),
                name: form.name.clone(),
                email: form.email.clone(),
                company: form.company.clone(),
                contact_id: outcome.contact_id().to_string(),
                ts: Utc::now(),
            };
            if let Some(sender) = &*state.email {
                if let Err(error) = sender.send_lead(&event).await {
                    // Notification is best-effort; the lead itself succeeded.
                    tracing::warn!(%error, "lead notification email failed");
                }
            }

            let message = match &outcome {
                LeadOutcome::Created(_) => "New contact created successfully",
                LeadOutcome::Updated(_) => "Existing contact updated successfully",
            };
            (
                StatusCode::OK,
                Json(LeadResp {
                    success: true,
                    message: message.to_string(),
                    contact_id: Some(outcome.contact_id().to_string()),
                    error: None,
                }),
            )
        }
        Err(error) => {
            tracing::error!(%error, "lead capture failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LeadResp {
                    success: false,
                    message: "Failed to create or update contact".to_string(),
                    contact_id: None,
                    error: Some(error.to_string()),
                }),
            )
        }
    }
}
