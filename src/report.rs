//! Report assembly.
//!
//! Pulls every provider in turn, converts failures into the documented
//! fallbacks through explicit matches, feeds the composite scorer, and
//! finishes with the AI SWOT. Which inputs were live and which degraded is
//! recorded in the report's provenance block.

use std::future::Future;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;

use crate::ai::{self, AnalysisFacts, DynAnalysisClient, GeoInsights};
use crate::analyze::scoring::{compute_breakdown, BrandScoreInput, ScoreBreakdown};
use crate::analyze::swot::SwotSections;
use crate::brand::{domain_for_brand, BrandKnowledge, CompanyInfo};
use crate::config::ApiKeys;
use crate::metrics::ensure_metrics_described;
use crate::providers::locations::{LocationInsight, LocationsClient};
use crate::providers::moz::{mock_metrics, DomainMetrics, MozClient};
use crate::providers::news::{NewsClient, NewsDigest};
use crate::providers::serp::{mock_summary, SerpClient, SerpSummary};
use crate::providers::{FetchOrigin, ProviderError};

/// Which inputs were fetched live and which fell back, plus the AI provider
/// that produced (or skipped) the SWOT.
#[derive(Debug, Clone, Serialize)]
pub struct Provenance {
    pub news: FetchOrigin,
    pub serp: FetchOrigin,
    pub domain: FetchOrigin,
    pub ai_provider: &'static str,
}

/// Full brand-health report returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct BrandReport {
    pub brand: String,
    pub generated_at: DateTime<Utc>,
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    pub news: NewsDigest,
    pub serp: SerpSummary,
    pub domain: DomainMetrics,
    pub swot: SwotSections,
    pub company: CompanyInfo,
    pub provenance: Provenance,
}

/// Owns the provider clients and the brand knowledge; all report endpoints
/// run through here.
pub struct ReportEngine {
    news: NewsClient,
    serp: SerpClient,
    moz: MozClient,
    locations: LocationsClient,
    ai: DynAnalysisClient,
    knowledge: BrandKnowledge,
}

impl ReportEngine {
    /// Wire every client from the injected key set.
    pub fn from_keys(keys: &ApiKeys) -> Self {
        ensure_metrics_described();
        Self {
            news: NewsClient::new(keys.news.clone()),
            serp: SerpClient::new(keys.serp.clone()),
            moz: MozClient::new(keys.moz.clone()),
            locations: LocationsClient::new(keys.serpwow.clone()),
            ai: ai::build_analysis_client(keys),
            knowledge: BrandKnowledge::builtin().clone(),
        }
    }

    /// Fully custom wiring (tests point clients at mock servers).
    pub fn new(
        news: NewsClient,
        serp: SerpClient,
        moz: MozClient,
        locations: LocationsClient,
        ai: DynAnalysisClient,
        knowledge: BrandKnowledge,
    ) -> Self {
        ensure_metrics_described();
        Self {
            news,
            serp,
            moz,
            locations,
            ai,
            knowledge,
        }
    }

    /// Assemble the full report for one brand.
    pub async fn analyze_brand(&self, brand: &str) -> BrandReport {
        let brand = brand.trim();
        let company = self.knowledge.company_info(brand);

        let (news, news_origin) = match timed("news", self.news.fetch_digest(brand)).await {
            Ok(digest) => (digest, FetchOrigin::Live),
            Err(err) => {
                note_fallback(&err);
                (NewsDigest::empty(), FetchOrigin::Fallback((&err).into()))
            }
        };

        let (serp, serp_origin) = match timed("serp", self.serp.fetch_summary(brand)).await {
            Ok(summary) => (summary, FetchOrigin::Live),
            Err(err) => {
                note_fallback(&err);
                (mock_summary(brand), FetchOrigin::Fallback((&err).into()))
            }
        };

        let domain_name = domain_for_brand(brand);
        let (domain, domain_origin) = match timed("moz", self.moz.fetch_metrics(&domain_name)).await
        {
            Ok(metrics) => (metrics, FetchOrigin::Live),
            Err(err) => {
                note_fallback(&err);
                (mock_metrics(&domain_name), FetchOrigin::Fallback((&err).into()))
            }
        };

        let input = BrandScoreInput {
            news_articles: news.articles.clone(),
            top_search_position: serp.top_position,
            domain_authority: Some(domain.domain_authority),
            serp_features: serp.features,
        };
        let breakdown = compute_breakdown(&input);

        let facts = AnalysisFacts {
            brand,
            sentiment_score: breakdown.total,
            domain_authority: Some(domain.domain_authority),
            news: &news,
            serp: &serp,
            company: &company,
        };
        let swot = ai::generate_swot(self.ai.as_ref(), &facts).await;

        counter!("brand_reports_total").increment(1);

        BrandReport {
            brand: brand.to_string(),
            generated_at: Utc::now(),
            score: breakdown.total,
            breakdown,
            news,
            serp,
            domain,
            swot,
            company,
            provenance: Provenance {
                news: news_origin,
                serp: serp_origin,
                domain: domain_origin,
                ai_provider: self.ai.provider_name(),
            },
        }
    }

    /// News digest alone (the `/news` endpoint). Fallback is the empty digest.
    pub async fn news_digest(&self, brand: &str) -> (NewsDigest, FetchOrigin) {
        match timed("news", self.news.fetch_digest(brand.trim())).await {
            Ok(digest) => (digest, FetchOrigin::Live),
            Err(err) => {
                note_fallback(&err);
                (NewsDigest::empty(), FetchOrigin::Fallback((&err).into()))
            }
        }
    }

    /// Location insights alone (the `/locations` endpoint).
    pub async fn brand_locations(&self, brand: &str) -> (Vec<LocationInsight>, FetchOrigin) {
        match timed("locations", self.locations.fetch_brand_locations(brand.trim())).await {
            Ok(locations) => (locations, FetchOrigin::Live),
            Err(err) => {
                note_fallback(&err);
                (Vec::new(), FetchOrigin::Fallback((&err).into()))
            }
        }
    }

    /// Geographical insights from the AI client (the `/geo` endpoint).
    pub async fn geo_insights(&self, brand: &str) -> GeoInsights {
        let brand = brand.trim();
        let company = self.knowledge.company_info(brand);
        ai::generate_geo_insights(self.ai.as_ref(), brand, &company).await
    }
}

async fn timed<T, F>(provider: &'static str, fut: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    counter!("provider_requests_total", "provider" => provider).increment(1);
    let t0 = Instant::now();
    let out = fut.await;
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("provider_fetch_ms", "provider" => provider).record(ms);
    out
}

fn note_fallback(err: &ProviderError) {
    tracing::warn!(provider = err.provider(), error = %err, "provider fallback");
    counter!("provider_fallbacks_total", "provider" => err.provider()).increment(1);
}
