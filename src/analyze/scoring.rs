//! Composite brand score over already-fetched signals.
//!
//! Four sub-scores in [0,100] blend under fixed weights:
//! news sentiment 0.30, search position 0.30, domain authority 0.20,
//! SERP features 0.20. Absent inputs contribute their category default, so
//! the composite is always defined. Deterministic, no I/O.

use serde::{Deserialize, Serialize};

use crate::sentiment::{classify, Sentiment};

pub const W_NEWS: f64 = 0.30;
pub const W_SEARCH: f64 = 0.30;
pub const W_DOMAIN: f64 = 0.20;
pub const W_SERP: f64 = 0.20;

/// One news article with its derived sentiment.
/// Sentiment is computed once at ingestion and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub source_name: String,
    pub sentiment: Sentiment,
}

impl Article {
    /// Build an article from raw feed fields, deriving sentiment from the
    /// concatenated title and description.
    pub fn from_feed(title: String, description: String, source_name: String) -> Self {
        let sentiment = classify(&format!("{title} {description}"));
        Self {
            title,
            description,
            source_name,
            sentiment,
        }
    }
}

/// Recognized SERP feature flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpFeatures {
    pub answer_box: bool,
    pub knowledge_graph: bool,
    pub local_results: bool,
    pub related_questions: bool,
    pub related_searches: bool,
}

impl SerpFeatures {
    /// Fixed points per present feature, capped at 100.
    pub fn points(&self) -> f64 {
        let mut pts: f64 = 0.0;
        if self.answer_box {
            pts += 25.0;
        }
        if self.knowledge_graph {
            pts += 25.0;
        }
        if self.local_results {
            pts += 25.0;
        }
        if self.related_questions {
            pts += 15.0;
        }
        if self.related_searches {
            pts += 10.0;
        }
        pts.min(100.0)
    }
}

/// Inputs to the composite score. Callers must supply valid ranges
/// (position ≥ 1, domain authority in [0,100]); values are not sanitized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandScoreInput {
    pub news_articles: Vec<Article>,
    pub top_search_position: Option<u32>,
    pub domain_authority: Option<f64>,
    pub serp_features: SerpFeatures,
}

/// Sub-scores plus the final composite, exposed for explainability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub news_score: f64,
    pub search_score: f64,
    pub domain_score: f64,
    pub serp_score: f64,
    pub total: u8,
}

/// Composite 0–100 brand score.
pub fn compute_score(input: &BrandScoreInput) -> u8 {
    compute_breakdown(input).total
}

/// Composite score with its per-category sub-scores.
pub fn compute_breakdown(input: &BrandScoreInput) -> ScoreBreakdown {
    let news_score = news_score(&input.news_articles);
    let search_score = search_score(input.top_search_position);
    let domain_score = input.domain_authority.unwrap_or(0.0);
    let serp_score = input.serp_features.points();

    let weighted = news_score * W_NEWS
        + search_score * W_SEARCH
        + domain_score * W_DOMAIN
        + serp_score * W_SERP;

    ScoreBreakdown {
        news_score,
        search_score,
        domain_score,
        serp_score,
        total: weighted.round() as u8,
    }
}

/// Average article sentiment mapped to positive=100 / neutral=50 / negative=0.
/// No articles means no signal: neutral 50.
fn news_score(articles: &[Article]) -> f64 {
    if articles.is_empty() {
        return 50.0;
    }
    let sum: f64 = articles.iter().map(|a| a.sentiment.points()).sum();
    sum / articles.len() as f64
}

/// Position 1 maps to 100, each further rank loses 10 points, 11+ is 0.
/// No known position is 0.
fn search_score(position: Option<u32>) -> f64 {
    match position {
        Some(p) => (100.0 - (f64::from(p) - 1.0) * 10.0).max(0.0),
        None => 0.0,
    }
}
