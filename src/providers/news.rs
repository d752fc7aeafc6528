//! NewsAPI client: recent English articles mentioning the brand, with
//! sentiment derived per article at ingestion.

use serde::{Deserialize, Serialize};

use crate::analyze::scoring::Article;
use crate::providers::{http_client, normalize_feed_text, ProviderError};
use crate::sentiment::Sentiment;

const PROVIDER: &str = "news";
const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const PAGE_SIZE: u32 = 20;

pub struct NewsClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

/// Sentiment distribution over a digest's articles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

/// Structured digest of the news feed for one brand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsDigest {
    pub articles: Vec<Article>,
    pub total_results: u64,
    pub sentiment_summary: SentimentSummary,
    pub source_diversity: u8,
}

impl NewsDigest {
    /// Empty digest used as the fallback when the feed is unavailable.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_articles(articles: Vec<Article>, total_results: u64) -> Self {
        let sentiment_summary = sentiment_summary(&articles);
        let source_diversity = source_diversity(&articles);
        Self {
            articles,
            total_results,
            sentiment_summary,
            source_diversity,
        }
    }
}

/// Count articles per sentiment label.
pub fn sentiment_summary(articles: &[Article]) -> SentimentSummary {
    let mut out = SentimentSummary::default();
    for a in articles {
        match a.sentiment {
            Sentiment::Positive => out.positive += 1,
            Sentiment::Neutral => out.neutral += 1,
            Sentiment::Negative => out.negative += 1,
        }
    }
    out
}

/// 0–10 score: `min(10, round(unique_sources / articles * 20))`.
pub fn source_diversity(articles: &[Article]) -> u8 {
    if articles.is_empty() {
        return 0;
    }
    let unique: std::collections::HashSet<&str> =
        articles.iter().map(|a| a.source_name.as_str()).collect();
    let ratio = unique.len() as f64 / articles.len() as f64;
    (ratio * 20.0).round().min(10.0) as u8
}

#[derive(Deserialize)]
struct FeedResponse {
    #[serde(default)]
    articles: Vec<FeedArticle>,
    #[serde(rename = "totalResults", default)]
    total_results: u64,
}

#[derive(Deserialize)]
struct FeedArticle {
    title: Option<String>,
    description: Option<String>,
    source: Option<FeedSource>,
}

#[derive(Deserialize)]
struct FeedSource {
    name: Option<String>,
}

impl NewsClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Custom base URL for tests pointed at a local mock server.
    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            http: http_client(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch up to [`PAGE_SIZE`] recent articles and build the digest.
    pub async fn fetch_digest(&self, brand: &str) -> Result<NewsDigest, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::MissingApiKey { provider: PROVIDER })?;

        let url = format!("{}/v2/everything", self.base_url);
        let page_size = PAGE_SIZE.to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("q", brand),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
                ("apiKey", key),
            ])
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: resp.status().as_u16(),
            });
        }

        let body: FeedResponse = resp.json().await.map_err(|source| ProviderError::Decode {
            provider: PROVIDER,
            source,
        })?;

        let articles = body
            .articles
            .into_iter()
            .map(|a| {
                Article::from_feed(
                    normalize_feed_text(&a.title.unwrap_or_default()),
                    normalize_feed_text(&a.description.unwrap_or_default()),
                    a.source.and_then(|s| s.name).unwrap_or_default(),
                )
            })
            .collect();

        Ok(NewsDigest::from_articles(articles, body.total_results))
    }
}
