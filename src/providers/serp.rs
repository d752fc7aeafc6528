//! SerpAPI client: Google results for the brand query, reduced to the
//! summary shape the scorer and report need.
//!
//! The deterministic mock summary mirrors what the original front-end showed
//! without credentials: official site first, Wikipedia second, a review site
//! third, plus a knowledge graph and canned related searches.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analyze::scoring::SerpFeatures;
use crate::providers::{http_client, ProviderError};

const PROVIDER: &str = "serp";
const DEFAULT_BASE_URL: &str = "https://serpapi.com";
const MAX_COMPETITORS: usize = 5;
const MOCK_TOTAL_RESULTS: u64 = 12_400_000;

pub struct SerpClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

/// One organic search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganicResult {
    pub position: Option<u32>,
    pub title: String,
    pub link: String,
}

/// Reduced SERP payload for one brand query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerpSummary {
    pub organic_results: Vec<OrganicResult>,
    pub related_searches: Vec<String>,
    pub knowledge_graph_title: Option<String>,
    pub features: SerpFeatures,
    /// Position of the first organic hit (scoring input).
    pub top_position: Option<u32>,
    /// First organic hit whose title or link mentions the brand, 1-indexed.
    pub brand_position: Option<u32>,
    pub competitors: Vec<String>,
    pub total_results: Option<u64>,
}

#[derive(Default, Deserialize)]
struct RawResponse {
    #[serde(default)]
    organic_results: Vec<RawOrganic>,
    knowledge_graph: Option<RawKnowledgeGraph>,
    #[serde(default)]
    related_searches: Vec<RawRelatedSearch>,
    #[serde(default)]
    related_questions: Vec<Value>,
    local_results: Option<Value>,
    answer_box: Option<Value>,
    search_information: Option<RawSearchInformation>,
}

#[derive(Deserialize)]
struct RawOrganic {
    position: Option<u32>,
    title: Option<String>,
    link: Option<String>,
}

#[derive(Default, Deserialize)]
struct RawKnowledgeGraph {
    title: Option<String>,
    #[serde(default)]
    people_also_search_for: Vec<RawPeopleAlsoSearchFor>,
}

#[derive(Deserialize)]
struct RawPeopleAlsoSearchFor {
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawRelatedSearch {
    query: Option<String>,
}

#[derive(Deserialize)]
struct RawSearchInformation {
    total_results: Option<u64>,
}

impl SerpClient {
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

    pub async fn fetch_summary(&self, brand: &str) -> Result<SerpSummary, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::MissingApiKey { provider: PROVIDER })?;

        let url = format!("{}/search.json", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("engine", "google"),
                ("q", brand.trim()),
                ("gl", "us"),
                ("hl", "en"),
                ("api_key", key),
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

        let body: RawResponse = resp.json().await.map_err(|source| ProviderError::Decode {
            provider: PROVIDER,
            source,
        })?;

        Ok(build_summary(body, brand))
    }
}

/// Deterministic offline summary for a brand (no credentials / upstream down).
pub fn mock_summary(brand: &str) -> SerpSummary {
    build_summary(mock_response(brand), brand)
}

fn mock_response(brand: &str) -> RawResponse {
    let clean = brand.to_lowercase().trim().to_string();
    let slug: String = clean.chars().filter(|c| !c.is_whitespace()).collect();

    RawResponse {
        organic_results: vec![
            RawOrganic {
                position: Some(1),
                title: Some(format!("Official {clean} Website - Home")),
                link: Some(format!("https://www.{slug}.com/")),
            },
            RawOrganic {
                position: Some(2),
                title: Some(format!("{clean} - Wikipedia")),
                link: Some(format!(
                    "https://en.wikipedia.org/wiki/{}",
                    clean.replace(' ', "_")
                )),
            },
            RawOrganic {
                position: Some(3),
                title: Some(format!("{clean} Reviews | Customer Service Reviews of {clean}")),
                link: Some(format!("https://www.trustpilot.com/review/{slug}.com")),
            },
        ],
        knowledge_graph: Some(RawKnowledgeGraph {
            title: Some(brand.trim().to_string()),
            people_also_search_for: vec![
                RawPeopleAlsoSearchFor {
                    name: Some("Competitor1".to_string()),
                },
                RawPeopleAlsoSearchFor {
                    name: Some("Competitor2".to_string()),
                },
            ],
        }),
        related_searches: vec![
            RawRelatedSearch {
                query: Some(format!("{clean} products")),
            },
            RawRelatedSearch {
                query: Some(format!("{clean} reviews")),
            },
            RawRelatedSearch {
                query: Some(format!("{clean} vs competitors")),
            },
        ],
        related_questions: vec![
            serde_json::json!({ "question": format!("What does {clean} do?") }),
            serde_json::json!({ "question": format!("When was {clean} founded?") }),
        ],
        local_results: None,
        answer_box: None,
        search_information: Some(RawSearchInformation {
            total_results: Some(MOCK_TOTAL_RESULTS),
        }),
    }
}

fn build_summary(raw: RawResponse, brand: &str) -> SerpSummary {
    let organic_results: Vec<OrganicResult> = raw
        .organic_results
        .iter()
        .map(|r| OrganicResult {
            position: r.position,
            title: r.title.clone().unwrap_or_default(),
            link: r.link.clone().unwrap_or_default(),
        })
        .collect();

    let related_searches: Vec<String> = raw
        .related_searches
        .iter()
        .filter_map(|r| r.query.clone())
        .collect();

    let features = SerpFeatures {
        answer_box: value_present(raw.answer_box.as_ref()),
        knowledge_graph: raw.knowledge_graph.is_some(),
        local_results: value_present(raw.local_results.as_ref()),
        related_questions: !raw.related_questions.is_empty(),
        related_searches: !related_searches.is_empty(),
    };

    // First hit's declared position; rank 10 stands in when the field is
    // missing, matching how the feed is scored upstream.
    let top_position = organic_results
        .first()
        .map(|r| r.position.unwrap_or(10));

    let brand_position = find_brand_position(&organic_results, brand);
    let people_also_search_for = raw
        .knowledge_graph
        .as_ref()
        .map(|kg| kg.people_also_search_for.as_slice())
        .unwrap_or(&[]);
    let competitors = extract_competitors(&related_searches, people_also_search_for);

    SerpSummary {
        knowledge_graph_title: raw.knowledge_graph.and_then(|kg| kg.title),
        organic_results,
        related_searches,
        features,
        top_position,
        brand_position,
        competitors,
        total_results: raw.search_information.and_then(|s| s.total_results),
    }
}

/// Presence check for loosely-typed SERP blocks: an empty array is absent,
/// anything else present.
fn value_present(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// First organic result whose title or link contains the brand, 1-indexed.
pub fn find_brand_position(results: &[OrganicResult], brand: &str) -> Option<u32> {
    let lower = brand.to_lowercase();
    if lower.is_empty() {
        return None;
    }
    results.iter().enumerate().find_map(|(i, r)| {
        let hit = r.title.to_lowercase().contains(&lower) || r.link.to_lowercase().contains(&lower);
        hit.then_some(i as u32 + 1)
    })
}

/// Competitor candidates: "X vs Y" related searches plus the knowledge graph
/// "people also search for" names, deduplicated, capped at 5.
fn extract_competitors(
    related_searches: &[String],
    people_also_search_for: &[RawPeopleAlsoSearchFor],
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push_unique = |name: &str| {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|c| c == name) {
            out.push(name.to_string());
        }
    };

    static RE_VS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)vs (.+)").expect("vs regex"));
    for query in related_searches {
        if let Some(c) = RE_VS.captures(query) {
            push_unique(c.get(1).map_or("", |m| m.as_str()));
        }
    }
    for p in people_also_search_for {
        if let Some(name) = &p.name {
            push_unique(name);
        }
    }

    out.truncate(MAX_COMPETITORS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_summary_is_deterministic_and_ranked() {
        let a = mock_summary("Acme");
        let b = mock_summary("Acme");
        assert_eq!(a, b);
        assert_eq!(a.top_position, Some(1));
        assert_eq!(a.brand_position, Some(1));
        assert_eq!(a.total_results, Some(MOCK_TOTAL_RESULTS));
    }

    #[test]
    fn mock_features_reflect_present_blocks() {
        let f = mock_summary("Acme").features;
        assert!(f.knowledge_graph);
        assert!(f.related_questions);
        assert!(f.related_searches);
        assert!(!f.answer_box);
        assert!(!f.local_results);
        // 25 + 15 + 10
        assert_eq!(f.points(), 50.0);
    }

    #[test]
    fn brand_position_matches_title_or_link() {
        let results = vec![
            OrganicResult {
                position: Some(1),
                title: "Some directory".into(),
                link: "https://dir.example.com".into(),
            },
            OrganicResult {
                position: Some(2),
                title: "ACME Inc - official".into(),
                link: "https://acme.com".into(),
            },
        ];
        assert_eq!(find_brand_position(&results, "acme"), Some(2));
        assert_eq!(find_brand_position(&results, "zenith"), None);
        assert_eq!(find_brand_position(&[], "acme"), None);
    }

    #[test]
    fn competitors_come_from_vs_queries_and_knowledge_graph() {
        let related = vec![
            "acme vs Zenith".to_string(),
            "acme reviews".to_string(),
            "acme vs Zenith".to_string(),
        ];
        let pasf = vec![
            RawPeopleAlsoSearchFor {
                name: Some("Orbit".into()),
            },
            RawPeopleAlsoSearchFor { name: None },
        ];
        assert_eq!(extract_competitors(&related, &pasf), vec!["Zenith", "Orbit"]);
    }

    #[test]
    fn competitor_list_is_capped() {
        let related: Vec<String> = (0..8).map(|i| format!("acme vs Rival{i}")).collect();
        assert_eq!(extract_competitors(&related, &[]).len(), MAX_COMPETITORS);
    }

    #[test]
    fn missing_first_position_defaults_to_rank_ten() {
        let raw = RawResponse {
            organic_results: vec![RawOrganic {
                position: None,
                title: Some("hit".into()),
                link: None,
            }],
            ..RawResponse::default()
        };
        assert_eq!(build_summary(raw, "x").top_position, Some(10));
    }
}
