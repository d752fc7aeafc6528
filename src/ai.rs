//! LLM adapter: provider abstraction behind the SWOT and geo-insight prompts.
//!
//! The provider returns raw completion text or nothing; turning that text
//! into structured output (and choosing the fallback when there is none)
//! happens here, on top of the total parsers in `analyze::swot`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analyze::swot::{parse_swot_text, SwotSections};
use crate::brand::{BrandKind, CompanyInfo};
use crate::config::ApiKeys;
use crate::providers::news::NewsDigest;
use crate::providers::serp::SerpSummary;

/// Env escape hatch: set to `mock` to force the deterministic mock client.
pub const ENV_AI_TEST_MODE: &str = "BRAND_AI_TEST_MODE";

const DEFAULT_MODEL: &str = "gpt-4";

/// Completion client used by analysis generation (handlers/tests).
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Run one completion; `None` on any failure or when disabled.
    async fn complete(&self, system: &str, prompt: &str) -> Option<String>;

    /// Provider name for diagnostics/provenance.
    fn provider_name(&self) -> &'static str;
}

pub type DynAnalysisClient = Arc<dyn AnalysisClient>;

/// Factory: mock when the test-mode env is set, disabled without a key,
/// otherwise the real OpenAI client.
pub fn build_analysis_client(keys: &ApiKeys) -> DynAnalysisClient {
    if std::env::var(ENV_AI_TEST_MODE)
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockClient {
            fixed: MOCK_SWOT_REPLY.to_string(),
        });
    }

    match keys.openai.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => Arc::new(OpenAiClient::new(key.to_string(), None)),
        None => Arc::new(DisabledClient),
    }
}

// ------------------------------------------------------------
// Providers
// ------------------------------------------------------------

/// OpenAI Chat Completions provider.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// `model_override`: pass Some("gpt-3.5-turbo") to override; defaults to gpt-4.
    pub fn new(api_key: String, model_override: Option<&str>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("brand-health-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key,
            model: model_override.unwrap_or(DEFAULT_MODEL).to_string(),
        }
    }
}

#[async_trait]
impl AnalysisClient for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Option<String> {
        if self.api_key.is_empty() {
            return None;
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
            max_tokens: 1500,
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .ok()?;

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "openai completion failed");
            return None;
        }
        let body: Resp = resp.json().await.ok()?;
        let content = body.choices.first().map(|c| c.message.content.trim())?;
        if content.is_empty() {
            None
        } else {
            Some(content.to_string())
        }
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Returns `None` always; used when no API key is configured.
pub struct DisabledClient;

#[async_trait]
impl AnalysisClient for DisabledClient {
    async fn complete(&self, _system: &str, _prompt: &str) -> Option<String> {
        None
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic mock for tests/local runs.
#[derive(Clone)]
pub struct MockClient {
    pub fixed: String,
}

#[async_trait]
impl AnalysisClient for MockClient {
    async fn complete(&self, _system: &str, _prompt: &str) -> Option<String> {
        Some(self.fixed.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Canned reply used by the mock client; exercises the full section parser.
pub const MOCK_SWOT_REPLY: &str = "Strengths:\n- Established brand recognition\nWeaknesses:\n- Limited data available\nOpportunities:\n- Growing online interest\nThreats:\n- Competitive pressure\nSummary:\nStable position with room to grow (mock).";

// ------------------------------------------------------------
// SWOT generation
// ------------------------------------------------------------

/// Data the prompts are built from; all fields already fetched.
pub struct AnalysisFacts<'a> {
    pub brand: &'a str,
    pub sentiment_score: u8,
    pub domain_authority: Option<f64>,
    pub news: &'a NewsDigest,
    pub serp: &'a SerpSummary,
    pub company: &'a CompanyInfo,
}

/// Fixed analysis used when the provider fails or is disabled.
pub fn fallback_analysis() -> SwotSections {
    SwotSections {
        strengths: vec!["Unable to analyze strengths due to API error".to_string()],
        weaknesses: vec!["Unable to analyze weaknesses due to API error".to_string()],
        opportunities: vec!["Unable to analyze opportunities due to API error".to_string()],
        threats: vec!["Unable to analyze threats due to API error".to_string()],
        summary: "We encountered an error analyzing this brand. Please try again later."
            .to_string(),
    }
}

/// Generate the SWOT analysis: prompt → completion → section parse.
/// Any provider failure yields [`fallback_analysis`].
pub async fn generate_swot(client: &dyn AnalysisClient, facts: &AnalysisFacts<'_>) -> SwotSections {
    let system = swot_system_prompt(facts.company);
    let prompt = swot_prompt(facts);
    match client.complete(&system, &prompt).await {
        Some(text) if !text.trim().is_empty() => parse_swot_text(&text),
        _ => fallback_analysis(),
    }
}

pub fn swot_system_prompt(company: &CompanyInfo) -> String {
    let mut out = String::from(
        "You are a friendly and insightful brand analysis expert specializing in brand sentiment and market presence.\n",
    );
    if company.kind == BrandKind::Medication {
        out.push_str(
            "You have particular expertise in pharmaceutical products and healthcare brands.\n",
        );
    }
    if let Some(industry) = &company.industry {
        out.push_str(&format!("This brand is in the {industry} industry.\n"));
    }
    out.push_str(
        "Provide a comprehensive, data-driven SWOT analysis based on the information provided.\n\
         Base your analysis strictly on the provided data, not on general assumptions.",
    );
    out
}

pub fn swot_prompt(facts: &AnalysisFacts<'_>) -> String {
    let mut out = format!(
        "Perform a detailed SWOT analysis for the brand \"{}\" based on the following data:\n\n",
        facts.brand
    );

    match facts.company.kind {
        BrandKind::Medication => {
            out.push_str(&format!(
                "Note: This appears to be a pharmaceutical product manufactured by {}. Consider regulatory factors, patent status, and healthcare market dynamics in your analysis.\n\n",
                facts.company.name
            ));
        }
        BrandKind::Company => {
            out.push_str(&format!(
                "Note: This is a company in the {} industry{}.\n\n",
                facts.company.industry.as_deref().unwrap_or("unknown"),
                facts
                    .company
                    .hq
                    .as_deref()
                    .map(|hq| format!(" headquartered in {hq}"))
                    .unwrap_or_default()
            ));
        }
        BrandKind::Unknown => {}
    }

    out.push_str(&format!("Sentiment Score: {}/100\n", facts.sentiment_score));
    out.push_str(&format!(
        "Domain Authority: {}\n\n",
        facts
            .domain_authority
            .map(|da| format!("{da:.0}"))
            .unwrap_or_else(|| "Unknown".to_string())
    ));

    out.push_str(&format!(
        "News Articles: {} articles found\n",
        facts.news.articles.len()
    ));
    for a in facts.news.articles.iter().take(5) {
        out.push_str(&format!("- {} (Sentiment: {})\n", a.title, a.sentiment.as_str()));
    }

    out.push_str(&format!(
        "\nSEARCH RESULTS DATA:\n- Total Results: {}\n- Top Position: {}\n- SERP Features: {}\n\n",
        facts
            .serp
            .total_results
            .map(|t| t.to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
        facts
            .serp
            .top_position
            .map(|p| p.to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
        serp_feature_list(facts.serp)
    ));

    out.push_str("Top Organic Results:\n");
    for (i, r) in facts.serp.organic_results.iter().take(5).enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, r.title));
    }

    out.push_str(
        "\nProvide a comprehensive SWOT analysis with:\n\
         1. Strengths: What advantages does this brand have based on the data?\n\
         2. Weaknesses: What disadvantages or areas of improvement does the brand have?\n\
         3. Opportunities: What external factors could the brand leverage for growth?\n\
         4. Threats: What external factors could harm the brand's performance?\n\
         5. Summary: A brief overview of the brand's current position and outlook.\n\n\
         Format your response with clear sections for Strengths, Weaknesses, Opportunities, Threats, and a brief Summary.",
    );
    out
}

fn serp_feature_list(serp: &SerpSummary) -> String {
    let f = serp.features;
    let names: Vec<&str> = [
        (f.answer_box, "answer box"),
        (f.knowledge_graph, "knowledge graph"),
        (f.local_results, "local results"),
        (f.related_questions, "related questions"),
        (f.related_searches, "related searches"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();

    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}

// ------------------------------------------------------------
// Geo insights
// ------------------------------------------------------------

/// Geographical market presence, parsed from a structured completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoInsights {
    #[serde(rename = "brandType")]
    pub brand_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(default)]
    pub locations: Vec<GeoLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    #[serde(rename = "countryCode", default)]
    pub country_code: String,
    #[serde(default)]
    pub reach: f64,
}

/// Generate geographical insights; provider failure or an unparseable reply
/// yields the brand-type-only fallback.
pub async fn generate_geo_insights(
    client: &dyn AnalysisClient,
    brand: &str,
    company: &CompanyInfo,
) -> GeoInsights {
    let system = geo_system_prompt(company);
    let prompt = geo_prompt(brand, company);
    client
        .complete(&system, &prompt)
        .await
        .and_then(|text| parse_geo_reply(&text))
        .unwrap_or_else(|| GeoInsights {
            brand_type: brand_type_label(company.kind).to_string(),
            ..GeoInsights::default()
        })
}

pub fn brand_type_label(kind: BrandKind) -> &'static str {
    match kind {
        BrandKind::Medication => "pharmaceutical",
        BrandKind::Company => "company",
        BrandKind::Unknown => "unknown",
    }
}

fn geo_system_prompt(company: &CompanyInfo) -> String {
    let market_hint = if company.kind == BrandKind::Medication {
        "For pharmaceutical products, focus on major markets like US, EU, Japan, Canada, and Australia."
    } else {
        "For consumer brands, identify their headquarters and major markets."
    };
    format!(
        "You are a friendly and insightful brand analysis expert specializing in brand sentiment and market presence.\n{market_hint}\nProvide accurate, research-based insights without confusing brand names with location names."
    )
}

fn geo_prompt(brand: &str, company: &CompanyInfo) -> String {
    let scope = if company.kind == BrandKind::Medication {
        "List the top 5 countries where this medication is likely prescribed or sold. Focus on major pharmaceutical markets (US, EU, Japan, etc.)."
    } else {
        "Identify the headquarters country and list the top 5 countries where they have market presence."
    };
    format!(
        "Provide geographical insights for the brand \"{brand}\".\n\n{scope}\n\nDO NOT confuse the brand name with similarly named locations.\n\nReturn the data as a JSON object with this structure:\n{{\n  \"brandType\": \"{}\",\n  \"locations\": [\n    {{\"name\": \"Country Name\", \"countryCode\": \"2-letter code\", \"reach\": 1-100}}\n  ]\n}}",
        brand_type_label(company.kind)
    )
}

static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\s*([\s\S]*?)```").expect("json fence regex"));
static RE_JSON_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("json span regex"));

/// Pull a JSON object out of a completion: fenced ```json block first, then
/// the widest `{...}` span, then the raw text.
pub fn parse_geo_reply(text: &str) -> Option<GeoInsights> {
    let candidate = RE_JSON_FENCE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .or_else(|| RE_JSON_SPAN.find(text).map(|m| m.as_str()))
        .unwrap_or(text);
    serde_json::from_str(candidate.trim()).ok()
}
