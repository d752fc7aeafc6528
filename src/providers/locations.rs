//! SerpWow locations client: where a brand has search presence, ranked by
//! reach, with approximate per-country coordinates for map rendering.

use serde::{Deserialize, Serialize};

use crate::providers::{http_client, ProviderError};

const PROVIDER: &str = "locations";
const DEFAULT_BASE_URL: &str = "https://api.serpwow.com";
const MAX_LOCATIONS: usize = 10;

pub struct LocationsClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

/// One location a brand reaches, ready for the map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInsight {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub reach: u64,
    /// (latitude, longitude), approximate country centroid.
    pub coordinates: (f64, f64),
}

#[derive(Deserialize)]
struct RawLocations {
    #[serde(default)]
    locations: Vec<RawLocation>,
}

#[derive(Deserialize)]
struct RawLocation {
    name: Option<String>,
    full_name: Option<String>,
    country_code: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    reach: Option<u64>,
}

impl LocationsClient {
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

    /// Top locations for a brand, sorted by reach, capped at [`MAX_LOCATIONS`].
    pub async fn fetch_brand_locations(
        &self,
        brand: &str,
    ) -> Result<Vec<LocationInsight>, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::MissingApiKey { provider: PROVIDER })?;

        let url = format!("{}/live/locations", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("api_key", key), ("q", brand)])
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

        let raw: RawLocations = resp.json().await.map_err(|source| ProviderError::Decode {
            provider: PROVIDER,
            source,
        })?;

        Ok(rank_locations(raw.locations))
    }
}

fn rank_locations(mut raw: Vec<RawLocation>) -> Vec<LocationInsight> {
    raw.sort_by(|a, b| b.reach.unwrap_or(0).cmp(&a.reach.unwrap_or(0)));
    raw.into_iter()
        .take(MAX_LOCATIONS)
        .map(|l| {
            let country_code = l.country_code.unwrap_or_default();
            let coordinates = approximate_coordinates(&country_code);
            LocationInsight {
                name: l.name.unwrap_or_default(),
                full_name: l.full_name,
                country_code,
                kind: l.kind,
                reach: l.reach.unwrap_or(0),
                coordinates,
            }
        })
        .collect()
}

/// Approximate country centroid; unknown codes map to (0, 0).
pub fn approximate_coordinates(country_code: &str) -> (f64, f64) {
    match country_code {
        "US" => (37.0902, -95.7129),
        "GB" => (55.3781, -3.4360),
        "CA" => (56.1304, -106.3468),
        "AU" => (-25.2744, 133.7751),
        "DE" => (51.1657, 10.4515),
        "FR" => (46.2276, 2.2137),
        "JP" => (36.2048, 138.2529),
        "BR" => (-14.2350, -51.9253),
        "IN" => (20.5937, 78.9629),
        _ => (0.0, 0.0),
    }
}
