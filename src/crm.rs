//! HubSpot CRM client: contact upsert plus static-list membership for
//! captured leads.
//!
//! Create first; a 409 conflict means the contact exists, in which case the
//! existing ID is pulled out of the error body and the contact is updated
//! instead. List membership is best-effort and never fails the lead.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::providers::http_client;

const DEFAULT_BASE_URL: &str = "https://api.hubapi.com";
/// Static contact list the lead-gen tool files every contact into.
const LEAD_LIST_ID: u32 = 78;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("HubSpot API key is not configured")]
    MissingApiKey,

    #[error("HubSpot API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HubSpot transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Lead-capture form payload as submitted by the front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    pub company: String,
    pub title: String,
    #[serde(rename = "brandName")]
    pub brand_name: String,
}

/// What happened to the contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "contact_id")]
pub enum LeadOutcome {
    Created(String),
    Updated(String),
}

impl LeadOutcome {
    pub fn contact_id(&self) -> &str {
        match self {
            LeadOutcome::Created(id) | LeadOutcome::Updated(id) => id,
        }
    }
}

pub struct HubSpotClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Deserialize)]
struct ContactResponse {
    id: String,
}

impl HubSpotClient {
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

    /// Create-or-update the contact for a lead, then file it into the
    /// lead-gen list.
    pub async fn upsert_contact(&self, form: &LeadForm) -> Result<LeadOutcome, CrmError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(CrmError::MissingApiKey)?;

        let properties = contact_properties(form);
        let url = format!("{}/crm/v3/objects/contacts", self.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(key)
            .json(&json!({ "properties": properties }))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let contact: ContactResponse = resp.json().await?;
            self.add_to_lead_list(key, &contact.id).await;
            return Ok(LeadOutcome::Created(contact.id));
        }

        if status.as_u16() != 409 {
            let body = resp.text().await.unwrap_or_default();
            return Err(CrmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // Conflict: the contact exists. The v3 API reports the existing ID
        // only inside the error message text.
        let body = resp.text().await.unwrap_or_default();
        let Some(contact_id) = extract_existing_id(&body) else {
            return Err(CrmError::Status {
                status: 409,
                body,
            });
        };

        let update_url = format!("{}/crm/v3/objects/contacts/{contact_id}", self.base_url);
        let resp = self
            .http
            .patch(&update_url)
            .bearer_auth(key)
            .json(&json!({ "properties": properties }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CrmError::Status { status, body });
        }

        self.add_to_lead_list(key, &contact_id).await;
        Ok(LeadOutcome::Updated(contact_id))
    }

    /// Best-effort legacy list add; failures are logged and swallowed.
    async fn add_to_lead_list(&self, key: &str, contact_id: &str) {
        let Ok(vid) = contact_id.parse::<i64>() else {
            tracing::warn!(contact_id, "non-numeric contact id, skipping list add");
            return;
        };

        let url = format!("{}/contacts/v1/lists/{LEAD_LIST_ID}/add", self.base_url);
        let result = self
            .http
            .post(&url)
            .bearer_auth(key)
            .json(&json!({ "vids": [vid] }))
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(contact_id, list = LEAD_LIST_ID, "contact added to lead list");
            }
            Ok(resp) => {
                tracing::warn!(contact_id, status = %resp.status(), "lead list add failed");
            }
            Err(error) => {
                tracing::warn!(contact_id, %error, "lead list add failed");
            }
        }
    }
}

/// Map the form onto standard HubSpot contact properties. The brand name is
/// stored in the website field.
fn contact_properties(form: &LeadForm) -> serde_json::Value {
    let mut words = form.name.split_whitespace();
    let firstname = words.next().unwrap_or_default().to_string();
    let lastname = words.collect::<Vec<_>>().join(" ");

    json!({
        "email": form.email,
        "firstname": firstname,
        "lastname": lastname,
        "company": form.company,
        "jobtitle": form.title,
        "website": form.brand_name,
    })
}

static RE_EXISTING_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Existing ID: (\d+)").expect("existing id regex"));

/// Pull `Existing ID: <digits>` out of a 409 error body.
fn extract_existing_id(body: &str) -> Option<String> {
    RE_EXISTING_ID
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
