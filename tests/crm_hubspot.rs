// tests/crm_hubspot.rs
//
// HubSpot lead flow against a local mock server:
// - create path (2xx → Created + list add)
// - conflict path (409 with "Existing ID" → update → Updated)
// - conflict without an extractable ID stays an error
// - list-add failure never fails the lead

use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brand_health_analyzer::crm::{CrmError, HubSpotClient, LeadForm, LeadOutcome};

fn lead() -> LeadForm {
    LeadForm {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        company: "Analytical Engines".to_string(),
        title: "CTO".to_string(),
        brand_name: "Acme".to_string(),
    }
}

#[tokio::test]
async fn new_contact_is_created_and_added_to_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/crm/v3/objects/contacts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": "1001" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/contacts/v1/lists/78/add"))
        .and(body_json(serde_json::json!({ "vids": [1001] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HubSpotClient::with_base_url(Some("hs-key".to_string()), &server.uri());
    let outcome = client.upsert_contact(&lead()).await.expect("created");
    assert_eq!(outcome, LeadOutcome::Created("1001".to_string()));
}

#[tokio::test]
async fn existing_contact_is_updated_via_conflict_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/crm/v3/objects/contacts"))
        .respond_with(ResponseTemplate::new(409).set_body_string(
            r#"{"status":"error","message":"Contact already exists. Existing ID: 2002"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/crm/v3/objects/contacts/2002"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "2002" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/contacts/v1/lists/78/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HubSpotClient::with_base_url(Some("hs-key".to_string()), &server.uri());
    let outcome = client.upsert_contact(&lead()).await.expect("updated");
    assert_eq!(outcome, LeadOutcome::Updated("2002".to_string()));
}

#[tokio::test]
async fn conflict_without_existing_id_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/crm/v3/objects/contacts"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_string(r#"{"status":"error","message":"duplicate"}"#),
        )
        .mount(&server)
        .await;

    let client = HubSpotClient::with_base_url(Some("hs-key".to_string()), &server.uri());
    let err = client.upsert_contact(&lead()).await.expect_err("409");
    assert!(matches!(err, CrmError::Status { status: 409, .. }));
}

#[tokio::test]
async fn list_add_failure_does_not_fail_the_lead() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/crm/v3/objects/contacts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": "3003" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/contacts/v1/lists/78/add"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = HubSpotClient::with_base_url(Some("hs-key".to_string()), &server.uri());
    let outcome = client.upsert_contact(&lead()).await.expect("created");
    assert_eq!(outcome, LeadOutcome::Created("3003".to_string()));
}

#[tokio::test]
async fn missing_key_short_circuits() {
    let client = HubSpotClient::with_base_url(None, "http://127.0.0.1:1");
    let err = client.upsert_contact(&lead()).await.expect_err("no key");
    assert!(matches!(err, CrmError::MissingApiKey));
}
