// tests/providers_news.rs
//
// NewsClient against a local mock server: digest construction, error
// surfacing, and the missing-key guard (which must not touch the network).

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brand_health_analyzer::providers::news::NewsClient;
use brand_health_analyzer::providers::ProviderError;
use brand_health_analyzer::sentiment::Sentiment;

#[tokio::test]
async fn digest_is_built_from_feed_articles() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "title": "Acme posts record growth",
                "description": "an excellent quarter",
                "source": { "name": "Wire" }
            },
            {
                "title": "Acme faces lawsuit",
                "description": "a scandal unfolds",
                "source": { "name": "Daily" }
            }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "Acme"))
        .and(query_param("language", "en"))
        .and(query_param("apiKey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = NewsClient::with_base_url(Some("test-key".to_string()), &server.uri());
    let digest = client.fetch_digest("Acme").await.expect("digest");

    assert_eq!(digest.articles.len(), 2);
    assert_eq!(digest.total_results, 2);
    assert_eq!(digest.articles[0].sentiment, Sentiment::Positive);
    assert_eq!(digest.articles[1].sentiment, Sentiment::Negative);
    assert_eq!(digest.sentiment_summary.positive, 1);
    assert_eq!(digest.sentiment_summary.negative, 1);
    assert_eq!(digest.source_diversity, 10);
}

#[tokio::test]
async fn feed_text_is_normalized_before_classification() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "totalResults": 1,
        "articles": [
            {
                "title": "<b>Acme</b>&nbsp;wins award",
                "description": null,
                "source": { "name": "Wire" }
            }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = NewsClient::with_base_url(Some("k".to_string()), &server.uri());
    let digest = client.fetch_digest("Acme").await.expect("digest");
    assert_eq!(digest.articles[0].title, "Acme wins award");
}

#[tokio::test]
async fn upstream_error_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = NewsClient::with_base_url(Some("bad-key".to_string()), &server.uri());
    let err = client.fetch_digest("Acme").await.expect_err("must fail");
    assert!(matches!(
        err,
        ProviderError::Status {
            provider: "news",
            status: 401
        }
    ));
}

#[tokio::test]
async fn missing_key_short_circuits_without_network() {
    // Unroutable base URL: a request would hang or error differently.
    let client = NewsClient::with_base_url(None, "http://127.0.0.1:1");
    let err = client.fetch_digest("Acme").await.expect_err("must fail");
    assert!(matches!(err, ProviderError::MissingApiKey { provider: "news" }));
}
