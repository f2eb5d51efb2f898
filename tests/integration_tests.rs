//! Integration tests for the harvester
//!
//! These tests run full batches against a mock search API over real HTTP.

use search_harvest::{
    config::load_config,
    error::HarvestError,
    json_search,
    types::{SearchConfiguration, YearRange},
    HarvestOptions,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn create_search_response() -> serde_json::Value {
    json!({
        "query": "ai",
        "total": 2,
        "items": [
            { "title": "AI at Site", "link": "https://www.site.org/ai" },
            { "title": "More AI", "link": "https://www.site.org/more-ai" }
        ]
    })
}

fn create_config(server: &MockServer, dir: &Path, websites: &[&str]) -> SearchConfiguration {
    let mut levels = BTreeMap::new();
    levels.insert(1, websites.iter().map(|w| w.to_string()).collect());
    SearchConfiguration {
        api_url: format!("{}/search", server.uri()),
        ret_max: 10,
        keywords: vec!["ai".to_string()],
        years: YearRange::default(),
        levels,
        output_directory: dir.to_path_buf(),
        search_level: 1,
    }
}

fn options(timeout_ms: u64) -> HarvestOptions {
    HarvestOptions {
        timeout: Some(timeout_ms),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_single_request_written_as_pretty_json() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "ai"))
        .and(query_param("siteSearch", "https://www.site.org"))
        .and(query_param("maxItems", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_search_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let config = create_config(&mock_server, dir.path(), &["https://www.site.org"]);

    let report = json_search(&config, options(5000)).await.unwrap();

    assert_eq!(report.requests, 1);
    assert_eq!(report.fallbacks, 0);

    let written = std::fs::read_to_string(dir.path().join("ai_site.json")).unwrap();
    assert!(written.starts_with("{\n    \"query\": \"ai\""));
    let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed, create_search_response());
}

#[tokio::test]
async fn test_year_range_requests() {
    let mock_server = MockServer::start().await;
    for year in [2020, 2021] {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("from", year.to_string()))
            .and(query_param("to", (year + 1).to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "year": year })))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let dir = tempdir().unwrap();
    let mut config = create_config(&mock_server, dir.path(), &["https://example.com"]);
    config.years = YearRange::new(2020, 2022);

    let report = json_search(&config, options(5000)).await.unwrap();

    assert_eq!(report.requests, 2);
    let first = std::fs::read_to_string(dir.path().join("ai_2020_example.json")).unwrap();
    assert_eq!(first, "{\n    \"year\": 2020\n}");
    assert!(dir.path().join("ai_2021_example.json").exists());
    assert!(!dir.path().join("ai_2022_example.json").exists());
}

#[tokio::test]
async fn test_quoted_keyword_is_sent_as_phrase() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "deep learning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let mut config = create_config(&mock_server, dir.path(), &["https://www.site.org"]);
    config.keywords = vec!["\"deep learning\"".to_string()];

    json_search(&config, options(5000)).await.unwrap();

    assert!(dir.path().join("deep%20learning_site.json").exists());
}

#[tokio::test]
async fn test_server_error_triggers_single_fallback() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "ai research"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_search_response()))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let mut config = create_config(&mock_server, dir.path(), &["https://www.site.org"]);
    config.keywords = vec!["ai research".to_string()];

    let report = json_search(&config, options(5000)).await.unwrap();

    assert_eq!(report.requests, 2);
    assert_eq!(report.fallbacks, 1);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
    assert!(dir.path().join("ai research_site.json").exists());
}

#[tokio::test]
async fn test_quoted_phrase_fallback_is_encoded_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "deep learning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_search_response()))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let mut config = create_config(&mock_server, dir.path(), &["https://www.site.org"]);
    config.keywords = vec!["\"deep learning\"".to_string()];

    let report = json_search(&config, options(5000)).await.unwrap();

    assert_eq!(report.fallbacks, 1);
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let retry_query = requests[1].url.query().unwrap_or_default().to_string();
    assert!(retry_query.starts_with("q=deep%20learning&"), "{retry_query}");
    assert!(dir.path().join("deep%20learning_site.json").exists());
}

#[tokio::test]
async fn test_failed_fallback_aborts_whole_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let config = create_config(
        &mock_server,
        dir.path(),
        &["https://www.site.org", "https://example.com"],
    );

    let result = json_search(&config, options(5000)).await;

    match result {
        Err(HarvestError::HttpError { status_code, .. }) => assert_eq!(status_code, Some(500)),
        other => panic!("Expected HttpError, got {other:?}"),
    }

    // Primary + fallback for the first website, nothing for the second
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests
        .iter()
        .all(|r| !r.url.as_str().contains("example.com")));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let config = create_config(&mock_server, dir.path(), &["https://www.site.org"]);

    let result = json_search(&config, options(5000)).await;

    assert!(matches!(result, Err(HarvestError::ParseError(_))));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_timeout_counts_as_transport_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(create_search_response())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let config = create_config(&mock_server, dir.path(), &["https://www.site.org"]);

    let result = json_search(&config, options(100)).await;

    match result {
        Err(HarvestError::Timeout { timeout_ms }) => assert_eq!(timeout_ms, 100),
        other => panic!("Expected Timeout, got {other:?}"),
    }
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_output_directory_fails() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_search_response()))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let missing = dir.path().join("not-created");
    let config = create_config(&mock_server, &missing, &["https://www.site.org"]);

    let result = json_search(&config, options(5000)).await;

    assert!(matches!(result, Err(HarvestError::IoError(_))));
    assert!(!missing.exists());
}

#[tokio::test]
async fn test_run_from_yaml_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_search_response()))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let out = dir.path().join("data");
    std::fs::create_dir(&out).unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        format!(
            r#"
api_url: {}/search
ret_max: 25
search:
  keywords: ["ai", "ml"]
  years: [0, 0]
  levels:
    "1": ["https://www.site.org"]
    "2": ["https://example.com", "https://www.other.net"]
  directory: {}
  search_level: 2
"#,
            mock_server.uri(),
            out.display()
        ),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    let report = json_search(&config, options(5000)).await.unwrap();

    assert_eq!(report.requests, 4);
    let names: Vec<String> = report
        .files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["ai_example.json", "ml_example.json", "ai_other.json", "ml_other.json"]
    );

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| r.url.query().unwrap_or_default().contains("maxItems=25")));
}
