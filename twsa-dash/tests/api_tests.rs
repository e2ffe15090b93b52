//! Integration tests for twsa-dash HTTP endpoints
//!
//! Tests cover:
//! - Dashboard: charts, keyword filter, no-data page, record cap, partial charts
//! - Tables and the records API: preview limit, "show all", escaping
//! - Summary API: derived views as JSON, error bodies
//! - CSV upload and download
//! - Health endpoint with a working and a failing record store

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method
use twsa_common::config::{ChartConfig, DashboardConfig};
use twsa_common::db::{fields, MemoryRecordStore, SqliteRecordStore};
use twsa_common::{Record, RecordStore, StoreError};
use twsa_dash::charts::ChartRenderer;
use twsa_dash::{build_router, AppState};

/// Record store whose every call fails
struct FailingStore;

#[async_trait::async_trait]
impl RecordStore for FailingStore {
    async fn insert_many(&self, _records: Vec<Record>) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("store offline")))
    }

    async fn find_all(
        &self,
        _fields: &[&str],
        _limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        Err(StoreError::Io(std::io::Error::other("store offline")))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Err(StoreError::Io(std::io::Error::other("store offline")))
    }
}

fn test_config() -> DashboardConfig {
    DashboardConfig {
        chart: ChartConfig {
            width: 320,
            height: 200,
            wordcloud_width: 320,
            wordcloud_height: 160,
            ..ChartConfig::default()
        },
        ..DashboardConfig::default()
    }
}

/// Test helper: app over `store`; charts draw no text so results do not
/// depend on installed fonts
fn setup_app_with(store: Arc<dyn RecordStore>, config: DashboardConfig) -> Router {
    let renderer = ChartRenderer::without_text(config.chart.clone());
    build_router(AppState::with_renderer(store, config, renderer))
}

fn setup_app(records: Vec<Record>) -> Router {
    setup_app_with(Arc::new(MemoryRecordStore::with_records(records)), test_config())
}

fn scenario_records() -> Vec<Record> {
    vec![
        Record::new("good day", "positive", "2024-01-01"),
        Record::new("bad day", "negative", "2024-01-01"),
        Record::new("ok", "neutral", "2024-01-02"),
    ]
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn multipart_upload(field: &str, file_name: &str, content: &str) -> Request<Body> {
    let boundary = "twsa-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n{content}\r\n--{b}--\r\n",
        b = boundary,
        field = field,
        file_name = file_name,
        content = content,
    );
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

async fn body_text(body: Body) -> String {
    String::from_utf8(body_bytes(body).await).expect("Body should be UTF-8")
}

async fn body_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_home_page_links_features() {
    let response = setup_app(Vec::new()).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    for link in ["/dashboard", "/tweets_table", "/upload", "/download_csv"] {
        assert!(html.contains(link), "home page should link {}", link);
    }
}

#[tokio::test]
async fn test_dashboard_renders_three_charts() {
    let response = setup_app(scenario_records())
        .oneshot(get("/dashboard"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert_eq!(html.matches("data:image/png;base64,").count(), 3);
    assert!(html.contains("3 tweets analyzed"));
}

#[tokio::test]
async fn test_dashboard_empty_store_shows_no_data() {
    let response = setup_app(Vec::new())
        .oneshot(get("/dashboard"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("No data available"));
    assert!(!html.contains("data:image/png"));
}

#[tokio::test]
async fn test_dashboard_keyword_filters_records() {
    let response = setup_app(scenario_records())
        .oneshot(get("/dashboard?keyword=DAY"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("2 tweets analyzed"));
    assert!(html.contains("value=\"DAY\""));
}

#[tokio::test]
async fn test_dashboard_unmatched_keyword_is_escaped() {
    let response = setup_app(scenario_records())
        .oneshot(get("/dashboard?keyword=%3Cscript%3E"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("No tweets match"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn test_dashboard_over_cap_is_rejected() {
    let mut config = test_config();
    config.max_records = 2;
    let app = setup_app_with(
        Arc::new(MemoryRecordStore::with_records(scenario_records())),
        config,
    );

    let response = app.oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("more than 2 records"));
}

#[tokio::test]
async fn test_dashboard_omits_only_the_failing_chart() {
    // Stopwords only: counts and dates exist, the word cloud has nothing to show
    let records = vec![
        Record::new("the and of", "positive", "2024-01-01"),
        Record::new("it is", "negative", "2024-01-02"),
    ];
    let response = setup_app(records).oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert_eq!(html.matches("data:image/png;base64,").count(), 2);
    assert!(html.contains("Chart unavailable"));
}

#[tokio::test]
async fn test_dashboard_undated_records_still_counted() {
    let records = vec![Record::new("hello world", "positive", "not-a-date")];
    let response = setup_app(records).oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    // Category chart and word cloud render; the time series has no dates
    assert_eq!(html.matches("data:image/png;base64,").count(), 2);
    assert!(html.contains("1 tweets analyzed"));
}

#[tokio::test]
async fn test_dashboard_store_failure() {
    let app = setup_app_with(Arc::new(FailingStore), test_config());
    let response = app.oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("store offline"));
}

#[tokio::test]
async fn test_tweets_table_preview_and_show_all_link() {
    let records: Vec<Record> = (0..25)
        .map(|i| Record::new(format!("tweet {}", i), "positive", "2024-01-01"))
        .collect();
    let response = setup_app(records).oneshot(get("/tweets_table")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("Showing 20 of 25 tweets"));
    assert!(html.contains("/tweets_table/all"));
    assert!(html.contains("😊 Positive"));
    assert!(html.contains("tweet 19"));
    assert!(!html.contains("tweet 20<"));
}

#[tokio::test]
async fn test_tweets_table_all_and_escaping() {
    let records = vec![
        Record::new("<b>bold</b> & more", "negative", "2024-01-01"),
        Record::new("calm", "neutral", "2024-01-02"),
    ];
    let response = setup_app(records)
        .oneshot(get("/tweets_table/all"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("Showing 2 of 2 tweets"));
    assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; more"));
    assert!(html.contains("😠 Negative"));
    assert!(html.contains("😐 Neutral"));
    assert!(!html.contains("Show all"));
}

// =============================================================================
// JSON API
// =============================================================================

#[tokio::test]
async fn test_records_api_preview() {
    let records: Vec<Record> = (0..25)
        .map(|i| Record::new(format!("tweet {}", i), "neutral", "2024-01-01"))
        .collect();
    let app = setup_app(records);

    let response = app.clone().oneshot(get("/api/records")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["rows"].as_array().unwrap().len(), 20);
    assert_eq!(json["total"], 25);
    assert_eq!(json["limit"], 20);
    assert_eq!(json["has_more"], true);
    assert_eq!(json["rows"][0]["Text"], "tweet 0");

    let response = app.clone().oneshot(get("/api/records?limit=5")).await.unwrap();
    let json = body_json(response.into_body()).await;
    assert_eq!(json["rows"].as_array().unwrap().len(), 5);

    let response = app.oneshot(get("/api/records?all=true")).await.unwrap();
    let json = body_json(response.into_body()).await;
    assert_eq!(json["rows"].as_array().unwrap().len(), 25);
    assert_eq!(json["limit"], Value::Null);
    assert_eq!(json["has_more"], false);
}

#[tokio::test]
async fn test_summary_scenario() {
    let response = setup_app(scenario_records())
        .oneshot(get("/api/summary"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["category_counts"]["positive"], 1);
    assert_eq!(json["category_counts"]["negative"], 1);
    assert_eq!(json["category_counts"]["neutral"], 1);
    assert_eq!(json["time_series"]["rows"]["2024-01-01"]["positive"], 1);
    assert_eq!(json["time_series"]["rows"]["2024-01-01"]["neutral"], 0);
    assert_eq!(json["time_series"]["rows"]["2024-01-02"]["neutral"], 1);
    assert_eq!(json["record_count"], 3);
    assert_eq!(json["undated"], 0);
    assert_eq!(json["corpus_length"], "good day bad day ok".len());
}

#[tokio::test]
async fn test_summary_keyword() {
    let response = setup_app(scenario_records())
        .oneshot(get("/api/summary?keyword=good"))
        .await
        .unwrap();
    let json = body_json(response.into_body()).await;

    assert_eq!(json["keyword"], "good");
    assert_eq!(json["record_count"], 1);
    assert_eq!(json["category_counts"]["positive"], 1);
    assert!(json["category_counts"].get("negative").is_none());
}

#[tokio::test]
async fn test_summary_errors_use_json_body() {
    let response = setup_app(Vec::new())
        .oneshot(get("/api/summary"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["error"]["code"], "NO_DATA");

    let mut config = test_config();
    config.max_records = 1;
    let app = setup_app_with(
        Arc::new(MemoryRecordStore::with_records(scenario_records())),
        config,
    );
    let response = app.oneshot(get("/api/summary")).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["error"]["code"], "DATASET_TOO_LARGE");
    assert!(json["error"]["message"].as_str().unwrap().contains("more than 1 records"));
}

#[tokio::test]
async fn test_summary_over_cap_message_does_not_undercount() {
    let records = (0..50)
        .map(|i| Record::new(format!("tweet {}", i), "positive", "2024-01-01"))
        .collect();
    let mut config = test_config();
    config.max_records = 10;
    let app = setup_app_with(Arc::new(MemoryRecordStore::with_records(records)), config);

    let response = app.oneshot(get("/api/summary")).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(response.into_body()).await;
    let message = json["error"]["message"].as_str().unwrap();
    assert_eq!(message, "Dataset too large: more than 10 records");
    assert!(!message.contains("11"));
}

#[tokio::test]
async fn test_dashboard_keyword_link_is_percent_encoded() {
    let app = setup_app(scenario_records());
    let response = app
        .oneshot(get("/dashboard?keyword=good%20day"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("/api/summary?keyword=good%20day"));
}

#[tokio::test]
async fn test_buildinfo() {
    let response = setup_app(Vec::new())
        .oneshot(get("/api/buildinfo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["git_hash"].is_string());
    assert!(json["build_timestamp"].is_string());
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_ok() {
    let response = setup_app(scenario_records())
        .oneshot(get("/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "twsa-dash");
    assert_eq!(json["records"], 3);
}

#[tokio::test]
async fn test_health_degraded_when_store_fails() {
    let app = setup_app_with(Arc::new(FailingStore), test_config());
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["status"], "degraded");
    assert!(json.get("records").is_none());
}

// =============================================================================
// CSV transfer
// =============================================================================

#[tokio::test]
async fn test_upload_stamps_batch_and_inserts() {
    let store = Arc::new(MemoryRecordStore::new());
    let app = setup_app_with(store.clone(), test_config());

    let csv = "Text,Sentiment,Timestamp\ngood day,positive,2024-01-01\nbad day,negative,2024-01-02";
    let response = app
        .oneshot(multipart_upload("file", "tweets.csv", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response.into_body()).await;
    assert!(html.contains("Uploaded 2 tweets"));
    assert!(html.contains("tweets.csv"));

    let stored = store
        .find_all(
            &[fields::TEXT, fields::SENTIMENT, fields::BATCH_TIMESTAMP],
            None,
        )
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    let batch = stored[0].batch_timestamp.clone().expect("batch stamp");
    assert_eq!(stored[1].batch_timestamp.as_deref(), Some(batch.as_str()));
    assert_eq!(batch.len(), "2024-01-01 00:00".len());
}

#[tokio::test]
async fn test_upload_malformed_csv_rejected() {
    let store = Arc::new(MemoryRecordStore::new());
    let app = setup_app_with(store.clone(), test_config());

    let csv = "Text,Sentiment\na,positive\nb,negative,extra";
    let response = app
        .oneshot(multipart_upload("file", "bad.csv", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let response = setup_app(Vec::new())
        .oneshot(multipart_upload("other", "tweets.csv", "Text\nhi"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("No file selected"));
}

#[tokio::test]
async fn test_upload_form_page() {
    let response = setup_app(Vec::new()).oneshot(get("/upload")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("enctype=\"multipart/form-data\""));
    assert!(html.contains("name=\"file\""));
}

#[tokio::test]
async fn test_download_csv() {
    let response = setup_app(scenario_records())
        .oneshot(get("/download_csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("sentiment_data.csv"));

    let csv = body_text(response.into_body()).await;
    assert_eq!(
        csv,
        "Text,Sentiment,Timestamp\ngood day,positive,2024-01-01\nbad day,negative,2024-01-01\nok,neutral,2024-01-02\n"
    );
}

#[tokio::test]
async fn test_download_csv_store_failure_is_json_error() {
    let app = setup_app_with(Arc::new(FailingStore), test_config());
    let response = app.oneshot(get("/download_csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["error"]["code"], "STORE_ERROR");
}

// =============================================================================
// End to end over SQLite
// =============================================================================

#[tokio::test]
async fn test_upload_then_dashboard_over_sqlite() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = SqliteRecordStore::open(&dir.path().join("twsa.db"), "tweets")
        .await
        .unwrap();
    let app = setup_app_with(Arc::new(store), test_config());

    let csv = "Text,Sentiment,Timestamp\nsunny beach day,positive,2024-05-01 10:00\nrainy commute,negative,2024-05-02\n";
    let response = app
        .clone()
        .oneshot(multipart_upload("file", "tweets.csv", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response.into_body()).await;
    assert_eq!(html.matches("data:image/png;base64,").count(), 3);

    let response = app.oneshot(get("/api/summary?keyword=SUNNY")).await.unwrap();
    let json = body_json(response.into_body()).await;
    assert_eq!(json["record_count"], 1);
    assert_eq!(json["time_series"]["rows"]["2024-05-01"]["positive"], 1);
}
