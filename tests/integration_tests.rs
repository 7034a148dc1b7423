//! Integration tests using a mock HTTP server
//!
//! Exercises the full flow: config and catalog in, OAuth2 grant, paged API
//! requests, Singer messages and state out.

use serde_json::json;
use std::time::Duration;
use tap_helpscout::auth::Authenticator;
use tap_helpscout::catalog::{resolve, Catalog, Selection};
use tap_helpscout::config::TapConfig;
use tap_helpscout::discover::discover;
use tap_helpscout::http::{HelpScoutClient, HttpClientConfig};
use tap_helpscout::output::RecordingEmitter;
use tap_helpscout::state::StateStore;
use tap_helpscout::sync::{sync, SyncContext};
use tap_helpscout::types::BackoffType;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config_json(refresh_token: &str) -> serde_json::Value {
    json!({
        "client_id": "client-id",
        "client_secret": "client-secret",
        "refresh_token": refresh_token,
        "user_agent": "tap-helpscout integration",
        "start_date": "2021-06-01T00:00:00Z"
    })
}

fn test_context(base_url: &str) -> SyncContext<RecordingEmitter> {
    let config =
        TapConfig::from_json(&test_config_json("rt-1").to_string()).unwrap();
    let http = HttpClientConfig::builder()
        .base_url(base_url)
        .no_rate_limit()
        .backoff(
            BackoffType::Exponential,
            Duration::from_millis(10),
            Duration::from_millis(50),
        )
        .build();
    SyncContext::new(
        config,
        HelpScoutClient::with_config(http),
        StateStore::in_memory(),
        RecordingEmitter::new(),
    )
}

/// Selection built the way an operator would: discover, then mark streams.
fn select_streams(stream_ids: &[&str]) -> Selection {
    let mut catalog = discover().unwrap();
    for entry in &mut catalog.streams {
        if stream_ids.contains(&entry.tap_stream_id.as_str()) {
            entry
                .metadata
                .iter_mut()
                .find(|m| m.breadcrumb.is_empty())
                .unwrap()
                .metadata
                .insert("selected".to_string(), json!(true));
        }
    }
    resolve(&catalog).unwrap()
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_paged_sync_emits_singer_messages_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customers"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"customers": [
                {"id": 1, "firstName": "Ada", "updatedAt": "2021-06-02T00:00:00Z"},
                {"id": 2, "firstName": "Grace", "updatedAt": "2021-06-03T00:00:00Z"}
            ]},
            "page": {"number": 1, "totalPages": 2}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/customers"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"customers": [
                {"id": 3, "firstName": "Edsger", "updatedAt": "2021-06-04T00:00:00Z"}
            ]},
            "page": {"number": 2, "totalPages": 2}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut ctx = test_context(&mock_server.uri());
    let summary = sync(&mut ctx, &select_streams(&["customers"]))
        .await
        .unwrap();

    assert_eq!(summary.streams_synced, 1);
    assert_eq!(summary.records_emitted, 3);

    // One SCHEMA, three RECORDs in page order, bookmark on the way out.
    assert_eq!(ctx.emitter.schema_count("customers"), 1);
    let records = ctx.emitter.records_for("customers");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["id"], json!(1));
    assert_eq!(records[0]["first_name"], json!("Ada"));
    assert_eq!(records[2]["id"], json!(3));
    assert_eq!(
        ctx.state.state().get_bookmark("customers"),
        Some("2021-06-04T00:00:00Z")
    );
}

#[tokio::test]
async fn test_conversations_derive_cursor_and_dispatch_threads() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/conversations"))
        .and(query_param("status", "all"))
        .and(query_param("modifiedSince", "2021-06-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"conversations": [
                {
                    "id": 101,
                    "subject": "Can't log in",
                    "userUpdatedAt": "2021-06-05T10:00:00Z",
                    "customerWaitingSince": {"time": "2021-06-06T10:00:00Z"}
                },
                {
                    "id": 102,
                    "subject": "Feature request",
                    "userUpdatedAt": "2021-06-07T10:00:00Z"
                }
            ]},
            "page": {"number": 1, "totalPages": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/conversations/101/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"threads": [
                {"id": 9001, "type": "customer", "body": "hello"}
            ]},
            "page": {"number": 1, "totalPages": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/conversations/102/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"threads": [
                {"id": 9002, "type": "note", "body": "internal"}
            ]},
            "page": {"number": 1, "totalPages": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut ctx = test_context(&mock_server.uri());
    let summary = sync(
        &mut ctx,
        &select_streams(&["conversations", "conversation_threads"]),
    )
    .await
    .unwrap();

    // The cursor is derived from user_updated_at and the customer waiting
    // timestamp, whichever is later.
    let conversations = ctx.emitter.records_for("conversations");
    assert_eq!(conversations[0]["updated_at"], json!("2021-06-06T10:00:00Z"));
    assert_eq!(conversations[1]["updated_at"], json!("2021-06-07T10:00:00Z"));
    assert_eq!(
        ctx.state.state().get_bookmark("conversations"),
        Some("2021-06-07T10:00:00Z")
    );

    // Threads inherit the conversation id they were fetched under.
    let threads = ctx.emitter.records_for("conversation_threads");
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0]["conversation_id"], json!(101));
    assert_eq!(threads[1]["conversation_id"], json!(102));
    assert!(ctx
        .state
        .state()
        .get_bookmark("conversation_threads")
        .is_none());

    assert_eq!(summary.streams_synced, 2);
}

#[tokio::test]
async fn test_deselected_field_is_dropped_from_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"customers": [
                {
                    "id": 1,
                    "firstName": "Ada",
                    "background": "mathematician",
                    "updatedAt": "2021-06-02T00:00:00Z"
                }
            ]},
            "page": {"number": 1, "totalPages": 1}
        })))
        .mount(&mock_server)
        .await;

    let mut catalog = discover().unwrap();
    for entry in &mut catalog.streams {
        if entry.tap_stream_id == "customers" {
            for metadata in &mut entry.metadata {
                if metadata.breadcrumb.is_empty() {
                    metadata.metadata.insert("selected".to_string(), json!(true));
                }
                if metadata.breadcrumb == ["properties", "background"] {
                    metadata
                        .metadata
                        .insert("selected".to_string(), json!(false));
                }
            }
        }
    }
    let selection = resolve(&catalog).unwrap();

    let mut ctx = test_context(&mock_server.uri());
    sync(&mut ctx, &selection).await.unwrap();

    let records = ctx.emitter.records_for("customers");
    assert_eq!(records.len(), 1);
    assert!(records[0].get("background").is_none());
    // Key and cursor fields cannot be deselected.
    assert_eq!(records[0]["id"], json!(1));
    assert_eq!(records[0]["updated_at"], json!("2021-06-02T00:00:00Z"));
    assert_eq!(records[0]["first_name"], json!("Ada"));
}

fn ratings_page(ids: std::ops::Range<u64>, page: u64, pages: u64) -> serde_json::Value {
    let results: Vec<serde_json::Value> = ids
        .map(|id| {
            json!({
                "id": id,
                "threadid": id * 10,
                "ratingCustomerId": 7,
                "ratingCreatedAt": "2021-06-10T00:00:00Z"
            })
        })
        .collect();
    json!({"results": results, "page": page, "pages": pages, "count": 60})
}

#[tokio::test]
async fn test_full_table_report_spans_pages_without_bookmark() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reports/happiness/ratings"))
        .and(query_param("page", "1"))
        .and(query_param("start", "2021-06-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ratings_page(1..51, 1, 2)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reports/happiness/ratings"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ratings_page(51..61, 2, 2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut ctx = test_context(&mock_server.uri());
    let summary = sync(&mut ctx, &select_streams(&["happiness_ratings_report"]))
        .await
        .unwrap();

    // Every row from both pages comes through; full-table keeps no bookmark.
    assert_eq!(summary.records_emitted, 60);
    assert_eq!(ctx.emitter.schema_count("happiness_ratings_report"), 1);
    let records = ctx.emitter.records_for("happiness_ratings_report");
    assert_eq!(records.len(), 60);
    assert_eq!(records[0]["conversation_id"], json!(1));
    assert_eq!(records[59]["conversation_id"], json!(60));
    assert!(ctx
        .state
        .state()
        .get_bookmark("happiness_ratings_report")
        .is_none());
}

// ============================================================================
// OAuth2 Flow Tests
// ============================================================================

#[tokio::test]
async fn test_sync_refreshes_token_and_rotates_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=rt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-1",
            "refresh_token": "rt-2",
            "token_type": "bearer",
            "expires_in": 172_800
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("Authorization", "Bearer at-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"users": [
                {"id": 4, "firstName": "Joan", "updatedAt": "2021-06-05T00:00:00Z"}
            ]},
            "page": {"number": 1, "totalPages": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, test_config_json("rt-1").to_string()).unwrap();

    let config = TapConfig::from_file(&config_path).unwrap();
    let authenticator = Authenticator::new(&config, &config_path)
        .with_token_url(format!("{}/oauth2/token", mock_server.uri()));
    let http = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .no_rate_limit()
        .build();
    let client = HelpScoutClient::with_auth(http, authenticator);

    let mut ctx = SyncContext::new(
        config,
        client,
        StateStore::in_memory(),
        RecordingEmitter::new(),
    );
    sync(&mut ctx, &select_streams(&["users"])).await.unwrap();

    assert_eq!(ctx.emitter.records_for("users").len(), 1);

    // The grant burned rt-1; the config file must now carry rt-2.
    let rewritten: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config_path).unwrap()).unwrap();
    assert_eq!(rewritten["refresh_token"], json!("rt-2"));
    assert_eq!(rewritten["client_id"], json!("client-id"));
}

// ============================================================================
// Resilience Tests
// ============================================================================

#[tokio::test]
async fn test_sync_survives_transient_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"users": [
                {"id": 4, "firstName": "Joan", "updatedAt": "2021-06-05T00:00:00Z"}
            ]},
            "page": {"number": 1, "totalPages": 1}
        })))
        .mount(&mock_server)
        .await;

    let mut ctx = test_context(&mock_server.uri());
    let summary = sync(&mut ctx, &select_streams(&["users"])).await.unwrap();

    assert_eq!(summary.records_emitted, 1);
}

#[tokio::test]
async fn test_workflows_page_zero_ends_the_stream_cleanly() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"workflows": []},
            "page": {"number": 0, "totalPages": 0}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut ctx = test_context(&mock_server.uri());
    let summary = sync(&mut ctx, &select_streams(&["workflows"]))
        .await
        .unwrap();

    assert_eq!(summary.streams_synced, 1);
    assert_eq!(summary.records_emitted, 0);
}

// ============================================================================
// State Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_state_file_round_trip_with_resume() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {"users": [
                {"id": 4, "firstName": "Joan", "updatedAt": "2021-06-09T00:00:00Z"}
            ]},
            "page": {"number": 1, "totalPages": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    std::fs::write(
        &state_path,
        json!({
            "currently_syncing": "users",
            "bookmarks": {"customers": "2021-06-15T00:00:00Z"}
        })
        .to_string(),
    )
    .unwrap();

    let mut ctx = test_context(&mock_server.uri());
    ctx.state = StateStore::from_file(&state_path).unwrap();

    sync(&mut ctx, &select_streams(&["customers", "users"]))
        .await
        .unwrap();

    // The interrupted run's marker meant customers was already done; its
    // bookmark survives untouched and the file now reflects completion.
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state_path).unwrap()).unwrap();
    assert!(saved.get("currently_syncing").is_none());
    assert_eq!(
        saved["bookmarks"]["customers"],
        json!("2021-06-15T00:00:00Z")
    );
    assert_eq!(saved["bookmarks"]["users"], json!("2021-06-09T00:00:00Z"));
}
