use std::sync::Arc;

use fissales_prompts::{
    FakeBackend, FisSalesError, HttpMethod, LoadedFrom, PromptClient, PromptResponse,
    PromptServiceConfig,
};
use serde_json::json;

fn setup(backend: Arc<FakeBackend>) -> PromptClient {
    PromptClient::new(PromptServiceConfig::new("http://prompts.test/"), backend)
}

fn prompt_body(name: &str, content: &str, version: u64) -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "name": name,
            "content": content,
            "version": version,
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-03T08:15:00Z"
        }
    })
}

#[tokio::test]
async fn miss_fetches_remote_then_hits_cache() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(PromptResponse::ok(prompt_body("greeting", "Hi", 1)));
    let client = setup(backend.clone());

    let first = client.fetch_prompt("greeting").await.unwrap().unwrap();
    assert_eq!(first.content, "Hi");
    assert_eq!(first.loaded_from, LoadedFrom::Api);
    assert!(first.created_at.is_some());

    let second = client.fetch_prompt("greeting").await.unwrap().unwrap();
    assert_eq!(second.content, "Hi");
    assert_eq!(second.version, 1);
    assert_eq!(second.loaded_from, LoadedFrom::Cache);
    assert_eq!(second.created_at, first.created_at);

    // Only the first call reached the service.
    let requests = backend.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(requests[0].url, "http://prompts.test/api/prompts/greeting");
    assert!(requests[0].body.is_none());

    let stats = client.local_cache_stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hit_rate, Some(0.5));
}

#[tokio::test]
async fn not_found_is_absent_and_not_cached() {
    let backend = Arc::new(FakeBackend::new());
    backend
        .push_response(PromptResponse::new(404, json!({"message": "Prompt not found"})))
        .push_response(PromptResponse::new(404, json!({"message": "Prompt not found"})));
    let client = setup(backend.clone());

    assert!(client.fetch_prompt("ghost").await.unwrap().is_none());
    assert!(client.fetch_prompt("ghost").await.unwrap().is_none());

    // Absence is re-queried every time.
    assert_eq!(backend.request_count().await, 2);
    assert!(client.cache().is_empty().await);
}

#[tokio::test]
async fn success_without_record_is_absent() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(PromptResponse::ok(json!({"success": true})));
    let client = setup(backend);

    assert!(client.fetch_prompt("empty").await.unwrap().is_none());
    assert!(client.cache().is_empty().await);
}

#[tokio::test]
async fn server_error_propagates_without_touching_cache() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(PromptResponse::new(500, json!(null)));
    let client = setup(backend);

    let err = client.fetch_prompt("greeting").await.unwrap_err();
    match err {
        FisSalesError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "HTTP 500: Internal Server Error");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert!(client.cache().is_empty().await);
}

#[tokio::test]
async fn transport_error_propagates() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_error(FisSalesError::Transport("connection refused".to_string()));
    let client = setup(backend);

    let err = client.fetch_prompt("greeting").await.unwrap_err();
    assert!(matches!(err, FisSalesError::Transport(_)));
    assert!(client.cache().is_empty().await);
}

#[tokio::test]
async fn invalid_name_never_reaches_service() {
    let backend = Arc::new(FakeBackend::new());
    let client = setup(backend.clone());

    let err = client.fetch_prompt("bad name!").await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(backend.request_count().await, 0);
    // Not a cache lookup either.
    assert!(client.local_cache_stats().await.hit_rate.is_none());
}

#[tokio::test]
async fn legacy_prompt_envelope_is_accepted() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(PromptResponse::ok(json!({
        "prompt": {"name": "legacy", "content": "old shape", "version": 9}
    })));
    let client = setup(backend);

    let record = client.fetch_prompt("legacy").await.unwrap().unwrap();
    assert_eq!(record.content, "old shape");
    assert_eq!(record.version, 9);
}

#[tokio::test]
async fn uncached_fetch_bypasses_cache() {
    let backend = Arc::new(FakeBackend::new());
    backend
        .push_response(PromptResponse::ok(prompt_body("p", "one", 1)))
        .push_response(PromptResponse::ok(prompt_body("p", "two", 2)));
    let client = setup(backend.clone());

    let first = client.fetch_prompt_uncached("p").await.unwrap().unwrap();
    let second = client.fetch_prompt_uncached("p").await.unwrap().unwrap();

    assert_eq!(first.version, 1);
    assert_eq!(second.version, 2);
    assert_eq!(backend.request_count().await, 2);
    assert!(client.cache().is_empty().await);
    assert!(client.local_cache_stats().await.hit_rate.is_none());
}

#[tokio::test]
async fn list_names_reads_data_array() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(PromptResponse::ok(json!({
        "success": true,
        "data": ["greeting", "product_summary"]
    })));
    let client = setup(backend.clone());

    let names = client.list_prompt_names().await.unwrap();
    assert_eq!(names, vec!["greeting", "product_summary"]);
    assert_eq!(
        backend.requests().await[0].url,
        "http://prompts.test/api/prompts"
    );
}

#[tokio::test]
async fn list_names_missing_data_is_empty() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(PromptResponse::ok(json!({"success": true})));
    let client = setup(backend);

    assert!(client.list_prompt_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_names_error_uses_body_message() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(PromptResponse::new(
        503,
        json!({"success": false, "error": "backend warming up"}),
    ));
    let client = setup(backend);

    let err = client.list_prompt_names().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.message(), "backend warming up");
}

#[tokio::test]
async fn shared_cache_is_visible_across_clients() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(PromptResponse::ok(prompt_body("shared", "s", 1)));
    let first = setup(backend.clone());
    let second = setup(backend.clone()).with_cache(first.cache().clone());

    first.fetch_prompt("shared").await.unwrap();
    let hit = second.fetch_prompt("shared").await.unwrap().unwrap();

    assert!(hit.is_from_cache());
    assert_eq!(backend.request_count().await, 1);
}
