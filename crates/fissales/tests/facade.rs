use std::sync::Arc;

use fissales::cache::PromptCache;
use fissales::core::{validate_prompt_name, PromptRecord};
use fissales::prompts::{FakeBackend, PromptClient, PromptResponse, PromptServiceConfig};
use serde_json::json;

#[test]
fn core_is_always_reexported() {
    assert!(validate_prompt_name("greeting"));
    assert!(!validate_prompt_name("bad name!"));
}

#[tokio::test]
async fn client_and_cache_compose_through_facade() {
    let cache = Arc::new(PromptCache::new());
    cache.set("greeting", &PromptRecord::new("greeting", "Hi", 1)).await;

    let backend = Arc::new(FakeBackend::new());
    backend.push_response(PromptResponse::ok(json!({"success": true})));
    let client = PromptClient::new(PromptServiceConfig::default(), backend)
        .with_cache(cache.clone());

    let hit = client.fetch_prompt("greeting").await.unwrap().unwrap();
    assert!(hit.is_from_cache());

    client.delete_prompt("greeting").await.unwrap();
    assert!(cache.is_empty().await);
}
