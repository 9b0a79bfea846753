use std::sync::Arc;

use fissales::core::FisSalesError;
use fissales::prompts::{
    configured_base_url, FakeBackend, PromptBackend, PromptClient, PromptResponse,
    PromptServiceConfig,
};
use serde_json::json;

/// Backend that plays back a fixed conversation with the Prompt Service.
fn scripted_backend() -> Arc<FakeBackend> {
    let backend = Arc::new(FakeBackend::new());
    backend
        .push_response(PromptResponse::ok(json!({
            "success": true,
            "data": ["greeting", "product_summary"]
        })))
        .push_response(PromptResponse::ok(json!({
            "success": true,
            "data": {
                "name": "greeting",
                "content": "You are the FisSales shop assistant. Greet the customer.",
                "version": 3,
                "createdAt": "2024-04-02T09:00:00Z",
                "updatedAt": "2024-05-11T16:20:00Z"
            }
        })))
        .push_response(PromptResponse::ok(json!({
            "success": true,
            "data": {"name": "greeting", "message": "Prompt saved successfully", "version": 4}
        })))
        .push_response(PromptResponse::new(404, json!({"success": false})))
        .push_response(PromptResponse::new(503, json!({"error": "stats unavailable"})))
        .push_response(PromptResponse::ok(json!({"success": true})));
    backend
}

#[tokio::main]
async fn main() -> Result<(), FisSalesError> {
    tracing_subscriber::fmt::init();
    tracing::info!("prompt admin demo starting");

    // Talk to a real service when one is configured, otherwise play a script.
    let live = configured_base_url(|key| std::env::var(key).ok()).is_some();
    let config = PromptServiceConfig::from_env()?;
    let client = if live {
        println!("Using Prompt Service at {}", config.base_url);
        PromptClient::from_config(config)?
    } else {
        println!(
            "Neither FISSALES_API_BASE nor NEXT_PUBLIC_API_BASE is set, \
             using a scripted Prompt Service"
        );
        let backend: Arc<dyn PromptBackend> = scripted_backend();
        PromptClient::new(config, backend)
    };

    println!("\n=== Prompts ===");
    let names = client.list_prompt_names().await?;
    for name in &names {
        println!("- {name}");
    }

    println!("\n=== Fetch (cache miss, then hit) ===");
    for _ in 0..2 {
        match client.fetch_prompt("greeting").await? {
            Some(p) => println!(
                "greeting v{} from {}: {}",
                p.version,
                p.loaded_from.as_str(),
                p.content
            ),
            None => println!("greeting not found"),
        }
    }

    println!("\n=== Save ===");
    let receipt = client
        .save_prompt(
            "greeting",
            "You are the FisSales shop assistant. Greet the customer by name.",
        )
        .await?;
    println!("{} (version {})", receipt.message, receipt.version);

    println!("\n=== Validation ===");
    match client.save_prompt("bad name!", "x").await {
        Err(e) => println!("rejected locally: {e}"),
        Ok(_) => println!("unexpectedly accepted"),
    }

    println!("\n=== Delete missing prompt ===");
    if let Err(e) = client.delete_prompt("retired_prompt").await {
        println!("{e}");
    }

    println!("\n=== Cache Stats ===");
    let report = client.cache_stats().await;
    println!(
        "source={:?} size={} keys={:?} hit_rate={}",
        report.source,
        report.stats.size,
        report.stats.keys,
        report
            .stats
            .hit_rate
            .map(|r| format!("{:.0}%", r * 100.0))
            .unwrap_or_else(|| "n/a".to_string())
    );

    println!("\n=== Clear Caches ===");
    client.clear_remote_and_local_cache().await?;
    println!("local size after clear: {}", client.cache().len().await);

    println!("\nPrompt admin demo completed successfully!");
    Ok(())
}
