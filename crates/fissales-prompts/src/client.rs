use std::sync::Arc;

use chrono::Utc;
use fissales_cache::PromptCache;
use fissales_core::{
    ensure_prompt_content, ensure_prompt_name, CacheStats, FisSalesError, LoadedFrom,
    PromptRecord, SaveReceipt,
};
use serde_json::{json, Value};

use crate::backend::{HttpBackend, HttpMethod, PromptBackend, PromptRequest, PromptResponse};
use crate::config::{PromptServiceConfig, SaveMethod};

// ---------------------------------------------------------------------------
// CacheStatsReport
// ---------------------------------------------------------------------------

/// Which cache a [`CacheStatsReport`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsSource {
    /// The Prompt Service's own cache.
    Remote,
    /// This process's [`PromptCache`], used when the service is unreachable.
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatsReport {
    pub source: StatsSource,
    pub stats: CacheStats,
}

// ---------------------------------------------------------------------------
// PromptClient
// ---------------------------------------------------------------------------

/// Read-through/write-through access to the Prompt Service.
///
/// Reads consult the owned [`PromptCache`] first and populate it on a remote
/// hit. Writes reach the service first and only then update the cache.
/// Absence is never cached, so a missing prompt is re-queried every time.
///
/// The sequence check-cache, await-remote, populate-cache is not atomic:
/// concurrent fetches of the same uncached name may all reach the service,
/// and the last response to arrive wins.
///
/// ```rust,no_run
/// use fissales_prompts::{PromptClient, PromptServiceConfig};
///
/// # async fn example() -> Result<(), fissales_prompts::FisSalesError> {
/// let client = PromptClient::from_config(PromptServiceConfig::from_env()?)?;
/// if let Some(prompt) = client.fetch_prompt("greeting").await? {
///     println!("v{}: {}", prompt.version, prompt.content);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PromptClient {
    config: PromptServiceConfig,
    backend: Arc<dyn PromptBackend>,
    cache: Arc<PromptCache>,
}

impl PromptClient {
    /// Create a client with a fresh, empty cache.
    pub fn new(config: PromptServiceConfig, backend: Arc<dyn PromptBackend>) -> Self {
        Self {
            config,
            backend,
            cache: Arc::new(PromptCache::new()),
        }
    }

    /// Create a client talking HTTP to `config.base_url`.
    pub fn from_config(config: PromptServiceConfig) -> Result<Self, FisSalesError> {
        let backend = HttpBackend::from_config(&config)?;
        Ok(Self::new(config, Arc::new(backend)))
    }

    /// Use `cache` instead of the client's own one.
    pub fn with_cache(mut self, cache: Arc<PromptCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &PromptServiceConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<PromptCache> {
        &self.cache
    }

    // -- URLs ---------------------------------------------------------------

    fn prompts_url(&self) -> String {
        format!("{}/api/prompts", self.config.base_url)
    }

    fn prompt_url(&self, name: &str) -> String {
        format!("{}/{}", self.prompts_url(), urlencoding::encode(name))
    }

    fn cache_stats_url(&self) -> String {
        format!("{}/cache/stats", self.prompts_url())
    }

    fn cache_clear_url(&self) -> String {
        format!("{}/cache/clear", self.prompts_url())
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: String,
        body: Option<Value>,
    ) -> Result<PromptResponse, FisSalesError> {
        tracing::debug!(%method, %url, "prompt service request");
        self.backend.send(PromptRequest { method, url, body }).await
    }

    // -- Operations ---------------------------------------------------------

    /// List the names of every prompt known to the service.
    pub async fn list_prompt_names(&self) -> Result<Vec<String>, FisSalesError> {
        self.list_remote()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "error getting prompt names"))
    }

    /// Fetch a prompt, serving it from the cache when possible.
    ///
    /// Returns `Ok(None)` when the service does not know the prompt. Failures
    /// other than not-found leave the cache untouched.
    pub async fn fetch_prompt(&self, name: &str) -> Result<Option<PromptRecord>, FisSalesError> {
        ensure_prompt_name(name)?;

        if let Some(cached) = self.cache.get(name).await {
            return Ok(Some(cached));
        }

        let fetched = self.fetch_remote(name).await?;
        if let Some(record) = &fetched {
            self.cache.set(name, record).await;
        }
        Ok(fetched)
    }

    /// Fetch a prompt straight from the service, bypassing the cache in both
    /// directions.
    pub async fn fetch_prompt_uncached(
        &self,
        name: &str,
    ) -> Result<Option<PromptRecord>, FisSalesError> {
        ensure_prompt_name(name)?;
        self.fetch_remote(name).await
    }

    /// Save `content` under `name`.
    ///
    /// Validation happens before anything is sent. On success the cache holds
    /// the new content at the version the service assigned. If the service
    /// accepts the write but its reply cannot be read, the cached entry is
    /// evicted so the next fetch goes to the service.
    pub async fn save_prompt(
        &self,
        name: &str,
        content: &str,
    ) -> Result<SaveReceipt, FisSalesError> {
        ensure_prompt_name(name)?;
        ensure_prompt_content(content)?;

        let receipt = self
            .save_remote(name, content)
            .await
            .inspect_err(|e| tracing::error!(prompt = %name, error = %e, "error saving prompt"))?;

        let record =
            PromptRecord::new(name, content, receipt.version).with_updated_at(Utc::now());
        self.cache.set(name, &record).await;
        tracing::info!(prompt = %name, version = receipt.version, "prompt saved");
        Ok(receipt)
    }

    /// Delete a prompt. A prompt the service does not know is an error.
    pub async fn delete_prompt(&self, name: &str) -> Result<(), FisSalesError> {
        ensure_prompt_name(name)?;

        self.delete_remote(name)
            .await
            .inspect_err(|e| tracing::error!(prompt = %name, error = %e, "error deleting prompt"))?;

        self.cache.delete(name).await;
        tracing::info!(prompt = %name, "prompt deleted");
        Ok(())
    }

    /// Stats of the service's cache, or of the local cache if the service
    /// cannot provide them.
    pub async fn cache_stats(&self) -> CacheStatsReport {
        match self.remote_cache_stats().await {
            Ok(stats) => CacheStatsReport {
                source: StatsSource::Remote,
                stats,
            },
            Err(e) => {
                tracing::warn!(error = %e, "remote cache stats unavailable, using local cache");
                CacheStatsReport {
                    source: StatsSource::Local,
                    stats: self.cache.stats().await,
                }
            }
        }
    }

    /// Stats of this process's cache only.
    pub async fn local_cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Clear the service's cache, then the local one.
    ///
    /// The local cache is only cleared once the service confirms.
    pub async fn clear_remote_and_local_cache(&self) -> Result<(), FisSalesError> {
        self.clear_remote()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "error clearing prompt cache"))?;

        self.cache.clear().await;
        tracing::info!("prompt caches cleared");
        Ok(())
    }

    // -- Remote calls -------------------------------------------------------

    async fn list_remote(&self) -> Result<Vec<String>, FisSalesError> {
        let response = self.send(HttpMethod::Get, self.prompts_url(), None).await?;
        let body = ensure_success(&response)?;
        match body.get("data") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(data) => serde_json::from_value(data.clone())
                .map_err(|e| FisSalesError::Parsing(format!("unexpected prompt list shape: {e}"))),
        }
    }

    async fn fetch_remote(&self, name: &str) -> Result<Option<PromptRecord>, FisSalesError> {
        let response = self
            .send(HttpMethod::Get, self.prompt_url(name), None)
            .await
            .inspect_err(|e| tracing::error!(prompt = %name, error = %e, "error getting prompt"))?;
        if response.status == 404 {
            tracing::debug!(prompt = %name, "prompt not found");
            return Ok(None);
        }
        ensure_success(&response)
            .and_then(|body| decode_record(name, body))
            .inspect_err(|e| tracing::error!(prompt = %name, error = %e, "error getting prompt"))
    }

    async fn save_remote(&self, name: &str, content: &str) -> Result<SaveReceipt, FisSalesError> {
        let method = match self.config.save_method {
            SaveMethod::Post => HttpMethod::Post,
            SaveMethod::Put => HttpMethod::Put,
        };
        let response = self
            .send(method, self.prompt_url(name), Some(json!({ "content": content })))
            .await?;
        let body = ensure_success(&response)?;
        match decode_receipt(name, body) {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                // The service accepted the write, so any cached copy is stale.
                self.cache.delete(name).await;
                Err(e)
            }
        }
    }

    async fn delete_remote(&self, name: &str) -> Result<(), FisSalesError> {
        let response = self
            .send(HttpMethod::Delete, self.prompt_url(name), None)
            .await?;
        if response.status == 404 {
            return Err(FisSalesError::NotFound(format!("Prompt '{name}' not found")));
        }
        ensure_success(&response)?;
        Ok(())
    }

    async fn remote_cache_stats(&self) -> Result<CacheStats, FisSalesError> {
        let response = self.send(HttpMethod::Get, self.cache_stats_url(), None).await?;
        let body = ensure_success(&response)?;
        let data = body.get("data").cloned().unwrap_or(Value::Null);
        serde_json::from_value(data)
            .map_err(|e| FisSalesError::Parsing(format!("unexpected cache stats shape: {e}")))
    }

    async fn clear_remote(&self) -> Result<(), FisSalesError> {
        let response = self
            .send(HttpMethod::Post, self.cache_clear_url(), None)
            .await?;
        ensure_success(&response)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Best operator-facing message for a failed response: the body's `message`,
/// then its `error`, then the status line.
fn error_message(response: &PromptResponse) -> String {
    let body = &response.body;
    let from_body = body
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .or_else(|| body.pointer("/error/message").and_then(Value::as_str));

    match from_body {
        Some(msg) if !msg.is_empty() => msg.to_string(),
        _ if response.status_text.is_empty() => format!("HTTP {}", response.status),
        _ => format!("HTTP {}: {}", response.status, response.status_text),
    }
}

/// Reject non-2xx responses and 2xx responses whose body says
/// `"success": false`.
fn ensure_success(response: &PromptResponse) -> Result<&Value, FisSalesError> {
    let declined = response.body.get("success").and_then(Value::as_bool) == Some(false);
    if !response.is_success() || declined {
        return Err(FisSalesError::Api {
            status: response.status,
            message: error_message(response),
        });
    }
    Ok(&response.body)
}

/// Pull the prompt out of a get-one body. The record sits under `data`, or
/// under `prompt` for older service builds.
fn decode_record(name: &str, body: &Value) -> Result<Option<PromptRecord>, FisSalesError> {
    let raw = match body.get("data").or_else(|| body.get("prompt")) {
        None | Some(Value::Null) => return Ok(None),
        Some(raw) => raw.clone(),
    };

    let record: PromptRecord = serde_json::from_value(raw)
        .map_err(|e| FisSalesError::Parsing(format!("unexpected prompt shape for '{name}': {e}")))?;

    if record.name != name {
        return Err(FisSalesError::Parsing(format!(
            "requested prompt '{name}' but the service returned '{}'",
            record.name
        )));
    }
    Ok(Some(record.loaded_from(LoadedFrom::Api)))
}

/// Pull the save receipt out of a save body, accepting either a `data`
/// envelope or a bare receipt.
fn decode_receipt(name: &str, body: &Value) -> Result<SaveReceipt, FisSalesError> {
    let raw = body.get("data").unwrap_or(body).clone();
    let mut receipt: SaveReceipt = serde_json::from_value(raw)
        .map_err(|e| FisSalesError::Parsing(format!("unexpected save response: {e}")))?;
    if receipt.name.is_empty() {
        receipt.name = name.to_string();
    }
    Ok(receipt)
}
