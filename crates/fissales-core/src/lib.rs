use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest prompt body the Prompt Service accepts, in characters.
pub const MAX_CONTENT_CHARS: usize = 50_000;

/// Longest prompt name the Prompt Service accepts.
pub const MAX_NAME_LEN: usize = 100;

// ---------------------------------------------------------------------------
// LoadedFrom
// ---------------------------------------------------------------------------

/// Where a [`PromptRecord`] instance came from.
///
/// This is stamped by the consumer, never by the Prompt Service, so it is
/// absent on the wire and decodes as [`LoadedFrom::Api`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadedFrom {
    Cache,
    #[default]
    Api,
}

impl LoadedFrom {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadedFrom::Cache => "cache",
            LoadedFrom::Api => "api",
        }
    }
}

// ---------------------------------------------------------------------------
// PromptRecord
// ---------------------------------------------------------------------------

/// A named, versioned block of prompt text managed by the Prompt Service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRecord {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub loaded_from: LoadedFrom,
}

impl PromptRecord {
    /// Create a record with no timestamps, tagged as loaded from the API.
    pub fn new(name: impl Into<String>, content: impl Into<String>, version: u64) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            version,
            created_at: None,
            updated_at: None,
            loaded_from: LoadedFrom::Api,
        }
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    /// Return a copy carrying the given provenance tag.
    pub fn loaded_from(mut self, source: LoadedFrom) -> Self {
        self.loaded_from = source;
        self
    }

    /// True when this instance was served by the in-process cache.
    pub fn is_from_cache(&self) -> bool {
        self.loaded_from == LoadedFrom::Cache
    }
}

// ---------------------------------------------------------------------------
// SaveReceipt
// ---------------------------------------------------------------------------

/// What the Prompt Service returns after a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    pub version: u64,
}

// ---------------------------------------------------------------------------
// CacheStats
// ---------------------------------------------------------------------------

/// Point-in-time snapshot of a prompt cache.
///
/// `hit_rate` is `None` until at least one lookup has happened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub last_accessed: BTreeMap<String, DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_rate: Option<f64>,
    #[serde(default)]
    pub hits: u64,
    #[serde(default)]
    pub misses: u64,
}

impl CacheStats {
    /// Hit rate for the given counters, `None` when there were no lookups.
    pub fn compute_hit_rate(hits: u64, misses: u64) -> Option<f64> {
        let total = hits + misses;
        if total == 0 {
            None
        } else {
            Some(hits as f64 / total as f64)
        }
    }

    /// Total number of lookups recorded in this snapshot.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{1,100}$").expect("static pattern"))
}

/// Whether `name` is an acceptable prompt name: 1 to 100 ASCII letters,
/// digits, hyphens or underscores.
pub fn validate_prompt_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

/// Like [`validate_prompt_name`] but produces the error callers surface.
pub fn ensure_prompt_name(name: &str) -> Result<(), FisSalesError> {
    if validate_prompt_name(name) {
        Ok(())
    } else {
        Err(FisSalesError::Validation(format!(
            "Invalid prompt name '{name}': use 1-{MAX_NAME_LEN} letters, digits, '-' or '_'"
        )))
    }
}

/// Reject empty content and content longer than [`MAX_CONTENT_CHARS`].
pub fn ensure_prompt_content(content: &str) -> Result<(), FisSalesError> {
    if content.is_empty() {
        return Err(FisSalesError::Validation(
            "Content must be a non-empty string".to_string(),
        ));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(FisSalesError::Validation(
            "Content must be less than 50,000 characters".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for every fallible prompt operation. The cache itself never
/// produces one.
#[derive(Debug, Error)]
pub enum FisSalesError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("prompt service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("config error: {0}")]
    Config(String),
}

impl FisSalesError {
    /// The message an operator should see, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            FisSalesError::Validation(m)
            | FisSalesError::NotFound(m)
            | FisSalesError::Transport(m)
            | FisSalesError::Parsing(m)
            | FisSalesError::Config(m) => m,
            FisSalesError::Api { message, .. } => message,
        }
    }

    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            FisSalesError::Api { status, .. } => Some(*status),
            FisSalesError::NotFound(_) => Some(404),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FisSalesError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FisSalesError::NotFound(_))
    }
}
