use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use fissales_core::FisSalesError;

/// Base URL used when no environment value is set.
pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// Primary environment variable holding the Prompt Service base URL.
pub const API_BASE_ENV: &str = "FISSALES_API_BASE";
/// Fallback variable shared with the admin front-end.
pub const LEGACY_API_BASE_ENV: &str = "NEXT_PUBLIC_API_BASE";
/// `POST` or `PUT`.
pub const SAVE_METHOD_ENV: &str = "FISSALES_PROMPT_SAVE_METHOD";
/// Whole seconds.
pub const TIMEOUT_ENV: &str = "FISSALES_HTTP_TIMEOUT_SECS";

// ---------------------------------------------------------------------------
// SaveMethod
// ---------------------------------------------------------------------------

/// HTTP method used to write a prompt.
///
/// Deployments of the Prompt Service disagree on this, so it is configurable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveMethod {
    #[default]
    Post,
    Put,
}

impl fmt::Display for SaveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveMethod::Post => f.write_str("POST"),
            SaveMethod::Put => f.write_str("PUT"),
        }
    }
}

impl FromStr for SaveMethod {
    type Err = FisSalesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POST" => Ok(SaveMethod::Post),
            "PUT" => Ok(SaveMethod::Put),
            other => Err(FisSalesError::Config(format!(
                "unsupported prompt save method '{other}', expected POST or PUT"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// PromptServiceConfig
// ---------------------------------------------------------------------------

/// Where and how to reach the Prompt Service.
#[derive(Debug, Clone)]
pub struct PromptServiceConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Method used by `save_prompt`.
    pub save_method: SaveMethod,
    /// Per-request timeout applied by the HTTP backend. `None` leaves it to
    /// the transport default.
    pub timeout: Option<Duration>,
}

impl PromptServiceConfig {
    /// Create a config for the given base URL with POST saves and no timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            save_method: SaveMethod::default(),
            timeout: None,
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(url.into());
        self
    }

    pub fn with_save_method(mut self, method: SaveMethod) -> Self {
        self.save_method = method;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a config from the process environment.
    ///
    /// See [`from_lookup`](Self::from_lookup) for the variables read.
    pub fn from_env() -> Result<Self, FisSalesError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    ///
    /// Reads [`API_BASE_ENV`] (then [`LEGACY_API_BASE_ENV`], then
    /// [`DEFAULT_API_BASE`]), [`SAVE_METHOD_ENV`] and [`TIMEOUT_ENV`]. Blank
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FisSalesError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url =
            configured_base_url(&lookup).unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let mut config = Self::new(base_url);

        if let Some(method) = get(SAVE_METHOD_ENV) {
            config.save_method = method.parse()?;
        }

        if let Some(secs) = get(TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|e| {
                FisSalesError::Config(format!("invalid {TIMEOUT_ENV} '{secs}': {e}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

impl Default for PromptServiceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

/// Base URL named by [`API_BASE_ENV`] or, failing that,
/// [`LEGACY_API_BASE_ENV`]. `None` when neither holds a non-blank value.
pub fn configured_base_url<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    [API_BASE_ENV, LEGACY_API_BASE_ENV]
        .into_iter()
        .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
