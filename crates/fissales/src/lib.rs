//! FisSales — prompt tooling for the FisSales admin backoffice.
//!
//! This crate re-exports the FisSales sub-crates for single-import usage.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `default` | `cache`, `prompts` |
//! | `cache` | `PromptCache` |
//! | `prompts` | `PromptClient`, `PromptServiceConfig`, `HttpBackend`, `FakeBackend` |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fissales::core::{FisSalesError, PromptRecord};
//! use fissales::prompts::{PromptClient, PromptServiceConfig};
//! ```

/// Records, stats, validation and `FisSalesError`. Always available.
pub use fissales_core as core;

/// In-process prompt cache with hit/miss telemetry.
#[cfg(feature = "cache")]
pub use fissales_cache as cache;

/// Prompt Service client with read-through/write-through caching.
#[cfg(feature = "prompts")]
pub use fissales_prompts as prompts;
