//! Client for the FisSales Prompt Service.
//!
//! [`PromptClient`] composes an in-process [`PromptCache`] with the remote
//! service: fetches are read-through, saves are write-through, and deletes and
//! remote cache clears invalidate local entries. Transport goes through the
//! [`PromptBackend`] trait; [`HttpBackend`] is the reqwest implementation and
//! [`FakeBackend`] serves scripted responses in tests.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | [`list_prompt_names`](PromptClient::list_prompt_names) | `GET /api/prompts` |
//! | [`fetch_prompt`](PromptClient::fetch_prompt) | `GET /api/prompts/{name}` |
//! | [`save_prompt`](PromptClient::save_prompt) | `POST` or `PUT /api/prompts/{name}` |
//! | [`delete_prompt`](PromptClient::delete_prompt) | `DELETE /api/prompts/{name}` |
//! | [`cache_stats`](PromptClient::cache_stats) | `GET /api/prompts/cache/stats` |
//! | [`clear_remote_and_local_cache`](PromptClient::clear_remote_and_local_cache) | `POST /api/prompts/cache/clear` |

pub mod backend;
mod client;
pub mod config;

pub use backend::{
    FakeBackend, HttpBackend, HttpMethod, PromptBackend, PromptRequest, PromptResponse,
};
pub use client::{CacheStatsReport, PromptClient, StatsSource};
pub use config::{configured_base_url, PromptServiceConfig, SaveMethod};

pub use fissales_cache::PromptCache;
pub use fissales_core::{
    validate_prompt_name, CacheStats, FisSalesError, LoadedFrom, PromptRecord, SaveReceipt,
};
