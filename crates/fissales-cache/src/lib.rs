mod prompt_cache;

pub use prompt_cache::PromptCache;

// Re-export the record and stats types so cache users need only this crate.
pub use fissales_core::{CacheStats, LoadedFrom, PromptRecord};
