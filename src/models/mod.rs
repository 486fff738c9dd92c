// src/models/mod.rs

//! Domain models for the joke fetcher.

mod config;
mod joke;

// Re-export all public types
pub use config::{
    Config, FetchConfig, SourcesConfig, StorageConfig, SyncConfig, default_db_dir,
};
pub use joke::{ApiJoke, Joke, Language, LanguageStats, Mode};
