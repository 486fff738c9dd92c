//! Storage abstractions for joke persistence.
//!
//! Two tables back the store:
//!
//! ```text
//! jokes      (id, joke, language, shown, created_at)
//! sync_meta  (key, value, updated_at)
//! ```
//!
//! The store is a passive holder: deciding when to insert, mark or reset
//! belongs to the freshness engine.

pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Joke, Language, LanguageStats};

// Re-export for convenience
pub use sqlite::SqliteStore;

/// Metadata key tracking the last bulk document ingestion.
pub const BULK_SYNC_KEY: &str = "bulk_jokes_last_sync";

/// Trait for joke storage backends.
#[async_trait]
pub trait JokeStore: Send + Sync {
    /// Create or upgrade the schema. Safe to run on an up-to-date store.
    async fn migrate(&self) -> Result<()>;

    /// Whether a joke with exactly this text exists for the language.
    async fn exists(&self, text: &str, language: Language) -> Result<bool>;

    /// Insert a joke and return its id.
    ///
    /// Uniqueness is not enforced here; callers check with [`exists`](Self::exists).
    async fn insert(&self, text: &str, language: Language, shown: bool) -> Result<i64>;

    /// Pick one not-yet-shown joke uniformly at random.
    async fn pick_unshown(&self, language: Language) -> Result<Option<Joke>>;

    /// Pick one joke uniformly at random regardless of its shown flag.
    async fn pick_random(&self, language: Language) -> Result<Option<Joke>>;

    /// Flag a single joke as shown.
    async fn mark_shown(&self, id: i64) -> Result<()>;

    /// Clear the shown flag on every joke of the language.
    ///
    /// Returns the number of rows touched.
    async fn reset_shown(&self, language: Language) -> Result<u64>;

    /// Read a sync metadata value.
    async fn get_sync_meta(&self, key: &str) -> Result<Option<String>>;

    /// Write a sync metadata value, replacing any previous one.
    async fn set_sync_meta(&self, key: &str, value: &str) -> Result<()>;

    /// Total and shown counts for the language.
    async fn stats(&self, language: Language) -> Result<LanguageStats>;
}
