// src/services/fresh.rs

//! Freshness engine.
//!
//! Produces one joke the user has not seen yet:
//!
//! - **Live** languages ask the API, skip anything already stored, and give
//!   up after [`MAX_ATTEMPTS`] repeats.
//! - **Rotation** languages walk the stored curated set in random order,
//!   resetting the shown flags once every joke was surfaced.

use chrono::Utc;
use rand::seq::SliceRandom;

use crate::error::{AppError, Result};
use crate::models::{Language, Mode, SourcesConfig, SyncConfig};
use crate::services::extract::extract_jokes;
use crate::services::sync::{SyncOutcome, SyncScheduler};
use crate::services::{JokeSource, SourceResponse};
use crate::storage::JokeStore;

/// Live fetches tried before giving up on finding an unseen joke.
pub const MAX_ATTEMPTS: usize = 5;

/// Picks jokes the user has not seen yet.
pub struct FreshnessEngine<'a> {
    store: &'a dyn JokeStore,
    source: &'a dyn JokeSource,
    sources: &'a SourcesConfig,
    sync: &'a SyncConfig,
}

impl<'a> FreshnessEngine<'a> {
    pub fn new(
        store: &'a dyn JokeStore,
        source: &'a dyn JokeSource,
        sources: &'a SourcesConfig,
        sync: &'a SyncConfig,
    ) -> Self {
        Self {
            store,
            source,
            sources,
            sync,
        }
    }

    /// Scheduler for the curated document of `language`.
    pub fn scheduler(&self, language: Language) -> SyncScheduler<'a> {
        let sources: &'a SourcesConfig = self.sources;
        SyncScheduler::new(
            self.store,
            self.source,
            &sources.bulk_url,
            language,
            self.sync.threshold(),
        )
    }

    /// Return one joke not yet shown in `language`.
    pub async fn next_joke(&self, language: Language) -> Result<String> {
        match language.mode() {
            Mode::Live => self.live_joke(language).await,
            Mode::Rotation => self.rotation_joke(language).await,
        }
    }

    async fn live_joke(&self, language: Language) -> Result<String> {
        for attempt in 1..=MAX_ATTEMPTS {
            let text = self.fetch_live().await?;

            if !self.store.exists(&text, language).await? {
                self.store.insert(&text, language, true).await?;
                log::debug!("New joke found on attempt {}", attempt);
                return Ok(text);
            }

            log::info!(
                "Joke already seen, fetching another one ({}/{})",
                attempt,
                MAX_ATTEMPTS
            );
        }

        Err(AppError::DuplicateExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }

    async fn fetch_live(&self) -> Result<String> {
        let endpoint = &self.sources.api_url;
        let text = match self.source.fetch(endpoint, true).await? {
            SourceResponse::Structured(record) => Some(record.joke).filter(|j| !j.is_empty()),
            SourceResponse::Document(document) => pick_one(extract_jokes(&document)),
        };
        text.ok_or_else(|| AppError::no_jokes(endpoint))
    }

    async fn rotation_joke(&self, language: Language) -> Result<String> {
        match self.scheduler(language).sync_if_stale(Utc::now()).await {
            Ok(SyncOutcome::Synced { inserted, .. }) => {
                log::debug!("Curated set refreshed with {} new jokes", inserted)
            }
            Ok(SyncOutcome::Fresh { .. }) => {}
            Err(e @ (AppError::Database(_) | AppError::Io(_))) => return Err(e),
            Err(e) => log::warn!("Curated jokes could not be refreshed: {}", e),
        }

        if let Some(text) = self.take_unshown(language).await? {
            return Ok(text);
        }

        let reset = self.store.reset_shown(language).await?;
        log::info!("All {} '{}' jokes shown, starting a new cycle", reset, language);

        self.take_unshown(language)
            .await?
            .ok_or(AppError::PoolExhausted { language })
    }

    async fn take_unshown(&self, language: Language) -> Result<Option<String>> {
        match self.store.pick_unshown(language).await? {
            Some(joke) => {
                self.store.mark_shown(joke.id).await?;
                Ok(Some(joke.text))
            }
            None => Ok(None),
        }
    }
}

/// Choose one non-empty entry uniformly at random.
fn pick_one(mut jokes: Vec<String>) -> Option<String> {
    jokes.retain(|j| !j.is_empty());
    jokes.choose(&mut rand::thread_rng()).cloned()
}
