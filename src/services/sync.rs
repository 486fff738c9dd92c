// src/services/sync.rs

//! Bulk document resync.
//!
//! The curated jokes live in one markdown document. It is fetched again only
//! when the last successful ingestion is older than the configured threshold;
//! a missing or unreadable timestamp counts as never synced.

use chrono::{DateTime, Duration, Utc};

use crate::error::{AppError, Result};
use crate::models::Language;
use crate::services::extract::extract_jokes;
use crate::services::{JokeSource, SourceResponse};
use crate::storage::{BULK_SYNC_KEY, JokeStore};

/// What a sync check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Last sync is recent enough; nothing fetched
    Fresh { last_sync: DateTime<Utc> },
    /// Document fetched and ingested
    Synced {
        extracted: usize,
        inserted: usize,
        failed: usize,
    },
}

/// Whether a sync at `last_sync` is older than `threshold` at `now`.
pub fn is_stale(last_sync: DateTime<Utc>, now: DateTime<Utc>, threshold: Duration) -> bool {
    now.signed_duration_since(last_sync) > threshold
}

/// Parse a stored sync timestamp. Anything unreadable counts as never synced.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Keeps the stored curated set in step with the bulk document.
pub struct SyncScheduler<'a> {
    store: &'a dyn JokeStore,
    source: &'a dyn JokeSource,
    endpoint: &'a str,
    language: Language,
    threshold: Duration,
}

impl<'a> SyncScheduler<'a> {
    pub fn new(
        store: &'a dyn JokeStore,
        source: &'a dyn JokeSource,
        endpoint: &'a str,
        language: Language,
        threshold: Duration,
    ) -> Self {
        Self {
            store,
            source,
            endpoint,
            language,
            threshold,
        }
    }

    /// Ingest the document if the last sync is stale.
    pub async fn sync_if_stale(&self, now: DateTime<Utc>) -> Result<SyncOutcome> {
        let stored = self.store.get_sync_meta(BULK_SYNC_KEY).await?;
        let last_sync = stored.as_deref().and_then(parse_timestamp);

        match last_sync {
            Some(last_sync) if !is_stale(last_sync, now, self.threshold) => {
                log::debug!("Curated jokes synced at {}, skipping fetch", last_sync);
                return Ok(SyncOutcome::Fresh { last_sync });
            }
            Some(last_sync) => {
                log::info!("Curated jokes stale (last sync {}), refreshing", last_sync)
            }
            None => match stored {
                Some(value) => log::warn!("Unreadable sync timestamp '{}', refreshing", value),
                None => log::info!("Curated jokes never synced, fetching"),
            },
        }

        self.force_sync(now).await
    }

    /// Ingest the document unconditionally.
    ///
    /// Fails only when the fetch fails or nothing could be extracted; single
    /// entries that cannot be stored are logged and skipped.
    pub async fn force_sync(&self, now: DateTime<Utc>) -> Result<SyncOutcome> {
        let entries = match self.source.fetch(self.endpoint, false).await? {
            SourceResponse::Document(document) => extract_jokes(&document),
            SourceResponse::Structured(record) => vec![record.joke],
        };
        let entries: Vec<String> = entries.into_iter().filter(|e| !e.is_empty()).collect();

        if entries.is_empty() {
            return Err(AppError::no_jokes(self.endpoint));
        }

        let mut inserted = 0;
        let mut failed = 0;
        for entry in &entries {
            match self.store_if_new(entry).await {
                Ok(true) => inserted += 1,
                Ok(false) => {}
                Err(e) => {
                    failed += 1;
                    log::warn!("Skipping joke that could not be stored: {}", e);
                }
            }
        }

        self.store
            .set_sync_meta(BULK_SYNC_KEY, &now.to_rfc3339())
            .await?;

        log::info!(
            "Synced {} curated jokes for '{}': {} new, {} failed",
            entries.len(),
            self.language,
            inserted,
            failed
        );

        Ok(SyncOutcome::Synced {
            extracted: entries.len(),
            inserted,
            failed,
        })
    }

    async fn store_if_new(&self, text: &str) -> Result<bool> {
        if self.store.exists(text, self.language).await? {
            return Ok(false);
        }
        self.store.insert(text, self.language, false).await?;
        Ok(true)
    }
}
