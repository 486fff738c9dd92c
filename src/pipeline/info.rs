// src/pipeline/info.rs

//! Store summary.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Language, LanguageStats};
use crate::services::parse_timestamp;
use crate::storage::{BULK_SYNC_KEY, JokeStore};

/// Snapshot of the joke store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInfo {
    /// Counts per language, in `Language::ALL` order
    pub languages: Vec<(Language, LanguageStats)>,
    /// Last successful curated sync, if any
    pub last_sync: Option<DateTime<Utc>>,
}

/// Collect per-language counts and the last sync time.
pub async fn run_info(store: &dyn JokeStore) -> Result<StoreInfo> {
    let mut languages = Vec::with_capacity(Language::ALL.len());
    for language in Language::ALL {
        languages.push((language, store.stats(language).await?));
    }

    let last_sync = store
        .get_sync_meta(BULK_SYNC_KEY)
        .await?
        .as_deref()
        .and_then(parse_timestamp);

    Ok(StoreInfo {
        languages,
        last_sync,
    })
}
