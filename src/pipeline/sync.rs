// src/pipeline/sync.rs

//! Manual resync of the curated joke document.

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, Language};
use crate::services::{FreshnessEngine, JokeSource, SyncOutcome};
use crate::storage::JokeStore;

/// Fetch and ingest the curated document now, ignoring the resync cadence.
pub async fn run_sync(
    config: &Config,
    store: &dyn JokeStore,
    source: &dyn JokeSource,
) -> Result<SyncOutcome> {
    config.validate()?;
    let engine = FreshnessEngine::new(store, source, &config.sources, &config.sync);
    engine.scheduler(Language::De).force_sync(Utc::now()).await
}
