// src/pipeline/joke.rs

//! Single-joke pipeline.

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::{FreshnessEngine, JokeSource};
use crate::storage::JokeStore;

/// Produce the one joke printed for this run.
///
/// A failed live fetch (repeats exhausted, transport or parse errors) falls
/// back to a random stored joke for the configured language. Store failures,
/// an empty rotation pool and an invalid configuration are fatal.
pub async fn run_joke(
    config: &Config,
    store: &dyn JokeStore,
    source: &dyn JokeSource,
) -> Result<String> {
    config.validate()?;
    let language = config.language;
    let engine = FreshnessEngine::new(store, source, &config.sources, &config.sync);

    match engine.next_joke(language).await {
        Ok(joke) => Ok(joke),
        Err(e) if e.is_recoverable() => {
            log::error!("Failed to get a fresh joke: {}", e);
            log::info!("Falling back to a random stored joke");
            store
                .pick_random(language)
                .await?
                .map(|joke| joke.text)
                .ok_or(AppError::EmptyStore { language })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::services::testing::ScriptedSource;
    use crate::storage::SqliteStore;

    fn config(language: Language) -> Config {
        let mut config = Config::default();
        config.language = language;
        config
    }

    #[tokio::test]
    async fn test_fresh_joke_is_returned() {
        let store = SqliteStore::in_memory().await.unwrap();
        let source = ScriptedSource::api(&["Fresh"]);

        let joke = run_joke(&config(Language::En), &store, &source).await.unwrap();
        assert_eq!(joke, "Fresh");
    }

    #[tokio::test]
    async fn test_zero_timeout_is_rejected_before_fetching() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert("Stored", Language::En, true).await.unwrap();
        let source = ScriptedSource::api(&["Fresh"]);
        let mut config = config(Language::En);
        config.fetch.timeout_secs = 0;

        let err = run_joke(&config, &store, &source).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_exhaustion_falls_back_to_stored_joke() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert("Old news", Language::En, true).await.unwrap();
        let source = ScriptedSource::api(&["Old news"]);

        let joke = run_joke(&config(Language::En), &store, &source).await.unwrap();

        assert_eq!(joke, "Old news");
        assert_eq!(source.calls(), 5);
        assert_eq!(store.stats(Language::En).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_stored_joke() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert("Kept", Language::En, true).await.unwrap();
        let source = ScriptedSource::failing();

        let joke = run_joke(&config(Language::En), &store, &source).await.unwrap();
        assert_eq!(joke, "Kept");
    }

    #[tokio::test]
    async fn test_fallback_needs_a_stored_joke() {
        let store = SqliteStore::in_memory().await.unwrap();
        let source = ScriptedSource::failing();

        let err = run_joke(&config(Language::En), &store, &source)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::EmptyStore {
                language: Language::En
            }
        ));
    }

    #[tokio::test]
    async fn test_fallback_stays_within_language() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert("Nur Deutsch", Language::De, true).await.unwrap();
        let source = ScriptedSource::failing();

        let result = run_joke(&config(Language::En), &store, &source).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_rotation_pool_is_fatal() {
        let store = SqliteStore::in_memory().await.unwrap();
        let source = ScriptedSource::document("no jokes here");

        let err = run_joke(&config(Language::De), &store, &source)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PoolExhausted { .. }));
    }
}
