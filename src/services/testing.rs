//! Test doubles for service tests: a scripted source and a store with
//! injectable failures.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{ApiJoke, Joke, Language, LanguageStats};
use crate::services::{JokeSource, SourceResponse};
use crate::storage::{JokeStore, SqliteStore};

/// Replays canned responses in order, wrapping around at the end.
pub struct ScriptedSource {
    responses: Vec<SourceResponse>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, bool)>>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<SourceResponse>) -> Self {
        Self {
            responses,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// API-style responses carrying the given jokes.
    pub fn api(jokes: &[&str]) -> Self {
        Self::new(
            jokes
                .iter()
                .enumerate()
                .map(|(i, joke)| {
                    SourceResponse::Structured(ApiJoke {
                        id: (i + 1).to_string(),
                        joke: joke.to_string(),
                        status: 200,
                    })
                })
                .collect(),
        )
    }

    /// A single markdown document.
    pub fn document(body: &str) -> Self {
        Self::new(vec![SourceResponse::Document(body.to_string())])
    }

    /// A source whose every fetch fails to parse.
    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, bool)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl JokeSource for ScriptedSource {
    async fn fetch(&self, endpoint: &str, expect_json: bool) -> Result<SourceResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.to_string(), expect_json));

        if self.responses.is_empty() {
            let err = serde_json::from_str::<ApiJoke>("{").unwrap_err();
            return Err(AppError::Json(err));
        }
        Ok(self.responses[call % self.responses.len()].clone())
    }
}

/// Wraps a real store and fails selected operations with a database error.
pub struct FaultyStore {
    inner: SqliteStore,
    fail_sync_read: bool,
    fail_insert_of: Option<String>,
}

impl FaultyStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            fail_sync_read: false,
            fail_insert_of: None,
        }
    }

    /// Fail every `get_sync_meta` call.
    pub fn failing_sync_read(mut self) -> Self {
        self.fail_sync_read = true;
        self
    }

    /// Fail `insert` for this exact text only.
    pub fn failing_insert_of(mut self, text: &str) -> Self {
        self.fail_insert_of = Some(text.to_string());
        self
    }

    pub fn inner(&self) -> &SqliteStore {
        &self.inner
    }
}

fn database_down() -> AppError {
    AppError::Database(sqlx::Error::PoolClosed)
}

#[async_trait]
impl JokeStore for FaultyStore {
    async fn migrate(&self) -> Result<()> {
        self.inner.migrate().await
    }

    async fn exists(&self, text: &str, language: Language) -> Result<bool> {
        self.inner.exists(text, language).await
    }

    async fn insert(&self, text: &str, language: Language, shown: bool) -> Result<i64> {
        if self.fail_insert_of.as_deref() == Some(text) {
            return Err(database_down());
        }
        self.inner.insert(text, language, shown).await
    }

    async fn pick_unshown(&self, language: Language) -> Result<Option<Joke>> {
        self.inner.pick_unshown(language).await
    }

    async fn pick_random(&self, language: Language) -> Result<Option<Joke>> {
        self.inner.pick_random(language).await
    }

    async fn mark_shown(&self, id: i64) -> Result<()> {
        self.inner.mark_shown(id).await
    }

    async fn reset_shown(&self, language: Language) -> Result<u64> {
        self.inner.reset_shown(language).await
    }

    async fn get_sync_meta(&self, key: &str) -> Result<Option<String>> {
        if self.fail_sync_read {
            return Err(database_down());
        }
        self.inner.get_sync_meta(key).await
    }

    async fn set_sync_meta(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set_sync_meta(key, value).await
    }

    async fn stats(&self, language: Language) -> Result<LanguageStats> {
        self.inner.stats(language).await
    }
}
