//! SQLite joke store.
//!
//! One file, `jokes.db`, opened once per run through a single-connection
//! pool. Schema setup is idempotent and upgrades the original
//! single-language layout (`jokes(id, joke, created_at)`) in place by adding
//! the `language` and `shown` columns.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Pool, Sqlite};

use crate::error::{AppError, Result};
use crate::models::{Joke, Language, LanguageStats};
use crate::storage::JokeStore;

const CREATE_JOKES: &str = "CREATE TABLE IF NOT EXISTS jokes (
    id INTEGER PRIMARY KEY,
    joke TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)";

const CREATE_SYNC_META: &str = "CREATE TABLE IF NOT EXISTS sync_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
)";

/// Columns added after the first release. Rows that predate them were
/// English jokes straight from the API, which count as already shown.
const ADDED_COLUMNS: [&str; 2] = [
    "ALTER TABLE jokes ADD COLUMN language TEXT NOT NULL DEFAULT 'en'",
    "ALTER TABLE jokes ADD COLUMN shown INTEGER NOT NULL DEFAULT 1",
];

const CREATE_LANGUAGE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_jokes_language_shown ON jokes (language, shown)";

const JOKE_COLUMNS: &str = "id, joke, language, shown, created_at";

/// Raw `jokes` row before the language code is validated.
#[derive(Debug, FromRow)]
struct JokeRow {
    id: i64,
    joke: String,
    language: String,
    shown: bool,
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<JokeRow> for Joke {
    type Error = AppError;

    fn try_from(row: JokeRow) -> Result<Self> {
        Ok(Joke {
            id: row.id,
            text: row.joke,
            language: row.language.parse()?,
            shown: row.shown,
            created_at: row.created_at.unwrap_or_default(),
        })
    }
}

/// Whether an `ALTER TABLE ... ADD COLUMN` failed only because the column
/// is already there.
fn is_duplicate_column(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().contains("duplicate column name"),
        _ => false,
    }
}

/// SQLite-based joke store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if missing) the store at `path` and bring its schema
    /// up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        log::debug!("Joke store opened at {}", path.display());
        Ok(store)
    }

    /// Open a throwaway in-memory store.
    pub async fn in_memory() -> Result<Self> {
        let store = Self {
            pool: memory_pool().await?,
        };
        store.migrate().await?;
        Ok(store)
    }

    /// Close the underlying pool, waiting for the connection to be released.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn fetch_one_joke(&self, sql: &str, language: Language) -> Result<Option<Joke>> {
        let row: Option<JokeRow> = sqlx::query_as(sql)
            .bind(language.code())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Joke::try_from).transpose()
    }
}

/// Single-connection in-memory pool. The connection must never be recycled,
/// or the database vanishes with it.
async fn memory_pool() -> Result<Pool<Sqlite>> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await?;
    Ok(pool)
}

#[async_trait]
impl JokeStore for SqliteStore {
    async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_JOKES).execute(&self.pool).await?;

        // SQLite has no ADD COLUMN IF NOT EXISTS
        for statement in ADDED_COLUMNS {
            match sqlx::query(statement).execute(&self.pool).await {
                Ok(_) => log::debug!("Schema upgraded: {}", statement),
                Err(e) if is_duplicate_column(&e) => {}
                Err(e) => return Err(e.into()),
            }
        }

        sqlx::query(CREATE_LANGUAGE_INDEX)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_SYNC_META).execute(&self.pool).await?;

        Ok(())
    }

    async fn exists(&self, text: &str, language: Language) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM jokes WHERE joke = ? AND language = ?)",
        )
        .bind(text)
        .bind(language.code())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, text: &str, language: Language, shown: bool) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO jokes (joke, language, shown, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(text)
        .bind(language.code())
        .bind(shown)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn pick_unshown(&self, language: Language) -> Result<Option<Joke>> {
        let sql = format!(
            "SELECT {JOKE_COLUMNS} FROM jokes WHERE language = ? AND shown = 0 \
             ORDER BY RANDOM() LIMIT 1"
        );
        self.fetch_one_joke(&sql, language).await
    }

    async fn pick_random(&self, language: Language) -> Result<Option<Joke>> {
        let sql =
            format!("SELECT {JOKE_COLUMNS} FROM jokes WHERE language = ? ORDER BY RANDOM() LIMIT 1");
        self.fetch_one_joke(&sql, language).await
    }

    async fn mark_shown(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE jokes SET shown = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reset_shown(&self, language: Language) -> Result<u64> {
        let result = sqlx::query("UPDATE jokes SET shown = 0 WHERE language = ?")
            .bind(language.code())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn get_sync_meta(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM sync_meta WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set_sync_meta(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO sync_meta (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn stats(&self, language: Language) -> Result<LanguageStats> {
        let (total, shown): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(shown), 0) FROM jokes WHERE language = ?",
        )
        .bind(language.code())
        .fetch_one(&self.pool)
        .await?;
        Ok(LanguageStats { total, shown })
    }
}
