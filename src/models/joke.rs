//! Joke data structures.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Supported joke languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English, served live by the JSON API
    #[default]
    En,
    /// German, served from a curated markdown document
    De,
}

/// How jokes for a language are acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fetch from the API and skip anything already stored.
    Live,
    /// Rotate through the stored set, resetting once every joke was shown.
    Rotation,
}

impl Language {
    /// All known languages.
    pub const ALL: [Language; 2] = [Language::En, Language::De];

    /// Language code as stored in the database.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
        }
    }

    /// Acquisition mode for this language.
    pub fn mode(&self) -> Mode {
        match self {
            Language::En => Mode::Live,
            Language::De => Mode::Rotation,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "de" => Ok(Language::De),
            other => Err(AppError::validation(format!(
                "unsupported language '{other}' (expected 'en' or 'de')"
            ))),
        }
    }
}

/// A stored joke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joke {
    /// Store-assigned identifier
    pub id: i64,

    /// Joke text, verbatim
    pub text: String,

    /// Language the joke belongs to
    pub language: Language,

    /// Whether the joke was surfaced in the current cycle
    pub shown: bool,

    /// Insertion time
    pub created_at: DateTime<Utc>,
}

/// Single-joke record returned by the JSON API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiJoke {
    pub id: String,
    pub joke: String,
    pub status: i64,
}

/// Per-language counts reported by `info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LanguageStats {
    pub total: i64,
    pub shown: i64,
}

impl LanguageStats {
    /// Jokes still waiting to be shown in this cycle.
    pub fn unshown(&self) -> i64 {
        self.total - self.shown
    }
}
