//! Service layer for the joke fetcher.
//!
//! This module contains the business logic for:
//! - Fetching from the remote sources (`HttpSource`)
//! - Pulling joke lines out of markdown (`extract_jokes`)
//! - Keeping the curated set current (`SyncScheduler`)
//! - Picking an unseen joke (`FreshnessEngine`)

pub mod extract;
mod fresh;
mod source;
mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use extract::extract_jokes;
pub use fresh::{FreshnessEngine, MAX_ATTEMPTS};
pub use source::{HttpSource, JokeSource, SourceResponse};
pub use sync::{SyncOutcome, SyncScheduler, is_stale, parse_timestamp};
