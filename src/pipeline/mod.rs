//! Pipeline entry points for joke operations.
//!
//! - `run_joke`: Produce one unseen joke, falling back to a stored one
//! - `run_sync`: Re-ingest the curated joke document
//! - `run_info`: Summarise what the store holds

pub mod info;
pub mod joke;
pub mod sync;

pub use info::{StoreInfo, run_info};
pub use joke::run_joke;
pub use sync::run_sync;
