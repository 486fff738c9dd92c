// src/lib.rs

//! dadjoke library: fetches jokes the user has not seen yet.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
