//! Core types and trait definitions for the hangar component-records store.
//!
//! This crate is deliberately free of database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod aircraft;
pub mod asset;
pub mod counters;
pub mod engine;
pub mod error;
pub mod history;
pub mod ledger;
pub mod life;
pub mod store;

pub use error::{Error, Result};
