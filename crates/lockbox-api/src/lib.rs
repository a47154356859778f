//! Lockbox API
//!
//! HTTP surface for the encrypted attachment pipeline. Handlers orchestrate
//! Hold → Transform → Upload → Record for writes and
//! Fetch-metadata → Download → Stream for reads; the heavy lifting lives in
//! the storage and processing crates.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod state;
