//! Stack Service Library
//!
//! An HTTP service managing stacks of integer items stored in SQLite.
//! The binary entry point is in `src/main.rs`.

pub mod api;
pub mod config;
/// OpenAPI document generated from the stack handlers
pub mod doc;
pub mod error;
pub mod server;
/// Stack persistence
///
/// SQLite-backed storage with cascade delete and per-stack write locks.
pub mod storage;

pub use doc::ApiDoc;
