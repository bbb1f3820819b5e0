//! Storage module
//!
//! Owns the durable representation of stacks and their items in SQLite.

pub mod db;
pub mod locks;
pub mod models;

pub use db::StackDb;
pub use locks::KeyedLocks;
pub use models::{Stack, StackId};
