//! API module
//!
//! Contains HTTP request handlers for the stack endpoints

pub mod stacks;
pub mod utils;

pub use stacks::*;
