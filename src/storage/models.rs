//! Stack data models
//!
//! Defines the stack structure returned by the storage layer and the parsing
//! rules for item values.

use crate::error::AppError;
use chrono::Utc;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Unique identifier for a stack
pub type StackId = String;

/// A stack together with its current items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stack {
    /// Unique identifier for the stack
    pub id: StackId,
    /// Item values in canonical integer form
    pub items: Vec<String>,
}

impl Stack {
    /// Create an empty stack with the given ID
    pub fn new(id: StackId) -> Self {
        Self {
            id,
            items: Vec::new(),
        }
    }

    /// Generate a new unique ID for a stack
    pub fn generate_id() -> StackId {
        Uuid::new_v4().to_string()
    }
}

/// Row in the `stacks` table
#[derive(Debug, Clone)]
pub struct StackRecord {
    /// Unique identifier for the stack
    pub id: StackId,
    /// When the stack was created (Unix timestamp)
    pub created_at: i64,
}

impl StackRecord {
    /// Create a record for a freshly generated stack
    pub fn generate() -> Self {
        Self {
            id: Stack::generate_id(),
            created_at: Utc::now().timestamp(),
        }
    }
}

/// One row of a stack joined with one of its items
///
/// `value` is `None` for a stack without items.
#[derive(Debug, Clone, FromRow)]
pub struct StackItemRow {
    /// Owning stack
    pub stack_id: StackId,
    /// Item value, absent when the stack has no items
    pub value: Option<String>,
}

/// Fold joined rows into stacks, preserving row order
///
/// Rows for the same stack must be adjacent.
pub fn group_rows(rows: Vec<StackItemRow>) -> Vec<Stack> {
    let mut stacks: Vec<Stack> = Vec::new();
    for row in rows {
        match stacks.last_mut() {
            Some(stack) if stack.id == row.stack_id => {
                stack.items.extend(row.value);
            }
            _ => {
                let mut stack = Stack::new(row.stack_id);
                stack.items.extend(row.value);
                stacks.push(stack);
            }
        }
    }
    stacks
}

/// Canonical text form of an integer item value
///
/// Accepts an optional sign followed by ASCII digits, with surrounding
/// whitespace. Values of any magnitude are allowed. The result has no `+`,
/// no leading zeros and no negative zero.
pub fn canonical_item_value(raw: &str) -> Result<String, AppError> {
    let invalid = || AppError::InvalidInput(format!("Item value is not an integer: {:?}", raw));

    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let magnitude = digits.trim_start_matches('0');
    Ok(match (negative, magnitude.is_empty()) {
        (_, true) => "0".to_string(),
        (true, false) => format!("-{}", magnitude),
        (false, false) => magnitude.to_string(),
    })
}

/// Canonicalize every value, failing on the first one that is not an integer
pub fn canonical_item_values(raw: &[String]) -> Result<Vec<String>, AppError> {
    raw.iter().map(|v| canonical_item_value(v)).collect()
}
