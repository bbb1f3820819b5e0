//! API utility types and helpers
//!
//! Shared router state and request payload normalization used by the stack
//! handlers.

use crate::error::AppError;
use crate::storage::StackDb;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// State shared by every handler
pub type RouterState = Arc<StackDb>;

/// An item value as sent by clients
///
/// Clients may send either `"5"` or `5`; both are handed to the storage layer
/// as text. JSON numbers keep their original digits, so integers larger than
/// any machine type survive intact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct ItemValue(String);

impl ItemValue {
    /// Render the value as the string handed to the storage layer
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for ItemValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<Value> for ItemValue {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(format!(
                "item values must be integers or integer strings, got {}",
                other
            )),
        }
    }
}

/// Require an optional payload field to be present
pub fn require_field<T>(value: Option<T>, name: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::InvalidInput(format!("Missing required field: {}", name)))
}

/// Convert an axum JSON body rejection into a structured invalid-input error
pub fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::InvalidInput(rejection.body_text())
}
