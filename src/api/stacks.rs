//! Stack API endpoints
//!
//! Handles HTTP requests for creating, reading, listing, deleting and
//! appending items to stacks.

use crate::api::utils::{invalid_body, require_field, ItemValue, RouterState};
use crate::error::{AppError, ErrorResponse};
use crate::storage::{Stack, StackId};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to append items to a stack
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemsRequest {
    /// Target stack
    #[schema(value_type = Option<String>, example = "0b6c4e0e-3f3c-4a8e-9a57-2d1f8c7e5b21")]
    pub id: Option<StackId>,
    /// Values to append, each an integer or integer string
    #[schema(value_type = Option<Vec<String>>, example = json!(["5", "7"]))]
    pub items: Option<Vec<ItemValue>>,
}

/// Stack response
#[derive(Debug, Serialize, PartialEq, Eq, ToSchema)]
pub struct StackResponse {
    /// Stack unique identifier
    #[schema(value_type = String)]
    pub id: StackId,
    /// Item values, string-encoded
    pub items: Vec<String>,
}

impl From<Stack> for StackResponse {
    fn from(stack: Stack) -> Self {
        Self {
            id: stack.id,
            items: stack.items,
        }
    }
}

/// Delete confirmation response
#[derive(Debug, Serialize, PartialEq, Eq, ToSchema)]
pub struct DeleteStackResponse {
    /// Always true on success
    pub deleted: bool,
    /// ID of the deleted stack
    #[schema(value_type = String)]
    pub stack_id: StackId,
}

/// POST /stack/create - Create a new, empty stack
#[utoipa::path(
    post,
    path = "/stack/create",
    tag = "stack",
    responses(
        (status = 200, description = "Stack created", body = StackResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn create_stack(
    State(db): State<RouterState>,
) -> Result<Json<StackResponse>, AppError> {
    let stack = db.create_stack().await?;
    tracing::info!(stack_id = %stack.id, "Stack created");
    Ok(Json(StackResponse::from(stack)))
}

/// GET /stack/:id - Get a stack with its items
#[utoipa::path(
    get,
    path = "/stack/{id}",
    tag = "stack",
    params(("id" = String, Path, description = "Stack identifier")),
    responses(
        (status = 200, description = "Stack with its items", body = StackResponse),
        (status = 404, description = "No stack with this identifier", body = ErrorResponse)
    )
)]
pub async fn get_stack(
    State(db): State<RouterState>,
    Path(id): Path<StackId>,
) -> Result<Json<StackResponse>, AppError> {
    let stack = db
        .get_stack(&id)
        .await?
        .ok_or_else(|| AppError::StackNotFound(id.clone()))?;

    Ok(Json(StackResponse::from(stack)))
}

/// DELETE /stack/delete/:id - Delete a stack and its items
#[utoipa::path(
    delete,
    path = "/stack/delete/{id}",
    tag = "stack",
    params(("id" = String, Path, description = "Stack identifier")),
    responses(
        (status = 200, description = "Stack and its items deleted", body = DeleteStackResponse),
        (status = 404, description = "No stack with this identifier", body = ErrorResponse)
    )
)]
pub async fn delete_stack(
    State(db): State<RouterState>,
    Path(id): Path<StackId>,
) -> Result<Json<DeleteStackResponse>, AppError> {
    db.delete_stack(&id).await?;
    tracing::info!(stack_id = %id, "Stack deleted");

    Ok(Json(DeleteStackResponse {
        deleted: true,
        stack_id: id,
    }))
}

/// GET /stack/list - List all stacks
#[utoipa::path(
    get,
    path = "/stack/list",
    tag = "stack",
    responses(
        (status = 200, description = "All stacks with their items", body = [StackResponse])
    )
)]
pub async fn list_stacks(
    State(db): State<RouterState>,
) -> Result<Json<Vec<StackResponse>>, AppError> {
    let stacks = db.list_stacks().await?;
    Ok(Json(stacks.into_iter().map(StackResponse::from).collect()))
}

/// POST /stack/add_item - Append items to a stack
#[utoipa::path(
    post,
    path = "/stack/add_item",
    tag = "stack",
    request_body = AddItemsRequest,
    responses(
        (status = 200, description = "Stack after the append", body = StackResponse),
        (status = 400, description = "Missing field, malformed body or non-integer item", body = ErrorResponse),
        (status = 404, description = "No stack with this identifier", body = ErrorResponse)
    )
)]
pub async fn add_items(
    State(db): State<RouterState>,
    payload: Result<Json<AddItemsRequest>, JsonRejection>,
) -> Result<Json<StackResponse>, AppError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let id = require_field(request.id, "id")?;
    let items: Vec<String> = require_field(request.items, "items")?
        .into_iter()
        .map(ItemValue::into_string)
        .collect();

    let stack = db.append_items(&id, &items).await?;
    tracing::info!(stack_id = %id, count = items.len(), "Items added to stack");

    Ok(Json(StackResponse::from(stack)))
}
