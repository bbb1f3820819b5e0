//! OpenAPI document for the stack endpoints
//!
//! Generated from the handler annotations and response types in
//! [`crate::api::stacks`], and served as JSON at `/api-docs/openapi.json`.

use crate::api::stacks::{AddItemsRequest, DeleteStackResponse, StackResponse};
use crate::error::ErrorResponse;
use utoipa::OpenApi;

/// Public OpenAPI surface used by documentation tooling
#[derive(OpenApi)]
#[openapi(
    info(title = "Stack Service", description = "Stacks of integer items stored in SQLite"),
    paths(
        crate::api::stacks::create_stack,
        crate::api::stacks::get_stack,
        crate::api::stacks::delete_stack,
        crate::api::stacks::list_stacks,
        crate::api::stacks::add_items,
    ),
    components(schemas(StackResponse, DeleteStackResponse, AddItemsRequest, ErrorResponse)),
    tags((name = "stack", description = "Stack lifecycle and item appends"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_stack_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for path in [
            "/stack/create",
            "/stack/{id}",
            "/stack/delete/{id}",
            "/stack/list",
            "/stack/add_item",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == path), "missing {}", path);
        }
    }

    #[test]
    fn test_document_carries_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        for name in ["StackResponse", "DeleteStackResponse", "AddItemsRequest", "ErrorResponse"] {
            assert!(schemas.contains_key(name), "missing schema {}", name);
        }
    }
}
