//! Common test utilities.

use std::sync::Arc;

use axum::Router;

use stack_service::server;
use stack_service::storage::StackDb;

/// Create a test app backed by a fresh database.
pub async fn test_app() -> Router {
    use tempfile::TempDir;

    let tmp = TempDir::new().unwrap();

    // Leak the TempDir so it doesn't get cleaned up during the test.
    let tmp = Box::leak(Box::new(tmp));
    let db_path = tmp.path().join("stacks.db");

    let db = StackDb::new(db_path.to_str().unwrap(), 5)
        .await
        .expect("Failed to create test database");

    server::build_app(Arc::new(db))
}
