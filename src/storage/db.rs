//! Stack database operations
//!
//! Handles all database interactions for stacks and their items.

use crate::error::AppError;
use crate::storage::locks::KeyedLocks;
use crate::storage::models::{
    canonical_item_values, group_rows, Stack, StackItemRow, StackRecord,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

const SELECT_STACK: &str = "SELECT s.id AS stack_id, i.value AS value \
     FROM stacks s LEFT JOIN stack_items i ON i.stack_id = s.id \
     WHERE s.id = ? ORDER BY i.id ASC";

const SELECT_ALL_STACKS: &str = "SELECT s.id AS stack_id, i.value AS value \
     FROM stacks s LEFT JOIN stack_items i ON i.stack_id = s.id \
     ORDER BY s.created_at ASC, s.rowid ASC, i.id ASC";

/// Database connection pool for stack operations
pub struct StackDb {
    pool: SqlitePool,
    write_locks: KeyedLocks,
}

impl StackDb {
    /// Initialize database connection pool
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `max_connections` - Upper bound on pooled connections
    ///
    /// # Returns
    /// * `Ok(StackDb)` if successful
    /// * `Err(AppError)` if connection or migration failed
    pub async fn new(db_path: &str, max_connections: u32) -> Result<Self, AppError> {
        // Ensure parent directory exists
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Failed to create db directory: {}", e))
                })?;
            }
        }

        let connection_string = if db_path.starts_with("sqlite:") {
            db_path.to_string()
        } else {
            format!("sqlite:{}", db_path)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to connect to database: {}", e))
            })?;

        info!("Connected to SQLite database at: {}", db_path);

        let db = Self {
            pool,
            write_locks: KeyedLocks::new(),
        };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_stacks.sql");

        for statement in split_statements(migration_sql) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!(
                        "Migration failed: {} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Create a new, empty stack
    pub async fn create_stack(&self) -> Result<Stack, AppError> {
        let record = StackRecord::generate();
        sqlx::query("INSERT INTO stacks (id, created_at) VALUES (?, ?)")
            .bind(&record.id)
            .bind(record.created_at)
            .execute(&self.pool)
            .await?;

        debug!(stack_id = %record.id, "Created stack");
        Ok(Stack::new(record.id))
    }

    /// Get a stack with its items by ID
    pub async fn get_stack(&self, id: &str) -> Result<Option<Stack>, AppError> {
        fetch_stack(&self.pool, id).await
    }

    /// Get all stacks with their items, oldest first
    pub async fn list_stacks(&self) -> Result<Vec<Stack>, AppError> {
        let rows = sqlx::query_as::<_, StackItemRow>(SELECT_ALL_STACKS)
            .fetch_all(&self.pool)
            .await?;

        Ok(group_rows(rows))
    }

    /// Delete a stack (cascades to its items)
    ///
    /// Fails with `StackNotFound` if no stack has this ID.
    pub async fn delete_stack(&self, id: &str) -> Result<(), AppError> {
        let _guard = self.write_locks.lock(id).await;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM stacks WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::StackNotFound(id.to_string()));
        }
        tx.commit().await?;

        debug!(stack_id = %id, "Deleted stack");
        Ok(())
    }

    /// Append one item per value to a stack and return the updated stack
    ///
    /// All values are validated before anything is written, and the inserts
    /// commit together or not at all.
    pub async fn append_items(&self, id: &str, values: &[String]) -> Result<Stack, AppError> {
        if id.trim().is_empty() {
            return Err(AppError::InvalidInput("Stack id is required".to_string()));
        }
        if values.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one item is required".to_string(),
            ));
        }
        let canonical = canonical_item_values(values)?;

        let _guard = self.write_locks.lock(id).await;

        let mut tx = self.pool.begin().await?;
        for value in &canonical {
            sqlx::query("INSERT INTO stack_items (stack_id, value) VALUES (?, ?)")
                .bind(id)
                .bind(value)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_insert_error(e, id))?;
        }

        let stack = fetch_stack(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::StackNotFound(id.to_string()))?;
        tx.commit().await?;

        debug!(stack_id = %id, count = canonical.len(), "Appended items to stack");
        Ok(stack)
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }

    #[cfg(test)]
    fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn fetch_stack<'e, E>(executor: E, id: &str) -> Result<Option<Stack>, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, StackItemRow>(SELECT_STACK)
        .bind(id)
        .fetch_all(executor)
        .await?;

    Ok(group_rows(rows).into_iter().next())
}

// An item insert only violates the foreign key when the stack is missing.
fn map_insert_error(err: sqlx::Error, stack_id: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::StackNotFound(stack_id.to_string())
        }
        _ => AppError::Database(err),
    }
}

/// Split a migration script into statements, dropping `--` comments
fn split_statements(sql: &str) -> Vec<String> {
    let mut cleaned_sql = String::new();
    for line in sql.lines() {
        let without_comments = match line.find("--") {
            Some(pos) => &line[..pos],
            None => line,
        };
        let trimmed = without_comments.trim();
        if trimmed.is_empty() {
            continue;
        }
        cleaned_sql.push_str(trimmed);
        cleaned_sql.push(' ');
    }

    cleaned_sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
