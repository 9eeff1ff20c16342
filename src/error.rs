use thiserror::Error;

use crate::models::Table;

pub type Result<T> = std::result::Result<T, EnrichError>;

#[derive(Debug, Error)]
pub enum EnrichError {
    /// Malformed record read from the store. Aborts the running pass.
    #[error("invalid record in {table} (id {id}): {reason}")]
    Validation {
        table: Table,
        id: String,
        reason: String,
    },

    #[error("no record with id {id} in {table}")]
    MissingRecord { table: Table, id: i64 },

    #[error("store error: {0}")]
    Store(#[from] sled::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnrichError {
    /// Build a validation error. `id` is rendered as-is, or `?` when the record has none.
    pub fn validation(table: Table, id: Option<i64>, reason: impl Into<String>) -> Self {
        Self::Validation {
            table,
            id: id.map_or_else(|| "?".to_string(), |id| id.to_string()),
            reason: reason.into(),
        }
    }
}
