//! Database-specific error types and conversions.

use rollcall_core::error::RollcallError;

use crate::schema::UNIQUE_USER_INDEXES;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Duplicate value for field(s): {}", fields.join(", "))]
    Duplicate { fields: Vec<String> },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Query failed: {0}")]
    Query(String),

    /// A stored row could not be mapped back to the domain model.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Classify a failed statement by its message. Unique-index
    /// violations name the index ("Database index `idx_user_email`
    /// already contains ..."); field assertions mention the field and
    /// the clause it must conform to.
    pub(crate) fn from_statement(message: String) -> Self {
        if message.contains("already contains") {
            let fields: Vec<String> = UNIQUE_USER_INDEXES
                .iter()
                .filter(|(index, _)| message.contains(index))
                .map(|(_, field)| (*field).to_string())
                .collect();
            if !fields.is_empty() {
                return DbError::Duplicate { fields };
            }
        }
        if message.contains("must conform to") || message.contains("but expected") {
            return DbError::Validation(message);
        }
        DbError::Query(message)
    }
}

impl From<DbError> for RollcallError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RollcallError::NotFound { entity, id },
            DbError::Duplicate { fields } => RollcallError::Duplicate { fields },
            DbError::Validation(message) => RollcallError::Validation { message },
            DbError::Hash(msg) => RollcallError::Crypto(msg),
            other => RollcallError::Database(other.to_string()),
        }
    }
}
