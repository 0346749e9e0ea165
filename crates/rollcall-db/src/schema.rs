//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: user roster
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string \
    ASSERT string::len(string::trim($value)) > 0;
DEFINE FIELD email ON TABLE user TYPE string \
    ASSERT string::len($value) > 0 AND $value = string::lowercase($value);
DEFINE FIELD password_hash ON TABLE user TYPE string \
    ASSERT string::starts_with($value, '$argon2');
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['admin', 'secretary', 'student'] \
    DEFAULT 'student';
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['active', 'inactive'] \
    DEFAULT 'active';
DEFINE FIELD national_id ON TABLE user TYPE option<string>;
DEFINE FIELD external_id ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();

-- Uniqueness spans every lifecycle state: soft-deleted rows keep
-- their email, national id and external id reserved.
DEFINE INDEX idx_user_email ON TABLE user \
    COLUMNS email UNIQUE;
DEFINE INDEX idx_user_national_id ON TABLE user \
    COLUMNS national_id UNIQUE;
DEFINE INDEX idx_user_external_id ON TABLE user \
    COLUMNS external_id UNIQUE;
DEFINE INDEX idx_user_status ON TABLE user \
    COLUMNS status;
";

/// Unique index name → the user field it protects.
pub(crate) const UNIQUE_USER_INDEXES: &[(&str, &str)] = &[
    ("idx_user_email", "email"),
    ("idx_user_national_id", "national_id"),
    ("idx_user_external_id", "external_id"),
];

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
