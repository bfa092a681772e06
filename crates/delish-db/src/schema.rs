//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables use SCHEMAFULL mode; the store location is a FLEXIBLE object so
//! it can be stored as a GeoJSON-style point. UUIDs are stored as record
//! ids and parsed back with `meta::id(id)`.

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
// Schema v1: stores
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
DEFINE TABLE store SCHEMAFULL;
DEFINE FIELD name ON TABLE store TYPE string \
    ASSERT string::len(string::trim($value)) > 0;
DEFINE FIELD slug ON TABLE store TYPE string;
DEFINE FIELD description ON TABLE store TYPE string DEFAULT '';
DEFINE FIELD location ON TABLE store TYPE option<object> FLEXIBLE \
    ASSERT $value = NONE OR $value.type = 'Point';
DEFINE FIELD photos ON TABLE store TYPE array<string> DEFAULT [];
DEFINE FIELD tags ON TABLE store TYPE array<string> DEFAULT [];
DEFINE FIELD created_at ON TABLE store TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE store TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_store_slug ON TABLE store COLUMNS slug UNIQUE;
DEFINE INDEX idx_store_tags ON TABLE store COLUMNS tags;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

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

        info!(version = migration.version, "Migration applied");
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
