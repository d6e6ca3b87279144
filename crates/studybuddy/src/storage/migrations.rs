//! Schema versioning for the slot database.
//!
//! Each migration is a batch of SQL applied inside a transaction together
//! with the version bump, so a database is never left half-migrated.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Ordered migrations, indexed by the version they produce.
const MIGRATIONS: &[(i32, &str)] = &[
    // Base tables come from SCHEMA_STATEMENTS.
    (1, ""),
    (
        2,
        "CREATE INDEX IF NOT EXISTS idx_slots_updated_at ON slots(updated_at DESC);",
    ),
];

/// The current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// Create the base tables and bring the schema up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if schema creation or a migration fails, or if the
/// database was written by a newer version.
pub fn initialize_schema(conn: &mut Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let version = schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for (target, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > version) {
        let tx = conn.transaction()?;
        if !sql.is_empty() {
            tx.execute_batch(sql)?;
        }
        set_schema_version(&tx, *target)?;
        tx.commit()?;
        tracing::debug!("Migrated slot database to schema version {}", target);
    }

    Ok(())
}

/// Read the schema version, 0 for a fresh database.
///
/// # Errors
///
/// Returns an error if the metadata query fails or the stored value is not a number.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}
