//! Ordered schema migrations for the planner store.
//!
//! # Invariants
//! - Versions start at 1 and increase by exactly one per script.
//! - All pending scripts run in one transaction; `user_version` tracks the
//!   last applied script.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

/// Schema scripts, index `i` holding version `i + 1`.
const MIGRATIONS: [&str; 2] = [
    include_str!("0001_init.sql"),
    include_str!("0002_preferences.sql"),
];

/// Latest schema version this binary can write.
pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

/// Upgrades the schema on `conn` to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this binary.
/// - `Migration` naming the first script that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }
    if from == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in (1u32..).zip(MIGRATIONS) {
        if version <= from {
            continue;
        }
        tx.execute_batch(sql)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| {
                error!("event=db_migrate module=db status=error version={version}");
                DbError::Migration { version, source }
            })?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from} to_version={latest}");
    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
