//! Database schema migrations

use crate::{Error, Result};
use rusqlite::Connection;

const SCHEMA_VERSION: i32 = 2;

/// Run all migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    tracing::debug!(
        "Running migrations: current_version={}, target_version={}",
        current_version,
        SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    if current_version < 2 {
        migrate_v2(conn)?;
    }

    if current_version != SCHEMA_VERSION {
        set_schema_version(conn, SCHEMA_VERSION)?;
    }

    Ok(())
}

/// Current schema version (0 for a fresh database)
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result = conn.query_row(
        "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
        [],
        |row| row.get(0),
    );

    match result {
        Ok(v) => Ok(v),
        Err(_) => Ok(0),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
        [],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    tracing::debug!("Schema version set to {}", version);
    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE sale_waves (
            project_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            identifier TEXT NOT NULL,
            enabled BOOLEAN NOT NULL,
            start_time INTEGER NOT NULL,
            end_time INTEGER NOT NULL,
            mint_charge TEXT NOT NULL,
            max_mint_per_wallet INTEGER NOT NULL,
            max_mint_in_sale INTEGER NOT NULL,
            sale_type TEXT NOT NULL CHECK (sale_type IN ('private', 'public')),
            token_gated_address TEXT NOT NULL,
            PRIMARY KEY (project_id, identifier)
        );

        CREATE TABLE whitelist_entries (
            project_id TEXT NOT NULL,
            wave_identifier TEXT NOT NULL,
            address TEXT NOT NULL,
            mint_limit INTEGER NOT NULL,
            PRIMARY KEY (project_id, wave_identifier, address),
            FOREIGN KEY (project_id, wave_identifier)
                REFERENCES sale_waves(project_id, identifier) ON DELETE CASCADE
        );

        CREATE INDEX idx_sale_waves_position ON sale_waves(project_id, position);
        "#,
    )
    .map_err(|e| Error::Migration(e.to_string()))?;

    Ok(())
}

fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE project_revisions (
            project_id TEXT NOT NULL,
            revision INTEGER NOT NULL,
            sale_config_root TEXT NOT NULL,
            wave_count INTEGER NOT NULL,
            saved_at TEXT NOT NULL,
            PRIMARY KEY (project_id, revision)
        );
        "#,
    )
    .map_err(|e| Error::Migration(e.to_string()))?;

    Ok(())
}
