//! Migration tests
//!
//! Runs the schema migrations against fresh database files.

use dropmint_storage_sqlite::migrations;
use rusqlite::Connection;
use tempfile::NamedTempFile;

fn table_exists(conn: &Connection, name: &str) -> bool {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .unwrap();
    count == 1
}

fn verify_schema(conn: &Connection) {
    assert!(table_exists(conn, "sale_waves"));
    assert!(table_exists(conn, "whitelist_entries"));
    assert!(table_exists(conn, "project_revisions"));
    assert!(table_exists(conn, "schema_version"));
}

#[test]
fn test_fresh_migration() {
    let file = NamedTempFile::new().unwrap();
    let conn = Connection::open(file.path()).unwrap();

    migrations::run_migrations(&conn).unwrap();

    verify_schema(&conn);
}

#[test]
fn test_migration_idempotency() {
    let file = NamedTempFile::new().unwrap();
    let conn = Connection::open(file.path()).unwrap();

    migrations::run_migrations(&conn).unwrap();
    migrations::run_migrations(&conn).unwrap();

    verify_schema(&conn);
}

#[test]
fn test_schema_version_tracking() {
    let file = NamedTempFile::new().unwrap();
    let conn = Connection::open(file.path()).unwrap();

    assert_eq!(migrations::get_schema_version(&conn).unwrap(), 0);
    migrations::run_migrations(&conn).unwrap();
    assert_eq!(migrations::get_schema_version(&conn).unwrap(), 2);
}

#[test]
fn test_sale_type_constraint() {
    let file = NamedTempFile::new().unwrap();
    let conn = Connection::open(file.path()).unwrap();
    migrations::run_migrations(&conn).unwrap();

    let result = conn.execute(
        r#"
        INSERT INTO sale_waves (
            project_id, position, identifier, enabled, start_time, end_time, mint_charge,
            max_mint_per_wallet, max_mint_in_sale, sale_type, token_gated_address
        ) VALUES ('p', 0, 'w', 1, 0, 0, '0', 1, 1, 'auction', '0x')
        "#,
        [],
    );
    assert!(result.is_err(), "Unknown sale type must be rejected");
}
