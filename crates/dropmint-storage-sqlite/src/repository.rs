//! Sale wave repository with retry/backoff for SQLITE_BUSY
//!
//! A project's waves are always written as a whole: the old set is deleted and the new
//! one inserted inside a single transaction, so readers never observe a mix of the two.
//! Every save appends a revision row carrying the sale-config root of the saved set.

use crate::{Database, Error, Result};
use alloy_primitives::{Address, B256};
use dropmint_core::{parse_address, SaleType, SaleWaveConfig, WhitelistEntry};
use rusqlite::{params, ErrorCode, OptionalExtension};
use std::collections::HashSet;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

/// Maximum retry attempts for SQLITE_BUSY
pub const MAX_BUSY_RETRIES: u32 = 5;

/// Base backoff duration in milliseconds
pub const BASE_BACKOFF_MS: u64 = 50;

/// Maximum backoff duration in milliseconds
pub const MAX_BACKOFF_MS: u64 = 1000;

/// One recorded save of a project's waves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRevision {
    /// Project the waves belong to
    pub project_id: String,
    /// Monotonic per project, starting at 1
    pub revision: u64,
    /// Sale-config root of the saved set
    pub sale_config_root: B256,
    /// Number of waves saved
    pub wave_count: u64,
    /// Save timestamp (RFC 3339)
    pub saved_at: String,
}

/// Sale wave storage operations
pub struct Repository<'a> {
    db: &'a Database,
}

impl<'a> Repository<'a> {
    /// Create new repository
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Replace every wave of `project_id` with `waves`.
    ///
    /// Waves are validated first; nothing is written if any of them is rejected.
    pub fn replace_sale_waves(
        &self,
        project_id: &str,
        waves: &[SaleWaveConfig],
    ) -> Result<ProjectRevision> {
        let mut identifiers = HashSet::new();
        for wave in waves {
            wave.validate()?;
            if !identifiers.insert(wave.identifier.as_str()) {
                return Err(dropmint_core::Error::Validation(format!(
                    "Duplicate wave identifier {}",
                    wave.identifier
                ))
                .into());
            }
        }
        let sale_config_root = dropmint_core::get_sale_config_root(waves)?;

        let revision = self.with_retry(|| {
            let tx = self.db.conn().unchecked_transaction()?;

            tx.execute("DELETE FROM sale_waves WHERE project_id = ?1", [project_id])?;

            for (position, wave) in waves.iter().enumerate() {
                tx.execute(
                    r#"
                    INSERT INTO sale_waves (
                        project_id, position, identifier, enabled, start_time, end_time,
                        mint_charge, max_mint_per_wallet, max_mint_in_sale, sale_type,
                        token_gated_address
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    "#,
                    params![
                        project_id,
                        position as i64,
                        wave.identifier,
                        wave.enabled,
                        to_sql_int(wave.start_time, "start_time")?,
                        to_sql_int(wave.end_time, "end_time")?,
                        wave.mint_charge,
                        to_sql_int(wave.max_mint_per_wallet, "max_mint_per_wallet")?,
                        to_sql_int(wave.max_mint_in_sale, "max_mint_in_sale")?,
                        wave.sale_type.as_str(),
                        address_to_text(&wave.token_gated_address),
                    ],
                )?;

                for entry in &wave.whitelist {
                    tx.execute(
                        r#"
                        INSERT INTO whitelist_entries (project_id, wave_identifier, address, mint_limit)
                        VALUES (?1, ?2, ?3, ?4)
                        "#,
                        params![
                            project_id,
                            wave.identifier,
                            address_to_text(&entry.address),
                            to_sql_int(entry.limit, "limit")?,
                        ],
                    )?;
                }
            }

            let next: i64 = tx.query_row(
                "SELECT COALESCE(MAX(revision), 0) + 1 FROM project_revisions WHERE project_id = ?1",
                [project_id],
                |row| row.get(0),
            )?;
            let saved_at = chrono::Utc::now().to_rfc3339();

            tx.execute(
                r#"
                INSERT INTO project_revisions (project_id, revision, sale_config_root, wave_count, saved_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    project_id,
                    next,
                    format!("{:?}", sale_config_root),
                    waves.len() as i64,
                    saved_at,
                ],
            )?;

            tx.commit()?;

            Ok(ProjectRevision {
                project_id: project_id.to_string(),
                revision: next as u64,
                sale_config_root,
                wave_count: waves.len() as u64,
                saved_at,
            })
        })?;

        tracing::info!(
            "Saved {} waves for project {} (revision {}, root {:?})",
            revision.wave_count,
            project_id,
            revision.revision,
            revision.sale_config_root
        );
        Ok(revision)
    }

    /// Load the waves of `project_id` in the order they were saved
    pub fn load_sale_waves(&self, project_id: &str) -> Result<Vec<SaleWaveConfig>> {
        self.with_retry(|| {
            let conn = self.db.conn();
            let mut stmt = conn.prepare(
                r#"
                SELECT identifier, enabled, start_time, end_time, mint_charge,
                       max_mint_per_wallet, max_mint_in_sale, sale_type, token_gated_address
                FROM sale_waves
                WHERE project_id = ?1
                ORDER BY position
                "#,
            )?;

            let rows = stmt
                .query_map([project_id], |row| {
                    Ok(WaveRow {
                        identifier: row.get(0)?,
                        enabled: row.get(1)?,
                        start_time: row.get(2)?,
                        end_time: row.get(3)?,
                        mint_charge: row.get(4)?,
                        max_mint_per_wallet: row.get(5)?,
                        max_mint_in_sale: row.get(6)?,
                        sale_type: row.get(7)?,
                        token_gated_address: row.get(8)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut waves = Vec::with_capacity(rows.len());
            for row in rows {
                let whitelist = self.load_whitelist(project_id, &row.identifier)?;
                waves.push(row.into_wave(whitelist)?);
            }
            Ok(waves)
        })
    }

    /// Mint limit of `wallet` in wave `wave_identifier`, if whitelisted
    pub fn load_whitelist_limit(
        &self,
        project_id: &str,
        wave_identifier: &str,
        wallet: &Address,
    ) -> Result<Option<u64>> {
        self.with_retry(|| {
            let limit: Option<i64> = self
                .db
                .conn()
                .query_row(
                    r#"
                    SELECT mint_limit FROM whitelist_entries
                    WHERE project_id = ?1 AND wave_identifier = ?2 AND address = ?3
                    "#,
                    params![project_id, wave_identifier, address_to_text(wallet)],
                    |row| row.get(0),
                )
                .optional()?;

            limit.map(|v| from_sql_int(v, "mint_limit")).transpose()
        })
    }

    /// Number of waves stored for `project_id`
    pub fn count_sale_waves(&self, project_id: &str) -> Result<u64> {
        self.with_retry(|| {
            let count: i64 = self.db.conn().query_row(
                "SELECT COUNT(*) FROM sale_waves WHERE project_id = ?1",
                [project_id],
                |row| row.get(0),
            )?;
            from_sql_int(count, "count")
        })
    }

    /// Most recent save of `project_id`
    pub fn latest_revision(&self, project_id: &str) -> Result<Option<ProjectRevision>> {
        self.with_retry(|| {
            let row = self
                .db
                .conn()
                .query_row(
                    r#"
                    SELECT revision, sale_config_root, wave_count, saved_at
                    FROM project_revisions
                    WHERE project_id = ?1
                    ORDER BY revision DESC
                    LIMIT 1
                    "#,
                    [project_id],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()?;

            let Some((revision, root, wave_count, saved_at)) = row else {
                return Ok(None);
            };

            let sale_config_root = B256::from_str(&root)
                .map_err(|e| Error::Corrupt(format!("Revision root {}: {}", root, e)))?;

            Ok(Some(ProjectRevision {
                project_id: project_id.to_string(),
                revision: from_sql_int(revision, "revision")?,
                sale_config_root,
                wave_count: from_sql_int(wave_count, "wave_count")?,
                saved_at,
            }))
        })
    }

    fn load_whitelist(&self, project_id: &str, wave_identifier: &str) -> Result<Vec<WhitelistEntry>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            r#"
            SELECT address, mint_limit FROM whitelist_entries
            WHERE project_id = ?1 AND wave_identifier = ?2
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt
            .query_map([project_id, wave_identifier], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(address, limit)| {
                let address = parse_address(&address)
                    .map_err(|e| Error::Corrupt(format!("Whitelist address: {}", e)))?;
                Ok(WhitelistEntry::new(address, from_sql_int(limit, "mint_limit")?))
            })
            .collect()
    }

    /// Execute with retry logic for SQLITE_BUSY
    fn with_retry<F, T>(&self, mut f: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempts = 0;

        loop {
            match f() {
                Ok(result) => return Ok(result),
                Err(Error::Database(ref e)) if is_busy_error(e) && attempts < MAX_BUSY_RETRIES => {
                    attempts += 1;
                    let backoff = calculate_backoff(attempts);
                    tracing::debug!(
                        "SQLITE_BUSY (attempt {}/{}), retrying in {}ms",
                        attempts,
                        MAX_BUSY_RETRIES,
                        backoff
                    );
                    thread::sleep(Duration::from_millis(backoff));
                }
                Err(e) => return Err(e),
            }
        }
    }
}

struct WaveRow {
    identifier: String,
    enabled: bool,
    start_time: i64,
    end_time: i64,
    mint_charge: String,
    max_mint_per_wallet: i64,
    max_mint_in_sale: i64,
    sale_type: String,
    token_gated_address: String,
}

impl WaveRow {
    fn into_wave(self, whitelist: Vec<WhitelistEntry>) -> Result<SaleWaveConfig> {
        let sale_type = SaleType::parse(&self.sale_type)
            .map_err(|e| Error::Corrupt(format!("Wave {}: {}", self.identifier, e)))?;
        let token_gated_address = parse_address(&self.token_gated_address)
            .map_err(|e| Error::Corrupt(format!("Wave {}: {}", self.identifier, e)))?;

        Ok(SaleWaveConfig {
            enabled: self.enabled,
            start_time: from_sql_int(self.start_time, "start_time")?,
            end_time: from_sql_int(self.end_time, "end_time")?,
            mint_charge: self.mint_charge,
            max_mint_per_wallet: from_sql_int(self.max_mint_per_wallet, "max_mint_per_wallet")?,
            max_mint_in_sale: from_sql_int(self.max_mint_in_sale, "max_mint_in_sale")?,
            sale_type,
            whitelist,
            token_gated_address,
            identifier: self.identifier,
        })
    }
}

/// Lowercase 0x-hex form used in every address column
fn address_to_text(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

fn to_sql_int(value: u64, field: &str) -> Result<i64> {
    i64::try_from(value).map_err(|_| {
        dropmint_core::Error::Validation(format!("{} {} is out of range", field, value)).into()
    })
}

fn from_sql_int(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::Corrupt(format!("Negative {}: {}", field, value)))
}

/// Check if error is SQLITE_BUSY
fn is_busy_error(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: ErrorCode::DatabaseBusy,
                ..
            },
            _
        )
    )
}

/// Calculate exponential backoff with jitter
fn calculate_backoff(attempt: u32) -> u64 {
    let base = BASE_BACKOFF_MS * (1 << attempt.min(6));
    let jitter = rand::random::<u64>() % (base / 4 + 1);
    (base + jitter).min(MAX_BACKOFF_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropmint_core::EMPTY_ROOT;

    fn project_waves() -> Vec<SaleWaveConfig> {
        vec![
            SaleWaveConfig::test_private(
                "presale",
                100,
                199,
                vec![
                    WhitelistEntry::new(Address::repeat_byte(0xAB), 2),
                    WhitelistEntry::new(Address::repeat_byte(0x01), 3),
                ],
            ),
            SaleWaveConfig::test_public("public", 200, 0, "0.01"),
        ]
    }

    #[test]
    fn test_replace_and_load_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let repo = Repository::new(&db);
        let waves = project_waves();

        let revision = repo.replace_sale_waves("p1", &waves).unwrap();
        assert_eq!(revision.revision, 1);
        assert_eq!(revision.wave_count, 2);
        assert_eq!(
            revision.sale_config_root,
            dropmint_core::get_sale_config_root(&waves).unwrap()
        );

        let loaded = repo.load_sale_waves("p1").unwrap();
        assert_eq!(loaded, waves);
    }

    #[test]
    fn test_replace_removes_old_waves() {
        let db = Database::open_in_memory().unwrap();
        let repo = Repository::new(&db);

        repo.replace_sale_waves("p1", &project_waves()).unwrap();
        let replacement = vec![SaleWaveConfig::test_public("only", 0, 0, "0")];
        let revision = repo.replace_sale_waves("p1", &replacement).unwrap();

        assert_eq!(revision.revision, 2);
        assert_eq!(repo.count_sale_waves("p1").unwrap(), 1);
        assert_eq!(repo.load_sale_waves("p1").unwrap(), replacement);
        assert_eq!(
            repo.load_whitelist_limit("p1", "presale", &Address::repeat_byte(0xAB))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_projects_are_isolated() {
        let db = Database::open_in_memory().unwrap();
        let repo = Repository::new(&db);

        repo.replace_sale_waves("p1", &project_waves()).unwrap();
        repo.replace_sale_waves("p2", &[]).unwrap();

        assert_eq!(repo.count_sale_waves("p1").unwrap(), 2);
        assert!(repo.load_sale_waves("p2").unwrap().is_empty());
        assert_eq!(
            repo.latest_revision("p2").unwrap().unwrap().sale_config_root,
            EMPTY_ROOT
        );
        assert!(repo.latest_revision("p3").unwrap().is_none());
    }

    #[test]
    fn test_whitelist_limit_lookup() {
        let db = Database::open_in_memory().unwrap();
        let repo = Repository::new(&db);
        repo.replace_sale_waves("p1", &project_waves()).unwrap();

        assert_eq!(
            repo.load_whitelist_limit("p1", "presale", &Address::repeat_byte(0xAB))
                .unwrap(),
            Some(2)
        );
        assert_eq!(
            repo.load_whitelist_limit("p1", "presale", &Address::repeat_byte(0x02))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_invalid_set_is_not_written() {
        let db = Database::open_in_memory().unwrap();
        let repo = Repository::new(&db);
        repo.replace_sale_waves("p1", &project_waves()).unwrap();

        let duplicate = vec![
            SaleWaveConfig::test_public("dup", 0, 0, "0"),
            SaleWaveConfig::test_public("dup", 10, 0, "0"),
        ];
        let result = repo.replace_sale_waves("p1", &duplicate);
        assert!(matches!(result, Err(Error::Validation(_))));

        let bad_charge = vec![SaleWaveConfig::test_public("x", 0, 0, "lots")];
        assert!(repo.replace_sale_waves("p1", &bad_charge).is_err());

        assert_eq!(repo.count_sale_waves("p1").unwrap(), 2);
        assert_eq!(repo.latest_revision("p1").unwrap().unwrap().revision, 1);
    }

    #[test]
    fn test_out_of_range_integer_rejected() {
        let db = Database::open_in_memory().unwrap();
        let repo = Repository::new(&db);
        let wave = SaleWaveConfig {
            max_mint_in_sale: u64::MAX,
            ..SaleWaveConfig::test_public("big", 0, 0, "0")
        };
        assert!(matches!(
            repo.replace_sale_waves("p1", &[wave]),
            Err(Error::Validation(_))
        ));
        assert_eq!(repo.count_sale_waves("p1").unwrap(), 0);
    }

    #[test]
    fn test_calculate_backoff() {
        let b1 = calculate_backoff(1);
        let b3 = calculate_backoff(3);

        assert!(b1 >= BASE_BACKOFF_MS * 2);
        assert!(b3 >= BASE_BACKOFF_MS * 8);
        assert!(calculate_backoff(10) <= MAX_BACKOFF_MS);
    }
}
