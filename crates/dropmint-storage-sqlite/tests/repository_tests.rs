//! Repository persistence tests
//!
//! Saves waves through one connection and reads them back through another.

use alloy_primitives::Address;
use dropmint_core::{get_sale_config_root, SaleWaveConfig, WhitelistEntry};
use dropmint_storage_sqlite::{Database, Repository};
use tempfile::NamedTempFile;

fn waves() -> Vec<SaleWaveConfig> {
    vec![
        SaleWaveConfig::test_private(
            "presale",
            1_000,
            1_999,
            vec![
                WhitelistEntry::new(Address::repeat_byte(0x11), 4),
                WhitelistEntry::new(Address::repeat_byte(0x22), 1),
            ],
        ),
        SaleWaveConfig {
            token_gated_address: Address::repeat_byte(0x77),
            ..SaleWaveConfig::test_public("holders", 2_000, 2_999, "0")
        },
        SaleWaveConfig::test_public("public", 3_000, 0, "0.01"),
    ]
}

#[test]
fn test_waves_survive_reopen() {
    let file = NamedTempFile::new().unwrap();
    let saved = waves();

    {
        let db = Database::open(file.path()).unwrap();
        Repository::new(&db).replace_sale_waves("drop", &saved).unwrap();
    }

    let db = Database::open(file.path()).unwrap();
    let repo = Repository::new(&db);
    let loaded = repo.load_sale_waves("drop").unwrap();

    assert_eq!(loaded, saved);
    assert_eq!(
        get_sale_config_root(&loaded).unwrap(),
        get_sale_config_root(&saved).unwrap()
    );
    assert_eq!(
        repo.latest_revision("drop").unwrap().unwrap().sale_config_root,
        get_sale_config_root(&saved).unwrap()
    );
}

#[test]
fn test_revisions_accumulate() {
    let file = NamedTempFile::new().unwrap();
    let db = Database::open(file.path()).unwrap();
    let repo = Repository::new(&db);

    let first = repo.replace_sale_waves("drop", &waves()).unwrap();
    let second = repo.replace_sale_waves("drop", &waves()[1..]).unwrap();

    assert_eq!(first.revision, 1);
    assert_eq!(second.revision, 2);
    assert_ne!(first.sale_config_root, second.sale_config_root);
    assert_eq!(repo.latest_revision("drop").unwrap().unwrap(), second);
}
