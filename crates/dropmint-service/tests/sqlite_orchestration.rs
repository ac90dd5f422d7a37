//! End-to-end orchestration over a SQLite file

use alloy_primitives::{Address, U256};
use dropmint_core::{
    get_sale_config_root, verify_proof, LocalKeyStore, MintAuthorizer, SaleWaveConfig,
    WhitelistEntry, WhitelistTree,
};
use dropmint_service::{
    MintOrchestrator, SaleWaveService, SqliteWaveStore, StaticChainReader, WaveRepository,
};
use std::sync::Arc;
use tempfile::NamedTempFile;

const NOW: u64 = 1_700_000_000;

fn project_waves(holder: Address) -> Vec<SaleWaveConfig> {
    vec![
        SaleWaveConfig::test_private(
            "presale",
            NOW - 1_000,
            NOW - 1,
            vec![WhitelistEntry::new(holder, 2)],
        ),
        SaleWaveConfig::test_private(
            "allowlist",
            NOW,
            NOW + 1_000,
            vec![
                WhitelistEntry::new(holder, 5),
                WhitelistEntry::new(Address::repeat_byte(0x10), 1),
                WhitelistEntry::new(Address::repeat_byte(0x20), 1),
            ],
        ),
        SaleWaveConfig::test_public("public", NOW + 1_001, 0, "0.01"),
    ]
}

#[tokio::test]
async fn test_save_then_prepare_mint() {
    let file = NamedTempFile::new().unwrap();
    let holder = Address::repeat_byte(0x55);
    let waves = project_waves(holder);

    let store: Arc<dyn WaveRepository> = Arc::new(SqliteWaveStore::open(file.path()).unwrap());
    let root = SaleWaveService::new(Arc::clone(&store))
        .save_sale_waves("drop", &waves)
        .await
        .unwrap();
    assert_eq!(root, get_sale_config_root(&waves).unwrap());

    let orchestrator = MintOrchestrator::new(
        store,
        Arc::new(StaticChainReader::default()),
        MintAuthorizer::new(Arc::new(LocalKeyStore::random())),
    );

    let bundle = orchestrator
        .prepare_mint_at("drop", holder, 4, NOW)
        .await
        .unwrap();

    assert_eq!(bundle.sale_config.identifier, "allowlist");
    assert_eq!(bundle.whitelist_mint_limit, 5);
    assert_eq!(
        bundle.mint_charge_total,
        U256::from(200_000_000_000_000_000u64)
    );
    assert!(WhitelistTree::build(&waves[1].whitelist)
        .verify(&WhitelistEntry::new(holder, 5), &bundle.whitelist_proof));
    assert!(verify_proof(
        bundle.sale_config.leaf_hash(),
        &bundle.sale_config_proof,
        root
    ));
}

#[tokio::test]
async fn test_resave_discards_old_waves() {
    let file = NamedTempFile::new().unwrap();
    let holder = Address::repeat_byte(0x55);

    let store: Arc<dyn WaveRepository> = Arc::new(SqliteWaveStore::open(file.path()).unwrap());
    let service = SaleWaveService::new(Arc::clone(&store));
    service
        .save_sale_waves("drop", &project_waves(holder))
        .await
        .unwrap();

    let replacement = vec![SaleWaveConfig::test_public("only", 0, 0, "0")];
    let root = service.save_sale_waves("drop", &replacement).await.unwrap();

    assert_eq!(service.sale_config_root("drop").await.unwrap(), root);
    assert_eq!(store.load_sale_waves("drop").await.unwrap(), replacement);
    assert!(service.sale_config_proof("drop", "allowlist").await.is_err());
}
