//! External collaborators
//!
//! Persistence and chain access sit behind these traits so the orchestrator can be driven
//! by SQLite and an RPC client in production and by in-memory fixtures in tests.

use crate::{Error, Result};
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use dropmint_core::SaleWaveConfig;
use dropmint_storage_sqlite::{Database, Repository};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

/// Project sale-wave persistence
#[async_trait]
pub trait WaveRepository: Send + Sync {
    /// Waves of `project_id` in saved order
    async fn load_sale_waves(&self, project_id: &str) -> Result<Vec<SaleWaveConfig>>;

    /// Stored whitelist limit of `wallet` in one wave
    async fn load_whitelist_limit(
        &self,
        project_id: &str,
        wave_identifier: &str,
        wallet: &Address,
    ) -> Result<Option<u64>>;

    /// Atomically replace every wave of `project_id`, returning the new sale-config root
    async fn replace_sale_waves(&self, project_id: &str, waves: &[SaleWaveConfig]) -> Result<B256>;
}

/// Read-only chain queries
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Units of `gating` ever transferred to `wallet` (monotonic)
    async fn received_count(&self, gating: &Address, wallet: &Address) -> Result<u64>;

    /// Units `wallet` already minted under `sale_identifier`
    async fn minted_count(&self, wallet: &Address, sale_identifier: &str) -> Result<u64>;

    /// Whether `gating` holds exactly one unit per token id
    async fn is_single_unit_collection(&self, gating: &Address) -> Result<bool>;
}

/// [`WaveRepository`] over a SQLite database
#[derive(Clone)]
pub struct SqliteWaveStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteWaveStore {
    /// Wrap an open database
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open (or create) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    async fn run_blocking<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&Database) -> dropmint_storage_sqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let join = tokio::task::spawn_blocking(move || {
            let guard = db.lock();
            task(&guard)
        });

        join.await
            .map_err(|e| Error::Provider(format!("Storage task join error: {}", e)))?
            .map_err(Error::from)
    }
}

#[async_trait]
impl WaveRepository for SqliteWaveStore {
    async fn load_sale_waves(&self, project_id: &str) -> Result<Vec<SaleWaveConfig>> {
        let project_id = project_id.to_string();
        self.run_blocking(move |db| Repository::new(db).load_sale_waves(&project_id))
            .await
    }

    async fn load_whitelist_limit(
        &self,
        project_id: &str,
        wave_identifier: &str,
        wallet: &Address,
    ) -> Result<Option<u64>> {
        let project_id = project_id.to_string();
        let wave_identifier = wave_identifier.to_string();
        let wallet = *wallet;
        self.run_blocking(move |db| {
            Repository::new(db).load_whitelist_limit(&project_id, &wave_identifier, &wallet)
        })
        .await
    }

    async fn replace_sale_waves(&self, project_id: &str, waves: &[SaleWaveConfig]) -> Result<B256> {
        let project_id = project_id.to_string();
        let waves = waves.to_vec();
        let revision = self
            .run_blocking(move |db| Repository::new(db).replace_sale_waves(&project_id, &waves))
            .await?;
        Ok(revision.sale_config_root)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use fixtures::{InMemoryWaveStore, StaticChainReader};

#[cfg(any(test, feature = "test-helpers"))]
mod fixtures {
    use super::*;
    use parking_lot::RwLock;
    use std::collections::{HashMap, HashSet};

    /// Waves held in memory
    #[derive(Default)]
    pub struct InMemoryWaveStore {
        projects: RwLock<HashMap<String, Vec<SaleWaveConfig>>>,
    }

    impl InMemoryWaveStore {
        /// Store seeded with one project
        pub fn with_project(project_id: &str, waves: Vec<SaleWaveConfig>) -> Self {
            let store = Self::default();
            store.projects.write().insert(project_id.to_string(), waves);
            store
        }
    }

    #[async_trait]
    impl WaveRepository for InMemoryWaveStore {
        async fn load_sale_waves(&self, project_id: &str) -> Result<Vec<SaleWaveConfig>> {
            Ok(self
                .projects
                .read()
                .get(project_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn load_whitelist_limit(
            &self,
            project_id: &str,
            wave_identifier: &str,
            wallet: &Address,
        ) -> Result<Option<u64>> {
            let projects = self.projects.read();
            Ok(projects
                .get(project_id)
                .and_then(|waves| waves.iter().find(|w| w.identifier == wave_identifier))
                .and_then(|wave| wave.whitelist.iter().find(|e| e.address == *wallet))
                .map(|entry| entry.limit))
        }

        async fn replace_sale_waves(
            &self,
            project_id: &str,
            waves: &[SaleWaveConfig],
        ) -> Result<B256> {
            let root = dropmint_core::get_sale_config_root(waves)?;
            self.projects
                .write()
                .insert(project_id.to_string(), waves.to_vec());
            Ok(root)
        }
    }

    /// Chain state fixed up front
    #[derive(Default)]
    pub struct StaticChainReader {
        received: HashMap<(Address, Address), u64>,
        minted: HashMap<(Address, String), u64>,
        single_unit: HashSet<Address>,
    }

    impl StaticChainReader {
        /// Record `count` units of `gating` received by `wallet`
        pub fn with_received(mut self, gating: Address, wallet: Address, count: u64) -> Self {
            self.received.insert((gating, wallet), count);
            self
        }

        /// Record `count` units minted by `wallet` in `sale_identifier`
        pub fn with_minted(mut self, wallet: Address, sale_identifier: &str, count: u64) -> Self {
            self.minted.insert((wallet, sale_identifier.to_string()), count);
            self
        }

        /// Mark `gating` as a single-unit collection
        pub fn with_single_unit(mut self, gating: Address) -> Self {
            self.single_unit.insert(gating);
            self
        }
    }

    #[async_trait]
    impl ChainReader for StaticChainReader {
        async fn received_count(&self, gating: &Address, wallet: &Address) -> Result<u64> {
            Ok(self.received.get(&(*gating, *wallet)).copied().unwrap_or(0))
        }

        async fn minted_count(&self, wallet: &Address, sale_identifier: &str) -> Result<u64> {
            Ok(self
                .minted
                .get(&(*wallet, sale_identifier.to_string()))
                .copied()
                .unwrap_or(0))
        }

        async fn is_single_unit_collection(&self, gating: &Address) -> Result<bool> {
            Ok(self.single_unit.contains(gating))
        }
    }
}
