//! Dropmint service
//!
//! Async orchestration over the commitment core: mint preparation, project wave saving and
//! the collaborator traits for persistence and chain reads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod commitments;
pub mod error;
pub mod orchestrator;
pub mod providers;

pub use commitments::SaleWaveService;
pub use error::{Error, Result};
pub use orchestrator::{
    ownership_message, MintBundle, MintOrchestrator, TokenGatedMintRequest, OWNERSHIP_WINDOW_SECS,
};
pub use providers::{ChainReader, SqliteWaveStore, WaveRepository};

#[cfg(any(test, feature = "test-helpers"))]
pub use providers::{InMemoryWaveStore, StaticChainReader};

pub use dropmint_core::{get_sale_config_proof, get_sale_config_root, get_whitelist_proof};
