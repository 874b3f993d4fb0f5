//! Bitcoin-layer orchestration for `did:btco` (§4.13): commit-reveal
//! inscription, transfer, front-running prevention, and batch inscription
//! with proportional fee splitting. Actual UTXO selection, PSBT
//! construction, and broadcast are delegated to an `OrdinalsProvider`.

pub mod batch;
pub mod manager;
pub mod validation;

pub use batch::{inscribe_batch, inscribe_batch_atomic, split_fee_proportionally, AtomicBatchResult, BatchItem, BatchManifest, BatchManifestEntry};
pub use manager::BitcoinManager;
