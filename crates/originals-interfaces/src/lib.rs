//! Contracts for the external collaborators named in §1 and §6: a
//! content-addressed storage adapter, a Bitcoin ordinals provider, and a fee
//! oracle. The core never implements a concrete object store, node, or
//! indexer — it only defines the trait a caller's own implementation must
//! satisfy, plus in-memory/simulated doubles good enough to drive tests and
//! the SDK's demo binary.

pub mod fee_oracle;
pub mod ordinals;
pub mod storage;

pub use fee_oracle::{BoundedFallbackOracle, FeeOracle};
pub use ordinals::{Inscription, InscriptionRequest, InscriptionResult, OrdinalsProvider, SimulatedOrdinalsProvider, TransferRequest, TransferResult};
pub use storage::{FilesystemStorageAdapter, InMemoryStorageAdapter, StorageAdapter, StoredObject};
