//! The cryptographic event log (§3, §4.10, §4.11): append-only, hash-chained,
//! the single source of truth an `OriginalsAsset` is replayed from.

pub mod engine;
pub mod event;
pub mod storage;

pub use engine::{replay, CelEngine};
pub use event::{verify_chain, CelEvent, CelEventBody};
pub use storage::{CelStore, FilesystemStore, InMemoryStore};
