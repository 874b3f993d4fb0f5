pub mod btco;
pub mod driver;
pub mod peer;
pub mod resolver;
pub mod webvh;

pub use btco::{BtcoDriver, InscriptionSource};
pub use driver::DidDriver;
pub use peer::PeerDriver;
pub use resolver::{classify, DereferenceResult, DereferencedResource, ErrorKind, ResolutionMetadata, ResolutionResult, Resolver};
pub use webvh::{unsigned_entry, verify_log, LogEntry, WebvhDriver};
