//! InternSight Storage Library
//!
//! Local persistence for the reporting session: a private staging area for
//! signature files and the durable key-value store holding the bearer token
//! and session identifiers.
//!
//! Signature files live under `<root>/internsight/assets/tanda_tangan/` and
//! are named `signature_<timestamp>.png`. The directory tree is created
//! lazily and idempotently before the first write.

pub mod session;
pub mod signatures;

pub use session::{JsonFileSessionStore, MemorySessionStore, SessionStore};
pub use signatures::{AssetStoreError, AssetStoreResult, SignatureStore};
