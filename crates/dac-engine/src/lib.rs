//! # dac-engine: Disclosure Engine Service
//!
//! Wires the pure proof engine (`dac-crypto`) to its external dependencies:
//!
//! - **Ports** (`ports.rs`): field ordering source, root ledger and key
//!   store, each an async trait with `Send` futures.
//! - **Adapters** (`memory.rs`): in-memory implementations and a caching
//!   decorator for orderings.
//! - **Engine** (`engine.rs`): commit, prove, verify and attest flows with
//!   per-port timeouts, `tracing` events and `metrics` counters.
//! - **Config** (`config.rs`): timeouts from defaults or environment.
//!
//! ## Metrics
//!
//! `dac_roots_committed_total`, `dac_proofs_generated_total`,
//! `dac_verifications_total{outcome}`, `dac_attestations_total{subject}`.
//! No recorder is installed here; the embedding process chooses one.
//!
//! ## Logging
//!
//! Events carry credential ids, field names, indices, counts and hashes.
//! Undisclosed field values and key material are never logged.

pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod ports;

pub use config::{ConfigError, EngineConfig};
pub use engine::{DisclosureEngine, VerificationReport};
pub use error::{EngineError, KeyStoreError, LedgerError, OrderingError};
pub use memory::{CachingOrderResolver, InMemoryKeyStore, InMemoryLedger, InMemoryOrderResolver};
pub use ports::{KeyStore, OrderResolver, RootLedger};
