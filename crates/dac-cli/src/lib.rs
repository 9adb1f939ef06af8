//! # dac-cli: Command-Line Interface for the Disclosure Engine
//!
//! Provides the `dac` binary. The engine runs against in-memory adapters
//! loaded from JSON files:
//!
//! - an orderings file: a JSON array of
//!   `{"schema_version", "issuer", "ordering": [names...]}`;
//! - a ledger file: a JSON object mapping credential id to root hex,
//!   created on first commit and rewritten after each one;
//! - key files: hex-encoded 32-byte Ed25519 seeds (`.key`) and public keys
//!   (`.pub`), as written by `dac keygen`.
//!
//! ```bash
//! dac keygen --output keys --prefix registrar
//! dac commit --orderings orderings.json --ledger ledger.json --id alice-2024 alice.json
//! dac prove  --orderings orderings.json --ledger ledger.json --id alice-2024 \
//!            --fields name,grade alice.json --out proof.json
//! dac verify --orderings orderings.json --ledger ledger.json --id alice-2024 proof.json
//! ```
//!
//! Exit codes: 0 success, 1 error, 2 proof or signature rejected.

pub mod proof;
pub mod signing;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use dac_core::{Credential, CredentialId, FieldOrdering, Hash256};
use dac_crypto::{Ed25519PublicKey, SigningKeyHandle};
use dac_engine::{
    DisclosureEngine, EngineConfig, InMemoryKeyStore, InMemoryLedger, InMemoryOrderResolver,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Exit code for a verification that ran and rejected its input.
pub const EXIT_REJECTED: u8 = 2;

/// The engine over file-backed in-memory adapters.
pub type FileEngine = DisclosureEngine<InMemoryOrderResolver, InMemoryLedger, InMemoryKeyStore>;

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// Write pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn write_json<T: Serialize>(path: Option<&Path>, value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    match path {
        Some(path) => std::fs::write(path, rendered + "\n")
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}

/// Load a credential document.
pub fn load_credential(path: &Path) -> Result<Credential> {
    let value: serde_json::Value = read_json(path)?;
    Credential::from_json(&value)
        .with_context(|| format!("invalid credential in {}", path.display()))
}

/// Load every ordering from an orderings file.
pub fn load_orderings(path: &Path) -> Result<InMemoryOrderResolver> {
    let orderings: Vec<FieldOrdering> = read_json(path)?;
    let resolver = InMemoryOrderResolver::new();
    for ordering in orderings {
        if !resolver.publish(ordering.clone()) {
            anyhow::bail!(
                "{}: ordering for {}/{} listed twice",
                path.display(),
                ordering.issuer(),
                ordering.schema_version()
            );
        }
    }
    Ok(resolver)
}

/// Load the ledger file; a missing file is an empty ledger.
pub fn load_ledger(path: &Path) -> Result<InMemoryLedger> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "ledger file absent, starting empty");
        return Ok(InMemoryLedger::new());
    }
    let roots: BTreeMap<CredentialId, Hash256> = read_json(path)?;
    Ok(roots.into_iter().collect())
}

/// Persist every committed root.
pub fn save_ledger(path: &Path, ledger: &InMemoryLedger) -> Result<()> {
    let roots: BTreeMap<CredentialId, Hash256> = ledger.entries().into_iter().collect();
    write_json(Some(path), &roots)
}

/// Load a hex seed written by `dac keygen`.
pub fn load_signing_key(path: &Path) -> Result<SigningKeyHandle> {
    let hex = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read private key: {}", path.display()))?;
    SigningKeyHandle::from_seed_hex(&hex)
        .with_context(|| format!("invalid private key in {}", path.display()))
}

/// Load a hex public key written by `dac keygen`.
pub fn load_public_key(path: &Path) -> Result<Ed25519PublicKey> {
    let hex = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read public key: {}", path.display()))?;
    Ed25519PublicKey::from_hex(&hex)
        .with_context(|| format!("invalid public key in {}", path.display()))
}

/// Build an engine with timeouts from the environment.
pub fn file_engine(
    orderings: InMemoryOrderResolver,
    ledger: InMemoryLedger,
    keys: InMemoryKeyStore,
) -> Result<FileEngine> {
    let config = EngineConfig::from_env().context("invalid engine configuration")?;
    Ok(DisclosureEngine::new(orderings, ledger, keys, config))
}

/// Single-threaded runtime for one CLI invocation.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
