//! # Signing Subcommands
//!
//! Ed25519 key generation, root attestation and offline attestation
//! checks. Private keys are stored as hex-encoded 32-byte seeds and are
//! never printed.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use dac_core::{CredentialId, Hash256, SignerId};
use dac_crypto::{Attestation, SigningKeyHandle};
use dac_engine::{InMemoryKeyStore, InMemoryOrderResolver};
use dac_vc::AttestedDisclosure;

use crate::{
    file_engine, load_ledger, load_public_key, load_signing_key, read_json, runtime, write_json,
    EXIT_REJECTED,
};

/// Arguments for `dac keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output directory for the key files.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,

    /// Prefix for the key filenames.
    #[arg(long, default_value = "issuer")]
    pub prefix: String,
}

/// Arguments for `dac attest-root`.
#[derive(Args, Debug)]
pub struct AttestRootArgs {
    /// JSON ledger of committed roots.
    #[arg(long, default_value = "ledger.json")]
    pub ledger: PathBuf,

    /// Credential whose committed root is signed.
    #[arg(long)]
    pub id: String,

    /// Private key file (hex-encoded seed).
    #[arg(long)]
    pub key: PathBuf,

    /// Signer identity recorded in the attestation.
    #[arg(long)]
    pub signer: String,

    /// Write the attestation here instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Arguments for `dac verify-attestation`.
#[derive(Args, Debug)]
pub struct VerifyAttestationArgs {
    /// Root attestation (with `--root`) or attested disclosure proof.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Root (hex) the attestation should cover.
    #[arg(long)]
    pub root: Option<String>,

    /// Expected signer public key file.
    #[arg(long)]
    pub pubkey: Option<PathBuf>,
}

/// Generate a new Ed25519 key and write `<prefix>.key` / `<prefix>.pub`.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let output_dir = args.output.as_path();
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let key = SigningKeyHandle::generate();
    let pk_hex = key.public_key().to_hex();

    let key_path = output_dir.join(format!("{}.key", args.prefix));
    let pub_path = output_dir.join(format!("{}.pub", args.prefix));
    if key_path.exists() {
        bail!("refusing to overwrite existing key: {}", key_path.display());
    }

    std::fs::write(&key_path, key.seed_hex())
        .with_context(|| format!("failed to write private key: {}", key_path.display()))?;
    std::fs::write(&pub_path, &pk_hex)
        .with_context(|| format!("failed to write public key: {}", pub_path.display()))?;

    println!("OK: generated Ed25519 key");
    println!("  Private key: {}", key_path.display());
    println!("  Public key:  {}", pub_path.display());
    println!("  Public key (hex): {pk_hex}");
    Ok(0)
}

/// Sign a credential's committed root.
pub fn run_attest_root(args: &AttestRootArgs) -> Result<u8> {
    let id = CredentialId::new(args.id.as_str())?;
    let signer = SignerId::new(args.signer.as_str())?;
    let keys = InMemoryKeyStore::new();
    keys.insert(signer.clone(), load_signing_key(&args.key)?);

    let engine = file_engine(InMemoryOrderResolver::new(), load_ledger(&args.ledger)?, keys)?;
    let attestation = runtime()?
        .block_on(engine.attest_root(&id, &signer))
        .with_context(|| format!("failed to attest root of {id}"))?;
    write_json(args.out.as_deref(), &attestation)?;
    Ok(0)
}

/// Check an attestation without consulting the ledger.
pub fn run_verify_attestation(args: &VerifyAttestationArgs) -> Result<u8> {
    let expected = args.pubkey.as_deref().map(load_public_key).transpose()?;
    let outcome = match &args.root {
        Some(root_hex) => {
            let root = Hash256::from_hex(root_hex).context("invalid --root")?;
            let attestation: Attestation = read_json(&args.file)?;
            match &expected {
                Some(pk) => attestation.verify_with_key(root.as_bytes(), pk),
                None => attestation.verify(root.as_bytes()),
            }
            .map_err(|e| e.to_string())
        }
        None => {
            let attested = load_attested(&args.file)?;
            match &expected {
                Some(pk) => attested.verify_attestation_with_key(pk),
                None => attested.verify_attestation(),
            }
            .map_err(|e| e.to_string())
        }
    };

    match outcome {
        Ok(()) => {
            println!("OK: attestation verified");
            Ok(0)
        }
        Err(reason) => {
            println!("REJECTED: {reason}");
            Ok(EXIT_REJECTED)
        }
    }
}

fn load_attested(path: &Path) -> Result<AttestedDisclosure> {
    read_json(path).with_context(|| {
        format!(
            "{} is not an attested disclosure; pass --root for a root attestation",
            path.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dac_core::message_digest;

    #[test]
    fn test_keygen_writes_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        let args = KeygenArgs {
            output: dir.path().to_path_buf(),
            prefix: "registrar".into(),
        };
        assert_eq!(run_keygen(&args).unwrap(), 0);
        let key = load_signing_key(&dir.path().join("registrar.key")).unwrap();
        let pk = load_public_key(&dir.path().join("registrar.pub")).unwrap();
        assert_eq!(key.public_key(), pk);

        assert!(run_keygen(&args).is_err(), "must not overwrite a key");
    }

    #[test]
    fn test_verify_root_attestation_file() {
        let dir = tempfile::tempdir().unwrap();
        let key = SigningKeyHandle::from_seed(&[4u8; 32]);
        let root = message_digest(b"committed root");
        let attestation =
            Attestation::sign_root(&root, SignerId::new("registrar").unwrap(), &key).unwrap();
        let path = dir.path().join("att.json");
        write_json(Some(&path), &attestation).unwrap();

        let good = VerifyAttestationArgs {
            file: path.clone(),
            root: Some(root.to_hex()),
            pubkey: None,
        };
        assert_eq!(run_verify_attestation(&good).unwrap(), 0);

        let other = VerifyAttestationArgs {
            file: path,
            root: Some(message_digest(b"other").to_hex()),
            pubkey: None,
        };
        assert_eq!(run_verify_attestation(&other).unwrap(), EXIT_REJECTED);
    }
}
