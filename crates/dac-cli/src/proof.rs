//! # Proof Subcommands
//!
//! `root`, `commit`, `prove` and `verify`: the credential lifecycle from
//! root commitment to verification of a selective disclosure.
//!
//! Disclosed values are written to the proof file only. Nothing printed to
//! the terminal or logged contains undisclosed field values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use dac_core::{CredentialId, SignerId};
use dac_engine::{InMemoryKeyStore, InMemoryLedger, VerificationReport};
use dac_vc::{AttestedDisclosure, DisclosureProof};

use crate::{
    file_engine, load_credential, load_ledger, load_orderings, load_public_key, load_signing_key,
    read_json, runtime, save_ledger, write_json, EXIT_REJECTED,
};

/// Files backing the ordering source and the ledger.
#[derive(Args, Debug, Clone)]
pub struct EngineFiles {
    /// JSON array of field orderings.
    #[arg(long)]
    pub orderings: PathBuf,

    /// JSON ledger of committed roots (created on first commit).
    #[arg(long, default_value = "ledger.json")]
    pub ledger: PathBuf,
}

/// Arguments for `dac root`.
#[derive(Args, Debug)]
pub struct RootArgs {
    /// JSON array of field orderings.
    #[arg(long)]
    pub orderings: PathBuf,

    /// Credential document.
    #[arg(value_name = "CREDENTIAL")]
    pub credential: PathBuf,
}

/// Arguments for `dac commit`.
#[derive(Args, Debug)]
pub struct CommitArgs {
    #[command(flatten)]
    pub files: EngineFiles,

    /// Credential identifier on the ledger.
    #[arg(long)]
    pub id: String,

    /// Credential document.
    #[arg(value_name = "CREDENTIAL")]
    pub credential: PathBuf,
}

/// Arguments for `dac prove`.
#[derive(Args, Debug)]
pub struct ProveArgs {
    #[command(flatten)]
    pub files: EngineFiles,

    /// Credential identifier on the ledger.
    #[arg(long)]
    pub id: String,

    /// Field names to disclose (comma-separated).
    #[arg(long, value_delimiter = ',', required = true)]
    pub fields: Vec<String>,

    /// Attest the proof with this private key file.
    #[arg(long, requires = "signer")]
    pub key: Option<PathBuf>,

    /// Signer identity recorded in the attestation.
    #[arg(long, requires = "key")]
    pub signer: Option<String>,

    /// Write the proof here instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Credential document.
    #[arg(value_name = "CREDENTIAL")]
    pub credential: PathBuf,
}

/// Arguments for `dac verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub files: EngineFiles,

    /// Credential identifier the proof is presented for.
    #[arg(long)]
    pub id: String,

    /// Public key file of the expected signer. Required for attested
    /// proofs; a plain proof is rejected when it is given.
    #[arg(long)]
    pub pubkey: Option<PathBuf>,

    /// Disclosure proof or attested disclosure.
    #[arg(value_name = "PROOF")]
    pub proof: PathBuf,
}

/// Print a credential's root without committing it.
pub fn run_root(args: &RootArgs) -> Result<u8> {
    let credential = load_credential(&args.credential)?;
    let engine = file_engine(
        load_orderings(&args.orderings)?,
        InMemoryLedger::new(),
        InMemoryKeyStore::new(),
    )?;
    let root = runtime()?.block_on(engine.compute_root(&credential))?;
    println!("{root}");
    Ok(0)
}

/// Commit a credential's root to the ledger file.
pub fn run_commit(args: &CommitArgs) -> Result<u8> {
    let id = CredentialId::new(args.id.as_str())?;
    let credential = load_credential(&args.credential)?;
    let engine = file_engine(
        load_orderings(&args.files.orderings)?,
        load_ledger(&args.files.ledger)?,
        InMemoryKeyStore::new(),
    )?;
    let root = runtime()?
        .block_on(engine.build_and_commit(&id, &credential))
        .with_context(|| format!("failed to commit credential {id}"))?;
    save_ledger(&args.files.ledger, engine.ledger())?;

    println!("OK: committed {id}");
    println!("  Root: {root}");
    Ok(0)
}

/// Produce a disclosure proof, attested when a key is given.
pub fn run_prove(args: &ProveArgs) -> Result<u8> {
    let id = CredentialId::new(args.id.as_str())?;
    let credential = load_credential(&args.credential)?;
    let keys = InMemoryKeyStore::new();
    let signer = match (&args.key, &args.signer) {
        (Some(key), Some(signer)) => {
            let signer = SignerId::new(signer.as_str())?;
            keys.insert(signer.clone(), load_signing_key(key)?);
            Some(signer)
        }
        _ => None,
    };
    let engine = file_engine(
        load_orderings(&args.files.orderings)?,
        load_ledger(&args.files.ledger)?,
        keys,
    )?;
    let rt = runtime()?;
    let out = args.out.as_deref();

    match signer {
        Some(signer) => {
            let attested = rt
                .block_on(engine.create_attested_disclosure(&id, &credential, &args.fields, &signer))
                .with_context(|| format!("failed to prove credential {id}"))?;
            write_json(out, &attested)?;
        }
        None => {
            let proof = rt
                .block_on(engine.create_disclosure_proof(&id, &credential, &args.fields))
                .with_context(|| format!("failed to prove credential {id}"))?;
            write_json(out, &proof)?;
        }
    }
    if let Some(path) = out {
        eprintln!("OK: wrote proof for {} field(s) to {}", args.fields.len(), path.display());
    }
    Ok(0)
}

/// Verify a proof file against the ledger.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let id = CredentialId::new(args.id.as_str())?;
    let engine = file_engine(
        load_orderings(&args.files.orderings)?,
        load_ledger(&args.files.ledger)?,
        InMemoryKeyStore::new(),
    )?;
    let rt = runtime()?;

    let report = match load_presentation(&args.proof)? {
        Presentation::Attested(attested) => {
            let Some(pubkey) = &args.pubkey else {
                return Ok(report_outcome(&VerificationReport::rejected(
                    "attested proof needs --pubkey to identify its signer",
                )));
            };
            let expected = load_public_key(pubkey)?;
            if let Err(e) = attested.verify_attestation_with_key(&expected) {
                return Ok(report_outcome(&VerificationReport::rejected(format!(
                    "attestation invalid for signer {}: {e}",
                    attested.attestation.signer
                ))));
            }
            rt.block_on(engine.verify_disclosure(&id, &attested.proof))?
        }
        Presentation::Plain(proof) => {
            if args.pubkey.is_some() {
                return Ok(report_outcome(&VerificationReport::rejected(
                    "proof carries no attestation",
                )));
            }
            rt.block_on(engine.verify_disclosure(&id, &proof))?
        }
    };
    Ok(report_outcome(&report))
}

enum Presentation {
    Plain(DisclosureProof),
    Attested(AttestedDisclosure),
}

fn load_presentation(path: &Path) -> Result<Presentation> {
    let value: serde_json::Value = read_json(path)?;
    let parsed = if value.get("attestation").is_some() {
        serde_json::from_value(value).map(Presentation::Attested)
    } else {
        serde_json::from_value(value).map(Presentation::Plain)
    };
    parsed.with_context(|| format!("{} is not a disclosure proof", path.display()))
}

fn report_outcome(report: &VerificationReport) -> u8 {
    match &report.reason {
        None => {
            println!("OK: disclosure proof verified");
            0
        }
        Some(reason) => {
            println!("REJECTED: {reason}");
            EXIT_REJECTED
        }
    }
}

