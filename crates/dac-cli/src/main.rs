//! # dac CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dac_cli::proof::{
    run_commit, run_prove, run_root, run_verify, CommitArgs, ProveArgs, RootArgs, VerifyArgs,
};
use dac_cli::signing::{
    run_attest_root, run_keygen, run_verify_attestation, AttestRootArgs, KeygenArgs,
    VerifyAttestationArgs,
};

/// Selective disclosure for academic credentials.
///
/// Commits a credential's Merkle root, proves chosen fields against it
/// without revealing the rest, and verifies such proofs. Proofs and roots
/// can be attested with Ed25519 keys.
#[derive(Parser, Debug)]
#[command(name = "dac", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 signing key.
    Keygen(KeygenArgs),

    /// Print a credential's Merkle root without committing it.
    Root(RootArgs),

    /// Commit a credential's root to the ledger.
    Commit(CommitArgs),

    /// Produce a selective-disclosure proof.
    Prove(ProveArgs),

    /// Verify a disclosure proof against the ledger.
    Verify(VerifyArgs),

    /// Sign a committed root.
    AttestRoot(AttestRootArgs),

    /// Check a root attestation or an attested proof offline.
    VerifyAttestation(VerifyAttestationArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Root(args) => run_root(&args),
        Commands::Commit(args) => run_commit(&args),
        Commands::Prove(args) => run_prove(&args),
        Commands::Verify(args) => run_verify(&args),
        Commands::AttestRoot(args) => run_attest_root(&args),
        Commands::VerifyAttestation(args) => run_verify_attestation(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
