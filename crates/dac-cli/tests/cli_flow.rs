//! End-to-end runs of the subcommand handlers over a temporary directory.

use std::path::{Path, PathBuf};

use dac_cli::proof::{
    run_commit, run_prove, run_root, run_verify, CommitArgs, EngineFiles, ProveArgs, RootArgs,
    VerifyArgs,
};
use dac_cli::signing::{
    run_attest_root, run_keygen, run_verify_attestation, AttestRootArgs, KeygenArgs,
    VerifyAttestationArgs,
};
use dac_cli::{read_json, write_json, EXIT_REJECTED};
use dac_core::FieldValue;
use dac_vc::DisclosureProof;
use serde_json::json;

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        let orderings = json!([{
            "schema_version": "transcript-v1",
            "issuer": "state-university",
            "ordering": ["name", "degree", "grade", "graduation_date"]
        }]);
        std::fs::write(ws.path("orderings.json"), orderings.to_string()).unwrap();
        let alice = json!({
            "schema_version": "transcript-v1",
            "issuer": "state-university",
            "fields": {
                "name": "Alice Smith",
                "degree": "BSc Computer Science",
                "grade": "A",
                "graduation_date": "2024-06-15"
            }
        });
        std::fs::write(ws.path("alice.json"), alice.to_string()).unwrap();
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn files(&self) -> EngineFiles {
        EngineFiles {
            orderings: self.path("orderings.json"),
            ledger: self.path("ledger.json"),
        }
    }

    fn commit(&self) {
        let args = CommitArgs {
            files: self.files(),
            id: "alice-2024".into(),
            credential: self.path("alice.json"),
        };
        assert_eq!(run_commit(&args).unwrap(), 0);
    }

    fn prove(&self, out: &Path, key: Option<PathBuf>) {
        let args = ProveArgs {
            files: self.files(),
            id: "alice-2024".into(),
            fields: vec!["name".into(), "grade".into()],
            signer: key.as_ref().map(|_| "state-university-registrar".to_string()),
            key,
            out: Some(out.to_path_buf()),
            credential: self.path("alice.json"),
        };
        assert_eq!(run_prove(&args).unwrap(), 0);
    }

    fn verify(&self, proof: &Path, pubkey: Option<PathBuf>) -> u8 {
        let args = VerifyArgs {
            files: self.files(),
            id: "alice-2024".into(),
            pubkey,
            proof: proof.to_path_buf(),
        };
        run_verify(&args).unwrap()
    }

    fn keygen(&self, prefix: &str) {
        let args = KeygenArgs {
            output: self.dir.path().to_path_buf(),
            prefix: prefix.into(),
        };
        assert_eq!(run_keygen(&args).unwrap(), 0);
    }
}

#[test]
fn commit_prove_verify() {
    let ws = Workspace::new();
    ws.commit();
    assert!(ws.path("ledger.json").exists());

    let proof_path = ws.path("proof.json");
    ws.prove(&proof_path, None);
    let proof: DisclosureProof = read_json(&proof_path).unwrap();
    assert_eq!(proof.disclosed.len(), 2);
    assert!(proof.get("degree").is_none());

    assert_eq!(ws.verify(&proof_path, None), 0);
}

#[test]
fn tampered_proof_file_is_rejected() {
    let ws = Workspace::new();
    ws.commit();
    let proof_path = ws.path("proof.json");
    ws.prove(&proof_path, None);

    let mut proof: DisclosureProof = read_json(&proof_path).unwrap();
    proof.disclosed[1].value = FieldValue::text("A+");
    write_json(Some(&proof_path), &proof).unwrap();

    assert_eq!(ws.verify(&proof_path, None), EXIT_REJECTED);
}

#[test]
fn proving_without_a_commit_fails() {
    let ws = Workspace::new();
    let args = ProveArgs {
        files: ws.files(),
        id: "alice-2024".into(),
        fields: vec!["name".into()],
        key: None,
        signer: None,
        out: Some(ws.path("proof.json")),
        credential: ws.path("alice.json"),
    };
    assert!(run_prove(&args).is_err());
}

#[test]
fn root_matches_committed_root() {
    let ws = Workspace::new();
    let args = RootArgs {
        orderings: ws.path("orderings.json"),
        credential: ws.path("alice.json"),
    };
    assert_eq!(run_root(&args).unwrap(), 0);
    ws.commit();
    // Committing the same credential again is idempotent.
    ws.commit();
}

#[test]
fn attested_proof_checks_signer_key() {
    let ws = Workspace::new();
    ws.keygen("registrar");
    ws.keygen("someone-else");
    ws.commit();

    let proof_path = ws.path("attested.json");
    ws.prove(&proof_path, Some(ws.path("registrar.key")));

    assert_eq!(ws.verify(&proof_path, Some(ws.path("registrar.pub"))), 0);
    assert_eq!(
        ws.verify(&proof_path, Some(ws.path("someone-else.pub"))),
        EXIT_REJECTED
    );

    assert_eq!(ws.verify(&proof_path, None), EXIT_REJECTED);

    let offline = VerifyAttestationArgs {
        file: proof_path,
        root: None,
        pubkey: Some(ws.path("registrar.pub")),
    };
    assert_eq!(run_verify_attestation(&offline).unwrap(), 0);
}

#[test]
fn plain_proof_fails_when_a_signer_is_required() {
    let ws = Workspace::new();
    ws.keygen("registrar");
    ws.commit();
    let proof_path = ws.path("proof.json");
    ws.prove(&proof_path, None);
    assert_eq!(
        ws.verify(&proof_path, Some(ws.path("registrar.pub"))),
        EXIT_REJECTED
    );
}

#[test]
fn root_attestation_round_trip() {
    let ws = Workspace::new();
    ws.keygen("registrar");
    ws.commit();

    let att_path = ws.path("root-att.json");
    let args = AttestRootArgs {
        ledger: ws.path("ledger.json"),
        id: "alice-2024".into(),
        key: ws.path("registrar.key"),
        signer: "state-university-registrar".into(),
        out: Some(att_path.clone()),
    };
    assert_eq!(run_attest_root(&args).unwrap(), 0);

    let ledger: serde_json::Value = read_json(&ws.path("ledger.json")).unwrap();
    let root_hex = ledger["alice-2024"].as_str().unwrap().to_string();

    let check = VerifyAttestationArgs {
        file: att_path,
        root: Some(root_hex),
        pubkey: Some(ws.path("registrar.pub")),
    };
    assert_eq!(run_verify_attestation(&check).unwrap(), 0);
}
