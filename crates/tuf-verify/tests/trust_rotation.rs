//! Integration tests for the in-memory trust database.
//!
//! Manifest loading and verification while keys are rotated concurrently.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use common::{signed_by, signer, trust_db, ROOT_PAYLOAD};
use tuf_verify::{
    verify_signed, MemoryTrustDb, RoleDocument, TrustDb, TrustDbError, TrustManifest,
    VerificationError,
};

fn manifest_for(signers: &[&tuf_verify::Signer], threshold: u64) -> TrustManifest {
    let mut manifest = TrustManifest::default();
    for s in signers {
        manifest
            .keys
            .insert(s.key_id().to_string(), s.key_document());
    }
    manifest.roles.insert(
        "root".to_string(),
        RoleDocument {
            key_ids: signers.iter().map(|s| s.key_id().to_string()).collect(),
            threshold,
        },
    );
    manifest
}

#[test]
fn test_load_manifest_from_file() {
    let (a, b) = (signer(1), signer(2));
    let manifest = manifest_for(&[&a, &b], 2);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("root.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&manifest).unwrap()).unwrap();

    let db = MemoryTrustDb::load(&path).unwrap();
    assert_eq!(db.key_ids().len(), 2);
    assert_eq!(db.role_names(), vec!["root".to_string()]);

    let envelope = signed_by(ROOT_PAYLOAD, &[&a, &b]);
    assert_eq!(verify_signed(&db, &envelope, "root"), Ok(()));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = MemoryTrustDb::load(dir.path().join("missing.json"));
    assert!(matches!(result, Err(TrustDbError::Io(_))));
}

#[test]
fn test_manifest_wire_shape() {
    let a = signer(3);
    let json = format!(
        r#"{{
            "_type": "root",
            "keys": {{
                "{id}": {{"keytype": "ed25519", "keyval": {{"public": "{public}"}}}}
            }},
            "roles": {{
                "root": {{"keyids": ["{id}"], "threshold": 1}},
                "targets": {{"keyids": ["{id}"], "threshold": 1}}
            }}
        }}"#,
        id = a.key_id(),
        public = hex::encode(a.key().public_key()),
    );

    let db = MemoryTrustDb::from_manifest_json(json.as_bytes()).unwrap();
    assert_eq!(db.role_names(), vec!["root".to_string(), "targets".to_string()]);
    assert_eq!(db.key(a.key_id()).unwrap(), *a.key());
}

#[test]
fn test_manifest_with_forged_key_id_rejected() {
    let (a, b) = (signer(4), signer(5));
    let mut manifest = manifest_for(&[&a], 1);
    // a's material under b's ID
    let doc = manifest.keys.remove(a.key_id()).unwrap();
    manifest.keys.insert(b.key_id().to_string(), doc);

    let result = MemoryTrustDb::from_manifest(&manifest);
    assert!(matches!(result, Err(TrustDbError::KeyIdMismatch { .. })));
}

#[test]
fn test_revoked_key_no_longer_counts() {
    let (a, b) = (signer(6), signer(7));
    let db = trust_db("root", &[&a, &b], &[&a, &b], 2);
    let envelope = signed_by(ROOT_PAYLOAD, &[&a, &b]);

    assert_eq!(verify_signed(&db, &envelope, "root"), Ok(()));

    db.remove_key(b.key_id());
    assert_eq!(
        verify_signed(&db, &envelope, "root"),
        Err(VerificationError::RoleThreshold {
            role: "root".to_string(),
            valid: 1,
            threshold: 2,
        })
    );

    db.add_key(b.key_id(), &b.key_document()).unwrap();
    assert_eq!(verify_signed(&db, &envelope, "root"), Ok(()));
}

#[test]
fn test_verify_during_concurrent_rotation() {
    let (a, b) = (signer(8), signer(9));
    let db = Arc::new(trust_db("root", &[&a, &b], &[&a, &b], 1));
    let envelope = signed_by(ROOT_PAYLOAD, &[&a, &b]);
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        let verifiers: Vec<_> = (0..4)
            .map(|_| {
                let db = Arc::clone(&db);
                let envelope = &envelope;
                let done = &done;
                scope.spawn(move || {
                    let mut checks = 0usize;
                    while !done.load(Ordering::Acquire) || checks == 0 {
                        // a stays trusted throughout, b flickers
                        assert_eq!(verify_signed(&db, envelope, "root"), Ok(()));
                        checks += 1;
                    }
                    checks
                })
            })
            .collect();

        for _ in 0..200 {
            db.remove_key(b.key_id());
            db.add_key(b.key_id(), &b.key_document()).unwrap();
            db.add_role(
                "root",
                &RoleDocument {
                    key_ids: vec![a.key_id().to_string(), b.key_id().to_string()],
                    threshold: 1,
                },
            )
            .unwrap();
        }
        done.store(true, Ordering::Release);

        for handle in verifiers {
            assert!(handle.join().unwrap() > 0);
        }
    });

    assert!(db.role("root").is_some());
}
