#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use tuf_verify::{verify_signed, MemoryTrustDb, RoleDocument, SignedEnvelope, Signer};

/// Two known keys, both authorized for "root" at threshold 1.
fn db() -> &'static MemoryTrustDb {
    static DB: OnceLock<MemoryTrustDb> = OnceLock::new();
    DB.get_or_init(|| {
        let db = MemoryTrustDb::new();
        let mut key_ids = Vec::new();
        for seed in [1u8, 2] {
            let signer = Signer::from_seed(&[seed; 32]).unwrap();
            db.add_key(signer.key_id(), &signer.key_document()).unwrap();
            key_ids.push(signer.key_id().to_string());
        }
        db.add_role("root", &RoleDocument { key_ids, threshold: 1 })
            .unwrap();
        db
    })
}

fuzz_target!(|data: &[u8]| {
    let Ok(envelope) = SignedEnvelope::from_json(data) else {
        return;
    };

    let result = verify_signed(db(), &envelope, "root");
    if envelope.signatures.is_empty() {
        assert!(result.is_err());
    }
    let _ = verify_signed(db(), &envelope, "targets");
});
