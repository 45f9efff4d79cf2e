#![no_main]

use libfuzzer_sys::fuzz_target;
use tuf_verify::{canonical_payload_bytes, parse_json_strict, VerifyConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let config = VerifyConfig::default().with_max_depth(16);

    let _ = parse_json_strict(text, &config);

    // Canonical output is a fixed point: it parses and canonicalizes to itself.
    if let Ok(canonical) = canonical_payload_bytes(text, &config) {
        let canonical = String::from_utf8(canonical).expect("JCS output is UTF-8");
        let again = canonical_payload_bytes(&canonical, &config).expect("canonical form re-parses");
        assert_eq!(again, canonical.as_bytes());
    }
});
