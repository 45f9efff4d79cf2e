use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 key ID.
pub const KEY_ID_LENGTH: usize = 64;

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_hex_is_lowercase_key_id_length() {
        let digest = sha256_hex(b"");
        assert_eq!(digest.len(), KEY_ID_LENGTH);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
