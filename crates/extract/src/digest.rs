use crate::consts::DIGEST_PREFIX;
use sha2::{Digest, Sha256};

/// Content digest of `bytes`, tagged with its algorithm: `sha256:<hex>`.
///
/// This is the same format release hosts report for their assets, so a
/// locally computed digest can be compared with a declared one directly.
pub fn digest(bytes: impl AsRef<[u8]>) -> String {
    format!("{DIGEST_PREFIX}{}", hex::encode(Sha256::digest(bytes.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest() {
        assert_eq!(digest(b""), "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
        assert_eq!(digest("abc"), "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }
}
