/// Content fingerprints used to skip unchanged files on refresh.
use sha2::{Digest as _, Sha256};

/// Lowercase hex SHA-256 of the raw file bytes.
///
/// Taken before any normalisation, so a file that only gains or loses its
/// trailing newline still counts as changed.
pub fn fingerprint(bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);
    return format!("{hash:x}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn differs_on_any_byte() {
        assert_ne!(fingerprint(b"int x;"), fingerprint(b"int x;\n"));
        assert_eq!(fingerprint(b"int x;"), fingerprint(b"int x;"));
    }
}
