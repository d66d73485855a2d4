//! Avatar hash validation and derivation
//!
//! Avatar identifiers are lowercase or uppercase hex MD5 digests of a
//! normalized e-mail address. Requests carrying anything else are rejected at
//! the HTTP boundary before the avatar service is consulted.

use regex::Regex;
use std::sync::LazyLock;

static AVATAR_HASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-fA-F0-9]{32}$").expect("avatar hash pattern is valid")
});

/// Check that `hash` is exactly 32 hexadecimal characters
pub fn is_valid_avatar_hash(hash: &str) -> bool {
    AVATAR_HASH.is_match(hash)
}

/// Hash an e-mail address the way avatar providers expect
///
/// The address is trimmed and lowercased before hashing.
pub fn hash_email(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    format!("{:x}", md5::compute(normalized.as_bytes()))
}

/// Path under which this service serves the avatar for `email`
pub fn avatar_path(email: &str) -> String {
    format!("/avatar/{}", hash_email(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_32_hex_characters() {
        assert!(is_valid_avatar_hash("9e107d9d372bb6826bd81d3542a419d6"));
        assert!(is_valid_avatar_hash("9E107D9D372BB6826BD81D3542A419D6"));
    }

    #[test]
    fn test_rejects_malformed_hashes() {
        assert!(!is_valid_avatar_hash(""));
        assert!(!is_valid_avatar_hash("9e107d9d372bb6826bd81d3542a419d"));
        assert!(!is_valid_avatar_hash("9e107d9d372bb6826bd81d3542a419d6a"));
        assert!(!is_valid_avatar_hash("9e107d9d372bb6826bd81d3542a419zz"));
        assert!(!is_valid_avatar_hash("../../../etc/passwd0000000000000"));
    }

    #[test]
    fn test_hash_email_normalizes_input() {
        let hash = hash_email("  MyEmailAddress@example.com ");
        assert_eq!(hash, "0bc83cb571cd1c50ba6f3e8a78ef1346");
        assert!(is_valid_avatar_hash(&hash));
    }

    #[test]
    fn test_avatar_path() {
        assert_eq!(
            avatar_path("myemailaddress@example.com"),
            "/avatar/0bc83cb571cd1c50ba6f3e8a78ef1346"
        );
    }
}
