// ! PKCE (Proof Key for Code Exchange) Implementation
// !
// ! Module implements the S256 variant of RFC 7636 plus the random `state`
// ! value sent with every authorization request.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Challenge method sent as `code_challenge_method`
pub const CODE_CHALLENGE_METHOD: &str = "S256";

/// PKCE parameters for authorization flow
#[derive(Debug, Clone)]
pub struct PkceParams {
    /// The code verifier (random string)
    pub verifier: String,
    /// The code challenge (derived from verifier)
    pub challenge: String,
}

impl PkceParams {
    /// Generate new PKCE parameters
    pub fn new() -> Self {
        let verifier = random_token(32);
        let challenge = Self::compute_challenge(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    /// Compute the S256 code challenge from the verifier
    fn compute_challenge(verifier: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }

    /// Verify that a verifier matches a challenge
    pub fn verify(verifier: &str, challenge: &str) -> bool {
        constant_time_eq(&Self::compute_challenge(verifier), challenge)
    }
}

impl Default for PkceParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate an opaque `state` value for CSRF protection
pub fn generate_state() -> String {
    random_token(16)
}

/// URL-safe base64 of `len` random bytes
fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pkce_generation() {
        let pkce = PkceParams::new();

        // 32 random bytes encode to 43 characters
        assert_eq!(pkce.verifier.len(), 43);
        assert_ne!(pkce.verifier, pkce.challenge);

        for value in [&pkce.verifier, &pkce.challenge] {
            assert!(!value.contains('+'));
            assert!(!value.contains('/'));
            assert!(!value.contains('='));
        }
    }

    #[test]
    fn test_pkce_verification() {
        let pkce = PkceParams::new();
        assert!(PkceParams::verify(&pkce.verifier, &pkce.challenge));
        assert!(!PkceParams::verify("wrong_verifier", &pkce.challenge));
        assert!(!PkceParams::verify(&pkce.verifier, "wrong_challenge"));
    }

    #[test]
    fn test_s256_challenge() {
        // Known values from RFC 7636 Appendix B
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            PkceParams::compute_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_state_is_random() {
        assert_ne!(generate_state(), generate_state());
    }

    #[test]
    fn test_constant_time_comparison() {
        assert!(constant_time_eq("hello", "hello"));
        assert!(!constant_time_eq("hello", "world"));
        assert!(!constant_time_eq("hello", "hello!"));
        assert!(!constant_time_eq("", "a"));
    }
}
