use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::CryptoError;

const HASH_SCHEME: &str = "pbkdf2-sha256";
pub const SALT_LENGTH: usize = 16;
pub const HASH_LENGTH: usize = 32;

/// Hash a password with a fresh random salt.
///
/// Output format: `pbkdf2-sha256$<iterations>$<salt b64>$<hash b64>`.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = derive(password, &salt, iterations);
    format!(
        "{HASH_SCHEME}${iterations}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(digest)
    )
}

/// Check `password` against a stored hash in constant time.
pub fn verify_password(password: &str, stored: &str) -> Result<(), CryptoError> {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(CryptoError::MalformedHash);
    };
    if scheme != HASH_SCHEME {
        return Err(CryptoError::MalformedHash);
    }
    let iterations: u32 = iterations.parse().map_err(|_| CryptoError::MalformedHash)?;
    let salt = STANDARD_NO_PAD
        .decode(salt)
        .map_err(|_| CryptoError::MalformedHash)?;
    let expected = STANDARD_NO_PAD
        .decode(expected)
        .map_err(|_| CryptoError::MalformedHash)?;
    if iterations == 0 || expected.len() != HASH_LENGTH {
        return Err(CryptoError::MalformedHash);
    }

    let actual = derive(password, &salt, iterations);
    if bool::from(actual.ct_eq(expected.as_slice())) {
        Ok(())
    } else {
        Err(CryptoError::WrongPassword)
    }
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: u32 = 1_000;

    #[test]
    fn correct_password_verifies() {
        let stored = hash_password("carrot-cake", FAST);
        assert!(stored.starts_with("pbkdf2-sha256$1000$"));
        assert!(verify_password("carrot-cake", &stored).is_ok());
    }

    #[test]
    fn wrong_password_rejected() {
        let stored = hash_password("carrot-cake", FAST);
        assert!(matches!(
            verify_password("carrot-pie", &stored),
            Err(CryptoError::WrongPassword)
        ));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        assert_ne!(hash_password("same", FAST), hash_password("same", FAST));
    }

    #[test]
    fn malformed_hashes_rejected() {
        for stored in [
            "",
            "plaintext",
            "md5$1000$c2FsdA$aGFzaA",
            "pbkdf2-sha256$abc$c2FsdA$aGFzaA",
            "pbkdf2-sha256$1000$c2FsdA$aGFzaA",
            "pbkdf2-sha256$1000$c2FsdA$aGFzaA$extra",
        ] {
            assert!(
                matches!(verify_password("x", stored), Err(CryptoError::MalformedHash)),
                "accepted {stored:?}"
            );
        }
    }
}
