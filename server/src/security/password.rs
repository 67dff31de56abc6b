use common::{PasswordVerifier, Result, WipiError};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = ring::digest::SHA256_OUTPUT_LEN;

#[derive(Clone)]
pub struct PasswordHasher {
    iterations: NonZeroU32,
    rng: SystemRandom,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Result<Self> {
        let iterations = NonZeroU32::new(iterations)
            .ok_or_else(|| WipiError::ConfigError("password iterations must be non-zero".to_string()))?;
        Ok(Self {
            iterations,
            rng: SystemRandom::new(),
        })
    }

    pub fn hash(&self, password: &str) -> Result<PasswordVerifier> {
        let mut salt = [0u8; SALT_LEN];
        self.rng
            .fill(&mut salt)
            .map_err(|_| WipiError::InternalError("system RNG unavailable".to_string()))?;

        let mut hash = [0u8; HASH_LEN];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            self.iterations,
            &salt,
            password.as_bytes(),
            &mut hash,
        );

        Ok(PasswordVerifier {
            salt: salt.to_vec(),
            hash: hash.to_vec(),
            iterations: self.iterations.get(),
        })
    }

    /// A verifier no password matches, with the same cost as a real one.
    pub fn placeholder_verifier(&self) -> PasswordVerifier {
        PasswordVerifier {
            salt: vec![0; SALT_LEN],
            hash: vec![0; HASH_LEN],
            iterations: self.iterations.get(),
        }
    }
}

/// Constant-time check of `password` against a stored verifier.
pub fn verify_password(verifier: &PasswordVerifier, password: &str) -> bool {
    let iterations = match NonZeroU32::new(verifier.iterations) {
        Some(n) => n,
        None => return false,
    };

    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &verifier.salt,
        password.as_bytes(),
        &verifier.hash,
    )
    .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(1_000).unwrap();
        let verifier = hasher.hash("secret").unwrap();

        assert!(verify_password(&verifier, "secret"));
        assert!(!verify_password(&verifier, "wrong"));
        assert!(!verify_password(&verifier, ""));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordHasher::new(1_000).unwrap();
        let first = hasher.hash("secret").unwrap();
        let second = hasher.hash("secret").unwrap();

        assert_ne!(first.salt, second.salt);
        assert_ne!(first.hash, second.hash);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(PasswordHasher::new(0).is_err());
        let verifier = PasswordVerifier { salt: vec![0; 16], hash: vec![0; 32], iterations: 0 };
        assert!(!verify_password(&verifier, "anything"));
    }
}
