//! Signed access tokens.
//!
//! Tokens are compact JWS strings (`header.claims.signature`, unpadded URL-safe
//! base64) signed with Ed25519. Only the public half is needed to verify them.

use chrono::Utc;
use common::{Claims, Result, WipiError};
use ed25519_dalek::{Keypair, PublicKey, Signature, Signer, Verifier};
use log::{info, warn};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const TOKEN_ALGORITHM: &str = "EdDSA";

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Result of verifying an authentic token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCheck {
    pub claims: Claims,
    /// `false` once the token has outlived its expiry.
    pub valid: bool,
}

pub struct TokenService {
    keypair: Arc<Keypair>,
    public_key: PublicKey,
    lifetime_secs: i64,
}

impl TokenService {
    pub fn new(keypair: Keypair, public_key: PublicKey, lifetime_secs: i64) -> Self {
        Self {
            keypair: Arc::new(keypair),
            public_key,
            lifetime_secs,
        }
    }

    /// Creates a service backed by a freshly generated keypair.
    pub fn ephemeral(lifetime_secs: i64) -> Self {
        let keypair = Keypair::generate(&mut OsRng);
        let public_key = keypair.public;
        Self::new(keypair, public_key, lifetime_secs)
    }

    /// Loads the signing keypair and the verifying key from their files.
    ///
    /// Both files hold base64 text: the 64-byte keypair and the 32-byte public key.
    pub fn from_files(signing_path: &Path, verifying_path: &Path, lifetime_secs: i64) -> Result<Self> {
        let keypair_bytes = read_key_file(signing_path)?;
        let keypair = Keypair::from_bytes(&keypair_bytes)
            .map_err(|e| WipiError::ConfigError(format!("invalid signing key: {}", e)))?;

        let public_bytes = read_key_file(verifying_path)?;
        let public_key = PublicKey::from_bytes(&public_bytes)
            .map_err(|e| WipiError::ConfigError(format!("invalid verifying key: {}", e)))?;

        if public_key != keypair.public {
            return Err(WipiError::ConfigError(
                "verifying key does not match signing key".to_string(),
            ));
        }

        info!("Loaded token keys from {}", signing_path.display());
        Ok(Self::new(keypair, public_key, lifetime_secs))
    }

    pub fn from_config(config: &common::Config) -> Result<Self> {
        match (&config.signing_key_path, &config.verifying_key_path) {
            (Some(signing), Some(verifying)) => {
                Self::from_files(signing, verifying, config.token_lifetime_secs)
            }
            _ => {
                warn!("No token key files configured, generating an ephemeral keypair");
                warn!("Tokens issued by this process will not survive a restart");
                Ok(Self::ephemeral(config.token_lifetime_secs))
            }
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    pub fn issue(&self, username: &str, admin: bool) -> Result<String> {
        self.issue_at(username, admin, Utc::now().timestamp())
    }

    pub fn issue_at(&self, username: &str, admin: bool, now: i64) -> Result<String> {
        let header = TokenHeader {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let exp = now
            .checked_add(self.lifetime_secs)
            .ok_or_else(|| WipiError::InternalError("token expiry out of range".to_string()))?;
        let claims = Claims {
            username: username.to_string(),
            admin,
            iat: now,
            exp,
        };

        let signing_input = format!(
            "{}.{}",
            encode_segment(&serde_json::to_vec(&header)?),
            encode_segment(&serde_json::to_vec(&claims)?)
        );
        let signature = self.keypair.sign(signing_input.as_bytes());

        Ok(format!("{}.{}", signing_input, encode_segment(&signature.to_bytes())))
    }

    pub fn verify(&self, token: &str) -> Result<TokenCheck> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verifies the signature, then compares the expiry against `now`.
    ///
    /// A forged or garbled token is an error; an authentic expired one is not.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<TokenCheck> {
        let segments: Vec<&str> = token.split('.').collect();
        let (raw_header, raw_payload, raw_signature) = match segments.as_slice() {
            [header, payload, signature] => (*header, *payload, *signature),
            _ => return Err(invalid("token must have three segments")),
        };

        let header: TokenHeader = serde_json::from_slice(&decode_segment(raw_header)?)
            .map_err(|_| invalid("unreadable header"))?;
        if header.alg != TOKEN_ALGORITHM {
            return Err(invalid("unsupported algorithm"));
        }

        let signature_bytes = decode_segment(raw_signature)?;
        let signature = Signature::try_from(signature_bytes.as_slice())
            .map_err(|_| invalid("malformed signature"))?;

        let signing_input = &token[..raw_header.len() + 1 + raw_payload.len()];
        self.public_key
            .verify(signing_input.as_bytes(), &signature)
            .map_err(|_| invalid("signature mismatch"))?;

        let claims: Claims = serde_json::from_slice(&decode_segment(raw_payload)?)
            .map_err(|_| invalid("unreadable claims"))?;

        // no leeway: expired strictly after `exp`
        let valid = now <= claims.exp;
        Ok(TokenCheck { claims, valid })
    }
}

/// Writes a new keypair as `<dir>/token_signing.key` and `<dir>/token_verifying.key`.
pub fn generate_key_files(dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let keypair = Keypair::generate(&mut OsRng);
    let signing_path = dir.join("token_signing.key");
    let verifying_path = dir.join("token_verifying.key");

    fs::create_dir_all(dir)?;
    fs::write(&signing_path, format!("{}\n", base64::encode(keypair.to_bytes())))?;
    fs::write(&verifying_path, format!("{}\n", base64::encode(keypair.public.to_bytes())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&signing_path, fs::Permissions::from_mode(0o600))?;
    }

    Ok((signing_path, verifying_path))
}

fn read_key_file(path: &Path) -> Result<Vec<u8>> {
    let text = fs::read_to_string(path).map_err(|e| {
        WipiError::ConfigError(format!("cannot read key file {}: {}", path.display(), e))
    })?;
    base64::decode(text.trim())
        .map_err(|e| WipiError::ConfigError(format!("key file {} is not base64: {}", path.display(), e)))
}

fn encode_segment(bytes: &[u8]) -> String {
    base64::encode_config(bytes, base64::URL_SAFE_NO_PAD)
}

fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    base64::decode_config(segment, base64::URL_SAFE_NO_PAD).map_err(|_| invalid("bad encoding"))
}

fn invalid(reason: &str) -> WipiError {
    WipiError::InvalidToken(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::ephemeral(common::TOKEN_LIFETIME_SECS)
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service();
        for (name, admin) in [("alice", false), ("bob", true)] {
            let token = tokens.issue(name, admin).unwrap();
            let check = tokens.verify(&token).unwrap();
            assert!(check.valid);
            assert_eq!(check.claims.username, name);
            assert_eq!(check.claims.admin, admin);
            assert_eq!(check.claims.exp - check.claims.iat, 3600);
        }
    }

    #[test]
    fn test_expired_token_still_decodes() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let token = tokens.issue_at("alice", true, now - 7200).unwrap();

        let check = tokens.verify(&token).unwrap();
        assert!(!check.valid);
        assert_eq!(check.claims.username, "alice");
        assert!(check.claims.admin);
    }

    #[test]
    fn test_expiry_boundary() {
        let tokens = service();
        let token = tokens.issue_at("alice", false, 1_000).unwrap();

        assert!(tokens.verify_at(&token, 4_600).unwrap().valid);
        assert!(!tokens.verify_at(&token, 4_601).unwrap().valid);
    }

    #[test]
    fn test_expiry_overflow_is_an_error() {
        let tokens = TokenService::ephemeral(i64::MAX);
        assert!(matches!(
            tokens.issue("bob", true),
            Err(WipiError::InternalError(_))
        ));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let issuer = service();
        let verifier = service();
        let token = issuer.issue("mallory", true).unwrap();

        assert!(matches!(verifier.verify(&token), Err(WipiError::InvalidToken(_))));
    }

    #[test]
    fn test_tampered_claims_rejected() {
        let tokens = service();
        let token = tokens.issue("alice", false).unwrap();
        let forged_claims = encode_segment(
            br#"{"username":"alice","admin":true,"iat":0,"exp":99999999999}"#,
        );
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);

        assert!(matches!(tokens.verify(&forged), Err(WipiError::InvalidToken(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = service();
        for garbage in ["", "abc", "a.b", "a.b.c", "a.b.c.d"] {
            assert!(
                matches!(tokens.verify(garbage), Err(WipiError::InvalidToken(_))),
                "{:?} should be rejected",
                garbage
            );
        }
    }

    #[test]
    fn test_key_files_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let (signing, verifying) = generate_key_files(dir.path()).unwrap();

        let issuer = TokenService::from_files(&signing, &verifying, 60).unwrap();
        let verifier = TokenService::from_files(&signing, &verifying, 60).unwrap();
        let token = issuer.issue("bob", true).unwrap();
        assert!(verifier.verify(&token).unwrap().valid);
    }

    #[test]
    fn test_mismatched_key_files_rejected() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let (signing, _) = generate_key_files(first.path()).unwrap();
        let (_, verifying) = generate_key_files(second.path()).unwrap();

        assert!(matches!(
            TokenService::from_files(&signing, &verifying, 60),
            Err(WipiError::ConfigError(_))
        ));
    }
}
