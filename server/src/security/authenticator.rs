use common::{Credential, PasswordVerifier, Result, WipiError};
use log::{info, warn};
use std::sync::Arc;

use super::password::{verify_password, PasswordHasher};
use super::token::TokenService;
use crate::store::CredentialStore;

/// Checks operator credentials and hands out access tokens.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
    /// Checked against when the username is unknown, so both paths pay for a key derivation.
    absent_user: PasswordVerifier,
}

impl Authenticator {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        hasher: PasswordHasher,
    ) -> Self {
        let absent_user = hasher.placeholder_verifier();
        Self {
            credentials,
            tokens,
            hasher,
            absent_user,
        }
    }

    /// Returns a signed token when the username and password match a stored credential.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let credential = self.credentials.get(username).await?;

        let verifier = match &credential {
            Some(credential) => credential.verifier.clone(),
            None => self.absent_user.clone(),
        };

        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_password(&verifier, &password))
            .await
            .map_err(|e| WipiError::InternalError(e.to_string()))?;
        let accepted = credential.filter(|_| verified);

        match accepted {
            Some(credential) => {
                info!("User {} authenticated (admin={})", credential.username, credential.admin);
                self.tokens.issue(&credential.username, credential.admin)
            }
            None => {
                warn!("Rejected login for {}", username);
                Err(WipiError::Unauthorized("Invalid username or password".to_string()))
            }
        }
    }

    /// Stores a new credential. Fails if the username already exists.
    pub async fn provision(&self, username: &str, password: &str, admin: bool) -> Result<()> {
        if username.trim().is_empty() {
            return Err(WipiError::BadRequest("username cannot be empty".to_string()));
        }

        let verifier = self.hasher.hash(password)?;
        let created = self
            .credentials
            .insert(Credential {
                username: username.to_string(),
                verifier,
                admin,
            })
            .await?;

        if !created {
            return Err(WipiError::BadRequest(format!("user {} already exists", username)));
        }

        info!("Provisioned user {} (admin={})", username, admin);
        Ok(())
    }
}
