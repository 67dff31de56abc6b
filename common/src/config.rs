use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use crate::error::{Result, WipiError};

/// Which job/credential store implementation the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = WipiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(WipiError::ConfigError(format!("unknown store backend '{}'", other))),
        }
    }
}

/// Upper bound on `TOKEN_LIFETIME_SECS`: one year.
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bind_address: String,
    pub redis_url: String,
    pub store_backend: StoreBackend,
    pub token_lifetime_secs: i64,
    pub signing_key_path: Option<PathBuf>,
    pub verifying_key_path: Option<PathBuf>,
    pub password_iterations: u32,
    pub monitor_command: String,
    pub deauth_command: String,
    pub scan_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            store_backend: StoreBackend::Redis,
            token_lifetime_secs: crate::TOKEN_LIFETIME_SECS,
            signing_key_path: None,
            verifying_key_path: None,
            password_iterations: 100_000,
            monitor_command: "airmon-ng".to_string(),
            deauth_command: "wipi-deauth".to_string(),
            scan_command: "iw".to_string(),
        }
    }
}

impl Config {
    /// Builds the configuration from environment variables, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            store_backend: parse_or(&lookup, "STORE_BACKEND", defaults.store_backend)?,
            token_lifetime_secs: parse_or(&lookup, "TOKEN_LIFETIME_SECS", defaults.token_lifetime_secs)?,
            signing_key_path: lookup("SIGNING_KEY_PATH").map(PathBuf::from),
            verifying_key_path: lookup("VERIFYING_KEY_PATH").map(PathBuf::from),
            password_iterations: parse_or(&lookup, "PASSWORD_ITERATIONS", defaults.password_iterations)?,
            monitor_command: lookup("MONITOR_COMMAND").unwrap_or(defaults.monitor_command),
            deauth_command: lookup("DEAUTH_COMMAND").unwrap_or(defaults.deauth_command),
            scan_command: lookup("SCAN_COMMAND").unwrap_or(defaults.scan_command),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.signing_key_path.is_some() != self.verifying_key_path.is_some() {
            return Err(WipiError::ConfigError(
                "SIGNING_KEY_PATH and VERIFYING_KEY_PATH must be set together".to_string(),
            ));
        }
        if self.token_lifetime_secs <= 0 || self.token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS {
            return Err(WipiError::ConfigError(format!(
                "TOKEN_LIFETIME_SECS must be between 1 and {}",
                MAX_TOKEN_LIFETIME_SECS
            )));
        }
        if self.password_iterations == 0 {
            return Err(WipiError::ConfigError("PASSWORD_ITERATIONS must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| WipiError::ConfigError(format!("{}: {}", key, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.token_lifetime_secs, 3600);
        assert_eq!(config.store_backend, StoreBackend::Redis);
        assert_eq!(config.monitor_command, "airmon-ng");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("STORE_BACKEND", "memory"),
            ("TOKEN_LIFETIME_SECS", "60"),
            ("BIND_ADDRESS", "127.0.0.1:9000"),
        ]))
        .unwrap();
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.token_lifetime_secs, 60);
        assert_eq!(config.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_rejects_garbage() {
        let result = Config::from_lookup(lookup_from(&[("TOKEN_LIFETIME_SECS", "soon")]));
        assert!(matches!(result, Err(WipiError::ConfigError(_))));
    }

    #[test]
    fn test_token_lifetime_is_bounded() {
        for raw in ["0", "-5", "31536001", "9223372036854775807"] {
            let result = Config::from_lookup(lookup_from(&[("TOKEN_LIFETIME_SECS", raw)]));
            assert!(matches!(result, Err(WipiError::ConfigError(_))), "{}", raw);
        }

        let config = Config::from_lookup(lookup_from(&[("TOKEN_LIFETIME_SECS", "31536000")])).unwrap();
        assert_eq!(config.token_lifetime_secs, MAX_TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn test_key_paths_must_pair() {
        let result = Config::from_lookup(lookup_from(&[("SIGNING_KEY_PATH", "/etc/wipi/jwt.key")]));
        assert!(matches!(result, Err(WipiError::ConfigError(_))));
    }
}
