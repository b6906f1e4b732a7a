//! Signer configuration.
//!
//! Every process-wide setting the signer needs (where downloads live, which
//! key signs, the static compatibility fields) is carried in a
//! [`SignerConfig`] value. It can be loaded from a TOML file where every
//! field is optional:
//!
//! ```toml
//! name = "LOIQ WordPress Agent"
//! download_base_url = "https://loiq-wp-agent.vercel.app"
//! key_id = "key-2026-01"
//!
//! [changelog]
//! "3.1.4" = """
//! ### 3.1.4 - Security & Quality Hardening
//! - Ed25519 signed auto-updates
//! """
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::error::SigningError;

/// Default location of the private key file, relative to the working directory.
pub const DEFAULT_KEY_PATH: &str = ".signing-key";

/// Configuration for a [`ReleaseSigner`](crate::signer::ReleaseSigner).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SignerConfig {
    /// Product name shown by the update client.
    pub name: String,
    /// Product homepage.
    pub homepage: String,
    /// Base URL the archive is served from. The archive file name is appended.
    pub download_base_url: String,
    /// Identifier the client uses to pick the public key from its trust store.
    pub key_id: String,
    /// Path of the base64 private key file.
    pub key_path: PathBuf,
    /// Minimum platform version.
    pub requires: String,
    /// Minimum runtime version.
    pub requires_php: String,
    /// Last platform version the release was tested against.
    pub tested: String,
    /// Changelog text per version.
    pub changelog: BTreeMap<String, String>,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            name: "LOIQ WordPress Agent".to_string(),
            homepage: "https://loiq.nl".to_string(),
            download_base_url: "https://loiq-wp-agent.vercel.app".to_string(),
            key_id: "key-2026-01".to_string(),
            key_path: PathBuf::from(DEFAULT_KEY_PATH),
            requires: "5.8".to_string(),
            requires_php: "7.4".to_string(),
            tested: "6.7".to_string(),
            changelog: BTreeMap::new(),
        }
    }
}

impl SignerConfig {
    /// Load configuration from a TOML file.
    ///
    /// Relative `key_path` values are resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, SigningError> {
        let content = std::fs::read_to_string(path).map_err(|e| SigningError::io("reading config", path, e))?;
        let mut config = Self::from_toml(&content)?;
        if config.key_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.key_path = dir.join(&config.key_path);
            }
        }
        Ok(config)
    }

    /// Parse configuration from a TOML string. Missing fields keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, SigningError> {
        let config: Self = toml::from_str(content).map_err(|e| SigningError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fields that end up in the signed message or the trust lookup.
    pub fn validate(&self) -> Result<(), SigningError> {
        let url = &self.download_base_url;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(SigningError::Config(format!("download_base_url must be an http(s) URL, got {url:?}")));
        }
        if url.chars().any(char::is_control) {
            return Err(SigningError::Config("download_base_url contains control characters".to_string()));
        }
        if self.key_id.is_empty() || self.key_id.chars().any(char::is_whitespace) {
            return Err(SigningError::Config(format!(
                "key_id must be non-empty without whitespace, got {:?}",
                self.key_id
            )));
        }
        Ok(())
    }
}
