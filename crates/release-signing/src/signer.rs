//! Release signing: key, checksum, canonical message, Ed25519 signature.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::DateTime;
use chrono::Utc;
use ed25519_dalek::Signer;

use crate::canonical::CanonicalMessage;
use crate::changelog::Changelog;
use crate::checksum;
use crate::config::SignerConfig;
use crate::descriptor::RELEASED_AT_FORMAT;
use crate::descriptor::ReleaseDescriptor;
use crate::error::SigningError;
use crate::keys;
use crate::keys::KeyOrigin;
use crate::keys::SigningKeypair;

/// What to do when the configured key file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Generate an unsaved keypair and report it to the operator.
    #[default]
    LoadOrCreate,
    /// Fail with [`SigningError::KeyNotFound`].
    RequireExisting,
}

/// A descriptor together with the key that signed it.
#[derive(Debug, Clone)]
pub struct SignedRelease {
    pub descriptor: ReleaseDescriptor,
    pub keypair: SigningKeypair,
    pub key_origin: KeyOrigin,
}

/// Signs release archives using the settings in a [`SignerConfig`].
#[derive(Debug, Clone)]
pub struct ReleaseSigner {
    config: SignerConfig,
    changelog: Changelog,
    key_policy: KeyPolicy,
}

impl ReleaseSigner {
    pub fn new(config: SignerConfig) -> Result<Self, SigningError> {
        config.validate()?;
        let changelog = Changelog::new(config.changelog.clone());
        Ok(Self {
            config,
            changelog,
            key_policy: KeyPolicy::default(),
        })
    }

    pub fn with_key_policy(mut self, key_policy: KeyPolicy) -> Self {
        self.key_policy = key_policy;
        self
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    /// Sign `archive_path` as release `version`, timestamped now.
    ///
    /// `changelog` overrides the configured notes for this version.
    pub fn sign(
        &self,
        version: &str,
        archive_path: &Path,
        changelog: Option<&str>,
    ) -> Result<SignedRelease, SigningError> {
        self.sign_at(version, archive_path, changelog, Utc::now())
    }

    /// Sign with an explicit release time. Sub-second precision is dropped.
    pub fn sign_at(
        &self,
        version: &str,
        archive_path: &Path,
        changelog: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SignedRelease, SigningError> {
        validate_field("version", version)?;
        if !archive_path.is_file() {
            return Err(SigningError::ArchiveNotFound {
                path: archive_path.to_path_buf(),
            });
        }

        let (keypair, key_origin) = match self.key_policy {
            KeyPolicy::LoadOrCreate => keys::load_or_create(&self.config.key_path, &self.config.key_id)?,
            KeyPolicy::RequireExisting => (keys::load(&self.config.key_path, &self.config.key_id)?, KeyOrigin::Loaded),
        };

        let changelog = match changelog.map(str::trim).filter(|c| !c.is_empty()) {
            Some(text) => text.to_string(),
            None => self.changelog.entry_for(version),
        };
        let descriptor = self.sign_with_keypair(version, archive_path, changelog, &keypair, now)?;

        Ok(SignedRelease {
            descriptor,
            keypair,
            key_origin,
        })
    }

    /// Build and sign a descriptor with an already-resolved keypair.
    pub fn sign_with_keypair(
        &self,
        version: &str,
        archive_path: &Path,
        changelog: String,
        keypair: &SigningKeypair,
        now: DateTime<Utc>,
    ) -> Result<ReleaseDescriptor, SigningError> {
        validate_field("version", version)?;
        let sha256 = checksum::sha256_file(archive_path)?;
        let download_url = download_url(&self.config.download_base_url, archive_path)?;
        validate_field("download_url", &download_url)?;
        let released_at = format_released_at(now);

        let message = CanonicalMessage::new(version, &download_url, &sha256, &released_at);
        let signature = sign_message(keypair, &message.to_bytes());
        tracing::debug!(version, %download_url, %released_at, key_id = keypair.key_id(), "signed release");

        Ok(ReleaseDescriptor {
            name: self.config.name.clone(),
            version: version.to_string(),
            download_url,
            homepage: self.config.homepage.clone(),
            sha256,
            released_at,
            key_id: keypair.key_id().to_string(),
            signature,
            changelog,
            requires: self.config.requires.clone(),
            requires_php: self.config.requires_php.clone(),
            tested: self.config.tested.clone(),
        })
    }
}

/// Sign raw message bytes, returning the base64 signature.
pub fn sign_message(keypair: &SigningKeypair, message: &[u8]) -> String {
    STANDARD.encode(keypair.signing_key().sign(message).to_bytes())
}

/// `base_url` joined with the archive's file name by a single `/`.
pub fn download_url(base_url: &str, archive_path: &Path) -> Result<String, SigningError> {
    let file_name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SigningError::InvalidArchiveName {
            path: archive_path.to_path_buf(),
        })?;
    Ok(format!("{}/{}", base_url.trim_end_matches('/'), file_name))
}

/// Render a time as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_released_at(time: DateTime<Utc>) -> String {
    time.format(RELEASED_AT_FORMAT).to_string()
}

/// Reject values that would break the line structure of the canonical message.
fn validate_field(field: &'static str, value: &str) -> Result<(), SigningError> {
    if value.is_empty() {
        return Err(SigningError::InvalidField {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if let Some(c) = value.chars().find(|c| c.is_control()) {
        return Err(SigningError::InvalidField {
            field,
            reason: format!("contains control character {c:?}"),
        });
    }
    Ok(())
}
