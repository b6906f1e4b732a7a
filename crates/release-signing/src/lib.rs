//! Ed25519 signed release manifests for plugin auto-updates.
//!
//! A release is signed by hashing its archive with SHA-256, building the
//! canonical message from `version`, `download_url`, `sha256` and
//! `released_at`, and signing that message with an Ed25519 key. The resulting
//! [`ReleaseDescriptor`] is served as JSON; clients rebuild the canonical
//! message from its fields and check the signature against the public key
//! they hold for its `key_id`.
//!
//! # Signing
//!
//! ```no_run
//! use std::path::Path;
//!
//! use release_signing::{manifest, verifier, ReleaseSigner, SignerConfig};
//!
//! let signer = ReleaseSigner::new(SignerConfig::default())?;
//! let signed = signer.sign("3.1.4", Path::new("dist/plugin.zip"), None)?;
//! verifier::verify_descriptor(&signed.descriptor, &signed.keypair.public_key_base64())?;
//! manifest::write_manifest(&mut std::io::stdout(), &signed.descriptor)?;
//! # Ok::<(), release_signing::SigningError>(())
//! ```
//!
//! # Keys
//!
//! [`keys::load_or_create`] reads the base64 private key at the configured
//! path, or generates an unsaved keypair when the file is absent.
//! [`keys::save`] persists a key for the explicit `init-keys` flow.

pub mod canonical;
pub mod changelog;
pub mod checksum;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod keys;
pub mod manifest;
pub mod signer;
pub mod verifier;

pub use config::SignerConfig;
pub use descriptor::ReleaseDescriptor;
pub use error::SigningError;
pub use keys::SigningKeypair;
pub use signer::ReleaseSigner;
pub use signer::SignedRelease;
