//! Error types for release signing operations.

use std::path::PathBuf;

/// Errors from key handling, checksumming, signing, and verification.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The release archive does not resolve to a regular file.
    #[error("archive not found: {}", .path.display())]
    ArchiveNotFound { path: PathBuf },

    /// No key file exists and generation was not allowed.
    #[error("signing key not found at {} (run `sign-release init-keys` first)", .path.display())]
    KeyNotFound { path: PathBuf },

    /// Refusing to overwrite an existing key file.
    #[error("key file already exists at {}", .path.display())]
    KeyFileExists { path: PathBuf },

    /// The key file content is not valid base64.
    #[error("malformed signing key in {}: {source}", .path.display())]
    InvalidKeyEncoding {
        path: PathBuf,
        #[source]
        source: base64::DecodeError,
    },

    /// The decoded private key has the wrong length (expected 32).
    #[error("invalid signing key length in {}: expected 32 bytes, got {len}", .path.display())]
    InvalidKeyLength { path: PathBuf, len: usize },

    /// A public key could not be decoded or is not a valid Ed25519 point.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The signature is not valid base64.
    #[error("invalid signature encoding: {0}")]
    InvalidSignatureEncoding(#[from] base64::DecodeError),

    /// The signature bytes have wrong length (expected 64).
    #[error("invalid signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// The signature did not verify against the public key.
    #[error("signature verification failed")]
    VerificationFailed,

    /// The archive digest does not match the one in the manifest.
    #[error("SHA-256 mismatch: manifest has {expected}, archive hashes to {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// The manifest names a key id the trust store does not know.
    #[error("key id {0:?} is not in the trust store")]
    UntrustedKey(String),

    /// A field value would corrupt the canonical message.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The archive path has no usable file name.
    #[error("archive path has no UTF-8 file name: {}", .path.display())]
    InvalidArchiveName { path: PathBuf },

    /// File I/O error, tagged with the file and the stage that failed.
    #[error("{stage} {}: {source}", .path.display())]
    Io {
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be parsed or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SigningError {
    pub(crate) fn io(stage: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SigningError::Io {
            stage,
            path: path.into(),
            source,
        }
    }
}
