//! Release signature verification, as performed by update clients.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::Verifier;

use crate::checksum;
use crate::descriptor::ReleaseDescriptor;
use crate::error::SigningError;
use crate::keys;
use crate::keys::TrustedKeys;

/// Length of an Ed25519 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// Verify a base64 signature over `message` with a base64 public key.
pub fn verify_message(message: &[u8], signature: &str, public_key: &str) -> Result<(), SigningError> {
    let verifying_key = keys::decode_public_key(public_key)?;

    let sig_bytes = STANDARD.decode(signature.trim())?;
    let sig_array: [u8; SIGNATURE_LENGTH] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| SigningError::InvalidSignatureLength(sig_bytes.len()))?;
    let sig = ed25519_dalek::Signature::from_bytes(&sig_array);

    verifying_key.verify(message, &sig).map_err(|_| SigningError::VerificationFailed)
}

/// Verify a descriptor's signature by rebuilding its canonical message.
pub fn verify_descriptor(descriptor: &ReleaseDescriptor, public_key: &str) -> Result<(), SigningError> {
    let message = descriptor.canonical_message().to_bytes();
    verify_message(&message, &descriptor.signature, public_key)
}

/// Verify a descriptor using the key its `key_id` names in `trusted`.
pub fn verify_trusted(descriptor: &ReleaseDescriptor, trusted: &TrustedKeys) -> Result<(), SigningError> {
    let public_key = trusted.get(&descriptor.key_id)?;
    verify_descriptor(descriptor, public_key)
}

/// Check that the archive at `archive_path` hashes to the descriptor's digest.
pub fn verify_archive(descriptor: &ReleaseDescriptor, archive_path: &Path) -> Result<(), SigningError> {
    let actual = checksum::sha256_file(archive_path)?;
    if !actual.eq_ignore_ascii_case(&descriptor.sha256) {
        return Err(SigningError::ChecksumMismatch {
            expected: descriptor.sha256.clone(),
            actual,
        });
    }
    Ok(())
}
