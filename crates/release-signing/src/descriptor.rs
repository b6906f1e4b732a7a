//! Release descriptor type.

use serde::Deserialize;
use serde::Serialize;

use crate::canonical::CanonicalMessage;

/// Timestamp format of `released_at`: UTC, second precision.
pub const RELEASED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Signed description of one release, as served to update clients.
///
/// Field order is the JSON key order clients see. The signature covers only
/// the fields returned by [`ReleaseDescriptor::canonical_message`]:
/// 1. Build `version`, `download_url`, `sha256`, `released_at` into the canonical message
/// 2. Sign the message bytes with Ed25519 → 64-byte signature
/// 3. Encode the signature as standard base64
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    /// Product name.
    pub name: String,
    /// Release version.
    pub version: String,
    /// Absolute URL of the archive.
    pub download_url: String,
    /// Product homepage.
    pub homepage: String,
    /// SHA-256 of the archive (64 lowercase hex chars).
    pub sha256: String,
    /// Signing time, `YYYY-MM-DDTHH:MM:SSZ`.
    pub released_at: String,
    /// Identifier of the signing key in the client's trust store.
    pub key_id: String,
    /// Ed25519 signature over the canonical message (base64, 64 bytes).
    pub signature: String,
    /// Release notes.
    pub changelog: String,
    /// Minimum platform version.
    pub requires: String,
    /// Minimum runtime version.
    pub requires_php: String,
    /// Last platform version tested.
    pub tested: String,
}

impl ReleaseDescriptor {
    /// The signed fields of this descriptor.
    pub fn canonical_message(&self) -> CanonicalMessage<'_> {
        CanonicalMessage::new(&self.version, &self.download_url, &self.sha256, &self.released_at)
    }
}
