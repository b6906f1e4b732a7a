//! The canonical release message.
//!
//! This byte string is the exact input to signing and verification:
//!
//! ```text
//! version=<version>\n
//! download_url=<download_url>\n
//! sha256=<sha256>\n
//! released_at=<released_at>\n
//! ```
//!
//! Deployed clients rebuild it from the manifest fields and check the
//! signature over it, so the field set, order, and separators are a pinned
//! wire format. Values are not escaped; callers must not pass values with
//! embedded newlines. Adding a field is an incompatible change and needs a new
//! key id or a versioned format tag.

/// The four fields covered by the release signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalMessage<'a> {
    pub version: &'a str,
    pub download_url: &'a str,
    pub sha256: &'a str,
    pub released_at: &'a str,
}

impl<'a> CanonicalMessage<'a> {
    pub fn new(version: &'a str, download_url: &'a str, sha256: &'a str, released_at: &'a str) -> Self {
        Self {
            version,
            download_url,
            sha256,
            released_at,
        }
    }

    /// Serialize to the signed byte string.
    pub fn to_bytes(&self) -> Vec<u8> {
        build(self.version, self.download_url, self.sha256, self.released_at)
    }
}

/// Build the canonical message bytes from the four signed fields.
pub fn build(version: &str, download_url: &str, sha256: &str, released_at: &str) -> Vec<u8> {
    format!("version={version}\ndownload_url={download_url}\nsha256={sha256}\nreleased_at={released_at}\n").into_bytes()
}
