//! Ed25519 key management and trust store.
//!
//! Private keys are stored as a single line of standard base64 holding the
//! 32-byte Ed25519 seed. Public keys use the same encoding, which is what the
//! update client keeps in its trust store.

use std::collections::BTreeMap;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::SigningKey;
use ed25519_dalek::VerifyingKey;
use serde::Deserialize;
use serde::Serialize;

use crate::error::SigningError;

/// Length of an Ed25519 private seed and of a public key.
pub const KEY_LENGTH: usize = 32;

/// An Ed25519 keypair bound to the key identifier clients know it by.
#[derive(Clone)]
pub struct SigningKeypair {
    key_id: String,
    signing_key: SigningKey,
}

impl SigningKeypair {
    /// Generate a fresh keypair from the OS random number generator.
    pub fn generate(key_id: &str) -> Self {
        Self {
            key_id: key_id.to_string(),
            signing_key: SigningKey::generate(&mut rand_core::OsRng),
        }
    }

    /// Wrap an existing Ed25519 signing key.
    pub fn from_signing_key(key_id: &str, signing_key: SigningKey) -> Self {
        Self {
            key_id: key_id.to_string(),
            signing_key,
        }
    }

    /// Decode a base64 private seed. `origin` names where it came from in errors.
    pub fn from_private_base64(key_id: &str, encoded: &str, origin: &Path) -> Result<Self, SigningError> {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|source| SigningError::InvalidKeyEncoding {
            path: origin.to_path_buf(),
            source,
        })?;
        let seed: [u8; KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| SigningError::InvalidKeyLength {
            path: origin.to_path_buf(),
            len: bytes.len(),
        })?;
        Ok(Self::from_signing_key(key_id, SigningKey::from_bytes(&seed)))
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Base64 of the private seed. Handle with care.
    pub fn private_key_base64(&self) -> String {
        STANDARD.encode(self.signing_key.to_bytes())
    }

    /// Base64 of the public key, as distributed to verifying clients.
    pub fn public_key_base64(&self) -> String {
        STANDARD.encode(self.signing_key.verifying_key().as_bytes())
    }
}

impl std::fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeypair")
            .field("key_id", &self.key_id)
            .field("public_key", &self.public_key_base64())
            .finish_non_exhaustive()
    }
}

/// Decode a base64 public key into an Ed25519 verifying key.
pub fn decode_public_key(encoded: &str) -> Result<VerifyingKey, SigningError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| SigningError::InvalidPublicKey(format!("not base64: {e}")))?;
    let array: [u8; KEY_LENGTH] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| SigningError::InvalidPublicKey(format!("expected 32 bytes, got {}", bytes.len())))?;
    VerifyingKey::from_bytes(&array).map_err(|e| SigningError::InvalidPublicKey(e.to_string()))
}

// ---------------------------------------------------------------------------
// Key Store
// ---------------------------------------------------------------------------

/// Where a keypair returned by [`load_or_create`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Read from the key file.
    Loaded,
    /// Freshly generated; not written anywhere. The operator must save it.
    Generated,
}

/// Load the private key stored at `path`.
pub fn load(path: &Path, key_id: &str) -> Result<SigningKeypair, SigningError> {
    if !path.exists() {
        return Err(SigningError::KeyNotFound {
            path: path.to_path_buf(),
        });
    }
    let encoded = std::fs::read_to_string(path).map_err(|e| SigningError::io("reading signing key", path, e))?;
    let keypair = SigningKeypair::from_private_base64(key_id, &encoded, path)?;
    tracing::debug!(path = %path.display(), key_id, "loaded signing key");
    Ok(keypair)
}

/// Load the key at `path`, or generate a new one if the file is absent.
///
/// A generated key is never persisted; callers are expected to report it to
/// the operator (see [`crate::manifest::write_key_report`]).
pub fn load_or_create(path: &Path, key_id: &str) -> Result<(SigningKeypair, KeyOrigin), SigningError> {
    match load(path, key_id) {
        Ok(keypair) => Ok((keypair, KeyOrigin::Loaded)),
        Err(SigningError::KeyNotFound { .. }) => {
            tracing::warn!(path = %path.display(), key_id, "no signing key found, generating a new keypair");
            Ok((SigningKeypair::generate(key_id), KeyOrigin::Generated))
        }
        Err(e) => Err(e),
    }
}

/// Save a private key to `path` as a single base64 line.
///
/// Refuses to overwrite an existing file unless `force` is set. Sets file
/// permissions to 0o600 on Unix.
pub fn save(path: &Path, keypair: &SigningKeypair, force: bool) -> Result<(), SigningError> {
    if path.exists() && !force {
        return Err(SigningError::KeyFileExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SigningError::io("creating key directory", parent, e))?;
    }
    let line = format!("{}\n", keypair.private_key_base64());
    std::fs::write(path, line).map_err(|e| SigningError::io("writing signing key", path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(|e| SigningError::io("restricting key permissions", path, e))?;
    }

    tracing::debug!(path = %path.display(), key_id = keypair.key_id(), "saved signing key");
    Ok(())
}

// ---------------------------------------------------------------------------
// Trusted Keys Store
// ---------------------------------------------------------------------------

/// Client-side mapping from key id to base64 public key.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TrustedKeys {
    /// Public keys by key id.
    pub keys: BTreeMap<String, String>,
}

impl TrustedKeys {
    /// Load trusted keys from a JSON file. Returns an empty set if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, SigningError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|e| SigningError::io("reading trust store", path, e))?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save trusted keys to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), SigningError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SigningError::io("creating trust store directory", parent, e))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data).map_err(|e| SigningError::io("writing trust store", path, e))
    }

    /// Trust `public_key` for `key_id`. The key must decode to a valid Ed25519 point.
    ///
    /// Returns the previous key for that id, if any.
    pub fn add(&mut self, key_id: &str, public_key: &str) -> Result<Option<String>, SigningError> {
        decode_public_key(public_key)?;
        Ok(self.keys.insert(key_id.to_string(), public_key.trim().to_string()))
    }

    /// Remove a key id. Returns whether it was present.
    pub fn remove(&mut self, key_id: &str) -> bool {
        self.keys.remove(key_id).is_some()
    }

    /// Look up the public key for `key_id`.
    pub fn get(&self, key_id: &str) -> Result<&str, SigningError> {
        self.keys
            .get(key_id)
            .map(String::as_str)
            .ok_or_else(|| SigningError::UntrustedKey(key_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_ID: &str = "key-test";

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signing-key");

        let key = SigningKeypair::generate(KEY_ID);
        save(&path, &key, false).unwrap();

        let loaded = load(&path, KEY_ID).unwrap();
        assert_eq!(key.signing_key().to_bytes(), loaded.signing_key().to_bytes());
        assert_eq!(key.public_key_base64(), loaded.public_key_base64());
    }

    #[test]
    fn saved_file_is_single_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signing-key");
        let key = SigningKeypair::generate(KEY_ID);
        save(&path, &key, false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{}\n", key.private_key_base64()));
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signing-key");
        save(&path, &SigningKeypair::generate(KEY_ID), false).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn save_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signing-key");
        let first = SigningKeypair::generate(KEY_ID);
        save(&path, &first, false).unwrap();

        let err = save(&path, &SigningKeypair::generate(KEY_ID), false).unwrap_err();
        assert!(matches!(err, SigningError::KeyFileExists { .. }));
        assert_eq!(load(&path, KEY_ID).unwrap().public_key_base64(), first.public_key_base64());

        let second = SigningKeypair::generate(KEY_ID);
        save(&path, &second, true).unwrap();
        assert_eq!(load(&path, KEY_ID).unwrap().public_key_base64(), second.public_key_base64());
    }

    #[test]
    fn load_or_create_reuses_existing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signing-key");
        save(&path, &SigningKeypair::generate(KEY_ID), false).unwrap();

        let (a, origin_a) = load_or_create(&path, KEY_ID).unwrap();
        let (b, origin_b) = load_or_create(&path, KEY_ID).unwrap();
        assert_eq!(origin_a, KeyOrigin::Loaded);
        assert_eq!(origin_b, KeyOrigin::Loaded);
        assert_eq!(a.public_key_base64(), b.public_key_base64());
    }

    #[test]
    fn load_or_create_generates_without_persisting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signing-key");

        let (key, origin) = load_or_create(&path, KEY_ID).unwrap();
        assert_eq!(origin, KeyOrigin::Generated);
        assert_eq!(key.key_id(), KEY_ID);
        assert!(!path.exists(), "generated key must not be written");
    }

    #[test]
    fn load_accepts_trailing_newline_and_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signing-key");
        let key = SigningKeypair::generate(KEY_ID);
        std::fs::write(&path, format!("  {}\r\n", key.private_key_base64())).unwrap();

        assert_eq!(load(&path, KEY_ID).unwrap().public_key_base64(), key.public_key_base64());
    }

    #[test]
    fn malformed_key_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signing-key");
        std::fs::write(&path, "not base64 at all!\n").unwrap();

        let err = load_or_create(&path, KEY_ID).unwrap_err();
        assert!(matches!(err, SigningError::InvalidKeyEncoding { .. }));
        assert!(err.to_string().contains("signing-key"));
    }

    #[test]
    fn truncated_key_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signing-key");
        std::fs::write(&path, STANDARD.encode([7u8; 16])).unwrap();

        let err = load_or_create(&path, KEY_ID).unwrap_err();
        assert!(matches!(err, SigningError::InvalidKeyLength { len: 16, .. }));
    }

    #[test]
    fn empty_key_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signing-key");
        std::fs::write(&path, "\n").unwrap();

        let err = load(&path, KEY_ID).unwrap_err();
        assert!(matches!(err, SigningError::InvalidKeyLength { len: 0, .. }));
    }

    #[test]
    fn public_key_is_derived_from_seed() {
        let seed = [42u8; 32];
        let a = SigningKeypair::from_private_base64(KEY_ID, &STANDARD.encode(seed), Path::new("a")).unwrap();
        let b = SigningKeypair::from_signing_key(KEY_ID, SigningKey::from_bytes(&seed));
        assert_eq!(a.public_key_base64(), b.public_key_base64());
        assert_eq!(STANDARD.decode(a.public_key_base64()).unwrap().len(), KEY_LENGTH);
    }

    #[test]
    fn debug_does_not_leak_private_key() {
        let key = SigningKeypair::generate(KEY_ID);
        let rendered = format!("{key:?}");
        assert!(!rendered.contains(&key.private_key_base64()));
        assert!(rendered.contains(&key.public_key_base64()));
    }

    #[test]
    fn decode_public_key_rejects_bad_input() {
        assert!(matches!(decode_public_key("%%%"), Err(SigningError::InvalidPublicKey(_))));
        assert!(matches!(decode_public_key(&STANDARD.encode([1u8; 8])), Err(SigningError::InvalidPublicKey(_))));
    }

    #[test]
    fn trusted_keys_add_get_remove() {
        let key = SigningKeypair::generate(KEY_ID);
        let mut keys = TrustedKeys::default();
        assert!(matches!(keys.get(KEY_ID), Err(SigningError::UntrustedKey(_))));

        assert_eq!(keys.add(KEY_ID, &key.public_key_base64()).unwrap(), None);
        assert_eq!(keys.get(KEY_ID).unwrap(), key.public_key_base64());

        assert!(keys.add("other", "garbage").is_err());
        assert!(keys.remove(KEY_ID));
        assert!(!keys.remove(KEY_ID));
    }

    #[test]
    fn trusted_keys_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trusted.json");

        let mut keys = TrustedKeys::default();
        keys.add("key-a", &SigningKeypair::generate("key-a").public_key_base64()).unwrap();
        keys.add("key-b", &SigningKeypair::generate("key-b").public_key_base64()).unwrap();
        keys.save(&path).unwrap();

        assert_eq!(TrustedKeys::load(&path).unwrap(), keys);
    }

    #[test]
    fn trusted_keys_load_nonexistent_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let keys = TrustedKeys::load(&dir.path().join("missing.json")).unwrap();
        assert!(keys.keys.is_empty());
    }
}
