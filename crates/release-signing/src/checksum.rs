//! Streaming SHA-256 of release archives.

use std::fs::File;
use std::io::ErrorKind;
use std::io::Read;
use std::path::Path;

use sha2::Digest;
use sha2::Sha256;

use crate::error::SigningError;

/// Read size used when hashing files.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Compute the lowercase hex SHA-256 of the file at `path`.
///
/// Returns [`SigningError::ArchiveNotFound`] when `path` is not a regular
/// file, and [`SigningError::Io`] for failures while reading.
pub fn sha256_file(path: &Path) -> Result<String, SigningError> {
    if !path.is_file() {
        return Err(SigningError::ArchiveNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SigningError::ArchiveNotFound {
            path: path.to_path_buf(),
        },
        _ => SigningError::io("opening archive", path, e),
    })?;
    let digest = sha256_reader(&mut file, CHUNK_SIZE).map_err(|e| SigningError::io("reading archive", path, e))?;
    tracing::debug!(path = %path.display(), sha256 = %digest, "hashed archive");
    Ok(digest)
}

/// Hash everything `reader` yields, `chunk_size` bytes at a time.
pub fn sha256_reader<R: Read>(reader: &mut R, chunk_size: usize) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let count = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..count]);
    }
    Ok(hex::encode(hasher.finalize()))
}
