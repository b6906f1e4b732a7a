//! `sign-release verify` — check a manifest's signature.

use std::path::Path;

use anyhow::Context;
use release_signing::ReleaseDescriptor;
use release_signing::keys::TrustedKeys;
use release_signing::verifier;

pub fn run(
    manifest_path: &Path,
    archive: Option<&Path>,
    public_key: Option<&str>,
    trust_store: Option<&Path>,
) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(manifest_path)
        .with_context(|| format!("reading manifest {}", manifest_path.display()))?;
    let descriptor: ReleaseDescriptor =
        serde_json::from_str(&data).with_context(|| format!("parsing manifest {}", manifest_path.display()))?;

    match (public_key, trust_store) {
        (Some(key), _) => verifier::verify_descriptor(&descriptor, key)?,
        (None, Some(path)) => {
            let trusted = TrustedKeys::load(path)?;
            verifier::verify_trusted(&descriptor, &trusted)?;
        }
        (None, None) => anyhow::bail!("pass --public-key or --trust-store"),
    }

    if let Some(archive) = archive {
        verifier::verify_archive(&descriptor, archive)?;
    }

    println!("✓ Signature valid");
    println!("  Version: {}", descriptor.version);
    println!("  Key ID: {}", descriptor.key_id);
    println!("  SHA-256: {}", descriptor.sha256);
    if archive.is_some() {
        println!("  Archive digest matches");
    }

    Ok(())
}
