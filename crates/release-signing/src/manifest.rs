//! Manifest output.
//!
//! The JSON manifest goes to the primary writer (normally stdout) and is the
//! only thing written there. Operator-facing text (the signing summary and
//! newly generated key material) goes to a separate diagnostic writer.

use std::io::Write;

use crate::descriptor::ReleaseDescriptor;
use crate::error::SigningError;
use crate::keys::SigningKeypair;
use crate::signer::SignedRelease;

/// Render the descriptor as two-space indented JSON with a trailing newline.
pub fn render_manifest(descriptor: &ReleaseDescriptor) -> Result<String, SigningError> {
    let mut json = serde_json::to_string_pretty(descriptor)?;
    json.push('\n');
    Ok(json)
}

/// Write the manifest in one piece. Nothing is written if rendering fails.
pub fn write_manifest<W: Write>(out: &mut W, descriptor: &ReleaseDescriptor) -> Result<(), SigningError> {
    let json = render_manifest(descriptor)?;
    out.write_all(json.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|e| SigningError::io("writing manifest to", "<output>", e))
}

/// Human-readable confirmation of a completed signing.
pub fn write_summary<W: Write>(diag: &mut W, signed: &SignedRelease) -> std::io::Result<()> {
    let d = &signed.descriptor;
    writeln!(diag)?;
    writeln!(diag, "=== RELEASE SIGNED ===")?;
    writeln!(diag, "Version: {}", d.version)?;
    writeln!(diag, "SHA-256: {}", d.sha256)?;
    writeln!(diag, "Key ID: {}", d.key_id)?;
    writeln!(diag, "Public Key: {}", signed.keypair.public_key_base64())?;
    writeln!(diag, "Released: {}", d.released_at)?;
    Ok(())
}

/// Report a newly generated keypair so the operator can store it.
///
/// The private key appears here and nowhere else.
pub fn write_key_report<W: Write>(
    diag: &mut W,
    keypair: &SigningKeypair,
    key_path: &std::path::Path,
    saved: bool,
) -> std::io::Result<()> {
    writeln!(diag, "=== NEW KEY PAIR GENERATED ===")?;
    writeln!(diag, "Key ID: {}", keypair.key_id())?;
    writeln!(diag)?;
    if saved {
        writeln!(diag, "PRIVATE KEY saved to {} (keep it secret, back it up offline)", key_path.display())?;
    } else {
        writeln!(diag, "PRIVATE KEY (save to {}):", key_path.display())?;
        writeln!(diag, "{}", keypair.private_key_base64())?;
    }
    writeln!(diag)?;
    writeln!(diag, "PUBLIC KEY (add to the update client's trusted keys):")?;
    writeln!(diag, "{}", trust_store_entry(keypair))?;
    writeln!(diag)?;
    Ok(())
}

/// The line a client's trusted-keys table needs for this keypair.
pub fn trust_store_entry(keypair: &SigningKeypair) -> String {
    format!("'{}' => '{}',", keypair.key_id(), keypair.public_key_base64())
}
