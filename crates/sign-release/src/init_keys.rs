//! `sign-release init-keys` — generate and save a signing keypair.

use std::path::Path;

use anyhow::Context;
use release_signing::SigningKeypair;
use release_signing::keys;
use release_signing::keys::TrustedKeys;
use release_signing::manifest;

use crate::KeyArgs;

pub fn run(args: &KeyArgs, force: bool, trust_store: Option<&Path>) -> anyhow::Result<()> {
    let config = crate::sign::load_config(args)?;
    let key_path = &config.key_path;

    // Don't overwrite existing keys
    if key_path.exists() && !force {
        anyhow::bail!("key file already exists at {}. Remove it first or pass --force.", key_path.display());
    }

    let keypair = SigningKeypair::generate(&config.key_id);
    keys::save(key_path, &keypair, force)?;

    if let Some(store_path) = trust_store {
        let mut trusted = TrustedKeys::load(store_path)?;
        if let Some(previous) = trusted.add(&config.key_id, &keypair.public_key_base64())? {
            tracing::warn!(key_id = %config.key_id, %previous, "replacing trusted public key");
        }
        trusted.save(store_path).with_context(|| format!("updating trust store {}", store_path.display()))?;
    }

    manifest::write_key_report(&mut std::io::stderr().lock(), &keypair, key_path, true)?;
    println!("{}", manifest::trust_store_entry(&keypair));

    Ok(())
}
