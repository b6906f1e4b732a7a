//! `sign-release <VERSION> <ARCHIVE>` — sign a release and print its manifest.

use std::io::Write;

use anyhow::Context;
use clap::CommandFactory;
use clap::error::ErrorKind;
use release_signing::ReleaseSigner;
use release_signing::SignerConfig;
use release_signing::keys::KeyOrigin;
use release_signing::manifest;
use release_signing::signer::KeyPolicy;

use crate::KeyArgs;
use crate::SignArgs;

pub fn run(args: SignArgs) -> anyhow::Result<()> {
    let (Some(version), Some(archive)) = (args.release_version.as_deref(), args.archive.as_deref()) else {
        crate::Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "expected <VERSION> <ARCHIVE>\n\nExample: sign-release 3.1.4 dist/plugin.zip > public/update.json",
            )
            .exit();
    };

    let mut config = load_config(&args.key)?;
    if let Some(base_url) = args.base_url {
        config.download_base_url = base_url;
    }

    let changelog = match &args.changelog_file {
        Some(path) => Some(
            std::fs::read_to_string(path).with_context(|| format!("reading changelog {}", path.display()))?,
        ),
        None => None,
    };

    let key_policy = if args.require_key {
        KeyPolicy::RequireExisting
    } else {
        KeyPolicy::LoadOrCreate
    };
    let signer = ReleaseSigner::new(config)?.with_key_policy(key_policy);
    let signed = signer
        .sign(version, archive, changelog.as_deref())
        .with_context(|| format!("signing release {version}"))?;

    let mut stderr = std::io::stderr().lock();
    if signed.key_origin == KeyOrigin::Generated {
        writeln!(stderr, "No signing key found at {}", signer.config().key_path.display())?;
        manifest::write_key_report(&mut stderr, &signed.keypair, &signer.config().key_path, false)?;
    }

    // Render fully before writing so a failure leaves no partial JSON behind.
    let json = manifest::render_manifest(&signed.descriptor)?;
    match &args.output {
        Some(path) => std::fs::write(path, &json).with_context(|| format!("writing manifest {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.flush()?;
        }
    }

    manifest::write_summary(&mut stderr, &signed)?;
    Ok(())
}

/// Load the config file (or defaults) and apply key overrides from the command line.
pub fn load_config(args: &KeyArgs) -> anyhow::Result<SignerConfig> {
    let mut config = match &args.config {
        Some(path) => SignerConfig::from_file(path).with_context(|| format!("loading config {}", path.display()))?,
        None => SignerConfig::default(),
    };
    if let Some(key) = &args.key {
        config.key_path = key.clone();
    }
    if let Some(key_id) = &args.key_id {
        config.key_id = key_id.clone();
    }
    config.validate()?;
    Ok(config)
}
