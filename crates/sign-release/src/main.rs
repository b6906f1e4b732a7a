//! `sign-release` — sign a release archive and emit its update manifest.
//!
//! ```text
//! sign-release 3.1.4 dist/plugin.zip > public/update.json
//! ```
//!
//! The manifest JSON is the only thing written to stdout; logs, the signing
//! summary and newly generated keys go to stderr.

mod init_keys;
mod sign;
mod verify;

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Sign a release archive and print its update manifest.
#[derive(Parser)]
#[command(name = "sign-release", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    sign: SignArgs,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

/// Settings shared by every command that touches the signing key.
#[derive(Args, Debug, Default)]
pub struct KeyArgs {
    /// TOML file with signer settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Private key file (base64). Overrides `key_path` from the config.
    #[arg(long)]
    key: Option<PathBuf>,

    /// Key identifier. Overrides `key_id` from the config.
    #[arg(long)]
    key_id: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct SignArgs {
    /// Release version, e.g. 3.1.4.
    #[arg(value_name = "VERSION")]
    release_version: Option<String>,

    /// Path to the built release archive.
    #[arg(value_name = "ARCHIVE")]
    archive: Option<PathBuf>,

    #[command(flatten)]
    key: KeyArgs,

    /// Base URL the archive will be served from.
    #[arg(long)]
    base_url: Option<String>,

    /// File whose contents become the manifest changelog.
    #[arg(long)]
    changelog_file: Option<PathBuf>,

    /// Fail instead of generating a key when the key file is missing.
    #[arg(long)]
    require_key: bool,

    /// Write the manifest to this file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate and save a new signing keypair.
    InitKeys {
        #[command(flatten)]
        key: KeyArgs,

        /// Overwrite an existing key file.
        #[arg(long)]
        force: bool,

        /// Also record the public key in this trusted-keys JSON file.
        #[arg(long)]
        trust_store: Option<PathBuf>,
    },

    /// Verify a manifest's signature (and optionally its archive).
    Verify {
        /// Manifest JSON produced by this tool.
        manifest: PathBuf,

        /// Archive to check against the manifest's SHA-256.
        #[arg(long)]
        archive: Option<PathBuf>,

        /// Expected public key (base64).
        #[arg(long, conflicts_with = "trust_store", required_unless_present = "trust_store")]
        public_key: Option<String>,

        /// Trusted-keys JSON file mapping key ids to public keys.
        #[arg(long)]
        trust_store: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        None => sign::run(cli.sign),
        Some(Command::InitKeys {
            key,
            force,
            trust_store,
        }) => init_keys::run(&key, force, trust_store.as_deref()),
        Some(Command::Verify {
            manifest,
            archive,
            public_key,
            trust_store,
        }) => verify::run(&manifest, archive.as_deref(), public_key.as_deref(), trust_store.as_deref()),
    }
}

/// Send logs to stderr so stdout carries only the manifest.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
