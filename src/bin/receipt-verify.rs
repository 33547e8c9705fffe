//! receipt-verify - offline App Store receipt validation
//!
//! Reads a base64 receipt on stdin and prints the validation result as JSON.

use std::{
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use receipt_verify::{
    config::{load_trust_anchor, TrustAnchorSource, DEFAULT_CERTIFICATE_ENV},
    domain::entities::validation_result::Environment,
    util::ReceiptUtil,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "receipt-verify")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Trust anchor certificate file (PEM or DER)
    #[arg(long)]
    cert_file: Option<PathBuf>,

    /// Environment variable holding the trust anchor PEM, used when no
    /// certificate file is given
    #[arg(long, default_value = DEFAULT_CERTIFICATE_ENV)]
    cert_env: String,

    /// Report the production environment for receipts signed under this
    /// anchor
    #[arg(long)]
    production: bool,

    /// Verification time (RFC 3339), defaults to the current time
    #[arg(long)]
    now: Option<DateTime<Utc>>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let source = match cli.cert_file {
        Some(path) => TrustAnchorSource::File(path),
        None => TrustAnchorSource::Env(cli.cert_env),
    };
    let environment = if cli.production {
        Environment::Production
    } else {
        Environment::Sandbox
    };
    let anchor = load_trust_anchor(&source)
        .context("failed to load trust anchor")?
        .with_environment(environment);

    let mut receipt_data = String::new();
    io::stdin()
        .read_to_string(&mut receipt_data)
        .context("failed to read receipt from stdin")?;

    let now = cli.now.unwrap_or_else(Utc::now);
    let result = ReceiptUtil::new().validate(Some(&anchor), receipt_data.trim(), now);
    serde_json::to_string(&result).context("failed to encode validation result")
}
