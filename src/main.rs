//! # s3-file-resource
//!
//! Reconciles one managed file against an S3 object and exits.
//!
//! ## Usage
//!
//! ```bash
//! # Download once, leave local edits alone afterwards
//! s3-file-resource /etc/app/settings.yaml --source /config-bucket/app/settings.yaml
//!
//! # Keep the file identical to the object
//! s3-file-resource /etc/app/settings.yaml --source /config-bucket/app/settings.yaml --ensure latest
//!
//! # S3-compatible store with a self-signed certificate
//! s3-file-resource /opt/data/blob.bin --source /bucket/blob.bin \
//!     --endpoint https://ceph.internal:8443 --ssl-verify-peer false --force-path-style true
//! ```
//!
//! Credentials not given as flags are read from `aws_config.yaml` next to the
//! host agent's configuration file (`--host-config` / `S3_RESOURCE_HOST_CONFIG`).

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use s3_file_resource::config::{AgentConfig, ConfigResolver, FileFallbackSource};
use s3_file_resource::controller::fs::write_atomically;
use s3_file_resource::controller::{Outcome, Reconciler};
use s3_file_resource::observability::{self, metrics};
use s3_file_resource::provider::s3::S3Connector;
use s3_file_resource::resource::{CredentialParams, EnsureState, ResourceSpec};
use s3_file_resource::Error;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BUILD_GIT_HASH"),
    ", built ",
    env!("BUILD_DATETIME"),
    ")"
);

/// Keep a local file in line with an object in S3
#[derive(Parser)]
#[command(name = "s3-file-resource", version, long_version = LONG_VERSION)]
struct Cli {
    /// Absolute path of the managed file
    path: PathBuf,

    /// Object reference, `/bucket/key/with/slashes`
    #[arg(long)]
    source: String,

    /// Desired state of the file
    #[arg(long, default_value = "present")]
    ensure: EnsureState,

    #[arg(long)]
    access_key_id: Option<String>,

    #[arg(long)]
    secret_access_key: Option<String>,

    #[arg(long)]
    region: Option<String>,

    /// S3-compatible endpoint URL; enables the endpoint settings below
    #[arg(long)]
    endpoint: Option<String>,

    #[arg(long)]
    ssl_verify_peer: Option<bool>,

    #[arg(long)]
    force_path_style: Option<bool>,

    /// Host agent configuration file; `aws_config.yaml` is looked up beside it
    #[arg(long)]
    host_config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Write Prometheus metrics here after the run (textfile collector format)
    #[arg(long)]
    metrics_textfile: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    path: &'a Path,
    ensure: EnsureState,
    #[serde(flatten)]
    outcome: Outcome,
}

impl Cli {
    fn resource_spec(&self) -> ResourceSpec {
        ResourceSpec::new(&self.path, &self.source, self.ensure).with_credentials(
            CredentialParams {
                access_key_id: self.access_key_id.clone(),
                secret_access_key: self.secret_access_key.clone(),
                region: self.region.clone(),
                endpoint: self.endpoint.clone(),
                ssl_verify_peer: self.ssl_verify_peer,
                force_path_style: self.force_path_style,
            },
        )
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", describe(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut agent = AgentConfig::from_env();
    if let Some(host_config) = &cli.host_config {
        agent.host_config_path.clone_from(host_config);
    }

    observability::init_tracing(&agent.log_level, &agent.log_format, agent.log_enable_color)?;
    metrics::register_metrics()?;

    info!(
        "Starting s3-file-resource {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_GIT_HASH")
    );
    debug!("Agent configuration: {:?}", agent);

    let spec = cli.resource_spec();
    spec.validate().map_err(Error::from)?;

    let fallback = FileFallbackSource::new(agent.fallback_config_path());
    debug!("Fallback S3 configuration file: {}", fallback.path().display());
    let reconciler = Reconciler::new(ConfigResolver::new(fallback), Arc::new(S3Connector));

    let result = reconciler.ensure(&spec).await;

    let metrics_written = async {
        if let Some(textfile) = &cli.metrics_textfile {
            let text = metrics::gather_text()?;
            write_atomically(textfile, text.as_bytes())
                .await
                .with_context(|| format!("Failed to write metrics to {}", textfile.display()))?;
        }
        Ok(())
    }
    .await;

    let outcome = settle(result, metrics_written)?;
    match cli.output {
        OutputFormat::Text => println!("{}: {}", spec.path().display(), outcome),
        OutputFormat::Json => {
            let report = Report {
                path: spec.path(),
                ensure: spec.ensure,
                outcome,
            };
            println!("{}", serde_json::to_string(&report)?);
        }
    }
    Ok(())
}

/// A failed reconciliation is the error reported; a metrics write failure
/// only surfaces when the reconciliation itself succeeded.
fn settle(
    result: s3_file_resource::Result<Outcome>,
    metrics_written: Result<()>,
) -> Result<Outcome> {
    match (result, metrics_written) {
        (Ok(outcome), Ok(())) => Ok(outcome),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e.into()),
        (Err(e), Err(metrics_err)) => {
            warn!("Metrics textfile not written: {:#}", metrics_err);
            Err(e.into())
        }
    }
}

/// `<code>: <message>` for crate errors, the full context chain otherwise
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<Error>() {
        Some(Error::Store(store)) => format!("{}: {}", store.code(), store.message()),
        Some(e) => format!("{}: {}", e.code(), e),
        None => format!("{err:#}"),
    }
}
