//! tfhost
//!
//! Ansible dynamic inventory script backed by a Terraform state file

use std::io::{self, Read, Write};
use std::path::Path;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use color_eyre::{Result, Section};
use eyre::WrapErr;
use tfhost_core::{InventoryError, StateDocument, build_inventory};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;

use cli::Args;
use config::{Config, LogFormat, TemplateOverrides};

/// Level used when neither `RUST_LOG`, `--debug` nor the config file set one
const DEFAULT_LOG_LEVEL: &str = "warn";

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();
    let Some(query) = args.query() else {
        Args::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "nothing to do: pass --list or --host <INVENTORY_NAME>",
            )
            .exit();
    };

    let (config, config_path) = Config::load_default(args.config.as_deref())?;
    init_tracing(args.debug, &config);
    debug!(path = ?config_path, "configuration loaded");

    let pipeline = config
        .pipeline(
            &TemplateOverrides::from(&args.resource),
            &TemplateOverrides::from(&args.output),
        )
        .map_err(report)?;

    let text = read_state(&args.state)?;
    let state = StateDocument::from_json(&text)
        .map_err(|e| report(e).wrap_err(format!("failed to load state from {}", args.state.display())))?;
    debug!(
        version = ?state.version,
        terraform_version = ?state.terraform_version,
        "state loaded"
    );

    let inventory = build_inventory(&state, &pipeline).map_err(report)?;
    let document = inventory.respond(&query);

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &document).wrap_err("failed to write inventory")?;
    writeln!(stdout).wrap_err("failed to write inventory")?;

    Ok(())
}

/// Logs go to stderr; stdout carries only the inventory document
fn init_tracing(debug: bool, config: &Config) {
    let fallback = if debug {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init(),
    }
}

fn read_state(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .wrap_err("failed to read state from stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read state file {}", path.display()))
}

fn report(err: InventoryError) -> eyre::Report {
    let template_error = err.is_template_error();
    let report = eyre::Report::new(err);
    if template_error {
        report.suggestion(
            "check the template flags, TF_ANSIBLE_* environment variables and the tfhost.toml [templates] tables",
        )
    } else {
        report
    }
}
