// src/lib.rs

pub mod attach;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod output;
pub mod process;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{
    DebugLaunchConfig, RunConfiguration, load_settings, resolve_debug_configuration,
};
use crate::engine::Orchestrator;
use crate::output::OutputChannel;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings loading and debug configuration resolution
/// - the production orchestrator (builder, debug launcher, attach poller)
/// - (optional) file watching
/// - Ctrl-C handling and shutdown
pub async fn run(args: CliArgs) -> Result<()> {
    let workspace = match &args.workspace {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("resolving current directory")?,
    };

    let settings = load_settings(args.config_path(&workspace).as_deref(), &workspace)?;
    let launch = resolve_debug_configuration(&settings, &args.overrides());

    if args.print_config {
        print_launch_config(&launch)?;
        return Ok(());
    }

    let config = Arc::new(RunConfiguration::new(&launch, &settings));
    debug!(?config, "resolved run configuration");

    let out = OutputChannel::default();
    let orchestrator = Arc::new(Orchestrator::production(Arc::clone(&config), out));

    if args.once {
        orchestrator.start_once(&workspace).await?;
    } else {
        orchestrator.start(&workspace).await?;
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("shutdown requested");

    let report = orchestrator.shutdown(&workspace).await;
    debug!(?report, "session terminated");
    Ok(())
}

/// Print the resolved debug launch configuration as TOML.
fn print_launch_config(launch: &DebugLaunchConfig) -> Result<()> {
    let rendered = toml::to_string(launch).context("rendering launch configuration")?;
    println!("{rendered}");
    Ok(())
}
