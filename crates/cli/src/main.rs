// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! qaorc - repository-wide QA orchestrator

mod error;
mod exit_error;
mod report;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use exit_error::ExitError;
use qaorc_core::RunReport;
use qaorc_engine::{provision, release, run_scheduler, PipelineOptions, ProvisionRequest, SchedulerOptions};

/// qaorc - discovers per-project test manifests, provisions a shared
/// interpreter environment, and runs each project's QA pipeline with
/// bounded parallelism.
#[derive(Parser)]
#[command(name = "qaorc", version, about = "Repository-wide QA orchestrator")]
struct Cli {
    /// Maximum number of Pipeline Runners active at once
    #[arg(long, default_value_t = 6)]
    atonce: usize,

    /// Discovery root (default: current directory)
    #[arg(long, value_name = "PATH")]
    base_dir: Option<PathBuf>,

    /// Verbose diagnostics (forces debug-level logging regardless of RUST_LOG)
    #[arg(long)]
    debug: bool,

    /// Promote interpreter-level deprecation warnings to errors in tests_run
    #[arg(long)]
    error_on_warnings: bool,

    /// Do not delete an owned environment on exit
    #[arg(long)]
    keep_venv: bool,

    /// Installer index URL (default: public index)
    #[arg(long, value_name = "URL")]
    mirror: Option<String>,

    /// Print per-project coverage percentages after the summary
    #[arg(long)]
    print_cov: bool,

    /// Print candidate manifests that did not yield a Project
    #[arg(long)]
    print_non_configured: bool,

    /// Heartbeat interval in seconds; 0 disables
    #[arg(long, default_value_t = 0)]
    progress_interval: u64,

    /// Run projects marked `disabled` anyway
    #[arg(long)]
    run_disabled: bool,

    /// Write the JSON statistics artifact to this path
    #[arg(long, value_name = "PATH")]
    stats_file: Option<PathBuf>,

    /// Allow the environment to see the system site-packages
    #[arg(long)]
    system_site_packages: bool,

    /// Adopt an existing environment instead of creating one
    #[arg(long, value_name = "PATH")]
    venv: Option<PathBuf>,

    /// Environment bootstrap timeout in seconds
    #[arg(long, default_value_t = 120)]
    venv_timeout: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli).await {
        let code = e.downcast_ref::<ExitError>().map_or(1, |c| c.code);
        let msg = e.to_string();
        if !msg.is_empty() {
            eprintln!("Error: {msg}");
        }
        std::process::exit(code);
    }
}

/// A generated path for the stats artifact when `--stats-file` is absent,
/// same temp-root naming scheme the Environment Provisioner uses for a
/// created environment.
fn default_stats_path() -> PathBuf {
    use qaorc_core::id::{IdGen, UuidIdGen};
    let id_gen = UuidIdGen;
    std::env::temp_dir().join(format!("qaorc-stats-{}.json", id_gen.next()))
}

/// Install the process-wide subscriber. `--debug` forces `debug` level
/// regardless of `RUST_LOG`, the same override `oj-daemon` gives its own
/// verbose flag.
fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let base_dir = cli
        .base_dir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let discovery = qaorc_manifest::walk(&base_dir);
    if discovery.projects.is_empty() {
        let err = qaorc_engine::DiscoveryEmptyError;
        return Err(ExitError::new(3, err.to_string()).into());
    }

    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling run");
            let _ = cancel_tx.send(true);
        }
    });

    let provision_request = ProvisionRequest {
        adopt_path: cli.venv.clone(),
        mirror_url: cli.mirror.clone(),
        system_site_packages: cli.system_site_packages,
        base_requirements: Vec::new(),
        timeout: Duration::from_secs(cli.venv_timeout),
    };

    let environment = provision(provision_request)
        .await
        .map_err(|e| ExitError::new(2, format!("environment provisioning failed: {e}")))?;
    let environment = Arc::new(environment);

    let run_start = std::time::Instant::now();
    let scheduler_options = SchedulerOptions {
        concurrency: cli.atonce,
        heartbeat_interval: if cli.progress_interval == 0 {
            None
        } else {
            Some(Duration::from_secs(cli.progress_interval))
        },
        pipeline: PipelineOptions {
            error_on_warnings: cli.error_on_warnings,
            extra_tool_args: Vec::new(),
            run_disabled: cli.run_disabled,
        },
    };

    let outcomes = run_scheduler(
        discovery.projects,
        Arc::clone(&environment),
        scheduler_options,
        cancel_rx.clone(),
    )
    .await;

    // Release discipline runs on every exit path, including failure.
    let _ = release(&environment, cli.keep_venv);

    let report = RunReport {
        outcomes,
        wall_clock: run_start.elapsed(),
        discovered_candidates: discovery.discovered_candidates,
        non_configured: discovery.non_configured,
    };

    println!("{}", report::summary_line(&report));
    let blocks = report::failure_blocks(&report);
    if !blocks.is_empty() {
        print!("{blocks}");
    }
    if cli.print_cov {
        print!("{}", report::coverage_report(&report));
    }
    if cli.print_non_configured {
        println!("{}", report::non_configured_report(&report));
    }
    let stats_path = cli.stats_file.clone().unwrap_or_else(default_stats_path);
    report::write_stats_file(&report, &stats_path)
        .map_err(|e| ExitError::new(1, format!("failed to write stats file: {e}")))?;

    if *cancel_rx.borrow() {
        return Err(ExitError::new(130, String::new()).into());
    }
    if !report.is_success() {
        return Err(ExitError::new(1, String::new()).into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
