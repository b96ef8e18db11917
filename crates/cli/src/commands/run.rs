//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::MonitorOutcome;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Orchestrator, OrchestratorConfig};

/// Execute the `run` command
pub async fn run_monitor(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(window) = args.window {
        info!(window_secs = window, "Overriding window length from CLI");
        blueprint.capture.window_secs = window;
    }
    if let Some(warm_up) = args.warm_up {
        info!(warm_up_secs = warm_up, "Overriding warm-up delay from CLI");
        blueprint.capture.warm_up_secs = warm_up;
    }

    info!(
        producer = %blueprint.producer.name,
        channels = blueprint.channels.len(),
        window_secs = blueprint.capture.window_secs,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let orchestrator = Orchestrator::new(OrchestratorConfig {
        blueprint,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    });

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting monitoring run...");

    tokio::select! {
        result = orchestrator.run() => {
            let stats = result.map_err(|e| CliError::run_execution(e.to_string()))?;
            stats.print_summary();

            match stats.outcome {
                Some(MonitorOutcome::Completed(report)) if !report.passed() => {
                    let mut failed = Vec::new();
                    if !report.frequency.passed() {
                        failed.push("frequency");
                    }
                    if !report.skips.passed() {
                        failed.push("skip");
                    }
                    if !report.sync.passed() {
                        failed.push("sync");
                    }
                    return Err(CliError::validation_failed(failed.join(", ")).into());
                }
                Some(MonitorOutcome::Skipped { reason }) => {
                    info!(reason = %reason, "run skipped, nothing validated");
                }
                _ => {
                    info!(
                        duration_secs = stats.duration.as_secs_f64(),
                        "All validators passed"
                    );
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping run...");
        }
    }

    info!("framelock finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::MonitorBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Producer: {}", blueprint.producer.name);
    if let Some(ref command) = blueprint.producer.command {
        println!("  Command: {command} (ignored by the CLI harness)");
    } else {
        println!("  Mode: simulated");
    }

    println!("\nChannels ({}):", blueprint.channels.len());
    for channel in &blueprint.channels {
        let expected = channel.frequency_hz * blueprint.capture.window_secs;
        println!(
            "  - {} @ {} Hz (~{expected:.0} frames/window)",
            channel.id, channel.frequency_hz
        );
    }

    println!("\nCapture:");
    println!("  Window: {} s", blueprint.capture.window_secs);
    println!("  Warm-up: {} s", blueprint.capture.warm_up_secs);
    println!("  Poll interval: {} ms", blueprint.capture.poll_interval_ms);
    println!("  Drain timeout: {} ms", blueprint.capture.drain_timeout_ms);

    println!("\nValidation:");
    println!("  Trim rounds: {}", blueprint.validation.trim_rounds);
    println!(
        "  Sync tolerance: {} ms",
        blueprint.validation.sync_tolerance_ms
    );
    println!("  Frequency margin: {}", blueprint.validation.freq_margin);

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
