//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    producer: ProducerInfo,
    channels: Vec<ChannelInfo>,
    capture: CaptureInfo,
    validation: ValidationInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    faults: Vec<String>,
}

#[derive(Serialize)]
struct ProducerInfo {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<String>,
    simulated: bool,
}

#[derive(Serialize)]
struct ChannelInfo {
    id: String,
    frequency_hz: f64,
    expected_frames_per_window: f64,
}

#[derive(Serialize)]
struct CaptureInfo {
    window_secs: f64,
    warm_up_secs: f64,
    poll_interval_ms: u64,
    drain_timeout_ms: u64,
    conflate: bool,
}

#[derive(Serialize)]
struct ValidationInfo {
    trim_rounds: usize,
    sync_tolerance_ms: f64,
    freq_margin: f64,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Reading configuration");

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let config_info = build_info(&blueprint);

    if args.json {
        let json = serde_json::to_string_pretty(&config_info)
            .context("Failed to serialize configuration info")?;
        println!("{}", json);
    } else {
        print_info(&config_info);
    }

    Ok(())
}

fn build_info(blueprint: &contracts::MonitorBlueprint) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        producer: ProducerInfo {
            name: blueprint.producer.name.clone(),
            command: blueprint.producer.command.clone(),
            simulated: blueprint.producer.command.is_none(),
        },
        channels: blueprint
            .channels
            .iter()
            .map(|c| ChannelInfo {
                id: c.id.to_string(),
                frequency_hz: c.frequency_hz,
                expected_frames_per_window: c.frequency_hz * blueprint.capture.window_secs,
            })
            .collect(),
        capture: CaptureInfo {
            window_secs: blueprint.capture.window_secs,
            warm_up_secs: blueprint.capture.warm_up_secs,
            poll_interval_ms: blueprint.capture.poll_interval_ms,
            drain_timeout_ms: blueprint.capture.drain_timeout_ms,
            conflate: blueprint.capture.conflate,
        },
        validation: ValidationInfo {
            trim_rounds: blueprint.validation.trim_rounds,
            sync_tolerance_ms: blueprint.validation.sync_tolerance_ms,
            freq_margin: blueprint.validation.freq_margin,
        },
        sinks: blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
            })
            .collect(),
        faults: blueprint
            .simulation
            .drop_frames
            .iter()
            .map(|f| format!("drop {} @ frame {}", f.channel, f.frame_id))
            .chain(
                blueprint
                    .simulation
                    .lag_frames
                    .iter()
                    .map(|f| format!("lag {} @ frame {} by {} ms", f.channel, f.frame_id, f.offset_ms)),
            )
            .collect(),
    }
}

fn print_info(config_info: &ConfigInfo) {
    println!("\n=== Framelock Configuration ===\n");
    println!("Version: {}", config_info.version);
    println!(
        "Producer: {}{}",
        config_info.producer.name,
        if config_info.producer.simulated {
            " (simulated)"
        } else {
            ""
        }
    );

    println!("\nChannels:");
    for channel in &config_info.channels {
        println!(
            "  - {} @ {} Hz (~{:.0} frames/window)",
            channel.id, channel.frequency_hz, channel.expected_frames_per_window
        );
    }

    println!("\nCapture:");
    println!("  Window: {} s", config_info.capture.window_secs);
    println!("  Warm-up: {} s", config_info.capture.warm_up_secs);
    println!("  Poll interval: {} ms", config_info.capture.poll_interval_ms);
    println!("  Drain timeout: {} ms", config_info.capture.drain_timeout_ms);
    println!("  Conflate: {}", config_info.capture.conflate);

    println!("\nValidation:");
    println!("  Trim rounds: {}", config_info.validation.trim_rounds);
    println!(
        "  Sync tolerance: {} ms",
        config_info.validation.sync_tolerance_ms
    );
    println!("  Frequency margin: {}", config_info.validation.freq_margin);

    if !config_info.sinks.is_empty() {
        println!("\nSinks:");
        for sink in &config_info.sinks {
            println!("  - {} ({})", sink.name, sink.sink_type);
        }
    }

    if !config_info.faults.is_empty() {
        println!("\nSimulation faults:");
        for fault in &config_info.faults {
            println!("  - {}", fault);
        }
    }

    println!();
}
