//! Complete pipeline demo, no hardware required.
//!
//! Runs two short monitoring windows against the simulated daemon: one
//! healthy lock-step rig, and one with an injected dropped frame and an
//! injected lagging frame so every validator gets something to say.
//!
//! ```bash
//! cargo run --bin lockstep_demo
//! ```

use anyhow::Result;
use contracts::{
    CaptureConfig, ChannelConfig, ConfigVersion, DropSpec, LagSpec, MonitorBlueprint,
    MonitorOutcome, ProducerConfig, SimulationConfig, ValidationConfig,
};
use monitor::MonitorRun;
use observability::ReportDigest;
use report::LogSink;
use report::SinkHandle;
use tracing::info;
use transport::{LoopbackBus, SimCaptureDaemon, SimDaemonConfig};

fn demo_blueprint(faulty: bool) -> MonitorBlueprint {
    let simulation = if faulty {
        SimulationConfig {
            start_frame_id: 1,
            drop_frames: vec![DropSpec {
                channel: "driver_camera".into(),
                frame_id: 30,
            }],
            lag_frames: vec![LagSpec {
                channel: "wide_camera".into(),
                frame_id: 40,
                offset_ms: 1.5,
            }],
        }
    } else {
        SimulationConfig::default()
    };

    MonitorBlueprint {
        version: ConfigVersion::V1,
        producer: ProducerConfig {
            name: "sim_camerad".into(),
            command: None,
            args: vec![],
        },
        channels: ["road_camera", "driver_camera", "wide_camera"]
            .into_iter()
            .map(|c| ChannelConfig {
                id: c.into(),
                frequency_hz: 50.0,
            })
            .collect(),
        capture: CaptureConfig {
            window_secs: 1.5,
            warm_up_secs: 0.2,
            poll_interval_ms: 50,
            drain_timeout_ms: 10,
            conflate: false,
        },
        validation: ValidationConfig {
            trim_rounds: 3,
            sync_tolerance_ms: 0.5,
            freq_margin: 0.3,
        },
        simulation,
        sinks: vec![],
    }
}

async fn run_demo(label: &str, blueprint: MonitorBlueprint) -> Result<()> {
    info!(label, "starting demo run");

    let bus = LoopbackBus::new(1024);
    let daemon = SimCaptureDaemon::new(SimDaemonConfig::from_blueprint(&blueprint), bus.clone());

    let outcome = MonitorRun::new(blueprint).execute(&bus, daemon).await?;

    // Deliver through a log sink the way the CLI reporter would.
    let handle = SinkHandle::spawn(LogSink::new(label), 4);
    handle.try_send(outcome.clone());
    handle.shutdown().await;

    match outcome {
        MonitorOutcome::Completed(report) => {
            println!("\n--- {label} ---");
            println!("{}", ReportDigest::from_report(&report));
        }
        MonitorOutcome::Skipped { reason } => {
            println!("\n--- {label} ---\nskipped: {reason}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    run_demo("healthy_rig", demo_blueprint(false)).await?;
    run_demo("faulty_rig", demo_blueprint(true)).await?;

    println!("\ndemo complete");
    Ok(())
}
