//! # Integration Tests
//!
//! End-to-end tests over the whole pipeline, no hardware required:
//! simulated daemon → loopback bus → monitor → reporter.

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use contracts::{
        CaptureConfig, ChannelConfig, ConfigVersion, DropSpec, LagSpec, MonitorBlueprint,
        MonitorOutcome, ProducerConfig, SimulationConfig, SinkConfig, SinkType,
        ValidationConfig,
    };
    use monitor::MonitorRun;
    use tokio::sync::mpsc;
    use transport::{LoopbackBus, SimCaptureDaemon, SimDaemonConfig};

    const CAMERAS: [&str; 3] = ["road_camera", "driver_camera", "wide_camera"];

    /// A three-channel rig at 50 Hz over a one-second window: long enough
    /// to survive three trim rounds, short enough for a test run.
    fn rig_blueprint() -> MonitorBlueprint {
        MonitorBlueprint {
            version: ConfigVersion::V1,
            producer: ProducerConfig {
                name: "sim_camerad".into(),
                command: None,
                args: vec![],
            },
            channels: CAMERAS
                .iter()
                .map(|c| ChannelConfig {
                    id: (*c).into(),
                    frequency_hz: 50.0,
                })
                .collect(),
            capture: CaptureConfig {
                window_secs: 1.0,
                warm_up_secs: 0.05,
                poll_interval_ms: 25,
                drain_timeout_ms: 5,
                conflate: false,
            },
            validation: ValidationConfig {
                trim_rounds: 3,
                sync_tolerance_ms: 0.5,
                // Test scheduling is not production scheduling.
                freq_margin: 0.4,
            },
            simulation: SimulationConfig::default(),
            sinks: vec![],
        }
    }

    async fn run_rig(blueprint: MonitorBlueprint) -> MonitorOutcome {
        let bus = LoopbackBus::new(1024);
        let daemon =
            SimCaptureDaemon::new(SimDaemonConfig::from_blueprint(&blueprint), bus.clone());
        MonitorRun::new(blueprint)
            .execute(&bus, daemon)
            .await
            .expect("run should complete")
    }

    /// Healthy rig: every validator passes.
    #[tokio::test]
    async fn test_e2e_lockstep_rig_passes() {
        let outcome = run_rig(rig_blueprint()).await;

        let MonitorOutcome::Completed(report) = outcome else {
            panic!("expected a completed run");
        };
        assert!(report.frequency.passed(), "{:?}", report.frequency);
        assert!(report.skips.passed(), "{:?}", report.skips);
        assert!(report.sync.passed(), "{:?}", report.sync);
        assert!(report.passed());
        assert_eq!(report.capture.messages_per_channel.len(), CAMERAS.len());

        let digest = observability::ReportDigest::from_report(&report);
        assert!(digest.passed);
        assert_eq!(digest.skipped_frames, 0);
        assert!(digest.total_messages > 0);
    }

    /// One channel drops one interior frame: the skip validator pinpoints
    /// it, the other validators stay green.
    #[tokio::test]
    async fn test_e2e_dropped_frame_is_pinpointed() {
        let mut blueprint = rig_blueprint();
        blueprint.simulation.drop_frames.push(DropSpec {
            channel: "driver_camera".into(),
            frame_id: 25,
        });

        let MonitorOutcome::Completed(report) = run_rig(blueprint).await else {
            panic!("expected a completed run");
        };

        assert!(report.frequency.passed(), "{:?}", report.frequency);
        assert!(report.sync.passed(), "{:?}", report.sync);

        assert!(!report.skips.passed());
        assert_eq!(report.skips.skips.len(), 1, "{:?}", report.skips);
        let missing = &report.skips.skips[&25];
        assert_eq!(missing.len(), 1);
        assert!(missing.contains("driver_camera"));
        assert!(!report.passed());
    }

    /// One channel lags one frame beyond tolerance: the sync validator
    /// flags exactly that frame with its spread.
    #[tokio::test]
    async fn test_e2e_lagged_frame_is_flagged() {
        let mut blueprint = rig_blueprint();
        blueprint.simulation.lag_frames.push(LagSpec {
            channel: "wide_camera".into(),
            frame_id: 25,
            offset_ms: 2.0,
        });

        let MonitorOutcome::Completed(report) = run_rig(blueprint).await else {
            panic!("expected a completed run");
        };

        assert!(report.frequency.passed(), "{:?}", report.frequency);
        assert!(report.skips.passed(), "{:?}", report.skips);

        assert!(!report.sync.passed());
        assert_eq!(report.sync.laggy_frames.len(), 1, "{:?}", report.sync);
        let diagnostic = &report.sync.laggy_frames[&25];
        assert!((diagnostic.spread_ms - 2.0).abs() < 1e-6);
        assert_eq!(diagnostic.timestamps_ms.len(), CAMERAS.len());
    }

    /// A lag inside the tolerance band changes nothing.
    #[tokio::test]
    async fn test_e2e_sub_tolerance_lag_passes() {
        let mut blueprint = rig_blueprint();
        blueprint.simulation.lag_frames.push(LagSpec {
            channel: "wide_camera".into(),
            frame_id: 25,
            offset_ms: 0.1,
        });

        let MonitorOutcome::Completed(report) = run_rig(blueprint).await else {
            panic!("expected a completed run");
        };
        assert!(report.sync.passed(), "{:?}", report.sync);
        assert!(report.passed());
    }

    /// A real daemon whose binary is absent: the run is skipped, not
    /// failed, and nothing was ever started.
    #[tokio::test]
    async fn test_e2e_absent_daemon_skips_run() {
        let mut blueprint = rig_blueprint();
        blueprint.producer.command = Some("/nonexistent/bin/camerad".into());

        let bus = LoopbackBus::new(16);
        let process = producer::ProcessProducer::new(blueprint.producer.clone());
        let outcome = MonitorRun::new(blueprint)
            .execute(&bus, process)
            .await
            .expect("skip is not an error");

        match outcome {
            MonitorOutcome::Skipped { reason } => {
                assert!(reason.contains("not available"), "{reason}");
            }
            MonitorOutcome::Completed(_) => panic!("expected a skipped run"),
        }
    }

    /// Full pipeline from a TOML config string through the reporter: the
    /// configured fault surfaces in the archived JSON outcome.
    #[tokio::test]
    async fn test_e2e_config_to_archived_report() {
        let archive_dir = tempfile::tempdir().unwrap();
        let config = format!(
            r#"
[producer]
name = "sim_camerad"

[[channels]]
id = "road_camera"
frequency_hz = 50.0

[[channels]]
id = "driver_camera"
frequency_hz = 50.0

[capture]
window_secs = 1.0
warm_up_secs = 0.05
poll_interval_ms = 25
drain_timeout_ms = 5

[validation]
trim_rounds = 3
sync_tolerance_ms = 0.5
freq_margin = 0.4

[[simulation.drop_frames]]
channel = "driver_camera"
frame_id = 25

[[sinks]]
name = "archive"
sink_type = "json_file"
queue_capacity = 4
[sinks.params]
dir = "{}"
"#,
            archive_dir.path().display()
        );

        let blueprint =
            config_loader::ConfigLoader::load_from_str(&config, config_loader::ConfigFormat::Toml)
                .expect("config should validate");

        let sinks: Vec<SinkConfig> = blueprint.sinks.clone();
        assert_eq!(sinks[0].sink_type, SinkType::JsonFile);

        let outcome = run_rig(blueprint).await;
        assert!(!outcome.passed());

        // Fan out through the reporter and read back the archive.
        let (tx, rx) = mpsc::channel(4);
        let reporter = report::create_reporter(sinks, rx).unwrap();
        let handle = reporter.spawn();
        tx.send(outcome).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        let files: Vec<_> = std::fs::read_dir(archive_dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);

        let archived: MonitorOutcome =
            serde_json::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
        let MonitorOutcome::Completed(report) = archived else {
            panic!("archived outcome should be a completed run");
        };
        assert!(report.skips.skips.contains_key(&25));
    }
}
