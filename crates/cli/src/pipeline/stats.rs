//! Run statistics and summary printing.

use std::time::Duration;

use contracts::MonitorOutcome;
use observability::ReportDigest;

/// Statistics from one orchestrated run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// The run's outcome, if it got far enough to produce one
    pub outcome: Option<MonitorOutcome>,

    /// Wall-clock duration of the orchestration
    pub duration: Duration,

    /// Number of monitored channels
    pub channels: usize,

    /// Number of configured sinks
    pub sinks: usize,
}

impl RunStats {
    /// Overall verdict (a skipped run counts as passing)
    #[allow(dead_code)]
    pub fn passed(&self) -> bool {
        self.outcome.as_ref().map(|o| o.passed()).unwrap_or(false)
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Framelock Run Summary ===\n");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Channels: {}", self.channels);
        println!("Sinks: {}", self.sinks);

        match &self.outcome {
            Some(MonitorOutcome::Completed(report)) => {
                println!("\n{}", ReportDigest::from_report(report));

                if !report.skips.passed() {
                    println!("\nSkipped frames:");
                    for (frame_id, missing) in &report.skips.skips {
                        let channels: Vec<_> =
                            missing.iter().map(|c| c.as_str()).collect();
                        println!("  frame {frame_id}: missing {}", channels.join(", "));
                    }
                }

                if !report.sync.passed() {
                    println!(
                        "\nLaggy frames (tolerance {} ms):",
                        report.sync.tolerance_ms
                    );
                    for (frame_id, diagnostic) in &report.sync.laggy_frames {
                        println!(
                            "  frame {frame_id}: spread {:.3} ms",
                            diagnostic.spread_ms
                        );
                        for (channel, ts_ms) in &diagnostic.timestamps_ms {
                            println!("    {channel}: {ts_ms:.3} ms");
                        }
                    }
                }
            }
            Some(MonitorOutcome::Skipped { reason }) => {
                println!("\nRun SKIPPED: {reason}");
            }
            None => {
                println!("\nRun produced no outcome");
            }
        }

        println!();
    }
}
