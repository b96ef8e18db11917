//! JsonFileSink - one pretty-printed JSON file per outcome

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use contracts::{MonitorError, MonitorOutcome, ReportSink};
use tracing::{info, instrument};

/// Sink that archives each outcome as a timestamped JSON file.
#[derive(Debug)]
pub struct JsonFileSink {
    name: String,
    dir: PathBuf,
    /// Disambiguates outcomes written within the same second
    sequence: u64,
}

impl JsonFileSink {
    /// Create a sink writing into `dir`, creating it if needed.
    pub fn new(name: impl Into<String>, dir: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let name = name.into();
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| MonitorError::sink_write(&name, format!("create dir: {e}")))?;

        Ok(Self {
            name,
            dir,
            sequence: 0,
        })
    }

    /// Create from sink params; requires a `dir` entry.
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, MonitorError> {
        let name = name.into();
        let dir = params
            .get("dir")
            .ok_or_else(|| MonitorError::sink_write(&name, "missing required param 'dir'"))?;
        Self::new(name, dir)
    }

    fn next_path(&mut self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let path = self
            .dir
            .join(format!("{}_{stamp}_{:04}.json", self.name, self.sequence));
        self.sequence += 1;
        path
    }
}

impl ReportSink for JsonFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "json_file_sink_write", skip(self, outcome), fields(sink = %self.name))]
    async fn write(&mut self, outcome: &MonitorOutcome) -> Result<(), MonitorError> {
        let rendered = serde_json::to_vec_pretty(outcome)
            .map_err(|e| MonitorError::sink_write(&self.name, format!("serialize: {e}")))?;

        let path = self.next_path();
        tokio::fs::write(&path, rendered)
            .await
            .map_err(|e| MonitorError::sink_write(&self.name, format!("write {path:?}: {e}")))?;

        info!(sink = %self.name, path = %path.display(), "outcome archived");
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), MonitorError> {
        // Each write is already a complete file
        Ok(())
    }

    #[instrument(name = "json_file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), MonitorError> {
        info!(sink = %self.name, outcomes = self.sequence, "json file sink closed");
        Ok(())
    }
}
