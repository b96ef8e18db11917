//! ProcessProducer - drives a real capture daemon as a child process.

use std::path::Path;

use contracts::{MonitorError, ProducerConfig, ProducerControl};
use tokio::process::{Child, Command};
use tracing::{debug, info, instrument, warn};

use crate::error::ProducerError;

/// Capture daemon launched as an OS process.
///
/// The child is spawned with `kill_on_drop` armed, so even if the
/// controlling future is dropped mid-run the OS resource is reclaimed.
pub struct ProcessProducer {
    config: ProducerConfig,
    child: Option<Child>,
}

impl ProcessProducer {
    pub fn new(config: ProducerConfig) -> Self {
        Self {
            config,
            child: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    fn command(&self) -> Result<&str, ProducerError> {
        self.config
            .command
            .as_deref()
            .ok_or_else(|| ProducerError::MissingCommand {
                name: self.config.name.clone(),
            })
    }

    /// Resolve `command` the way the shell would: absolute/relative paths
    /// are checked directly, bare names are searched on `$PATH`.
    fn executable_resolves(command: &str) -> bool {
        let path = Path::new(command);
        if path.components().count() > 1 {
            return path.is_file();
        }
        std::env::var_os("PATH")
            .map(|paths| {
                std::env::split_paths(&paths).any(|dir| dir.join(command).is_file())
            })
            .unwrap_or(false)
    }
}

impl ProducerControl for ProcessProducer {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn is_available(&self) -> bool {
        match self.config.command.as_deref() {
            Some(command) => Self::executable_resolves(command),
            None => false,
        }
    }

    #[instrument(name = "process_producer_start", skip(self), fields(name = %self.config.name))]
    async fn start(&mut self) -> Result<(), MonitorError> {
        if self.child.is_some() {
            return Err(ProducerError::AlreadyRunning {
                name: self.config.name.clone(),
            }
            .into());
        }

        let command = self.command().map_err(MonitorError::from)?;
        let child = Command::new(command)
            .args(&self.config.args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MonitorError::producer_spawn(&self.config.name, e.to_string()))?;

        info!(
            name = %self.config.name,
            command = %command,
            pid = child.id(),
            "capture daemon started"
        );
        self.child = Some(child);
        Ok(())
    }

    #[instrument(name = "process_producer_stop", skip(self), fields(name = %self.config.name))]
    async fn stop(&mut self) -> Result<(), MonitorError> {
        let Some(mut child) = self.child.take() else {
            debug!(name = %self.config.name, "stop on idle producer, nothing to do");
            return Ok(());
        };

        if let Err(e) = child.start_kill() {
            // InvalidInput means the child already exited on its own.
            if e.kind() != std::io::ErrorKind::InvalidInput {
                return Err(MonitorError::producer_stop(
                    &self.config.name,
                    e.to_string(),
                ));
            }
        }

        match child.wait().await {
            Ok(status) => {
                info!(name = %self.config.name, status = %status, "capture daemon stopped");
                Ok(())
            }
            Err(e) => {
                warn!(name = %self.config.name, error = %e, "wait on stopped daemon failed");
                Err(MonitorError::producer_stop(
                    &self.config.name,
                    e.to_string(),
                ))
            }
        }
    }
}
