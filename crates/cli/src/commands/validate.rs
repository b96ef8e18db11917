//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    producer: String,
    channel_count: usize,
    window_secs: f64,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    producer: blueprint.producer.name.clone(),
                    channel_count: blueprint.channels.len(),
                    window_secs: blueprint.capture.window_secs,
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::MonitorBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - outcomes will only be printed".to_string());
    }

    if blueprint.channels.len() < 2 {
        warnings.push(
            "Only one channel configured - skip and sync checks are trivial".to_string(),
        );
    }

    let common_hz = blueprint.channels.first().map(|c| c.frequency_hz);
    if let Some(hz) = common_hz {
        if blueprint.channels.iter().any(|c| c.frequency_hz != hz) {
            warnings.push(
                "Channels declare differing rates - the simulated daemon emits \
                 lock-step at the first channel's rate"
                    .to_string(),
            );
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("ok: configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Producer: {}", summary.producer);
            println!("  Channels: {}", summary.channel_count);
            println!("  Window: {} s", summary.window_secs);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\nWarnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("error: configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_validate_good_config() {
        let (_dir, path) = write_config(
            r#"
[producer]
name = "camerad"

[[channels]]
id = "road_camera"
frequency_hz = 20.0

[[channels]]
id = "driver_camera"
frequency_hz = 20.0

[[sinks]]
name = "log"
sink_type = "log"
"#,
        );

        let args = ValidateArgs {
            config: path,
            json: false,
        };
        let result = validate_config(&args);
        assert!(result.valid, "{:?}", result.error);
        assert!(result.warnings.is_none());
    }

    #[test]
    fn test_validate_missing_file() {
        let args = ValidateArgs {
            config: "/nonexistent/monitor.toml".into(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_validate_collects_warnings() {
        let (_dir, path) = write_config(
            r#"
[producer]
name = "camerad"

[[channels]]
id = "road_camera"
frequency_hz = 20.0
"#,
        );

        let args = ValidateArgs {
            config: path,
            json: false,
        };
        let result = validate_config(&args);
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("No sinks")));
        assert!(warnings.iter().any(|w| w.contains("one channel")));
    }
}
