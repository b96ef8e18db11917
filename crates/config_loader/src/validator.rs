//! Configuration validation
//!
//! Rules:
//! - at least one channel, ids unique
//! - frequency_hz > 0
//! - drain timeout < poll interval (round-robin fairness within one tick)
//! - window long enough to survive trimming at the slowest nominal rate
//! - sync tolerance > 0, frequency margin in (0, 1)
//! - simulation faults reference configured channels
//! - sink names non-empty

use std::collections::HashSet;

use contracts::{MonitorBlueprint, MonitorError};

/// Validate a MonitorBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &MonitorBlueprint) -> Result<(), MonitorError> {
    validate_producer(blueprint)?;
    validate_channels(blueprint)?;
    validate_capture(blueprint)?;
    validate_thresholds(blueprint)?;
    validate_simulation(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_producer(blueprint: &MonitorBlueprint) -> Result<(), MonitorError> {
    if blueprint.producer.name.is_empty() {
        return Err(MonitorError::config_validation(
            "producer.name",
            "producer name cannot be empty",
        ));
    }
    Ok(())
}

/// Channel set is fixed per run; ids must be unique and rates positive
fn validate_channels(blueprint: &MonitorBlueprint) -> Result<(), MonitorError> {
    if blueprint.channels.is_empty() {
        return Err(MonitorError::config_validation(
            "channels",
            "at least one channel is required",
        ));
    }

    let mut seen = HashSet::new();
    for channel in &blueprint.channels {
        if !seen.insert(channel.id.as_str()) {
            return Err(MonitorError::config_validation(
                format!("channels[id={}]", channel.id),
                "duplicate channel id",
            ));
        }
        if channel.frequency_hz <= 0.0 {
            return Err(MonitorError::config_validation(
                format!("channels[{}].frequency_hz", channel.id),
                format!("frequency_hz must be > 0, got {}", channel.frequency_hz),
            ));
        }
    }
    Ok(())
}

fn validate_capture(blueprint: &MonitorBlueprint) -> Result<(), MonitorError> {
    let capture = &blueprint.capture;

    if capture.window_secs <= 0.0 {
        return Err(MonitorError::config_validation(
            "capture.window_secs",
            format!("window_secs must be > 0, got {}", capture.window_secs),
        ));
    }
    if capture.warm_up_secs < 0.0 {
        return Err(MonitorError::config_validation(
            "capture.warm_up_secs",
            format!("warm_up_secs must be >= 0, got {}", capture.warm_up_secs),
        ));
    }
    if capture.poll_interval_ms == 0 {
        return Err(MonitorError::config_validation(
            "capture.poll_interval_ms",
            "poll_interval_ms must be > 0",
        ));
    }
    if capture.drain_timeout_ms >= capture.poll_interval_ms {
        return Err(MonitorError::config_validation(
            "capture.drain_timeout_ms",
            format!(
                "drain_timeout_ms ({}) must be < poll_interval_ms ({})",
                capture.drain_timeout_ms, capture.poll_interval_ms
            ),
        ));
    }
    Ok(())
}

fn validate_thresholds(blueprint: &MonitorBlueprint) -> Result<(), MonitorError> {
    let validation = &blueprint.validation;

    if validation.sync_tolerance_ms <= 0.0 {
        return Err(MonitorError::config_validation(
            "validation.sync_tolerance_ms",
            format!(
                "sync_tolerance_ms must be > 0, got {}",
                validation.sync_tolerance_ms
            ),
        ));
    }
    if validation.freq_margin <= 0.0 || validation.freq_margin >= 1.0 {
        return Err(MonitorError::config_validation(
            "validation.freq_margin",
            format!(
                "freq_margin must be within (0, 1), got {}",
                validation.freq_margin
            ),
        ));
    }

    // Trimming removes 2 * rounds identifiers; the slowest channel must
    // still produce more than that over the window.
    let required = 2 * validation.trim_rounds + 1;
    let slowest_hz = blueprint
        .channels
        .iter()
        .map(|c| c.frequency_hz)
        .fold(f64::INFINITY, f64::min);
    let worst_case_frames = (slowest_hz * blueprint.capture.window_secs) as usize;
    if worst_case_frames < required {
        return Err(MonitorError::config_validation(
            "capture.window_secs",
            format!(
                "window produces at most {worst_case_frames} frames on the \
                 slowest channel, trimming {} rounds requires {required}",
                validation.trim_rounds
            ),
        ));
    }
    Ok(())
}

/// Fault specs must target configured channels
fn validate_simulation(blueprint: &MonitorBlueprint) -> Result<(), MonitorError> {
    let known: HashSet<_> = blueprint.channels.iter().map(|c| c.id.as_str()).collect();

    for (idx, spec) in blueprint.simulation.drop_frames.iter().enumerate() {
        if !known.contains(spec.channel.as_str()) {
            return Err(MonitorError::config_validation(
                format!("simulation.drop_frames[{idx}].channel"),
                format!("unknown channel '{}'", spec.channel),
            ));
        }
    }
    for (idx, spec) in blueprint.simulation.lag_frames.iter().enumerate() {
        if !known.contains(spec.channel.as_str()) {
            return Err(MonitorError::config_validation(
                format!("simulation.lag_frames[{idx}].channel"),
                format!("unknown channel '{}'", spec.channel),
            ));
        }
    }
    Ok(())
}

fn validate_sinks(blueprint: &MonitorBlueprint) -> Result<(), MonitorError> {
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(MonitorError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
    }
    Ok(())
}
