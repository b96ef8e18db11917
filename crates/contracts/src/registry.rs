//! FrequencyRegistry - nominal per-channel frame rates.

use std::collections::HashMap;

use crate::{ChannelConfig, ChannelId};

/// Static lookup from channel name to nominal frequency (frames/second).
///
/// Built once from the blueprint; the channel set is fixed for the lifetime
/// of a monitoring run.
#[derive(Debug, Clone, Default)]
pub struct FrequencyRegistry {
    frequencies: HashMap<ChannelId, f64>,
}

impl FrequencyRegistry {
    pub fn from_channels(channels: &[ChannelConfig]) -> Self {
        Self {
            frequencies: channels
                .iter()
                .map(|c| (c.id.clone(), c.frequency_hz))
                .collect(),
        }
    }

    /// Nominal frequency for `channel`, if configured.
    pub fn frequency_hz(&self, channel: &str) -> Option<f64> {
        self.frequencies.get(channel).copied()
    }

    /// Expected message count for `channel` over a window of
    /// `window_secs` seconds.
    pub fn expected_frames(&self, channel: &str, window_secs: f64) -> Option<f64> {
        self.frequency_hz(channel).map(|hz| hz * window_secs)
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FrequencyRegistry {
        FrequencyRegistry::from_channels(&[
            ChannelConfig {
                id: "road_camera".into(),
                frequency_hz: 20.0,
            },
            ChannelConfig {
                id: "driver_camera".into(),
                frequency_hz: 10.0,
            },
        ])
    }

    #[test]
    fn test_lookup() {
        let reg = registry();
        assert_eq!(reg.frequency_hz("road_camera"), Some(20.0));
        assert_eq!(reg.frequency_hz("unknown"), None);
    }

    #[test]
    fn test_expected_frames() {
        let reg = registry();
        assert_eq!(reg.expected_frames("road_camera", 30.0), Some(600.0));
        assert_eq!(reg.expected_frames("driver_camera", 30.0), Some(300.0));
    }
}
