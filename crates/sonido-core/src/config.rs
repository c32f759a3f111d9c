//! `AudioConfig` — the full specification of a running engine instance.

use serde::{Deserialize, Serialize};

use crate::plugin::PluginHandle;

/// Default buffer size substituted when a request specifies `0`
/// (§4.6 point 1).
pub const DEFAULT_BUFFER_SIZE: u32 = 256;

/// Minimum accepted buffer size, inclusive.
pub const MIN_BUFFER_SIZE: u32 = 32;

/// Maximum accepted buffer size, inclusive.
pub const MAX_BUFFER_SIZE: u32 = 1024;

/// Default test-tone frequency in Hz.
pub const DEFAULT_TONE_FREQ: f32 = 440.0;

/// Inclusive upper bound on a valid tone frequency (§4.4 grammar: `0 < hz
/// <= 20000`; §8: `20001` rejected).
pub const MAX_TONE_FREQ: f32 = 20_000.0;

/// The full specification of a running engine instance (§3).
///
/// Two configs are compared field-by-field by the Reconfiguration
/// Controller to classify the required change (§4.5); `PartialEq` is
/// therefore load-bearing, not incidental.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Buffer size in frames. `0` at the request boundary means "use
    /// default"; a config that has passed validation never carries `0`.
    pub buffer_size: u32,
    /// Input device id, or `None` for output-only / test-tone mode.
    pub input_device_id: Option<u32>,
    /// 0-based input channel index.
    pub input_channel: u32,
    /// Whether the test-tone generator is enabled.
    pub enable_test_tone: bool,
    /// Test-tone frequency in Hz, meaningful only when `enable_test_tone`.
    pub tone_frequency: f32,
    /// The loaded plug-in's handle, if any.
    pub plugin_handle: Option<PluginHandle>,
}

impl AudioConfig {
    /// A config with no input device, test tone enabled at the default
    /// frequency, and no plug-in — the "cold start, test tone only"
    /// configuration (§8 scenario 1).
    #[must_use]
    pub fn tone_only(sample_rate: u32, buffer_size: u32) -> Self {
        Self {
            sample_rate,
            buffer_size,
            input_device_id: None,
            input_channel: 0,
            enable_test_tone: true,
            tone_frequency: DEFAULT_TONE_FREQ,
            plugin_handle: None,
        }
    }

    /// Substitutes `DEFAULT_BUFFER_SIZE` for a requested buffer size of
    /// zero, leaving any other value untouched (§4.6 point 1). Does not
    /// itself enforce the `[32, 1024]` range — that's the Validation
    /// Layer's job, so the two can be tested and reasoned about
    /// independently.
    #[must_use]
    pub fn with_buffer_size_substituted(mut self) -> Self {
        if self.buffer_size == 0 {
            self.buffer_size = DEFAULT_BUFFER_SIZE;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_buffer_size_substitutes_default() {
        let cfg = AudioConfig::tone_only(44100, 0).with_buffer_size_substituted();
        assert_eq!(cfg.buffer_size, DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn nonzero_buffer_size_is_left_alone() {
        let cfg = AudioConfig::tone_only(44100, 512).with_buffer_size_substituted();
        assert_eq!(cfg.buffer_size, 512);
    }

    #[test]
    fn identical_configs_compare_equal() {
        let a = AudioConfig::tone_only(44100, 256);
        let b = AudioConfig::tone_only(44100, 256);
        assert_eq!(a, b);
    }

    #[test]
    fn plugin_handle_round_trips_through_json_as_a_string() {
        let cfg = AudioConfig {
            plugin_handle: Some("aufx:dist:acme".parse().unwrap()),
            ..AudioConfig::tone_only(44100, 256)
        };
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["pluginHandle"], "aufx:dist:acme");
        let back: AudioConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, cfg);
    }
}
