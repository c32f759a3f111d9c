//! Device and MIDI endpoint descriptors returned by the Device Enumerator.

use serde::{Deserialize, Serialize};

/// An audio input or output device as reported by the host OS.
///
/// Snapshotted at enumeration time; holds no handle to the underlying OS
/// device, so it is freely cloned and sent across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDevice {
    /// Opaque numeric handle, stable only within the current process.
    pub device_id: u32,
    /// Stable string identifier, stable across process restarts.
    pub uid: String,
    /// Human-readable name.
    pub name: String,
    /// Channel count on the scope this descriptor was queried for.
    pub channel_count: u32,
    /// Nominal sample rates the device supports, intersected with the
    /// canonical rate set.
    pub supported_sample_rates: Vec<u32>,
    /// Bit depths the device's stream formats report.
    pub supported_bit_depths: Vec<u32>,
    /// Whether this is the OS's current default device in its scope.
    pub is_default: bool,
    /// Whether the device is currently present and usable.
    pub is_online: bool,
}

impl AudioDevice {
    /// True if `rate` is among this device's supported sample rates.
    #[must_use]
    pub fn supports_rate(&self, rate: u32) -> bool {
        self.supported_sample_rates.contains(&rate)
    }
}

/// A MIDI input or output endpoint. Informational only — the host reports
/// these to clients but does not route MIDI itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MidiEndpoint {
    /// Opaque numeric handle, stable only within the current process.
    pub endpoint_id: u32,
    /// Stable string identifier.
    pub uid: String,
    /// Human-readable name.
    pub name: String,
    /// Whether the endpoint is currently present.
    pub is_online: bool,
}

/// The OS's system-default input and output device ids, as reported by the
/// Device Enumerator's defaults query. A missing default is `None` rather
/// than a sentinel numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDefaults {
    /// Default input device id, if the OS reports one.
    pub default_input_id: Option<u32>,
    /// Default output device id, if the OS reports one.
    pub default_output_id: Option<u32>,
}

/// The canonical set of sample rates the Device Enumerator intersects
/// device-reported ranges against (§4.1 point 3).
pub const CANONICAL_SAMPLE_RATES: [u32; 6] = [44100, 48000, 88200, 96000, 176400, 192000];

/// Fallback sample-rate set used when a device reports no range data.
pub const FALLBACK_SAMPLE_RATES: [u32; 2] = [44100, 48000];

/// Fallback bit-depth set used when a device's stream formats are unknown.
pub const FALLBACK_BIT_DEPTHS: [u32; 2] = [16, 24];

#[cfg(test)]
mod tests {
    use super::*;

    fn device(rates: &[u32]) -> AudioDevice {
        AudioDevice {
            device_id: 1,
            uid: "uid-1".into(),
            name: "Test Device".into(),
            channel_count: 2,
            supported_sample_rates: rates.to_vec(),
            supported_bit_depths: vec![16, 24],
            is_default: true,
            is_online: true,
        }
    }

    #[test]
    fn supports_rate_checks_membership() {
        let d = device(&[44100, 48000]);
        assert!(d.supports_rate(44100));
        assert!(!d.supports_rate(96000));
    }

    #[test]
    fn round_trips_through_json_with_camel_case_fields() {
        let d = device(&[44100]);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["deviceId"], 1);
        assert_eq!(json["channelCount"], 2);
        assert_eq!(json["supportedSampleRates"][0], 44100);
        let back: AudioDevice = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }
}
