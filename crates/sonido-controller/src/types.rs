//! Value types returned by the controller's external API (§6).

use serde::{Deserialize, Serialize};

use sonido_core::config::AudioConfig;
use sonido_core::device::{AudioDevice, MidiEndpoint};

/// `get_devices() → DeviceSnapshot` (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    /// Audio input devices.
    pub audio_inputs: Vec<AudioDevice>,
    /// Audio output devices.
    pub audio_outputs: Vec<AudioDevice>,
    /// MIDI input endpoints.
    pub midi_inputs: Vec<MidiEndpoint>,
    /// MIDI output endpoints.
    pub midi_outputs: Vec<MidiEndpoint>,
}

/// `get_current_config() → {running, config?, pid?}` (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConfig {
    /// Whether an engine process is currently running.
    pub running: bool,
    /// The configuration in effect, if an engine is running.
    pub config: Option<AudioConfig>,
    /// The running engine's pid, if any.
    pub pid: Option<u32>,
}
