//! Engine lifecycle tag and the structured `status` record.

use serde::{Deserialize, Serialize};

use crate::plugin::PluginHandle;

/// The engine's lifecycle tag (§3). The render callback is installed only
/// while the tag is `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStateTag {
    /// No audio unit exists.
    Stopped,
    /// `start` has been called; the audio graph has not yet signalled
    /// readiness.
    Starting,
    /// The render callback is installed and processing.
    Running,
    /// `stop` has been called; resources are being released.
    Stopping,
    /// A fault occurred outside the normal Start/Stop transitions.
    Failed,
}

impl EngineStateTag {
    /// Whether the render callback may legally be installed in this state.
    #[must_use]
    pub fn render_callback_installed(self) -> bool {
        matches!(self, EngineStateTag::Running)
    }
}

/// The structured record returned by the `status` command (§4.3 "Status").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    /// Whether the engine is currently Running.
    pub running: bool,
    /// Configured sample rate in Hz.
    pub sample_rate: u32,
    /// Configured buffer size in frames.
    pub buffer_size: u32,
    /// Whether the test-tone generator is enabled.
    pub test_tone_enabled: bool,
    /// Test-tone frequency in Hz.
    pub tone_frequency: f32,
    /// The currently loaded plug-in's handle, if any.
    pub loaded_plugin: Option<PluginHandle>,
}

impl EngineStatus {
    /// Formats this status the way the `status` command's response line
    /// does: `STATUS: running=… sampleRate=… bufferSize=… testTone=… toneFreq=…`.
    #[must_use]
    pub fn to_status_line(&self) -> String {
        format!(
            "STATUS: running={} sampleRate={} bufferSize={} testTone={} toneFreq={}",
            self.running, self.sample_rate, self.buffer_size, self.test_tone_enabled, self.tone_frequency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_running_installs_the_render_callback() {
        assert!(EngineStateTag::Running.render_callback_installed());
        assert!(!EngineStateTag::Starting.render_callback_installed());
        assert!(!EngineStateTag::Stopped.render_callback_installed());
        assert!(!EngineStateTag::Stopping.render_callback_installed());
        assert!(!EngineStateTag::Failed.render_callback_installed());
    }

    #[test]
    fn status_line_matches_protocol_grammar() {
        let status = EngineStatus {
            running: true,
            sample_rate: 44100,
            buffer_size: 256,
            test_tone_enabled: true,
            tone_frequency: 440.0,
            loaded_plugin: None,
        };
        assert_eq!(
            status.to_status_line(),
            "STATUS: running=true sampleRate=44100 bufferSize=256 testTone=true toneFreq=440"
        );
    }
}
