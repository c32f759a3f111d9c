//! Change classification and the result of a reconfiguration attempt (§4.5).

use serde::{Deserialize, Serialize};

use crate::config::AudioConfig;

/// The classification the Reconfiguration Controller assigns to a proposed
/// configuration change (§4.5 classification table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    /// Old and new configs are identical; no-op.
    NoChangeRequired,
    /// Only test-tone enablement, tone frequency, or the plug-in slot
    /// changed; apply on the live engine via the command channel.
    DynamicChangeOnly,
    /// Only the plug-in handle changed; unload then load, no restart.
    ChainRebuildRequired,
    /// Sample rate, buffer size, input device, input channel, or output
    /// device changed; the engine must be stopped and restarted.
    ProcessRestartRequired,
}

/// The result of every control-plane reconfiguration call (§3, §4.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconfigurationResult {
    /// Whether the change was applied successfully.
    pub success: bool,
    /// Human-readable summary, suitable for surfacing to a client.
    pub message: String,
    /// The classification this change was assigned.
    pub change_kind: ChangeKind,
    /// Whether applying the change required a process restart.
    pub required_restart: bool,
    /// Whether the engine's process id changed as a result.
    pub process_id_changed: bool,
    /// The engine pid before this call, if one existed.
    pub old_pid: Option<u32>,
    /// The engine pid after this call, if one exists.
    pub new_pid: Option<u32>,
    /// The configuration in effect before this call.
    pub previous_config: Option<AudioConfig>,
    /// The configuration in effect after this call, on success.
    pub new_config: Option<AudioConfig>,
}

impl ReconfigurationResult {
    /// A `NoChangeRequired` result: the two configs were identical.
    #[must_use]
    pub fn no_change(config: AudioConfig, pid: Option<u32>) -> Self {
        Self {
            success: true,
            message: "no change required".into(),
            change_kind: ChangeKind::NoChangeRequired,
            required_restart: false,
            process_id_changed: false,
            old_pid: pid,
            new_pid: pid,
            previous_config: Some(config.clone()),
            new_config: Some(config),
        }
    }

    /// A failure result that leaves the previous configuration (and, if it
    /// was running, the previous engine) untouched.
    #[must_use]
    pub fn rejected(
        message: impl Into<String>,
        change_kind: ChangeKind,
        previous_config: Option<AudioConfig>,
        pid: Option<u32>,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            change_kind,
            required_restart: false,
            process_id_changed: false,
            old_pid: pid,
            new_pid: pid,
            previous_config,
            new_config: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_change_result_is_success_with_matching_configs() {
        let cfg = AudioConfig::tone_only(44100, 256);
        let result = ReconfigurationResult::no_change(cfg.clone(), Some(123));
        assert!(result.success);
        assert_eq!(result.change_kind, ChangeKind::NoChangeRequired);
        assert_eq!(result.previous_config, Some(cfg.clone()));
        assert_eq!(result.new_config, Some(cfg));
        assert!(!result.process_id_changed);
    }

    #[test]
    fn rejected_result_carries_no_new_config() {
        let cfg = AudioConfig::tone_only(44100, 256);
        let result = ReconfigurationResult::rejected(
            "device offline",
            ChangeKind::ProcessRestartRequired,
            Some(cfg),
            Some(7),
        );
        assert!(!result.success);
        assert!(result.new_config.is_none());
        assert_eq!(result.old_pid, Some(7));
    }
}
