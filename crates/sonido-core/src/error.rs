//! Error kinds shared across the control plane (§7).

use thiserror::Error;

/// Convenience alias for results carrying a [`HostError`].
pub type HostResult<T> = Result<T, HostError>;

/// Every error kind the core can raise, from validation through engine
/// startup through reconfiguration. Each variant names the fields a client
/// needs to build an actionable message; none of them carry source
/// locations or stack traces, since these cross a process boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HostError {
    /// A configuration field failed validation (Validation Layer).
    #[error("invalid configuration field '{field}': {reason}")]
    ConfigValidation {
        /// The offending field's name.
        field: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A referenced device id does not exist in the current snapshot.
    #[error("device not found: {id}")]
    DeviceNotFound {
        /// The device id that was not found.
        id: u32,
    },

    /// A referenced device exists but is not currently online.
    #[error("device offline: {id}")]
    DeviceOffline {
        /// The offline device's id.
        id: u32,
    },

    /// The input or output device's nominal sample rate did not match the
    /// configured rate at Start time (§4.3 step 3).
    #[error(
        "sample rate mismatch on device '{device}': requested {requested} Hz, device reports {actual} Hz"
    )]
    SampleRateMismatch {
        /// Name of the offending device.
        device: String,
        /// The configured sample rate.
        requested: u32,
        /// The device's actual nominal sample rate.
        actual: u32,
    },

    /// The device's nominal sample rate could not be read at all.
    #[error("could not read sample rate of device '{device}'")]
    SampleRateCheckFailed {
        /// Name of the device whose rate could not be read.
        device: String,
    },

    /// `load_plugin` was given a handle with no matching registry entry.
    #[error("plugin not found: {handle}")]
    PluginNotFound {
        /// The requested handle, formatted `type:subtype:manufacturer`.
        handle: String,
    },

    /// A plug-in rejected the canonical stream format at load time.
    #[error("plugin rejected canonical stream format: {reason}")]
    FormatRejected {
        /// Reason the plug-in gave, if any.
        reason: String,
    },

    /// A `load-plugin` argument was not three well-formed 4-char codes.
    #[error("malformed plugin handle: '{handle}'")]
    InvalidPluginHandle {
        /// The raw text that failed to parse.
        handle: String,
    },

    /// Engine start failed; no partial state is left behind.
    #[error("engine start failed: {reason}")]
    EngineStartFailed {
        /// Reason the engine gave for failing to start.
        reason: String,
    },

    /// Engine stop failed to complete cleanly.
    #[error("engine stop failed: {reason}")]
    EngineStopFailed {
        /// Reason the engine gave for failing to stop.
        reason: String,
    },

    /// A blocking control-plane call exceeded its deadline; the handle
    /// backing it must be considered poisoned.
    #[error("protocol timeout during {phase}")]
    ProtocolTimeout {
        /// The phase that timed out, e.g. "ready" or "command response".
        phase: String,
    },

    /// A raw `start` was sent to an engine that is already Running
    /// (§8 scenario 4).
    #[error("engine already running")]
    AlreadyRunning,

    /// The command protocol received a line it could not parse.
    #[error("unrecognized command: '{command}'")]
    UnknownCommand {
        /// The raw line that failed to parse.
        command: String,
    },

    /// An I/O failure reading or writing the command channel.
    #[error("command channel I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for HostError {
    fn from(e: std::io::Error) -> Self {
        HostError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_mismatch_message_names_both_rates() {
        let e = HostError::SampleRateMismatch {
            device: "Scarlett 2i2".into(),
            requested: 44100,
            actual: 48000,
        };
        let msg = e.to_string();
        assert!(msg.contains("44100"));
        assert!(msg.contains("48000"));
        assert!(msg.contains("Scarlett 2i2"));
    }
}
