//! Change classification (§4.5 "Change classification"): compares two
//! configs field-by-field and decides how cheaply the new one can be
//! applied to a running engine.

use sonido_core::config::AudioConfig;
use sonido_core::reconfig::ChangeKind;

/// Classifies the move from `old` to `new`. Fields that force a process
/// restart are checked first, since they dominate regardless of what else
/// also changed; the plug-in handle is checked next, then the tone
/// fields, falling through to `NoChangeRequired` when nothing differs.
#[must_use]
pub fn classify(old: &AudioConfig, new: &AudioConfig) -> ChangeKind {
    let restart_fields_differ = old.sample_rate != new.sample_rate
        || old.buffer_size != new.buffer_size
        || old.input_device_id != new.input_device_id
        || old.input_channel != new.input_channel;
    if restart_fields_differ {
        return ChangeKind::ProcessRestartRequired;
    }
    if old.plugin_handle != new.plugin_handle {
        return ChangeKind::ChainRebuildRequired;
    }
    if old.enable_test_tone != new.enable_test_tone || old.tone_frequency != new.tone_frequency {
        return ChangeKind::DynamicChangeOnly;
    }
    ChangeKind::NoChangeRequired
}
