//! The Reconfiguration Controller: the external API of §6, serialised on
//! one mutex per §4.5/§5 "Concurrency of the controller itself".

use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;

use sonido_core::config::AudioConfig;
use sonido_core::device::AudioDevice;
use sonido_core::error::HostResult;
use sonido_core::plugin::PluginDescriptor;
use sonido_core::reconfig::{ChangeKind, ReconfigurationResult};

use crate::classify::classify;
use crate::process::EngineProcess;
use crate::types::{CurrentConfig, DeviceSnapshot};

struct State {
    process: Option<EngineProcess>,
    config: Option<AudioConfig>,
}

/// Drives one engine process's lifecycle and exposes the five-method
/// control-plane API (§6 "Process boundary").
pub struct Controller {
    engine_exe: PathBuf,
    state: Mutex<State>,
}

impl Controller {
    /// Builds a controller that spawns `engine_exe` (the same binary this
    /// process was built from, in the common case) whenever it needs to
    /// start or restart an engine.
    #[must_use]
    pub fn new(engine_exe: PathBuf) -> Self {
        Self { engine_exe, state: Mutex::new(State { process: None, config: None }) }
    }

    /// `get_devices() → DeviceSnapshot` (§6).
    pub fn get_devices(&self) -> HostResult<DeviceSnapshot> {
        Ok(DeviceSnapshot {
            audio_inputs: sonido_io::list_input_devices().unwrap_or_default(),
            audio_outputs: sonido_io::list_output_devices().unwrap_or_default(),
            midi_inputs: sonido_io::list_midi_inputs().unwrap_or_default(),
            midi_outputs: sonido_io::list_midi_outputs().unwrap_or_default(),
        })
    }

    /// `get_plugins() → PluginCatalog` (§6). Runs the full out-of-process
    /// catalog, independent of whether an engine is currently running.
    #[must_use]
    pub fn get_plugins(&self, deadline: Duration) -> Vec<PluginDescriptor> {
        let registry = sonido_catalog::platform_registry();
        sonido_catalog::run_catalog(&self.engine_exe, deadline, registry.as_ref())
    }

    /// `get_current_config() → {running, config?, pid?}` (§6).
    #[must_use]
    pub fn get_current_config(&self) -> CurrentConfig {
        let state = self.state.lock();
        CurrentConfig {
            running: state.process.is_some(),
            config: state.config.clone(),
            pid: state.process.as_ref().map(EngineProcess::pid),
        }
    }

    /// `send_command(string) → CommandResponse` (§6): forwards a raw
    /// command line to the running engine, if any.
    pub fn send_command(&self, command: &str) -> HostResult<String> {
        let mut state = self.state.lock();
        match state.process.as_mut() {
            Some(process) => process.send_command(command),
            None => Ok("ERROR: no engine running".to_string()),
        }
    }

    /// `apply_config_change(ConfigChange) → ReconfigurationResult` (§4.5,
    /// §6): classifies the move from the current config to `new_config`
    /// and applies it by the cheapest means the classification allows.
    pub fn apply_config_change(&self, new_config: AudioConfig) -> ReconfigurationResult {
        let mut state = self.state.lock();
        let old_pid = state.process.as_ref().map(EngineProcess::pid);

        let Some(previous_config) = state.config.clone() else {
            return self.cold_start(&mut state, new_config, old_pid);
        };

        if previous_config == new_config {
            return ReconfigurationResult::no_change(previous_config, old_pid);
        }

        match classify(&previous_config, &new_config) {
            ChangeKind::NoChangeRequired => ReconfigurationResult::no_change(previous_config, old_pid),
            ChangeKind::DynamicChangeOnly => {
                self.apply_dynamic(&mut state, previous_config, new_config, old_pid)
            }
            ChangeKind::ChainRebuildRequired => {
                self.apply_chain_rebuild(&mut state, previous_config, new_config, old_pid)
            }
            ChangeKind::ProcessRestartRequired => {
                self.apply_restart(&mut state, previous_config, new_config, old_pid)
            }
        }
    }

    fn cold_start(
        &self,
        state: &mut State,
        new_config: AudioConfig,
        old_pid: Option<u32>,
    ) -> ReconfigurationResult {
        let validated = match self.validate(&new_config) {
            Ok(cfg) => cfg,
            Err(err) => {
                return ReconfigurationResult::rejected(
                    err.to_string(),
                    ChangeKind::ProcessRestartRequired,
                    None,
                    old_pid,
                )
            }
        };

        match EngineProcess::spawn(&self.engine_exe, &validated) {
            Ok(process) => {
                let new_pid = process.pid();
                state.process = Some(process);
                state.config = Some(validated.clone());
                ReconfigurationResult {
                    success: true,
                    message: "engine started".into(),
                    change_kind: ChangeKind::ProcessRestartRequired,
                    required_restart: true,
                    process_id_changed: true,
                    old_pid,
                    new_pid: Some(new_pid),
                    previous_config: None,
                    new_config: Some(validated),
                }
            }
            Err(err) => ReconfigurationResult::rejected(
                err.to_string(),
                ChangeKind::ProcessRestartRequired,
                None,
                old_pid,
            ),
        }
    }

    fn apply_restart(
        &self,
        state: &mut State,
        previous_config: AudioConfig,
        new_config: AudioConfig,
        old_pid: Option<u32>,
    ) -> ReconfigurationResult {
        let validated = match self.validate(&new_config) {
            Ok(cfg) => cfg,
            Err(err) => {
                return ReconfigurationResult::rejected(
                    err.to_string(),
                    ChangeKind::ProcessRestartRequired,
                    Some(previous_config),
                    old_pid,
                )
            }
        };

        if let Some(process) = state.process.take() {
            if let Err(err) = process.shutdown() {
                tracing::warn!(error = %err, "engine shutdown reported an error, continuing with restart");
            }
        }
        state.config = None;

        match EngineProcess::spawn(&self.engine_exe, &validated) {
            Ok(process) => {
                let new_pid = process.pid();
                state.process = Some(process);
                state.config = Some(validated.clone());
                ReconfigurationResult {
                    success: true,
                    message: "engine restarted".into(),
                    change_kind: ChangeKind::ProcessRestartRequired,
                    required_restart: true,
                    process_id_changed: true,
                    old_pid,
                    new_pid: Some(new_pid),
                    previous_config: Some(previous_config),
                    new_config: Some(validated),
                }
            }
            Err(err) => ReconfigurationResult::rejected(
                err.to_string(),
                ChangeKind::ProcessRestartRequired,
                Some(previous_config),
                old_pid,
            ),
        }
    }

    fn apply_chain_rebuild(
        &self,
        state: &mut State,
        previous_config: AudioConfig,
        new_config: AudioConfig,
        old_pid: Option<u32>,
    ) -> ReconfigurationResult {
        let Some(process) = state.process.as_mut() else {
            return ReconfigurationResult::rejected(
                "no engine running".to_string(),
                ChangeKind::ChainRebuildRequired,
                Some(previous_config),
                old_pid,
            );
        };

        if let Err(err) = process.send_command("unload-plugin") {
            return ReconfigurationResult::rejected(
                err.to_string(),
                ChangeKind::ChainRebuildRequired,
                Some(previous_config),
                old_pid,
            );
        }

        if let Some(handle) = new_config.plugin_handle {
            let response = match process.send_command(&format!("load-plugin {handle}")) {
                Ok(response) => response,
                Err(err) => {
                    return ReconfigurationResult::rejected(
                        err.to_string(),
                        ChangeKind::ChainRebuildRequired,
                        Some(previous_config),
                        old_pid,
                    )
                }
            };
            if response.starts_with("ERROR") {
                return ReconfigurationResult::rejected(
                    response,
                    ChangeKind::ChainRebuildRequired,
                    Some(previous_config),
                    old_pid,
                );
            }
        }

        state.config = Some(new_config.clone());
        ReconfigurationResult {
            success: true,
            message: "plugin chain rebuilt".into(),
            change_kind: ChangeKind::ChainRebuildRequired,
            required_restart: false,
            process_id_changed: false,
            old_pid,
            new_pid: old_pid,
            previous_config: Some(previous_config),
            new_config: Some(new_config),
        }
    }

    fn apply_dynamic(
        &self,
        state: &mut State,
        previous_config: AudioConfig,
        new_config: AudioConfig,
        old_pid: Option<u32>,
    ) -> ReconfigurationResult {
        let Some(process) = state.process.as_mut() else {
            return ReconfigurationResult::rejected(
                "no engine running".to_string(),
                ChangeKind::DynamicChangeOnly,
                Some(previous_config),
                old_pid,
            );
        };

        if previous_config.enable_test_tone != new_config.enable_test_tone {
            let command = if new_config.enable_test_tone { "tone on" } else { "tone off" };
            if let Err(err) = process.send_command(command) {
                return ReconfigurationResult::rejected(
                    err.to_string(),
                    ChangeKind::DynamicChangeOnly,
                    Some(previous_config),
                    old_pid,
                );
            }
        }
        if previous_config.tone_frequency != new_config.tone_frequency {
            let command = format!("tone freq {}", new_config.tone_frequency);
            match process.send_command(&command) {
                Ok(response) if response.starts_with("ERROR") => {
                    return ReconfigurationResult::rejected(
                        response,
                        ChangeKind::DynamicChangeOnly,
                        Some(previous_config),
                        old_pid,
                    )
                }
                Err(err) => {
                    return ReconfigurationResult::rejected(
                        err.to_string(),
                        ChangeKind::DynamicChangeOnly,
                        Some(previous_config),
                        old_pid,
                    )
                }
                Ok(_) => {}
            }
        }

        state.config = Some(new_config.clone());
        ReconfigurationResult {
            success: true,
            message: "applied on the live engine".into(),
            change_kind: ChangeKind::DynamicChangeOnly,
            required_restart: false,
            process_id_changed: false,
            old_pid,
            new_pid: old_pid,
            previous_config: Some(previous_config),
            new_config: Some(new_config),
        }
    }

    /// Validates `config` against the current device snapshot (§4.6),
    /// resolving the effective output device to the OS default.
    fn validate(&self, config: &AudioConfig) -> HostResult<AudioConfig> {
        let inputs: Vec<AudioDevice> = sonido_io::list_input_devices().unwrap_or_default();
        let outputs: Vec<AudioDevice> = sonido_io::list_output_devices().unwrap_or_default();
        let defaults = sonido_io::device_defaults().unwrap_or_default();
        let output_device_id = defaults.default_output_id.unwrap_or(0);
        sonido_config::validate_config(config, &inputs, &outputs, output_device_id)
    }
}

/// Convenience constructor using the controller's own executable as the
/// engine binary, the common case when the controller and engine are
/// built from the same crate.
#[must_use]
pub fn self_hosted(current_exe: &Path) -> Controller {
    Controller::new(current_exe.to_path_buf())
}
