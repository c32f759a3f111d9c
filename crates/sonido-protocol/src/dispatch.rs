//! Turns a parsed [`Command`] into a response line by driving an
//! [`Engine`], the Device Enumerator, and the Plug-in Catalog (§4.4
//! "Responses", §6 field names).

use std::path::Path;
use std::time::Duration;

use sonido_catalog::{run_catalog, PER_PLUGIN_TIMEOUT};
use sonido_core::error::HostError;
use sonido_engine::Engine;

use crate::command::{Command, DeviceQuery};

/// Default `inspect` deadline when no timeout argument is given.
const DEFAULT_INSPECT_TIMEOUT: Duration = PER_PLUGIN_TIMEOUT;

/// Human-readable text for the `help` command.
const HELP_TEXT: &str = "\
commands:
  start                         start the audio engine
  stop                          stop the audio engine
  status                        report engine status
  tone on | tone off            enable or disable the test tone
  tone freq <hz>                set test-tone frequency (0 < hz <= 20000)
  load-plugin <type:subtype:manufacturer>   load a plug-in by handle
  unload-plugin                 unload the current plug-in
  list-plugins                  list registered plug-ins
  devices audio-input|audio-output|midi-input|midi-output
  inspect [timeout_seconds]     run the full plug-in catalog
  help                          show this text
  quit | exit                   stop the engine and exit";

/// Executes one parsed command against `engine`, returning the exact
/// response line(s) to write to stdout. `worker_exe` is this process's own
/// executable, used to spawn `introspect-one` children for `inspect`.
///
/// Returns `Ok(true)` from the caller's perspective via [`Command::Quit`];
/// this function itself only ever produces response text, never exits the
/// process.
pub fn dispatch(command: &Command, engine: &Engine, worker_exe: &Path) -> String {
    match command {
        Command::Start => match engine.start(engine.config()) {
            Ok(()) => "OK: started".to_string(),
            Err(err) => error_line(&err),
        },
        Command::Stop => match engine.stop() {
            Ok(()) => "OK: stopped".to_string(),
            Err(err) => error_line(&err),
        },
        Command::Status => engine.status().to_status_line(),
        Command::ToneOn => {
            engine.set_tone_enabled(true);
            "OK: tone on".to_string()
        }
        Command::ToneOff => {
            engine.set_tone_enabled(false);
            "OK: tone off".to_string()
        }
        Command::ToneFreq(hz) => match engine.set_tone_frequency(*hz) {
            Ok(()) => format!("OK: tone freq {hz}"),
            Err(err) => error_line(&err),
        },
        Command::LoadPlugin(handle) => match engine.load_plugin(*handle) {
            Ok(()) => format!("OK: loaded {handle}"),
            Err(err) => error_line(&err),
        },
        Command::UnloadPlugin => {
            engine.unload_plugin();
            "OK: unloaded".to_string()
        }
        Command::ListPlugins => match engine.status().loaded_plugin {
            Some(handle) => format!("OK: {handle}"),
            None => "OK: none".to_string(),
        },
        Command::Devices(query) => devices_json(*query),
        Command::Inspect(timeout_secs) => inspect_json(engine, worker_exe, *timeout_secs),
        Command::Help => HELP_TEXT.to_string(),
        Command::Quit => "OK: quitting".to_string(),
    }
}

fn error_line(err: &HostError) -> String {
    format!("ERROR: {err}")
}

fn devices_json(query: DeviceQuery) -> String {
    let result: Result<String, String> = match query {
        DeviceQuery::AudioInput => sonido_io::list_input_devices()
            .map_err(|e| e.to_string())
            .and_then(|d| serde_json::to_string(&d).map_err(|e| e.to_string())),
        DeviceQuery::AudioOutput => sonido_io::list_output_devices()
            .map_err(|e| e.to_string())
            .and_then(|d| serde_json::to_string(&d).map_err(|e| e.to_string())),
        DeviceQuery::MidiInput => sonido_io::list_midi_inputs()
            .map_err(|e| e.to_string())
            .and_then(|d| serde_json::to_string(&d).map_err(|e| e.to_string())),
        DeviceQuery::MidiOutput => sonido_io::list_midi_outputs()
            .map_err(|e| e.to_string())
            .and_then(|d| serde_json::to_string(&d).map_err(|e| e.to_string())),
    };
    match result {
        Ok(json) => json,
        Err(e) => format!("ERROR: {e}"),
    }
}

fn inspect_json(engine: &Engine, worker_exe: &Path, timeout_secs: Option<u64>) -> String {
    let deadline = timeout_secs.map_or(DEFAULT_INSPECT_TIMEOUT, Duration::from_secs);
    let registry = engine.registry();
    let descriptors = run_catalog(worker_exe, deadline, registry.as_ref());
    serde_json::to_string(&descriptors).unwrap_or_else(|e| format!("ERROR: {e}"))
}
