//! Integration tests for the `sonido` binary's command-line surface.
//!
//! These deliberately avoid exercising real audio hardware — device
//! enumeration and the plug-in registry both degrade to an empty-but-valid
//! result when no hardware or native backend is present, so the commands
//! here are exercised for their JSON shape and exit behavior rather than
//! for specific device content.

use std::process::Command;

fn sonido_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sonido"))
}

#[test]
fn top_level_help_lists_every_subcommand() {
    let output = sonido_bin().arg("--help").output().expect("failed to run sonido --help");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("engine"));
    assert!(stdout.contains("devices"));
    assert!(stdout.contains("plugins"));
    assert!(stdout.contains("control"));
}

#[test]
fn engine_help_documents_the_spawn_flags() {
    let output = sonido_bin().args(["engine", "--help"]).output().expect("failed to run sonido engine --help");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--sample-rate"));
    assert!(stdout.contains("--buffer-size"));
    assert!(stdout.contains("--command-mode"));
}

#[test]
fn engine_rejects_a_missing_required_sample_rate() {
    let output = sonido_bin().args(["engine", "--command-mode"]).output().expect("failed to run sonido engine");
    assert!(!output.status.success());
}

#[test]
fn devices_json_reports_all_four_scopes() {
    let output = sonido_bin().args(["devices", "--json"]).output().expect("failed to run sonido devices");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("devices output is valid json");
    assert!(json.get("audioInputs").is_some());
    assert!(json.get("audioOutputs").is_some());
    assert!(json.get("midiInputs").is_some());
    assert!(json.get("midiOutputs").is_some());
}

#[test]
fn devices_table_view_does_not_error_with_no_hardware() {
    let output = sonido_bin().arg("devices").output().expect("failed to run sonido devices");
    assert!(output.status.success());
}

#[test]
fn plugins_catalog_completes_within_its_own_timeout() {
    let output = sonido_bin()
        .args(["plugins", "--timeout-seconds", "2"])
        .output()
        .expect("failed to run sonido plugins");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("plugins output is valid json");
    assert!(json.is_array());
}

#[test]
fn introspect_one_rejects_a_malformed_handle() {
    let output = sonido_bin()
        .args(["introspect-one", "not-a-handle"])
        .output()
        .expect("failed to run sonido introspect-one");
    assert!(!output.status.success());
}

#[test]
fn introspect_one_on_an_unregistered_handle_prints_nothing() {
    let output = sonido_bin()
        .args(["introspect-one", "aufx:dist:acme"])
        .output()
        .expect("failed to run sonido introspect-one");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}
