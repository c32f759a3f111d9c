//! Integration tests for the Validation Layer exercising the full
//! `validate_config` pipeline against realistic device snapshots.

use sonido_config::{suggest_sample_rate, validate_config};
use sonido_core::config::AudioConfig;
use sonido_core::device::AudioDevice;
use sonido_core::error::HostError;

fn device(id: u32, name: &str, rates: &[u32], channels: u32, online: bool) -> AudioDevice {
    AudioDevice {
        device_id: id,
        uid: format!("uid-{id}"),
        name: name.to_string(),
        channel_count: channels,
        supported_sample_rates: rates.to_vec(),
        supported_bit_depths: vec![16, 24],
        is_default: false,
        is_online: online,
    }
}

#[test]
fn cold_start_tone_only_config_needs_only_an_output_device() {
    let output = device(1, "Built-in Output", &[44100, 48000], 2, true);
    let config = AudioConfig::tone_only(44100, 0);

    let validated = validate_config(&config, &[], &[output], 1).unwrap();
    assert_eq!(validated.buffer_size, 256);
    assert!(validated.input_device_id.is_none());
}

#[test]
fn input_routed_config_rejects_offline_input_device() {
    let input = device(2, "USB Interface", &[44100], 2, false);
    let output = device(1, "Built-in Output", &[44100], 2, true);
    let config = AudioConfig {
        input_device_id: Some(2),
        ..AudioConfig::tone_only(44100, 512)
    };

    let err = validate_config(&config, &[input], &[output], 1).unwrap_err();
    assert!(matches!(err, HostError::DeviceOffline { id: 2 }));
}

#[test]
fn input_routed_config_rejects_mismatched_sample_rate() {
    let input = device(2, "USB Interface", &[48000], 2, true);
    let output = device(1, "Built-in Output", &[48000], 2, true);
    let config = AudioConfig {
        input_device_id: Some(2),
        sample_rate: 44100,
        ..AudioConfig::tone_only(44100, 512)
    };

    let err = validate_config(&config, &[input], &[output], 1).unwrap_err();
    assert!(matches!(err, HostError::SampleRateMismatch { .. }));
}

#[test]
fn suggest_sample_rate_helps_reconcile_mismatched_devices() {
    let input = device(2, "USB Interface", &[48000, 96000], 2, true);
    let output = device(1, "Built-in Output", &[44100, 48000], 2, true);

    let suggested = suggest_sample_rate(&input, &output).unwrap();
    assert_eq!(suggested, 48000);

    let config = AudioConfig {
        input_device_id: Some(2),
        sample_rate: suggested,
        ..AudioConfig::tone_only(suggested, 512)
    };
    assert!(validate_config(&config, &[input], &[output], 1).is_ok());
}
