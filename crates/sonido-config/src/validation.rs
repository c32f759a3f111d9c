//! Pure validation functions over an [`AudioConfig`] and a device snapshot
//! (§4.6). None of these touch the OS; callers pass in whatever device
//! lists they already have on hand (typically from `sonido_io`).

use sonido_core::config::{AudioConfig, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
use sonido_core::device::AudioDevice;
use sonido_core::error::{HostError, HostResult};

/// The canonical sample rates tried, in order, by [`suggest_sample_rate`].
const PREFERRED_SAMPLE_RATES: [u32; 4] = [44100, 48000, 96000, 192000];

/// Substitutes the default buffer size for a request of `0`, then checks
/// the result falls in `[32, 1024]` (§4.6 point 1).
pub fn validate_buffer_size(requested: u32) -> HostResult<u32> {
    let buffer_size = if requested == 0 { DEFAULT_BUFFER_SIZE } else { requested };
    if !(MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&buffer_size) {
        return Err(HostError::ConfigValidation {
            field: "bufferSize".into(),
            reason: format!(
                "{buffer_size} is outside the allowed range [{MIN_BUFFER_SIZE}, {MAX_BUFFER_SIZE}]"
            ),
        });
    }
    Ok(buffer_size)
}

/// Validates a named input device: must exist in `devices`, be online,
/// support `sample_rate`, and have `input_channel` within its channel
/// count (§4.6 point 2).
pub fn validate_input_device(
    devices: &[AudioDevice],
    device_id: u32,
    input_channel: u32,
    sample_rate: u32,
) -> HostResult<()> {
    let device = devices
        .iter()
        .find(|d| d.device_id == device_id)
        .ok_or(HostError::DeviceNotFound { id: device_id })?;

    if !device.is_online {
        return Err(HostError::DeviceOffline { id: device_id });
    }
    if !device.supports_rate(sample_rate) {
        return Err(HostError::SampleRateMismatch {
            device: device.name.clone(),
            requested: sample_rate,
            actual: device.supported_sample_rates.first().copied().unwrap_or(0),
        });
    }
    if input_channel >= device.channel_count {
        return Err(HostError::ConfigValidation {
            field: "inputChannel".into(),
            reason: format!(
                "channel {input_channel} is out of range for device '{}' with {} channel(s)",
                device.name, device.channel_count
            ),
        });
    }
    Ok(())
}

/// Validates the effective output device: must be online and support
/// `sample_rate` (§4.6 point 3). `device_id` is the explicit choice or the
/// system default, resolved by the caller.
pub fn validate_output_device(
    devices: &[AudioDevice],
    device_id: u32,
    sample_rate: u32,
) -> HostResult<()> {
    let device = devices
        .iter()
        .find(|d| d.device_id == device_id)
        .ok_or(HostError::DeviceNotFound { id: device_id })?;

    if !device.is_online {
        return Err(HostError::DeviceOffline { id: device_id });
    }
    if !device.supports_rate(sample_rate) {
        return Err(HostError::SampleRateMismatch {
            device: device.name.clone(),
            requested: sample_rate,
            actual: device.supported_sample_rates.first().copied().unwrap_or(0),
        });
    }
    Ok(())
}

/// Suggests a sample rate both `input` and `output` can run at: the first
/// of `{44100, 48000, 96000, 192000}` supported by both, falling back to
/// the first member of the raw intersection, failing if the intersection
/// is empty (§4.6 point 4).
pub fn suggest_sample_rate(input: &AudioDevice, output: &AudioDevice) -> HostResult<u32> {
    for &rate in &PREFERRED_SAMPLE_RATES {
        if input.supports_rate(rate) && output.supports_rate(rate) {
            return Ok(rate);
        }
    }
    let intersection = input
        .supported_sample_rates
        .iter()
        .find(|rate| output.supported_sample_rates.contains(rate))
        .copied();
    intersection.ok_or_else(|| HostError::ConfigValidation {
        field: "sampleRate".into(),
        reason: format!(
            "no common sample rate between '{}' and '{}'",
            input.name, output.name
        ),
    })
}

/// Runs the full validation pipeline for a config about to be applied,
/// given the devices currently online. Returns the config with its
/// buffer size substituted, or the first validation failure encountered.
pub fn validate_config(
    config: &AudioConfig,
    input_devices: &[AudioDevice],
    output_devices: &[AudioDevice],
    output_device_id: u32,
) -> HostResult<AudioConfig> {
    let buffer_size = validate_buffer_size(config.buffer_size)?;

    if let Some(input_id) = config.input_device_id {
        validate_input_device(input_devices, input_id, config.input_channel, config.sample_rate)?;
    }
    validate_output_device(output_devices, output_device_id, config.sample_rate)?;

    Ok(AudioConfig { buffer_size, ..config.clone() })
}
