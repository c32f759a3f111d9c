//! Audio device enumeration (§4.1).
//!
//! Every query here builds a fresh [`cpal::Host`] and re-walks its device
//! list; nothing is cached, so repeated calls always reflect the current
//! hardware state.

use cpal::traits::{DeviceTrait, HostTrait};
use sonido_core::device::{
    AudioDevice, DeviceDefaults, CANONICAL_SAMPLE_RATES, FALLBACK_BIT_DEPTHS, FALLBACK_SAMPLE_RATES,
};

use crate::Error;

/// Which scope (input or output) to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Input,
    Output,
}

/// Lists audio input devices with their capabilities (§4.1).
pub fn list_input_devices() -> crate::Result<Vec<AudioDevice>> {
    list_devices(Scope::Input)
}

/// Lists audio output devices with their capabilities (§4.1).
pub fn list_output_devices() -> crate::Result<Vec<AudioDevice>> {
    list_devices(Scope::Output)
}

fn list_devices(scope: Scope) -> crate::Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let devices = match host.devices() {
        Ok(d) => d,
        // Failure policy: platform query itself failed — empty list (§4.1).
        Err(err) => {
            tracing::warn!(?scope, %err, "device query failed, reporting an empty list");
            return Ok(Vec::new());
        }
    };

    let default_name = match scope {
        Scope::Input => host.default_input_device().and_then(|d| d.name().ok()),
        Scope::Output => host.default_output_device().and_then(|d| d.name().ok()),
    };

    let mut out = Vec::new();
    for (idx, device) in devices.enumerate() {
        let Ok(name) = device.name() else {
            tracing::warn!(?scope, index = idx, "device name query failed, device omitted");
            continue;
        };

        let configs: Vec<cpal::SupportedStreamConfigRange> = match scope {
            Scope::Input => device.supported_input_configs().map(|c| c.collect()).unwrap_or_else(|err| {
                tracing::warn!(%name, %err, "input stream configs unavailable, falling back to canonical defaults");
                Vec::new()
            }),
            Scope::Output => device.supported_output_configs().map(|c| c.collect()).unwrap_or_else(|err| {
                tracing::warn!(%name, %err, "output stream configs unavailable, falling back to canonical defaults");
                Vec::new()
            }),
        };

        // Channel count: the most channels reported across this scope's
        // stream configs. Devices with zero channels on this scope are
        // omitted (§4.1 point 2).
        let channel_count = configs.iter().map(|c| u32::from(c.channels())).max().unwrap_or(0);
        if channel_count == 0 {
            continue;
        }

        let ranges: Vec<RawRange> = configs
            .iter()
            .map(|c| RawRange {
                min_rate: c.min_sample_rate().0,
                max_rate: c.max_sample_rate().0,
                bits: sample_format_bits(c.sample_format()),
            })
            .collect();
        let supported_sample_rates = intersect_sample_rates(&ranges);
        let supported_bit_depths = collect_bit_depths(&ranges);
        let is_default = default_name.as_deref() == Some(name.as_str());

        out.push(AudioDevice {
            device_id: idx as u32,
            // cpal exposes no persistent cross-process UID; the device
            // name is the closest stable handle available on every
            // backend, so it doubles as the UID.
            uid: name.clone(),
            name,
            channel_count,
            supported_sample_rates,
            supported_bit_depths,
            is_default,
            is_online: true,
        });
    }
    Ok(out)
}

/// A stream config range reduced to the fields the intersection logic
/// below needs, so that logic can be unit-tested without constructing a
/// real `cpal::SupportedStreamConfigRange` (its fields are private and
/// only a cpal host backend can build one).
struct RawRange {
    min_rate: u32,
    max_rate: u32,
    bits: u32,
}

fn intersect_sample_rates(ranges: &[RawRange]) -> Vec<u32> {
    if ranges.is_empty() {
        return FALLBACK_SAMPLE_RATES.to_vec();
    }
    let rates: Vec<u32> = CANONICAL_SAMPLE_RATES
        .iter()
        .copied()
        .filter(|&rate| ranges.iter().any(|r| rate >= r.min_rate && rate <= r.max_rate))
        .collect();
    if rates.is_empty() {
        FALLBACK_SAMPLE_RATES.to_vec()
    } else {
        rates
    }
}

fn collect_bit_depths(ranges: &[RawRange]) -> Vec<u32> {
    let mut depths: Vec<u32> = ranges.iter().map(|r| r.bits).collect();
    depths.sort_unstable();
    depths.dedup();
    if depths.is_empty() {
        FALLBACK_BIT_DEPTHS.to_vec()
    } else {
        depths
    }
}

fn sample_format_bits(format: cpal::SampleFormat) -> u32 {
    use cpal::SampleFormat;
    match format {
        SampleFormat::I8 | SampleFormat::U8 => 8,
        SampleFormat::I16 | SampleFormat::U16 => 16,
        SampleFormat::I24 | SampleFormat::U24 => 24,
        SampleFormat::I32 | SampleFormat::U32 | SampleFormat::F32 => 32,
        SampleFormat::I64 | SampleFormat::U64 | SampleFormat::F64 => 64,
        _ => 16,
    }
}

/// Reads the OS's default input and output device ids (§4.1 "Defaults
/// query"). Returns `None` for a scope with no default rather than a
/// sentinel handle that could collide with a real device id.
pub fn device_defaults() -> crate::Result<DeviceDefaults> {
    let inputs = list_input_devices()?;
    let outputs = list_output_devices()?;
    Ok(DeviceDefaults {
        default_input_id: inputs.iter().find(|d| d.is_default).map(|d| d.device_id),
        default_output_id: outputs.iter().find(|d| d.is_default).map(|d| d.device_id),
    })
}

/// Looks up a previously-enumerated input device by its process-local id.
pub fn find_input_device(device_id: u32) -> crate::Result<AudioDevice> {
    list_input_devices()?
        .into_iter()
        .find(|d| d.device_id == device_id)
        .ok_or(Error::DeviceNotFound { id: device_id })
}

/// Looks up a previously-enumerated output device by its process-local id.
pub fn find_output_device(device_id: u32) -> crate::Result<AudioDevice> {
    list_output_devices()?
        .into_iter()
        .find(|d| d.device_id == device_id)
        .ok_or(Error::DeviceNotFound { id: device_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: u32, max: u32, bits: u32) -> RawRange {
        RawRange { min_rate: min, max_rate: max, bits }
    }

    #[test]
    fn empty_ranges_fall_back_to_canonical_defaults() {
        assert_eq!(intersect_sample_rates(&[]), FALLBACK_SAMPLE_RATES.to_vec());
        assert_eq!(collect_bit_depths(&[]), FALLBACK_BIT_DEPTHS.to_vec());
    }

    #[test]
    fn sample_rates_intersected_with_canonical_set() {
        let ranges = vec![range(44100, 96000, 32)];
        let rates = intersect_sample_rates(&ranges);
        assert_eq!(rates, vec![44100, 48000, 88200, 96000]);
    }

    #[test]
    fn bit_depths_deduplicated() {
        let ranges = vec![range(44100, 44100, 32), range(44100, 44100, 32), range(44100, 44100, 16)];
        assert_eq!(collect_bit_depths(&ranges), vec![16, 32]);
    }

    #[test]
    fn sample_rate_outside_every_range_is_excluded() {
        let ranges = vec![range(44100, 48000, 16)];
        let rates = intersect_sample_rates(&ranges);
        assert!(!rates.contains(&96000));
    }
}
