//! The in-process half of plug-in introspection (§4.2 steps 2-7).
//!
//! This runs inside the short-lived `introspect-one` worker process that
//! [`crate::runner`] spawns per plug-in — a crash here only takes down
//! that child.

use std::thread;
use std::time::Duration;

use sonido_core::native_host::NativePluginHost;
use sonido_core::plugin::{ParamUnit, ParameterDescriptor, PluginDescriptor, PluginHandle};

use crate::fallback::resolve_indexed_values;

/// Canonical introspection sample rate (§4.2 step 2).
const CANONICAL_SAMPLE_RATE: u32 = 44_100;
/// Max frames per render during introspection (§4.2 step 3).
const MAX_FRAMES_TO_RENDER: u32 = 512;
/// Settle time after selecting the first factory preset (§4.2 step 3).
const PRESET_SETTLE: Duration = Duration::from_millis(300);
/// Settle time after driving one block of silence (§4.2 step 4).
const SILENCE_SETTLE: Duration = Duration::from_millis(200);

/// Runs the full introspection algorithm against one plug-in, returning
/// `None` when the plug-in is disqualified (any failure, or an empty
/// controllable-parameter list) rather than propagating an error — a
/// disqualified plug-in is simply omitted from the catalog (§4.2 step 7).
#[must_use]
pub fn introspect_one(host: &dyn NativePluginHost, handle: PluginHandle, display_name: &str) -> Option<PluginDescriptor> {
    let mut instance = match host.instantiate(handle) {
        Ok(instance) => instance,
        Err(err) => {
            tracing::warn!(%handle, %err, "plugin instantiation failed, disqualified");
            return None;
        }
    };

    if let Err(err) = instance.set_stream_format(CANONICAL_SAMPLE_RATE) {
        tracing::warn!(%handle, %err, "canonical format rejected, disqualified");
        return None;
    }
    if instance.set_max_frames_to_render(MAX_FRAMES_TO_RENDER).is_err() {
        tracing::warn!(%handle, "could not set max frames to render, disqualified");
        return None;
    }
    if let Err(err) = instance.initialize() {
        tracing::warn!(%handle, %err, "render resource allocation failed, disqualified");
        return None;
    }

    let factory_presets = instance.factory_preset_names();
    if !factory_presets.is_empty() {
        // Best-effort: a preset that fails to select still leaves the
        // instance usable for metadata population below.
        let _ = instance.select_factory_preset(0);
        thread::sleep(PRESET_SETTLE);
    }

    if instance.render_silence(MAX_FRAMES_TO_RENDER).is_err() {
        tracing::warn!(%handle, "priming render through silence failed, disqualified");
        return None;
    }
    thread::sleep(SILENCE_SETTLE);

    let parameters: Vec<ParameterDescriptor> = instance
        .parameters()
        .into_iter()
        .filter(|p| p.is_writable || p.can_ramp)
        .map(|p| {
            let (indexed_values, source) = if p.unit == ParamUnit::Indexed {
                let (values, source) = resolve_indexed_values(
                    &p.display_name,
                    p.native_value_strings.as_deref(),
                    Some(&factory_presets),
                );
                (values, Some(source))
            } else {
                (None, None)
            };
            ParameterDescriptor {
                address: p.address,
                identifier: p.identifier,
                display_name: p.display_name,
                unit: p.unit,
                min_value: p.min_value,
                max_value: p.max_value,
                default_value: p.default_value,
                current_value: p.current_value,
                is_writable: p.is_writable,
                can_ramp: p.can_ramp,
                raw_flags: p.raw_flags,
                indexed_values,
                indexed_values_source: source,
            }
        })
        .collect();

    instance.uninitialize();

    if parameters.is_empty() {
        return None;
    }

    Some(PluginDescriptor {
        plugin_type: handle.plugin_type,
        subtype: handle.subtype,
        manufacturer: handle.manufacturer,
        display_name: display_name.to_string(),
        parameters,
    })
}
