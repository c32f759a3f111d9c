//! MIDI endpoint enumeration (§3 `MidiEndpoint`, §4.1).
//!
//! The core does not route MIDI; these queries exist purely so a client
//! can display what's connected. A MIDI backend doesn't expose a "stale
//! but still listed" port the way an audio device list can, so every port
//! currently returned by the OS is reported `is_online = true`.

use midir::{MidiInput, MidiOutput};
use sonido_core::device::MidiEndpoint;

/// Lists MIDI input endpoints.
pub fn list_midi_inputs() -> crate::Result<Vec<MidiEndpoint>> {
    let Ok(midi_in) = MidiInput::new("sonido-enumerator") else {
        tracing::warn!("midi input backend unavailable, reporting an empty list");
        return Ok(Vec::new());
    };
    Ok(midi_in
        .ports()
        .iter()
        .enumerate()
        .map(|(idx, port)| {
            let name = midi_in.port_name(port).unwrap_or_else(|err| {
                tracing::warn!(index = idx, %err, "midi input port name query failed, using a placeholder");
                format!("MIDI In {idx}")
            });
            MidiEndpoint {
                endpoint_id: idx as u32,
                uid: name.clone(),
                name,
                is_online: true,
            }
        })
        .collect())
}

/// Lists MIDI output endpoints.
pub fn list_midi_outputs() -> crate::Result<Vec<MidiEndpoint>> {
    let Ok(midi_out) = MidiOutput::new("sonido-enumerator") else {
        tracing::warn!("midi output backend unavailable, reporting an empty list");
        return Ok(Vec::new());
    };
    Ok(midi_out
        .ports()
        .iter()
        .enumerate()
        .map(|(idx, port)| {
            let name = midi_out.port_name(port).unwrap_or_else(|err| {
                tracing::warn!(index = idx, %err, "midi output port name query failed, using a placeholder");
                format!("MIDI Out {idx}")
            });
            MidiEndpoint {
                endpoint_id: idx as u32,
                uid: name.clone(),
                name,
                is_online: true,
            }
        })
        .collect())
}
