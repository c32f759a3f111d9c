//! Device Enumerator — audio and MIDI device discovery for the sonido
//! audio host (§4.1).
//!
//! Every query function here is side-effect free and re-runnable: none of
//! them cache a host handle or a device list across calls.

mod enumerator;
mod midi;

pub use enumerator::{
    device_defaults, find_input_device, find_output_device, list_input_devices,
    list_output_devices,
};
pub use midi::{list_midi_inputs, list_midi_outputs};

/// Errors raised by the Device Enumerator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested audio device id is not in the current enumeration.
    #[error("device not found: {id}")]
    DeviceNotFound {
        /// The id that was not found.
        id: u32,
    },

    /// Standard I/O error from the underlying platform API.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for the Device Enumerator.
pub type Result<T> = std::result::Result<T, Error>;
