//! Sonido Config - the Validation Layer for the sonido audio host (§4.6).
//!
//! Pure functions over an `AudioConfig` and a device snapshot; no side
//! effects, no I/O of its own. Enforces well-formedness ahead of any call
//! that would touch the engine.

pub mod validation;

pub use validation::{
    suggest_sample_rate, validate_buffer_size, validate_config, validate_input_device,
    validate_output_device,
};
