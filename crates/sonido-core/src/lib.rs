//! Sonido Core - shared data model for the audio host
//!
//! This crate holds the value types shared by every other crate in the
//! workspace: device and plug-in descriptors, the running configuration,
//! engine state, and the error kinds raised across the control plane.
//! It does no I/O of its own.
//!
//! # Design Principles
//!
//! - Pure value types: every public struct here is `Clone` and carries no
//!   handles to OS resources.
//! - One error enum per concern, composed with `thiserror`, so callers can
//!   match on specific kinds rather than string-matching messages.

pub mod config;
pub mod device;
pub mod error;
pub mod native_host;
pub mod plugin;
pub mod reconfig;
pub mod state;

pub use config::AudioConfig;
pub use device::{AudioDevice, DeviceDefaults, MidiEndpoint};
pub use error::{HostError, HostResult};
pub use native_host::{NativePluginHost, NativePluginInstance, RawParamInfo};
pub use plugin::{IndexedValuesSource, ParamUnit, ParameterDescriptor, PluginDescriptor, PluginHandle};
pub use reconfig::{ChangeKind, ReconfigurationResult};
pub use state::{EngineStateTag, EngineStatus};
