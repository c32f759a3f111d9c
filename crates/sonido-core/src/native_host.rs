//! The seam between the Plug-in Catalog and the Audio Host Engine: a
//! single trait pair describing how to enumerate and drive a native
//! plug-in, so the catalog's introspection path and the engine's realtime
//! load path share one native-hosting implementation and cannot drift
//! apart.

use crate::error::HostResult;
use crate::plugin::{ParamUnit, PluginHandle};

/// A parameter as read directly off a native plug-in, before the catalog
/// applies its writable/ramp-capable filter or resolves indexed value
/// strings.
#[derive(Debug, Clone, PartialEq)]
pub struct RawParamInfo {
    /// Opaque address used to address this parameter.
    pub address: u64,
    /// Stable string identifier.
    pub identifier: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Unit the value is expressed in.
    pub unit: ParamUnit,
    /// Minimum value.
    pub min_value: f32,
    /// Maximum value.
    pub max_value: f32,
    /// Default value.
    pub default_value: f32,
    /// Current value.
    pub current_value: f32,
    /// Whether a host can write to this parameter.
    pub is_writable: bool,
    /// Whether the plug-in supports sample-accurate ramping.
    pub can_ramp: bool,
    /// The plug-in's raw native flag bits.
    pub raw_flags: u32,
    /// The plug-in's native value-strings array, if it exposes one for
    /// this parameter (only meaningful when `unit == Indexed`).
    pub native_value_strings: Option<Vec<String>>,
}

/// One instantiated native plug-in (or the engine's own host I/O unit).
///
/// Implementors are not `Sync`: a single instance is only ever driven from
/// one thread at a time (the control thread during setup/introspection,
/// the render thread afterwards).
pub trait NativePluginInstance: Send {
    /// Sets the canonical stream format (44100 Hz or the engine's
    /// configured rate, stereo, 32-bit float) on input and output scopes.
    fn set_stream_format(&mut self, sample_rate: u32) -> HostResult<()>;

    /// Sets the maximum frames the plug-in will be asked to render in one
    /// call (§4.2 step 3: 512 during introspection).
    fn set_max_frames_to_render(&mut self, frames: u32) -> HostResult<()>;

    /// Allocates render resources and readies the instance for
    /// `render`/`render_silence`.
    fn initialize(&mut self) -> HostResult<()>;

    /// Releases render resources. Idempotent.
    fn uninitialize(&mut self);

    /// The plug-in's factory-preset names, in index order, if any.
    fn factory_preset_names(&self) -> Vec<String>;

    /// Selects a factory preset by index.
    fn select_factory_preset(&mut self, index: u32) -> HostResult<()>;

    /// Drives `frames` of silent input through the plug-in once, to coerce
    /// lazy metadata population (§4.2 step 4).
    fn render_silence(&mut self, frames: u32) -> HostResult<()>;

    /// The plug-in's full parameter list, unfiltered.
    fn parameters(&self) -> Vec<RawParamInfo>;

    /// Renders `frames` of audio from `input` (interleaved stereo) into
    /// `output` (interleaved stereo). Allocation-free; safe to call from
    /// a realtime thread once `initialize` has returned.
    fn render(&mut self, input: &[f32], output: &mut [f32], frames: u32) -> HostResult<()>;
}

/// The native plug-in registry: enumerates installed components and
/// instantiates them by handle.
pub trait NativePluginHost: Send + Sync {
    /// Lists every registered component of effect type, with its display
    /// name.
    fn registered_plugins(&self) -> HostResult<Vec<(PluginHandle, String)>>;

    /// Instantiates the plug-in identified by `handle`, in-process.
    fn instantiate(&self, handle: PluginHandle) -> HostResult<Box<dyn NativePluginInstance>>;
}
