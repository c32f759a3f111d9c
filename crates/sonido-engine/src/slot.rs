//! The plug-in slot: exclusive ownership of at most one instantiated
//! plug-in plus its pre-allocated stereo input buffer (§3 "PluginSlot").
//!
//! Publication is a single atomic pointer swap (`ArcSwapOption`), so the
//! render thread never observes a slot mid-construction (§8 invariant 3).
//! The inner `Mutex` exists only so the render thread can get `&mut`
//! access to the boxed instance for `render`/`render_silence` — the
//! lock is never contended outside unload, matching §5's one exception
//! to "no locks on the render thread": wait-free publication aside, a
//! brief lock for the plug-in's own mutable state is allowed.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;

use sonido_core::native_host::NativePluginInstance;
use sonido_core::plugin::PluginHandle;

/// Floor on the plug-in input buffer size, in frames (§4.3 point 5).
pub const MIN_PLUGIN_INPUT_FRAMES: u32 = 64;
/// Ceiling on the plug-in input buffer size, in frames (§4.3 point 5).
pub const MAX_PLUGIN_INPUT_FRAMES: u32 = 2048;

/// Computes the plug-in input buffer size in frames: `clamp(2 *
/// engine_buffer_size, 64, 2048)` (§4.3 point 5).
#[must_use]
pub fn plugin_input_frames(engine_buffer_size: u32) -> u32 {
    (2 * engine_buffer_size).clamp(MIN_PLUGIN_INPUT_FRAMES, MAX_PLUGIN_INPUT_FRAMES)
}

/// A fully-initialised, published plug-in instance.
pub struct LoadedPlugin {
    /// Identifies the loaded plug-in.
    pub handle: PluginHandle,
    /// The native instance, ready to render.
    pub instance: Box<dyn NativePluginInstance>,
    /// Pre-allocated interleaved stereo input buffer, sized by
    /// [`plugin_input_frames`]. Lives for the lifetime of the slot.
    pub input_buffer: Vec<f32>,
}

/// At most one plug-in at a time, published atomically for the render
/// thread.
#[derive(Default)]
pub struct PluginSlot {
    inner: ArcSwapOption<Mutex<LoadedPlugin>>,
}

impl PluginSlot {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self { inner: ArcSwapOption::empty() }
    }

    /// Publishes a freshly-initialised plug-in, replacing any previously
    /// published one in a single atomic swap.
    pub fn publish(&self, handle: PluginHandle, instance: Box<dyn NativePluginInstance>, input_frames: u32) {
        let loaded = LoadedPlugin {
            handle,
            instance,
            input_buffer: vec![0.0; input_frames as usize * 2],
        };
        self.inner.store(Some(Arc::new(Mutex::new(loaded))));
    }

    /// Atomically clears the slot. The render thread's next invocation
    /// will observe an empty slot; only after that handshake should the
    /// caller consider the previous instance safe to drop (§5).
    pub fn clear(&self) {
        self.inner.store(None);
    }

    /// The currently published plug-in, if any.
    #[must_use]
    pub fn loaded(&self) -> Option<Arc<Mutex<LoadedPlugin>>> {
        self.inner.load_full()
    }

    /// The handle of the currently loaded plug-in, if any.
    #[must_use]
    pub fn handle(&self) -> Option<PluginHandle> {
        self.loaded().map(|loaded| loaded.lock().handle)
    }

    /// Whether a plug-in is currently published.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.inner.load().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonido_core::error::HostResult;
    use sonido_core::native_host::RawParamInfo;

    struct NoopPlugin;
    impl NativePluginInstance for NoopPlugin {
        fn set_stream_format(&mut self, _: u32) -> HostResult<()> {
            Ok(())
        }
        fn set_max_frames_to_render(&mut self, _: u32) -> HostResult<()> {
            Ok(())
        }
        fn initialize(&mut self) -> HostResult<()> {
            Ok(())
        }
        fn uninitialize(&mut self) {}
        fn factory_preset_names(&self) -> Vec<String> {
            Vec::new()
        }
        fn select_factory_preset(&mut self, _: u32) -> HostResult<()> {
            Ok(())
        }
        fn render_silence(&mut self, _: u32) -> HostResult<()> {
            Ok(())
        }
        fn parameters(&self) -> Vec<RawParamInfo> {
            Vec::new()
        }
        fn render(&mut self, _: &[f32], output: &mut [f32], _: u32) -> HostResult<()> {
            output.fill(0.0);
            Ok(())
        }
    }

    #[test]
    fn buffer_size_clamped_between_floor_and_ceiling() {
        assert_eq!(plugin_input_frames(16), MIN_PLUGIN_INPUT_FRAMES);
        assert_eq!(plugin_input_frames(256), 512);
        assert_eq!(plugin_input_frames(4096), MAX_PLUGIN_INPUT_FRAMES);
    }

    #[test]
    fn empty_slot_reports_not_loaded() {
        let slot = PluginSlot::new();
        assert!(!slot.is_loaded());
        assert!(slot.handle().is_none());
    }

    #[test]
    fn publish_then_clear_round_trips() {
        let slot = PluginSlot::new();
        let handle: PluginHandle = "aufx:dist:acme".parse().unwrap();
        slot.publish(handle, Box::new(NoopPlugin), 256);
        assert!(slot.is_loaded());
        assert_eq!(slot.handle(), Some(handle));

        slot.clear();
        assert!(!slot.is_loaded());
    }
}
