//! The realtime render path (§4.3 "Render path"): no allocation, no
//! blocking, no logging on the fast path. Every buffer this touches is
//! pre-allocated by the caller (during `start` or `load_plugin`).

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use sonido_core::native_host::NativePluginInstance;

use crate::diagnostics::{DiagnosticKind, DiagnosticSink};
use crate::slot::PluginSlot;

/// Test-tone amplitude (§4.3 point 1).
const TONE_AMPLITUDE: f32 = 0.1;

/// Enable flag and frequency for the test-tone generator, published from
/// the control thread and read once per render invocation (§5 "Shared
/// state & publication").
#[derive(Debug)]
pub struct ToneState {
    enabled: std::sync::atomic::AtomicBool,
    frequency_bits: AtomicU32,
}

impl ToneState {
    /// A tone state enabled at `frequency` Hz.
    #[must_use]
    pub fn new(enabled: bool, frequency: f32) -> Self {
        Self {
            enabled: std::sync::atomic::AtomicBool::new(enabled),
            frequency_bits: AtomicU32::new(frequency.to_bits()),
        }
    }

    /// Whether the generator is currently enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Enables or disables the generator.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// The currently configured frequency in Hz.
    #[must_use]
    pub fn frequency(&self) -> f32 {
        f32::from_bits(self.frequency_bits.load(Ordering::Acquire))
    }

    /// Sets the frequency in Hz. Takes effect on the next render
    /// invocation; never torn, since a single `u32` write is atomic.
    pub fn set_frequency(&self, frequency: f32) {
        self.frequency_bits.store(frequency.to_bits(), Ordering::Release);
    }
}

/// Where this invocation's input audio comes from, if anywhere.
pub enum InputSource<'a> {
    /// No input device is configured for this engine.
    None,
    /// An input device is configured; `interleaved` holds `frames *
    /// channels` freshly captured samples, already pulled from the audio
    /// unit's input bus by the caller.
    Device {
        /// Captured samples, interleaved by channel.
        interleaved: &'a [f32],
        /// Channel count of `interleaved`.
        channels: u32,
        /// Which channel to extract the guitar signal from.
        channel: u32,
    },
}

/// Renders one block into `output` (interleaved stereo, `frames * 2`
/// samples), following the mutually-exclusive tone / plug-in / pass-
/// through / silence paths of §4.3.
///
/// `phase` is owned exclusively by the render thread across invocations;
/// it is never shared, so it needs no atomics.
#[allow(clippy::too_many_arguments)]
pub fn render_block(
    output: &mut [f32],
    frames: usize,
    sample_rate: u32,
    tone: &ToneState,
    phase: &mut f32,
    input: InputSource<'_>,
    plugin_slot: &PluginSlot,
    peak: &AtomicU32,
    render_faults: &AtomicU64,
    diagnostics: &DiagnosticSink,
) {
    debug_assert_eq!(output.len(), frames * 2);

    if tone.is_enabled() {
        render_tone(output, frames, sample_rate, tone.frequency(), phase);
        return;
    }

    let Device { interleaved, channels, channel } = match input {
        InputSource::None => {
            output.fill(0.0);
            return;
        }
        InputSource::Device { interleaved, channels, channel } => {
            Device { interleaved, channels, channel }
        }
    };

    let mut peak_this_block = 0.0f32;
    if let Some(loaded) = plugin_slot.loaded() {
        let mut loaded = loaded.lock();
        for frame in 0..frames {
            let sample = extract_channel(interleaved, channels, channel, frame);
            peak_this_block = peak_this_block.max(sample.abs());
            loaded.input_buffer[frame * 2] = sample;
            loaded.input_buffer[frame * 2 + 1] = sample;
        }
        let render_result =
            loaded.instance.render(&loaded.input_buffer[..frames * 2], output, frames as u32);
        if let Err(err) = render_result {
            render_faults.fetch_add(1, Ordering::Relaxed);
            diagnostics.publish(DiagnosticKind::PluginRenderFault, err.to_string());
            pass_through(output, interleaved, channels, channel, frames);
        }
    } else {
        pass_through(output, interleaved, channels, channel, frames);
        for frame in 0..frames {
            let sample = extract_channel(interleaved, channels, channel, frame);
            peak_this_block = peak_this_block.max(sample.abs());
        }
    }
    peak.store(peak_this_block.to_bits(), Ordering::Relaxed);
}

struct Device<'a> {
    interleaved: &'a [f32],
    channels: u32,
    channel: u32,
}

fn extract_channel(interleaved: &[f32], channels: u32, channel: u32, frame: usize) -> f32 {
    let idx = frame * channels as usize + channel as usize;
    interleaved.get(idx).copied().unwrap_or(0.0)
}

fn pass_through(output: &mut [f32], interleaved: &[f32], channels: u32, channel: u32, frames: usize) {
    for frame in 0..frames {
        let sample = extract_channel(interleaved, channels, channel, frame);
        output[frame * 2] = sample;
        output[frame * 2 + 1] = sample;
    }
}

fn render_tone(output: &mut [f32], frames: usize, sample_rate: u32, frequency: f32, phase: &mut f32) {
    let increment = std::f32::consts::TAU * frequency / sample_rate as f32;
    for frame in 0..frames {
        let sample = phase.sin() * TONE_AMPLITUDE;
        output[frame * 2] = sample;
        output[frame * 2 + 1] = sample;
        *phase += increment;
        if *phase >= std::f32::consts::TAU {
            *phase -= std::f32::consts::TAU;
        }
    }
}

/// Reads the last published peak input level, for status/telemetry
/// queries. Never blocks; the render thread only ever stores into the
/// same cell (§4.3 point 2 "Input-level telemetry").
#[must_use]
pub fn read_peak(peak: &AtomicU32) -> f32 {
    f32::from_bits(peak.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonido_core::error::{HostError, HostResult};
    use sonido_core::native_host::RawParamInfo;
    use sonido_core::plugin::PluginHandle;

    fn handle() -> PluginHandle {
        "aufx:dist:acme".parse().unwrap()
    }

    fn test_sink() -> DiagnosticSink {
        crate::diagnostics::channel().0
    }

    struct PassthroughPlugin;
    impl NativePluginInstance for PassthroughPlugin {
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
        fn render(&mut self, input: &[f32], output: &mut [f32], frames: u32) -> HostResult<()> {
            output[..frames as usize * 2].copy_from_slice(&input[..frames as usize * 2]);
            Ok(())
        }
    }

    struct FailingPlugin;
    impl NativePluginInstance for FailingPlugin {
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
        fn render(&mut self, _input: &[f32], _output: &mut [f32], _frames: u32) -> HostResult<()> {
            Err(HostError::EngineStartFailed { reason: "boom".into() })
        }
    }

    #[test]
    fn tone_path_writes_sine_at_configured_amplitude() {
        let tone = ToneState::new(true, 440.0);
        let mut phase = 0.0;
        let mut output = vec![0.0f32; 8 * 2];
        let peak = AtomicU32::new(0);
        let faults = AtomicU64::new(0);
        let slot = PluginSlot::new();
        let sink = test_sink();
        render_block(&mut output, 8, 44100, &tone, &mut phase, InputSource::None, &slot, &peak, &faults, &sink);
        assert!(output.iter().all(|&s| s.abs() <= 0.1001));
        assert_eq!(output[0], output[1]);
    }

    #[test]
    fn tone_phase_wraps_modulo_tau() {
        let tone = ToneState::new(true, 20000.0);
        let mut phase = 0.0;
        let mut output = vec![0.0f32; 512 * 2];
        let peak = AtomicU32::new(0);
        let faults = AtomicU64::new(0);
        let slot = PluginSlot::new();
        let sink = test_sink();
        render_block(&mut output, 512, 44100, &tone, &mut phase, InputSource::None, &slot, &peak, &faults, &sink);
        assert!(phase < std::f32::consts::TAU);
        assert!(phase >= 0.0);
    }

    #[test]
    fn no_tone_no_input_zeros_output() {
        let tone = ToneState::new(false, 440.0);
        let mut phase = 0.0;
        let mut output = vec![1.0f32; 4 * 2];
        let peak = AtomicU32::new(0);
        let faults = AtomicU64::new(0);
        let slot = PluginSlot::new();
        let sink = test_sink();
        render_block(&mut output, 4, 44100, &tone, &mut phase, InputSource::None, &slot, &peak, &faults, &sink);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn input_without_plugin_fans_mono_to_stereo() {
        let tone = ToneState::new(false, 440.0);
        let mut phase = 0.0;
        let mut output = vec![0.0f32; 3 * 2];
        let peak = AtomicU32::new(0);
        let faults = AtomicU64::new(0);
        let slot = PluginSlot::new();
        let interleaved = [0.5, 9.0, 0.25, 9.0, -0.5, 9.0];
        let input = InputSource::Device { interleaved: &interleaved, channels: 2, channel: 0 };
        let sink = test_sink();
        render_block(&mut output, 3, 44100, &tone, &mut phase, input, &slot, &peak, &faults, &sink);
        assert_eq!(output, vec![0.5, 0.5, 0.25, 0.25, -0.5, -0.5]);
        assert_eq!(read_peak(&peak), 0.5);
    }

    #[test]
    fn input_routed_through_published_plugin() {
        let tone = ToneState::new(false, 440.0);
        let mut phase = 0.0;
        let mut output = vec![0.0f32; 2 * 2];
        let peak = AtomicU32::new(0);
        let faults = AtomicU64::new(0);
        let slot = PluginSlot::new();
        slot.publish(handle(), Box::new(PassthroughPlugin), 8);

        let interleaved = [0.3, 9.0, -0.3, 9.0];
        let input = InputSource::Device { interleaved: &interleaved, channels: 2, channel: 0 };
        let sink = test_sink();
        render_block(&mut output, 2, 44100, &tone, &mut phase, input, &slot, &peak, &faults, &sink);
        assert_eq!(output, vec![0.3, 0.3, -0.3, -0.3]);
        assert_eq!(faults.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn plugin_render_failure_falls_back_to_pass_through_and_counts_fault() {
        let tone = ToneState::new(false, 440.0);
        let mut phase = 0.0;
        let mut output = vec![9.0f32; 2 * 2];
        let peak = AtomicU32::new(0);
        let faults = AtomicU64::new(0);
        let slot = PluginSlot::new();
        slot.publish(handle(), Box::new(FailingPlugin), 8);

        let interleaved = [0.4, 9.0, 0.1, 9.0];
        let input = InputSource::Device { interleaved: &interleaved, channels: 2, channel: 0 };
        let sink = test_sink();
        render_block(&mut output, 2, 44100, &tone, &mut phase, input, &slot, &peak, &faults, &sink);
        assert_eq!(output, vec![0.4, 0.4, 0.1, 0.1]);
        assert_eq!(faults.load(Ordering::Relaxed), 1);
    }
}
