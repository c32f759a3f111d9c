//! The Audio Host Engine: the `Engine` struct ties the backend, the
//! render path, and the plug-in slot together into the full start / stop
//! / load-plugin / unload-plugin / status lifecycle of §4.3.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;

use sonido_core::config::{AudioConfig, MAX_TONE_FREQ};
use sonido_core::error::{HostError, HostResult};
use sonido_core::native_host::NativePluginHost;
use sonido_core::plugin::PluginHandle;
use sonido_core::state::{EngineStateTag, EngineStatus};

use crate::backend::{CpalBackend, Scope, StreamHandle};
use crate::diagnostics::{self, DiagnosticKind};
use crate::render::{render_block, read_peak, InputSource, ToneState};
use crate::slot::{plugin_input_frames, PluginSlot};

/// Ring-buffer capacity in frames, sized generously above the plug-in
/// input floor so a modest scheduling jitter between the input and output
/// streams never starves the output callback.
const RING_BUFFER_FRAMES: usize = 8192;

/// How often the control thread drains queued render diagnostics.
const DIAGNOSTIC_DRAIN_INTERVAL: Duration = Duration::from_millis(50);

struct Streams {
    output: StreamHandle,
    input: Option<StreamHandle>,
    diagnostics_running: Arc<AtomicBool>,
    diagnostics_drain: Option<std::thread::JoinHandle<()>>,
}

/// The running engine. One instance corresponds to one OS process in the
/// real deployment (§9: the engine is always a separate process from the
/// controller), but nothing here assumes that — the type is plain data
/// plus two audio streams.
pub struct Engine {
    backend: CpalBackend,
    plugin_host: Arc<dyn NativePluginHost>,
    tone: Arc<ToneState>,
    plugin_slot: Arc<PluginSlot>,
    peak: Arc<AtomicU32>,
    render_faults: Arc<AtomicU64>,
    tag: Mutex<EngineStateTag>,
    config: Mutex<AudioConfig>,
    streams: Mutex<Option<Streams>>,
}

impl Engine {
    /// A fresh, Stopped engine with `config` as its starting configuration
    /// (not yet validated — `start` performs the strict checks of §4.3
    /// step 3).
    #[must_use]
    pub fn new(plugin_host: Arc<dyn NativePluginHost>, config: AudioConfig) -> Self {
        Self {
            backend: CpalBackend::new(),
            plugin_host,
            tone: Arc::new(ToneState::new(config.enable_test_tone, config.tone_frequency)),
            plugin_slot: Arc::new(PluginSlot::new()),
            peak: Arc::new(AtomicU32::new(0)),
            render_faults: Arc::new(AtomicU64::new(0)),
            tag: Mutex::new(EngineStateTag::Stopped),
            config: Mutex::new(config),
            streams: Mutex::new(None),
        }
    }

    /// The engine's own last-known configuration, exactly as passed to the
    /// most recent successful `start` (or the one it was constructed
    /// with, if never started). Unlike [`Engine::status`], this round-trips
    /// every field — including the input device and channel, which
    /// [`EngineStatus`] does not carry — so a caller rebuilding a config to
    /// restart with doesn't need to reconstruct a lossy one.
    #[must_use]
    pub fn config(&self) -> AudioConfig {
        self.config.lock().clone()
    }

    /// The structured `status` record (§4.3 "Status").
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        let config = self.config.lock();
        EngineStatus {
            running: *self.tag.lock() == EngineStateTag::Running,
            sample_rate: config.sample_rate,
            buffer_size: config.buffer_size,
            test_tone_enabled: self.tone.is_enabled(),
            tone_frequency: self.tone.frequency(),
            loaded_plugin: self.plugin_slot.handle(),
        }
    }

    /// The total count of render-path faults (plugin render errors that
    /// fell back to pass-through) since process start.
    #[must_use]
    pub fn render_fault_count(&self) -> u64 {
        self.render_faults.load(Ordering::Relaxed)
    }

    /// The last published input-level peak, linear amplitude.
    #[must_use]
    pub fn peak_input_level(&self) -> f32 {
        read_peak(&self.peak)
    }

    /// Starts the engine per §4.3's 7-step startup sequence: rejects if
    /// already Running, resolves devices, strictly checks the nominal
    /// sample rate on every device in play, then builds the input/output
    /// streams and installs the render callback.
    pub fn start(&self, config: AudioConfig) -> HostResult<()> {
        {
            let mut tag = self.tag.lock();
            if *tag == EngineStateTag::Running {
                return Err(HostError::AlreadyRunning);
            }
            *tag = EngineStateTag::Starting;
        }

        match self.start_inner(&config) {
            Ok(streams) => {
                tracing::info!(
                    sample_rate = config.sample_rate,
                    buffer_size = config.buffer_size,
                    input_device_id = ?config.input_device_id,
                    "engine started"
                );
                *self.streams.lock() = Some(streams);
                *self.config.lock() = config;
                *self.tag.lock() = EngineStateTag::Running;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "engine start failed");
                *self.tag.lock() = EngineStateTag::Failed;
                Err(err)
            }
        }
    }

    fn start_inner(&self, config: &AudioConfig) -> HostResult<Streams> {
        let output_device = self.backend.resolve_device(None, Scope::Output)?;
        let output_rate = self.backend.nominal_sample_rate(&output_device, Scope::Output)?;
        if output_rate != config.sample_rate {
            return Err(HostError::SampleRateMismatch {
                device: "output".into(),
                requested: config.sample_rate,
                actual: output_rate,
            });
        }

        let input_device = match config.input_device_id {
            Some(id) => {
                let device = self.backend.resolve_device(Some(id), Scope::Input)?;
                let input_rate = self.backend.nominal_sample_rate(&device, Scope::Input)?;
                if input_rate != config.sample_rate {
                    return Err(HostError::SampleRateMismatch {
                        device: "input".into(),
                        requested: config.sample_rate,
                        actual: input_rate,
                    });
                }
                Some(device)
            }
            None => None,
        };

        self.tone.set_enabled(config.enable_test_tone);
        self.tone.set_frequency(config.tone_frequency);

        let (diagnostics_sink, mut diagnostics_drain) = diagnostics::channel();

        let input_error_sink = diagnostics_sink.clone();
        let (input_stream, consumer, input_channels) = match &input_device {
            None => (None, None, 0u16),
            Some(device) => {
                let channels = self.backend.input_channel_count(device)?;
                let ring = HeapRb::<f32>::new(RING_BUFFER_FRAMES * channels as usize);
                let (mut producer, consumer) = ring.split();
                let stream = self.backend.build_input_stream(
                    device,
                    config.sample_rate,
                    config.buffer_size,
                    channels,
                    move |data: &[f32]| {
                        producer.push_slice(data);
                    },
                    move |err| {
                        input_error_sink.publish(DiagnosticKind::InputStreamError, err.to_string());
                    },
                )?;
                (Some(stream), Some(consumer), channels)
            }
        };

        let tone = Arc::clone(&self.tone);
        let plugin_slot = Arc::clone(&self.plugin_slot);
        let peak = Arc::clone(&self.peak);
        let render_faults = Arc::clone(&self.render_faults);
        let sample_rate = config.sample_rate;
        let input_channel = config.input_channel;
        let mut phase = 0.0f32;
        let mut consumer = consumer;
        let mut scratch = vec![0.0f32; RING_BUFFER_FRAMES * (input_channels.max(1) as usize)];
        let render_sink = diagnostics_sink.clone();

        let output_stream = self.backend.build_output_stream(
            &output_device,
            sample_rate,
            config.buffer_size,
            move |data: &mut [f32]| {
                let frames = data.len() / 2;
                let input = match consumer.as_mut() {
                    None => InputSource::None,
                    Some(cons) => {
                        // `scratch` is pre-sized above any realistic per-callback
                        // need; clamp rather than grow so this path never
                        // allocates.
                        let needed = (frames * input_channels as usize).min(scratch.len());
                        let read = cons.pop_slice(&mut scratch[..needed]);
                        scratch[read..needed].fill(0.0);
                        InputSource::Device {
                            interleaved: &scratch[..needed],
                            channels: u32::from(input_channels),
                            channel: input_channel,
                        }
                    }
                };
                render_block(
                    data,
                    frames,
                    sample_rate,
                    &tone,
                    &mut phase,
                    input,
                    &plugin_slot,
                    &peak,
                    &render_faults,
                    &render_sink,
                );
            },
            move |err| {
                diagnostics_sink.publish(DiagnosticKind::OutputStreamError, err.to_string());
            },
        )?;

        let diagnostics_running = Arc::new(AtomicBool::new(true));
        let drain_running = Arc::clone(&diagnostics_running);
        let diagnostics_drain_handle = std::thread::spawn(move || {
            while drain_running.load(Ordering::Acquire) {
                diagnostics_drain.drain();
                std::thread::sleep(DIAGNOSTIC_DRAIN_INTERVAL);
            }
            // Final drain so nothing published right before shutdown is lost.
            diagnostics_drain.drain();
        });

        Ok(Streams {
            output: output_stream,
            input: input_stream,
            diagnostics_running,
            diagnostics_drain: Some(diagnostics_drain_handle),
        })
    }

    /// Stops the engine per §4.3's 3-step shutdown: drop the streams
    /// (stopping both callbacks), then mark Stopped. The plug-in slot is
    /// left published — a subsequent `start` reuses it.
    pub fn stop(&self) -> HostResult<()> {
        if let Some(mut streams) = self.streams.lock().take() {
            streams.diagnostics_running.store(false, Ordering::Release);
            if let Some(handle) = streams.diagnostics_drain.take() {
                let _ = handle.join();
            }
        }
        *self.tag.lock() = EngineStateTag::Stopped;
        tracing::info!("engine stopped");
        Ok(())
    }

    /// Enables or disables the test tone. Takes effect on the next render
    /// invocation.
    pub fn set_tone_enabled(&self, enabled: bool) {
        self.tone.set_enabled(enabled);
    }

    /// Sets the tone frequency. Must satisfy `0 < hz <= MAX_TONE_FREQ`
    /// (§4.4 grammar: `20000` accepted, `20001` rejected).
    pub fn set_tone_frequency(&self, frequency: f32) -> HostResult<()> {
        if frequency <= 0.0 || frequency > MAX_TONE_FREQ {
            return Err(HostError::ConfigValidation {
                field: "toneFrequency".into(),
                reason: format!("must satisfy 0 < hz <= {MAX_TONE_FREQ}"),
            });
        }
        self.tone.set_frequency(frequency);
        Ok(())
    }

    /// Loads a plug-in by handle, per §4.3's 6-step `load_plugin`:
    /// instantiate, set the canonical stream format, set the max render
    /// frame count, initialize, then publish atomically.
    pub fn load_plugin(&self, handle: PluginHandle) -> HostResult<()> {
        let sample_rate = self.config.lock().sample_rate;
        let buffer_size = self.config.lock().buffer_size;

        let mut instance = self.plugin_host.instantiate(handle)?;
        instance.set_stream_format(sample_rate)?;
        let input_frames = plugin_input_frames(buffer_size);
        instance.set_max_frames_to_render(input_frames)?;
        instance.initialize()?;

        self.plugin_slot.publish(handle, instance, input_frames);
        self.config.lock().plugin_handle = Some(handle);
        tracing::info!(%handle, "plugin loaded");
        Ok(())
    }

    /// Unloads the currently loaded plug-in, if any. Idempotent.
    pub fn unload_plugin(&self) {
        let previous = self.plugin_slot.loaded();
        self.plugin_slot.clear();
        if let Some(previous) = previous {
            previous.lock().instance.uninitialize();
            tracing::info!("plugin unloaded");
        }
        self.config.lock().plugin_handle = None;
    }

    /// Lists every plug-in the registry reports.
    pub fn list_plugins(&self) -> HostResult<Vec<(PluginHandle, String)>> {
        self.plugin_host.registered_plugins()
    }

    /// The plug-in registry backing this engine, for callers that need to
    /// run the full catalog (`inspect`) rather than just list handles.
    #[must_use]
    pub fn registry(&self) -> Arc<dyn NativePluginHost> {
        Arc::clone(&self.plugin_host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonido_core::native_host::{NativePluginInstance, RawParamInfo};

    struct EmptyRegistry;
    impl NativePluginHost for EmptyRegistry {
        fn registered_plugins(&self) -> HostResult<Vec<(PluginHandle, String)>> {
            Ok(Vec::new())
        }
        fn instantiate(&self, handle: PluginHandle) -> HostResult<Box<dyn NativePluginInstance>> {
            Err(HostError::PluginNotFound { handle: handle.to_string() })
        }
    }

    #[test]
    fn fresh_engine_reports_stopped_status() {
        let engine = Engine::new(Arc::new(EmptyRegistry), AudioConfig::tone_only(44100, 256));
        let status = engine.status();
        assert!(!status.running);
        assert!(status.test_tone_enabled);
        assert_eq!(status.sample_rate, 44100);
    }

    #[test]
    fn tone_frequency_rejects_out_of_range_values() {
        let engine = Engine::new(Arc::new(EmptyRegistry), AudioConfig::tone_only(44100, 256));
        assert!(engine.set_tone_frequency(20001.0).is_err());
        assert!(engine.set_tone_frequency(-1.0).is_err());
        assert!(engine.set_tone_frequency(440.0).is_ok());
    }

    #[test]
    fn loading_unregistered_plugin_fails_without_touching_slot() {
        let engine = Engine::new(Arc::new(EmptyRegistry), AudioConfig::tone_only(44100, 256));
        let handle: PluginHandle = "aufx:dist:acme".parse().unwrap();
        assert!(engine.load_plugin(handle).is_err());
        assert!(engine.status().loaded_plugin.is_none());
    }

    #[test]
    fn unload_without_a_loaded_plugin_is_a_no_op() {
        let engine = Engine::new(Arc::new(EmptyRegistry), AudioConfig::tone_only(44100, 256));
        engine.unload_plugin();
        assert!(engine.status().loaded_plugin.is_none());
    }

    #[test]
    fn stop_on_a_stopped_engine_is_idempotent() {
        let engine = Engine::new(Arc::new(EmptyRegistry), AudioConfig::tone_only(44100, 256));
        assert!(engine.stop().is_ok());
        assert!(engine.stop().is_ok());
        assert!(!engine.status().running);
    }
}
