//! The Audio Host Engine process entry point.
//!
//! This is the binary the Reconfiguration Controller spawns (via
//! [`sonido_controller::EngineProcess::spawn`]) whenever it needs a running
//! engine; it can also be run directly for manual testing.

use std::io;
use std::sync::Arc;

use clap::Args;

use sonido_core::config::AudioConfig;

/// Flags the controller passes on the command line when it spawns an
/// engine process.
#[derive(Args)]
pub struct EngineArgs {
    /// Sample rate in Hz. Must match every selected device's nominal rate.
    #[arg(long = "sample-rate")]
    sample_rate: u32,

    /// Buffer size in frames, 32-1024.
    #[arg(long = "buffer-size", default_value_t = sonido_core::config::DEFAULT_BUFFER_SIZE)]
    buffer_size: u32,

    /// Audio input device id. Omitted means output-only / test-tone mode.
    #[arg(long = "audio-input-device")]
    audio_input_device: Option<u32>,

    /// 0-based input channel index.
    #[arg(long = "audio-input-channel", default_value_t = 0)]
    audio_input_channel: u32,

    /// Disables the test tone.
    #[arg(long = "no-tone")]
    no_tone: bool,

    /// Accepted for command-line compatibility with the documented flag
    /// set; this binary always speaks the line protocol. There is no
    /// separate interactive default to opt out into.
    #[arg(long = "command-mode")]
    command_mode: bool,
}

pub fn run(args: EngineArgs) -> anyhow::Result<()> {
    // Tone defaults off when an input device is selected, on otherwise;
    // --no-tone always forces it off.
    let enable_test_tone = !args.no_tone && args.audio_input_device.is_none();
    let config = AudioConfig {
        sample_rate: args.sample_rate,
        buffer_size: args.buffer_size,
        input_device_id: args.audio_input_device,
        input_channel: args.audio_input_channel,
        enable_test_tone,
        tone_frequency: sonido_core::config::DEFAULT_TONE_FREQ,
        plugin_handle: None,
    };

    let registry: Arc<dyn sonido_core::native_host::NativePluginHost> =
        Arc::from(sonido_catalog::platform_registry());
    let engine = sonido_engine::Engine::new(registry, config.clone());

    if let Err(err) = engine.start(config) {
        eprintln!("engine start failed: {err}");
        std::process::exit(1);
    }

    tracing::debug!(command_mode_flag = args.command_mode, "entering command loop");
    let worker_exe = std::env::current_exe()?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    sonido_protocol::run_command_mode(stdin.lock(), stdout.lock(), stderr.lock(), &engine, &worker_exe)?;
    engine.stop()?;
    Ok(())
}
