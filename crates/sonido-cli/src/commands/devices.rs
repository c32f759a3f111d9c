//! Audio and MIDI device listing.

use clap::Args;

#[derive(Args)]
pub struct DevicesArgs {
    /// Emit the raw device snapshot as JSON instead of a human-readable table.
    #[arg(long)]
    json: bool,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    let inputs = sonido_io::list_input_devices()?;
    let outputs = sonido_io::list_output_devices()?;
    let midi_inputs = sonido_io::list_midi_inputs()?;
    let midi_outputs = sonido_io::list_midi_outputs()?;
    let defaults = sonido_io::device_defaults()?;

    if args.json {
        let snapshot = serde_json::json!({
            "audioInputs": inputs,
            "audioOutputs": outputs,
            "midiInputs": midi_inputs,
            "midiOutputs": midi_outputs,
        });
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Audio Input Devices");
    println!("====================");
    print_audio_devices(&inputs, defaults.default_input_id);

    println!();
    println!("Audio Output Devices");
    println!("=====================");
    print_audio_devices(&outputs, defaults.default_output_id);

    println!();
    println!("MIDI Input Endpoints");
    println!("=====================");
    print_midi_endpoints(&midi_inputs);

    println!();
    println!("MIDI Output Endpoints");
    println!("======================");
    print_midi_endpoints(&midi_outputs);

    Ok(())
}

fn print_audio_devices(devices: &[sonido_core::device::AudioDevice], default_id: Option<u32>) {
    if devices.is_empty() {
        println!("  (none)");
        return;
    }
    for device in devices {
        let default_marker = if Some(device.device_id) == default_id { ", default" } else { "" };
        let rates: Vec<String> = device.supported_sample_rates.iter().map(ToString::to_string).collect();
        println!(
            "  [{}] {} ({} ch, {} Hz{})",
            device.device_id,
            device.name,
            device.channel_count,
            rates.join("/"),
            default_marker
        );
    }
}

fn print_midi_endpoints(endpoints: &[sonido_core::device::MidiEndpoint]) {
    if endpoints.is_empty() {
        println!("  (none)");
        return;
    }
    for endpoint in endpoints {
        let online = if endpoint.is_online { "" } else { " (offline)" };
        println!("  [{}] {}{}", endpoint.endpoint_id, endpoint.name, online);
    }
}
