//! A line-oriented shell over the Reconfiguration Controller, for manually
//! exercising the control-plane API without writing a client.
//!
//! Modeled on the Ctrl+C-driven loop the teacher's own `realtime` command
//! uses: a handler sends the running engine a graceful `quit` and lets it
//! exit on its own rather than leaving an orphaned subprocess behind.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Args;

use sonido_controller::{self_hosted, Controller};
use sonido_core::config::AudioConfig;

const HELP_TEXT: &str = "\
commands:
  apply <sample_rate> <buffer_size> <input_device_id|-> <channel> <tone on|off>
                                       apply a config change via the controller
  devices                             print the current device snapshot
  plugins [timeout_seconds]           run the plug-in catalog
  config                              print the current config and pid
  cmd <line>                          forward a raw command to the engine
  help                                show this text
  quit                                exit the shell";

#[derive(Args)]
pub struct ControlArgs {}

pub fn run(_args: ControlArgs) -> anyhow::Result<()> {
    let exe = std::env::current_exe()?;
    let controller = Arc::new(self_hosted(&exe));

    let running = Arc::new(AtomicBool::new(true));
    let ctrlc_controller = Arc::clone(&controller);
    let ctrlc_running = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nstopping...");
        let _ = ctrlc_controller.send_command("quit");
        ctrlc_running.store(false, Ordering::SeqCst);
    })?;

    println!("sonido control shell — type 'help' for commands, Ctrl+C to stop the engine and exit");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" || trimmed == "exit" {
            let _ = controller.send_command("quit");
            break;
        }
        handle_line(&controller, trimmed);
        stdout.flush()?;
    }
    Ok(())
}

fn handle_line(controller: &Controller, line: &str) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["help"] => println!("{HELP_TEXT}"),
        ["devices"] => match controller.get_devices() {
            Ok(snapshot) => print_json(&snapshot),
            Err(err) => println!("error: {err}"),
        },
        ["config"] => print_json(&controller.get_current_config()),
        ["plugins"] => run_plugins(controller, 5),
        ["plugins", secs] => match secs.parse() {
            Ok(secs) => run_plugins(controller, secs),
            Err(err) => println!("error: {err}"),
        },
        ["cmd", rest @ ..] => match controller.send_command(&rest.join(" ")) {
            Ok(response) => println!("{response}"),
            Err(err) => println!("error: {err}"),
        },
        ["apply", sample_rate, buffer_size, input_device_id, channel, tone] => {
            apply(controller, sample_rate, buffer_size, input_device_id, channel, tone)
        }
        _ => println!("unrecognized command, try 'help'"),
    }
}

fn apply(
    controller: &Controller,
    sample_rate: &str,
    buffer_size: &str,
    input_device_id: &str,
    channel: &str,
    tone: &str,
) {
    let Ok(sample_rate) = sample_rate.parse() else {
        println!("error: sample_rate must be an integer");
        return;
    };
    let Ok(buffer_size) = buffer_size.parse() else {
        println!("error: buffer_size must be an integer");
        return;
    };
    let input_device_id = if input_device_id == "-" {
        None
    } else {
        match input_device_id.parse() {
            Ok(id) => Some(id),
            Err(err) => {
                println!("error: input_device_id must be an integer or '-': {err}");
                return;
            }
        }
    };
    let Ok(input_channel) = channel.parse() else {
        println!("error: channel must be an integer");
        return;
    };
    let enable_test_tone = match tone {
        "on" => true,
        "off" => false,
        other => {
            println!("error: tone must be 'on' or 'off', got '{other}'");
            return;
        }
    };

    let config = AudioConfig {
        sample_rate,
        buffer_size,
        input_device_id,
        input_channel,
        enable_test_tone,
        tone_frequency: sonido_core::config::DEFAULT_TONE_FREQ,
        plugin_handle: None,
    };
    print_json(&controller.apply_config_change(config));
}

fn run_plugins(controller: &Controller, timeout_seconds: u64) {
    let descriptors = controller.get_plugins(std::time::Duration::from_secs(timeout_seconds));
    print_json(&descriptors);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("error: {err}"),
    }
}
