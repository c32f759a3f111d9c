//! Sonido CLI - entry points for the Audio Host Engine and the
//! Reconfiguration Controller that supervises it.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sonido")]
#[command(author, version, about = "Sonido Audio Host Engine and Reconfiguration Controller", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Audio Host Engine process
    Engine(commands::engine::EngineArgs),

    /// List audio and MIDI devices
    Devices(commands::devices::DevicesArgs),

    /// Run the plug-in catalog
    Plugins(commands::plugins::PluginsArgs),

    /// Drive the Reconfiguration Controller
    Control(commands::control::ControlArgs),

    /// Introspect one plug-in; invoked as a worker subprocess, not by hand
    #[command(hide = true, name = "introspect-one")]
    IntrospectOne(commands::introspect_one::IntrospectOneArgs),
}

fn main() {
    use tracing_subscriber::EnvFilter;

    // stdout carries protocol responses in engine command-mode; all
    // logging goes to stderr so the two streams never mix.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Engine(args) => commands::engine::run(args),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Plugins(args) => commands::plugins::run(args),
        Commands::Control(args) => commands::control::run(args),
        Commands::IntrospectOne(args) => commands::introspect_one::run(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
