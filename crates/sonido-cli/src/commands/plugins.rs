//! Runs the full plug-in catalog standalone, independent of any running
//! engine.

use std::time::Duration;

use clap::Args;

#[derive(Args)]
pub struct PluginsArgs {
    /// Overall deadline for the catalog run, in seconds.
    #[arg(long, default_value_t = 5)]
    timeout_seconds: u64,
}

pub fn run(args: PluginsArgs) -> anyhow::Result<()> {
    let worker_exe = std::env::current_exe()?;
    let registry = sonido_catalog::platform_registry();
    let descriptors = sonido_catalog::run_catalog(&worker_exe, Duration::from_secs(args.timeout_seconds), registry.as_ref());
    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(())
}
