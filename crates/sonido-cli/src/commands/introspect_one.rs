//! The hidden `introspect-one` worker subcommand.
//!
//! Spawned by [`sonido_catalog::runner`] once per registered plug-in, under
//! its own strict timeout; a crash or hang here only takes down this child,
//! never the parent catalog run. Prints exactly one JSON line to stdout —
//! nothing else may ever reach stdout from this path.

use clap::Args;

use sonido_core::plugin::PluginHandle;

#[derive(Args)]
pub struct IntrospectOneArgs {
    /// The plug-in handle to introspect, as `type:subtype:manufacturer`.
    handle: String,
}

pub fn run(args: IntrospectOneArgs) -> anyhow::Result<()> {
    let handle: PluginHandle = args.handle.parse()?;
    let registry = sonido_catalog::platform_registry();
    if let Some(descriptor) = sonido_catalog::introspect_one(registry.as_ref(), handle, &args.handle) {
        println!("{}", serde_json::to_string(&descriptor)?);
    }
    Ok(())
}
