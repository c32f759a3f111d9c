//! Parent-side catalog orchestration: spawns one `introspect-one` child
//! per registered plug-in, in parallel, under a strict per-plug-in timeout
//! and an overall deadline for the whole run (§4.2, `inspect` command).

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use sonido_core::native_host::NativePluginHost;
use sonido_core::plugin::{PluginDescriptor, PluginHandle};

/// Strict per-plug-in timeout (§4.2 "strict per-plug-in timeout"). Chosen
/// generously above the ~500ms of deliberate settling the introspection
/// algorithm itself performs, to leave room for process spawn overhead.
pub const PER_PLUGIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the full catalog: enumerates the native registry, then
/// introspects each entry out-of-process in parallel. Plug-ins that don't
/// finish by `deadline` are omitted; the result is always whatever
/// completed in time, never an error (§4.2 "Global timeout policy").
pub fn run_catalog(
    worker_exe: &Path,
    deadline: Duration,
    registry: &dyn NativePluginHost,
) -> Vec<PluginDescriptor> {
    let started = Instant::now();
    let plugins = registry.registered_plugins().unwrap_or_else(|err| {
        tracing::warn!(%err, "plugin registry query failed, catalog run is empty");
        Vec::new()
    });

    let workers: Vec<_> = plugins
        .into_iter()
        .map(|(handle, _name)| spawn_worker(worker_exe.to_path_buf(), handle))
        .collect();

    let mut results = Vec::new();
    for (handle, rx) in workers {
        let elapsed = started.elapsed();
        let remaining = deadline.saturating_sub(elapsed);
        if remaining.is_zero() {
            tracing::warn!(%handle, "global catalog deadline exceeded, omitted");
            continue;
        }
        match rx.recv_timeout(remaining.min(PER_PLUGIN_TIMEOUT)) {
            Ok(Some(descriptor)) => results.push(descriptor),
            Ok(None) => {}
            Err(_) => tracing::warn!(%handle, "plugin introspection timed out, omitted"),
        }
    }
    results
}

fn spawn_worker(
    exe: PathBuf,
    handle: PluginHandle,
) -> (PluginHandle, mpsc::Receiver<Option<PluginDescriptor>>) {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = introspect_via_subprocess(&exe, handle);
        let _ = tx.send(result);
    });
    (handle, rx)
}

/// Spawns `exe introspect-one <handle>`, reads its one JSON line of
/// output, and enforces [`PER_PLUGIN_TIMEOUT`] by killing the child if it
/// hasn't produced output in time.
fn introspect_via_subprocess(exe: &Path, handle: PluginHandle) -> Option<PluginDescriptor> {
    let mut child = Command::new(exe)
        .arg("introspect-one")
        .arg(handle.to_string())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .inspect_err(|err| tracing::warn!(%handle, %err, "failed to spawn introspection worker"))
        .ok()?;

    let mut stdout = child.stdout.take()?;
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = stdout.read_to_string(&mut buf);
        let _ = tx.send(buf);
    });

    match rx.recv_timeout(PER_PLUGIN_TIMEOUT) {
        Ok(output) => {
            let _ = child.wait();
            serde_json::from_str::<PluginDescriptor>(output.trim()).ok()
        }
        Err(_) => {
            let _ = child.kill();
            let _ = child.wait();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonido_core::error::HostResult;
    use sonido_core::native_host::NativePluginInstance;

    struct EmptyRegistry;
    impl NativePluginHost for EmptyRegistry {
        fn registered_plugins(&self) -> HostResult<Vec<(PluginHandle, String)>> {
            Ok(Vec::new())
        }
        fn instantiate(&self, handle: PluginHandle) -> HostResult<Box<dyn NativePluginInstance>> {
            Err(sonido_core::error::HostError::PluginNotFound { handle: handle.to_string() })
        }
    }

    #[test]
    fn empty_registry_returns_empty_catalog_immediately() {
        let started = Instant::now();
        let results = run_catalog(Path::new("/nonexistent"), Duration::from_secs(5), &EmptyRegistry);
        assert!(results.is_empty());
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn zero_deadline_with_registered_plugins_returns_partial_or_empty() {
        struct OnePlugin;
        impl NativePluginHost for OnePlugin {
            fn registered_plugins(&self) -> HostResult<Vec<(PluginHandle, String)>> {
                Ok(vec![("aufx:dist:acme".parse().unwrap(), "Crunch".into())])
            }
            fn instantiate(&self, handle: PluginHandle) -> HostResult<Box<dyn NativePluginInstance>> {
                Err(sonido_core::error::HostError::PluginNotFound { handle: handle.to_string() })
            }
        }
        // Scenario 6: inspect with a 0-second deadline returns promptly,
        // never with a plugin reported with an empty parameter list (the
        // worker subprocess itself enforces that; the runner only ever
        // forwards what the worker already emitted or omits it).
        let results = run_catalog(Path::new("/nonexistent"), Duration::ZERO, &OnePlugin);
        assert!(results.is_empty());
    }
}
