//! Spawns and drives one engine subprocess over the command channel (§6
//! "Engine process command line", §6 "Command channel format").
//!
//! Mirrors the introspection worker's subprocess-with-timeout shape in
//! `sonido-catalog`'s runner: a background thread drains a pipe and
//! forwards lines over an `mpsc` channel so the control thread can
//! `recv_timeout` instead of blocking indefinitely on a hung child.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use sonido_core::config::AudioConfig;
use sonido_core::error::{HostError, HostResult};

/// Time the controller waits for the spawned engine's `READY` sentinel
/// (§5 "Suspension / blocking points").
const READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Time the controller waits for a command response before poisoning the
/// handle (§5 "Suspension / blocking points").
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Time the controller waits for a graceful exit during shutdown before
/// escalating to a hard kill (§5 "Suspension / blocking points").
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// One running engine subprocess, reachable over its command channel.
pub struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    responses: Receiver<String>,
}

impl EngineProcess {
    /// Spawns `exe` with the command line §6 describes for `config`,
    /// waits up to [`READY_TIMEOUT`] for the `READY` sentinel on stderr,
    /// and returns a handle ready to accept commands.
    pub fn spawn(exe: &Path, config: &AudioConfig) -> HostResult<Self> {
        let mut command = Command::new(exe);
        command
            .arg("--sample-rate")
            .arg(config.sample_rate.to_string())
            .arg("--buffer-size")
            .arg(config.buffer_size.to_string())
            .arg("--audio-input-channel")
            .arg(config.input_channel.to_string())
            .arg("--command-mode");
        if let Some(id) = config.input_device_id {
            command.arg("--audio-input-device").arg(id.to_string());
        }
        if !config.enable_test_tone {
            command.arg("--no-tone");
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| HostError::EngineStartFailed { reason: e.to_string() })?;

        let stdin = child.stdin.take().ok_or_else(|| HostError::EngineStartFailed {
            reason: "no stdin on spawned engine".into(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| HostError::EngineStartFailed {
            reason: "no stdout on spawned engine".into(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| HostError::EngineStartFailed {
            reason: "no stderr on spawned engine".into(),
        })?;

        let (ready_tx, ready_rx) = mpsc::channel();
        thread::spawn(move || {
            let mut lines = BufReader::new(stderr).lines();
            for line in lines.by_ref() {
                let Ok(line) = line else { break };
                if line == "READY" {
                    let _ = ready_tx.send(());
                    break;
                }
                tracing::debug!(line, "engine stderr");
            }
            // Keep draining after READY so the child never blocks on a
            // full stderr pipe.
            for line in lines {
                if let Ok(line) = line {
                    tracing::debug!(line, "engine stderr");
                }
            }
        });

        match ready_rx.recv_timeout(READY_TIMEOUT) {
            Ok(()) => {}
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(HostError::ProtocolTimeout { phase: "ready".into() });
            }
        }

        let (response_tx, response_rx) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if response_tx.send(line).is_err() {
                    break;
                }
            }
        });

        tracing::info!(pid = child.id(), "engine process started");
        Ok(Self { child, stdin, responses: response_rx })
    }

    /// This process's OS pid.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Sends one command line and waits up to [`COMMAND_TIMEOUT`] for its
    /// response line.
    pub fn send_command(&mut self, command: &str) -> HostResult<String> {
        writeln!(self.stdin, "{command}").map_err(HostError::from)?;
        self.stdin.flush().map_err(HostError::from)?;
        self.responses
            .recv_timeout(COMMAND_TIMEOUT)
            .map_err(|_| HostError::ProtocolTimeout { phase: "command response".into() })
    }

    /// Sends `quit`, waits up to [`SHUTDOWN_TIMEOUT`] for the process to
    /// exit on its own, then escalates to a hard kill.
    pub fn shutdown(mut self) -> HostResult<()> {
        let _ = writeln!(self.stdin, "quit");
        let _ = self.stdin.flush();

        let pid = self.child.id();
        let deadline = std::time::Instant::now() + SHUTDOWN_TIMEOUT;
        let waited = loop {
            match self.child.try_wait() {
                Ok(Some(_)) => break true,
                Ok(None) if std::time::Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(25));
                }
                _ => break false,
            }
        };

        if !waited {
            tracing::warn!(pid, "engine did not exit in time, killing");
            self.child.kill().map_err(|e| HostError::EngineStopFailed { reason: e.to_string() })?;
            self.child.wait().map_err(|e| HostError::EngineStopFailed { reason: e.to_string() })?;
        }
        tracing::info!(pid, "engine process stopped");
        Ok(())
    }
}
