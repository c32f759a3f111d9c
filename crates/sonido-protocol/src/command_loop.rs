//! The command-mode loop itself: emits the `READY` startup sentinel, then
//! reads one command per line from `stdin` until `quit`/`exit` or EOF
//! (§4.4 "Startup contract", §5).

use std::io::{BufRead, Write};
use std::path::Path;

use sonido_engine::Engine;

use crate::command::{parse_command, Command};
use crate::dispatch::dispatch;

/// Runs the command-mode loop: writes the literal `READY` sentinel to
/// `stderr`, then drives `reader`/`writer` one line at a time. Returns once
/// `quit`/`exit` is received or the input stream reaches EOF.
pub fn run_command_mode<R: BufRead, W: Write, E: Write>(
    mut reader: R,
    mut writer: W,
    mut stderr: E,
    engine: &Engine,
    worker_exe: &Path,
) -> std::io::Result<()> {
    writeln!(stderr, "READY")?;
    stderr.flush()?;

    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            return Ok(());
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            continue;
        }

        let response = match parse_command(trimmed) {
            Ok(command) => {
                let line = dispatch(&command, engine, worker_exe);
                if command == Command::Quit {
                    writeln!(writer, "{line}")?;
                    writer.flush()?;
                    return Ok(());
                }
                line
            }
            Err(err) => {
                tracing::warn!(line = trimmed, %err, "rejected command");
                format!("ERROR: {err}")
            }
        };
        writeln!(writer, "{response}")?;
        writer.flush()?;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use sonido_core::error::HostResult;
    use sonido_core::native_host::{NativePluginHost, NativePluginInstance};
    use sonido_core::plugin::PluginHandle;

    use super::*;

    struct EmptyRegistry;
    impl NativePluginHost for EmptyRegistry {
        fn registered_plugins(&self) -> HostResult<Vec<(PluginHandle, String)>> {
            Ok(Vec::new())
        }
        fn instantiate(&self, handle: PluginHandle) -> HostResult<Box<dyn NativePluginInstance>> {
            Err(sonido_core::error::HostError::PluginNotFound { handle: handle.to_string() })
        }
    }

    fn test_engine() -> Engine {
        Engine::new(Arc::new(EmptyRegistry), sonido_core::config::AudioConfig::tone_only(44100, 256))
    }

    #[test]
    fn ready_sentinel_is_emitted_before_any_command_runs() {
        let engine = test_engine();
        let input = Cursor::new(b"quit\n".to_vec());
        let mut output = Vec::new();
        let mut stderr = Vec::new();
        run_command_mode(input, &mut output, &mut stderr, &engine, Path::new("/nonexistent")).unwrap();
        assert_eq!(String::from_utf8(stderr).unwrap(), "READY\n");
    }

    #[test]
    fn quit_ends_the_loop_after_responding() {
        let engine = test_engine();
        let input = Cursor::new(b"status\nquit\nstatus\n".to_vec());
        let mut output = Vec::new();
        let mut stderr = Vec::new();
        run_command_mode(input, &mut output, &mut stderr, &engine, Path::new("/nonexistent")).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("STATUS:"));
        assert_eq!(lines[1], "OK: quitting");
    }

    #[test]
    fn eof_without_quit_ends_the_loop_cleanly() {
        let engine = test_engine();
        let input = Cursor::new(b"status\n".to_vec());
        let mut output = Vec::new();
        let mut stderr = Vec::new();
        run_command_mode(input, &mut output, &mut stderr, &engine, Path::new("/nonexistent")).unwrap();
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let engine = test_engine();
        let input = Cursor::new(b"\n\nstatus\nquit\n".to_vec());
        let mut output = Vec::new();
        let mut stderr = Vec::new();
        run_command_mode(input, &mut output, &mut stderr, &engine, Path::new("/nonexistent")).unwrap();
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 2);
    }

    #[test]
    fn unrecognized_command_gets_an_error_line_and_loop_continues() {
        let engine = test_engine();
        let input = Cursor::new(b"nonsense\nquit\n".to_vec());
        let mut output = Vec::new();
        let mut stderr = Vec::new();
        run_command_mode(input, &mut output, &mut stderr, &engine, Path::new("/nonexistent")).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("ERROR:"));
        assert_eq!(lines[1], "OK: quitting");
    }
}
