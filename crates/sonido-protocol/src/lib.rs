//! Command Protocol — the line-oriented command channel a controller (or
//! a human) drives the Audio Host Engine over (§4.4).
//!
//! One command per line, whitespace-separated ASCII tokens, case-sensitive.
//! Responses are `OK:` / `ERROR:` / `STATUS:` lines, or a raw JSON line for
//! device and catalog queries. The engine process emits a literal `READY`
//! on stderr once the loop is ready to accept commands.

pub mod command;
pub mod command_loop;
pub mod dispatch;

pub use command::{parse_command, Command, DeviceQuery};
pub use command_loop::run_command_mode;
pub use dispatch::dispatch;
