//! Sonido Engine - the Audio Host Engine
//!
//! Hosts the realtime render path, the plug-in slot, and the backend audio
//! streams behind a single `Engine` lifecycle type. The engine has no
//! opinion on how it is driven — the command protocol (`sonido-protocol`)
//! and the CLI's engine entry point wrap it with process/IPC concerns.

pub mod backend;
pub mod diagnostics;
pub mod engine;
pub mod render;
pub mod slot;

pub use backend::{CpalBackend, Scope, StreamHandle};
pub use diagnostics::{DiagnosticKind, RenderDiagnostic};
pub use engine::Engine;
pub use render::{read_peak, InputSource, ToneState};
pub use slot::{plugin_input_frames, LoadedPlugin, PluginSlot};
