//! Reconfiguration Controller — compares configurations, classifies the
//! cheapest way to move between them, and owns the spawned engine
//! process's lifecycle (§4.5, §6).

pub mod classify;
pub mod controller;
pub mod process;
pub mod types;

pub use classify::classify;
pub use controller::{self_hosted, Controller};
pub use process::EngineProcess;
pub use types::{CurrentConfig, DeviceSnapshot};
