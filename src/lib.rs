// Core layer - configuration and domain errors
pub mod core;

// Engine layer - the reminder state machine and its event stream
pub mod engine;

// Features layer - all feature modules
pub mod features;

// IPC layer - communication between the engine and its clients
pub mod ipc;

// Re-export core config for convenience
pub use crate::core::Config;

pub use engine::{Event, ReminderEngine, UiAction};

// Re-export IPC items
pub use ipc::{ClientCommand, EngineEvent, IpcClient, IpcServer};
