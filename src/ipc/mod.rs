//! # IPC Module
//!
//! Inter-process communication between the reminder engine and its
//! operator consoles and speech clients.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Speech client results share the command stream
//! - 1.0.0: Initial IPC implementation with Unix socket protocol

pub mod client;
pub mod protocol;
pub mod server;

pub use client::{connect_with_retry, IpcClient};
pub use protocol::{ClientCommand, EngineEvent};
pub use server::IpcServer;
