//! # Engine
//!
//! The single-owner reminder state machine and the event stream that
//! drives it.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod clock;
pub mod event;
pub mod messages;
pub mod reactor;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, SystemClock};
pub use event::{Event, UiAction};
pub use reactor::ReminderEngine;
