//! Output formatting for sessions and coordination events

pub mod console;
pub mod events;
