//! Session domain.
//!
//! - [`entities::Session`]: one coordination run and its lifecycle
//! - [`results::ResultSet`]: worker results in completion order
//! - [`event_log::EventLog`]: the ordered trace of what the engine did

pub mod entities;
pub mod event;
pub mod event_log;
pub mod results;
