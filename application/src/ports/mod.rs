//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod completion_client;
pub mod event_sink;
pub mod persona_lookup;
pub mod progress;
