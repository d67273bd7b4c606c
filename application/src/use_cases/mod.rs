//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod assemble_council;
pub mod execute_worker;
pub mod run_session;
