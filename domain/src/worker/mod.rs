//! Worker domain.
//!
//! - [`spec::WorkerSpec`]: who a worker is and which role it plays
//! - [`persona::PersonaAttributes`]: the background a persona speaks from
//! - [`result::WorkerResult`]: what one worker produced (or why it failed)

pub mod persona;
pub mod result;
pub mod spec;
