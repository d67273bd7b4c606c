//! Core domain concepts shared across all subdomains.
//!
//! - [`query::Query`]: the validated question a session answers
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod query;
pub mod string;
