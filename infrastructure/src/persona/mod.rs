//! Persona source adapters.

mod http_lookup;

pub use http_lookup::HttpPersonaLookup;
