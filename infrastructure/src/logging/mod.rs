//! Logging infrastructure: the coordination trace file.
//!
//! Provides [`JsonlEventSink`], a JSONL file writer that implements the
//! [`EventSink`](council_application::EventSink) port.

mod jsonl_sink;

pub use jsonl_sink::JsonlEventSink;
