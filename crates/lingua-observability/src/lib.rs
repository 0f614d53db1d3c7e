//! Observability plumbing shared by the Lingua crates: JSONL span tracing
//! with rotation, an append-only metrics stream, opt-in payload dumps, and a
//! panic-safe stderr macro.

pub mod debug_log;
pub mod metrics;
mod safe_print;
pub mod trace;

pub use trace::{Span, TraceError, TraceEvent};
