//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging through `tracing`
//! - Preview layers log at trace level only; they never warn or fail

pub mod logging;
