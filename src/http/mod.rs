//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, TraceLayer, TimeoutLayer)
//!     → PreviewLayer (X-PREVIEW → request extensions)
//!     → handlers (/echo, /marker, /forward)
//!     → PreviewClient (request extensions → X-PREVIEW) → upstream
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
