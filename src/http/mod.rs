//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer stack)
//!     → request.rs (request ID, per-request span)
//!     → [replay middleware, when enabled]
//!     → [route CORS layer]
//!     → greeting handler
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{make_request_span, RequestIdExt, RequestIdGenerator, X_REQUEST_ID};
pub use server::HttpServer;
