//! Greeting service with cross-origin policies and an optional replay filter.

pub mod config;
pub mod cors;
pub mod greeting;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod replay;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
