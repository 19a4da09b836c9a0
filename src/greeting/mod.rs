//! Greeting subsystem.
//!
//! # Data Flow
//! ```text
//! GET /greeting?name=Ada
//!     → handlers.rs (extract name, default "World")
//!     → registry.rs (name → stable id)
//!     → types.rs (render "Hello, Ada!")
//!     → { "id": 1, "content": "Hello, Ada!" }
//! ```
//!
//! Both routes serve the same greeting. They differ only in how their CORS
//! policy is declared (see `crate::cors`).

pub mod handlers;
pub mod registry;
pub mod types;

pub use handlers::{greeting_route, GreetingService};
pub use registry::{IdSource, IdentityRegistry, RequestCounter};
pub use types::{Greeting, GreetingParams, GreetingTemplate};

/// Route whose CORS policy is attached to the route itself.
pub const GREETING_PATH: &str = "/greeting";

/// Route whose CORS policy comes from the central mapping registry.
pub const GREETING_JAVACONFIG_PATH: &str = "/greeting-javaconfig";

/// Every greeting route, in registration order.
pub const GREETING_ROUTES: [&str; 2] = [GREETING_PATH, GREETING_JAVACONFIG_PATH];
