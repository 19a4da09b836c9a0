//! Request replay subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → middleware.rs (buffer body, build InboundRequest + LiveResponse)
//!     → interceptor.rs
//!         pass 1: ObservedRequest + BufferedSink → rest of router
//!         pass 2: ObservedRequest + BufferedSink → rest of router
//!     → LiveResponse (status + headers from the passes, empty body)
//!     → client
//! ```
//!
//! # Design Decisions
//! - Views and sinks are traits with a live variant and a per-pass wrapper
//! - Per-pass buffers are owned by their pass and dropped when it returns
//! - Passes never overlap; the outer timeout layer bounds both together
//! - Fail-fast by default, isolated passes on request

pub mod interceptor;
pub mod middleware;
pub mod sink;
pub mod view;

pub use interceptor::{Chain, PassOutcome, ReplayInterceptor, ReplayReport, REPLAY_PASSES};
pub use middleware::{replay_middleware, NextChain, ReplayError, ReplayState};
pub use sink::{BufferedSink, LiveResponse, ResponseSink, TextWriter};
pub use view::{InboundRequest, ObservedRequest, RequestView};
