//! Cross-origin policy subsystem.
//!
//! # Data Flow
//! ```text
//! CorsConfig
//!     ├─ routes   → attached to the named route (one rule per route)
//!     └─ mappings → registry.rs (pattern table, resolved per route path)
//!             → policy.rs (CorsRule → tower_http CorsLayer)
//!             → layered onto the route's MethodRouter
//! ```
//!
//! # Design Decisions
//! - Header injection is tower-http's job; this module only decides which rule
//!   applies where
//! - At most one CorsLayer per route, so preflights are answered exactly once
//! - A route-attached rule wins over any matching mapping

pub mod policy;
pub mod registry;

pub use policy::build_layer;
pub use registry::{CorsRegistry, PathPattern};

use tower_http::cors::CorsLayer;

use crate::config::{CorsConfig, CorsRule};

/// Where a route's CORS rule was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicySource {
    Route,
    Mapping,
}

/// Both ways of declaring CORS, resolved per route.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicies {
    routes: Vec<CorsRule>,
    registry: CorsRegistry,
}

impl CorsPolicies {
    pub fn from_config(config: &CorsConfig) -> Self {
        Self {
            routes: config.routes.clone(),
            registry: CorsRegistry::from_rules(&config.mappings),
        }
    }

    /// Rule governing `path` and where it came from.
    pub fn rule_for(&self, path: &str) -> Option<(PolicySource, &CorsRule)> {
        if let Some(rule) = self.routes.iter().find(|r| r.path == path) {
            return Some((PolicySource::Route, rule));
        }
        self.registry
            .resolve(path)
            .map(|rule| (PolicySource::Mapping, rule))
    }

    /// Layer to attach to the route at `path`, if it has a policy.
    pub fn layer_for(&self, path: &str) -> Option<CorsLayer> {
        let (source, rule) = self.rule_for(path)?;
        tracing::info!(
            route = %path,
            source = ?source,
            origins = ?rule.allowed_origins,
            "CORS policy attached"
        );
        Some(build_layer(rule))
    }
}
