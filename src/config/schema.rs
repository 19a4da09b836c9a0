//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the greeting service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Greeting endpoint behaviour.
    pub greeting: GreetingConfig,

    /// Cross-origin rules, route-attached and centrally mapped.
    pub cors: CorsConfig,

    /// Request replay filter.
    pub replay: ReplayConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Covers both replay passes when the replay filter is enabled.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// How greeting ids are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Stable id per name, assigned on first sight.
    #[default]
    Registry,
    /// Fresh id on every request regardless of name.
    Counter,
}

/// Greeting endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GreetingConfig {
    /// Name used when the request carries no `name` parameter.
    pub default_name: String,

    /// Content template; `{name}` is replaced by the subject name.
    pub template: String,

    /// Id assignment strategy.
    pub id_strategy: IdStrategy,

    /// Also accept POST on the greeting routes.
    pub allow_post: bool,
}

impl Default for GreetingConfig {
    fn default() -> Self {
        Self {
            default_name: "World".to_string(),
            template: "Hello, {name}!".to_string(),
            id_strategy: IdStrategy::Registry,
            allow_post: false,
        }
    }
}

/// A single cross-origin rule.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CorsRule {
    /// Route path, or for mappings a pattern (exact, or prefix ending in `/**`).
    pub path: String,

    /// Origins reflected in `Access-Control-Allow-Origin`.
    pub allowed_origins: Vec<String>,

    /// Methods allowed cross-origin.
    #[serde(default = "default_cors_methods")]
    pub allowed_methods: Vec<String>,

    /// Preflight cache duration in seconds.
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

fn default_cors_methods() -> Vec<String> {
    vec!["GET".to_string(), "HEAD".to_string(), "POST".to_string()]
}

impl CorsRule {
    pub fn new(path: impl Into<String>, origins: &[&str]) -> Self {
        Self {
            path: path.into(),
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            allowed_methods: default_cors_methods(),
            max_age_secs: None,
        }
    }
}

/// CORS configuration.
///
/// `routes` are attached directly to the route they name. `mappings` form a
/// central registry matched against every route path when the router is built.
/// A route-attached rule wins over a mapping for the same path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub routes: Vec<CorsRule>,
    pub mappings: Vec<CorsRule>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            routes: vec![CorsRule::new("/greeting", &["http://localhost:9000"])],
            mappings: vec![CorsRule::new("/greeting-javaconfig", &["http://localhost:9000"])],
        }
    }
}

/// What happens to the second replay pass when the first one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Abort remaining passes and propagate the first error.
    #[default]
    FailFast,
    /// Run every pass, then surface the first error.
    Isolated,
}

/// Replay filter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Install the replay filter in front of the routes.
    pub enabled: bool,

    /// Failure handling between passes.
    pub failure_mode: FailureMode,

    /// Maximum inbound body buffered so it can be replayed.
    pub max_body_bytes: usize,

    /// Maximum response body captured per pass.
    pub max_capture_bytes: usize,

    /// Root that request paths are translated against.
    pub document_root: Option<PathBuf>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            failure_mode: FailureMode::FailFast,
            max_body_bytes: 1024 * 1024,
            max_capture_bytes: 1024 * 1024,
            document_root: None,
        }
    }
}

/// Request limit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.greeting.default_name, "World");
        assert_eq!(config.greeting.id_strategy, IdStrategy::Registry);
        assert!(!config.replay.enabled);
        assert_eq!(config.replay.failure_mode, FailureMode::FailFast);
        assert_eq!(config.replay.document_root, None);
        assert_eq!(config.cors.routes[0].path, "/greeting");
        assert_eq!(config.cors.mappings[0].path, "/greeting-javaconfig");
    }

    #[test]
    fn test_partial_sections() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [greeting]
            id_strategy = "counter"
            allow_post = true

            [replay]
            enabled = true
            failure_mode = "isolated"
            max_capture_bytes = 4096
            document_root = "/srv/www"

            [[cors.routes]]
            path = "/greeting"
            allowed_origins = ["http://localhost:8080"]
            "#,
        )
        .unwrap();

        assert_eq!(config.greeting.id_strategy, IdStrategy::Counter);
        assert!(config.greeting.allow_post);
        assert_eq!(config.greeting.template, "Hello, {name}!");
        assert!(config.replay.enabled);
        assert_eq!(config.replay.failure_mode, FailureMode::Isolated);
        assert_eq!(config.replay.max_capture_bytes, 4096);
        assert_eq!(config.replay.document_root, Some(PathBuf::from("/srv/www")));
        assert_eq!(config.cors.routes.len(), 1);
        assert_eq!(config.cors.routes[0].allowed_origins, vec!["http://localhost:8080"]);
        assert_eq!(config.cors.routes[0].allowed_methods, vec!["GET", "HEAD", "POST"]);
        // untouched section keeps its default
        assert_eq!(config.cors.mappings.len(), 1);
    }
}
