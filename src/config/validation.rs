//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check CORS origins are bare `scheme://host[:port]` values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::Method;
use url::Url;

use crate::config::schema::{CorsRule, ServiceConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    BindAddress(String),
    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("greeting template must contain `{{name}}`")]
    Template,
    #[error("cors path `{0}` must start with `/`")]
    CorsPath(String),
    #[error("cors rule `{path}` has invalid origin `{origin}`")]
    CorsOrigin { path: String, origin: String },
    #[error("cors rule `{path}` has invalid method `{method}`")]
    CorsMethod { path: String, method: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.replay.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("replay.max_body_bytes"));
    }
    if config.replay.max_capture_bytes == 0 {
        errors.push(ValidationError::Zero("replay.max_capture_bytes"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }
    if !config.greeting.template.contains("{name}") {
        errors.push(ValidationError::Template);
    }

    for rule in config.cors.routes.iter().chain(config.cors.mappings.iter()) {
        validate_rule(rule, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_rule(rule: &CorsRule, errors: &mut Vec<ValidationError>) {
    if !rule.path.starts_with('/') {
        errors.push(ValidationError::CorsPath(rule.path.clone()));
    }
    for origin in &rule.allowed_origins {
        if origin != "*" && !is_bare_origin(origin) {
            errors.push(ValidationError::CorsOrigin {
                path: rule.path.clone(),
                origin: origin.clone(),
            });
        }
    }
    for method in &rule.allowed_methods {
        if method.parse::<Method>().is_err() {
            errors.push(ValidationError::CorsMethod {
                path: rule.path.clone(),
                method: method.clone(),
            });
        }
    }
}

/// An origin is scheme + host + optional port, nothing else.
fn is_bare_origin(origin: &str) -> bool {
    match Url::parse(origin) {
        Ok(url) => {
            url.host_str().is_some()
                && url.path() == "/"
                && !origin.ends_with('/')
                && url.query().is_none()
                && url.fragment().is_none()
        }
        Err(_) => false,
    }
}
