//! Central registry of path-pattern CORS mappings.
//!
//! # Design Decisions
//! - Patterns are either exact paths or prefixes ending in `/**`
//! - First registered mapping that matches wins
//! - Resolved once per route when the router is built, never per request

use crate::config::CorsRule;

/// A path pattern: `/a/b` (exact) or `/a/**` (the prefix and everything under it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Prefix(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathPattern::Prefix(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => p == path,
            PathPattern::Prefix(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone)]
struct Mapping {
    pattern: PathPattern,
    rule: CorsRule,
}

/// Ordered collection of CORS mappings.
#[derive(Debug, Clone, Default)]
pub struct CorsRegistry {
    mappings: Vec<Mapping>,
}

impl CorsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: &[CorsRule]) -> Self {
        let mut registry = Self::new();
        for rule in rules {
            registry.add_mapping(rule.clone());
        }
        registry
    }

    /// Register a mapping. Its `path` is read as a pattern.
    pub fn add_mapping(&mut self, rule: CorsRule) -> &mut Self {
        self.mappings.push(Mapping {
            pattern: PathPattern::parse(&rule.path),
            rule,
        });
        self
    }

    /// Rule for `path`, if any mapping covers it.
    pub fn resolve(&self, path: &str) -> Option<&CorsRule> {
        self.mappings
            .iter()
            .find(|m| m.pattern.matches(path))
            .map(|m| &m.rule)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
