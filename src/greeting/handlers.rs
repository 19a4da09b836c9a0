//! Greeting endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Form, MatchedPath, Query, State},
    routing::{get, MethodRouter},
    Json,
};

use crate::config::{GreetingConfig, IdStrategy};
use crate::greeting::registry::{IdSource, IdentityRegistry, RequestCounter};
use crate::greeting::types::{Greeting, GreetingParams, GreetingTemplate};
use crate::observability::metrics;

/// Builds greetings; shared by every greeting route.
#[derive(Debug, Clone)]
pub struct GreetingService {
    ids: Arc<dyn IdSource>,
    template: GreetingTemplate,
    default_name: String,
}

impl GreetingService {
    pub fn new(ids: Arc<dyn IdSource>, template: GreetingTemplate, default_name: impl Into<String>) -> Self {
        Self {
            ids,
            template,
            default_name: default_name.into(),
        }
    }

    pub fn from_config(config: &GreetingConfig) -> Self {
        let ids: Arc<dyn IdSource> = match config.id_strategy {
            IdStrategy::Registry => Arc::new(IdentityRegistry::new()),
            IdStrategy::Counter => Arc::new(RequestCounter::new()),
        };
        Self::new(ids, GreetingTemplate::new(config.template.clone()), config.default_name.clone())
    }

    /// Greeting for `name`, falling back to the default subject.
    pub fn greet(&self, name: Option<&str>) -> Greeting {
        let name = name.unwrap_or(&self.default_name);
        Greeting {
            id: self.ids.id_for(name),
            content: self.template.render(name),
        }
    }

    /// Reset id assignment.
    pub fn reset(&self) {
        self.ids.reset();
    }
}

/// Method router for one greeting route.
pub fn greeting_route(service: GreetingService, allow_post: bool) -> MethodRouter {
    let router = get(get_greeting);
    let router = if allow_post {
        router.post(post_greeting)
    } else {
        router
    };
    router.with_state(service)
}

async fn get_greeting(
    State(service): State<GreetingService>,
    path: MatchedPath,
    Query(params): Query<GreetingParams>,
) -> Json<Greeting> {
    serve(&service, path.as_str(), params.name.as_deref())
}

/// POST reads `name` from a form body, falling back to the query string.
async fn post_greeting(
    State(service): State<GreetingService>,
    path: MatchedPath,
    Query(query): Query<GreetingParams>,
    form: Result<Form<GreetingParams>, FormRejection>,
) -> Json<Greeting> {
    let name = form.ok().and_then(|Form(params)| params.name).or(query.name);
    serve(&service, path.as_str(), name.as_deref())
}

fn serve(service: &GreetingService, route: &str, name: Option<&str>) -> Json<Greeting> {
    let greeting = service.greet(name);
    tracing::debug!(route = %route, id = greeting.id, content = %greeting.content, "Serving greeting");
    metrics::record_greeting(route);
    Json(greeting)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greet_scenario() {
        let service = GreetingService::from_config(&GreetingConfig::default());

        assert_eq!(
            service.greet(Some("Ada")),
            Greeting { id: 1, content: "Hello, Ada!".into() }
        );
        assert_eq!(
            service.greet(Some("Ada")),
            Greeting { id: 1, content: "Hello, Ada!".into() }
        );
        assert_eq!(
            service.greet(Some("Grace")),
            Greeting { id: 2, content: "Hello, Grace!".into() }
        );
    }

    #[test]
    fn test_default_name() {
        let service = GreetingService::from_config(&GreetingConfig::default());
        assert_eq!(service.greet(None).content, "Hello, World!");
    }

    #[test]
    fn test_counter_strategy() {
        let config = GreetingConfig {
            id_strategy: IdStrategy::Counter,
            ..GreetingConfig::default()
        };
        let service = GreetingService::from_config(&config);
        assert_eq!(service.greet(Some("Ada")).id, 1);
        assert_eq!(service.greet(Some("Ada")).id, 2);

        service.reset();
        assert_eq!(service.greet(Some("Ada")).id, 1);
    }
}
