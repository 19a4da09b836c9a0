//! Greeting wire types.

use serde::{Deserialize, Serialize};

/// Response body of the greeting routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub id: u64,
    pub content: String,
}

/// Query (or form) parameters accepted by the greeting routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GreetingParams {
    pub name: Option<String>,
}

/// Renders greeting content from a `{name}` template.
#[derive(Debug, Clone)]
pub struct GreetingTemplate {
    template: String,
}

impl GreetingTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, name: &str) -> String {
        self.template.replace("{name}", name)
    }
}

impl Default for GreetingTemplate {
    fn default() -> Self {
        Self::new("Hello, {name}!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(GreetingTemplate::default().render("Ada"), "Hello, Ada!");
        assert_eq!(GreetingTemplate::new("Hi {name}, bye {name}").render("Bo"), "Hi Bo, bye Bo");
    }

    #[test]
    fn test_greeting_json_shape() {
        let greeting = Greeting {
            id: 1,
            content: "Hello, Ada!".into(),
        };
        assert_eq!(
            serde_json::to_value(&greeting).unwrap(),
            serde_json::json!({ "id": 1, "content": "Hello, Ada!" })
        );
    }
}
