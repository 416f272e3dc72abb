//! Model picker to task classification routing.
//!
//! The picker shows concrete models; the gateway only sees an abstract
//! [`TaskType`]. The mapping lives in one static table so adding a model is a
//! one-line change here and nowhere else.

use std::collections::{HashMap, HashSet};
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Abstract category a prompt is routed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Chat,
    Analysis,
    Creative,
    Strategic,
    Operational,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Chat => "chat",
            TaskType::Analysis => "analysis",
            TaskType::Creative => "creative",
            TaskType::Strategic => "strategic",
            TaskType::Operational => "operational",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routed model ids. Anything absent falls back to [`TaskType::Chat`].
static ROUTES: Lazy<HashMap<&'static str, TaskType>> = Lazy::new(|| {
    HashMap::from([
        ("anthropic", TaskType::Strategic),
        ("openai", TaskType::Creative),
        ("google", TaskType::Operational),
    ])
});

/// Maps a model id to its task type. Total: unknown ids route to `Chat`.
pub fn route(model_id: &str) -> TaskType {
    ROUTES.get(model_id).copied().unwrap_or_default()
}

/// An entry in the model picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl ModelDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// The models offered out of the box.
pub fn default_catalog() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor::new("anthropic", "Claude (Anthropic)", "Best for analysis and reasoning"),
        ModelDescriptor::new("openai", "GPT-4 (OpenAI)", "Excellent for creative tasks"),
        ModelDescriptor::new("google", "Gemini (Google)", "Great for general assistance"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("route table names unknown model '{0}'")]
    UnknownRoute(String),

    #[error("model '{0}' appears more than once in the catalog")]
    DuplicateModel(String),

    #[error("model catalog is empty")]
    EmptyCatalog,
}

/// Route table bound to a model catalog.
#[derive(Debug, Clone)]
pub struct TaskRouter {
    catalog: Vec<ModelDescriptor>,
}

impl TaskRouter {
    /// Checks the route table against `catalog`.
    ///
    /// Every routed id must be in the catalog and catalog ids must be unique.
    /// Catalog models without a route are accepted but logged; they use `chat`.
    pub fn validated(catalog: Vec<ModelDescriptor>) -> Result<Self, RoutingError> {
        if catalog.is_empty() {
            return Err(RoutingError::EmptyCatalog);
        }

        let mut ids = HashSet::new();
        for model in &catalog {
            if !ids.insert(model.id.as_str()) {
                return Err(RoutingError::DuplicateModel(model.id.clone()));
            }
        }

        let mut routed: Vec<_> = ROUTES.keys().copied().collect();
        routed.sort_unstable();
        if let Some(missing) = routed.into_iter().find(|id| !ids.contains(id)) {
            return Err(RoutingError::UnknownRoute(missing.to_string()));
        }

        for model in catalog.iter().filter(|m| !ROUTES.contains_key(m.id.as_str())) {
            tracing::warn!(model = %model.id, "model has no route, falling back to chat");
        }

        Ok(Self { catalog })
    }

    pub fn map(&self, model_id: &str) -> TaskType {
        route(model_id)
    }

    pub fn catalog(&self) -> &[ModelDescriptor] {
        &self.catalog
    }

    pub fn is_known(&self, model_id: &str) -> bool {
        self.catalog.iter().any(|m| m.id == model_id)
    }
}

impl Default for TaskRouter {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn routes_known_models() {
        assert_eq!(route("anthropic"), TaskType::Strategic);
        assert_eq!(route("openai"), TaskType::Creative);
        assert_eq!(route("google"), TaskType::Operational);
    }

    #[test]
    fn unknown_model_routes_to_chat() {
        assert_eq!(route("mistral"), TaskType::Chat);
        assert_eq!(route(""), TaskType::Chat);
        assert_eq!(route("Anthropic"), TaskType::Chat);
    }

    #[test]
    fn default_catalog_validates() {
        let router = TaskRouter::validated(default_catalog()).unwrap();
        assert!(router.is_known("anthropic"));
        assert_eq!(router.map("openai"), TaskType::Creative);
    }

    #[test]
    fn catalog_missing_a_routed_model_fails() {
        let catalog = vec![
            ModelDescriptor::new("anthropic", "a", "a"),
            ModelDescriptor::new("openai", "o", "o"),
        ];
        assert_eq!(
            TaskRouter::validated(catalog).unwrap_err(),
            RoutingError::UnknownRoute("google".to_string())
        );
    }

    #[test]
    fn duplicate_catalog_entry_fails() {
        let mut catalog = default_catalog();
        catalog.push(ModelDescriptor::new("openai", "again", "again"));
        assert_eq!(
            TaskRouter::validated(catalog).unwrap_err(),
            RoutingError::DuplicateModel("openai".to_string())
        );
    }

    #[test]
    fn unrouted_catalog_model_is_accepted() {
        let mut catalog = default_catalog();
        catalog.push(ModelDescriptor::new("local-llm", "Local", "On device"));
        let router = TaskRouter::validated(catalog).unwrap();
        assert_eq!(router.map("local-llm"), TaskType::Chat);
    }

    #[test]
    fn task_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TaskType::Strategic).unwrap(), "\"strategic\"");
        assert_eq!(TaskType::Operational.to_string(), "operational");
    }

    proptest! {
        #[test]
        fn every_model_id_routes_somewhere(id in ".*") {
            let task = route(&id);
            if !["anthropic", "openai", "google"].contains(&id.as_str()) {
                prop_assert_eq!(task, TaskType::Chat);
            }
        }
    }
}
