use crate::domain::errors::CliError;
use crate::domain::target::{AppFactory, Application};
use crate::infrastructure::demo;
use std::collections::HashMap;

/// Names tried, in order, when no `--app-name` is given
pub const DEFAULT_APP_NAMES: [&str; 3] = ["app", "application", "router"];

/// Resolves a source identifier to an application handle
pub trait ApplicationLoader {
    fn load(&self, source: &str, name_hint: Option<&str>) -> Result<Application, CliError>;
}

/// Loader backed by router factories compiled into the binary
#[derive(Default)]
pub struct RegistryLoader {
    sources: HashMap<String, HashMap<String, AppFactory>>,
}

impl RegistryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bundled `demo` source
    pub fn with_builtin() -> Self {
        Self::new().register("demo", "app", demo::app)
    }

    pub fn register(mut self, source: &str, name: &str, factory: AppFactory) -> Self {
        self.sources
            .entry(source.to_string())
            .or_default()
            .insert(name.to_string(), factory);
        self
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}

impl ApplicationLoader for RegistryLoader {
    fn load(&self, source: &str, name_hint: Option<&str>) -> Result<Application, CliError> {
        let names = self.sources.get(source).ok_or_else(|| {
            CliError::ApplicationLoad(format!("Application source not found: {source}"))
        })?;

        let candidates: Vec<&str> = match name_hint {
            Some(hint) => vec![hint],
            None => DEFAULT_APP_NAMES.to_vec(),
        };

        for candidate in candidates.into_iter().map(str::trim) {
            if candidate.is_empty() {
                continue;
            }
            if let Some(factory) = names.get(candidate) {
                tracing::debug!(source, name = candidate, "resolved application");
                return Ok(Application::from_factory(candidate, *factory));
            }
        }

        Err(CliError::ApplicationLoad(format!(
            "Application not found in '{source}'. Ensure it registers an application \
             named 'app' (or use --app-name)."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;

    fn empty() -> Router {
        Router::new()
    }

    #[test]
    fn default_names_are_tried_in_order() {
        let loader = RegistryLoader::new()
            .register("svc", "router", empty)
            .register("svc", "application", empty);
        let app = loader.load("svc", None).unwrap();
        assert_eq!(app.name(), "application");
    }

    #[test]
    fn name_hint_is_trimmed() {
        let loader = RegistryLoader::new().register("svc", "api", empty);
        let app = loader.load("svc", Some("  api ")).unwrap();
        assert_eq!(app.name(), "api");
    }

    #[test]
    fn name_hint_replaces_defaults() {
        let loader = RegistryLoader::new().register("svc", "app", empty);
        let err = loader.load("svc", Some("other")).unwrap_err();
        assert!(err.to_string().contains("use --app-name"));
    }

    #[test]
    fn unknown_source_fails() {
        let err = RegistryLoader::with_builtin().load("nope", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to load application: Application source not found: nope"
        );
    }

    #[test]
    fn builtin_registers_demo() {
        let loader = RegistryLoader::with_builtin();
        assert_eq!(loader.sources().collect::<Vec<_>>(), ["demo"]);
        assert_eq!(loader.load("demo", None).unwrap().name(), "app");
    }
}
