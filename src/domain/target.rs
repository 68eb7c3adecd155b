use axum::Router;

/// Builds a fresh application router
pub type AppFactory = fn() -> Router;

/// Handle to an application that requests are dispatched into.
///
/// Only loaders hand these out, and only after a name lookup matched a
/// registered factory, so holding one means the target is a real router.
#[derive(Clone)]
pub struct Application {
    name: String,
    router: Router,
}

impl Application {
    pub fn from_factory(name: impl Into<String>, factory: AppFactory) -> Self {
        Self {
            name: name.into(),
            router: factory(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
