//! Name-keyed table of backend constructors.

use easel_core::InstanceId;

use super::canvas2d::Canvas2DBackend;
use super::svg::SvgBackend;
use super::{BackendOptions, HostSurface, RenderBackend};
use crate::{RenderError, RenderResult};

/// Constructor for a backend bound to a host, options and owning instance.
pub type BackendFactory = Box<
    dyn Fn(Option<&HostSurface>, &BackendOptions, InstanceId) -> RenderResult<Box<dyn RenderBackend>>,
>;

/// Outcome of looking up a backend by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendResolution {
    /// The requested backend is registered.
    Found(String),
    /// The requested backend is missing; the first registered one is used.
    FellBack {
        /// Name that was asked for.
        requested: String,
        /// Name that will be used instead.
        used: String,
    },
    /// Nothing is registered at all.
    NotFound(String),
}

impl BackendResolution {
    /// Name of the backend to construct, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            BackendResolution::Found(name) | BackendResolution::FellBack { used: name, .. } => {
                Some(name.as_str())
            }
            BackendResolution::NotFound(_) => None,
        }
    }
}

/// Registered backend constructors, kept in registration order.
#[derive(Default)]
pub struct BackendRegistry {
    factories: Vec<(String, BackendFactory)>,
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl BackendRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `canvas` and `svg` backends.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Canvas2DBackend::NAME, |host, opts, id| {
            Ok(Box::new(Canvas2DBackend::new(host, opts, id)))
        });
        registry.register(SvgBackend::NAME, |host, opts, id| {
            Ok(Box::new(SvgBackend::new(host, opts, id)))
        });
        registry
    }

    /// Register a backend. Re-registering a name replaces its constructor
    /// but keeps its original position.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(Option<&HostSurface>, &BackendOptions, InstanceId) -> RenderResult<Box<dyn RenderBackend>>
            + 'static,
    {
        if let Some(slot) = self.factories.iter_mut().find(|(n, _)| n.as_str() == name) {
            slot.1 = Box::new(factory);
        } else {
            self.factories.push((name.to_string(), Box::new(factory)));
        }
        tracing::debug!(backend = name, "backend registered");
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.iter().any(|(n, _)| n.as_str() == name)
    }

    /// Registered names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of registered backends.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no backend is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Decide which backend serves a request for `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> BackendResolution {
        if self.contains(name) {
            return BackendResolution::Found(name.to_string());
        }
        match self.factories.first() {
            Some((first, _)) => BackendResolution::FellBack {
                requested: name.to_string(),
                used: first.clone(),
            },
            None => BackendResolution::NotFound(name.to_string()),
        }
    }

    /// Resolve `name` and construct the backend.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoBackend`] when nothing is registered, or the
    /// factory's own error.
    pub fn create(
        &self,
        name: &str,
        host: Option<&HostSurface>,
        options: &BackendOptions,
        instance: InstanceId,
    ) -> RenderResult<(BackendResolution, Box<dyn RenderBackend>)> {
        let resolution = self.resolve(name);
        let resolved = match &resolution {
            BackendResolution::Found(n) => n.clone(),
            BackendResolution::FellBack { requested, used } => {
                tracing::warn!(
                    requested = %requested,
                    used = %used,
                    "backend not registered, falling back to first registered backend"
                );
                used.clone()
            }
            BackendResolution::NotFound(requested) => {
                return Err(RenderError::NoBackend(format!(
                    "backend '{requested}' is not registered and no fallback exists"
                )));
            }
        };
        let factory = self
            .factories
            .iter()
            .find(|(n, _)| *n == resolved)
            .map(|(_, f)| f)
            .ok_or_else(|| RenderError::NoBackend(resolved.clone()))?;
        let backend = factory(host, options, instance)?;
        Ok((resolution, backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_register_canvas_then_svg() {
        let registry = BackendRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["canvas", "svg"]);
    }

    #[test]
    fn resolve_found_fallback_and_missing() {
        let registry = BackendRegistry::with_defaults();
        assert_eq!(
            registry.resolve("svg"),
            BackendResolution::Found("svg".to_string())
        );
        let fell_back = registry.resolve("webgl");
        assert_eq!(
            fell_back,
            BackendResolution::FellBack {
                requested: "webgl".to_string(),
                used: "canvas".to_string()
            }
        );
        assert_eq!(fell_back.name(), Some("canvas"));

        let empty = BackendRegistry::new();
        let missing = empty.resolve("canvas");
        assert!(matches!(missing, BackendResolution::NotFound(_)));
        assert!(missing.name().is_none());
    }

    #[test]
    fn create_fails_on_empty_registry() {
        let empty = BackendRegistry::new();
        let result = empty.create("canvas", None, &BackendOptions::default(), InstanceId::next());
        assert!(matches!(result, Err(RenderError::NoBackend(_))));
    }

    #[test]
    fn reregistering_keeps_position() {
        let mut registry = BackendRegistry::with_defaults();
        registry.register("canvas", |host, opts, id| {
            Ok(Box::new(SvgBackend::new(host, opts, id)))
        });
        assert_eq!(registry.names(), vec!["canvas", "svg"]);

        let (_, backend) = registry
            .create("canvas", None, &BackendOptions::default(), InstanceId::next())
            .expect("registered");
        assert_eq!(backend.backend_type(), "svg");
    }
}
