//! Registry of live renderer instances.

use std::collections::HashMap;

use easel_core::{Env, InstanceId};

use crate::backend::{BackendOptions, BackendRegistry, HostSurface, RenderBackend};
use crate::options::RendererOptions;
use crate::renderer::Renderer;
use crate::RenderResult;

/// Owns every renderer created through it, keyed by instance id.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    backends: BackendRegistry,
    env: Env,
    instances: HashMap<InstanceId, Renderer>,
}

impl InstanceRegistry {
    /// Registry with no backends for the given environment.
    #[must_use]
    pub fn new(env: Env) -> Self {
        Self {
            backends: BackendRegistry::new(),
            env,
            instances: HashMap::new(),
        }
    }

    /// Registry with the built-in backends for the detected environment.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            backends: BackendRegistry::with_defaults(),
            env: Env::detect(),
            instances: HashMap::new(),
        }
    }

    /// Register or replace a backend factory.
    pub fn register_backend<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(Option<&HostSurface>, &BackendOptions, InstanceId) -> RenderResult<Box<dyn RenderBackend>>
            + 'static,
    {
        self.backends.register(name, factory);
    }

    /// The backend table.
    #[must_use]
    pub fn backends(&self) -> &BackendRegistry {
        &self.backends
    }

    /// The environment instances are created for.
    #[must_use]
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Create a renderer and keep it under its new id.
    ///
    /// # Errors
    ///
    /// Returns the construction error of [`Renderer::new`].
    pub fn init(
        &mut self,
        host: Option<&HostSurface>,
        options: &RendererOptions,
    ) -> RenderResult<InstanceId> {
        let renderer = Renderer::new(&self.backends, &self.env, host, options)?;
        let id = renderer.id();
        self.instances.insert(id, renderer);
        tracing::debug!(instance = %id, live = self.instances.len(), "instance registered");
        Ok(id)
    }

    /// Look up a live instance.
    #[must_use]
    pub fn get_instance(&self, id: InstanceId) -> Option<&Renderer> {
        self.instances.get(&id)
    }

    /// Look up a live instance for mutation.
    pub fn get_instance_mut(&mut self, id: InstanceId) -> Option<&mut Renderer> {
        self.instances.get_mut(&id)
    }

    /// Deregister and dispose one instance. Returns false if it was unknown.
    pub fn dispose(&mut self, id: InstanceId) -> bool {
        match self.instances.remove(&id) {
            Some(renderer) => {
                renderer.dispose();
                true
            }
            None => false,
        }
    }

    /// Dispose every instance.
    pub fn dispose_all(&mut self) {
        let instances = std::mem::take(&mut self.instances);
        let count = instances.len();
        for (_, renderer) in instances {
            renderer.dispose();
        }
        tracing::info!(count, "all instances disposed");
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no instance is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
