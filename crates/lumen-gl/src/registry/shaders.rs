use std::rc::Rc;

use crate::device::GlDevice;
use crate::shader::{ShaderPaths, ShaderProgram, SharedShader};

use super::{Cache, RegistryConfig, ReloadReport};

/// Alias → shared [`ShaderProgram`] cache with bulk hot reload.
///
/// ```ignore
/// let mut shaders = ShaderRegistry::new(device.clone());
/// let lit = shaders.load_or_get("lit", ShaderPaths::new("lit.vs", "lit.fs"));
/// // on a file-watch event:
/// let report = shaders.reload_all();
/// ```
pub struct ShaderRegistry {
    device: Rc<dyn GlDevice>,
    cache: Cache<ShaderProgram, ShaderPaths>,
}

impl ShaderRegistry {
    pub fn new(device: Rc<dyn GlDevice>) -> Self {
        Self::with_config(device, RegistryConfig::default())
    }

    pub fn with_config(device: Rc<dyn GlDevice>, config: RegistryConfig) -> Self {
        Self { device, cache: Cache::new("shader", config) }
    }

    /// Returns the program cached under `alias`, compiling `paths` on a
    /// miss. Compile and link failures are logged and yield `None`; nothing
    /// is cached for the alias in that case.
    pub fn load_or_get(&mut self, alias: &str, paths: ShaderPaths) -> Option<SharedShader> {
        let device = &self.device;
        self.cache.load_or_get(alias, paths, |paths| {
            ShaderProgram::from_files(Rc::clone(device), paths.clone())
        })
    }

    /// Pure lookup; logs a warning when `alias` is unknown.
    pub fn get(&self, alias: &str) -> Option<SharedShader> {
        self.cache.get(alias)
    }

    /// Drops the registry's reference to `alias`.
    pub fn remove(&mut self, alias: &str) -> Option<SharedShader> {
        self.cache.remove(alias)
    }

    /// Reloads every program. A failing entry keeps its previous program
    /// and does not stop the others.
    pub fn reload_all(&self) -> ReloadReport {
        self.cache.reload_all()
    }

    /// Drops every registry reference. Programs still held elsewhere live on
    /// until their last holder drops them.
    pub fn cleanup(&mut self) {
        self.cache.cleanup();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.len() == 0
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.cache.contains(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.cache.aliases()
    }
}
