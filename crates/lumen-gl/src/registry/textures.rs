use std::path::PathBuf;
use std::rc::Rc;

use crate::device::GlDevice;
use crate::texture::{SharedTexture, Texture, TextureParams};

use super::{Cache, RegistryConfig, ReloadReport};

/// What a cached texture was loaded from.
#[derive(Debug, Clone, PartialEq)]
struct TextureSource {
    path: PathBuf,
    params: TextureParams,
}

/// Alias → shared file-backed [`Texture`] cache. Same contract as
/// [`ShaderRegistry`](super::ShaderRegistry).
pub struct TextureRegistry {
    device: Rc<dyn GlDevice>,
    cache: Cache<Texture, TextureSource>,
}

impl TextureRegistry {
    pub fn new(device: Rc<dyn GlDevice>) -> Self {
        Self::with_config(device, RegistryConfig::default())
    }

    pub fn with_config(device: Rc<dyn GlDevice>, config: RegistryConfig) -> Self {
        Self { device, cache: Cache::new("texture", config) }
    }

    /// Returns the texture cached under `alias`, decoding `path` on a miss.
    /// A different path or different params for a known alias count as a
    /// mismatch.
    pub fn load_or_get(
        &mut self,
        alias: &str,
        path: impl Into<PathBuf>,
        params: TextureParams,
    ) -> Option<SharedTexture> {
        let device = &self.device;
        let source = TextureSource { path: path.into(), params };
        self.cache.load_or_get(alias, source, |source| {
            Texture::from_file(Rc::clone(device), source.path.clone(), source.params)
        })
    }

    pub fn get(&self, alias: &str) -> Option<SharedTexture> {
        self.cache.get(alias)
    }

    pub fn remove(&mut self, alias: &str) -> Option<SharedTexture> {
        self.cache.remove(alias)
    }

    pub fn reload_all(&self) -> ReloadReport {
        self.cache.reload_all()
    }

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
