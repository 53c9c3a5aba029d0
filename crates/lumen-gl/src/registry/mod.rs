//! Alias-keyed resource caches.
//!
//! A registry maps a caller-chosen alias to one shared resource. The first
//! successful load for an alias wins; later loads return the cached entry.
//! Registries are plain values owned by the caller, not process globals, and
//! hold `Rc`s so they stay on the thread that owns the GL context.
//!
//! Entries are kept in alias order, so `reload_all` visits them
//! deterministically.

mod shaders;
mod textures;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{GfxError, Result};
use crate::shader::ShaderProgram;
use crate::texture::Texture;

pub use shaders::ShaderRegistry;
pub use textures::TextureRegistry;

/// A resource that can rebuild itself from its sources in place.
pub trait Reload {
    /// On error the resource must keep its previous state.
    fn reload(&self) -> Result<()>;
}

impl Reload for ShaderProgram {
    fn reload(&self) -> Result<()> {
        ShaderProgram::reload(self)
    }
}

impl Reload for Texture {
    fn reload(&self) -> Result<()> {
        Texture::reload(self)
    }
}

/// What to do when an alias is requested again with different sources.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum PathMismatch {
    /// Return the cached entry and log a warning.
    #[default]
    Warn,
    /// Log an error and return `None`; the cached entry is kept.
    Reject,
}

#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    pub on_path_mismatch: PathMismatch,
}

/// Outcome of a bulk reload, one line per alias.
#[derive(Debug, Default)]
pub struct ReloadReport {
    pub reloaded: Vec<String>,
    pub failed: Vec<(String, GfxError)>,
}

impl ReloadReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for ReloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} reloaded, {} failed", self.reloaded.len(), self.failed.len())?;
        for (alias, err) in &self.failed {
            write!(f, "\n  {alias}: {err}")?;
        }
        Ok(())
    }
}

struct Entry<R, S> {
    source: S,
    resource: Rc<R>,
}

/// Shared machinery behind the typed registries. `S` identifies what an
/// entry was loaded from, for mismatch detection.
pub(crate) struct Cache<R, S> {
    kind: &'static str,
    config: RegistryConfig,
    entries: BTreeMap<String, Entry<R, S>>,
}

impl<R: Reload, S: PartialEq + fmt::Debug> Cache<R, S> {
    pub(crate) fn new(kind: &'static str, config: RegistryConfig) -> Self {
        Self { kind, config, entries: BTreeMap::new() }
    }

    pub(crate) fn load_or_get(
        &mut self,
        alias: &str,
        source: S,
        load: impl FnOnce(&S) -> Result<R>,
    ) -> Option<Rc<R>> {
        if let Some(entry) = self.entries.get(alias) {
            if entry.source != source {
                match self.config.on_path_mismatch {
                    PathMismatch::Warn => log::warn!(
                        "{} '{alias}' is already loaded from {:?}; ignoring {:?}",
                        self.kind,
                        entry.source,
                        source
                    ),
                    PathMismatch::Reject => {
                        log::error!(
                            "{} '{alias}' is already loaded from {:?}; rejecting {:?}",
                            self.kind,
                            entry.source,
                            source
                        );
                        return None;
                    }
                }
            }
            return Some(Rc::clone(&entry.resource));
        }

        match load(&source) {
            Ok(resource) => {
                let resource = Rc::new(resource);
                log::info!("{} '{alias}' loaded", self.kind);
                self.entries
                    .insert(alias.to_string(), Entry { source, resource: Rc::clone(&resource) });
                Some(resource)
            }
            Err(err) => {
                log::error!("failed to load {} '{alias}': {err}", self.kind);
                None
            }
        }
    }

    pub(crate) fn get(&self, alias: &str) -> Option<Rc<R>> {
        let found = self.entries.get(alias).map(|entry| Rc::clone(&entry.resource));
        if found.is_none() {
            log::warn!("{} '{alias}' not found", self.kind);
        }
        found
    }

    pub(crate) fn remove(&mut self, alias: &str) -> Option<Rc<R>> {
        self.entries.remove(alias).map(|entry| entry.resource)
    }

    pub(crate) fn reload_all(&self) -> ReloadReport {
        let mut report = ReloadReport::default();
        for (alias, entry) in &self.entries {
            match entry.resource.reload() {
                Ok(()) => report.reloaded.push(alias.clone()),
                Err(err) => {
                    log::error!("{} '{alias}' failed to reload: {err}", self.kind);
                    report.failed.push((alias.clone(), err));
                }
            }
        }
        log::info!("{} reload: {}", self.kind, report);
        report
    }

    pub(crate) fn cleanup(&mut self) {
        let released = self.entries.len();
        self.entries.clear();
        log::info!("{} registry released {released} entries", self.kind);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    pub(crate) fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
