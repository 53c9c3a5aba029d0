use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::device::ShaderStage;
use crate::error::{GfxError, Result};

/// Source file locations of a program. Kept by file-backed programs so they
/// can be reloaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
    pub geometry: Option<PathBuf>,
}

impl ShaderPaths {
    pub fn new(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self { vertex: vertex.into(), fragment: fragment.into(), geometry: None }
    }

    pub fn with_geometry(mut self, geometry: impl Into<PathBuf>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }
}

impl fmt::Display for ShaderPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.vertex.display(), self.fragment.display())?;
        if let Some(geometry) = &self.geometry {
            write!(f, " + {}", geometry.display())?;
        }
        Ok(())
    }
}

/// Stage sources held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
    pub geometry: Option<String>,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self { vertex: vertex.into(), fragment: fragment.into(), geometry: None }
    }

    pub fn with_geometry(mut self, geometry: impl Into<String>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }

    /// Reads every stage named by `paths` in full.
    pub fn read(paths: &ShaderPaths) -> Result<Self> {
        Ok(Self {
            vertex: read_source(&paths.vertex)?,
            fragment: read_source(&paths.fragment)?,
            geometry: paths.geometry.as_deref().map(read_source).transpose()?,
        })
    }

    /// Stages to compile, in compile order. An empty geometry source counts
    /// as no geometry stage.
    pub(crate) fn stages(&self) -> impl Iterator<Item = (ShaderStage, &str)> {
        [
            Some((ShaderStage::Vertex, self.vertex.as_str())),
            Some((ShaderStage::Fragment, self.fragment.as_str())),
            self.geometry
                .as_deref()
                .filter(|g| !g.trim().is_empty())
                .map(|g| (ShaderStage::Geometry, g)),
        ]
        .into_iter()
        .flatten()
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| GfxError::file_read(path, e))
}
