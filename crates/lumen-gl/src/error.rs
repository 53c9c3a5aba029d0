use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::device::ShaderStage;

/// Failures surfaced by GPU resource construction and reload.
///
/// Uniform and alias lookups that miss are not errors; they are logged and
/// the call degrades to a no-op or `None`.
#[derive(Debug)]
pub enum GfxError {
    /// A shader source or image file could not be read.
    FileRead { path: PathBuf, source: io::Error },
    /// One shader stage failed to compile. `log` is the driver info log.
    Compile { stage: ShaderStage, log: String },
    /// The stages compiled but the program failed to link.
    Link { log: String },
    /// An image file was read but could not be decoded.
    Load { path: PathBuf, reason: String },
    /// The driver refused to create an object.
    Device(String),
    /// The operation is not defined for this resource (e.g. cubemap reload).
    Unsupported(&'static str),
    /// A host pixel slice is shorter than the upload would read.
    PixelData { expected: usize, actual: usize },
}

impl GfxError {
    pub(crate) fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead { path: path.into(), source }
    }

    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Load { path: path.into(), reason: reason.into() }
    }
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileRead { path, source } => {
                write!(f, "failed to read '{}': {}", path.display(), source)
            }
            Self::Compile { stage, log } => {
                write!(f, "{} shader failed to compile:\n{}", stage, log.trim_end())
            }
            Self::Link { log } => write!(f, "program failed to link:\n{}", log.trim_end()),
            Self::Load { path, reason } => {
                write!(f, "failed to load image '{}': {}", path.display(), reason)
            }
            Self::Device(msg) => write!(f, "driver error: {msg}"),
            Self::Unsupported(what) => write!(f, "unsupported: {what}"),
            Self::PixelData { expected, actual } => {
                write!(f, "pixel data holds {actual} bytes, {expected} needed")
            }
        }
    }
}

impl std::error::Error for GfxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T, E = GfxError> = std::result::Result<T, E>;
