//! Lumen GL crate.
//!
//! RAII wrappers for OpenGL objects (programs, textures, buffers, vertex
//! arrays) and alias-keyed registries that hot-reload programs and textures
//! from disk.
//!
//! Every GPU call goes through a [`device::GlDevice`]; build a
//! [`device::GlowDevice`] from the current context and share it as
//! `Rc<dyn GlDevice>`. Everything here is single-threaded and must stay on
//! the thread that owns the context.

pub mod device;
pub mod error;
pub mod logging;

pub mod buffer;
pub mod registry;
pub mod shader;
pub mod texture;

#[cfg(test)]
mod testing;

pub use error::{GfxError, Result};
