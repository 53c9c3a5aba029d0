//! Driver seam.
//!
//! Every GPU call made by the resource wrappers goes through [`GlDevice`]:
//! - `GlowDevice` forwards to a live `glow` context
//! - the test-only mock keeps objects in maps and exposes inspection helpers
//!
//! Object names are typed (`ProgramId`, `TextureId`, ...) and never zero;
//! "no object" is `Option::None`.

mod driver;
mod glow_device;
mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use driver::GlDevice;
pub use glow_device::GlowDevice;
pub use types::{
    AttribType, BufferId, BufferTarget, BufferUsage, CubeFace, FilterMode, PixelFormat, PixelType,
    ProgramId, ShaderId, ShaderStage, TextureId, TextureParameter, TextureTarget, UniformLocation,
    VertexArrayId, WrapMode,
};
