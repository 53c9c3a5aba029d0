//! Textures.
//!
//! Images are decoded with the `image` crate into 8-bit R, RG, RGB or RGBA
//! data and uploaded through the device. Sampling state comes from
//! [`TextureParams`].

mod decode;
mod params;
#[allow(clippy::module_inception)]
mod texture;

pub use params::TextureParams;
pub use texture::{Region, SharedTexture, Texture, TextureDesc, TextureKind};
