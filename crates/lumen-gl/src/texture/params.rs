use crate::device::{FilterMode, WrapMode};

/// Sampling and upload options applied when a texture is created.
///
/// ```ignore
/// let params = TextureParams { srgb: true, anisotropy: 8.0, ..Default::default() };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureParams {
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    /// Only applied to cubemaps.
    pub wrap_r: WrapMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub generate_mipmaps: bool,
    /// Flip decoded images so row 0 is the bottom row, as GL expects.
    pub flip_vertically: bool,
    /// Store 3 and 4 channel images in an sRGB internal format.
    pub srgb: bool,
    /// Requested anisotropy level. `0.0` leaves it untouched; larger values
    /// are clamped to what the driver reports.
    pub anisotropy: f32,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            wrap_r: WrapMode::Repeat,
            min_filter: FilterMode::LinearMipmapLinear,
            mag_filter: FilterMode::Linear,
            generate_mipmaps: true,
            flip_vertically: true,
            srgb: false,
            anisotropy: 0.0,
        }
    }
}

impl TextureParams {
    /// Skybox defaults: clamped edges, linear filtering, no mipmaps, faces
    /// uploaded as stored.
    pub fn cubemap() -> Self {
        Self {
            wrap_s: WrapMode::ClampToEdge,
            wrap_t: WrapMode::ClampToEdge,
            wrap_r: WrapMode::ClampToEdge,
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            generate_mipmaps: false,
            flip_vertically: false,
            ..Self::default()
        }
    }

    /// Minification filter that is safe to use with these settings.
    ///
    /// A mipmapped filter without mip levels samples an incomplete texture,
    /// so it degrades to the matching single-level filter.
    pub(crate) fn effective_min_filter(&self) -> FilterMode {
        if self.generate_mipmaps || !self.min_filter.uses_mipmaps() {
            return self.min_filter;
        }
        let fallback = match self.min_filter {
            FilterMode::NearestMipmapNearest | FilterMode::NearestMipmapLinear => {
                FilterMode::Nearest
            }
            _ => FilterMode::Linear,
        };
        log::warn!(
            "min filter {:?} needs mipmaps but mipmap generation is off; using {:?}",
            self.min_filter,
            fallback
        );
        fallback
    }
}
