use core::fmt;
use core::num::NonZeroU32;

macro_rules! gl_object_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        pub struct $name(pub NonZeroU32);

        impl $name {
            /// Raw driver name.
            #[inline]
            pub fn get(self) -> u32 {
                self.0.get()
            }
        }
    };
}

gl_object_id!(
    /// Driver name of a shader stage object.
    ShaderId
);
gl_object_id!(
    /// Driver name of a linked (or linking) program object.
    ProgramId
);
gl_object_id!(
    /// Driver name of a texture object.
    TextureId
);
gl_object_id!(
    /// Driver name of a buffer object.
    BufferId
);
gl_object_id!(
    /// Driver name of a vertex array object.
    VertexArrayId
);

/// Resolved uniform location. Absent uniforms are `None` at the call sites,
/// never a `-1` sentinel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation(pub u32);

/// One compilable unit within a program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "VERTEX",
            Self::Fragment => "FRAGMENT",
            Self::Geometry => "GEOMETRY",
        })
    }
}

/// Cubemap face, in upload order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];
}

/// Bind point / upload target for texture calls.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureTarget {
    Texture2D,
    CubeMap,
    /// Image upload target for a single cubemap face.
    CubeFace(CubeFace),
}

/// Pixel layout of client data, and (for uploads) the internal storage format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    Red,
    Rg,
    Rgb,
    Rgba,
    /// Internal format only.
    Srgb,
    /// Internal format only.
    SrgbAlpha,
    Depth,
}

impl PixelFormat {
    /// Upload format for decoded 8-bit images with `channels` components.
    ///
    /// `srgb` only affects 3 and 4 channel images. Unknown counts fall back
    /// to RGB with an error log.
    pub fn internal_for_channels(channels: u8, srgb: bool) -> Self {
        match channels {
            1 => Self::Red,
            2 => Self::Rg,
            3 if srgb => Self::Srgb,
            3 => Self::Rgb,
            4 if srgb => Self::SrgbAlpha,
            4 => Self::Rgba,
            n => {
                log::error!("unsupported channel count {n}; using RGB");
                Self::Rgb
            }
        }
    }

    /// Client data layout for `channels` components.
    pub fn for_channels(channels: u8) -> Self {
        Self::internal_for_channels(channels, false)
    }

    /// Components per pixel.
    pub fn components(self) -> u8 {
        match self {
            Self::Red | Self::Depth => 1,
            Self::Rg => 2,
            Self::Rgb | Self::Srgb => 3,
            Self::Rgba | Self::SrgbAlpha => 4,
        }
    }

    /// Bytes the driver reads for a `width` x `height` upload of this
    /// layout, with rows tightly packed (`UNPACK_ALIGNMENT` 1). Saturates
    /// instead of overflowing.
    pub fn data_len(self, ty: PixelType, width: u32, height: u32) -> usize {
        (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(self.components() as usize * ty.size() as usize)
    }
}

/// Component type of client pixel data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PixelType {
    UnsignedByte,
    UnsignedShort,
    Float,
}

impl PixelType {
    /// Size of one component in bytes.
    pub const fn size(self) -> u32 {
        match self {
            Self::UnsignedByte => 1,
            Self::UnsignedShort => 2,
            Self::Float => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum WrapMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl FilterMode {
    /// Whether sampling with this filter reads mip levels above 0.
    pub fn uses_mipmaps(self) -> bool {
        !matches!(self, Self::Nearest | Self::Linear)
    }
}

/// A single sampling parameter write.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TextureParameter {
    WrapS(WrapMode),
    WrapT(WrapMode),
    WrapR(WrapMode),
    MinFilter(FilterMode),
    MagFilter(FilterMode),
    /// Already clamped to [`GlDevice::max_anisotropy`](super::GlDevice::max_anisotropy).
    MaxAnisotropy(f32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

/// Component type of a vertex attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttribType {
    Float,
    UnsignedInt,
    UnsignedByte,
}

impl AttribType {
    /// Size of one component in bytes.
    pub const fn size(self) -> u32 {
        match self {
            Self::Float | Self::UnsignedInt => 4,
            Self::UnsignedByte => 1,
        }
    }
}
