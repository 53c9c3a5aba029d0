use std::cell::Cell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::device::{
    CubeFace, GlDevice, PixelFormat, PixelType, TextureId, TextureParameter, TextureTarget,
};
use crate::error::{GfxError, Result};

use super::decode::{decode, DecodedImage};
use super::params::TextureParams;

/// Shared handle handed out by [`TextureRegistry`](crate::registry::TextureRegistry).
pub type SharedTexture = Rc<Texture>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureKind {
    Plane2D,
    CubeMap,
}

impl TextureKind {
    /// Bind point used for this kind.
    pub fn target(self) -> TextureTarget {
        match self {
            Self::Plane2D => TextureTarget::Texture2D,
            Self::CubeMap => TextureTarget::CubeMap,
        }
    }
}

/// Storage description for [`Texture::from_memory`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub internal_format: PixelFormat,
    pub format: PixelFormat,
    pub pixel_type: PixelType,
}

impl TextureDesc {
    /// 8-bit RGBA storage.
    pub fn rgba8(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            internal_format: PixelFormat::Rgba,
            format: PixelFormat::Rgba,
            pixel_type: PixelType::UnsignedByte,
        }
    }
}

/// Texel rectangle for [`Texture::update_data`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, Default)]
struct TextureState {
    id: Option<TextureId>,
    width: u32,
    height: u32,
    channels: u8,
}

/// A GPU texture: a 2D image from a file or memory, or a six-face cubemap.
///
/// Only file-backed 2D textures can [`reload`](Self::reload). The texture is
/// released on drop.
pub struct Texture {
    device: Rc<dyn GlDevice>,
    kind: TextureKind,
    path: Option<PathBuf>,
    params: TextureParams,
    state: Cell<TextureState>,
}

impl Texture {
    /// Decodes `path` and uploads it as a 2D texture.
    pub fn from_file(
        device: Rc<dyn GlDevice>,
        path: impl Into<PathBuf>,
        params: TextureParams,
    ) -> Result<Self> {
        let path = path.into();
        let image = decode(&path, params.flip_vertically)?;
        let id = upload_2d(&*device, &image, &params)?;
        log::info!(
            "loaded texture {} from {} ({}x{}, {} channels)",
            id.get(),
            path.display(),
            image.width,
            image.height,
            image.channels
        );

        Ok(Self {
            device,
            kind: TextureKind::Plane2D,
            path: Some(path),
            params,
            state: Cell::new(TextureState {
                id: Some(id),
                width: image.width,
                height: image.height,
                channels: image.channels,
            }),
        })
    }

    /// Uploads caller-provided pixels as-is. `data: None` allocates storage
    /// only, to be filled by [`update_data`](Self::update_data) or used as a
    /// render target.
    pub fn from_memory(
        device: Rc<dyn GlDevice>,
        desc: &TextureDesc,
        data: Option<&[u8]>,
        params: TextureParams,
    ) -> Result<Self> {
        if let Some(data) = data {
            check_pixel_data(desc.format, desc.pixel_type, desc.width, desc.height, data)?;
        }
        let target = TextureTarget::Texture2D;
        let id = device.create_texture().map_err(GfxError::Device)?;

        device.bind_texture(target, Some(id));
        device.tex_image_2d(
            target,
            desc.internal_format,
            desc.width,
            desc.height,
            desc.format,
            desc.pixel_type,
            data,
        );
        let mipmaps = params.generate_mipmaps && data.is_some();
        if mipmaps {
            device.generate_mipmap(target);
        }
        apply_params(&*device, target, &TextureParams { generate_mipmaps: mipmaps, ..params });
        device.bind_texture(target, None);

        log::debug!("created texture {} ({}x{}) from memory", id.get(), desc.width, desc.height);
        Ok(Self {
            device,
            kind: TextureKind::Plane2D,
            path: None,
            params,
            state: Cell::new(TextureState {
                id: Some(id),
                width: desc.width,
                height: desc.height,
                channels: desc.format.components(),
            }),
        })
    }

    /// Builds a cubemap from six files in +X, -X, +Y, -Y, +Z, -Z order with
    /// [`TextureParams::cubemap`] settings.
    pub fn cubemap<P: AsRef<Path>>(device: Rc<dyn GlDevice>, faces: [P; 6]) -> Result<Self> {
        Self::cubemap_with_params(device, faces, TextureParams::cubemap())
    }

    /// Builds a cubemap from six files in +X, -X, +Y, -Y, +Z, -Z order.
    ///
    /// Every face is decoded before anything is created on the GPU; if any
    /// face fails, or the faces differ in size, the whole construction fails
    /// with [`GfxError::Load`].
    pub fn cubemap_with_params<P: AsRef<Path>>(
        device: Rc<dyn GlDevice>,
        faces: [P; 6],
        params: TextureParams,
    ) -> Result<Self> {
        let mut images = Vec::with_capacity(CubeFace::ALL.len());
        for (face, path) in CubeFace::ALL.into_iter().zip(&faces) {
            let path = path.as_ref();
            let image = decode(path, params.flip_vertically)
                .map_err(|err| GfxError::load(path, format!("cubemap face {face:?}: {err}")))?;
            images.push(image);
        }

        let first = &images[0];
        let (width, height, channels) = (first.width, first.height, first.channels);
        for (face, (image, path)) in CubeFace::ALL.into_iter().zip(images.iter().zip(&faces)) {
            if (image.width, image.height) != (width, height) {
                return Err(GfxError::load(
                    path.as_ref(),
                    format!(
                        "cubemap face {face:?} is {}x{}, expected {width}x{height}",
                        image.width, image.height
                    ),
                ));
            }
        }

        let target = TextureTarget::CubeMap;
        let id = device.create_texture().map_err(GfxError::Device)?;
        device.bind_texture(target, Some(id));
        for (face, image) in CubeFace::ALL.into_iter().zip(&images) {
            device.tex_image_2d(
                TextureTarget::CubeFace(face),
                PixelFormat::internal_for_channels(image.channels, params.srgb),
                image.width,
                image.height,
                PixelFormat::for_channels(image.channels),
                PixelType::UnsignedByte,
                Some(&image.pixels),
            );
        }
        if params.generate_mipmaps {
            device.generate_mipmap(target);
        }
        apply_params(&*device, target, &params);
        device.bind_texture(target, None);

        log::info!(
            "loaded cubemap {} from {} ({width}x{height})",
            id.get(),
            faces[0].as_ref().display()
        );
        Ok(Self {
            device,
            kind: TextureKind::CubeMap,
            path: None,
            params,
            state: Cell::new(TextureState { id: Some(id), width, height, channels }),
        })
    }

    /// Raw driver name, `0` once destroyed.
    pub fn handle(&self) -> u32 {
        self.state.get().id.map_or(0, TextureId::get)
    }

    pub fn is_valid(&self) -> bool {
        self.state.get().id.is_some()
    }

    pub fn width(&self) -> u32 {
        self.state.get().width
    }

    pub fn height(&self) -> u32 {
        self.state.get().height
    }

    pub fn channels(&self) -> u8 {
        self.state.get().channels
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    /// Source file, `None` for memory textures and cubemaps.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn params(&self) -> &TextureParams {
        &self.params
    }

    /// Binds to texture unit `unit` (0-based).
    pub fn bind(&self, unit: u32) {
        let Some(id) = self.state.get().id else {
            log::warn!("attempted to bind a destroyed texture");
            return;
        };
        self.device.active_texture(unit);
        self.device.bind_texture(self.kind.target(), Some(id));
    }

    /// Clears this texture's bind point on the active unit.
    pub fn unbind(&self) {
        self.device.bind_texture(self.kind.target(), None);
    }

    /// Replaces a sub-rectangle of level 0. Region bounds are not checked;
    /// `data` must cover the region. Cubemaps are rejected.
    pub fn update_data(
        &self,
        region: Region,
        format: PixelFormat,
        pixel_type: PixelType,
        data: &[u8],
    ) -> Result<()> {
        if self.kind == TextureKind::CubeMap {
            return Err(GfxError::Unsupported("sub-image updates on a cubemap"));
        }
        check_pixel_data(format, pixel_type, region.width, region.height, data)?;
        let Some(id) = self.state.get().id else {
            log::warn!("update_data on a destroyed texture");
            return Ok(());
        };

        let target = TextureTarget::Texture2D;
        self.device.bind_texture(target, Some(id));
        self.device.tex_sub_image_2d(
            target,
            region.x,
            region.y,
            region.width,
            region.height,
            format,
            pixel_type,
            data,
        );
        Ok(())
    }

    /// Re-decodes the source file and swaps the new texture in.
    ///
    /// The old texture is deleted only after the new one is uploaded; on any
    /// failure the current texture stays valid and the error is returned.
    /// Cubemaps and memory textures have no reloadable source.
    pub fn reload(&self) -> Result<()> {
        if self.kind == TextureKind::CubeMap {
            return Err(GfxError::Unsupported("cubemap textures cannot be reloaded"));
        }
        let Some(path) = &self.path else {
            return Err(GfxError::Unsupported("texture was created from memory"));
        };

        let fresh = decode(path, self.params.flip_vertically).and_then(|image| {
            upload_2d(&*self.device, &image, &self.params).map(|id| (id, image))
        });

        match fresh {
            Ok((id, image)) => {
                let old = self.state.replace(TextureState {
                    id: Some(id),
                    width: image.width,
                    height: image.height,
                    channels: image.channels,
                });
                if let Some(old) = old.id {
                    self.device.delete_texture(old);
                }
                log::info!("reloaded texture {} from {}", id.get(), path.display());
                Ok(())
            }
            Err(err) => {
                log::error!(
                    "reload of {} failed, keeping previous texture: {err}",
                    path.display()
                );
                Err(err)
            }
        }
    }

    /// Regenerates the mip chain from level 0, e.g. after `update_data`.
    pub fn generate_mipmaps(&self) {
        let Some(id) = self.state.get().id else { return };
        let target = self.kind.target();
        self.device.bind_texture(target, Some(id));
        self.device.generate_mipmap(target);
    }

    /// Writes one sampling parameter. Anisotropy is clamped like at
    /// creation; [`params`](Self::params) keeps the creation-time values.
    pub fn set_parameter(&self, param: TextureParameter) {
        let Some(id) = self.state.get().id else { return };
        let param = match param {
            TextureParameter::MaxAnisotropy(level) => {
                match clamp_anisotropy(&*self.device, level) {
                    Some(level) => TextureParameter::MaxAnisotropy(level),
                    None => return,
                }
            }
            other => other,
        };
        let target = self.kind.target();
        self.device.bind_texture(target, Some(id));
        self.device.tex_parameter(target, param);
    }

    /// Releases the GPU texture now, leaving this object invalid.
    pub fn destroy(&self) {
        let state = self.state.take();
        if let Some(id) = state.id {
            self.device.delete_texture(id);
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if let Some(id) = self.state.get_mut().id.take() {
            self.device.delete_texture(id);
        }
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.get();
        f.debug_struct("Texture")
            .field("handle", &self.handle())
            .field("kind", &self.kind)
            .field("size", &(state.width, state.height))
            .field("channels", &state.channels)
            .field("path", &self.path)
            .finish()
    }
}

fn upload_2d(device: &dyn GlDevice, image: &DecodedImage, params: &TextureParams) -> Result<TextureId> {
    let target = TextureTarget::Texture2D;
    let id = device.create_texture().map_err(GfxError::Device)?;

    device.bind_texture(target, Some(id));
    device.tex_image_2d(
        target,
        PixelFormat::internal_for_channels(image.channels, params.srgb),
        image.width,
        image.height,
        PixelFormat::for_channels(image.channels),
        PixelType::UnsignedByte,
        Some(&image.pixels),
    );
    if params.generate_mipmaps {
        device.generate_mipmap(target);
    }
    apply_params(device, target, params);
    device.bind_texture(target, None);

    Ok(id)
}

/// Writes wrap, filter and anisotropy state for the texture bound at `target`.
fn apply_params(device: &dyn GlDevice, target: TextureTarget, params: &TextureParams) {
    device.tex_parameter(target, TextureParameter::WrapS(params.wrap_s));
    device.tex_parameter(target, TextureParameter::WrapT(params.wrap_t));
    if target == TextureTarget::CubeMap {
        device.tex_parameter(target, TextureParameter::WrapR(params.wrap_r));
    }
    device.tex_parameter(target, TextureParameter::MinFilter(params.effective_min_filter()));
    device.tex_parameter(target, TextureParameter::MagFilter(params.mag_filter));

    if params.anisotropy > 0.0 {
        if let Some(level) = clamp_anisotropy(device, params.anisotropy) {
            device.tex_parameter(target, TextureParameter::MaxAnisotropy(level));
        }
    }
}

/// `None` when the driver has no anisotropic filtering.
fn clamp_anisotropy(device: &dyn GlDevice, requested: f32) -> Option<f32> {
    let max = device.max_anisotropy();
    if max < 1.0 {
        log::debug!("anisotropic filtering unavailable; ignoring level {requested}");
        return None;
    }
    if requested > max {
        log::debug!("anisotropy {requested} clamped to driver maximum {max}");
    }
    Some(requested.clamp(1.0, max))
}

/// Rows are tightly packed (`UNPACK_ALIGNMENT` is 1).
fn check_pixel_data(
    format: PixelFormat,
    ty: PixelType,
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<()> {
    let expected = format.data_len(ty, width, height);
    if data.len() < expected {
        return Err(GfxError::PixelData { expected, actual: data.len() });
    }
    Ok(())
}
