use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageError, Pixel};

use crate::error::{GfxError, Result};

/// 8-bit pixels ready for upload, tightly packed.
#[derive(Debug)]
pub(crate) struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

/// Decodes `path`, keeping the file's channel count (1 to 4) and converting
/// any bit depth to 8 bits per channel.
pub(crate) fn decode(path: &Path, flip_vertically: bool) -> Result<DecodedImage> {
    let image = image::open(path).map_err(|err| match err {
        ImageError::IoError(source) => GfxError::file_read(path, source),
        other => GfxError::load(path, other.to_string()),
    })?;
    let image = if flip_vertically { image.flipv() } else { image };

    let channels = image.color().channel_count();
    let (width, height, pixels) = normalize(image, channels);
    if width == 0 || height == 0 {
        return Err(GfxError::load(path, "image has no pixels"));
    }

    log::debug!("decoded {} ({width}x{height}, {channels} channels)", path.display());
    Ok(DecodedImage { width, height, channels: channels.clamp(1, 4), pixels })
}

fn normalize(image: DynamicImage, channels: u8) -> (u32, u32, Vec<u8>) {
    match channels {
        1 => into_parts(image.into_luma8()),
        2 => into_parts(image.into_luma_alpha8()),
        3 => into_parts(image.into_rgb8()),
        _ => into_parts(image.into_rgba8()),
    }
}

fn into_parts<P: Pixel<Subpixel = u8>>(buffer: ImageBuffer<P, Vec<u8>>) -> (u32, u32, Vec<u8>) {
    let (width, height) = buffer.dimensions();
    (width, height, buffer.into_raw())
}
