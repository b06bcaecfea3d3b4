use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use tessera_core::MediaType;

use crate::error::ConvertError;

/// Pluggable raster image codec for the `image/*` conversion family.
///
/// The engine's responsibility ends at dispatch: it selects the target
/// encoder and propagates codec failures. Implementors provide the
/// actual pixel transcoding.
pub trait RasterCodec: Send + Sync {
    /// Re-encode raster pixel data into the target image container
    /// format.
    fn transcode(&self, data: &[u8], target: MediaType) -> Result<Vec<u8>, ConvertError>;
}

/// Default [`RasterCodec`] backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCodec;

impl ImageCodec {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn target_format(target: MediaType) -> Result<ImageFormat, ConvertError> {
        match target {
            MediaType::Png => Ok(ImageFormat::Png),
            MediaType::Jpeg => Ok(ImageFormat::Jpeg),
            MediaType::Webp => Ok(ImageFormat::WebP),
            MediaType::Gif => Ok(ImageFormat::Gif),
            MediaType::Avif => Ok(ImageFormat::Avif),
            other => Err(ConvertError::Codec(format!(
                "{other} is not a raster image target"
            ))),
        }
    }
}

impl RasterCodec for ImageCodec {
    fn transcode(&self, data: &[u8], target: MediaType) -> Result<Vec<u8>, ConvertError> {
        let format = Self::target_format(target)?;

        let decoded = image::load_from_memory(data)
            .map_err(|e| ConvertError::Codec(format!("failed to decode source image: {e}")))?;

        // JPEG has no alpha channel; every other encoder here takes RGBA.
        let normalized = if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(decoded.to_rgb8())
        } else {
            DynamicImage::ImageRgba8(decoded.to_rgba8())
        };

        let mut out = Vec::new();
        normalized
            .write_to(&mut Cursor::new(&mut out), format)
            .map_err(|e| ConvertError::Codec(format!("failed to encode {target}: {e}")))?;

        Ok(out)
    }
}
