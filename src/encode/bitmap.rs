use crate::foundation::error::{VerseArtError, VerseArtResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::surface::Surface;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::str::FromStr;

/// Default quality factor for lossy formats.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Raster format requested for an export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless PNG with alpha.
    #[default]
    Png,
    /// Lossy JPEG; alpha is dropped.
    Jpeg,
}

impl ExportFormat {
    /// IANA media type.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Conventional file extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// `true` if the format takes a quality factor.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

impl FromStr for ExportFormat {
    type Err = VerseArtError;

    fn from_str(s: &str) -> VerseArtResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            other => Err(VerseArtError::validation(format!(
                "unsupported export format '{other}' (expected png or jpeg)"
            ))),
        }
    }
}

/// Encoded image bytes plus what they contain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedImage {
    /// Encoding of `bytes`.
    pub format: ExportFormat,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

/// Encode `surface` at `width`x`height` (resampling if the backing buffer differs).
pub(crate) fn encode_surface(
    surface: &Surface,
    width: u32,
    height: u32,
    format: ExportFormat,
    quality: u8,
) -> VerseArtResult<ExportedImage> {
    let bytes = encode_rgba8_premul(
        surface.data(),
        surface.width(),
        surface.height(),
        width,
        height,
        format,
        quality,
    )?;
    Ok(ExportedImage {
        format,
        width,
        height,
        bytes,
    })
}

/// Encode premultiplied RGBA8 pixels (`src_width`x`src_height`) into `format` at
/// `out_width`x`out_height`. `quality` is clamped to `1..=100` and only used by lossy formats.
pub fn encode_rgba8_premul(
    data: &[u8],
    src_width: u32,
    src_height: u32,
    out_width: u32,
    out_height: u32,
    format: ExportFormat,
    quality: u8,
) -> VerseArtResult<Vec<u8>> {
    if out_width == 0 || out_height == 0 {
        return Err(VerseArtError::export("export size must be positive"));
    }
    let mut straight = data.to_vec();
    unpremultiply_rgba8_in_place(&mut straight);
    let mut img = image::RgbaImage::from_raw(src_width, src_height, straight)
        .ok_or_else(|| VerseArtError::export("pixel buffer does not match surface size"))?;
    if (src_width, src_height) != (out_width, out_height) {
        img = image::imageops::resize(
            &img,
            out_width,
            out_height,
            image::imageops::FilterType::Triangle,
        );
    }

    let mut buf = Vec::new();
    match format {
        ExportFormat::Png => img
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| VerseArtError::export(format!("png encode failed: {e}")))?,
        ExportFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
            let mut enc =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
            enc.encode_image(&rgb)
                .map_err(|e| VerseArtError::export(format!("jpeg encode failed: {e}")))?;
        }
    }
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/bitmap.rs"]
mod tests;
