use crate::foundation::error::{VerseArtError, VerseArtResult};

/// Off-screen premultiplied RGBA8 pixel buffer.
///
/// A surface starts life inside a [`VisualElement`] and is moved into the render worker exactly
/// once. After the move only the worker can touch its pixels.
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> VerseArtResult<Self> {
        let (w, h) = surface_dims(width, height)?;
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Width in backing pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Height in backing pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }
}

pub(crate) fn surface_dims(width: u32, height: u32) -> VerseArtResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(VerseArtError::validation(format!(
            "surface size must be positive, got {width}x{height}"
        )));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| VerseArtError::validation("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| VerseArtError::validation("surface height exceeds u16"))?;
    Ok((w, h))
}

/// The caller-side visual element that owns a surface until it is handed to the renderer.
#[derive(Debug)]
pub struct VisualElement {
    width: u32,
    height: u32,
    pixel_density: f32,
    surface: Option<Surface>,
}

impl VisualElement {
    /// Create an element with a `width`x`height` surface at pixel density 1.
    pub fn new(width: u32, height: u32) -> VerseArtResult<Self> {
        Ok(Self {
            width,
            height,
            pixel_density: 1.0,
            surface: Some(Surface::new(width, height)?),
        })
    }

    /// Set the device pixel density used for the backing buffer (must be finite and > 0).
    pub fn with_pixel_density(mut self, density: f32) -> VerseArtResult<Self> {
        if !density.is_finite() || density <= 0.0 {
            return Err(VerseArtError::validation(
                "pixel density must be finite and > 0",
            ));
        }
        self.pixel_density = density;
        Ok(self)
    }

    /// Logical width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Logical height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Device pixel density.
    pub fn pixel_density(&self) -> f32 {
        self.pixel_density
    }

    /// `true` once the surface has been handed off.
    pub fn is_transferred(&self) -> bool {
        self.surface.is_none()
    }

    /// Move the surface out. Fails if it was already transferred.
    pub fn transfer_surface(&mut self) -> VerseArtResult<Surface> {
        self.surface.take().ok_or_else(|| {
            VerseArtError::surface_transfer("surface has already been transferred")
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
