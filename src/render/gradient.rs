//! Deterministic gradient compositor.
//!
//! `n` stops sit at `i / (n - 1)`. Pixels are sampled at their centers and interpolated in
//! premultiplied space, so identical inputs always produce identical bytes.

use crate::assets::color::Color;
use crate::foundation::error::{VerseArtError, VerseArtResult};
use crate::scene::config::GradientShape;

/// Paint a full `width`x`height` premultiplied RGBA8 gradient.
pub fn composite_gradient(
    width: u32,
    height: u32,
    colors: &[Color],
    shape: GradientShape,
) -> VerseArtResult<Vec<u8>> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| VerseArtError::render("gradient buffer size overflows"))?;
    let mut out = vec![0u8; len];
    paint_gradient(&mut out, width, height, colors, shape)?;
    Ok(out)
}

/// Overwrite every pixel of `dst` with the gradient.
pub(crate) fn paint_gradient(
    dst: &mut [u8],
    width: u32,
    height: u32,
    colors: &[Color],
    shape: GradientShape,
) -> VerseArtResult<()> {
    if width == 0 || height == 0 {
        return Err(VerseArtError::render("gradient size must be positive"));
    }
    if dst.len() != (width as usize) * (height as usize) * 4 {
        return Err(VerseArtError::render("gradient buffer length mismatch"));
    }
    let ramp = ColorRamp::new(colors)?;

    let w = f64::from(width);
    let h = f64::from(height);
    let row_bytes = (width as usize) * 4;
    for (y, row) in dst.chunks_exact_mut(row_bytes).enumerate() {
        let py = y as f64 + 0.5;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let t = shape_param(shape, x as f64 + 0.5, py, w, h);
            px.copy_from_slice(&ramp.sample(t));
        }
    }
    Ok(())
}

/// Gradient parameter in `[0, 1]` for the pixel center `(px, py)`.
fn shape_param(shape: GradientShape, px: f64, py: f64, w: f64, h: f64) -> f64 {
    let t = match shape {
        // Projection onto the (0,0) -> (w,h) axis.
        GradientShape::Linear => (px * w + py * h) / (w * w + h * h),
        GradientShape::Radial => {
            let radius = w.max(h) / 1.5;
            let dx = px - w * 0.5;
            let dy = py - h * 0.5;
            (dx * dx + dy * dy).sqrt() / radius
        }
    };
    t.clamp(0.0, 1.0)
}

struct ColorRamp {
    // Premultiplied, normalized 0..1.
    stops: Vec<[f64; 4]>,
}

impl ColorRamp {
    fn new(colors: &[Color]) -> VerseArtResult<Self> {
        if colors.len() < 2 {
            return Err(VerseArtError::render(format!(
                "gradient needs at least 2 colors, got {}",
                colors.len()
            )));
        }
        let stops = colors
            .iter()
            .map(|c| {
                let a = f64::from(c.a) / 255.0;
                [
                    f64::from(c.r) / 255.0 * a,
                    f64::from(c.g) / 255.0 * a,
                    f64::from(c.b) / 255.0 * a,
                    a,
                ]
            })
            .collect();
        Ok(Self { stops })
    }

    fn sample(&self, t: f64) -> [u8; 4] {
        let segments = self.stops.len() - 1;
        let pos = t * segments as f64;
        let i = (pos.floor() as usize).min(segments - 1);
        let f = pos - i as f64;
        let a = self.stops[i];
        let b = self.stops[i + 1];
        let mut out = [0u8; 4];
        for c in 0..4 {
            let v = a[c] + (b[c] - a[c]) * f;
            out[c] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/gradient.rs"]
mod tests;
