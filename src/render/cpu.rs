use crate::assets::color::Color;
use crate::foundation::error::{VerseArtError, VerseArtResult};
use crate::foundation::math::premul_over_in_place;
use crate::render::fit::{CardGeometry, CardPlan, PlacedText, plan_card};
use crate::render::gradient::paint_gradient;
use crate::render::surface::{Surface, surface_dims};
use crate::render::text::{FaceBook, TextStyle};
use crate::scene::config::RenderConfig;
use serde::{Deserialize, Serialize};

/// What a completed render produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    /// Logical card width.
    pub width: u32,
    /// Logical card height.
    pub height: u32,
    /// Backing buffer width (`ceil(width * pixel_density)`).
    pub backing_width: u32,
    /// Backing buffer height.
    pub backing_height: u32,
    /// Chosen body font size in logical pixels.
    pub font_size: f32,
    /// Number of wrapped body lines.
    pub lines: usize,
    /// `true` if the frame was drawn with built-in fallback glyphs.
    pub fallback_glyphs: bool,
}

/// Per-renderer decoration shared by every frame.
#[derive(Clone, Debug)]
pub(crate) struct CardStyle {
    pub(crate) branding: String,
    pub(crate) branding_opacity: f32,
}

/// Frame pipeline: gradient, fitted text, swap into the surface.
///
/// Frames are drawn into a spare buffer and only swapped in on success, so a failed render
/// leaves the previously completed frame intact.
#[derive(Default)]
pub(crate) struct CardRenderer {
    ctx: Option<vello_cpu::RenderContext>,
    spare: Option<vello_cpu::Pixmap>,
    text_layer: Option<vello_cpu::Pixmap>,
}

impl CardRenderer {
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(width = config.width, height = config.height, density = pixel_density)
    )]
    pub(crate) fn render(
        &mut self,
        surface: &mut Surface,
        config: &RenderConfig,
        pixel_density: f32,
        faces: &mut FaceBook,
        style: &CardStyle,
    ) -> VerseArtResult<FrameSummary> {
        config.validate()?;
        let (backing_w, backing_h) = backing_size(config.width, config.height, pixel_density)?;
        let (w16, h16) = surface_dims(backing_w, backing_h)?;

        let mut next = take_pixmap(&mut self.spare, w16, h16);
        paint_gradient(
            next.data_as_u8_slice_mut(),
            backing_w,
            backing_h,
            &config.palette_colors,
            config.gradient_shape,
        )?;

        let geometry = CardGeometry::new(config.width, config.height);
        let plan = plan_card(
            faces,
            &geometry,
            &config.text,
            &config.reference,
            &config.version_label,
            &style.branding,
        )?;

        let mut layer = take_pixmap(&mut self.text_layer, w16, h16);
        clear_pixmap(&mut layer);
        let base = kurbo::Affine::scale(f64::from(pixel_density));
        let ctx = context_for(&mut self.ctx, w16, h16);
        draw_plan(ctx, faces, &plan, config.text_color, style, base)?;
        ctx.flush();
        ctx.render_to_pixmap(&mut layer);
        premul_over_in_place(next.data_as_u8_slice_mut(), layer.data_as_u8_slice())?;
        self.text_layer = Some(layer);

        std::mem::swap(surface.pixmap_mut(), &mut next);
        self.spare = Some(next);

        let summary = FrameSummary {
            width: config.width,
            height: config.height,
            backing_width: backing_w,
            backing_height: backing_h,
            font_size: plan.body.font_size,
            lines: plan.body.lines.len(),
            fallback_glyphs: !faces.has_loaded_fonts(),
        };
        tracing::debug!(
            font_size = summary.font_size,
            lines = summary.lines,
            fallback = summary.fallback_glyphs,
            "frame rendered"
        );
        Ok(summary)
    }
}

/// Backing buffer size for a logical card at `pixel_density`.
pub(crate) fn backing_size(width: u32, height: u32, pixel_density: f32) -> VerseArtResult<(u32, u32)> {
    if !pixel_density.is_finite() || pixel_density <= 0.0 {
        return Err(VerseArtError::validation(
            "pixel density must be finite and > 0",
        ));
    }
    let scale = |v: u32| (f64::from(v) * f64::from(pixel_density)).ceil();
    let (w, h) = (scale(width), scale(height));
    if w > f64::from(u16::MAX) || h > f64::from(u16::MAX) {
        return Err(VerseArtError::validation(format!(
            "backing buffer {w}x{h} is too large"
        )));
    }
    Ok((w as u32, h as u32))
}

fn take_pixmap(slot: &mut Option<vello_cpu::Pixmap>, width: u16, height: u16) -> vello_cpu::Pixmap {
    match slot.take() {
        Some(p) if p.width() == width && p.height() == height => p,
        _ => vello_cpu::Pixmap::new(width, height),
    }
}

fn context_for(
    slot: &mut Option<vello_cpu::RenderContext>,
    width: u16,
    height: u16,
) -> &mut vello_cpu::RenderContext {
    let reusable = slot
        .as_ref()
        .is_some_and(|c| c.width() == width && c.height() == height);
    if !reusable {
        *slot = None;
    }
    let ctx = slot.get_or_insert_with(|| vello_cpu::RenderContext::new(width, height));
    ctx.reset();
    ctx
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn draw_plan(
    ctx: &mut vello_cpu::RenderContext,
    faces: &mut FaceBook,
    plan: &CardPlan,
    color: Color,
    style: &CardStyle,
    base: kurbo::Affine,
) -> VerseArtResult<()> {
    for run in plan
        .body_lines
        .iter()
        .chain(plan.reference.iter())
        .chain(plan.version_label.iter())
    {
        draw_run(ctx, faces, run, color, base)?;
    }

    if let Some(branding) = &plan.branding {
        ctx.push_opacity_layer(style.branding_opacity.clamp(0.0, 1.0));
        let drawn = draw_run(ctx, faces, branding, color, base);
        ctx.pop_layer();
        drawn?;
    }
    Ok(())
}

fn draw_run(
    ctx: &mut vello_cpu::RenderContext,
    faces: &mut FaceBook,
    run: &PlacedText,
    color: Color,
    base: kurbo::Affine,
) -> VerseArtResult<()> {
    let transform = base * kurbo::Affine::translate((f64::from(run.x), f64::from(run.y)));
    let style = TextStyle {
        size_px: run.size_px,
        weight: run.weight,
        color,
    };
    faces
        .face_mut(run.weight)
        .draw(ctx, &run.text, &style, affine_to_cpu(transform))
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
