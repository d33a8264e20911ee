//! Glyph faces used to measure and draw card text.
//!
//! Two implementations share one measuring contract:
//!
//! - [`FallbackFace`]: built-in deterministic metrics, drawn as solid glyph boxes. Always
//!   available, so a render never waits on fonts.
//! - `ParleyFace`: a loaded font shaped with `parley` and rasterized with `vello_cpu` glyph runs.

use crate::assets::color::Color;
use crate::assets::fonts::LoadedFonts;
use crate::foundation::error::{VerseArtError, VerseArtResult};
use std::sync::Arc;

/// Size of a single shaped line of text, in logical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtent {
    /// Advance width of the line.
    pub width: f32,
    /// Height of the line box (ascent + descent + gap).
    pub height: f32,
}

/// Anything that can report the width of a run of text at a given size.
pub trait TextMeasure {
    /// Measure `text` laid out on a single line at `size_px`.
    fn measure(&mut self, text: &str, size_px: f32) -> VerseArtResult<TextExtent>;
}

/// Stroke weight requested for a piece of card text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Regular,
    /// Bold weight.
    Bold,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct TextStyle {
    pub(crate) size_px: f32,
    pub(crate) weight: FontWeight,
    pub(crate) color: Color,
}

/// A face that can also put glyphs onto a `vello_cpu` context.
pub(crate) trait GlyphFace: TextMeasure {
    /// Draw `text` with its line box top-left at the origin of `transform`.
    fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        style: &TextStyle,
        transform: vello_cpu::kurbo::Affine,
    ) -> VerseArtResult<()>;
}

fn check_size(size_px: f32) -> VerseArtResult<()> {
    if !size_px.is_finite() || size_px <= 0.0 {
        return Err(VerseArtError::render(
            "text size_px must be finite and > 0",
        ));
    }
    Ok(())
}

/// Deterministic metrics used until real fonts are available.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackFace;

impl FallbackFace {
    const LINE_BOX_EM: f32 = 1.2;
    const BASELINE_EM: f32 = 0.95;

    /// Advance of `c` in ems.
    fn advance_em(c: char) -> f32 {
        let cp = u32::from(c);
        match c {
            ' ' | '\u{a0}' => 0.25,
            '\t' => 1.0,
            '.' | ',' | ';' | ':' | '!' | '\'' | '"' | '|' | 'i' | 'l' | 'j' | 'I' => 0.28,
            'm' | 'w' | 'M' | 'W' => 0.8,
            'A'..='Z' => 0.66,
            '0'..='9' => 0.55,
            _ if is_zero_width(cp) => 0.0,
            _ if is_wide(cp) => 1.0,
            _ => 0.52,
        }
    }

    fn glyph_height_em(c: char) -> f32 {
        if c.is_ascii_lowercase() { 0.5 } else { 0.7 }
    }
}

fn is_zero_width(cp: u32) -> bool {
    matches!(
        cp,
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x200B..=0x200F | 0x20D0..=0x20FF
            | 0xFE00..=0xFE0F | 0xFE20..=0xFE2F
    )
}

fn is_wide(cp: u32) -> bool {
    matches!(
        cp,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x1F300..=0x1F64F
            | 0x1F900..=0x1F9FF
            | 0x20000..=0x3FFFD
    )
}

impl TextMeasure for FallbackFace {
    fn measure(&mut self, text: &str, size_px: f32) -> VerseArtResult<TextExtent> {
        check_size(size_px)?;
        let em: f32 = text.chars().map(Self::advance_em).sum();
        Ok(TextExtent {
            width: em * size_px,
            height: Self::LINE_BOX_EM * size_px,
        })
    }
}

impl GlyphFace for FallbackFace {
    fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        style: &TextStyle,
        transform: vello_cpu::kurbo::Affine,
    ) -> VerseArtResult<()> {
        check_size(style.size_px)?;
        let size = f64::from(style.size_px);
        let inset = match style.weight {
            FontWeight::Regular => 0.12,
            FontWeight::Bold => 0.05,
        };
        let baseline = size * f64::from(Self::BASELINE_EM);

        ctx.set_transform(transform);
        ctx.set_paint(style.color.to_cpu());
        let mut pen = 0.0f64;
        for c in text.chars() {
            let adv = f64::from(Self::advance_em(c)) * size;
            if adv > 0.0 && !c.is_whitespace() {
                let top = baseline - f64::from(Self::glyph_height_em(c)) * size;
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    pen + adv * inset,
                    top,
                    pen + adv * (1.0 - inset),
                    baseline,
                ));
            }
            pen += adv;
        }
        Ok(())
    }
}

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Color> for TextBrushRgba8 {
    fn from(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// A single loaded font, shaped with Parley.
pub(crate) struct ParleyFace {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl ParleyFace {
    pub(crate) fn new(bytes: &Arc<Vec<u8>>) -> VerseArtResult<Self> {
        // Both blobs share the one font buffer.
        let data: Arc<dyn AsRef<[u8]> + Send + Sync> = bytes.clone();
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::new(data.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            VerseArtError::font("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| VerseArtError::font("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::new(data), 0),
        })
    }

    pub(crate) fn family_name(&self) -> &str {
        &self.family_name
    }

    fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> VerseArtResult<parley::Layout<TextBrushRgba8>> {
        check_size(size_px)?;
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

impl TextMeasure for ParleyFace {
    fn measure(&mut self, text: &str, size_px: f32) -> VerseArtResult<TextExtent> {
        let layout = self.layout(text, size_px, TextBrushRgba8::default())?;
        Ok(TextExtent {
            width: layout.width(),
            height: layout.height(),
        })
    }
}

impl GlyphFace for ParleyFace {
    fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        style: &TextStyle,
        transform: vello_cpu::kurbo::Affine,
    ) -> VerseArtResult<()> {
        let layout = self.layout(text, style.size_px, style.color.into())?;
        ctx.set_transform(transform);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                // Positioned glyphs carry the pen advance and the line baseline.
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

/// The faces a worker can draw with: fallback always, loaded fonts once they arrive.
#[derive(Default)]
pub(crate) struct FaceBook {
    fallback: FallbackFace,
    regular: Option<ParleyFace>,
    bold: Option<ParleyFace>,
}

impl FaceBook {
    /// Install fonts delivered by the background loader. Bad bytes are logged and skipped.
    pub(crate) fn install(&mut self, fonts: LoadedFonts) {
        fn build(slot: &str, bytes: Option<Arc<Vec<u8>>>) -> Option<ParleyFace> {
            let bytes = bytes?;
            match ParleyFace::new(&bytes) {
                Ok(face) => {
                    tracing::debug!(slot, family = face.family_name(), "font face ready");
                    Some(face)
                }
                Err(e) => {
                    tracing::warn!(slot, error = %e, "font face rejected; using fallback glyphs");
                    None
                }
            }
        }
        self.regular = build("regular", fonts.regular);
        self.bold = build("bold", fonts.bold);
    }

    pub(crate) fn has_loaded_fonts(&self) -> bool {
        self.regular.is_some() || self.bold.is_some()
    }

    /// Face for `weight`: bold falls back to regular, regular falls back to built-in glyphs.
    pub(crate) fn face_mut(&mut self, weight: FontWeight) -> &mut dyn GlyphFace {
        let loaded = match weight {
            FontWeight::Bold => self.bold.as_mut().or(self.regular.as_mut()),
            FontWeight::Regular => self.regular.as_mut(),
        };
        match loaded {
            Some(face) => face as &mut dyn GlyphFace,
            None => &mut self.fallback,
        }
    }
}

impl crate::render::fit::CardFaces for FaceBook {
    fn measure_face(&mut self, weight: FontWeight) -> &mut dyn TextMeasure {
        self.face_mut(weight)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
