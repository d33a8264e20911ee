//! Shrink-to-fit layout for verse cards.
//!
//! The card is split into three horizontal bands, as fractions of its height: a 15% top margin, a
//! body band, and a 25% bottom band holding the reference, version label and branding caption.
//! The body is wrapped greedily to the safe text width (80% of the card width) and the font size
//! is stepped down from `0.12 * width` until the wrapped block fits the body band, or the floor of
//! `0.05 * width` is reached. At the floor the block is accepted even if it overflows.

use crate::foundation::error::VerseArtResult;
use crate::render::text::{FontWeight, TextExtent, TextMeasure};
use serde::Serialize;

pub(crate) const TOP_MARGIN_FRAC: f32 = 0.15;
pub(crate) const BOTTOM_BAND_FRAC: f32 = 0.25;
pub(crate) const SIDE_PADDING_FRAC: f32 = 0.10;
pub(crate) const MAX_FONT_FRAC: f32 = 0.12;
pub(crate) const MIN_FONT_FRAC: f32 = 0.05;
pub(crate) const LINE_HEIGHT_FACTOR: f32 = 1.4;
/// Font size decrement per fitting attempt, in logical pixels.
pub(crate) const FONT_STEP_PX: f32 = 2.0;

const REFERENCE_FONT_FRAC: f32 = 0.06;
const VERSION_FONT_FRAC: f32 = 0.035;
const BRANDING_FONT_FRAC: f32 = 0.03;
// Vertical anchors, as fractions of the card height.
const REFERENCE_TOP_FRAC: f32 = 0.78;
const BRANDING_BOTTOM_MARGIN_FRAC: f32 = 0.03;

/// Fixed card regions derived from the target size, in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CardGeometry {
    /// Card width.
    pub width: f32,
    /// Card height.
    pub height: f32,
    /// Top edge of the body band.
    pub body_top: f32,
    /// Height available to the wrapped body block.
    pub body_height: f32,
    /// Left edge of the safe text area.
    pub safe_left: f32,
    /// Usable width for wrapping.
    pub safe_width: f32,
    /// First candidate font size.
    pub max_font: f32,
    /// Smallest font size the fitter will choose.
    pub min_font: f32,
}

impl CardGeometry {
    /// Geometry for a `width`x`height` card.
    pub fn new(width: u32, height: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        let body_top = h * TOP_MARGIN_FRAC;
        Self {
            width: w,
            height: h,
            body_top,
            body_height: h * (1.0 - BOTTOM_BAND_FRAC) - body_top,
            safe_left: w * SIDE_PADDING_FRAC,
            safe_width: w * (1.0 - 2.0 * SIDE_PADDING_FRAC),
            max_font: w * MAX_FONT_FRAC,
            min_font: w * MIN_FONT_FRAC,
        }
    }

    /// Bottom edge of the body band.
    pub fn body_bottom(&self) -> f32 {
        self.body_top + self.body_height
    }
}

/// Wrapped body text and the font size it was fitted at. Recomputed on every render.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LineLayout {
    /// Lines in reading order.
    pub lines: Vec<String>,
    /// Chosen font size in logical pixels.
    pub font_size: f32,
    /// Distance between consecutive line tops.
    pub line_height: f32,
}

impl LineLayout {
    /// Total height of the wrapped block.
    pub fn block_height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }
}

/// Greedy word wrap at a fixed font size.
///
/// Words are appended to the current line while the measured width of the line stays under
/// `safe_width`. A word wider than `safe_width` on its own gets its own line and is never broken.
/// Explicit `\n` starts a new line; whitespace-only text produces no lines.
pub fn wrap_words<M>(
    face: &mut M,
    text: &str,
    size_px: f32,
    safe_width: f32,
) -> VerseArtResult<Vec<String>>
where
    M: TextMeasure + ?Sized,
{
    let mut lines = Vec::new();
    let text = text.trim();
    if text.is_empty() {
        return Ok(lines);
    }

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if face.measure(&candidate, size_px)?.width < safe_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_owned()));
            }
        }
        lines.push(current);
    }
    Ok(lines)
}

/// Pick the largest font size (stepping down by [`FONT_STEP_PX`]) whose wrapped block fits the
/// body band, never going below `geometry.min_font`.
#[tracing::instrument(level = "debug", skip_all, fields(width = geometry.width, chars = text.len()))]
pub fn fit_text<M>(face: &mut M, geometry: &CardGeometry, text: &str) -> VerseArtResult<LineLayout>
where
    M: TextMeasure + ?Sized,
{
    let min = geometry.min_font;
    let mut size = geometry.max_font.max(min);
    loop {
        let lines = wrap_words(face, text, size, geometry.safe_width)?;
        let layout = LineLayout {
            lines,
            font_size: size,
            line_height: size * LINE_HEIGHT_FACTOR,
        };
        let fits = layout.block_height() <= geometry.body_height;
        if fits || size <= min {
            if !fits {
                tracing::debug!(
                    font_size = size,
                    lines = layout.lines.len(),
                    "body overflows at minimum font size; accepting"
                );
            }
            return Ok(layout);
        }
        size = (size - FONT_STEP_PX).max(min);
    }
}

/// Source of measuring faces per weight.
pub trait CardFaces {
    /// Face used to measure text of `weight`.
    fn measure_face(&mut self, weight: FontWeight) -> &mut dyn TextMeasure;
}

impl<T: TextMeasure> CardFaces for T {
    fn measure_face(&mut self, _weight: FontWeight) -> &mut dyn TextMeasure {
        self
    }
}

/// One positioned run of card text. `x`/`y` are the top-left of its line box.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedText {
    /// The text drawn.
    pub text: String,
    /// Font size in logical pixels.
    pub size_px: f32,
    /// Stroke weight.
    #[serde(skip)]
    pub weight: FontWeight,
    /// Left edge.
    pub x: f32,
    /// Top edge of the line box.
    pub y: f32,
    /// Measured line width.
    pub width: f32,
    /// Line box height.
    pub height: f32,
}

impl PlacedText {
    /// Bottom edge of the line box.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    fn centered(
        text: &str,
        size_px: f32,
        weight: FontWeight,
        extent: TextExtent,
        card_width: f32,
        y: f32,
    ) -> Self {
        Self {
            text: text.to_owned(),
            size_px,
            weight,
            x: (card_width - extent.width) * 0.5,
            y,
            width: extent.width,
            height: extent.height,
        }
    }
}

/// Every text run on a card, fully positioned.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CardPlan {
    /// Fitted body layout.
    pub body: LineLayout,
    /// Body lines, centered horizontally and as a block within the body band.
    pub body_lines: Vec<PlacedText>,
    /// Bold citation line, if non-empty.
    pub reference: Option<PlacedText>,
    /// Translation label directly below the reference, if non-empty.
    pub version_label: Option<PlacedText>,
    /// Low-opacity caption at the very bottom, if non-empty.
    pub branding: Option<PlacedText>,
}

impl CardPlan {
    /// Iterate over every placed run.
    pub fn runs(&self) -> impl Iterator<Item = &PlacedText> {
        self.body_lines
            .iter()
            .chain(self.reference.iter())
            .chain(self.version_label.iter())
            .chain(self.branding.iter())
    }
}

/// Fit the body and position every run of a card.
pub fn plan_card<F>(
    faces: &mut F,
    geometry: &CardGeometry,
    text: &str,
    reference: &str,
    version_label: &str,
    branding: &str,
) -> VerseArtResult<CardPlan>
where
    F: CardFaces + ?Sized,
{
    let body = fit_text(faces.measure_face(FontWeight::Regular), geometry, text)?;

    let block_top = geometry.body_top + (geometry.body_height - body.block_height()) * 0.5;
    let mut body_lines = Vec::with_capacity(body.lines.len());
    for (i, line) in body.lines.iter().enumerate() {
        let extent = faces
            .measure_face(FontWeight::Regular)
            .measure(line, body.font_size)?;
        let box_top = block_top + i as f32 * body.line_height;
        body_lines.push(PlacedText::centered(
            line,
            body.font_size,
            FontWeight::Regular,
            extent,
            geometry.width,
            box_top + (body.line_height - extent.height) * 0.5,
        ));
    }

    let mut place = |text: &str,
                     size_px: f32,
                     weight: FontWeight,
                     y: f32|
     -> VerseArtResult<Option<PlacedText>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let extent = faces.measure_face(weight).measure(text, size_px)?;
        Ok(Some(PlacedText::centered(
            text,
            size_px,
            weight,
            extent,
            geometry.width,
            y,
        )))
    };

    let reference_top = geometry.height * REFERENCE_TOP_FRAC;
    let reference = place(
        reference,
        geometry.width * REFERENCE_FONT_FRAC,
        FontWeight::Bold,
        reference_top,
    )?;
    let version_top = reference.as_ref().map_or(reference_top, PlacedText::bottom);
    let version_label = place(
        version_label,
        geometry.width * VERSION_FONT_FRAC,
        FontWeight::Regular,
        version_top,
    )?;

    let branding_bottom = geometry.height * (1.0 - BRANDING_BOTTOM_MARGIN_FRAC);
    let branding = place(
        branding,
        geometry.width * BRANDING_FONT_FRAC,
        FontWeight::Regular,
        branding_bottom,
    )?
    .map(|mut b| {
        b.y = branding_bottom - b.height;
        b
    });

    Ok(CardPlan {
        body,
        body_lines,
        reference,
        version_label,
        branding,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
