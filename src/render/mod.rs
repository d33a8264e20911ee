//! Card rendering: surfaces, gradient backgrounds, text fitting and the CPU frame pipeline.

pub(crate) mod cpu;
/// Shrink-to-fit text layout and card placement.
pub mod fit;
/// Deterministic gradient backgrounds.
pub mod gradient;
/// Pixel buffers and the element that owns them before transfer.
pub mod surface;
/// Text measurement and glyph faces.
pub mod text;
