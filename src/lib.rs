//! Verseart renders scripture verse cards: a multi-stop gradient background with the verse text
//! shrunk to fit, a bold reference line, a version label and a faint branding caption.
//!
//! All pixel work happens on an isolated render worker that owns the drawing surface:
//!
//! - Create a [`VisualElement`] and a [`RenderController`]
//! - Hand the element's surface over with [`RenderController::init_surface`]
//! - Queue frames with [`RenderController::request_render`]
//! - Fetch PNG/JPEG bytes with [`RenderController::export_image`]
//!
//! The layout pieces ([`fit_text`], [`plan_card`], [`composite_gradient`]) are public so they
//! can be used and tested without a worker.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// Bitmap export.
pub mod encode;
/// Card rendering building blocks.
pub mod render;
/// Render configuration model.
pub mod scene;
/// Render worker and controller.
pub mod worker;

pub use crate::assets::color::Color;
pub use crate::assets::fonts::{FontSet, FontSource, FontsSettled};
pub use crate::encode::bitmap::{DEFAULT_JPEG_QUALITY, ExportFormat, ExportedImage};
pub use crate::foundation::error::{VerseArtError, VerseArtResult};
pub use crate::render::cpu::FrameSummary;
pub use crate::render::fit::{CardGeometry, CardPlan, LineLayout, PlacedText, fit_text, plan_card};
pub use crate::render::gradient::composite_gradient;
pub use crate::render::surface::{Surface, VisualElement};
pub use crate::render::text::{FallbackFace, FontWeight, TextExtent, TextMeasure};
pub use crate::scene::config::{GradientShape, RenderConfig};
pub use crate::worker::controller::{PendingExport, RenderController};
pub use crate::worker::opts::RendererOpts;
pub use crate::worker::protocol::{Command, CommandKind, WorkerEvent};
pub use crate::worker::render_worker::RenderWorker;
pub use crate::worker::status::{FontState, RendererStatus};
