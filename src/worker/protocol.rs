use crate::assets::fonts::FontsSettled;
use crate::encode::bitmap::{ExportFormat, ExportedImage};
use crate::foundation::error::VerseArtError;
use crate::render::cpu::FrameSummary;
use crate::render::surface::Surface;
use crate::scene::config::RenderConfig;
use serde::{Deserialize, Serialize};

/// Message from the controller to the worker.
#[derive(Debug)]
pub enum Command {
    /// Hand over the surface. Accepted once per worker.
    Init {
        /// The transferred pixel buffer.
        surface: Surface,
        /// Device pixel density of the owning element.
        pixel_density: f32,
    },
    /// Draw a frame for this configuration.
    Render(Box<RenderConfig>),
    /// Encode the most recently completed frame.
    Export {
        /// Target encoding.
        format: ExportFormat,
        /// Quality override for lossy formats; `None` uses the renderer default.
        quality: Option<u8>,
    },
}

impl Command {
    /// Discriminant used to attribute failures.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Init { .. } => CommandKind::Init,
            Self::Render(_) => CommandKind::Render,
            Self::Export { .. } => CommandKind::Export,
        }
    }
}

/// Which command an event answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    /// `Command::Init`.
    Init,
    /// `Command::Render`.
    Render,
    /// `Command::Export`.
    Export,
}

/// Message from the worker back to the controller.
#[derive(Debug)]
pub enum WorkerEvent {
    /// A render finished and the surface now shows it.
    RenderComplete(FrameSummary),
    /// An export finished.
    ExportComplete(ExportedImage),
    /// Background font loading finished (successfully or not).
    FontsSettled(FontsSettled),
    /// A command failed; the worker stays usable.
    Error {
        /// Command that failed.
        origin: CommandKind,
        /// The failure.
        error: VerseArtError,
    },
}

impl WorkerEvent {
    /// Human-readable description of an `Error` event.
    pub fn description(&self) -> Option<String> {
        match self {
            Self::Error { error, .. } => Some(error.to_string()),
            _ => None,
        }
    }
}
