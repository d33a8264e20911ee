use crate::assets::color::Color;
use crate::foundation::error::{VerseArtError, VerseArtResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Interpolation pattern used to blend the palette across the card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientShape {
    /// Axis from the top-left corner to the bottom-right corner.
    #[default]
    Linear,
    /// Centered at the canvas midpoint, radius `max(width, height) / 1.5`.
    Radial,
}

/// One verse-art render request. Immutable once submitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// Target width in logical pixels.
    pub width: u32,
    /// Target height in logical pixels.
    pub height: u32,
    /// Verse body; may be empty.
    #[serde(default)]
    pub text: String,
    /// Citation, e.g. `John 3:16`.
    #[serde(default)]
    pub reference: String,
    /// Translation code, e.g. `NIV`.
    #[serde(default)]
    pub version_label: String,
    /// Gradient stops in order; at least two.
    pub palette_colors: Vec<Color>,
    /// Gradient interpolation pattern.
    #[serde(default)]
    pub gradient_shape: GradientShape,
    /// Color for body, reference and version label.
    #[serde(default = "default_text_color")]
    pub text_color: Color,
}

fn default_text_color() -> Color {
    Color::WHITE
}

impl RenderConfig {
    /// Check `width > 0`, `height > 0` and at least two palette colors.
    pub fn validate(&self) -> VerseArtResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(VerseArtError::validation(format!(
                "render size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.palette_colors.len() < 2 {
            return Err(VerseArtError::validation(format!(
                "palette needs at least 2 colors, got {}",
                self.palette_colors.len()
            )));
        }
        Ok(())
    }

    /// Parse a config from JSON text.
    pub fn from_json_str(s: &str) -> VerseArtResult<Self> {
        serde_json::from_str(s).map_err(|e| VerseArtError::validation(e.to_string()))
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> VerseArtResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|e| {
            VerseArtError::validation(format!("failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
