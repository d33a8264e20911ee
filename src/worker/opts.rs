use crate::assets::fonts::{FontSet, FontSource};
use crate::encode::bitmap::DEFAULT_JPEG_QUALITY;
use crate::foundation::error::{VerseArtError, VerseArtResult};

/// Default branding line drawn near the bottom edge.
pub const DEFAULT_BRANDING: &str = "made with verseart";

/// Options for a [`RenderController`](crate::RenderController).
#[derive(Clone, Debug)]
pub struct RendererOpts {
    pub(crate) fonts: FontSet,
    pub(crate) branding: String,
    pub(crate) branding_opacity: f32,
    pub(crate) jpeg_quality: u8,
    pub(crate) worker_name: String,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            fonts: FontSet::default(),
            branding: DEFAULT_BRANDING.to_owned(),
            branding_opacity: 0.6,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            worker_name: "verseart-render".to_owned(),
        }
    }
}

impl RendererOpts {
    /// Defaults overridden by `VERSEART_*` environment variables.
    ///
    /// - `VERSEART_FONT_REGULAR` / `VERSEART_FONT_BOLD`: font file paths
    /// - `VERSEART_BRANDING`: branding text (empty disables it)
    /// - `VERSEART_JPEG_QUALITY`: `1..=100`
    pub fn from_env() -> VerseArtResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> VerseArtResult<Self> {
        let mut opts = Self::default();
        let path = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(|v| FontSource::Path(v.into()))
        };
        opts.fonts = FontSet {
            regular: path("VERSEART_FONT_REGULAR"),
            bold: path("VERSEART_FONT_BOLD"),
        };
        if let Some(branding) = lookup("VERSEART_BRANDING") {
            opts.branding = branding;
        }
        if let Some(raw) = lookup("VERSEART_JPEG_QUALITY") {
            let q: u8 = raw.trim().parse().map_err(|_| {
                VerseArtError::validation(format!(
                    "VERSEART_JPEG_QUALITY must be an integer in 1..=100, got '{raw}'"
                ))
            })?;
            opts = opts.with_jpeg_quality(q);
        }
        Ok(opts)
    }

    /// Fonts to load in the background once the surface is initialized.
    pub fn with_fonts(mut self, fonts: FontSet) -> Self {
        self.fonts = fonts;
        self
    }

    /// Branding text; empty disables it.
    pub fn with_branding(mut self, branding: impl Into<String>) -> Self {
        self.branding = branding.into();
        self
    }

    /// Branding opacity, clamped to `0..=1`.
    pub fn with_branding_opacity(mut self, opacity: f32) -> Self {
        self.branding_opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }

    /// Default JPEG quality, clamped to `1..=100`.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Name of the worker thread.
    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    /// Configured fonts.
    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Configured branding text.
    pub fn branding(&self) -> &str {
        &self.branding
    }

    /// Default JPEG quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}

#[cfg(test)]
#[path = "../../tests/unit/worker/opts.rs"]
mod tests;
