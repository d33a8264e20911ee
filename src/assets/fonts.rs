//! Font sources and best-effort background loading.
//!
//! Loading never blocks rendering: the worker polls a [`FontLoad`] before each frame and keeps
//! drawing with fallback glyphs until the background task has delivered usable bytes.

use crate::foundation::error::{VerseArtError, VerseArtResult};
use std::path::PathBuf;
use std::sync::{Arc, mpsc};

/// Where a font's bytes come from.
///
/// Fonts are never fetched over the network. Callers that host fonts at a URL download the bytes
/// themselves and pass them as [`FontSource::Bytes`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// Font file on disk (TTF/OTF/TTC).
    Path(PathBuf),
    /// Font bytes already in memory.
    Bytes(Arc<Vec<u8>>),
}

impl FontSource {
    fn describe(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Bytes(b) => format!("<{} in-memory bytes>", b.len()),
        }
    }

    fn read(&self) -> VerseArtResult<Arc<Vec<u8>>> {
        match self {
            Self::Path(p) => std::fs::read(p).map(Arc::new).map_err(|e| {
                VerseArtError::font(format!("failed to read font '{}': {e}", p.display()))
            }),
            Self::Bytes(b) => Ok(b.clone()),
        }
    }
}

/// Fonts used for card text. Both slots are optional; missing slots fall back to built-in glyphs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontSet {
    /// Face used for the verse body, version label and branding caption.
    pub regular: Option<FontSource>,
    /// Face used for the bold reference line. Falls back to `regular` when absent.
    pub bold: Option<FontSource>,
}

impl FontSet {
    /// `true` if no font source is configured.
    pub fn is_empty(&self) -> bool {
        self.regular.is_none() && self.bold.is_none()
    }

    fn source_count(&self) -> usize {
        usize::from(self.regular.is_some()) + usize::from(self.bold.is_some())
    }
}

/// Outcome of a background font load, posted once when loading finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FontsSettled {
    /// Number of fonts that were read and registered successfully.
    pub loaded: usize,
    /// Number of configured fonts that failed to load.
    pub failed: usize,
}

/// Validated font bytes handed from the loader task to the worker.
#[derive(Clone, Debug, Default)]
pub(crate) struct LoadedFonts {
    pub(crate) regular: Option<Arc<Vec<u8>>>,
    pub(crate) bold: Option<Arc<Vec<u8>>>,
}

/// Handle on a (possibly finished) background font load.
pub(crate) struct FontLoad {
    rx: Option<mpsc::Receiver<LoadedFonts>>,
}

impl FontLoad {
    /// A load that will never deliver anything; rendering stays on fallback glyphs.
    pub(crate) fn idle() -> Self {
        Self { rx: None }
    }

    /// Start loading `set` on a background thread.
    ///
    /// `on_settled` runs on the loader thread after the fonts have been queued for the worker, so
    /// any render submitted after observing it will pick the fonts up.
    pub(crate) fn spawn(
        set: FontSet,
        on_settled: impl FnOnce(FontsSettled) + Send + 'static,
    ) -> Self {
        if set.is_empty() {
            return Self::idle();
        }

        let (tx, rx) = mpsc::channel::<LoadedFonts>();
        let spawned = std::thread::Builder::new()
            .name("verseart-fonts".to_owned())
            .spawn(move || {
                let total = set.source_count();
                let fonts = LoadedFonts {
                    regular: set.regular.as_ref().and_then(load_one),
                    bold: set.bold.as_ref().and_then(load_one),
                };
                let loaded =
                    usize::from(fonts.regular.is_some()) + usize::from(fonts.bold.is_some());
                // The worker may already be gone; nothing to deliver to in that case.
                let _ = tx.send(fonts);
                on_settled(FontsSettled {
                    loaded,
                    failed: total - loaded,
                });
            });

        match spawned {
            Ok(_) => Self { rx: Some(rx) },
            Err(e) => {
                tracing::warn!(error = %e, "could not start font loader; using fallback glyphs");
                Self::idle()
            }
        }
    }

    /// Non-blocking check for delivered fonts. Returns `Some` at most once.
    pub(crate) fn poll(&mut self) -> Option<LoadedFonts> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(fonts) => {
                self.rx = None;
                Some(fonts)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.rx = None;
                None
            }
        }
    }
}

fn load_one(source: &FontSource) -> Option<Arc<Vec<u8>>> {
    match source.read().and_then(|bytes| validate_font(&bytes).map(|()| bytes)) {
        Ok(bytes) => {
            tracing::debug!(font = %source.describe(), bytes = bytes.len(), "font loaded");
            Some(bytes)
        }
        Err(e) => {
            tracing::warn!(font = %source.describe(), error = %e, "font load failed; using fallback glyphs");
            None
        }
    }
}

pub(crate) fn validate_font(bytes: &Arc<Vec<u8>>) -> VerseArtResult<()> {
    let data: Arc<dyn AsRef<[u8]> + Send + Sync> = bytes.clone();
    let mut font_ctx = parley::FontContext::default();
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::new(data), None);
    if families.is_empty() {
        return Err(VerseArtError::font(
            "no font families registered from font bytes",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
