/// Convenience result type used across verseart.
pub type VerseArtResult<T> = Result<T, VerseArtError>;

/// Top-level error taxonomy used by renderer APIs.
#[derive(thiserror::Error, Debug)]
pub enum VerseArtError {
    /// Invalid caller-provided data (render configs, colors, options).
    #[error("validation error: {0}")]
    Validation(String),

    /// The drawing surface could not be handed to the render worker.
    #[error("surface transfer error: {0}")]
    SurfaceTransfer(String),

    /// Failure while compositing, laying out or drawing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Failure while encoding the surface into an image format.
    #[error("export error: {0}")]
    Export(String),

    /// Font bytes could not be read or registered.
    #[error("font error: {0}")]
    Font(String),

    /// The controller (and its worker) has been torn down.
    #[error("renderer has been torn down")]
    TornDown,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VerseArtError {
    /// Build a [`VerseArtError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VerseArtError::SurfaceTransfer`] value.
    pub fn surface_transfer(msg: impl Into<String>) -> Self {
        Self::SurfaceTransfer(msg.into())
    }

    /// Build a [`VerseArtError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`VerseArtError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`VerseArtError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
