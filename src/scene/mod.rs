/// Render configuration supplied by the UI layer.
pub mod config;
