/// Color values accepted in render configs.
pub mod color;
/// Font sources and background font loading.
pub mod fonts;
