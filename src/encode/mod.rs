//! Bitmap export of rendered surfaces.

/// PNG/JPEG encoding of premultiplied RGBA8 pixels.
pub mod bitmap;
