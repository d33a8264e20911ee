//! The isolated render worker and the controller that drives it.

/// Caller-side handle on the worker.
pub mod controller;
/// Renderer configuration.
pub mod opts;
/// Messages exchanged with the worker.
pub mod protocol;
/// Worker-side state machine and message loop.
pub mod render_worker;
/// Observable renderer status.
pub mod status;
