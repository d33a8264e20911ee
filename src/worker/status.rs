use crate::assets::fonts::FontsSettled;
use crate::render::cpu::FrameSummary;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Progress of background font loading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontState {
    /// No surface yet, or no fonts configured.
    #[default]
    NotRequested,
    /// Loader is running; frames use fallback glyphs.
    Loading,
    /// Loader finished.
    Settled(FontsSettled),
}

/// Snapshot of what the worker has reported so far.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RendererStatus {
    /// Surface has been handed to the worker.
    pub surface_ready: bool,
    /// Controller has been torn down.
    pub torn_down: bool,
    /// Renders that completed.
    pub renders_completed: u64,
    /// Exports that completed.
    pub exports_completed: u64,
    /// Commands that failed.
    pub errors: u64,
    /// Description of the most recent failure.
    pub last_error: Option<String>,
    /// Summary of the most recent completed render.
    pub last_frame: Option<FrameSummary>,
    /// Font loading progress.
    pub fonts: FontState,
}

#[derive(Default)]
pub(crate) struct StatusBoard {
    state: Mutex<RendererStatus>,
    changed: Condvar,
}

impl StatusBoard {
    fn lock(&self) -> MutexGuard<'_, RendererStatus> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut RendererStatus)) {
        f(&mut self.lock());
        self.changed.notify_all();
    }

    pub(crate) fn snapshot(&self) -> RendererStatus {
        self.lock().clone()
    }

    /// Block until `done` holds or `timeout` passes. Returns the final value of `done`.
    pub(crate) fn wait_until(
        &self,
        timeout: Duration,
        done: impl Fn(&RendererStatus) -> bool,
    ) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |s| !done(s))
            .unwrap_or_else(PoisonError::into_inner);
        done(&guard)
    }
}
