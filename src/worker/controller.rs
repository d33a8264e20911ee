//! Caller-side handle on the render worker.
//!
//! The controller owns two threads: the worker itself and a dispatcher that routes worker
//! events to pending exports and to the [`RendererStatus`] board. Rendering is fire-and-forget;
//! exports resolve through a [`PendingExport`].
//!
//! Commands are processed strictly in submission order, so an export observes every render
//! requested before it.

use crate::encode::bitmap::{ExportFormat, ExportedImage};
use crate::foundation::error::{VerseArtError, VerseArtResult};
use crate::render::surface::VisualElement;
use crate::scene::config::RenderConfig;
use crate::worker::opts::RendererOpts;
use crate::worker::protocol::{Command, CommandKind, WorkerEvent};
use crate::worker::render_worker::{RenderWorker, run_worker};
use crate::worker::status::{FontState, RendererStatus, StatusBoard};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, mpsc};
use std::time::Duration;

type ExportReply = mpsc::SyncSender<VerseArtResult<ExportedImage>>;
type PendingQueue = Arc<Mutex<VecDeque<ExportReply>>>;

/// Result of [`RenderController::export_image`]; resolves exactly once.
#[must_use = "an export result is only observable through its PendingExport"]
#[derive(Debug)]
pub struct PendingExport {
    rx: mpsc::Receiver<VerseArtResult<ExportedImage>>,
}

impl PendingExport {
    fn settled(result: VerseArtResult<ExportedImage>) -> Self {
        let (tx, rx) = mpsc::sync_channel(1);
        let _ = tx.send(result);
        Self { rx }
    }

    /// Block until the export resolves.
    pub fn wait(self) -> VerseArtResult<ExportedImage> {
        self.rx.recv().unwrap_or(Err(VerseArtError::TornDown))
    }

    /// Block for at most `timeout`. `None` means still pending.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<VerseArtResult<ExportedImage>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(VerseArtError::TornDown)),
        }
    }
}

struct WorkerLink {
    commands: mpsc::Sender<Command>,
    pending: PendingQueue,
    cancel: Arc<AtomicBool>,
}

/// Drives an isolated render worker.
///
/// Dropping the controller tears it down.
pub struct RenderController {
    link: Option<WorkerLink>,
    initialized: bool,
    fonts_requested: bool,
    board: Arc<StatusBoard>,
}

impl std::fmt::Debug for RenderController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderController")
            .field("initialized", &self.initialized)
            .field("torn_down", &self.link.is_none())
            .finish_non_exhaustive()
    }
}

impl RenderController {
    /// Spawn the worker and its event dispatcher.
    pub fn new(opts: RendererOpts) -> VerseArtResult<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (ev_tx, ev_rx) = mpsc::channel::<WorkerEvent>();
        let pending: PendingQueue = Arc::default();
        let board = Arc::new(StatusBoard::default());
        let cancel = Arc::new(AtomicBool::new(false));
        let fonts_requested = !opts.fonts.is_empty();
        let name = opts.worker_name.clone();

        let worker_cancel = cancel.clone();
        std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                // Render state is created here and never leaves this thread.
                let worker = RenderWorker::new(opts).with_event_sink(ev_tx.clone());
                run_worker(worker, cmd_rx, ev_tx, worker_cancel);
            })
            .map_err(|e| anyhow::anyhow!("failed to spawn render worker: {e}"))?;

        let dispatch_pending = pending.clone();
        let dispatch_board = board.clone();
        std::thread::Builder::new()
            .name(format!("{name}-events"))
            .spawn(move || dispatch(ev_rx, dispatch_pending, dispatch_board))
            .map_err(|e| anyhow::anyhow!("failed to spawn event dispatcher: {e}"))?;

        tracing::debug!(worker = %name, "render controller started");
        Ok(Self {
            link: Some(WorkerLink {
                commands: cmd_tx,
                pending,
                cancel,
            }),
            initialized: false,
            fonts_requested,
            board,
        })
    }

    /// Move `element`'s surface into the worker.
    ///
    /// Fails with a surface-transfer error if this controller already holds a surface or the
    /// element's surface is gone. The element keeps its surface on failure.
    pub fn init_surface(&mut self, element: &mut VisualElement) -> VerseArtResult<()> {
        self.transfer_to_worker(element)
            .inspect_err(|e| tracing::warn!(error = %e, "surface transfer failed"))
    }

    fn transfer_to_worker(&mut self, element: &mut VisualElement) -> VerseArtResult<()> {
        let link = self.link.as_ref().ok_or(VerseArtError::TornDown)?;
        if self.initialized {
            return Err(VerseArtError::surface_transfer(
                "controller is already initialized",
            ));
        }
        let surface = element.transfer_surface()?;
        link.commands
            .send(Command::Init {
                surface,
                pixel_density: element.pixel_density(),
            })
            .map_err(|_| VerseArtError::render("render worker is not accepting commands"))?;

        self.initialized = true;
        let fonts = if self.fonts_requested {
            FontState::Loading
        } else {
            FontState::NotRequested
        };
        self.board.update(|s| {
            s.surface_ready = true;
            if s.fonts == FontState::NotRequested {
                s.fonts = fonts;
            }
        });
        tracing::debug!(
            width = element.width(),
            height = element.height(),
            pixel_density = element.pixel_density(),
            "surface transferred"
        );
        Ok(())
    }

    /// Queue a render. Failures are reported through [`RenderController::status`].
    pub fn request_render(&self, config: RenderConfig) {
        let Some(link) = &self.link else {
            tracing::debug!("render requested after teardown; ignored");
            return;
        };
        if link.commands.send(Command::Render(Box::new(config))).is_err() {
            tracing::warn!("render worker is not accepting commands");
        }
    }

    /// Queue an export of the latest completed render at the default quality.
    pub fn export_image(&self, format: ExportFormat) -> PendingExport {
        self.export_image_with_quality(format, None)
    }

    /// Queue an export; `quality` overrides the default for lossy formats.
    pub fn export_image_with_quality(
        &self,
        format: ExportFormat,
        quality: Option<u8>,
    ) -> PendingExport {
        let Some(link) = &self.link else {
            return PendingExport::settled(Err(VerseArtError::TornDown));
        };
        let (tx, rx) = mpsc::sync_channel(1);
        // Enqueue under the lock so reply order matches command order.
        let mut pending = lock(&link.pending);
        pending.push_back(tx);
        if link.commands.send(Command::Export { format, quality }).is_err()
            && let Some(tx) = pending.pop_back()
        {
            let _ = tx.send(Err(VerseArtError::TornDown));
        }
        PendingExport { rx }
    }

    /// Current status snapshot.
    pub fn status(&self) -> RendererStatus {
        self.board.snapshot()
    }

    /// Wait up to `timeout` for background font loading to finish.
    ///
    /// Returns `true` if no load is in flight. Renders requested after this returns `true` use
    /// the loaded fonts.
    pub fn wait_for_fonts(&self, timeout: Duration) -> bool {
        self.board
            .wait_until(timeout, |s| s.fonts != FontState::Loading)
    }

    /// `true` once a surface has been transferred.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// `true` after [`RenderController::teardown`].
    pub fn is_torn_down(&self) -> bool {
        self.link.is_none()
    }

    /// Stop the worker and reject every pending export. Idempotent.
    ///
    /// A command already executing runs to completion but its result is discarded.
    pub fn teardown(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };
        link.cancel.store(true, Ordering::Release);
        drop(link.commands);
        let abandoned: Vec<ExportReply> = lock(&link.pending).drain(..).collect();
        let count = abandoned.len();
        for tx in abandoned {
            let _ = tx.send(Err(VerseArtError::TornDown));
        }
        self.board.update(|s| {
            s.torn_down = true;
            if s.fonts == FontState::Loading {
                s.fonts = FontState::NotRequested;
            }
        });
        tracing::debug!(abandoned = count, "render controller torn down");
    }
}

impl Drop for RenderController {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn lock(pending: &PendingQueue) -> MutexGuard<'_, VecDeque<ExportReply>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

fn settle_next(pending: &PendingQueue, result: VerseArtResult<ExportedImage>) {
    match lock(pending).pop_front() {
        Some(tx) => {
            let _ = tx.send(result);
        }
        None => tracing::debug!("export result arrived with no pending request"),
    }
}

fn dispatch(events: mpsc::Receiver<WorkerEvent>, pending: PendingQueue, board: Arc<StatusBoard>) {
    for event in events {
        match event {
            WorkerEvent::RenderComplete(summary) => board.update(|s| {
                s.renders_completed += 1;
                s.last_frame = Some(summary);
            }),
            WorkerEvent::ExportComplete(image) => {
                board.update(|s| s.exports_completed += 1);
                settle_next(&pending, Ok(image));
            }
            WorkerEvent::FontsSettled(settled) => board.update(|s| {
                if !s.torn_down {
                    s.fonts = FontState::Settled(settled);
                }
            }),
            WorkerEvent::Error { origin, error } => {
                let description = error.to_string();
                tracing::warn!(?origin, error = %description, "worker reported an error");
                board.update(|s| {
                    s.errors += 1;
                    s.last_error = Some(description);
                });
                if origin == CommandKind::Export {
                    settle_next(&pending, Err(error));
                }
            }
        }
    }
    tracing::debug!("event dispatcher stopped");
}

#[cfg(test)]
#[path = "../../tests/unit/worker/controller.rs"]
mod tests;
