use crate::assets::fonts::FontLoad;
use crate::encode::bitmap::{ExportFormat, ExportedImage, encode_surface};
use crate::foundation::error::{VerseArtError, VerseArtResult};
use crate::render::cpu::{CardRenderer, CardStyle, FrameSummary};
use crate::render::surface::Surface;
use crate::render::text::FaceBook;
use crate::scene::config::RenderConfig;
use crate::worker::opts::RendererOpts;
use crate::worker::protocol::{Command, CommandKind, WorkerEvent};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

/// Worker-side state: it owns the surface and processes one command at a time.
///
/// The worker is usually driven by [`RenderController`](crate::RenderController) on its own
/// thread, but [`RenderWorker::handle`] can be called directly for synchronous use.
pub struct RenderWorker {
    state: WorkerState,
    opts: RendererOpts,
    style: CardStyle,
    renderer: CardRenderer,
    notify: Option<mpsc::Sender<WorkerEvent>>,
}

enum WorkerState {
    Uninitialized,
    Ready(Box<ReadyState>),
}

struct ReadyState {
    surface: Surface,
    pixel_density: f32,
    faces: FaceBook,
    fonts: FontLoad,
    last_frame: Option<(u32, u32)>,
}

impl RenderWorker {
    /// A worker waiting for `Command::Init`.
    pub fn new(opts: RendererOpts) -> Self {
        let style = CardStyle {
            branding: opts.branding.clone(),
            branding_opacity: opts.branding_opacity,
        };
        Self {
            state: WorkerState::Uninitialized,
            opts,
            style,
            renderer: CardRenderer::default(),
            notify: None,
        }
    }

    /// Post `FontsSettled` on `events` once background font loading finishes.
    pub(crate) fn with_event_sink(mut self, events: mpsc::Sender<WorkerEvent>) -> Self {
        self.notify = Some(events);
        self
    }

    /// `true` once a surface has been accepted.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, WorkerState::Ready(_))
    }

    /// Backing size of the owned surface, if any.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        match &self.state {
            WorkerState::Ready(ready) => Some((ready.surface.width(), ready.surface.height())),
            WorkerState::Uninitialized => None,
        }
    }

    /// Process one command. `Init` succeeds silently; everything else answers with an event.
    pub fn handle(&mut self, cmd: Command) -> Option<WorkerEvent> {
        let origin = cmd.kind();
        let outcome = match cmd {
            Command::Init {
                surface,
                pixel_density,
            } => self.init(surface, pixel_density).map(|()| None),
            Command::Render(config) => guarded(origin, || self.render(&config))
                .map(|summary| Some(WorkerEvent::RenderComplete(summary))),
            Command::Export { format, quality } => guarded(origin, || self.export(format, quality))
                .map(|image| Some(WorkerEvent::ExportComplete(image))),
        };
        outcome.unwrap_or_else(|error| {
            tracing::warn!(?origin, error = %error, "worker command failed");
            Some(WorkerEvent::Error { origin, error })
        })
    }

    fn init(&mut self, surface: Surface, pixel_density: f32) -> VerseArtResult<()> {
        if self.is_ready() {
            return Err(VerseArtError::surface_transfer(
                "worker already owns a surface",
            ));
        }
        if !pixel_density.is_finite() || pixel_density <= 0.0 {
            return Err(VerseArtError::validation(
                "pixel density must be finite and > 0",
            ));
        }

        let notify = self.notify.clone();
        let fonts = FontLoad::spawn(self.opts.fonts.clone(), move |settled| {
            tracing::debug!(loaded = settled.loaded, failed = settled.failed, "fonts settled");
            if let Some(tx) = notify {
                let _ = tx.send(WorkerEvent::FontsSettled(settled));
            }
        });
        tracing::debug!(
            width = surface.width(),
            height = surface.height(),
            pixel_density,
            "surface received"
        );
        self.state = WorkerState::Ready(Box::new(ReadyState {
            surface,
            pixel_density,
            faces: FaceBook::default(),
            fonts,
            last_frame: None,
        }));
        Ok(())
    }

    fn render(&mut self, config: &RenderConfig) -> VerseArtResult<FrameSummary> {
        let WorkerState::Ready(ready) = &mut self.state else {
            return Err(VerseArtError::render("no surface: INIT has not been processed"));
        };
        if let Some(fonts) = ready.fonts.poll() {
            ready.faces.install(fonts);
        }
        let summary = self.renderer.render(
            &mut ready.surface,
            config,
            ready.pixel_density,
            &mut ready.faces,
            &self.style,
        )?;
        ready.last_frame = Some((summary.width, summary.height));
        Ok(summary)
    }

    fn export(&mut self, format: ExportFormat, quality: Option<u8>) -> VerseArtResult<ExportedImage> {
        let WorkerState::Ready(ready) = &self.state else {
            return Err(VerseArtError::export("no surface: INIT has not been processed"));
        };
        let (width, height) = ready
            .last_frame
            .ok_or_else(|| VerseArtError::export("no completed render"))?;
        let quality = quality.unwrap_or(self.opts.jpeg_quality);
        let image = encode_surface(&ready.surface, width, height, format, quality)?;
        tracing::debug!(?format, width, height, bytes = image.bytes.len(), "export encoded");
        Ok(image)
    }
}

/// Run `f`, turning a panic into an error attributed to `origin`.
fn guarded<T>(origin: CommandKind, f: impl FnOnce() -> VerseArtResult<T>) -> VerseArtResult<T> {
    std::panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_owned());
        Err(match origin {
            CommandKind::Export => VerseArtError::export(format!("export panicked: {msg}")),
            _ => VerseArtError::render(format!("{origin:?} panicked: {msg}")),
        })
    })
}

/// Worker message loop. Exits when the command channel closes or `cancel` is set.
pub(crate) fn run_worker(
    mut worker: RenderWorker,
    commands: mpsc::Receiver<Command>,
    events: mpsc::Sender<WorkerEvent>,
    cancel: Arc<AtomicBool>,
) {
    tracing::debug!("render worker started");
    while let Ok(cmd) = commands.recv() {
        if cancel.load(Ordering::Acquire) {
            tracing::debug!("render worker cancelled");
            break;
        }
        tracing::trace!(kind = ?cmd.kind(), "command received");
        if let Some(event) = worker.handle(cmd)
            && events.send(event).is_err()
        {
            break;
        }
    }
    tracing::debug!("render worker stopped");
}

#[cfg(test)]
#[path = "../../tests/unit/worker/render_worker.rs"]
mod tests;
