use super::*;
use std::io::Write;

/// Log sink shared between the subscriber and the test body.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn with_captured_warnings(f: impl FnOnce()) -> String {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    captured.text()
}

#[test]
fn second_init_is_rejected_and_logged() {
    let mut controller = RenderController::new(RendererOpts::default()).unwrap();
    let mut first = VisualElement::new(64, 32).unwrap();
    let mut second = VisualElement::new(64, 32).unwrap();
    controller.init_surface(&mut first).unwrap();

    let logs = with_captured_warnings(|| {
        let err = controller.init_surface(&mut second).unwrap_err();
        assert!(matches!(err, VerseArtError::SurfaceTransfer(_)), "{err:?}");
    });
    assert!(!second.is_transferred());
    assert!(logs.contains("surface transfer failed"), "logs: {logs}");
    assert!(logs.contains("already initialized"), "logs: {logs}");
}

#[test]
fn transferred_element_is_rejected_and_logged() {
    let mut element = VisualElement::new(64, 32).unwrap();
    let mut owner = RenderController::new(RendererOpts::default()).unwrap();
    owner.init_surface(&mut element).unwrap();

    let mut other = RenderController::new(RendererOpts::default()).unwrap();
    let logs = with_captured_warnings(|| {
        assert!(other.init_surface(&mut element).is_err());
    });
    assert!(!other.is_initialized());
    assert!(logs.contains("surface transfer failed"), "logs: {logs}");
}

#[test]
fn init_after_teardown_is_logged() {
    let mut controller = RenderController::new(RendererOpts::default()).unwrap();
    controller.teardown();
    let mut element = VisualElement::new(16, 16).unwrap();

    let logs = with_captured_warnings(|| {
        let err = controller.init_surface(&mut element).unwrap_err();
        assert!(matches!(err, VerseArtError::TornDown), "{err:?}");
    });
    assert!(!element.is_transferred());
    assert!(logs.contains("surface transfer failed"), "logs: {logs}");
}
