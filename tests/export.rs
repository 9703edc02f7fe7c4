//! Integration tests for the export pipeline.
//!
//! Most tests drive [`PdfExporter`] with an in-process renderer that records
//! what it was given, so they run anywhere. The final test prints through a
//! real headless Chrome and is gated behind the `CHROME_E2E` environment
//! variable.
//!
//! Run the Chrome test with:
//!   CHROME_E2E=1 cargo test --test export -- --nocapture

use cvpdf::{
    prepare_content, set_loading, Button, ContentSource, Element, ExportCallback, ExportConfig,
    ExportError, NoopExportCallback, PdfExporter, PreparedContent, RenderOptions, Renderer,
    SharedCallback, DEFAULT_FILENAME,
};
use futures::future::BoxFuture;
use std::path::Path;
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// What a renderer was handed for one call.
#[derive(Debug, Clone)]
struct RenderCall {
    inner_html: String,
    options: RenderOptions,
}

/// Renderer that records its inputs and answers with a fixed outcome.
struct FakeRenderer {
    fail: bool,
    calls: Mutex<Vec<RenderCall>>,
}

impl FakeRenderer {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: Mutex::new(vec![]),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: Mutex::new(vec![]),
        })
    }

    fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Renderer for FakeRenderer {
    fn render<'a>(
        &'a self,
        content: &'a PreparedContent,
        options: &'a RenderOptions,
    ) -> BoxFuture<'a, Result<Vec<u8>, ExportError>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(RenderCall {
                inner_html: content.element().inner_html().to_string(),
                options: options.clone(),
            });
            tokio::task::yield_now().await;
            if self.fail {
                Err(ExportError::render("engine crashed"))
            } else {
                Ok(format!("%PDF-1.7 {}", options.filename).into_bytes())
            }
        })
    }
}

/// Callback that records every notification.
#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<(bool, Option<String>)>>,
}

impl ExportCallback for Recorder {
    fn on_export_complete(&self, success: bool, error: Option<&ExportError>) {
        self.events
            .lock()
            .unwrap()
            .push((success, error.map(|e| e.to_string())));
    }
}

fn exporter_in(renderer: Arc<FakeRenderer>, dir: &Path) -> PdfExporter {
    let config = ExportConfig::builder().output_dir(dir).build().unwrap();
    PdfExporter::new(renderer, config)
}

fn tag(s: &str) -> String {
    format!("<span class=\"skill-tag\">{s}</span>")
}

// ── Successful exports ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_success_writes_file_and_reports_once() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer::ok();
    let exporter = exporter_in(renderer.clone(), dir.path());
    let recorder = Recorder::default();

    let ok = exporter
        .export("**Ada**", Some("ada.pdf"), Some(&recorder))
        .await;

    assert!(ok);
    assert_eq!(*recorder.events.lock().unwrap(), vec![(true, None)]);
    assert_eq!(
        std::fs::read(dir.path().join("ada.pdf")).unwrap(),
        b"%PDF-1.7 ada.pdf"
    );
    assert_eq!(renderer.calls().len(), 1);
}

#[tokio::test]
async fn test_default_filename_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer::ok();
    let exporter = exporter_in(renderer.clone(), dir.path());

    assert!(exporter.export("x", None, None).await);

    assert!(dir.path().join(DEFAULT_FILENAME).exists());
    assert_eq!(renderer.calls()[0].options.filename, "belge.pdf");
}

#[tokio::test]
async fn test_renderer_receives_fixed_options() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer::ok();
    let exporter = exporter_in(renderer.clone(), dir.path());

    exporter.export("x", Some("cv.pdf"), None).await;

    let options = &renderer.calls()[0].options;
    assert_eq!(*options, RenderOptions::default().with_filename("cv.pdf"));

    let json: serde_json::Value =
        serde_json::from_str(&options.to_html2pdf_json().unwrap()).unwrap();
    assert_eq!(json["margin"], serde_json::json!([15.0, 15.0, 15.0, 15.0]));
    assert_eq!(json["image"]["type"], "jpeg");
    assert_eq!(json["image"]["quality"], 0.98);
    assert_eq!(json["html2canvas"]["scale"], 2.0);
    assert_eq!(json["html2canvas"]["useCORS"], true);
    assert_eq!(json["jsPDF"]["format"], "a4");
    assert_eq!(json["jsPDF"]["orientation"], "portrait");
}

#[tokio::test]
async fn test_renderer_receives_prepared_content() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer::ok();
    let exporter = exporter_in(renderer.clone(), dir.path());

    exporter
        .export("**Ada**\n\n*2019*\n\nRust, Go", None, None)
        .await;

    let html = &renderer.calls()[0].inner_html;
    assert!(html.starts_with("<style>"), "stylesheet first: {html}");
    assert!(html.contains(".skill-tag"));
    assert!(html.ends_with(&format!(
        "<strong>Ada</strong><br><br><em>2019</em><br><br>{}, {}",
        tag("Rust"),
        tag("Go")
    )));
}

#[tokio::test]
async fn test_source_element_is_not_modified() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter_in(FakeRenderer::ok(), dir.path());
    let element = Element::new("section")
        .with_attribute("id", "cv")
        .with_inner_html("**Ada**\n\nRust, Go");
    let before = element.clone();

    assert!(exporter.export(&element, None, None).await);
    assert_eq!(element, before);
}

#[tokio::test]
async fn test_filename_directories_are_stripped() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter_in(FakeRenderer::ok(), dir.path());

    let path = exporter
        .try_export("x", Some("../../escape.pdf"))
        .await
        .unwrap();

    assert_eq!(path, dir.path().join("escape.pdf"));
    assert!(path.exists());
}

// ── Failed exports ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_render_failure_returns_false_and_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter_in(FakeRenderer::failing(), dir.path());
    let recorder = Recorder::default();

    let ok = exporter.export("x", Some("cv.pdf"), Some(&recorder)).await;

    assert!(!ok);
    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(events.len(), 1);
    assert!(!events[0].0);
    assert!(
        events[0].1.as_deref().unwrap().contains("engine crashed"),
        "got: {events:?}"
    );
    assert!(!dir.path().join("cv.pdf").exists());
}

#[tokio::test]
async fn test_failure_without_callback_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter_in(FakeRenderer::failing(), dir.path());
    assert!(!exporter.export("x", None, None).await);
}

#[tokio::test]
async fn test_try_export_surfaces_render_error() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter_in(FakeRenderer::failing(), dir.path());

    let err = exporter.try_export("x", None).await.unwrap_err();
    assert!(err.is_render_failure(), "got: {err}");
}

#[tokio::test]
async fn test_unwritable_output_is_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the output directory should be.
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();

    let exporter = exporter_in(FakeRenderer::ok(), &blocker);
    let recorder = Recorder::default();

    assert!(!exporter.export("x", None, Some(&recorder)).await);
    assert!(matches!(
        exporter.try_export("x", None).await,
        Err(ExportError::OutputWriteFailed { .. })
    ));
    assert!(!recorder.events.lock().unwrap()[0].0);
}

// ── Concurrency ──────────────────────────────────────────────────────────────

/// Renderer whose documents are large enough for saves to overlap.
struct BulkRenderer;

impl Renderer for BulkRenderer {
    fn render<'a>(
        &'a self,
        _content: &'a PreparedContent,
        _options: &'a RenderOptions,
    ) -> BoxFuture<'a, Result<Vec<u8>, ExportError>> {
        Box::pin(async { Ok(vec![b'%'; 4 * 1024 * 1024]) })
    }
}

/// Repeated clicks: many exports with the default name into one directory.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_default_name_exports_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::builder()
        .output_dir(dir.path())
        .build()
        .unwrap();
    let exporter = PdfExporter::new(Arc::new(BulkRenderer), config);
    let recorder = Arc::new(Recorder::default());

    for _ in 0..5 {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let exporter = exporter.clone();
                let cb: SharedCallback = recorder.clone();
                tokio::spawn(async move { exporter.export("x", None, Some(cb.as_ref())).await })
            })
            .collect();
        for h in handles {
            assert!(h.await.expect("spawn must succeed"));
        }
    }

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(events.len(), 40);
    assert!(events.iter().all(|e| *e == (true, None)), "got: {events:?}");

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![DEFAULT_FILENAME.to_string()]);
    assert!(!names.iter().any(|n| n.ends_with(".tmp")));
}

#[tokio::test]
async fn test_concurrent_exports_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FakeRenderer::ok();
    let exporter = exporter_in(renderer.clone(), dir.path());
    let recorder = Recorder::default();

    let names: Vec<String> = (0..8).map(|i| format!("cv-{i}.pdf")).collect();
    let results = futures::future::join_all(names.iter().map(|name| {
        exporter.export(
            format!("*{name}*"),
            Some(name.as_str()),
            Some(&recorder as &dyn ExportCallback),
        )
    }))
    .await;

    assert!(results.iter().all(|ok| *ok));
    assert_eq!(recorder.events.lock().unwrap().len(), names.len());
    for name in &names {
        let bytes = std::fs::read(dir.path().join(name)).unwrap();
        assert_eq!(bytes, format!("%PDF-1.7 {name}").into_bytes());
    }
    // Each call saw only its own content.
    for call in renderer.calls() {
        assert!(call
            .inner_html
            .ends_with(&format!("<em>{}</em>", call.options.filename)));
    }
}

#[tokio::test]
async fn test_exporter_and_callback_move_into_spawned_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter_in(FakeRenderer::ok(), dir.path());
    let recorder = Arc::new(Recorder::default());
    let cb: SharedCallback = recorder.clone();

    let handles: Vec<_> = (0..3)
        .map(|i| {
            let exporter = exporter.clone();
            let cb = Arc::clone(&cb);
            tokio::spawn(async move {
                let name = format!("spawned-{i}.pdf");
                exporter.export("Go, Rust", Some(name.as_str()), Some(cb.as_ref())).await
            })
        })
        .collect();

    for h in handles {
        assert!(h.await.expect("spawn must succeed"));
    }
    assert_eq!(recorder.events.lock().unwrap().len(), 3);
}

// ── Preparer + button, through the public API ────────────────────────────────

#[test]
fn test_prepare_twice_gives_equal_independent_copies() {
    let source = ContentSource::from("Rust, Go");
    let a = prepare_content(&source);
    let b = prepare_content(&source);
    assert_eq!(a, b);
    assert_eq!(source, ContentSource::from("Rust, Go"));
}

#[test]
fn test_button_round_trip_around_export() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = exporter_in(FakeRenderer::ok(), dir.path());
    let mut button = Button::new("Download");

    set_loading(&mut button, true, None);
    assert!(!button.enabled);
    let ok = cvpdf::export_sync(&exporter, "x", None, Some(&NoopExportCallback));
    set_loading(&mut button, false, Some("Download"));

    assert!(ok);
    assert_eq!(button, Button::new("Download"));
}

// ── Headless Chrome (opt-in) ─────────────────────────────────────────────────

/// Skip unless `CHROME_E2E` is set.
macro_rules! chrome_skip_unless_enabled {
    () => {
        if std::env::var("CHROME_E2E").is_err() {
            println!("SKIP — set CHROME_E2E=1 to run headless Chrome tests");
            return;
        }
    };
}

#[cfg(feature = "chrome")]
#[tokio::test]
async fn test_chrome_produces_pdf() {
    chrome_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::builder()
        .output_dir(dir.path())
        .build()
        .unwrap();
    let exporter = PdfExporter::chrome(config);

    let path = exporter
        .try_export(
            "**Ada Lovelace**\n\nMatematikçi\n\nRust, Go, SQL",
            Some("chrome.pdf"),
        )
        .await
        .expect("Chrome export should succeed");

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"), "not a PDF");
    println!("✓ {} bytes → {}", bytes.len(), path.display());
}
