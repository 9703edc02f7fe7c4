//! Export entry points.
//!
//! [`PdfExporter::export`] is the button-facing API: it never fails, it
//! answers `true`/`false` and tells an optional callback. Failures are
//! logged and absorbed. [`PdfExporter::try_export`] runs the same steps and
//! returns the error instead.

use crate::callback::ExportCallback;
use crate::config::{resolve_filename, ExportConfig};
use crate::error::ExportError;
use crate::pipeline::prepare::{prepare_content, ContentSource};
use crate::pipeline::render::Renderer;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Prepares content and hands it to a [`Renderer`] with a fixed configuration.
///
/// Holds no mutable state: any number of exports may run concurrently on one
/// exporter, each with its own prepared copy and options. Completion order of
/// concurrent exports is not guaranteed.
#[derive(Clone)]
pub struct PdfExporter {
    renderer: Arc<dyn Renderer>,
    config: ExportConfig,
}

impl std::fmt::Debug for PdfExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfExporter")
            .field("renderer", &"<dyn Renderer>")
            .field("config", &self.config)
            .finish()
    }
}

impl PdfExporter {
    pub fn new(renderer: Arc<dyn Renderer>, config: ExportConfig) -> Self {
        Self { renderer, config }
    }

    /// Exporter backed by headless Chrome.
    #[cfg(feature = "chrome")]
    pub fn chrome(config: ExportConfig) -> Self {
        Self::new(Arc::new(crate::pipeline::render::ChromeRenderer::new()), config)
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export `source` to a PDF named `filename` (default `belge.pdf`).
    ///
    /// Returns `true` once the file is written. On any failure the error is
    /// logged and `false` is returned; nothing is propagated. `callback`, when
    /// given, is called exactly once with the same outcome.
    pub async fn export(
        &self,
        source: impl Into<ContentSource>,
        filename: Option<&str>,
        callback: Option<&dyn ExportCallback>,
    ) -> bool {
        match self.try_export(source, filename).await {
            Ok(path) => {
                info!("PDF saved to {}", path.display());
                if let Some(cb) = callback {
                    cb.on_export_complete(true, None);
                }
                true
            }
            Err(e) => {
                error!("PDF export failed: {}", e);
                if let Some(cb) = callback {
                    cb.on_export_complete(false, Some(&e));
                }
                false
            }
        }
    }

    /// Export `source` and return where the PDF was written.
    ///
    /// # Errors
    /// - [`ExportError::RenderFailed`] when the renderer fails or returns nothing
    /// - [`ExportError::OutputWriteFailed`] when the file cannot be saved
    pub async fn try_export(
        &self,
        source: impl Into<ContentSource>,
        filename: Option<&str>,
    ) -> Result<PathBuf, ExportError> {
        let total_start = Instant::now();
        let filename = resolve_filename(filename);
        info!("Starting PDF export: {}", filename);

        // ── Step 1: Prepare a detached copy ──────────────────────────────────
        let source = source.into();
        let prepared = prepare_content(&source);

        // ── Step 2: Render ───────────────────────────────────────────────────
        let options = self.config.options.with_filename(&filename);
        let render_start = Instant::now();
        let bytes = self.renderer.render(&prepared, &options).await?;
        if bytes.is_empty() {
            return Err(ExportError::render("renderer returned an empty document"));
        }
        debug!(
            "Rendered {} bytes in {}ms",
            bytes.len(),
            render_start.elapsed().as_millis()
        );

        // ── Step 3: Save ─────────────────────────────────────────────────────
        let path = self.config.output_path(&filename);
        let size = bytes.len();
        write_atomic(&path, bytes).await?;

        info!(
            "Export complete: {} ({} bytes, {}ms total)",
            path.display(),
            size,
            total_start.elapsed().as_millis()
        );
        Ok(path)
    }
}

/// Synchronous wrapper around [`PdfExporter::export`].
///
/// Creates a temporary tokio runtime internally; a runtime that cannot be
/// created counts as a failed export.
pub fn export_sync(
    exporter: &PdfExporter,
    source: impl Into<ContentSource>,
    filename: Option<&str>,
    callback: Option<&dyn ExportCallback>,
) -> bool {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(exporter.export(source, filename, callback)),
        Err(e) => {
            let e = ExportError::Internal(format!("Failed to create tokio runtime: {}", e));
            error!("PDF export failed: {}", e);
            if let Some(cb) = callback {
                cb.on_export_complete(false, Some(&e));
            }
            false
        }
    }
}

/// Write `bytes` to `path` via a uniquely named temp file in the same
/// directory, then rename it into place. Readers never see a partial PDF,
/// and concurrent exports to one name each get their own temp file.
async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<(), ExportError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || persist_blocking(&path, &bytes))
        .await
        .map_err(|e| ExportError::Internal(format!("Save task panicked: {}", e)))?
}

fn persist_blocking(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let write_err = |e: std::io::Error| ExportError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    // Dropped (and deleted) on any early return below.
    let mut tmp = tempfile::Builder::new()
        .prefix(".cvpdf-")
        .suffix(".pdf.tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
