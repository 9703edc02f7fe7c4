//! The rendering capability: prepared content in, PDF bytes out.
//!
//! [`Renderer`] is the seam between this crate and whatever engine actually
//! lays out and paginates the document. The exporter only ever talks to the
//! trait, so tests plug in a fake and applications can plug in their own
//! engine.
//!
//! ## Why spawn_blocking?
//!
//! [`ChromeRenderer`] drives headless Chrome through `headless_chrome`,
//! whose API is synchronous and blocks on the DevTools socket for the whole
//! print. `tokio::task::spawn_blocking` moves that onto the blocking pool so
//! concurrent exports do not stall the runtime's worker threads.

use crate::config::RenderOptions;
use crate::error::ExportError;
use crate::pipeline::prepare::PreparedContent;
use futures::future::BoxFuture;

/// Renders prepared content to a paginated PDF.
///
/// Implementations must be `Send + Sync`: one renderer is shared by every
/// export an exporter runs, possibly concurrently.
pub trait Renderer: Send + Sync {
    /// Render `content` with `options` and return the PDF file bytes.
    fn render<'a>(
        &'a self,
        content: &'a PreparedContent,
        options: &'a RenderOptions,
    ) -> BoxFuture<'a, Result<Vec<u8>, ExportError>>;
}

#[cfg(feature = "chrome")]
pub use chrome::ChromeRenderer;

#[cfg(feature = "chrome")]
mod chrome {
    use super::Renderer;
    use crate::config::{Orientation, RenderOptions};
    use crate::error::ExportError;
    use crate::pipeline::prepare::PreparedContent;
    use futures::future::{BoxFuture, FutureExt};
    use headless_chrome::types::PrintToPdfOptions;
    use headless_chrome::Browser;
    use std::io::Write;
    use tracing::{debug, info};
    use url::Url;

    /// Prints the prepared document with a locally installed Chrome/Chromium.
    ///
    /// Chrome prints vector output, so [`RenderOptions::image`] and the
    /// rasterisation scale have nothing to act on here; margins, paper format
    /// and orientation are honoured exactly.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct ChromeRenderer;

    impl ChromeRenderer {
        pub fn new() -> Self {
            Self
        }
    }

    impl Renderer for ChromeRenderer {
        fn render<'a>(
            &'a self,
            content: &'a PreparedContent,
            options: &'a RenderOptions,
        ) -> BoxFuture<'a, Result<Vec<u8>, ExportError>> {
            let html = content.to_html_document(&options.filename);
            let print = print_options(options);
            let trace = options.raster.logging;

            async move {
                tokio::task::spawn_blocking(move || print_blocking(&html, print, trace))
                    .await
                    .map_err(|e| ExportError::Internal(format!("Render task panicked: {}", e)))?
            }
            .boxed()
        }
    }

    /// Map the render table onto Chrome's print parameters (all in inches).
    pub(super) fn print_options(options: &RenderOptions) -> PrintToPdfOptions {
        let unit = options.page.unit;
        let (width_mm, height_mm) = options.page.format.size_mm();

        PrintToPdfOptions {
            landscape: Some(options.page.orientation == Orientation::Landscape),
            print_background: Some(true),
            paper_width: Some(width_mm / 25.4),
            paper_height: Some(height_mm / 25.4),
            margin_top: Some(unit.to_inches(options.margin.top)),
            margin_bottom: Some(unit.to_inches(options.margin.bottom)),
            margin_left: Some(unit.to_inches(options.margin.left)),
            margin_right: Some(unit.to_inches(options.margin.right)),
            ..Default::default()
        }
    }

    /// Blocking implementation of the print.
    fn print_blocking(
        html: &str,
        print: PrintToPdfOptions,
        trace: bool,
    ) -> Result<Vec<u8>, ExportError> {
        // Chrome loads the page from disk; the file lives until we return.
        let mut page = tempfile::Builder::new()
            .prefix("cvpdf-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| ExportError::Internal(format!("tempfile: {e}")))?;
        let write_err = |e: std::io::Error| ExportError::Internal(format!("tempfile write: {e}"));
        page.write_all(html.as_bytes()).map_err(write_err)?;
        page.flush().map_err(write_err)?;

        let url = Url::from_file_path(page.path()).map_err(|_| {
            ExportError::render(format!(
                "cannot build a file URL for '{}'",
                page.path().display()
            ))
        })?;

        let browser =
            Browser::default().map_err(|e| ExportError::render(format!("launch Chrome: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| ExportError::render(format!("open tab: {e}")))?;
        if trace {
            debug!("Chrome navigating to {}", url);
        }

        tab.navigate_to(url.as_str())
            .map_err(|e| ExportError::render(format!("navigate: {e}")))?;
        tab.wait_until_navigated()
            .map_err(|e| ExportError::render(format!("load page: {e}")))?;

        let bytes = tab
            .print_to_pdf(Some(print))
            .map_err(|e| ExportError::render(format!("print to PDF: {e}")))?;
        info!("Chrome printed {} bytes", bytes.len());

        Ok(bytes)
    }
}
