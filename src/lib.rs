//! # cvpdf
//!
//! Prepare CV-style HTML or Markdown-flavoured content for print and export
//! it to a PDF file.
//!
//! ## Pipeline Overview
//!
//! ```text
//! element / markup string
//!  │
//!  ├─ 1. Prepare  detached copy + print stylesheet + text rules
//!  │              (blank lines, **bold**, *italic*, skill-tag pills)
//!  ├─ 2. Render   Renderer capability → PDF bytes (headless Chrome by default)
//!  └─ 3. Save     atomic write to <output_dir>/<filename>
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cvpdf::{ExportConfig, PdfExporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let exporter = PdfExporter::chrome(ExportConfig::default());
//!     let ok = exporter
//!         .export("**Ada Lovelace**\n\nRust, Go, SQL", Some("cv.pdf"), None)
//!         .await;
//!     println!("exported: {ok}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `chrome` | on      | [`ChromeRenderer`], printing through headless Chrome |
//! | `cli`    | on      | Enables the `cvpdf` binary (clap + anyhow + tracing-subscriber) |
//!
//! Without `chrome`, implement [`Renderer`] for your own engine and pass it
//! to [`PdfExporter::new`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod button;
pub mod callback;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use button::{set_loading, Button, Control};
pub use callback::{ExportCallback, NoopExportCallback, SharedCallback};
pub use config::{
    ExportConfig, ExportConfigBuilder, ImageFormat, Margins, Orientation, PaperFormat,
    RenderOptions, RenderOptionsBuilder, Unit, DEFAULT_FILENAME,
};
pub use error::ExportError;
pub use export::{export_sync, PdfExporter};
pub use pipeline::markup::Element;
pub use pipeline::prepare::{prepare_content, ContentSource, PreparedContent};
#[cfg(feature = "chrome")]
pub use pipeline::render::ChromeRenderer;
pub use pipeline::render::Renderer;
