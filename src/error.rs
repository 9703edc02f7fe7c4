//! Error types for the cvpdf library.
//!
//! [`ExportError`] covers every way an export can go wrong. Only one of them
//! is interesting to an end user of the export button: the document could not
//! be produced. [`crate::export::PdfExporter::export`] therefore absorbs every
//! variant into a `false` outcome plus a callback, while
//! [`crate::export::PdfExporter::try_export`] hands the value back for callers
//! that want to inspect it.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the cvpdf library.
#[derive(Debug, Error)]
pub enum ExportError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Render errors ─────────────────────────────────────────────────────
    /// The rendering capability failed to turn the prepared content into a PDF.
    #[error("PDF rendering failed: {detail}")]
    RenderFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExportError {
    /// Shorthand for a [`ExportError::RenderFailed`] with the given detail.
    pub fn render(detail: impl Into<String>) -> Self {
        ExportError::RenderFailed {
            detail: detail.into(),
        }
    }

    /// `true` when the failure came from the rendering capability itself.
    pub fn is_render_failure(&self) -> bool {
        matches!(self, ExportError::RenderFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failed_display() {
        let e = ExportError::render("tab crashed");
        let msg = e.to_string();
        assert!(msg.contains("rendering failed"), "got: {msg}");
        assert!(msg.contains("tab crashed"), "got: {msg}");
        assert!(e.is_render_failure());
    }

    #[test]
    fn output_write_failed_keeps_source() {
        let e = ExportError::OutputWriteFailed {
            path: PathBuf::from("/nope/belge.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("belge.pdf"));
        assert!(std::error::Error::source(&e).is_some());
        assert!(!e.is_render_failure());
    }

    #[test]
    fn invalid_config_display() {
        let e = ExportError::InvalidConfig("quality must be 0–1".into());
        assert!(e.to_string().starts_with("Invalid configuration"));
    }
}
