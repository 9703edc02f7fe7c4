//! Completion callback for PDF exports.
//!
//! Pass a `&dyn ExportCallback` to [`crate::export::PdfExporter::export`] to
//! learn how an export ended. When given, it is called exactly once per
//! export: `(true, None)` on success, `(false, Some(error))` on failure.
//! When omitted, nothing is called and the boolean return value is the only
//! report.
//!
//! Closures work directly:
//!
//! ```rust
//! use cvpdf::{ExportCallback, ExportError};
//!
//! let report = |ok: bool, err: Option<&ExportError>| {
//!     if !ok {
//!         eprintln!("export failed: {}", err.map(|e| e.to_string()).unwrap_or_default());
//!     }
//! };
//! report.on_export_complete(true, None);
//! ```

use crate::error::ExportError;
use std::sync::Arc;

/// Notified once when an export finishes.
///
/// `Send + Sync` because concurrent exports on one exporter may finish on
/// different worker threads.
pub trait ExportCallback: Send + Sync {
    /// # Arguments
    /// * `success` — whether the PDF was produced and saved
    /// * `error`   — the failure, present exactly when `success` is false
    fn on_export_complete(&self, success: bool, error: Option<&ExportError>) {
        let _ = (success, error);
    }
}

impl<F> ExportCallback for F
where
    F: Fn(bool, Option<&ExportError>) + Send + Sync,
{
    fn on_export_complete(&self, success: bool, error: Option<&ExportError>) {
        self(success, error)
    }
}

/// A callback that ignores every notification.
pub struct NoopExportCallback;

impl ExportCallback for NoopExportCallback {}

/// Shared callback handle, for callers that keep one around across exports.
pub type SharedCallback = Arc<dyn ExportCallback>;
