//! Input resolution: read a user-supplied path (or `-` for stdin) into a
//! [`ContentSource`].
//!
//! Markdown and HTML files are both read as markup; the preparer handles
//! either. Errors distinguish a missing file from an unreadable one so the
//! CLI can say which.

use crate::error::ExportError;
use crate::pipeline::prepare::ContentSource;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Check if the input string means standard input.
pub fn is_stdin(input: &str) -> bool {
    input == "-"
}

/// Read `input` (a file path, or `-` for stdin) as markup.
pub async fn read_source(input: &str) -> Result<ContentSource, ExportError> {
    if is_stdin(input) {
        read_stdin().await
    } else {
        read_local(input).await
    }
}

async fn read_stdin() -> Result<ContentSource, ExportError> {
    let mut markup = String::new();
    tokio::io::stdin()
        .read_to_string(&mut markup)
        .await
        .map_err(|e| ExportError::Internal(format!("read stdin: {e}")))?;
    debug!("Read {} bytes from stdin", markup.len());
    Ok(ContentSource::Markup(markup))
}

/// Read a local file, mapping I/O failures to input errors.
async fn read_local(path_str: &str) -> Result<ContentSource, ExportError> {
    let path = PathBuf::from(path_str);

    let markup = match tokio::fs::read_to_string(&path).await {
        Ok(markup) => markup,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExportError::PermissionDenied { path });
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExportError::FileNotFound { path });
        }
        Err(e) => {
            return Err(ExportError::Internal(format!(
                "read '{}': {e}",
                path.display()
            )));
        }
    };

    debug!("Resolved local input: {} ({} bytes)", path.display(), markup.len());
    Ok(ContentSource::Markup(markup))
}
