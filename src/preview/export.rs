//! Export the current fragment as a standalone HTML document.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::AppError;

use super::scaffold;

/// Fixed base name for downloaded artifacts.
pub const EXPORT_FILE_NAME: &str = "index.html";

/// Write the standalone document to a temp file and open it in the default
/// browser. Returns the path so the frontend can show where it went.
pub fn open_in_browser(body: &str) -> Result<PathBuf, AppError> {
    let document = wrap(body)?;

    let mut file = tempfile::Builder::new()
        .prefix("pageforge-preview-")
        .suffix(".html")
        .tempfile()?;
    file.write_all(document.as_bytes())?;

    // Keep the file alive past this call — the browser loads it lazily.
    let (_handle, path) = file.keep().map_err(|e| AppError::Export(e.to_string()))?;

    open::that(&path).map_err(|e| AppError::Export(format!("failed to open browser: {e}")))?;

    tracing::info!(path = %path.display(), "Opened preview in browser");
    Ok(path)
}

/// Save the standalone document to a user-chosen destination. When the
/// destination is a directory, the fixed export file name is appended.
pub fn save_to(body: &str, dest: &Path) -> Result<PathBuf, AppError> {
    let document = wrap(body)?;

    let target = if dest.is_dir() {
        dest.join(EXPORT_FILE_NAME)
    } else {
        dest.to_path_buf()
    };

    std::fs::write(&target, document)?;
    tracing::info!(path = %target.display(), "Exported design");
    Ok(target)
}

fn wrap(body: &str) -> Result<String, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::Export("No code generated yet".into()));
    }
    Ok(scaffold::export_document(body))
}
