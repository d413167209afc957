use std::fs;
use std::io::Write;
use std::path::Path;

use canon_core::errors::{CanonError, ErrorInfo};
use tempfile::NamedTempFile;
use tracing::info;

use crate::document::ExportDocument;

fn io_error(code: &str, path: &Path, err: impl std::fmt::Display) -> CanonError {
    CanonError::Io(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Replaces `path` with `bytes` in one rename.
///
/// The bytes are staged in a temporary file next to the target and only
/// renamed over it once fully written and flushed, so readers see either
/// the old document or the new one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CanonError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| io_error("canon_export.create_dir", parent, err))?;
    let mut staged = NamedTempFile::new_in(parent)
        .map_err(|err| io_error("canon_export.stage", parent, err))?;
    staged
        .write_all(bytes)
        .and_then(|()| staged.flush())
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|err| io_error("canon_export.write", staged.path(), err))?;
    staged
        .persist(path)
        .map_err(|err| io_error("canon_export.persist", path, err.error))?;
    Ok(())
}

/// Publishes a document as canonical JSON.
pub fn publish(document: &ExportDocument, path: &Path, pretty: bool) -> Result<(), CanonError> {
    let bytes = document.to_bytes(pretty)?;
    write_atomic(path, &bytes)?;
    info!(
        path = %path.display(),
        bytes = bytes.len(),
        content_hash = %document.content_hash,
        "export document published"
    );
    Ok(())
}

/// Reads a published document back.
pub fn read_document(path: &Path) -> Result<ExportDocument, CanonError> {
    let bytes = fs::read(path).map_err(|err| io_error("canon_export.read", path, err))?;
    ExportDocument::from_slice(&bytes)
}
