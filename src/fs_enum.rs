use crate::error::{Result, TransferError};
use std::path::{Path, PathBuf};
// Sender-side enumeration of the files to transfer

/// Resolve the sender's target into the list of files to send.
///
/// A file yields itself; a directory yields every regular file beneath it,
/// in walk order. Symlinks are not followed.
pub fn enumerate_files(target: &Path) -> Result<Vec<PathBuf>> {
    use walkdir::WalkDir;

    let metadata = std::fs::metadata(target).map_err(|e| TransferError::fs(target, e))?;
    if !metadata.is_dir() {
        return Ok(vec![target.to_path_buf()]);
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(target).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                // Vanished or unreadable entries are skipped, the rest still go
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() {
            entries.push(entry.into_path());
        }
    }

    Ok(entries)
}

/// Name announced for a local path, with `/` separators.
///
/// The path is used as given unless `base` is set, in which case the name is
/// relative to `base` (falling back to the bare file name when the path is
/// `base` itself).
pub fn announced_name(path: &Path, base: Option<&Path>) -> String {
    let rel = match base.and_then(|b| path.strip_prefix(b).ok()) {
        Some(rel) if !rel.as_os_str().is_empty() => rel,
        Some(_) => path.file_name().map(Path::new).unwrap_or(path),
        None => path,
    };
    let s = rel.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}
