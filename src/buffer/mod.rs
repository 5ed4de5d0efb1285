pub mod reader;

use std::io;
use std::path::{Path, PathBuf};

/// Buffer file extension. The writer names files `<base><suffix>.json`.
const BUFFER_EXTENSION: &str = ".json";

/// Sidecar extension for the bookmark that tracks shipping progress.
const BOOKMARK_EXTENSION: &str = ".bookmark";

/// Path of the bookmark sidecar for a buffer base path.
pub fn bookmark_path(buffer_base: &Path) -> PathBuf {
    let mut path = buffer_base.as_os_str().to_os_string();
    path.push(BOOKMARK_EXTENSION);
    PathBuf::from(path)
}

/// List the current buffer files for `buffer_base`, sorted ascending by name.
///
/// `buffer_base` is the shared prefix of the set, e.g. `/var/log/app/buffer`
/// matches `buffer-20240101.json` in `/var/log/app`. Name order is relied on
/// as chronological order; that invariant belongs to the writer and is not
/// verified here. Returns an empty vec when nothing matches.
pub fn list_buffer_files(buffer_base: &Path) -> io::Result<Vec<PathBuf>> {
    let dir = match buffer_base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let prefix = buffer_base
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();

    let mut files = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(&prefix) && name.ends_with(BUFFER_EXTENSION) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
