//! Crash-safe file replacement
//!
//! The new contents go to a sibling temp file which is synced and then
//! renamed over the target, so readers only ever see the old or the new file.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

/// Atomically replace `path` with `contents`.
///
/// Parent directories are created as needed. On Unix the file is left
/// readable by its owner only, since it may hold credentials.
///
/// # Errors
/// Any I/O failure; the original file is untouched in that case.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let result = (|| {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        drop(file);
        set_owner_only(&temp_path)?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    } else {
        debug!(path = %path.display(), bytes = contents.len(), "File replaced atomically");
    }
    result
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> io::Result<()> {
    Ok(())
}
