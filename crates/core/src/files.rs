use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `data` to `dir/filename`, creating `dir` if needed.
///
/// Returns the path written.
///
/// # Errors
/// Returns an error if the directory cannot be created or the file written.
pub fn write_to_file(dir: impl AsRef<Path>, filename: &str, data: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)?;
    }

    let path = dir.join(filename);
    fs::write(&path, data)?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "wrote file");

    Ok(path)
}
