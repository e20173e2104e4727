use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `contents` without ever exposing a partial file: the
/// data goes to a temporary file in the same directory which is then renamed
/// over the target.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let error = || ErrorKind::Persist(path.to_path_buf());
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory).or_raise(error)?;
    let mut file = NamedTempFile::new_in(directory).or_raise(error)?;
    file.write_all(contents).or_raise(error)?;
    file.as_file().sync_all().or_raise(error)?;
    file.persist(path).or_raise(error)?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote file");
    Ok(())
}
