use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// read a file, returning `None` when it does not exist
pub fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::FileReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// replace a file's content in one step.
///
/// the content goes to a temporary file in the target directory which is
/// then renamed over the target, so a failed write leaves the old file intact.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let write_error = |source: std::io::Error| Error::FileWriteError {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_error)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(content.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "file written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("docs").join("CHANGELOG.md");

        write_atomic(&target, "hello\n").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "hello\n");
    }

    #[test]
    fn test_write_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("CHANGELOG.md");
        fs::write(&target, "old content that is longer\n").unwrap();

        write_atomic(&target, "new\n").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new\n");

        // no temporary files left behind
        let entries = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_read_if_exists() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("missing.md");
        assert!(read_if_exists(&target).unwrap().is_none());

        fs::write(&target, "x").unwrap();
        assert_eq!(read_if_exists(&target).unwrap().as_deref(), Some("x"));
    }
}
