use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use super::FileSink;
use crate::errors::GenerationError;

/// Writes artifacts under a root directory, one file per path.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSink for DirectorySink {
    /// Only plain relative paths are accepted; anything that could leave
    /// the root is an `InvalidInput` error.
    fn write(&mut self, path: &str, text: &str) -> Result<(), GenerationError> {
        let relative = Path::new(path);
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !plain || path.is_empty() {
            return Err(GenerationError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to write outside the output directory: {path}"),
            )));
        }
        write_bytes_atomic(&self.root.join(relative), text.as_bytes())?;
        Ok(())
    }
}

/// Replace `path` with `data` through a temporary sibling file and a rename.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            sync_dir(parent)?;
        }
    }

    Ok(())
}

fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "invalid path for atomic write")
    })?;
    let tmp_name = format!("{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrites_existing_file() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("tagddl_sink_{}", uuid::Uuid::new_v4()));
        let mut sink = DirectorySink::new(&dir);

        sink.write("db_create.sql", "first").expect("first write");
        sink.write("db_create.sql", "second").expect("second write");

        let content = std::fs::read_to_string(dir.join("db_create.sql")).expect("read back");
        assert_eq!(content, "second");
        assert!(!dir.join("db_create.sql.tmp").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_paths_leaving_root() {
        let mut base = std::env::temp_dir();
        base.push(format!("tagddl_sink_{}", uuid::Uuid::new_v4()));
        let mut sink = DirectorySink::new(base.join("out"));

        for path in ["../escaped_create.sql", "/tmp/escaped_create.sql", ""] {
            let err = sink.write(path, "CREATE TABLE x ();").expect_err("path rejected");
            assert!(matches!(err, GenerationError::Io(_)));
        }
        assert!(!base.join("escaped_create.sql").exists());
        assert!(!sink.root().exists());
        let _ = std::fs::remove_dir_all(&base);
    }
}
