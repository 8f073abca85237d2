//! File system access for programs and module resolution.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// The file system operations a [`Program`](crate::Program) needs.
pub trait CompilerHost {
    fn read_file(&self, path: &Path) -> Option<String>;

    fn file_exists(&self, path: &Path) -> bool;

    fn directory_exists(&self, path: &Path) -> bool;

    /// Writes `contents`, creating parent directories as needed.
    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn current_directory(&self) -> PathBuf;
}

/// A host backed by the real file system.
#[derive(Debug, Clone)]
pub struct SystemHost {
    current_directory: PathBuf,
}

impl SystemHost {
    pub fn new() -> Self {
        Self {
            current_directory: std::env::current_dir().unwrap_or_default(),
        }
    }

    pub fn with_current_directory(current_directory: impl Into<PathBuf>) -> Self {
        Self {
            current_directory: current_directory.into(),
        }
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerHost for SystemHost {
    fn read_file(&self, path: &Path) -> Option<String> {
        fs::read_to_string(path).ok()
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        debug!(path = %path.display(), bytes = contents.len(), "wrote file");
        Ok(())
    }

    fn current_directory(&self) -> PathBuf {
        self.current_directory.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let host = SystemHost::with_current_directory(dir.path());
        let target = dir.path().join("lib/nested/a.js");

        host.write_file(&target, "exports.a = 1;\n").unwrap();

        assert!(host.file_exists(&target));
        assert!(host.directory_exists(&dir.path().join("lib/nested")));
        assert_eq!(host.read_file(&target).as_deref(), Some("exports.a = 1;\n"));
        assert_eq!(host.current_directory(), dir.path());
    }

    #[test]
    fn test_missing_file() {
        let host = SystemHost::new();
        assert_eq!(host.read_file(Path::new("/definitely/not/here.ts")), None);
        assert!(!host.file_exists(Path::new("/definitely/not/here.ts")));
    }
}
