//! Filesystem abstraction for module resolution
//!
//! The resolver only needs two operations, existence checks and reading text
//! files, so the trait is synchronous and small. `NativeFs` goes to disk;
//! `MemoryFs` (behind the `test-utils` feature) keeps everything in a map so
//! resolver tests can describe a package tree inline.

use std::io;
use std::path::Path;

/// Maximum accepted manifest size (10MB)
pub const MAX_MANIFEST_SIZE: u64 = 10 * 1024 * 1024;

/// Read-only filesystem access used by the module resolver.
pub trait FileSystem: Send + Sync {
    /// Whether `path` exists as a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Whether `path` exists as a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Read a UTF-8 text file.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Filesystem access backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFs;

impl FileSystem for NativeFs {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let metadata = std::fs::metadata(path)?;
        if metadata.len() > MAX_MANIFEST_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "{} exceeds maximum size of {}MB",
                    path.display(),
                    MAX_MANIFEST_SIZE / 1024 / 1024
                ),
            ));
        }
        std::fs::read_to_string(path)
    }
}

/// In-memory filesystem for tests.
///
/// Directories are implied by the files stored beneath them.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default, Clone)]
pub struct MemoryFs {
    files: rustc_hash::FxHashMap<std::path::PathBuf, String>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any previous content.
    pub fn with_file(mut self, path: impl Into<std::path::PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<std::path::PathBuf>, content: impl Into<String>) {
        use path_clean::PathClean;
        self.files.insert(path.into().clean(), content.into());
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl FileSystem for MemoryFs {
    fn is_file(&self, path: &Path) -> bool {
        use path_clean::PathClean;
        self.files.contains_key(&path.to_path_buf().clean())
    }

    fn is_dir(&self, path: &Path) -> bool {
        use path_clean::PathClean;
        let dir = path.to_path_buf().clean();
        self.files
            .keys()
            .any(|file| file != &dir && file.starts_with(&dir))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        use path_clean::PathClean;
        self.files
            .get(&path.to_path_buf().clean())
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_fs_implies_directories() {
        let fs = MemoryFs::new().with_file("/pkgs/users/package.json", "{}");
        assert!(fs.is_file(Path::new("/pkgs/users/package.json")));
        assert!(fs.is_dir(Path::new("/pkgs/users")));
        assert!(fs.is_dir(Path::new("/pkgs")));
        assert!(!fs.is_dir(Path::new("/pkgs/users/package.json")));
        assert!(!fs.is_dir(Path::new("/pkgs/search")));
    }

    #[test]
    fn memory_fs_normalizes_paths() {
        let fs = MemoryFs::new().with_file("/a/b/../c/file.json", "x");
        assert!(fs.is_file(Path::new("/a/c/file.json")));
        assert_eq!(fs.read_to_string(Path::new("/a/./c/file.json")).unwrap(), "x");
    }

    #[test]
    fn memory_fs_missing_file_is_not_found() {
        let fs = MemoryFs::new();
        let err = fs.read_to_string(Path::new("/nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn native_fs_reads_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, "{}").unwrap();

        assert!(NativeFs.is_file(&path));
        assert!(NativeFs.is_dir(dir.path()));
        assert_eq!(NativeFs.read_to_string(&path).unwrap(), "{}");
    }
}
