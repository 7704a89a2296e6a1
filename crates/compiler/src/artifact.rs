//! Source files and the artifacts derived from them

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A source file and its stem (the path minus its final extension)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    stem: PathBuf,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stem = path.with_extension("");
        SourceFile { path, stem }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `dir/app.v2.blaze` -> `dir/app.v2`
    pub fn stem(&self) -> &Path {
        &self.stem
    }

    /// The executable a build produces: the stem itself
    pub fn executable(&self) -> &Path {
        &self.stem
    }

    /// The permanent host file written by `transpile`: `<stem>.<ext>`
    pub fn persisted_artifact(&self, extension: &str) -> PathBuf {
        with_appended_extension(&self.stem, extension)
    }
}

/// Append `.ext` without replacing an existing dotted segment.
/// `Path::with_extension` would turn `app.v2` into `app.go`.
pub fn with_appended_extension(stem: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// A temporary host source file, removed when released.
///
/// Call [`TempArtifact::cleanup`] to remove it and observe the result.
/// If the guard is dropped instead (early return, panic), `Drop` removes
/// the file and logs any failure.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    released: bool,
}

impl TempArtifact {
    /// Create `path` exclusively and write `contents` to it.
    ///
    /// Fails with `AlreadyExists` if the path is taken. A partially
    /// written file is removed before the error is returned.
    pub fn create(path: PathBuf, contents: &str) -> io::Result<Self> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;

        // From here on the guard owns the file
        let artifact = TempArtifact {
            path,
            released: false,
        };
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        debug!("Wrote temporary artifact {}", artifact.path.display());
        Ok(artifact)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file, reporting failure to the caller
    pub fn cleanup(mut self) -> io::Result<()> {
        self.released = true;
        fs::remove_file(&self.path)?;
        debug!("Removed temporary artifact {}", self.path.display());
        Ok(())
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(
                "Failed to remove temporary artifact {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_stem_strips_final_extension_only() {
        let source = SourceFile::new("dir/app.v2.blaze");
        assert_eq!(source.stem(), Path::new("dir/app.v2"));
        assert_eq!(source.executable(), Path::new("dir/app.v2"));
        assert_eq!(
            source.persisted_artifact("go"),
            PathBuf::from("dir/app.v2.go")
        );
    }

    #[test]
    fn test_stem_without_extension() {
        let source = SourceFile::new("program");
        assert_eq!(source.stem(), Path::new("program"));
    }

    #[test]
    fn test_create_and_cleanup() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("app0123456789.go");

        let artifact = TempArtifact::create(path.clone(), "package main\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "package main\n");

        artifact.cleanup().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("appabcdef0123.go");
        {
            let _artifact = TempArtifact::create(path.clone(), "x").unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_create_refuses_existing_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("taken.go");
        fs::write(&path, "original").unwrap();

        let err = TempArtifact::create(path.clone(), "new").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        // The existing file is neither overwritten nor removed
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_cleanup_reports_missing_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("gone.go");
        let artifact = TempArtifact::create(path.clone(), "x").unwrap();
        fs::remove_file(&path).unwrap();

        let err = artifact.cleanup().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
