//! Transpile stage: source file in, host language text out

use crate::error::BuildError;
use std::error::Error;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Converts source dialect text into host language text.
///
/// Implementations are expected to be deterministic. The pipeline never
/// inspects the text it passes in or gets back.
pub trait SourceTranspiler {
    fn transpile(&self, source: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// The built-in Blaze to Go transpiler
#[derive(Debug, Clone, Copy, Default)]
pub struct BlazeTranspiler;

impl SourceTranspiler for BlazeTranspiler {
    fn transpile(&self, source: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        Ok(blaze_transpiler::Transpiler::new(source).transpile()?)
    }
}

/// Read `path` and hand its contents to the transpiler verbatim
pub fn transpile_source(
    transpiler: &dyn SourceTranspiler,
    path: &Path,
) -> Result<String, BuildError> {
    debug!("Reading source {}", path.display());
    let source = fs::read_to_string(path).map_err(|e| BuildError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let host_text = transpiler
        .transpile(&source)
        .map_err(|e| BuildError::Transpile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    debug!(
        "Transpiled {} ({} bytes -> {} bytes)",
        path.display(),
        source.len(),
        host_text.len()
    );
    Ok(host_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Echoes its input wrapped in markers
    struct Echo;

    impl SourceTranspiler for Echo {
        fn transpile(&self, source: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
            Ok(format!("<{}>", source))
        }
    }

    struct Reject;

    impl SourceTranspiler for Reject {
        fn transpile(&self, _source: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
            Err("unsupported construct".into())
        }
    }

    #[test]
    fn test_output_is_returned_verbatim() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("main.blaze");
        fs::write(&path, "x <- 1!\n").unwrap();

        let text = transpile_source(&Echo, &path).unwrap();
        assert_eq!(text, "<x <- 1!\n>");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing.blaze");

        let err = transpile_source(&Echo, &path).unwrap_err();
        assert!(matches!(err, BuildError::Read { .. }));
        assert!(err.to_string().contains("missing.blaze"));
    }

    #[test]
    fn test_transpiler_failure_names_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bad.blaze");
        fs::write(&path, "???").unwrap();

        let err = transpile_source(&Reject, &path).unwrap_err();
        assert!(matches!(err, BuildError::Transpile { .. }));
        assert!(err.to_string().contains("bad.blaze"));
        assert!(err.to_string().contains("unsupported construct"));
    }

    #[test]
    fn test_blaze_transpiler_produces_go() {
        let go = BlazeTranspiler.transpile("println(\"hi\")!\n").unwrap();
        assert!(go.starts_with("package main\n"));
        assert!(go.contains("fmt.Println(\"hi\")"));
    }

    #[test]
    fn test_blaze_syntax_error_is_transpile_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("broken.blaze");
        fs::write(&path, "x <- 1\n").unwrap();

        let err = transpile_source(&BlazeTranspiler, &path).unwrap_err();
        assert!(err.to_string().contains("missing `!`"));
    }
}
