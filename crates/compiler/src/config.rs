//! Build configuration
//!
//! Defaults reproduce the classic behavior: `main.blaze` as the default
//! source, Go as the host language, `go build -o <stem> <temp>.go` as the
//! compiler invocation and a 10 character temporary suffix. A `blaze.toml`
//! can override any of these:
//!
//! ```toml
//! default_source = "app.blaze"
//! host_extension = "go"
//! suffix_length = 12
//!
//! [host_compiler]
//! program = "go"
//! args = ["build", "-trimpath", "-o", "{output}", "{input}"]
//! ```

use crate::error::BuildError;
use crate::namer::DEFAULT_SUFFIX_LENGTH;
use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the temporary host source file
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Placeholder replaced by the executable path
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Accepted range for the temporary suffix length
const SUFFIX_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 4..=32;

/// How to invoke the host language compiler
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HostCompiler {
    pub program: String,
    /// Arguments with `{input}` and `{output}` placeholders
    pub args: Vec<String>,
}

impl Default for HostCompiler {
    fn default() -> Self {
        HostCompiler {
            program: "go".to_string(),
            args: vec![
                "build".to_string(),
                "-o".to_string(),
                OUTPUT_PLACEHOLDER.to_string(),
                INPUT_PLACEHOLDER.to_string(),
            ],
        }
    }
}

impl HostCompiler {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        HostCompiler {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Substitute placeholders for one invocation.
    ///
    /// An argument that is exactly a placeholder becomes the path unchanged,
    /// so non-UTF-8 paths survive; embedded placeholders use a lossy rendering.
    pub fn render_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| match arg.as_str() {
                INPUT_PLACEHOLDER => input.as_os_str().to_owned(),
                OUTPUT_PLACEHOLDER => output.as_os_str().to_owned(),
                _ => OsString::from(
                    arg.replace(INPUT_PLACEHOLDER, &input.to_string_lossy())
                        .replace(OUTPUT_PLACEHOLDER, &output.to_string_lossy()),
                ),
            })
            .collect()
    }

    fn validate(&self) -> Result<(), String> {
        if self.program.trim().is_empty() {
            return Err("host_compiler.program cannot be empty".to_string());
        }
        if !self.args.iter().any(|a| a.contains(INPUT_PLACEHOLDER)) {
            return Err(format!(
                "host_compiler.args must reference {} (the generated source file)",
                INPUT_PLACEHOLDER
            ));
        }
        Ok(())
    }
}

/// Configuration for the build pipeline
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CompilerConfig {
    /// Source file used when no file argument is given
    pub default_source: PathBuf,

    /// Extension of generated host source files, without the dot
    pub host_extension: String,

    /// Length of the random hex suffix on temporary files
    pub suffix_length: usize,

    pub host_compiler: HostCompiler,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            default_source: PathBuf::from("main.blaze"),
            host_extension: "go".to_string(),
            suffix_length: DEFAULT_SUFFIX_LENGTH,
            host_compiler: HostCompiler::default(),
        }
    }
}

impl CompilerConfig {
    /// Name of the configuration file looked up in the working directory
    pub const FILE_NAME: &'static str = "blaze.toml";

    pub fn new() -> Self {
        CompilerConfig::default()
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        let config: CompilerConfig =
            toml::from_str(toml_str).map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicitly requested config file; it must exist
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let content = fs::read_to_string(path).map_err(|e| BuildError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content).map_err(|message| BuildError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load `blaze.toml` from `dir` if present, defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self, BuildError> {
        let path = dir.join(Self::FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_default_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_source = path.into();
        self
    }

    pub fn with_host_extension(mut self, extension: impl Into<String>) -> Self {
        self.host_extension = extension.into();
        self
    }

    pub fn with_suffix_length(mut self, length: usize) -> Self {
        self.suffix_length = length;
        self
    }

    pub fn with_host_compiler(mut self, host_compiler: HostCompiler) -> Self {
        self.host_compiler = host_compiler;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !SUFFIX_LENGTH_RANGE.contains(&self.suffix_length) {
            return Err(format!(
                "suffix_length must be between {} and {}, got {}",
                SUFFIX_LENGTH_RANGE.start(),
                SUFFIX_LENGTH_RANGE.end(),
                self.suffix_length
            ));
        }
        if self.host_extension.is_empty() || self.host_extension.starts_with('.') {
            return Err(format!(
                "host_extension must be a bare extension like \"go\", got {:?}",
                self.host_extension
            ));
        }
        if self.default_source.as_os_str().is_empty() {
            return Err("default_source cannot be empty".to_string());
        }
        self.host_compiler.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.default_source, PathBuf::from("main.blaze"));
        assert_eq!(config.host_extension, "go");
        assert_eq!(config.suffix_length, 10);
        assert_eq!(config.host_compiler.program, "go");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_compiler_args() {
        let args = HostCompiler::default()
            .render_args(Path::new("app0123456789.go"), Path::new("app"));
        assert_eq!(args, vec!["build", "-o", "app", "app0123456789.go"]);
    }

    #[test]
    fn test_embedded_placeholder() {
        let compiler = HostCompiler::new("tool", ["--out={output}", "{input}"]);
        let args = compiler.render_args(Path::new("in.go"), Path::new("bin/app"));
        assert_eq!(args, vec!["--out=bin/app", "in.go"]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CompilerConfig::from_toml("default_source = \"app.blaze\"\n").unwrap();
        assert_eq!(config.default_source, PathBuf::from("app.blaze"));
        assert_eq!(config.host_compiler, HostCompiler::default());
    }

    #[test]
    fn test_full_toml() {
        let toml = r#"
default_source = "src/app.blaze"
host_extension = "go"
suffix_length = 16

[host_compiler]
program = "/usr/local/go/bin/go"
args = ["build", "-trimpath", "-o", "{output}", "{input}"]
"#;
        let config = CompilerConfig::from_toml(toml).unwrap();
        assert_eq!(config.suffix_length, 16);
        assert_eq!(config.host_compiler.program, "/usr/local/go/bin/go");
        assert_eq!(config.host_compiler.args.len(), 5);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = CompilerConfig::from_toml("keep_temp = true\n").unwrap_err();
        assert!(err.contains("keep_temp"));
    }

    #[test]
    fn test_suffix_length_bounds() {
        assert!(CompilerConfig::from_toml("suffix_length = 2\n").is_err());
        assert!(CompilerConfig::from_toml("suffix_length = 64\n").is_err());
        assert!(CompilerConfig::from_toml("suffix_length = 4\n").is_ok());
    }

    #[test]
    fn test_args_must_reference_input() {
        let toml = "[host_compiler]\nargs = [\"build\", \"-o\", \"{output}\"]\n";
        let err = CompilerConfig::from_toml(toml).unwrap_err();
        assert!(err.contains("{input}"));
    }

    #[test]
    fn test_dotted_extension_rejected() {
        assert!(CompilerConfig::from_toml("host_extension = \".go\"\n").is_err());
    }

    #[test]
    fn test_discover_without_file_uses_defaults() {
        let temp = tempdir().unwrap();
        let config = CompilerConfig::discover(temp.path()).unwrap();
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn test_discover_reads_file() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("blaze.toml"), "suffix_length = 8\n").unwrap();
        let config = CompilerConfig::discover(temp.path()).unwrap();
        assert_eq!(config.suffix_length, 8);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp = tempdir().unwrap();
        let err = CompilerConfig::load(&temp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, BuildError::Config { .. }));
    }

    #[test]
    fn test_builder() {
        let config = CompilerConfig::new()
            .with_default_source("app.blaze")
            .with_host_extension("go")
            .with_suffix_length(12)
            .with_host_compiler(HostCompiler::new("gccgo", ["-o", "{output}", "{input}"]));
        assert_eq!(config.suffix_length, 12);
        assert_eq!(config.host_compiler.program, "gccgo");
        assert!(config.validate().is_ok());
    }
}
