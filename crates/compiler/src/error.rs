//! Build pipeline error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// How an external process failed
#[derive(Debug)]
pub enum ProcessFailure {
    /// The process ran and exited unsuccessfully (`None` when killed by a signal)
    Exit(Option<i32>),
    /// The process could not be started
    Spawn(io::Error),
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessFailure::Exit(Some(code)) => write!(f, "exit status {}", code),
            ProcessFailure::Exit(None) => write!(f, "terminated by signal"),
            ProcessFailure::Spawn(e) => write!(f, "failed to start: {}", e),
        }
    }
}

/// Error type for every stage of the build pipeline.
///
/// Each variant names the file involved and keeps the underlying cause,
/// so the message printed to the user is enough to diagnose the failure.
#[derive(Debug)]
pub enum BuildError {
    /// Configuration file missing (when given explicitly), unreadable or invalid
    Config { path: PathBuf, message: String },
    /// Source file missing or unreadable
    Read { path: PathBuf, source: io::Error },
    /// The transpiler rejected the source
    Transpile { path: PathBuf, message: String },
    /// No entropy available for a temporary artifact name
    RandomSource(rand::Error),
    /// Transpiled text could not be persisted
    Write { path: PathBuf, source: io::Error },
    /// Host compiler failed; `diagnostics` is its combined output verbatim
    Compile {
        artifact: PathBuf,
        failure: ProcessFailure,
        diagnostics: String,
    },
    /// Temporary artifact could not be removed
    Cleanup { path: PathBuf, source: io::Error },
    /// Built executable failed; `output` is its combined output
    Execution {
        executable: PathBuf,
        failure: ProcessFailure,
        output: String,
    },
    /// Command token is not `run`, `build` or `transpile`
    InvalidCommand(String),
}

impl BuildError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::InvalidCommand(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Config { path, message } => {
                write!(f, "Error loading config {}: {}", path.display(), message)
            }
            BuildError::Read { path, source } => {
                write!(f, "Error reading file {}: {}", path.display(), source)
            }
            BuildError::Transpile { path, message } => {
                write!(f, "Error transpiling {}: {}", path.display(), message)
            }
            BuildError::RandomSource(e) => {
                write!(f, "Error generating random artifact name: {}", e)
            }
            BuildError::Write { path, source } => {
                write!(f, "Error writing file {}: {}", path.display(), source)
            }
            BuildError::Compile {
                artifact,
                failure,
                diagnostics,
            } => {
                write!(
                    f,
                    "Error building executable from {}: {}",
                    artifact.display(),
                    failure
                )?;
                if !diagnostics.is_empty() {
                    write!(f, "\n{}", diagnostics.trim_end())?;
                }
                Ok(())
            }
            BuildError::Cleanup { path, source } => {
                write!(
                    f,
                    "Error removing temporary file {}: {}",
                    path.display(),
                    source
                )
            }
            BuildError::Execution {
                executable,
                failure,
                output,
            } => {
                write!(f, "Error executing {}: {}", executable.display(), failure)?;
                if !output.is_empty() {
                    write!(f, "\n{}", output.trim_end())?;
                }
                Ok(())
            }
            BuildError::InvalidCommand(token) => write!(
                f,
                "Invalid command '{}'. Use 'run', 'build' or 'transpile'.",
                token
            ),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Read { source, .. }
            | BuildError::Write { source, .. }
            | BuildError::Cleanup { source, .. } => Some(source),
            BuildError::RandomSource(e) => Some(e),
            BuildError::Compile {
                failure: ProcessFailure::Spawn(e),
                ..
            }
            | BuildError::Execution {
                failure: ProcessFailure::Spawn(e),
                ..
            } => Some(e),
            _ => None,
        }
    }
}
