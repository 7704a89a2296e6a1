//! Execution stage: run a freshly built executable

use crate::error::{BuildError, ProcessFailure};
use crate::process::ProcessRunner;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Run `executable` and return its combined stdout and stderr.
///
/// A non-zero exit or a spawn failure is an execution error carrying
/// whatever output was captured.
pub fn execute(runner: &dyn ProcessRunner, executable: &Path) -> Result<String, BuildError> {
    let program = invocation_path(executable);
    debug!("Executing {}", program.display());

    match runner.run(program.as_os_str(), &[]) {
        Ok(result) if result.success => Ok(result.combined),
        Ok(result) => Err(BuildError::Execution {
            executable: executable.to_path_buf(),
            failure: ProcessFailure::Exit(result.code),
            output: result.combined,
        }),
        Err(e) => Err(BuildError::Execution {
            executable: executable.to_path_buf(),
            failure: ProcessFailure::Spawn(e),
            output: String::new(),
        }),
    }
}

/// A bare name like `app` would be looked up on `PATH`; run `./app` instead
pub fn invocation_path(executable: &Path) -> PathBuf {
    let bare = executable
        .parent()
        .is_none_or(|dir| dir.as_os_str().is_empty());
    if executable.is_relative() && bare {
        Path::new(".").join(executable)
    } else {
        executable.to_path_buf()
    }
}
