//! Compile stage: persist host text, run the host compiler, clean up
//!
//! Sequence:
//! 1. Draw a temporary name `<stem><suffix>.<ext>` from the namer
//! 2. Create it exclusively and write the host text
//! 3. Run the host compiler with `<stem>` as the output
//! 4. Remove the temporary file, whatever step 3 returned
//!
//! Failures in 1 and 2 stop the stage before the compiler runs. A compiler
//! failure and a cleanup failure are independent and both reported.

use crate::artifact::{TempArtifact, with_appended_extension};
use crate::config::HostCompiler;
use crate::error::{BuildError, ProcessFailure};
use crate::namer::ArtifactNamer;
use crate::process::ProcessRunner;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Attempts at finding a temporary name that is not already on disk
pub const MAX_NAME_ATTEMPTS: usize = 8;

/// Result of one compile stage run
#[derive(Debug)]
pub struct Compilation {
    /// The executable path, or why no executable was produced
    pub outcome: Result<PathBuf, BuildError>,
    /// Whether the temporary artifact was removed
    pub cleanup: Result<(), BuildError>,
}

impl Compilation {
    fn aborted(error: BuildError) -> Self {
        Compilation {
            outcome: Err(error),
            cleanup: Ok(()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Split into the build result and the cleanup failure, if any
    pub fn into_parts(self) -> (Result<PathBuf, BuildError>, Option<BuildError>) {
        (self.outcome, self.cleanup.err())
    }
}

pub struct CompileStage<'a> {
    pub namer: &'a ArtifactNamer,
    pub runner: &'a dyn ProcessRunner,
    pub host_compiler: &'a HostCompiler,
    /// Extension of the temporary host file, without the dot
    pub extension: &'a str,
}

impl CompileStage<'_> {
    /// Compile `host_text` into an executable named `stem`.
    ///
    /// On compiler failure a previous executable at `stem` is left as it was.
    pub fn compile(&self, stem: &Path, host_text: &str) -> Compilation {
        let artifact = match self.create_artifact(stem, host_text) {
            Ok(artifact) => artifact,
            Err(e) => return Compilation::aborted(e),
        };

        let outcome = self.invoke_compiler(artifact.path(), stem);

        let temp_path = artifact.path().to_path_buf();
        let cleanup = artifact.cleanup().map_err(|e| BuildError::Cleanup {
            path: temp_path,
            source: e,
        });
        if let Err(e) = &cleanup {
            warn!("{}", e);
        }

        Compilation { outcome, cleanup }
    }

    fn create_artifact(&self, stem: &Path, host_text: &str) -> Result<TempArtifact, BuildError> {
        let mut last_path = None;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let temp_stem = self.namer.name(stem)?;
            let path = with_appended_extension(&temp_stem, self.extension);

            match TempArtifact::create(path.clone(), host_text) {
                Ok(artifact) => return Ok(artifact),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("Temporary name {} is taken, drawing another", path.display());
                    last_path = Some(path);
                }
                Err(e) => return Err(BuildError::Write { path, source: e }),
            }
        }

        Err(BuildError::Write {
            path: last_path.unwrap_or_else(|| stem.to_path_buf()),
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "no free temporary name after {} attempts",
                    MAX_NAME_ATTEMPTS
                ),
            ),
        })
    }

    fn invoke_compiler(&self, input: &Path, output: &Path) -> Result<PathBuf, BuildError> {
        let program = &self.host_compiler.program;
        let args = self.host_compiler.render_args(input, output);
        debug!("Running {} {:?}", program, args);

        match self.runner.run(program.as_ref(), &args) {
            Ok(result) if result.success => {
                info!("Built executable {}", output.display());
                Ok(output.to_path_buf())
            }
            Ok(result) => Err(BuildError::Compile {
                artifact: input.to_path_buf(),
                failure: ProcessFailure::Exit(result.code),
                diagnostics: result.combined,
            }),
            Err(e) => Err(BuildError::Compile {
                artifact: input.to_path_buf(),
                failure: ProcessFailure::Spawn(e),
                diagnostics: String::new(),
            }),
        }
    }
}
