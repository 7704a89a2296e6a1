//! Command dispatch and the build, run and transpile pipelines
//!
//! One command is selected per process and runs to completion:
//!
//! - `build [file]`: transpile, compile
//! - `run [file]`: transpile, compile, execute
//! - `transpile [file]`: transpile, write `<stem>.<ext>`
//!
//! With no command the default source is built.

use crate::artifact::SourceFile;
use crate::compile::CompileStage;
use crate::config::CompilerConfig;
use crate::error::BuildError;
use crate::execute::execute;
use crate::namer::{ArtifactNamer, EntropySource, OsEntropy};
use crate::process::{ProcessRunner, SystemRunner};
use crate::transpile::{BlazeTranspiler, SourceTranspiler, transpile_source};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Build,
    Run,
    Transpile,
}

/// A selected pipeline and its optional file argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub pipeline: Pipeline,
    /// Overrides the configured default source when present
    pub file: Option<PathBuf>,
}

impl Command {
    /// Select a pipeline from a command token.
    ///
    /// No token means `build`. The file argument never affects which
    /// pipeline is chosen.
    pub fn parse(token: Option<&str>, file: Option<PathBuf>) -> Result<Self, BuildError> {
        let pipeline = match token {
            None | Some("build") => Pipeline::Build,
            Some("run") => Pipeline::Run,
            Some("transpile") => Pipeline::Transpile,
            Some(other) => return Err(BuildError::InvalidCommand(other.to_string())),
        };
        Ok(Command { pipeline, file })
    }
}

/// What a successful pipeline produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Built {
        source: PathBuf,
        executable: PathBuf,
    },
    Ran {
        source: PathBuf,
        executable: PathBuf,
        output: String,
    },
    Transpiled {
        source: PathBuf,
        artifact: PathBuf,
    },
}

/// Result of a dispatched command.
///
/// Warnings are failures that do not fail the command, such as a
/// temporary file that could not be removed. They are reported
/// alongside the result, never instead of it.
#[derive(Debug)]
pub struct Report {
    pub result: Result<Outcome, BuildError>,
    pub warnings: Vec<BuildError>,
}

impl Report {
    pub fn exit_code(&self) -> i32 {
        match &self.result {
            Ok(_) => 0,
            Err(e) => e.exit_code(),
        }
    }
}

/// Runs pipelines with injectable transpiler, process runner and entropy
pub struct Driver {
    config: CompilerConfig,
    transpiler: Box<dyn SourceTranspiler>,
    runner: Box<dyn ProcessRunner>,
    namer: ArtifactNamer,
}

impl Driver {
    pub fn new(config: CompilerConfig) -> Self {
        let namer = ArtifactNamer::new(Box::new(OsEntropy), config.suffix_length);
        Driver {
            config,
            transpiler: Box::new(BlazeTranspiler),
            runner: Box::new(SystemRunner),
            namer,
        }
    }

    pub fn with_transpiler(mut self, transpiler: impl SourceTranspiler + 'static) -> Self {
        self.transpiler = Box::new(transpiler);
        self
    }

    pub fn with_runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_entropy(mut self, entropy: impl EntropySource + 'static) -> Self {
        self.namer = ArtifactNamer::new(Box::new(entropy), self.config.suffix_length);
        self
    }

    /// Run the selected pipeline to completion
    pub fn dispatch(&self, command: &Command) -> Report {
        let source = SourceFile::new(
            command
                .file
                .clone()
                .unwrap_or_else(|| self.config.default_source.clone()),
        );
        debug!("Dispatching {:?} for {}", command.pipeline, source.path().display());

        let mut warnings = Vec::new();
        let result = match command.pipeline {
            Pipeline::Build => self.build(&source, &mut warnings),
            Pipeline::Run => self.run(&source, &mut warnings),
            Pipeline::Transpile => self.transpile(&source),
        };
        Report { result, warnings }
    }

    /// Transpile and compile; cleanup failures are pushed onto `warnings`
    pub fn build(
        &self,
        source: &SourceFile,
        warnings: &mut Vec<BuildError>,
    ) -> Result<Outcome, BuildError> {
        let executable = self.compile_source(source, warnings)?;
        Ok(Outcome::Built {
            source: source.path().to_path_buf(),
            executable,
        })
    }

    /// Build, then execute the result and capture its output
    pub fn run(
        &self,
        source: &SourceFile,
        warnings: &mut Vec<BuildError>,
    ) -> Result<Outcome, BuildError> {
        let executable = self.compile_source(source, warnings)?;
        let output = execute(self.runner.as_ref(), &executable)?;
        Ok(Outcome::Ran {
            source: source.path().to_path_buf(),
            executable,
            output,
        })
    }

    /// Transpile and keep the host file; nothing is compiled or removed
    pub fn transpile(&self, source: &SourceFile) -> Result<Outcome, BuildError> {
        let host_text = transpile_source(self.transpiler.as_ref(), source.path())?;
        let artifact = source.persisted_artifact(&self.config.host_extension);

        fs::write(&artifact, host_text).map_err(|e| BuildError::Write {
            path: artifact.clone(),
            source: e,
        })?;
        info!("Wrote {}", artifact.display());

        Ok(Outcome::Transpiled {
            source: source.path().to_path_buf(),
            artifact,
        })
    }

    fn compile_source(
        &self,
        source: &SourceFile,
        warnings: &mut Vec<BuildError>,
    ) -> Result<PathBuf, BuildError> {
        let host_text = transpile_source(self.transpiler.as_ref(), source.path())?;

        let stage = CompileStage {
            namer: &self.namer,
            runner: self.runner.as_ref(),
            host_compiler: &self.config.host_compiler,
            extension: &self.config.host_extension,
        };
        let (outcome, cleanup_error) = stage.compile(source.stem(), &host_text).into_parts();
        warnings.extend(cleanup_error);
        outcome
    }
}

impl Default for Driver {
    fn default() -> Self {
        Driver::new(CompilerConfig::default())
    }
}
