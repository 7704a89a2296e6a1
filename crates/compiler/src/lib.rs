//! Blaze Build Library
//!
//! Turns `.blaze` programs into executables: transpile to Go, write the Go
//! source under a unique temporary name, run `go build`, remove the
//! temporary file, and optionally run the result.
//!
//! # Substituting Collaborators
//!
//! The transpiler, the process runner and the entropy source behind
//! temporary names are all injectable:
//!
//! ```rust,ignore
//! use blazec::{Command, CompilerConfig, Driver};
//!
//! let driver = Driver::new(CompilerConfig::default())
//!     .with_runner(MyRunner::default());
//!
//! let report = driver.dispatch(&Command::parse(Some("run"), None)?);
//! ```

pub mod artifact;
pub mod compile;
pub mod config;
pub mod error;
pub mod execute;
pub mod namer;
pub mod pipeline;
pub mod process;
pub mod transpile;

pub use artifact::{SourceFile, TempArtifact};
pub use compile::{Compilation, CompileStage};
pub use config::{CompilerConfig, HostCompiler};
pub use error::{BuildError, ProcessFailure};
pub use execute::execute;
pub use namer::{ArtifactNamer, EntropySource, OsEntropy};
pub use pipeline::{Command, Driver, Outcome, Pipeline, Report};
pub use process::{ProcessOutput, ProcessRunner, SystemRunner};
pub use transpile::{BlazeTranspiler, SourceTranspiler, transpile_source};
