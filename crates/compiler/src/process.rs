//! External process invocation
//!
//! Both the host compiler and the built executable run through a
//! [`ProcessRunner`], so the pipeline can be exercised without a real
//! toolchain.

use std::ffi::{OsStr, OsString};
use std::io::{self, Read};
use std::process::Command;

/// Exit status and merged stdout/stderr of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub combined: String,
}

pub trait ProcessRunner {
    /// Run `program` to completion. `Err` means it could not be started.
    fn run(&self, program: &OsStr, args: &[OsString]) -> io::Result<ProcessOutput>;
}

/// Spawns real processes, waiting without a timeout
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &OsStr, args: &[OsString]) -> io::Result<ProcessOutput> {
        // One pipe for both streams keeps their interleaving intact
        let (mut reader, writer) = io::pipe()?;
        let mut child = Command::new(program)
            .args(args)
            .stdout(writer.try_clone()?)
            .stderr(writer)
            .spawn()?;

        // The Command holding the write ends is dropped above, so EOF
        // arrives once the child and its descendants close the pipe
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        let status = child.wait()?;

        Ok(ProcessOutput {
            success: status.success(),
            code: status.code(),
            combined: String::from_utf8_lossy(&raw).into_owned(),
        })
    }
}
