//! External process invocation.
//!
//! Every cluster and diagnostic call goes through [`CommandRunner`] so the
//! collection pipeline can be exercised against a scripted runner in tests.

use std::ffi::OsString;
use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};

use log::debug;
use thiserror::Error;

use crate::security::scrub_credentials;

/// How stderr output affects the outcome of an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StderrPolicy {
    /// Any stderr output is a failure, even on a zero exit status
    Strict,
    /// Only a non-zero exit status is a failure
    ExitStatusOnly,
}

/// Failure of a single external invocation
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("error: failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("error: {exit}, stderr: {stderr}, stdout: {stdout}")]
    Failed {
        exit: String,
        stderr: String,
        stdout: String,
    },
}

impl CommandError {
    /// Classify captured process output under the given policy
    pub fn check(
        status: ExitStatus,
        stdout: Vec<u8>,
        stderr: &[u8],
        policy: StderrPolicy,
    ) -> Result<Vec<u8>, CommandError> {
        let stderr_failed = policy == StderrPolicy::Strict && !stderr.is_empty();
        if status.success() && !stderr_failed {
            return Ok(stdout);
        }

        let exit = if status.success() {
            "none".to_string()
        } else {
            status.to_string()
        };
        Err(CommandError::Failed {
            exit,
            stderr: String::from_utf8_lossy(stderr).into_owned(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
        })
    }
}

/// A long-lived helper process whose output nobody reads
pub trait BackgroundProcess {
    /// Exit status description if the process has already terminated
    fn try_wait(&mut self) -> io::Result<Option<String>>;

    /// Kill the process and reap it
    fn kill(&mut self) -> io::Result<()>;
}

/// Runs external programs
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run to completion, returning stdout when the invocation succeeds
    fn run(&self, program: &str, args: &[String], policy: StderrPolicy) -> Result<Vec<u8>, CommandError>;

    /// Like [`CommandRunner::run`], for arguments that may carry non-UTF-8 bytes
    fn run_os(&self, program: &str, args: &[OsString], policy: StderrPolicy) -> Result<Vec<u8>, CommandError>;

    /// Start without waiting; stdout and stderr are discarded
    fn spawn(&self, program: &str, args: &[String]) -> Result<Box<dyn BackgroundProcess>, CommandError>;
}

/// [`CommandRunner`] backed by `std::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], policy: StderrPolicy) -> Result<Vec<u8>, CommandError> {
        let args: Vec<OsString> = args.iter().map(OsString::from).collect();
        self.run_os(program, &args, policy)
    }

    fn run_os(&self, program: &str, args: &[OsString], policy: StderrPolicy) -> Result<Vec<u8>, CommandError> {
        debug!("Running: {} {}", program, scrub_credentials(&display_args(args)));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        CommandError::check(output.status, output.stdout, &output.stderr, policy)
    }

    fn spawn(&self, program: &str, args: &[String]) -> Result<Box<dyn BackgroundProcess>, CommandError> {
        debug!("Starting background: {} {}", program, scrub_credentials(&args.join(" ")));

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        Ok(Box::new(ChildProcess { child }))
    }
}

fn display_args(args: &[OsString]) -> String {
    args.iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

struct ChildProcess {
    child: Child,
}

impl BackgroundProcess for ChildProcess {
    fn try_wait(&mut self) -> io::Result<Option<String>> {
        Ok(self.child.try_wait()?.map(|status| status.to_string()))
    }

    fn kill(&mut self) -> io::Result<()> {
        self.child.kill()?;
        self.child.wait()?;
        Ok(())
    }
}
