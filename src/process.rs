// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External tool invocation.
//!
//! Provisioning is mostly a matter of calling other people's command line
//! tools: `brew`, `defaults`, `sudo`, `chsh`, and friends. This module wraps
//! those calls behind [`Tool`], a small handle that captures output and turns
//! a failed invocation into a structured [`ProcessError`].
//!
//! # Diagnostic Classification
//!
//! Some failures are not really failures. Uninstalling a cask that was never
//! installed, or installing a shell environment that is already in place,
//! both end with a non-zero exit status even though the machine is in exactly
//! the state we want. Callers should not have to grep raw stderr to tell
//! these apart, so every failed invocation gets classified once, here, into a
//! [`Diagnostic`] code. Call sites match on the code and decide whether the
//! failure is benign for the step at hand.
//!
//! The classification table matches substrings of the diagnostic text that
//! specific versions of the external tools happen to print. It is a
//! compatibility shim, not a stable contract, and it will need to follow the
//! tools' wording as they change.

use std::{
    ffi::{OsStr, OsString},
    process::{Command, ExitStatus, Stdio},
};
use tracing::debug;

/// Handle to an external command line tool.
///
/// Holds nothing but the program name. Each invocation spawns a fresh child
/// process and blocks until it exits.
#[derive(Clone, Debug)]
pub struct Tool {
    program: OsString,
}

impl Tool {
    /// Construct new handle for target program.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Invoke tool with captured output.
    ///
    /// Blocks until the child process exits. Returns captured stdout with
    /// trailing newlines chomped.
    ///
    /// # Errors
    ///
    /// - Return [`ProcessError::Spawn`] if the program cannot be started.
    /// - Return [`ProcessError::Failed`] if the program exits non-zero, with
    ///   captured stderr and its classified [`Diagnostic`].
    pub fn call(&self, args: impl IntoIterator<Item = impl AsRef<OsStr>>) -> Result<String> {
        let args: Vec<OsString> = args.into_iter().map(|arg| arg.as_ref().into()).collect();
        debug!("call {:?} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| ProcessError::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source: err,
            })?;

        let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
        let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();

        if !output.status.success() {
            return Err(ProcessError::Failed {
                program: self.program.to_string_lossy().into_owned(),
                status: output.status,
                diagnostic: Diagnostic::classify(&stderr),
                stderr,
            });
        }

        // INVARIANT: Chomp trailing newlines.
        let stdout = stdout
            .strip_suffix("\r\n")
            .or(stdout.strip_suffix('\n'))
            .map(ToString::to_string)
            .unwrap_or(stdout);

        Ok(stdout)
    }

    /// Invoke tool with inherited standard streams.
    ///
    /// Blocks until the child process exits. Use for programs that need the
    /// terminal, e.g., `sudo` asking for a password.
    ///
    /// # Errors
    ///
    /// - Return [`ProcessError::Spawn`] if the program cannot be started.
    /// - Return [`ProcessError::Failed`] if the program exits non-zero. The
    ///   diagnostic text goes to the terminal, so classification always
    ///   yields [`Diagnostic::Other`].
    pub fn call_interactive(
        &self,
        args: impl IntoIterator<Item = impl AsRef<OsStr>>,
    ) -> Result<()> {
        let args: Vec<OsString> = args.into_iter().map(|arg| arg.as_ref().into()).collect();
        debug!("call interactive {:?} {:?}", self.program, args);

        let status = Command::new(&self.program)
            .args(&args)
            .spawn()
            .map_err(|err| ProcessError::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source: err,
            })?
            .wait()
            .map_err(|err| ProcessError::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source: err,
            })?;

        if !status.success() {
            return Err(ProcessError::Failed {
                program: self.program.to_string_lossy().into_owned(),
                status,
                diagnostic: Diagnostic::Other,
                stderr: String::new(),
            });
        }

        Ok(())
    }
}

/// Classified category of a failed invocation's diagnostic text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Diagnostic {
    /// Target directory already exists with content in it.
    AlreadyExists,

    /// Target package was never installed to begin with.
    NotInstalled,

    /// Shell environment installer found its own previous installation.
    ShellEnvironmentExists,

    /// Anything we do not recognize.
    #[default]
    Other,
}

/// Diagnostic text patterns and the codes they map to.
///
/// Tied to the exact wording of specific versions of git, Homebrew, and the
/// oh-my-zsh installer. Expect to update these when the tools reword their
/// messages.
const DIAGNOSTIC_PATTERNS: [(&str, Diagnostic); 3] = [
    (
        "already exists and is not an empty directory",
        Diagnostic::AlreadyExists,
    ),
    ("is not installed", Diagnostic::NotInstalled),
    (
        "The $ZSH folder already exists",
        Diagnostic::ShellEnvironmentExists,
    ),
];

impl Diagnostic {
    /// Classify diagnostic text through the pattern table.
    pub fn classify(stderr: &str) -> Self {
        DIAGNOSTIC_PATTERNS
            .iter()
            .find(|(pattern, _)| stderr.contains(pattern))
            .map(|(_, code)| *code)
            .unwrap_or_default()
    }
}

/// All possible error types for external tool invocation.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// Program could not be started at all.
    #[error("cannot spawn command {program:?}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Program ran, but exited non-zero.
    #[error("command {program:?} failed ({status}):\n{stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        diagnostic: Diagnostic,
        stderr: String,
    },
}

impl ProcessError {
    /// Classified diagnostic of the failure.
    ///
    /// Spawn failures carry no diagnostic text, so they always classify as
    /// [`Diagnostic::Other`].
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            Self::Spawn { .. } => Diagnostic::Other,
            Self::Failed { diagnostic, .. } => *diagnostic,
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = ProcessError> = std::result::Result<T, E>;
