// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Step orchestration.
//!
//! Every provisioning operation breaks down into __steps__: one named unit of
//! work with an optional "already satisfied" precondition and optional
//! operator confirmation. Steps are stateless and independent. There is no
//! cross-step rollback, so a later step's failure never undoes an earlier
//! step's effects. A run simply walks its steps top to bottom and stops at
//! the first failure nothing absorbed.
//!
//! # Run Modes
//!
//! A [`Session`] carries the run mode and the operator's exclusion list, and
//! gets threaded explicitly through every operation. In interactive mode each
//! step asks the operator before running. In automated mode no step ever
//! waits for input: confirmations resolve to their defaults, and so do
//! numeric parameters.
//!
//! # Step Outcomes
//!
//! A step that runs to completion reports [`Outcome::Ran`]. A step whose
//! precondition is already satisfied reports [`Outcome::Skipped`] without
//! prompting or running anything. A step the operator turns down reports
//! [`Outcome::Declined`], and the run keeps going; declining a step is not an
//! error.

pub mod editor;
pub mod packages;
pub mod preferences;
pub mod runtime;
pub mod shell;

use crate::{path::NoWayHome, process::ProcessError, repo::RepoError};

use inquire::{Confirm, CustomType, InquireError};
use tracing::{debug, info};

/// How a provisioning run interacts with the operator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Confirm each step before running it.
    #[default]
    Interactive,

    /// Never prompt, apply defaults everywhere.
    Automated,
}

/// What happened to a single step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Precondition already satisfied, action never ran.
    Skipped,

    /// Action ran to completion.
    Ran,

    /// Operator turned the step down.
    Declined,
}

/// Operator-facing context of one provisioning run.
///
/// Holds the run mode and the exclusion list. Constructed once at startup
/// and passed by reference into every operation, so nothing about the run
/// lives in process-wide state.
#[derive(Clone, Debug, Default)]
pub struct Session {
    mode: RunMode,
    excludes: Vec<String>,
}

impl Session {
    /// Construct new session.
    pub fn new(mode: RunMode, excludes: Vec<String>) -> Self {
        Self { mode, excludes }
    }

    /// Run mode of this session.
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Check if the operator excluded target item from installation.
    pub fn excluded(&self, name: &str) -> bool {
        self.excludes.iter().any(|exclude| exclude == name)
    }

    /// Run one provisioning step.
    ///
    /// Skips the step outright when `already_done` holds, without prompting
    /// or invoking the action in any run mode. Otherwise asks the operator
    /// for confirmation (interactive mode only) and invokes the action.
    ///
    /// # Errors
    ///
    /// - Return whatever error the action itself produces, unchanged.
    /// - Return [`TaskError::Prompt`] if the confirmation prompt fails.
    pub fn run_step(
        &self,
        label: &str,
        already_done: bool,
        action: impl FnOnce() -> Result<()>,
    ) -> Result<Outcome> {
        if already_done {
            info!("{label}: already done");
            return Ok(Outcome::Skipped);
        }

        if !self.confirm(&format!("{label}?"), true)? {
            info!("{label}: declined");
            return Ok(Outcome::Declined);
        }

        debug!("{label}: running");
        action()?;

        Ok(Outcome::Ran)
    }

    /// Ask the operator a yes/no question.
    ///
    /// Automated mode resolves to the default without prompting.
    ///
    /// # Errors
    ///
    /// - Return [`TaskError::Prompt`] if the prompt fails.
    pub fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        match self.mode {
            RunMode::Automated => Ok(default),
            RunMode::Interactive => Ok(Confirm::new(message).with_default(default).prompt()?),
        }
    }

    /// Ask the operator for an integer parameter.
    ///
    /// Automated mode resolves to the default without prompting.
    ///
    /// # Errors
    ///
    /// - Return [`TaskError::Prompt`] if the prompt fails.
    pub fn ask_count(&self, message: &str, default: i64) -> Result<i64> {
        match self.mode {
            RunMode::Automated => Ok(default),
            RunMode::Interactive => Ok(CustomType::<i64>::new(message)
                .with_default(default)
                .prompt()?),
        }
    }
}

/// All possible error types for provisioning steps.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// External tool invocation fails.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Repository materialization fails.
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Operator prompt fails.
    #[error(transparent)]
    Prompt(#[from] InquireError),

    /// Home directory cannot be determined.
    #[error(transparent)]
    NoWayHome(#[from] NoWayHome),

    /// File manipulation fails.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Friendly result alias :3
pub type Result<T, E = TaskError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(RunMode::Interactive; "interactive")]
    #[test_case(RunMode::Automated; "automated")]
    #[test]
    fn run_step_skips_satisfied_precondition(mode: RunMode) -> anyhow::Result<()> {
        let session = Session::new(mode, Vec::new());
        let mut ran = false;

        let outcome = session.run_step("install nothing", true, || {
            ran = true;
            Ok(())
        })?;

        assert_eq!(outcome, Outcome::Skipped);
        assert!(!ran);

        Ok(())
    }

    #[test]
    fn run_step_runs_action_in_automated_mode() -> anyhow::Result<()> {
        let session = Session::new(RunMode::Automated, Vec::new());
        let mut ran = false;

        let outcome = session.run_step("install something", false, || {
            ran = true;
            Ok(())
        })?;

        assert_eq!(outcome, Outcome::Ran);
        assert!(ran);

        Ok(())
    }

    #[test]
    fn run_step_propagates_action_failure() {
        let session = Session::new(RunMode::Automated, Vec::new());

        let result = session.run_step("install something", false, || {
            Err(std::io::Error::other("boom").into())
        });

        assert!(matches!(result, Err(TaskError::Io(_))));
    }

    #[test]
    fn automated_confirm_resolves_to_default() -> anyhow::Result<()> {
        let session = Session::new(RunMode::Automated, Vec::new());

        assert!(session.confirm("replace it?", true)?);
        assert!(!session.confirm("replace it?", false)?);

        Ok(())
    }

    #[test]
    fn automated_ask_count_resolves_to_default() -> anyhow::Result<()> {
        let session = Session::new(RunMode::Automated, Vec::new());

        assert_eq!(session.ask_count("key repeat", 12)?, 12);

        Ok(())
    }

    #[test]
    fn excluded_matches_whole_names_only() {
        let session = Session::new(RunMode::Automated, vec!["git".into()]);

        assert!(session.excluded("git"));
        assert!(!session.excluded("git-lfs"));
    }
}
