// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External repository materialization.
//!
//! Provisioning needs a handful of repositories checked out under the user's
//! development directory, most importantly the dotfiles repository that
//! carries the shell resource file. [`clone_or_update`] materializes a
//! repository at an explicit target path: fresh destinations get cloned,
//! existing clones get fetched and fast-forwarded.
//!
//! The update path is deliberately timid. A work tree with local
//! modifications, a history that diverged from the remote, or a missing
//! branch all log a warning and leave the local copy exactly as it was. No
//! force-reset, no stash. The user put those changes there, and a
//! provisioning tool has no business throwing them away.
//!
//! Credentials are prompted for on demand during network operations, with
//! the transfer progress bar suspended while the user types.

use auth_git2::{GitAuthenticator, Prompter};
use git2::{
    build::{CheckoutBuilder, RepoBuilder},
    BranchType, Config, FetchOptions, RemoteCallbacks, Repository,
    StatusOptions,
};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, Text};
use std::{path::Path, time};
use tracing::{debug, info, instrument, warn};

/// What [`clone_or_update`] ended up doing to the target path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Fresh destination, full clone performed.
    Cloned,

    /// Existing clone moved forward to the fetched branch tip.
    FastForwarded,

    /// Existing clone already at the fetched branch tip.
    UpToDate,

    /// Existing clone left alone: dirty work tree, diverged history, or
    /// missing branch.
    LeftUntouched,
}

/// Materialize a remote repository at target path on target branch.
///
/// Clones into the target path when it does not hold a repository yet.
/// Otherwise fetches the branch from origin and fast-forwards the local
/// branch to it. Submodules are checked out recursively after a fresh clone.
///
/// # Errors
///
/// - Return [`RepoError::Git2`] if clone, fetch, or checkout fail for any
///   reason other than the timid cases listed on [`SyncOutcome::LeftUntouched`].
/// - Return [`RepoError::IndicatifStyleTemplate`] if the progress bar style
///   cannot be built.
#[instrument(skip(target), level = "debug")]
pub fn clone_or_update(url: &str, branch: &str, target: &Path) -> Result<SyncOutcome> {
    if target.join(".git").exists() {
        update(branch, target)
    } else {
        clone(url, branch, target)
    }
}

fn clone(url: &str, branch: &str, target: &Path) -> Result<SyncOutcome> {
    info!("clone {url} into {:?}", target.display());
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
    )?
    .progress_chars("=>-");
    let bar = ProgressBar::new(0);
    bar.set_style(style);
    bar.set_message(url.to_string());
    bar.enable_steady_tick(time::Duration::from_millis(100));

    let prompter = IndicatifPrompter::new(bar.clone());
    let authenticator = GitAuthenticator::default().set_prompter(prompter.clone());
    let config = Config::open_default()?;

    let mut throttle = time::Instant::now();
    let mut rc = RemoteCallbacks::new();
    rc.credentials(authenticator.credentials(&config));
    rc.transfer_progress(|progress| {
        let stats = progress.to_owned();
        let bar_size = stats.total_objects() as u64;
        let bar_pos = stats.received_objects() as u64;
        if throttle.elapsed() > time::Duration::from_millis(10) {
            throttle = time::Instant::now();
            prompter.bar.set_length(bar_size);
            prompter.bar.set_position(bar_pos);
        }
        true
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(rc);
    let repository = RepoBuilder::new()
        .branch(branch)
        .fetch_options(fo)
        .clone(url, target)?;
    update_submodules(&repository)?;
    bar.finish_and_clear();

    Ok(SyncOutcome::Cloned)
}

#[instrument(skip(target), level = "debug")]
fn update(branch: &str, target: &Path) -> Result<SyncOutcome> {
    debug!("update {:?} to latest {branch}", target.display());
    let repository = Repository::open(target)?;

    // INVARIANT: Never touch a work tree holding uncommitted changes.
    let mut opts = StatusOptions::new();
    opts.include_untracked(false);
    let statuses = repository.statuses(Some(&mut opts))?;
    if !statuses.is_empty() {
        warn!(
            "{:?} has uncommitted changes, leaving it untouched",
            target.display()
        );
        return Ok(SyncOutcome::LeftUntouched);
    }

    if repository.find_branch(branch, BranchType::Local).is_err() {
        warn!(
            "{:?} does not track branch {branch:?}, leaving it untouched",
            target.display()
        );
        return Ok(SyncOutcome::LeftUntouched);
    }

    let authenticator = GitAuthenticator::default();
    let config = Config::open_default()?;
    let mut rc = RemoteCallbacks::new();
    rc.credentials(authenticator.credentials(&config));
    let mut fo = FetchOptions::new();
    fo.remote_callbacks(rc);
    let mut remote = repository.find_remote("origin")?;
    remote.fetch(&[branch], Some(&mut fo), None)?;

    let fetch_head = repository.find_reference("FETCH_HEAD")?;
    let fetch_commit = repository.reference_to_annotated_commit(&fetch_head)?;
    let (analysis, _) = repository.merge_analysis(&[&fetch_commit])?;

    if analysis.is_up_to_date() {
        debug!("{:?} already up to date", target.display());
        Ok(SyncOutcome::UpToDate)
    } else if analysis.is_fast_forward() {
        let refname = format!("refs/heads/{branch}");
        let mut reference = repository.find_reference(&refname)?;
        reference.set_target(fetch_commit.id(), "fast-forward")?;
        repository.set_head(&refname)?;
        repository.checkout_head(Some(CheckoutBuilder::default().force()))?;
        info!("fast-forwarded {:?} to latest {branch}", target.display());
        Ok(SyncOutcome::FastForwarded)
    } else {
        warn!(
            "{:?} diverged from {branch}, leaving it untouched",
            target.display()
        );
        Ok(SyncOutcome::LeftUntouched)
    }
}

fn update_submodules(repository: &Repository) -> Result<()> {
    for mut submodule in repository.submodules()? {
        debug!("update submodule {:?}", submodule.path().display());
        submodule.update(true, None)?;
    }

    Ok(())
}

/// Git2 authentication prompter for progress bar.
#[derive(Debug, Clone)]
pub struct IndicatifPrompter {
    pub(crate) bar: ProgressBar,
}

impl IndicatifPrompter {
    /// Construct new progress bar authenticator.
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Prompter for IndicatifPrompter {
    #[instrument(skip(self, url, _config), level = "debug")]
    fn prompt_username_password(
        &mut self,
        url: &str,
        _config: &git2::Config,
    ) -> Option<(String, String)> {
        info!("authentication required at {url}");
        self.bar.suspend(|| -> Option<(String, String)> {
            let username = Text::new("username").prompt().ok()?;
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()?;
            Some((username, password))
        })
    }

    #[instrument(skip(self, username, url, _config), level = "debug")]
    fn prompt_password(
        &mut self,
        username: &str,
        url: &str,
        _config: &git2::Config,
    ) -> Option<String> {
        info!("authentication required at {url} for user {username}");
        self.bar.suspend(|| -> Option<String> {
            Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }

    #[instrument(skip(self, ssh_key_path, _config), level = "debug")]
    fn prompt_ssh_key_passphrase(
        &mut self,
        ssh_key_path: &Path,
        _config: &git2::Config,
    ) -> Option<String> {
        info!(
            "authentication required with ssh key at {}",
            ssh_key_path.display()
        );
        self.bar.suspend(|| -> Option<String> {
            Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }
}

/// All possible error types for repository materialization.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),
}

/// Friendly result alias :3
pub type Result<T, E = RepoError> = std::result::Result<T, E>;
