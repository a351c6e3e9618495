// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::RepoFixture;

use macsetup::{
    repo::{clone_or_update, SyncOutcome},
    task::{editor, packages, runtime, Outcome},
    Profile, RunMode, Session,
};

use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::{collections::HashSet, fs, path::PathBuf};

fn source_url() -> anyhow::Result<String> {
    Ok(std::env::current_dir()?
        .join("source")
        .to_string_lossy()
        .into_owned())
}

fn dest() -> anyhow::Result<PathBuf> {
    Ok(std::env::current_dir()?.join("dest"))
}

#[sealed_test]
fn clone_or_update_clones_fresh_destination() -> anyhow::Result<()> {
    let fixture = RepoFixture::new("source")?;
    fixture.stage_and_commit(".zshrc", "export EDITOR=vim\n")?;

    let outcome = clone_or_update(&source_url()?, "main", &dest()?)?;

    assert_eq!(outcome, SyncOutcome::Cloned);
    assert_eq!(
        fs::read_to_string(dest()?.join(".zshrc"))?,
        "export EDITOR=vim\n"
    );

    Ok(())
}

#[sealed_test]
fn clone_or_update_fast_forwards_existing_clone() -> anyhow::Result<()> {
    let fixture = RepoFixture::new("source")?;
    fixture.stage_and_commit(".zshrc", "export EDITOR=vim\n")?;
    clone_or_update(&source_url()?, "main", &dest()?)?;

    fixture.stage_and_commit(".zprofile", "export LANG=en_US.UTF-8\n")?;
    let outcome = clone_or_update(&source_url()?, "main", &dest()?)?;

    assert_eq!(outcome, SyncOutcome::FastForwarded);
    assert_eq!(
        fs::read_to_string(dest()?.join(".zprofile"))?,
        "export LANG=en_US.UTF-8\n"
    );

    Ok(())
}

#[sealed_test]
fn clone_or_update_reports_up_to_date_clone() -> anyhow::Result<()> {
    let fixture = RepoFixture::new("source")?;
    fixture.stage_and_commit(".zshrc", "export EDITOR=vim\n")?;
    clone_or_update(&source_url()?, "main", &dest()?)?;

    let outcome = clone_or_update(&source_url()?, "main", &dest()?)?;

    assert_eq!(outcome, SyncOutcome::UpToDate);

    Ok(())
}

#[sealed_test]
fn clone_or_update_leaves_dirty_work_tree_untouched() -> anyhow::Result<()> {
    let fixture = RepoFixture::new("source")?;
    fixture.stage_and_commit(".zshrc", "export EDITOR=vim\n")?;
    clone_or_update(&source_url()?, "main", &dest()?)?;

    fs::write(dest()?.join(".zshrc"), "export EDITOR=emacs\n")?;
    fixture.stage_and_commit(".zprofile", "export LANG=en_US.UTF-8\n")?;
    let outcome = clone_or_update(&source_url()?, "main", &dest()?)?;

    assert_eq!(outcome, SyncOutcome::LeftUntouched);
    assert_eq!(
        fs::read_to_string(dest()?.join(".zshrc"))?,
        "export EDITOR=emacs\n"
    );
    assert!(!dest()?.join(".zprofile").exists());

    Ok(())
}

#[sealed_test]
fn clone_or_update_leaves_missing_branch_untouched() -> anyhow::Result<()> {
    let fixture = RepoFixture::new("source")?;
    fixture.stage_and_commit(".zshrc", "export EDITOR=vim\n")?;
    clone_or_update(&source_url()?, "main", &dest()?)?;

    let outcome = clone_or_update(&source_url()?, "release", &dest()?)?;

    assert_eq!(outcome, SyncOutcome::LeftUntouched);

    Ok(())
}

#[test]
fn provisioning_plan_respects_exclusions() -> anyhow::Result<()> {
    let profile = Profile::builtin()?;
    let session = Session::new(RunMode::Automated, vec!["git".into()]);
    let installed = HashSet::new();

    let formulae = packages::pending_formulae(&session, &profile.settings.formulae, &installed);
    assert!(!formulae.contains(&"git"));
    assert!(formulae.contains(&"jq"));

    let casks = packages::pending_casks(&session, &profile.casks, &installed);
    assert_eq!(casks.len(), profile.casks.len());

    let extensions = editor::pending_extensions(&session, &profile.settings.extensions);
    assert_eq!(extensions.len(), profile.settings.extensions.len());

    let python = runtime::pending_packages(&session, &profile.settings.python_packages);
    assert_eq!(python.len(), profile.settings.python_packages.len());

    Ok(())
}

#[test]
fn automated_run_walks_every_step_without_input() -> anyhow::Result<()> {
    let session = Session::new(RunMode::Automated, Vec::new());
    let mut log = Vec::new();

    let outcomes = vec![
        session.run_step("first", false, || {
            log.push("first");
            Ok(())
        })?,
        session.run_step("second", true, || {
            log.push("second");
            Ok(())
        })?,
        session.run_step("third", false, || {
            log.push("third");
            Ok(())
        })?,
    ];

    assert_eq!(outcomes, [Outcome::Ran, Outcome::Skipped, Outcome::Ran]);
    assert_eq!(log, ["first", "third"]);

    Ok(())
}
