// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use macsetup::{
    task::{editor, packages, preferences, runtime, shell},
    Profile, RunMode, Session,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  macsetup [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Command::Preferences(opts) => run_preferences(opts),
            Command::Packages(opts) => run_packages(opts),
            Command::Runtime(opts) => run_runtime(opts),
            Command::Editor(opts) => run_editor(opts),
            Command::Shell(opts) => run_shell(opts),
            Command::Everything(opts) => run_everything(opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Configure preference flags.
    #[command(override_usage = "macsetup preferences [options]")]
    Preferences(SetupOptions),

    /// Install Homebrew formulae and cask applications.
    #[command(override_usage = "macsetup packages [options]")]
    Packages(SetupOptions),

    /// Install Python tooling.
    #[command(override_usage = "macsetup runtime [options]")]
    Runtime(SetupOptions),

    /// Install editor extensions and settings.
    #[command(override_usage = "macsetup editor [options]")]
    Editor(SetupOptions),

    /// Install shell environment and dotfiles.
    #[command(override_usage = "macsetup shell [options]")]
    Shell(SetupOptions),

    /// Run every provisioning operation in order.
    #[command(override_usage = "macsetup everything [options]")]
    Everything(SetupOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SetupOptions {
    /// Never prompt, apply defaults everywhere.
    #[arg(short, long)]
    pub automated: bool,

    /// Skip installation of a named item. Repeatable.
    #[arg(short, long, value_name = "name")]
    pub exclude: Vec<String>,

    /// Profile file to use instead of the builtin profile.
    #[arg(short, long, value_name = "path")]
    pub profile: Option<PathBuf>,
}

impl SetupOptions {
    fn build(self) -> Result<(Session, Profile)> {
        let mode = match self.automated {
            true => RunMode::Automated,
            false => RunMode::Interactive,
        };
        let session = Session::new(mode, self.exclude);
        let profile = Profile::load(self.profile.as_deref())?;

        Ok((session, profile))
    }
}

fn main() {
    let layer = fmt::layer().compact();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry().with(layer).with(filter).init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_preferences(opts: SetupOptions) -> Result<()> {
    let (session, _profile) = opts.build()?;
    preferences::configure(&session)?;

    Ok(())
}

fn run_packages(opts: SetupOptions) -> Result<()> {
    let (session, profile) = opts.build()?;
    packages::install(&session, &profile)?;

    Ok(())
}

fn run_runtime(opts: SetupOptions) -> Result<()> {
    let (session, profile) = opts.build()?;
    runtime::install(&session, &profile)?;

    Ok(())
}

fn run_editor(opts: SetupOptions) -> Result<()> {
    let (session, profile) = opts.build()?;
    editor::install(&session, &profile)?;

    Ok(())
}

fn run_shell(opts: SetupOptions) -> Result<()> {
    let (session, profile) = opts.build()?;
    shell::install(&session, &profile)?;

    Ok(())
}

fn run_everything(opts: SetupOptions) -> Result<()> {
    let (session, profile) = opts.build()?;
    preferences::configure(&session)?;
    packages::install(&session, &profile)?;
    runtime::install(&session, &profile)?;
    editor::install(&session, &profile)?;
    shell::install(&session, &profile)?;

    Ok(())
}
