// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Idempotent provisioning for a personal macOS workstation.
//!
//! Macsetup automates the boring half of setting up a new machine:
//! installing Homebrew formulae and cask applications, flipping the
//! preference flags worth keeping, installing Python tooling, setting up the
//! shell environment with the user's dotfiles, and configuring the editor.
//!
//! Every operation is built from __steps__ that check whether their work is
//! already done before doing anything, so running the tool twice is safe and
//! mostly silent the second time. Interactive runs confirm each step with
//! the operator; automated runs apply defaults everywhere and never block on
//! input. See [`task`] for the step model.

pub mod config;
pub mod path;
pub mod process;
pub mod repo;
pub mod task;

pub use config::Profile;
pub use task::{Outcome, RunMode, Session};
