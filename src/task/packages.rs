// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Homebrew package installation.
//!
//! Installs the profile's formulae and cask applications through `brew`. One
//! `brew list` up front tells us what is already on the machine, so already
//! installed items never trigger another install and never prompt.
//!
//! Cask applications get one extra wrinkle: an application bundle can sit in
//! `/Applications` without Homebrew knowing about it, e.g., installed by
//! hand from a dmg. In that case the operator decides whether to replace it
//! with the brew-managed build. Replacement first uninstalls the cask, and a
//! cask that was never installed through brew makes that uninstall fail in a
//! perfectly benign way, so that failure gets absorbed.

use crate::{
    config::{CaskApp, Profile},
    process::{Diagnostic, Tool},
    task::{Result, Session},
};

use std::{collections::HashSet, path::Path};
use tracing::{info, instrument, warn};

/// Everything `brew list` reports as installed, formulae and casks alike.
///
/// # Errors
///
/// - Return [`TaskError::Process`](crate::task::TaskError) if `brew list`
///   itself fails.
pub fn installed_packages(brew: &Tool) -> Result<HashSet<String>> {
    let listing = brew.call(["list"])?;

    Ok(listing
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Formulae still missing from the machine, minus the operator's exclusions.
pub fn pending_formulae<'a>(
    session: &Session,
    formulae: &'a [String],
    installed: &HashSet<String>,
) -> Vec<&'a str> {
    formulae
        .iter()
        .map(String::as_str)
        .filter(|formula| !installed.contains(*formula))
        .filter(|formula| !session.excluded(formula))
        .collect()
}

/// Cask applications not yet managed by brew, minus the operator's
/// exclusions.
pub fn pending_casks<'a>(
    session: &Session,
    casks: &'a [CaskApp],
    installed: &HashSet<String>,
) -> Vec<&'a CaskApp> {
    casks
        .iter()
        .filter(|cask| !installed.contains(&cask.id))
        .filter(|cask| !session.excluded(&cask.id))
        .collect()
}

/// Install Homebrew formulae and cask applications.
///
/// # Errors
///
/// - Return [`TaskError`](crate::task::TaskError) if any brew invocation
///   fails for a reason that is not benign, or a prompt fails.
#[instrument(skip(session, profile), level = "debug")]
pub fn install(session: &Session, profile: &Profile) -> Result<()> {
    let brew = Tool::new("brew");
    let installed = installed_packages(&brew)?;

    let formulae = pending_formulae(session, &profile.settings.formulae, &installed);
    session.run_step("install brew formulae", formulae.is_empty(), || {
        for &formula in &formulae {
            info!("install {formula}");
            brew.call(["reinstall", formula, "--force"])?;
        }
        Ok(())
    })?;

    session.run_step("set up git lfs", false, || {
        Tool::new("git").call(["lfs", "install"])?;
        Tool::new("sudo").call_interactive(["git", "lfs", "install", "--system"])?;
        Ok(())
    })?;

    for cask in pending_casks(session, &profile.casks, &installed) {
        install_cask(session, &brew, cask)?;
    }

    let taps = &profile.settings.tap_formulae;
    session.run_step("install tap formulae", taps.is_empty(), || {
        for formula in taps {
            info!("install {formula}");
            brew.call(["install", formula.as_str()])?;
        }
        Ok(())
    })?;

    session.run_step("set default browser", false, || {
        Tool::new("defaultbrowser").call([profile.settings.default_browser.as_str()])?;
        Ok(())
    })?;

    Ok(())
}

/// Install one cask application.
///
/// An application bundle already present on disk is kept unless the operator
/// explicitly chooses to replace it with the brew-managed build; automated
/// runs always keep it.
fn install_cask(session: &Session, brew: &Tool, cask: &CaskApp) -> Result<()> {
    let bundle = Path::new("/Applications").join(&cask.app);
    if bundle.exists()
        && !session.confirm(
            &format!(
                "{} is already installed. would you like to install latest from brew instead?",
                cask.app
            ),
            false,
        )?
    {
        info!("keep existing {}", cask.app);
        return Ok(());
    }

    info!("install {}", cask.app);
    match brew.call(["uninstall", &cask.id]) {
        Ok(_) => {}
        Err(err) if err.diagnostic() == Diagnostic::NotInstalled => {
            warn!("{} was never managed by brew, nothing to uninstall", cask.id);
        }
        Err(err) => return Err(err.into()),
    }
    brew.call(["install", "--cask", &cask.id, "--force"])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::RunMode;
    use pretty_assertions::assert_eq;

    fn catalog() -> Vec<String> {
        vec!["git".into(), "jq".into(), "fzf".into()]
    }

    #[test]
    fn pending_formulae_drops_installed_and_excluded() {
        let session = Session::new(RunMode::Automated, vec!["jq".into()]);
        let installed = HashSet::from(["git".to_string()]);

        let catalog = catalog();
        let pending = pending_formulae(&session, &catalog, &installed);

        assert_eq!(pending, ["fzf"]);
    }

    #[test]
    fn pending_formulae_keeps_catalog_order() {
        let session = Session::new(RunMode::Automated, Vec::new());

        let catalog = catalog();
        let pending = pending_formulae(&session, &catalog, &HashSet::new());

        assert_eq!(pending, ["git", "jq", "fzf"]);
    }

    #[test]
    fn pending_casks_drops_brew_managed_and_excluded() {
        let session = Session::new(RunMode::Automated, vec!["discord".into()]);
        let casks = vec![
            CaskApp {
                app: "iTerm.app".into(),
                id: "iterm2".into(),
            },
            CaskApp {
                app: "Discord.app".into(),
                id: "discord".into(),
            },
            CaskApp {
                app: "Rectangle.app".into(),
                id: "rectangle".into(),
            },
        ];
        let installed = HashSet::from(["iterm2".to_string()]);

        let pending = pending_casks(&session, &casks, &installed);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "rectangle");
    }
}
