// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shell environment installation.
//!
//! Sets up the user's shell from scratch: materializes the dotfiles
//! repository under the development directory, runs the third-party
//! oh-my-zsh installer, copies the shell resource file into the home
//! directory, and switches the login shell.
//!
//! The installer is fetched and piped straight through `sh`, the same way
//! its upstream documentation prescribes. Rerunning it against an existing
//! installation fails with a recognizable message that gets absorbed; the
//! `.oh-my-zsh` directory check in front of the step makes the rerun a
//! non-event in the first place.
//!
//! Registering the login shell in `/etc/shells` and switching to it both
//! need more privileges than the current user has, so those steps go through
//! `sudo` and `chsh` with the terminal attached.

use crate::{
    config::Profile,
    path,
    process::{Diagnostic, Tool},
    repo,
    task::{Result, Session},
};

use std::{ffi::OsStr, fs, path::Path};
use tracing::{info, instrument, warn};

/// Upstream installer script for the shell environment.
const INSTALLER_URL: &str =
    "https://raw.githubusercontent.com/ohmyzsh/ohmyzsh/master/tools/install.sh";

/// Directory name a clone of target URL lands in.
pub fn repo_dir_name(url: &str) -> &str {
    url.rsplit(['/', ':'])
        .next()
        .unwrap_or(url)
        .trim_end_matches(".git")
}

/// Check if target shell is already registered in the shell listing.
pub fn shell_registered(listing: &str, shell: &Path) -> bool {
    let shell = shell.to_string_lossy();

    listing.lines().any(|line| line.trim() == shell)
}

/// Check if the shell resource file was already copied over verbatim.
pub fn rc_in_place(source: &Path, target: &Path) -> bool {
    match (fs::read(source), fs::read(target)) {
        (Ok(source), Ok(target)) => source == target,
        _ => false,
    }
}

/// Install shell environment and dotfiles.
///
/// # Errors
///
/// - Return [`TaskError`](crate::task::TaskError) if the clone fails, the
///   installer fails for a reason that is not benign, file copies fail, or
///   a prompt fails.
#[instrument(skip(session, profile), level = "debug")]
pub fn install(session: &Session, profile: &Profile) -> Result<()> {
    let home = path::home_dir()?;
    let dev_dir = &profile.settings.dev_dir;
    let clone_target = dev_dir.join(repo_dir_name(&profile.dotfiles.url));

    session.run_step("fetch dotfiles repository", false, || {
        let _ = mkdirp::mkdirp(dev_dir)?;
        repo::clone_or_update(
            &profile.dotfiles.url,
            &profile.dotfiles.branch,
            &clone_target,
        )?;
        Ok(())
    })?;

    session.run_step("install oh-my-zsh", home.join(".oh-my-zsh").exists(), || {
        let pipeline = format!("curl -fsSL {INSTALLER_URL} | sh");
        match Tool::new("sh").call(["-c", pipeline.as_str()]) {
            Ok(_) => Ok(()),
            Err(err) if err.diagnostic() == Diagnostic::ShellEnvironmentExists => {
                warn!("shell environment already installed, leaving it alone");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    })?;

    let rc_source = clone_target.join(&profile.dotfiles.rc_file);
    let rc_target = home.join(&profile.dotfiles.rc_file);
    session.run_step(
        "copy shell resource file",
        rc_in_place(&rc_source, &rc_target),
        || {
            info!(
                "copy {:?} to {:?}",
                rc_source.display(),
                rc_target.display()
            );
            fs::copy(&rc_source, &rc_target)?;
            Ok(())
        },
    )?;

    let shell = &profile.settings.login_shell;
    let listing = fs::read_to_string("/etc/shells").unwrap_or_default();
    session.run_step(
        "register login shell",
        shell_registered(&listing, shell),
        || {
            Tool::new("sudo").call_interactive([
                OsStr::new("sh"),
                OsStr::new("-c"),
                OsStr::new(&format!("echo {} >> /etc/shells", shell.display())),
            ])?;
            Ok(())
        },
    )?;

    session.run_step("change login shell", false, || {
        Tool::new("chsh").call_interactive([OsStr::new("-s"), shell.as_os_str()])?;
        Ok(())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("git@github.com:doronz88/worksetup.git", "worksetup"; "scp style url")]
    #[test_case("https://github.com/blah/dotfiles.git", "dotfiles"; "https url")]
    #[test_case("https://blah.org/plain", "plain"; "no git extension")]
    #[test]
    fn repo_dir_name_strips_url_noise(url: &str, expect: &str) {
        assert_eq!(repo_dir_name(url), expect);
    }

    #[test]
    fn shell_registered_matches_whole_lines() {
        let listing = "# List of acceptable shells\n/bin/bash\n/bin/zsh\n";

        assert!(shell_registered(listing, Path::new("/bin/zsh")));
        assert!(!shell_registered(listing, Path::new("/bin/fish")));
        assert!(!shell_registered(listing, Path::new("zsh")));
    }
}
