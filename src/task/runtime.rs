// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Python tooling installation.
//!
//! Upgrades pip itself, then installs the profile's Python package listing
//! in one pip invocation. Installs always pass `-U`, so rerunning the
//! operation simply upgrades whatever is already there.

use crate::{
    config::Profile,
    process::Tool,
    task::{Result, Session},
};

use tracing::instrument;

/// Python packages to install, minus the operator's exclusions.
pub fn pending_packages<'a>(session: &Session, packages: &'a [String]) -> Vec<&'a str> {
    packages
        .iter()
        .map(String::as_str)
        .filter(|package| !session.excluded(package))
        .collect()
}

/// Install Python tooling.
///
/// # Errors
///
/// - Return [`TaskError`](crate::task::TaskError) if any pip invocation
///   fails, or a prompt fails.
#[instrument(skip(session, profile), level = "debug")]
pub fn install(session: &Session, profile: &Profile) -> Result<()> {
    let python = Tool::new("python3");

    session.run_step("upgrade pip", false, || {
        python.call(["-m", "pip", "install", "-U", "pip"])?;
        Ok(())
    })?;

    let packages = pending_packages(session, &profile.settings.python_packages);
    session.run_step("install python packages", packages.is_empty(), || {
        let mut args = vec!["-m", "pip", "install", "-U"];
        args.extend(&packages);
        python.call(args)?;
        Ok(())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::RunMode;
    use pretty_assertions::assert_eq;

    #[test]
    fn pending_packages_drops_excluded() {
        let session = Session::new(RunMode::Automated, vec!["harlogger".into()]);
        let packages = vec!["ipython".to_string(), "harlogger".to_string()];

        assert_eq!(pending_packages(&session, &packages), ["ipython"]);
    }
}
