// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Editor configuration.
//!
//! Installs the profile's editor extensions through the `code` command line
//! helper, and drops a fixed settings payload into the editor's per-user
//! settings location. The payload is written verbatim: no merging with
//! whatever settings already exist. The write step is skipped when the file
//! already holds the payload byte for byte.

use crate::{
    config::Profile,
    path,
    process::Tool,
    task::{Result, Session},
};

use std::{fs, path::Path};
use tracing::{info, instrument};

/// Per-user editor settings, written verbatim.
const SETTINGS_PAYLOAD: &str = r#"{
    "editor.formatOnSave": true,
    "editor.rulers": [100],
    "files.insertFinalNewline": true,
    "files.trimTrailingWhitespace": true,
    "telemetry.telemetryLevel": "off",
    "terminal.integrated.scrollback": 100000,
    "workbench.startupEditor": "none"
}
"#;

/// Editor extensions to install, minus the operator's exclusions.
pub fn pending_extensions<'a>(session: &Session, extensions: &'a [String]) -> Vec<&'a str> {
    extensions
        .iter()
        .map(String::as_str)
        .filter(|extension| !session.excluded(extension))
        .collect()
}

/// Check if target settings file already holds the payload verbatim.
pub fn settings_in_place(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|content| content == SETTINGS_PAYLOAD)
        .unwrap_or(false)
}

/// Install editor extensions and settings.
///
/// # Errors
///
/// - Return [`TaskError`](crate::task::TaskError) if an extension install
///   fails, the settings file cannot be written, or a prompt fails.
#[instrument(skip(session, profile), level = "debug")]
pub fn install(session: &Session, profile: &Profile) -> Result<()> {
    let code = Tool::new("code");

    let extensions = pending_extensions(session, &profile.settings.extensions);
    session.run_step("install editor extensions", extensions.is_empty(), || {
        for &extension in &extensions {
            info!("install extension {extension}");
            code.call(["--install-extension", extension])?;
        }
        Ok(())
    })?;

    let settings_file = path::editor_settings_file()?;
    session.run_step("write editor settings", settings_in_place(&settings_file), || {
        if let Some(parent) = settings_file.parent() {
            let _ = mkdirp::mkdirp(parent)?;
        }
        fs::write(&settings_file, SETTINGS_PAYLOAD)?;
        Ok(())
    })?;

    Ok(())
}
