// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Provisioning profile layout.
//!
//! Specify the layout of the profile file that macsetup uses to decide what a
//! fully provisioned workstation looks like. A profile lists the Homebrew
//! formulae, cask applications, Python packages, and editor extensions to
//! install, along with the dotfiles repository that carries the user's shell
//! resource file.
//!
//! The profile is plain TOML. A builtin profile ships inside the binary so
//! the tool works out of the box, and the user can point the CLI at their own
//! profile file to override it. Path fields go through shell expansion at
//! parse time, so entries like `~/dev` or `$HOME/dev` are valid.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Builtin profile used when the operator does not supply their own.
const BUILTIN_PROFILE: &str = r#"
[settings]
dev_dir = "~/dev"
login_shell = "/bin/zsh"
default_browser = "chrome"
formulae = [
    "git",
    "git-lfs",
    "cmake",
    "openssl@3",
    "libffi",
    "defaultbrowser",
    "bat",
    "fzf",
    "wget",
    "htop",
    "ncdu",
    "watch",
    "bash-completion",
    "ripgrep",
    "node",
    "drawio",
    "jq",
]
tap_formulae = ["blacktop/tap/ipsw"]
python_packages = [
    "ipython",
    "pygments",
    "humanfriendly",
    "plumbum",
    "pymobiledevice3",
    "harlogger",
    "cfprefsmon",
    "pychangelog2",
]
extensions = [
    "ms-python.python",
    "rust-lang.rust-analyzer",
    "eamodio.gitlens",
    "streetsidesoftware.code-spell-checker",
    "ms-vscode.hexeditor",
]

[dotfiles]
url = "git@github.com:doronz88/worksetup.git"
branch = "main"
rc_file = ".zshrc"

[[cask]]
app = "iTerm.app"
id = "iterm2"

[[cask]]
app = "Sublime Text.app"
id = "sublime-text"

[[cask]]
app = "DB Browser for SQLite.app"
id = "db-browser-for-sqlite"

[[cask]]
app = "Google Chrome.app"
id = "google-chrome"

[[cask]]
app = "Wireshark.app"
id = "wireshark"

[[cask]]
app = "PyCharm CE.app"
id = "pycharm-ce"

[[cask]]
app = "Visual Studio Code.app"
id = "visual-studio-code"

[[cask]]
app = "Rectangle.app"
id = "rectangle"

[[cask]]
app = "Discord.app"
id = "discord"

[[cask]]
app = "Flycut.app"
id = "flycut"
"#;

/// Provisioning profile layout.
///
/// A profile is composed of three basic parts: settings, the dotfiles
/// repository, and the cask application table. The settings section carries
/// the install catalogs and a couple of path fields. The cask table is
/// ordered, because cask installation happens in listing order.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Profile {
    /// Settings for the provisioning run.
    pub settings: ProfileSettings,

    /// Dotfiles repository that carries the shell resource file.
    pub dotfiles: Dotfiles,

    /// Ordered listing of cask applications.
    #[serde(rename = "cask")]
    pub casks: Vec<CaskApp>,
}

impl Profile {
    /// Construct the builtin profile shipped inside the binary.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Deserialize`] if the builtin profile text is
    ///   malformed.
    /// - Return [`ConfigError::ShellExpansion`] if path field expansion fails.
    pub fn builtin() -> Result<Self> {
        BUILTIN_PROFILE.parse()
    }

    /// Load profile from target path, or fall back on the builtin profile.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if the profile file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if profile parsing fails.
    /// - Return [`ConfigError::ShellExpansion`] if path field expansion fails.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => read_to_string(path)
                .map_err(|err| ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                })?
                .parse(),
            None => Self::builtin(),
        }
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut profile: Profile = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on development directory field.
        profile.settings.dev_dir = PathBuf::from(
            shellexpand::full(profile.settings.dev_dir.to_string_lossy().as_ref())
                .map_err(ConfigError::ShellExpansion)?
                .into_owned(),
        );

        Ok(profile)
    }
}

impl Display for Profile {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Profile configuration settings.
///
/// Install catalogs plus the few path fields the provisioning operations
/// need.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// Directory that external repositories get cloned into.
    pub dev_dir: PathBuf,

    /// Login shell to register and switch to.
    pub login_shell: PathBuf,

    /// Browser identifier handed to the `defaultbrowser` helper.
    pub default_browser: String,

    /// Homebrew formulae to install.
    pub formulae: Vec<String>,

    /// Formulae that live in third-party taps.
    pub tap_formulae: Vec<String>,

    /// Python packages to install through pip.
    pub python_packages: Vec<String>,

    /// Editor extensions to install.
    pub extensions: Vec<String>,
}

/// Dotfiles repository settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Dotfiles {
    /// Remote URL to clone dotfiles repository from.
    pub url: String,

    /// Branch to track.
    pub branch: String,

    /// Shell resource file to copy into the user's home directory.
    pub rc_file: String,
}

/// Cask application entry.
///
/// Maps an application bundle name under `/Applications` to the Homebrew
/// cask identifier that installs it.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct CaskApp {
    /// Application bundle name, e.g., "iTerm.app".
    pub app: String,

    /// Cask identifier, e.g., "iterm2".
    pub id: String,
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read profile file.
    #[error("cannot read profile {path:?}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
