// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Preference flag configuration.
//!
//! Writes the handful of macOS preference flags worth carrying from machine
//! to machine through the `defaults` command: Finder behavior and keyboard
//! repeat rates. Writing a preference key that already holds the wanted
//! value is a no-op as far as the preference store cares, so the whole
//! operation can run any number of times.
//!
//! The keyboard repeat rates are numeric-parameter steps: the operator gets
//! asked for the values with sensible defaults, and automated runs take the
//! defaults as is. Both only apply after logout and login.

use crate::{
    process::Tool,
    task::{Result, Session},
};

use tracing::instrument;

/// Default for the delay until key repeat starts. The normal minimum
/// reachable from the settings UI is 15 (225 ms).
pub const INITIAL_KEY_REPEAT_DEFAULT: i64 = 12;

/// Default for the delay between key repeats. The normal minimum reachable
/// from the settings UI is 2 (30 ms).
pub const KEY_REPEAT_DEFAULT: i64 = 12;

/// A single `defaults write` invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreferenceWrite {
    /// Preference domain, e.g., "com.apple.finder".
    pub domain: &'static str,

    /// Preference key within the domain.
    pub key: &'static str,

    /// Typed value to write.
    pub value: PreferenceValue,
}

/// Typed value of a preference write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreferenceValue {
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl PreferenceWrite {
    /// Argument vector handed to the `defaults` command.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "write".to_string(),
            self.domain.to_string(),
            self.key.to_string(),
        ];

        match &self.value {
            PreferenceValue::Bool(value) => {
                args.extend(["-bool".to_string(), value.to_string()]);
            }
            PreferenceValue::Int(value) => {
                args.extend(["-int".to_string(), value.to_string()]);
            }
            PreferenceValue::Str(value) => {
                args.extend(["-string".to_string(), value.to_string()]);
            }
        }

        args
    }
}

/// Finder preference writes: show every file extension, show the path bar,
/// default to list view.
pub fn finder_writes() -> Vec<PreferenceWrite> {
    vec![
        PreferenceWrite {
            domain: "NSGlobalDomain",
            key: "AppleShowAllExtensions",
            value: PreferenceValue::Bool(true),
        },
        PreferenceWrite {
            domain: "com.apple.finder",
            key: "ShowPathbar",
            value: PreferenceValue::Bool(true),
        },
        PreferenceWrite {
            domain: "com.apple.finder",
            key: "FXPreferredViewStyle",
            value: PreferenceValue::Str("Nlsv"),
        },
    ]
}

/// Keyboard preference writes for target repeat rates, plus disabling the
/// press-and-hold accent popover that eats held keys.
pub fn keyboard_writes(initial_key_repeat: i64, key_repeat: i64) -> Vec<PreferenceWrite> {
    vec![
        PreferenceWrite {
            domain: "-g",
            key: "InitialKeyRepeat",
            value: PreferenceValue::Int(initial_key_repeat),
        },
        PreferenceWrite {
            domain: "-g",
            key: "KeyRepeat",
            value: PreferenceValue::Int(key_repeat),
        },
        PreferenceWrite {
            domain: "-g",
            key: "ApplePressAndHoldEnabled",
            value: PreferenceValue::Bool(false),
        },
    ]
}

/// Configure preference flags.
///
/// # Errors
///
/// - Return [`TaskError`](crate::task::TaskError) if any `defaults`,
///   `sudo`, or `killall` invocation fails, or a prompt fails.
#[instrument(skip(session), level = "debug")]
pub fn configure(session: &Session) -> Result<()> {
    let defaults = Tool::new("defaults");

    session.run_step("allow app execution from anywhere", false, || {
        Tool::new("sudo").call_interactive(["spctl", "--master-disable"])?;
        Ok(())
    })?;

    session.run_step("configure finder preferences", false, || {
        for write in finder_writes() {
            defaults.call(write.args())?;
        }
        Ok(())
    })?;

    session.run_step("configure keyboard repeat rates", false, || {
        let initial = session.ask_count("initial key repeat", INITIAL_KEY_REPEAT_DEFAULT)?;
        let repeat = session.ask_count("key repeat", KEY_REPEAT_DEFAULT)?;
        for write in keyboard_writes(initial, repeat) {
            defaults.call(write.args())?;
        }
        Ok(())
    })?;

    session.run_step("restart finder", false, || {
        Tool::new("killall").call(["Finder"])?;
        Ok(())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn write_args_spell_out_types() {
        let write = PreferenceWrite {
            domain: "-g",
            key: "InitialKeyRepeat",
            value: PreferenceValue::Int(12),
        };

        assert_eq!(write.args(), ["write", "-g", "InitialKeyRepeat", "-int", "12"]);
    }

    #[test]
    fn write_sets_are_deterministic() {
        assert_eq!(finder_writes(), finder_writes());
        assert_eq!(keyboard_writes(12, 12), keyboard_writes(12, 12));
    }

    #[test]
    fn keyboard_writes_carry_requested_rates() {
        let writes = keyboard_writes(15, 2);

        assert_eq!(writes[0].value, PreferenceValue::Int(15));
        assert_eq!(writes[1].value, PreferenceValue::Int(2));
    }
}
