//! Translated message lookup for wizard text. Keys fall back to
//! themselves so a missing bundle still produces something readable.

use serde::Deserialize;
use std::collections::HashMap;

pub const KEY_ERROR_CONNECTION: &str = "installWizard_error_connection";
pub const KEY_ERROR_MESSAGE: &str = "installWizard_error_message";
pub const KEY_ERROR_RESTART_NOT_SUPPORTED: &str = "installWizard_error_restartNotSupported";
pub const KEY_FIRST_USER_SKIPPED: &str = "installWizard_firstUserSkippedMessage";
pub const KEY_CONFIGURE_INSTANCE_SKIPPED: &str = "installWizard_configureInstanceSkippedMessage";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Translations {
    messages: HashMap<String, String>,
}

impl Translations {
    pub fn from_map(messages: HashMap<String, String>) -> Self {
        Self { messages }
    }

    /// Replaces any keys present in `overrides`, keeping the rest.
    pub fn apply_overrides(&mut self, overrides: HashMap<String, String>) {
        self.messages.extend(overrides);
    }

    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.messages.get(key).map(String::as_str).unwrap_or(key)
    }
}
