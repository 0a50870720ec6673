use serde::{Deserialize, Serialize};

use crate::error::{DebugError, Result};
use crate::id::DEFAULT_CLASS_PREFIX;

/// Upper bound on how long an idle-time flush may be postponed.
pub const DEFAULT_IDLE_TIMEOUT_MS: u32 = 180;

/// Start-up settings for a [`crate::DebugContext`].
///
/// ```json
/// { "enabled": true, "idleTimeoutMs": 250, "classPrefix": "__debug_" }
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DebugConfig {
    /// Enable the gate when the context is built.
    pub enabled: bool,
    /// Timeout handed to the idle-callback scheduler.
    pub idle_timeout_ms: u32,
    /// Prefix for generated class names.
    pub class_prefix: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
        }
    }
}

impl DebugConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Class names must stay valid CSS identifiers once the id is appended.
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.class_prefix;
        if prefix.is_empty() {
            return Err(DebugError::Config("classPrefix must not be empty".into()));
        }
        if prefix.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(DebugError::Config(format!(
                "classPrefix `{prefix}` must not start with a digit"
            )));
        }
        // `-` followed by a digit, or a lone `-` followed by the numeric id,
        // does not lex as a CSS identifier.
        if let Some(rest) = prefix.strip_prefix('-') {
            if rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_digit()) {
                return Err(DebugError::Config(format!(
                    "classPrefix `{prefix}` must not be `-` or start with `-` and a digit"
                )));
            }
        }
        if !prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DebugError::Config(format!(
                "classPrefix `{prefix}` may only contain [A-Za-z0-9_-]"
            )));
        }
        Ok(())
    }
}
