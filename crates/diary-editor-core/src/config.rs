//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::content::MAX_CONTENT_LENGTH;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid editor config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("max_length must be greater than zero")]
    ZeroMaxLength,
}

/// Per-editor settings. Every field is optional in serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Character count above which the entry is flagged as too long.
    pub max_length: usize,
    /// Convert `**x**` / `*x*` to formatting as soon as the closing marker is typed.
    pub live_shorthand: bool,
    /// Enter in a list item starts a new item; Enter on an empty item leaves the list.
    pub list_continuation: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_length: MAX_CONTENT_LENGTH,
            live_shorthand: true,
            list_continuation: true,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(ConfigError::ZeroMaxLength);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::from_json("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.max_length, 10_000);
    }

    #[test]
    fn test_partial() {
        let config = EditorConfig::from_json(r#"{"liveShorthand": false}"#).unwrap();
        assert!(!config.live_shorthand);
        assert!(config.list_continuation);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            EditorConfig::from_json(r#"{"maxLength": 0}"#),
            Err(ConfigError::ZeroMaxLength)
        ));
        assert!(matches!(
            EditorConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
