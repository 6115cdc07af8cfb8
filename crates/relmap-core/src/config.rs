use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Constants
///

pub const DEFAULT_ID_PROPERTY: &str = "id";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid manager config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("default identifier property must not be empty")]
    EmptyIdProperty,
}

///
/// ManagerConfig
///
/// Manager-wide policy. Missing keys take their defaults; unknown keys are
/// rejected so typos do not silently fall back.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    /// Emit `[debug]` lines for hydration decisions.
    pub debug: bool,

    /// Keep in-memory hydration counters.
    pub metrics: bool,

    /// Identifier property for descriptors that do not name one.
    pub default_id_property: String,
}

impl ManagerConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_id_property.is_empty() {
            return Err(ConfigError::EmptyIdProperty);
        }

        Ok(())
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            metrics: true,
            default_id_property: DEFAULT_ID_PROPERTY.to_string(),
        }
    }
}
