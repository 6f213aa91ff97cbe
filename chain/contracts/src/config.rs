//! Runtime configuration
//!
//! Loaded from JSON or built in code; every field has a default.

use serde::{Deserialize, Serialize};
use types::ids::Address;

use crate::errors::ConfigError;

/// How the factory becomes the registry's authorized writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriterBinding {
    /// Bound while the runtime is constructed
    AtDeploy,
    /// Left unbound until the deployer calls `Runtime::bind_factory`
    Explicit,
}

/// Configuration for the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Registry admin; the factory address is derived from it.
    pub deployer: Address,
    pub writer_binding: WriterBinding,
    /// Maximum number of tokens in one batch balance query.
    pub max_batch_tokens: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            deployer: Address::derive(b"deployer", &[]),
            writer_binding: WriterBinding::AtDeploy,
            max_batch_tokens: 256,
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deployer.is_zero() {
            return Err(ConfigError::Invalid {
                field: "deployer",
                reason: "must not be the zero address".to_string(),
            });
        }
        if self.max_batch_tokens == 0 {
            return Err(ConfigError::Invalid {
                field: "max_batch_tokens",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
