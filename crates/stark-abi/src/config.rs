//! Codec configuration

use serde::{Deserialize, Serialize};

use crate::AbiError;

/// Codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Maximum type nesting depth for classify, decode and encode
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Degrade failing members to raw felts instead of failing the decode
    #[serde(default = "default_lenient")]
    pub lenient: bool,
}

fn default_max_depth() -> usize {
    64
}

fn default_lenient() -> bool {
    true
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            lenient: default_lenient(),
        }
    }
}

impl CodecConfig {
    /// Strict configuration: every decode failure propagates
    pub fn strict() -> Self {
        Self {
            lenient: false,
            ..Default::default()
        }
    }

    /// Set the recursion ceiling
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse from TOML, missing keys take their defaults
    pub fn from_toml_str(s: &str) -> Result<Self, AbiError> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CodecConfig::default();
        assert_eq!(config.max_depth, 64);
        assert!(config.lenient);
    }

    #[test]
    fn test_config_strict() {
        let config = CodecConfig::strict().with_max_depth(8);
        assert!(!config.lenient);
        assert_eq!(config.max_depth, 8);
    }

    #[test]
    fn test_config_deserialize() {
        let config = CodecConfig::from_toml_str(
            r#"
            max_depth = 16
            lenient = false
        "#,
        )
        .unwrap();
        assert_eq!(config.max_depth, 16);
        assert!(!config.lenient);
    }

    #[test]
    fn test_config_partial_toml_uses_defaults() {
        let config = CodecConfig::from_toml_str("max_depth = 3").unwrap();
        assert_eq!(config.max_depth, 3);
        assert!(config.lenient);
    }

    #[test]
    fn test_config_invalid_toml() {
        let result = CodecConfig::from_toml_str("max_depth = \"deep\"");
        assert!(matches!(result, Err(AbiError::Config(_))));
    }
}
