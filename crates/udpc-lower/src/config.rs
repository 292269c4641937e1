use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Options of the table lowering pass.
///
/// Every field has a default, so an empty TOML document is a valid
/// configuration:
///
/// ```toml
/// ifield_name = "tableline__ifield__udptmp"
/// dont_care = "xX?bB"
/// unknown_output = "xX"
/// verify = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LowerConfig {
    /// Name of the variable holding the packed inputs of a table
    pub ifield_name: String,

    /// Input symbols matched as don't-care
    pub dont_care: String,

    /// Output symbols lowered to x without a warning
    pub unknown_output: String,

    /// Run the consistency check on the tree after lowering
    pub verify: bool,
}

impl Default for LowerConfig {
    fn default() -> Self {
        Self {
            ifield_name: "tableline__ifield__udptmp".to_string(),
            dont_care: "xX?bB".to_string(),
            unknown_output: "xX".to_string(),
            verify: true,
        }
    }
}

impl LowerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: LowerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ifield_name.trim().is_empty() {
            return Err(ConfigError::Value {
                key: "ifield_name",
                reason: "must not be empty".to_string(),
            });
        }
        for (key, symbols) in [("dont_care", &self.dont_care), ("unknown_output", &self.unknown_output)] {
            if let Some(level) = symbols.chars().find(|c| matches!(c, '0' | '1')) {
                return Err(ConfigError::Value {
                    key,
                    reason: format!("`{}` is a logic level", level),
                });
            }
        }
        Ok(())
    }

    pub fn is_dont_care(&self, symbol: char) -> bool {
        self.dont_care.contains(symbol)
    }

    pub fn is_unknown_output(&self, symbol: char) -> bool {
        self.unknown_output.contains(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        assert_eq!(LowerConfig::from_toml_str(""), Ok(LowerConfig::default()));
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = LowerConfig::from_toml_str("dont_care = \"?\"\nverify = false\n").unwrap();
        assert!(config.is_dont_care('?'));
        assert!(!config.is_dont_care('x'));
        assert!(!config.verify);
        assert_eq!(config.ifield_name, "tableline__ifield__udptmp");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = LowerConfig::from_toml_str("dontcare = \"?\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(message) if message.contains("dontcare")));
    }

    #[test]
    fn test_levels_cannot_be_dont_care() {
        assert_eq!(
            LowerConfig::from_toml_str("dont_care = \"x1\""),
            Err(ConfigError::Value { key: "dont_care", reason: "`1` is a logic level".to_string() })
        );
        assert!(matches!(
            LowerConfig::from_toml_str("ifield_name = \" \""),
            Err(ConfigError::Value { key: "ifield_name", .. })
        ));
    }
}
