//! Tunables for declaration limits, the argument prefix, and help output.
//!
//! These configure the parser itself. Argument values always come from the
//! command line; nothing here sources them from files or the environment.
//!
//! # Example YAML
//!
//! ```yaml
//! prefix: "/"
//! max_name_len: 32
//! max_value_len: 64
//! max_arguments: 16
//! use_color: true
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Default maximum length of a prefixed argument name.
pub const DEFAULT_MAX_NAME_LEN: usize = 50;

/// Default maximum length of an argument description.
pub const DEFAULT_MAX_DESCRIPTION_LEN: usize = 100;

/// Default maximum number of bytes kept from a text value.
pub const DEFAULT_MAX_VALUE_LEN: usize = 100;

/// Default starting capacity of list value stores.
pub const DEFAULT_LIST_CAPACITY: usize = 10;

/// Parser tunables.
///
/// Every field has a default, so a partial YAML document is enough.
///
/// # Examples
///
/// ```
/// use argbind_core::ParserConfig;
///
/// let config = ParserConfig::default();
/// assert_eq!(config.prefix, '-');
/// assert_eq!(config.max_value_len, 100);
/// assert!(config.max_arguments.is_none());
///
/// let config = ParserConfig::from_yaml_str("prefix: \"/\"\nmax_value_len: 10\n").unwrap();
/// assert_eq!(config.prefix, '/');
/// assert_eq!(config.max_value_len, 10);
/// assert_eq!(config.max_name_len, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Character that marks a token as an argument name.
    pub prefix: char,
    /// Maximum length of a name, prefix included.
    pub max_name_len: usize,
    /// Descriptions longer than this are truncated.
    pub max_description_len: usize,
    /// Text values longer than this many bytes are truncated.
    pub max_value_len: usize,
    /// Hard cap on declared arguments; `None` means unbounded.
    pub max_arguments: Option<usize>,
    /// Emit ANSI escape codes in help output.
    pub use_color: bool,
    /// Starting capacity of list value stores.
    pub list_capacity: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            prefix: '-',
            max_name_len: DEFAULT_MAX_NAME_LEN,
            max_description_len: DEFAULT_MAX_DESCRIPTION_LEN,
            max_value_len: DEFAULT_MAX_VALUE_LEN,
            max_arguments: None,
            use_color: false,
            list_capacity: DEFAULT_LIST_CAPACITY,
        }
    }
}

impl ParserConfig {
    /// Parses and validates configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](SettingsError::YamlError) on malformed YAML and
    /// [`Invalid`](SettingsError::Invalid) if [`validate`](Self::validate)
    /// rejects the values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](SettingsError::IoError) if the file cannot be
    /// read, otherwise the same errors as [`from_yaml_str`](Self::from_yaml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values describe a usable parser.
    ///
    /// # Errors
    ///
    /// Returns [`Invalid`](SettingsError::Invalid) when the prefix is
    /// whitespace, when a length limit is zero, or when the name limit leaves
    /// no room after the prefix.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.prefix.is_whitespace() {
            return Err(SettingsError::Invalid(
                "prefix cannot be whitespace".to_string(),
            ));
        }
        if self.max_name_len < self.prefix.len_utf8() + 1 {
            return Err(SettingsError::Invalid(format!(
                "max_name_len must leave room after the prefix, got {}",
                self.max_name_len
            )));
        }
        if self.max_value_len == 0 {
            return Err(SettingsError::Invalid(
                "max_value_len must be greater than zero".to_string(),
            ));
        }
        if self.list_capacity == 0 {
            return Err(SettingsError::Invalid(
                "list_capacity must be greater than zero".to_string(),
            ));
        }
        if self.max_arguments == Some(0) {
            return Err(SettingsError::Invalid(
                "max_arguments must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_deserialize_complete() {
        let yaml = r#"
prefix: "/"
max_name_len: 20
max_description_len: 60
max_value_len: 10
max_arguments: 8
use_color: true
list_capacity: 4
"#;
        let config = ParserConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.prefix, '/');
        assert_eq!(config.max_name_len, 20);
        assert_eq!(config.max_description_len, 60);
        assert_eq!(config.max_value_len, 10);
        assert_eq!(config.max_arguments, Some(8));
        assert!(config.use_color);
        assert_eq!(config.list_capacity, 4);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ParserConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ParserConfig::default());
    }

    #[test]
    fn test_rejects_unusable_values() {
        assert!(matches!(
            ParserConfig::from_yaml_str("prefix: \" \""),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            ParserConfig::from_yaml_str("max_value_len: 0"),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            ParserConfig::from_yaml_str("max_name_len: 1"),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            ParserConfig::from_yaml_str("max_arguments: 0"),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        assert!(matches!(
            ParserConfig::from_yaml_str("max_value_len: [1, 2"),
            Err(SettingsError::YamlError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_arguments: 3").unwrap();
        writeln!(file, "use_color: true").unwrap();

        let config = ParserConfig::load(file.path()).unwrap();
        assert_eq!(config.max_arguments, Some(3));
        assert!(config.use_color);
        assert_eq!(config.prefix, '-');
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ParserConfig::load(dir.path().join("missing.yml"));
        assert!(matches!(result, Err(SettingsError::IoError(_))));
    }
}
