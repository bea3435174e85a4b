//! TOML configuration for a modelid generation run.
//!
//! ```toml
//! descriptor_file = "schema/modelid-model.json"
//! max_uid_attempts = 1000
//! comment = ["KEEP THIS FILE!"]
//! ```

use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// File name used when no descriptor path is configured.
pub const DEFAULT_DESCRIPTOR_FILE: &str = "modelid-model.json";

/// Upper bound on uid draws before allocation gives up.
pub const DEFAULT_MAX_UID_ATTEMPTS: u32 = 1000;

/// Comment lines written into a freshly created descriptor.
pub const DEFAULT_COMMENT: [&str; 3] = [
    "KEEP THIS FILE! Check it into a version control system (VCS) like git.",
    "modelid manages crucial IDs for your object model. See docs for details.",
    "If you have VCS merge conflicts, you must resolve them according to the modelid docs.",
];

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// Config
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path of the persisted identity descriptor.
    pub descriptor_file: PathBuf,

    pub max_uid_attempts: u32,

    /// Overrides the comment of newly created descriptors.
    /// Existing descriptors always keep their own comment.
    pub comment: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            descriptor_file: PathBuf::from(DEFAULT_DESCRIPTOR_FILE),
            max_uid_attempts: DEFAULT_MAX_UID_ATTEMPTS,
            comment: None,
        }
    }
}

impl Config {
    /// Default config pointed at a specific descriptor file.
    #[must_use]
    pub fn for_descriptor(path: impl Into<PathBuf>) -> Self {
        Self {
            descriptor_file: path.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Load a config file. A relative `descriptor_file` resolves against
    /// the directory holding the config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&source)?;
        if config.descriptor_file.is_relative()
            && let Some(dir) = path.parent()
        {
            config.descriptor_file = dir.join(&config.descriptor_file);
        }

        Ok(config)
    }

    /// Comment lines for a new descriptor.
    #[must_use]
    pub fn comment_lines(&self) -> Vec<String> {
        self.comment.clone().unwrap_or_else(|| {
            DEFAULT_COMMENT
                .iter()
                .map(ToString::to_string)
                .collect()
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_uid_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_uid_attempts must be greater than zero".to_string(),
            ));
        }
        if self.descriptor_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "descriptor_file must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_yields_defaults() {
        let config = Config::from_toml_str("").expect("empty config should parse");

        assert_eq!(config, Config::default());
        assert_eq!(config.comment_lines().len(), DEFAULT_COMMENT.len());
    }

    #[test]
    fn parses_all_keys() {
        let config = Config::from_toml_str(
            r#"
            descriptor_file = "model/ids.json"
            max_uid_attempts = 16
            comment = ["keep me"]
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.descriptor_file, PathBuf::from("model/ids.json"));
        assert_eq!(config.max_uid_attempts, 16);
        assert_eq!(config.comment_lines(), vec!["keep me".to_string()]);
    }

    #[test]
    fn rejects_unknown_keys_and_zero_attempts() {
        assert!(matches!(
            Config::from_toml_str("descriptor = \"x\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::from_toml_str("max_uid_attempts = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn load_resolves_descriptor_relative_to_config() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("modelid.toml");
        fs::write(&path, "descriptor_file = \"ids.json\"\n").expect("write config");

        let config = Config::load(&path).expect("config should load");

        assert_eq!(config.descriptor_file, dir.path().join("ids.json"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("create tempdir");

        let err = Config::load(dir.path().join("missing.toml")).expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
