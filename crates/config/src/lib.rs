//! Configuration loading and validation for rolescope.
//!
//! Loads configuration from `~/.rolescope/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.rolescope/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolescopeConfig {
    /// Normalization pipeline settings
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// CREATE2 addressing of packed conditions
    #[serde(default)]
    pub addressing: AddressingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Factor common structure out of Or groups
    #[serde(default = "default_true")]
    pub push_down: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            push_down: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressingConfig {
    /// CREATE2 deployer, 20 bytes of hex
    #[serde(default = "default_deployer")]
    pub deployer: String,

    /// CREATE2 salt, 32 bytes of hex
    #[serde(default = "default_salt")]
    pub salt: String,
}

/// The EIP-2470 singleton factory.
pub const DEFAULT_DEPLOYER: &str = "0xce0042B868300000d44A59004Da54A005ffdcf9f";

fn default_deployer() -> String {
    DEFAULT_DEPLOYER.into()
}
fn default_salt() -> String {
    format!("0x{}", "00".repeat(32))
}

impl Default for AddressingConfig {
    fn default() -> Self {
        Self {
            deployer: default_deployer(),
            salt: default_salt(),
        }
    }
}

impl AddressingConfig {
    /// The deployer as raw bytes.
    pub fn deployer_bytes(&self) -> Result<[u8; 20], ConfigError> {
        fixed_hex("addressing.deployer", &self.deployer)
    }

    /// The salt as raw bytes.
    pub fn salt_bytes(&self) -> Result<[u8; 32], ConfigError> {
        fixed_hex("addressing.salt", &self.salt)
    }
}

fn fixed_hex<const N: usize>(field: &str, value: &str) -> Result<[u8; N], ConfigError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    let bytes = hex::decode(digits)
        .map_err(|e| ConfigError::ValidationError(format!("{field} is not valid hex: {e}")))?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        ConfigError::ValidationError(format!("{field} must be {N} bytes, got {len}"))
    })
}

impl RolescopeConfig {
    /// Load configuration from the default path (~/.rolescope/config.toml).
    ///
    /// Environment variables override the file:
    /// - `ROLESCOPE_PUSH_DOWN` (`true`/`false`/`1`/`0`)
    /// - `ROLESCOPE_DEPLOYER`
    /// - `ROLESCOPE_SALT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides read through `lookup` (the process environment in
    /// [`load`](Self::load)).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ROLESCOPE_PUSH_DOWN") {
            self.normalize.push_down = parse_flag("ROLESCOPE_PUSH_DOWN", &value)?;
        }
        if let Some(deployer) = lookup("ROLESCOPE_DEPLOYER") {
            self.addressing.deployer = deployer;
        }
        if let Some(salt) = lookup("ROLESCOPE_SALT") {
            self.addressing.salt = salt;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".rolescope")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.addressing.deployer_bytes()?;
        self.addressing.salt_bytes()?;
        Ok(())
    }

    /// Render the default configuration as TOML.
    pub fn default_toml() -> String {
        Self::default().to_toml()
    }

    /// Render this configuration as TOML.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(ConfigError::ValidationError(format!(
            "{key} must be true, false, 1 or 0, got {other:?}"
        ))),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = RolescopeConfig::default();
        assert!(config.normalize.push_down);
        assert_eq!(config.addressing.deployer, DEFAULT_DEPLOYER);
        assert_eq!(config.addressing.salt_bytes().unwrap(), [0u8; 32]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = RolescopeConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: RolescopeConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = RolescopeConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert_eq!(result.unwrap(), RolescopeConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[normalize]\npush_down = false\n").unwrap();

        let config = RolescopeConfig::load_from(&path).unwrap();
        assert!(!config.normalize.push_down);
        assert_eq!(config.addressing, AddressingConfig::default());
    }

    #[test]
    fn file_settings_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let salt = format!("0x{}", "11".repeat(32));
        std::fs::write(
            &path,
            format!(
                "[addressing]\ndeployer = \"0x{}\"\nsalt = \"{salt}\"\n",
                "ab".repeat(20)
            ),
        )
        .unwrap();

        let config = RolescopeConfig::load_from(&path).unwrap();
        assert_eq!(config.addressing.deployer_bytes().unwrap(), [0xab; 20]);
        assert_eq!(config.addressing.salt_bytes().unwrap(), [0x11; 32]);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[normalize\npush_down = ").unwrap();
        assert!(matches!(
            RolescopeConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn short_deployer_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[addressing]\ndeployer = \"0x1234\"\n").unwrap();
        let err = RolescopeConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("20 bytes"));
    }

    #[test]
    fn non_hex_salt_rejected() {
        let config = RolescopeConfig {
            addressing: AddressingConfig {
                salt: "0xnothex".into(),
                ..AddressingConfig::default()
            },
            ..RolescopeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = RolescopeConfig::default();
        let deployer = format!("0x{}", "00".repeat(20));
        config
            .apply_overrides(env(&[
                ("ROLESCOPE_PUSH_DOWN", "0"),
                ("ROLESCOPE_DEPLOYER", &deployer),
            ]))
            .unwrap();
        assert!(!config.normalize.push_down);
        assert_eq!(config.addressing.deployer, deployer);
        assert_eq!(config.addressing.salt, default_salt());
    }

    #[test]
    fn bad_push_down_flag_rejected() {
        let mut config = RolescopeConfig::default();
        let err = config
            .apply_overrides(env(&[("ROLESCOPE_PUSH_DOWN", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("ROLESCOPE_PUSH_DOWN"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = RolescopeConfig::default_toml();
        assert!(toml_str.contains("[normalize]"));
        assert!(toml_str.contains("push_down = true"));
        assert!(toml_str.contains(DEFAULT_DEPLOYER));
    }
}
