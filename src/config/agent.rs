//! # Agent Configuration
//!
//! Process-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_HOST_CONFIG_PATH, DEFAULT_LOG_FORMAT, DEFAULT_LOG_LEVEL, FALLBACK_CONFIG_FILE_NAME,
    HOST_CONFIG_ENV,
};
use std::path::{Path, PathBuf};

/// Agent-level configuration
///
/// All settings have sensible defaults and can be overridden via environment
/// variables. CLI flags take precedence over both.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Host agent's main configuration file.
    /// The fallback S3 config (`aws_config.yaml`) is looked up next to it.
    pub host_config_path: PathBuf,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
    /// Enable color in text format logs
    pub log_enable_color: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host_config_path: PathBuf::from(DEFAULT_HOST_CONFIG_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: DEFAULT_LOG_FORMAT.to_string(),
            log_enable_color: false,
        }
    }
}

impl AgentConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            host_config_path: PathBuf::from(env_var_or_default_str(
                HOST_CONFIG_ENV,
                DEFAULT_HOST_CONFIG_PATH,
            )),
            log_level: env_var_or_default_str("LOG_LEVEL", DEFAULT_LOG_LEVEL),
            log_format: env_var_or_default_str("LOG_FORMAT", DEFAULT_LOG_FORMAT),
            log_enable_color: env_var_or_default_bool("LOG_ENABLE_COLOR", false),
        }
    }

    /// Path of the fallback S3 configuration file
    pub fn fallback_config_path(&self) -> PathBuf {
        fallback_config_path_for(&self.host_config_path)
    }
}

/// `aws_config.yaml` in the directory holding `host_config`
fn fallback_config_path_for(host_config: &Path) -> PathBuf {
    host_config
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(FALLBACK_CONFIG_FILE_NAME)
}

/// Read environment variable as boolean or return default
fn env_var_or_default_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |v| parse_bool_flag(&v))
}

fn parse_bool_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_path_is_sibling_of_host_config() {
        let config = AgentConfig {
            host_config_path: PathBuf::from("/etc/puppetlabs/puppet/puppet.conf"),
            ..AgentConfig::default()
        };
        assert_eq!(
            config.fallback_config_path(),
            PathBuf::from("/etc/puppetlabs/puppet/aws_config.yaml")
        );
    }

    #[test]
    fn test_fallback_path_for_bare_file_name() {
        assert_eq!(
            fallback_config_path_for(Path::new("agent.yaml")),
            PathBuf::from("./aws_config.yaml")
        );
    }

    #[test]
    fn test_bool_flag_parsing() {
        assert!(parse_bool_flag("TRUE"));
        assert!(parse_bool_flag("on"));
        assert!(parse_bool_flag(" 1 "));
        assert!(!parse_bool_flag("off"));
        assert!(!parse_bool_flag(""));
    }

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.log_level, "INFO");
        assert_eq!(config.log_format, "text");
        assert!(!config.log_enable_color);
        assert_eq!(
            config.fallback_config_path(),
            PathBuf::from("/etc/s3-file-resource/aws_config.yaml")
        );
    }
}
