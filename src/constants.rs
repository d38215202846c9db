//! # Constants
//!
//! Shared constants used throughout the resource provider.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables or CLI flags where applicable.

/// File name of the fallback S3 configuration, looked up in the same
/// directory as the host agent's main configuration file
pub const FALLBACK_CONFIG_FILE_NAME: &str = "aws_config.yaml";

/// Default location of the host agent's main configuration file
pub const DEFAULT_HOST_CONFIG_PATH: &str = "/etc/s3-file-resource/agent.yaml";

/// Environment variable overriding the host configuration file location
pub const HOST_CONFIG_ENV: &str = "S3_RESOURCE_HOST_CONFIG";

/// Default global log level
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Chunk size used when hashing local files (256 KiB)
pub const DIGEST_CHUNK_SIZE: usize = 256 * 1024;

/// Credentials provider name reported to the AWS SDK for static keys
pub const CREDENTIALS_PROVIDER_NAME: &str = "s3-file-resource";

/// Tracing target used for the default env filter
pub const LOG_TARGET: &str = "s3_file_resource";
