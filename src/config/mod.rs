//! # Configuration
//!
//! Agent settings and S3 client configuration resolution.

pub mod agent;
pub mod client;
pub mod error;
pub mod fallback;
pub mod resolver;

pub use agent::AgentConfig;
pub use client::{
    ClientConfig, ConfigCandidate, ConfigSource, EndpointConfig, FieldError, FieldErrors,
    FieldProblem,
};
pub use error::ConfigError;
pub use fallback::{FallbackConfig, FallbackMap, FallbackSource, FileFallbackSource, NoFallback};
pub use resolver::ConfigResolver;
