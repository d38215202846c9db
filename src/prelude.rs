//! Common imports for embedding the reconciler.

pub use crate::config::{AgentConfig, ClientConfig, ConfigError, ConfigResolver, FileFallbackSource};
pub use crate::controller::{ObjectLocation, Outcome, Reconciler};
pub use crate::error::{Error, Result};
pub use crate::provider::s3::S3Connector;
pub use crate::provider::{ObjectHead, ObjectStore, StoreConnector, StoreError};
pub use crate::resource::{CredentialParams, EnsureState, ResourceSpec};
