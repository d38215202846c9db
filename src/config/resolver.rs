//! # Config Resolver
//!
//! Produces the client configuration for one reconciliation: resource
//! parameters first, the fallback source second, each validated against the
//! same schema. Nothing is cached between calls.

use super::client::{ClientConfig, ConfigCandidate, ConfigSource, FieldErrors};
use super::error::ConfigError;
use super::fallback::FallbackSource;
use crate::resource::CredentialParams;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct ConfigResolver {
    fallback: Arc<dyn FallbackSource>,
}

impl std::fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResolver").finish_non_exhaustive()
    }
}

impl ConfigResolver {
    pub fn new(fallback: impl FallbackSource + 'static) -> Self {
        Self {
            fallback: Arc::new(fallback),
        }
    }

    /// Resolve a validated client configuration.
    ///
    /// The fallback source is only consulted when the resource parameters do
    /// not validate.
    pub fn resolve(&self, params: &CredentialParams) -> Result<ClientConfig, ConfigError> {
        let errors = match ConfigCandidate::from_params(params).validate(ConfigSource::Parameters) {
            Ok(config) => {
                debug!("Using S3 config from resource parameters");
                return Ok(config);
            }
            Err(errors) => errors,
        };

        debug!(
            "S3 config from resource parameters not valid, some parameters are missing or not defined: {}",
            FieldErrors(errors)
        );

        let Some(fallback) = self.fallback.load()? else {
            return Err(ConfigError::NotFound);
        };

        debug!("Using S3 config from file: {}", fallback.origin);
        let origin = fallback.origin.clone();
        match ConfigCandidate::from_fallback(&fallback.values)
            .validate(ConfigSource::Fallback(origin.clone()))
        {
            Ok(config) => {
                debug!("S3 config file {} loaded", origin);
                Ok(config)
            }
            Err(errors) => Err(ConfigError::Invalid {
                origin,
                errors: FieldErrors(errors),
            }),
        }
    }
}
