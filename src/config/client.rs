//! # Client Configuration
//!
//! Typed S3 client configuration and the schema that validates it.
//!
//! A [`ConfigCandidate`] is assembled from one source (resource parameters or
//! the fallback file) and either validates completely into a
//! [`ClientConfig`] or is rejected with every field-level problem. There is no
//! partially valid configuration.
//!
//! Schema:
//! - `access_key_id`, `secret_access_key`, `region`: always required, non-empty strings
//! - `endpoint`, `ssl_verify_peer`, `force_path_style`: required as a group
//!   when the candidate carries a non-empty `endpoint`

use crate::resource::CredentialParams;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Where a client configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parameters declared on the resource
    Parameters,
    /// Fallback configuration file (path or other description)
    Fallback(String),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Parameters => f.write_str("resource parameters"),
            ConfigSource::Fallback(origin) => write!(f, "file {origin}"),
        }
    }
}

/// Problem found with a single configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    Empty,
    ExpectedString,
    ExpectedBoolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub problem: FieldProblem,
}

impl FieldError {
    #[must_use]
    pub fn new(field: &'static str, problem: FieldProblem) -> Self {
        Self { field, problem }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            FieldProblem::Missing => write!(f, "{} is missing", self.field),
            FieldProblem::Empty => write!(f, "{} must not be empty", self.field),
            FieldProblem::ExpectedString => write!(f, "{} must be a string", self.field),
            FieldProblem::ExpectedBoolean => write!(f, "{} must be a boolean", self.field),
        }
    }
}

/// Field errors rendered as one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Settings for S3-compatible (non-AWS) storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub url: String,
    /// Verify the server's TLS certificate
    pub ssl_verify_peer: bool,
    /// Keep the bucket name in the request path instead of the host name
    pub force_path_style: bool,
}

/// Validated S3 client configuration.
///
/// Key material is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ClientConfig {
    access_key_id: String,
    secret_access_key: String,
    #[zeroize(skip)]
    region: String,
    #[zeroize(skip)]
    endpoint: Option<EndpointConfig>,
    #[zeroize(skip)]
    source: ConfigSource,
}

impl ClientConfig {
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint(&self) -> Option<&EndpointConfig> {
        self.endpoint.as_ref()
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("source", &self.source)
            .finish()
    }
}

/// Unvalidated configuration assembled from a single source
#[derive(Clone, Default)]
pub struct ConfigCandidate {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub ssl_verify_peer: Option<bool>,
    pub force_path_style: Option<bool>,
    /// Type mismatches found while reading an untyped source
    pub type_errors: Vec<FieldError>,
}

impl fmt::Debug for ConfigCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigCandidate")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("ssl_verify_peer", &self.ssl_verify_peer)
            .field("force_path_style", &self.force_path_style)
            .field("type_errors", &self.type_errors)
            .finish()
    }
}

impl ConfigCandidate {
    /// Candidate from resource parameters. The endpoint group is only carried
    /// over when an endpoint is set.
    #[must_use]
    pub fn from_params(params: &CredentialParams) -> Self {
        let mut candidate = Self::default();
        candidate.access_key_id.clone_from(&params.access_key_id);
        candidate.secret_access_key.clone_from(&params.secret_access_key);
        candidate.region.clone_from(&params.region);
        if has_endpoint(params.endpoint.as_deref()) {
            candidate.endpoint.clone_from(&params.endpoint);
            candidate.ssl_verify_peer = params.ssl_verify_peer;
            candidate.force_path_style = params.force_path_style;
        }
        candidate
    }

    /// Whether the endpoint group is part of this candidate's schema
    #[must_use]
    pub fn uses_endpoint(&self) -> bool {
        has_endpoint(self.endpoint.as_deref())
    }

    /// Check every field against the schema. All problems are reported, not
    /// just the first one.
    pub fn validate(self, source: ConfigSource) -> Result<ClientConfig, Vec<FieldError>> {
        let mut errors = self.type_errors.clone();
        let seen = |field: &'static str| errors.iter().any(|e| e.field == field);
        let mut missing = Vec::new();

        for (field, value) in [
            ("access_key_id", &self.access_key_id),
            ("secret_access_key", &self.secret_access_key),
            ("region", &self.region),
        ] {
            if seen(field) {
                continue;
            }
            match value.as_deref() {
                None => missing.push(FieldError::new(field, FieldProblem::Missing)),
                Some(v) if v.is_empty() => missing.push(FieldError::new(field, FieldProblem::Empty)),
                Some(_) => {}
            }
        }

        let uses_endpoint = self.uses_endpoint();
        if uses_endpoint {
            for (field, value) in [
                ("ssl_verify_peer", self.ssl_verify_peer),
                ("force_path_style", self.force_path_style),
            ] {
                if value.is_none() && !seen(field) {
                    missing.push(FieldError::new(field, FieldProblem::Missing));
                }
            }
        }

        errors.extend(missing);
        if !errors.is_empty() {
            return Err(errors);
        }

        let endpoint = if uses_endpoint {
            Some(EndpointConfig {
                url: self.endpoint.clone().unwrap_or_default(),
                ssl_verify_peer: self.ssl_verify_peer.unwrap_or(true),
                force_path_style: self.force_path_style.unwrap_or(false),
            })
        } else {
            None
        };

        Ok(ClientConfig {
            access_key_id: self.access_key_id.clone().unwrap_or_default(),
            secret_access_key: self.secret_access_key.clone().unwrap_or_default(),
            region: self.region.clone().unwrap_or_default(),
            endpoint,
            source,
        })
    }
}

impl Drop for ConfigCandidate {
    fn drop(&mut self) {
        if let Some(secret) = self.secret_access_key.as_mut() {
            secret.zeroize();
        }
    }
}

fn has_endpoint(endpoint: Option<&str>) -> bool {
    endpoint.is_some_and(|e| !e.is_empty())
}
