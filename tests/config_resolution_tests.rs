//! # Configuration Resolution Tests
//!
//! Resource parameters versus the `aws_config.yaml` fallback file, driven
//! through a full reconciliation.

mod common;

use common::{aws_params, FakeStore};
use s3_file_resource::config::{
    AgentConfig, ConfigError, ConfigResolver, ConfigSource, FileFallbackSource,
};
use s3_file_resource::controller::{Outcome, Reconciler};
use s3_file_resource::resource::{CredentialParams, EnsureState, ResourceSpec};
use std::path::Path;
use std::sync::Arc;

/// Fallback file in the shape the host agent writes it (Ruby symbol keys)
const SYMBOL_KEYED_FALLBACK: &str = "---
:access_key_id: AKIAFALLBACK
:secret_access_key: fallback-secret
:region: eu-central-1
";

fn resolver_beside(host_config: &Path) -> ConfigResolver {
    let agent = AgentConfig {
        host_config_path: host_config.to_path_buf(),
        ..AgentConfig::default()
    };
    ConfigResolver::new(FileFallbackSource::new(agent.fallback_config_path()))
}

#[test]
fn test_parameters_take_precedence_over_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("aws_config.yaml"), SYMBOL_KEYED_FALLBACK).unwrap();
    let resolver = resolver_beside(&dir.path().join("agent.yaml"));

    let config = resolver.resolve(&aws_params()).unwrap();

    assert_eq!(config.region(), "us-east-1");
    assert_eq!(config.source(), &ConfigSource::Parameters);
}

#[test]
fn test_incomplete_parameters_use_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("aws_config.yaml"), SYMBOL_KEYED_FALLBACK).unwrap();
    let resolver = resolver_beside(&dir.path().join("agent.yaml"));
    let params = CredentialParams {
        region: None,
        ..aws_params()
    };

    let config = resolver.resolve(&params).unwrap();

    assert_eq!(config.access_key_id(), "AKIAFALLBACK");
    assert_eq!(config.region(), "eu-central-1");
    assert!(matches!(config.source(), ConfigSource::Fallback(_)));
}

#[test]
fn test_plain_keys_with_endpoint_group() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("aws_config.yaml"),
        "access_key_id: AK\nsecret_access_key: SK\nregion: dummy\nendpoint: https://ceph.internal:8443\nssl_verify_peer: false\nforce_path_style: true\n",
    )
    .unwrap();
    let resolver = resolver_beside(&dir.path().join("agent.yaml"));

    let config = resolver.resolve(&CredentialParams::default()).unwrap();
    let endpoint = config.endpoint().unwrap();

    assert_eq!(endpoint.url, "https://ceph.internal:8443");
    assert!(!endpoint.ssl_verify_peer);
    assert!(endpoint.force_path_style);
}

#[test]
fn test_missing_and_empty_files_mean_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = resolver_beside(&dir.path().join("agent.yaml"));

    let err = resolver.resolve(&CredentialParams::default()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound));

    std::fs::write(dir.path().join("aws_config.yaml"), "").unwrap();
    let err = resolver.resolve(&CredentialParams::default()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound));
}

#[test]
fn test_incomplete_file_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("aws_config.yaml"), ":region: eu-west-1\n").unwrap();
    let resolver = resolver_beside(&dir.path().join("agent.yaml"));

    let err = resolver.resolve(&CredentialParams::default()).unwrap_err();

    match err {
        ConfigError::Invalid { errors, .. } => {
            let fields: Vec<_> = errors.0.iter().map(|e| e.field).collect();
            assert_eq!(fields, vec!["access_key_id", "secret_access_key"]);
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reconciliation_connects_with_fallback_region() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("aws_config.yaml"), SYMBOL_KEYED_FALLBACK).unwrap();
    let target = dir.path().join("downloaded.txt");
    let store = FakeStore::new().with_object("bucket", "downloaded.txt", b"payload");
    let reconciler = Reconciler::new(
        resolver_beside(&dir.path().join("agent.yaml")),
        Arc::new(store.clone()),
    );

    let outcome = reconciler
        .ensure(&ResourceSpec::new(
            &target,
            "/bucket/downloaded.txt",
            EnsureState::Present,
        ))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Created { bytes: 7 });
    assert_eq!(store.connected_regions(), vec!["eu-central-1".to_string()]);
}
