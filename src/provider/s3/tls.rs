//! HTTP client for S3-compatible endpoints with `ssl_verify_peer = false`.
//!
//! The SDK's default client always verifies server certificates. Self-hosted
//! stores (Ceph, Cleversafe, MinIO) often run with self-signed certificates,
//! so this client accepts any certificate presented by the server. TLS is
//! still negotiated; only the peer verification is skipped.

use aws_sdk_s3::config::SharedHttpClient;
use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;
use rustls::client::{ServerCertVerified, ServerCertVerifier};
use rustls::{Certificate, ServerName};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::warn;

#[derive(Debug)]
struct AcceptAnyServerCert;

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}

/// HTTP client that skips server certificate verification
pub(crate) fn unverified_http_client(endpoint: &str) -> SharedHttpClient {
    warn!(
        "TLS peer verification disabled for S3 endpoint {}",
        endpoint
    );

    let tls_config = rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert))
        .with_no_client_auth();

    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();

    HyperClientBuilder::new().build(connector)
}
