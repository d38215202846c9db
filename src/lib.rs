//! S3 File Resource
//!
//! Keeps a local file in line with an object stored in AWS S3 or an
//! S3-compatible store. A file is declared `present`, `absent` or `latest`;
//! `latest` re-downloads only when the local MD5 differs from the object's ETag.
//!
//! Tests are included in the module files, with end-to-end scenarios under
//! `tests/`.

pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod resource;

pub use error::{Error, Result};
