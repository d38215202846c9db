//! # Controller
//!
//! Reconciliation of managed files against remote objects.
//!
//! - `locator`: splits a resource source into bucket and key
//! - `digest`: local MD5 versus remote ETag comparison
//! - `fs`: atomic writes of downloaded content
//! - `reconciler`: present / absent / latest state machine

pub mod digest;
pub mod fs;
pub mod locator;
pub mod reconciler;

pub use locator::{LocatorError, ObjectLocation};
pub use reconciler::{Outcome, Reconciler};
