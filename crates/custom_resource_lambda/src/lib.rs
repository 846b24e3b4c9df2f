//! AWS-oriented adapters and handlers for the CloudFormation custom resource.
//!
//! This crate owns runtime integration details (the Lambda entrypoint, the
//! object-store and response-delivery seams, and operation handlers) and
//! re-exports the core contract under a single `runtime` module boundary.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;

pub mod runtime {
    pub use custom_resource_core::{archive, contract, object_keys, operations};
}
