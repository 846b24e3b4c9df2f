//! Shared custom-resource domain primitives.
//!
//! This crate owns the CloudFormation request/response contract, the
//! operation registry, and archive parsing. It intentionally excludes AWS SDK
//! and Lambda runtime concerns; those live in `custom_resource_lambda`.

pub mod archive;
pub mod contract;
pub mod object_keys;
pub mod operations;
