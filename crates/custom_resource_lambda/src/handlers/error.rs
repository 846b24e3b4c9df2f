use custom_resource_core::contract::ValidationError;
use custom_resource_core::operations::OperationKind;
use thiserror::Error;
use zip::result::ZipError;

use crate::adapters::object_store::ObjectStoreError;
use crate::handlers::fetch_archive::FetchArchiveError;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    InvalidProperties(#[from] ValidationError),
    #[error(transparent)]
    FetchArchive(#[from] FetchArchiveError),
    #[error(transparent)]
    Store(#[from] ObjectStoreError),
    #[error("failed to extract archive entry '{name}': {source}")]
    ArchiveEntry {
        name: String,
        #[source]
        source: ZipError,
    },
    #[error("cannot update bucket policy of '{bucket}': {reason}")]
    BucketPolicy { bucket: String, reason: String },
    #[error("operation {0} is not supported by this deployment")]
    Unsupported(OperationKind),
}

/// Failures that prevent a response from reaching CloudFormation at all.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    InvalidEvent(#[from] ValidationError),
    #[error("failed to serialize custom resource response: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("failed to deliver custom resource response: {0}")]
    Delivery(String),
}
