use custom_resource_core::archive::ArchiveHandle;
use custom_resource_core::contract::{
    CustomResourceEvent, ValidationError, SOURCE_BUCKET_NAME, SOURCE_PREFIX,
};
use thiserror::Error;
use zip::result::ZipError;

use crate::adapters::object_store::{ObjectStore, ObjectStoreError};

/// Both variants display the underlying error unchanged.
#[derive(Debug, Error)]
pub enum FetchArchiveError {
    /// The store could not return the object (missing key, access denied).
    #[error(transparent)]
    ObjectNotFound(ObjectStoreError),
    /// The object exists but is not a readable zip archive.
    #[error(transparent)]
    MalformedArchive(ZipError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocator {
    pub bucket: String,
    pub key: String,
}

impl StorageLocator {
    /// Locator named by the `SOURCE_BUCKET_NAME` / `SOURCE_PREFIX` properties.
    pub fn source(event: &CustomResourceEvent) -> Result<Self, ValidationError> {
        Ok(Self {
            bucket: event.require_property(SOURCE_BUCKET_NAME)?.to_string(),
            key: event.require_property(SOURCE_PREFIX)?.to_string(),
        })
    }
}

/// Download the object at `bucket`/`key` and open it as a zip archive.
///
/// `key` addresses exactly one object; it is not treated as a listing prefix.
/// The store is called once and nothing is cached.
pub fn fetch_archive(
    store: &(impl ObjectStore + ?Sized),
    bucket: &str,
    key: &str,
) -> Result<ArchiveHandle, FetchArchiveError> {
    let bytes = store
        .get_object(bucket, key)
        .map_err(FetchArchiveError::ObjectNotFound)?;
    ArchiveHandle::from_bytes(bytes).map_err(FetchArchiveError::MalformedArchive)
}
