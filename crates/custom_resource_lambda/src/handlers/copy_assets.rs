use custom_resource_core::contract::{
    CustomResourceEvent, RequestType, ResponseData, DESTINATION_BUCKET_NAME, DESTINATION_PREFIX,
};
use custom_resource_core::object_keys::{content_type_for_key, join_object_key};
use serde_json::Value;
use tracing::debug;

use crate::handlers::dispatch::OperationDeps;
use crate::handlers::error::OperationError;
use crate::handlers::fetch_archive::{fetch_archive, StorageLocator};

pub const FILES_COPIED_KEY: &str = "FilesCopied";

pub fn copy_web_ui(
    event: &CustomResourceEvent,
    deps: &OperationDeps<'_>,
) -> Result<ResponseData, OperationError> {
    unpack_archive_to_bucket(event, deps)
}

pub fn copy_sample_documents(
    event: &CustomResourceEvent,
    deps: &OperationDeps<'_>,
) -> Result<ResponseData, OperationError> {
    unpack_archive_to_bucket(event, deps)
}

/// Expand the source archive into the destination bucket, one object per
/// file entry. Directory entries are skipped. Deletes leave the uploaded
/// objects in place; the destination bucket's own lifecycle owns them.
fn unpack_archive_to_bucket(
    event: &CustomResourceEvent,
    deps: &OperationDeps<'_>,
) -> Result<ResponseData, OperationError> {
    if event.request_type == RequestType::Delete {
        return Ok(ResponseData::new());
    }

    let source = StorageLocator::source(event)?;
    let destination_bucket = event.require_property(DESTINATION_BUCKET_NAME)?;
    let destination_prefix = event.property_str(DESTINATION_PREFIX).unwrap_or_default();

    let mut archive = fetch_archive(deps.store, &source.bucket, &source.key)?;
    let entries = archive.entries().to_vec();

    let mut files_copied = 0usize;
    for (index, entry) in entries.iter().enumerate() {
        if entry.is_dir {
            continue;
        }

        let body = archive
            .extract(index)
            .map_err(|source| OperationError::ArchiveEntry {
                name: entry.name.clone(),
                source,
            })?;
        let key = join_object_key(destination_prefix, &entry.name);
        deps.store
            .put_object(destination_bucket, &key, &body, content_type_for_key(&key))?;
        debug!(
            event = "asset_uploaded",
            bucket = destination_bucket,
            key = %key,
            bytes = body.len()
        );
        files_copied += 1;
    }

    let mut data = ResponseData::new();
    data.insert(FILES_COPIED_KEY.to_string(), Value::from(files_copied));
    Ok(data)
}
