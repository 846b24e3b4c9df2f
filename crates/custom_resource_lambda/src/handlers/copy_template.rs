use custom_resource_core::contract::{
    CustomResourceEvent, RequestType, ResourceProperties, ResponseData, DESTINATION_BUCKET_NAME,
    DESTINATION_PREFIX,
};
use custom_resource_core::object_keys::content_type_for_key;
use serde_json::Value;
use tracing::{info, warn};

use crate::adapters::object_store::ObjectStore;
use crate::handlers::dispatch::OperationDeps;
use crate::handlers::error::OperationError;
use crate::handlers::fetch_archive::StorageLocator;

pub const DESTINATION_KEY: &str = "DestinationKey";

/// Copy a single template object from the source location to
/// `DESTINATION_BUCKET_NAME`/`DESTINATION_PREFIX`. The destination copy is
/// owned by the resource: an Update that moves it removes the old copy, and
/// Delete removes the current one.
pub fn copy_template(
    event: &CustomResourceEvent,
    deps: &OperationDeps<'_>,
) -> Result<ResponseData, OperationError> {
    match event.request_type {
        RequestType::Create | RequestType::Update => {
            let source = StorageLocator::source(event)?;
            let destination = destination_locator(event)?;

            let body = deps.store.get_object(&source.bucket, &source.key)?;
            deps.store.put_object(
                &destination.bucket,
                &destination.key,
                &body,
                content_type_for_key(&destination.key),
            )?;

            if let Some(previous) = event
                .old_resource_properties
                .as_ref()
                .and_then(previous_destination)
            {
                if previous != destination {
                    delete_if_present(deps.store, &previous)?;
                }
            }

            let mut data = ResponseData::new();
            data.insert(
                DESTINATION_KEY.to_string(),
                Value::from(destination.key.clone()),
            );
            Ok(data)
        }
        RequestType::Delete => {
            match destination_locator(event) {
                Ok(destination) => delete_if_present(deps.store, &destination)?,
                Err(error) => warn!(
                    event = "template_delete_skipped",
                    reason = %error
                ),
            }
            Ok(ResponseData::new())
        }
    }
}

fn destination_locator(event: &CustomResourceEvent) -> Result<StorageLocator, OperationError> {
    Ok(StorageLocator {
        bucket: event.require_property(DESTINATION_BUCKET_NAME)?.to_string(),
        key: event.require_property(DESTINATION_PREFIX)?.to_string(),
    })
}

fn previous_destination(properties: &ResourceProperties) -> Option<StorageLocator> {
    let bucket = properties.get(DESTINATION_BUCKET_NAME)?.as_str()?;
    let key = properties.get(DESTINATION_PREFIX)?.as_str()?;
    Some(StorageLocator {
        bucket: bucket.to_string(),
        key: key.to_string(),
    })
}

fn delete_if_present(
    store: &(impl ObjectStore + ?Sized),
    location: &StorageLocator,
) -> Result<(), OperationError> {
    match store.delete_object(&location.bucket, &location.key) {
        Ok(()) => {
            info!(
                event = "template_deleted",
                bucket = %location.bucket,
                key = %location.key
            );
            Ok(())
        }
        Err(error) if error.is_not_found() => Ok(()),
        Err(error) => Err(error.into()),
    }
}
