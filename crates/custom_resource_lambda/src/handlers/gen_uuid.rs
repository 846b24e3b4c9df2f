use custom_resource_core::contract::{CustomResourceEvent, RequestType, ResponseData};
use serde_json::Value;
use uuid::Uuid;

use crate::handlers::dispatch::OperationDeps;
use crate::handlers::error::OperationError;

pub const UUID_KEY: &str = "UUID";

/// Create and Update answer with a fresh v4 UUID in `Data.UUID`; Delete has
/// nothing to clean up.
pub fn gen_uuid(
    event: &CustomResourceEvent,
    _deps: &OperationDeps<'_>,
) -> Result<ResponseData, OperationError> {
    let mut data = ResponseData::new();
    if event.request_type != RequestType::Delete {
        data.insert(UUID_KEY.to_string(), Value::from(Uuid::new_v4().to_string()));
    }
    Ok(data)
}
