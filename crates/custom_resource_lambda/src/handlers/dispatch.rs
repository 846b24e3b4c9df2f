use std::time::Instant;

use custom_resource_core::contract::{
    parse_event, CustomResourceEvent, CustomResourceResponse, RequestType, ResponseData, RESOURCE,
};
use custom_resource_core::operations::OperationKind;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::adapters::StorageBackend;
use crate::adapters::response::ResponseSender;
use crate::handlers::copy_assets::{copy_sample_documents, copy_web_ui};
use crate::handlers::copy_template::copy_template;
use crate::handlers::error::{HandlerError, OperationError};
use crate::handlers::gen_uuid::gen_uuid;
use crate::handlers::update_bucket_policy::update_bucket_policy;

/// Collaborators an operation handler may call.
pub struct OperationDeps<'a> {
    pub store: &'a dyn StorageBackend,
}

pub type OperationHandler =
    fn(&CustomResourceEvent, &OperationDeps<'_>) -> Result<ResponseData, OperationError>;

/// Handler registered for each operation. Operations that need AWS services
/// beyond S3 have no handler in this deployment.
pub fn dispatch_table(kind: OperationKind) -> Option<OperationHandler> {
    match kind {
        OperationKind::GenUuid => Some(gen_uuid as OperationHandler),
        OperationKind::CopyWebUi => Some(copy_web_ui as OperationHandler),
        OperationKind::CopySampleDocuments => Some(copy_sample_documents as OperationHandler),
        OperationKind::CopyTemplate => Some(copy_template as OperationHandler),
        OperationKind::UpdateBucketPolicy => Some(update_bucket_policy as OperationHandler),
        OperationKind::CwLogRetention
        | OperationKind::AnonymousMetric
        | OperationKind::CopyModelInfo
        | OperationKind::Webconfig
        | OperationKind::UseCasePolicy
        | OperationKind::AdminPolicy
        | OperationKind::DeleteResourceAssociations
        | OperationKind::GetCompatibleAzs
        | OperationKind::GenDomainPrefix
        | OperationKind::GetModelResourceArns => None,
    }
}

/// Run the operation named by the event and build the response to report.
///
/// Operation failures become `FAILED` responses rather than errors. A Delete
/// whose operation is unknown or unsupported still reports `SUCCESS` so stack
/// teardown is never blocked on this function.
pub fn run_operation(
    event: &CustomResourceEvent,
    deps: &OperationDeps<'_>,
    fallback_physical_id: &str,
) -> CustomResourceResponse {
    let started_at = Instant::now();
    let is_delete = event.request_type == RequestType::Delete;

    let kind = match resolve_operation(event) {
        Ok(kind) => kind,
        Err(reason) => {
            if is_delete {
                warn!(
                    event = "operation_skipped",
                    request_id = %event.request_id,
                    reason = %reason
                );
                return CustomResourceResponse::success(
                    event,
                    fallback_physical_id,
                    ResponseData::new(),
                );
            }
            error!(
                event = "operation_rejected",
                request_id = %event.request_id,
                reason = %reason
            );
            return CustomResourceResponse::failure(event, fallback_physical_id, &reason);
        }
    };

    info!(
        event = "operation_started",
        operation = kind.as_str(),
        request_type = event.request_type.as_str(),
        request_id = %event.request_id,
        logical_resource_id = %event.logical_resource_id
    );

    let result = match dispatch_table(kind) {
        Some(handler) => handler(event, deps),
        None => Err(OperationError::Unsupported(kind)),
    };

    let duration_ms = started_at.elapsed().as_millis() as u64;
    match result {
        Ok(data) => {
            info!(
                event = "operation_completed",
                operation = kind.as_str(),
                request_id = %event.request_id,
                duration_ms
            );
            CustomResourceResponse::success(event, fallback_physical_id, data)
        }
        Err(OperationError::Unsupported(_)) if is_delete => {
            warn!(
                event = "operation_skipped",
                operation = kind.as_str(),
                request_id = %event.request_id,
                reason = "unsupported operation"
            );
            CustomResourceResponse::success(event, fallback_physical_id, ResponseData::new())
        }
        Err(operation_error) => {
            error!(
                event = "operation_failed",
                operation = kind.as_str(),
                request_id = %event.request_id,
                duration_ms,
                error = %operation_error
            );
            CustomResourceResponse::failure(
                event,
                fallback_physical_id,
                &operation_error.to_string(),
            )
        }
    }
}

fn resolve_operation(event: &CustomResourceEvent) -> Result<OperationKind, String> {
    let Some(name) = event.operation_name() else {
        return Err(format!("Missing required resource property '{RESOURCE}'"));
    };
    name.parse::<OperationKind>()
        .map_err(|error| error.to_string())
}

/// Full Lambda flow: parse the raw event, run the operation, and deliver the
/// response to the event's `ResponseURL`.
///
/// Errors are returned only when CloudFormation cannot be told the outcome:
/// an unparseable event or a failed delivery.
pub fn handle_custom_resource_event(
    payload: Value,
    deps: &OperationDeps<'_>,
    sender: &dyn ResponseSender,
    fallback_physical_id: &str,
) -> Result<CustomResourceResponse, HandlerError> {
    let event = parse_event(payload)?;
    let response = run_operation(&event, deps, fallback_physical_id);

    let body = serde_json::to_vec(&response)?;
    sender
        .send_response(&event.response_url, &body)
        .map_err(HandlerError::Delivery)?;

    let status = if response.is_success() {
        "SUCCESS"
    } else {
        "FAILED"
    };
    info!(
        event = "response_sent",
        request_id = %event.request_id,
        status
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::adapters::memory::{CapturingResponseSender, InMemoryObjectStore};
    use crate::handlers::gen_uuid::UUID_KEY;
    use custom_resource_core::contract::ResponseStatus;

    use super::*;

    fn payload(request_type: &str, resource: Option<&str>) -> Value {
        let mut properties = json!({
            "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:cr"
        });
        if let Some(resource) = resource {
            properties["Resource"] = json!(resource);
        }
        json!({
            "RequestType": request_type,
            "ResponseURL": "https://cloudformation.example/response?sig=abc",
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/demo/guid",
            "RequestId": "request-1",
            "ResourceType": "Custom::Operation",
            "LogicalResourceId": "Operation",
            "ResourceProperties": properties
        })
    }

    #[test]
    fn every_implemented_operation_has_a_handler() {
        for kind in [
            OperationKind::GenUuid,
            OperationKind::CopyWebUi,
            OperationKind::CopySampleDocuments,
            OperationKind::CopyTemplate,
            OperationKind::UpdateBucketPolicy,
        ] {
            assert!(dispatch_table(kind).is_some(), "{kind} should be dispatched");
        }
        assert!(dispatch_table(OperationKind::CwLogRetention).is_none());
    }

    #[test]
    fn dispatches_gen_uuid_and_reports_success() {
        let store = InMemoryObjectStore::new();
        let event = parse_event(payload("Create", Some("GEN_UUID"))).expect("event parses");

        let response = run_operation(&event, &OperationDeps { store: &store }, "log-stream");

        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.physical_resource_id, "log-stream");
        assert!(response.data.contains_key(UUID_KEY));
    }

    #[test]
    fn unknown_operation_fails_create() {
        let store = InMemoryObjectStore::new();
        let event = parse_event(payload("Create", Some("LAUNCH_ROCKET"))).expect("event parses");

        let response = run_operation(&event, &OperationDeps { store: &store }, "log-stream");

        assert_eq!(response.status, ResponseStatus::Failed);
        assert_eq!(
            response.reason.as_deref(),
            Some("unknown operation 'LAUNCH_ROCKET'")
        );
    }

    #[test]
    fn missing_resource_property_fails_update() {
        let store = InMemoryObjectStore::new();
        let event = parse_event(payload("Update", None)).expect("event parses");

        let response = run_operation(&event, &OperationDeps { store: &store }, "log-stream");

        assert_eq!(response.status, ResponseStatus::Failed);
        assert!(response
            .reason
            .expect("reason")
            .contains("Missing required resource property 'Resource'"));
    }

    #[test]
    fn unsupported_operation_fails_create_but_not_delete() {
        let store = InMemoryObjectStore::new();
        let deps = OperationDeps { store: &store };

        let create = parse_event(payload("Create", Some("CW_LOG_RETENTION"))).expect("parses");
        let response = run_operation(&create, &deps, "log-stream");
        assert_eq!(response.status, ResponseStatus::Failed);
        assert_eq!(
            response.reason.as_deref(),
            Some("operation CW_LOG_RETENTION is not supported by this deployment")
        );

        let delete = parse_event(payload("Delete", Some("CW_LOG_RETENTION"))).expect("parses");
        let response = run_operation(&delete, &deps, "log-stream");
        assert_eq!(response.status, ResponseStatus::Success);
    }

    #[test]
    fn unknown_operation_does_not_block_delete() {
        let store = InMemoryObjectStore::new();
        let event = parse_event(payload("Delete", Some("LAUNCH_ROCKET"))).expect("event parses");

        let response = run_operation(&event, &OperationDeps { store: &store }, "log-stream");
        assert!(response.is_success());
    }

    #[test]
    fn handler_failure_becomes_failed_response_with_reason() {
        let store = InMemoryObjectStore::new();
        let mut raw = payload("Create", Some("COPY_WEB_UI"));
        raw["ResourceProperties"]["SOURCE_BUCKET_NAME"] = json!("my-bucket");
        raw["ResourceProperties"]["SOURCE_PREFIX"] = json!("does_not_exist.zip");
        raw["ResourceProperties"]["DESTINATION_BUCKET_NAME"] = json!("web-bucket");
        let event = parse_event(raw).expect("event parses");

        let response = run_operation(&event, &OperationDeps { store: &store }, "log-stream");

        assert_eq!(response.status, ResponseStatus::Failed);
        assert!(response.reason.expect("reason").starts_with("NoSuchKey:"));
    }

    #[test]
    fn delivers_serialized_response_to_response_url() {
        let store = InMemoryObjectStore::new();
        let sender = CapturingResponseSender::new();

        let response = handle_custom_resource_event(
            payload("Create", Some("GEN_UUID")),
            &OperationDeps { store: &store },
            &sender,
            "log-stream",
        )
        .expect("handler should succeed");

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "https://cloudformation.example/response?sig=abc");

        let delivered: CustomResourceResponse =
            serde_json::from_slice(&sent[0].1).expect("delivered body parses");
        assert_eq!(delivered, response);
    }

    #[test]
    fn invalid_event_is_not_delivered() {
        let store = InMemoryObjectStore::new();
        let sender = CapturingResponseSender::new();

        let error = handle_custom_resource_event(
            json!({"RequestType": "Create"}),
            &OperationDeps { store: &store },
            &sender,
            "log-stream",
        )
        .expect_err("invalid event should fail");

        assert!(matches!(error, HandlerError::InvalidEvent(_)));
        assert!(sender.sent().is_empty());
    }

    #[test]
    fn delivery_failure_is_reported() {
        let store = InMemoryObjectStore::new();
        let sender = CapturingResponseSender::failing("connection reset");

        let error = handle_custom_resource_event(
            payload("Create", Some("GEN_UUID")),
            &OperationDeps { store: &store },
            &sender,
            "log-stream",
        )
        .expect_err("delivery failure should surface");

        assert_eq!(
            error.to_string(),
            "failed to deliver custom resource response: connection reset"
        );
    }
}
