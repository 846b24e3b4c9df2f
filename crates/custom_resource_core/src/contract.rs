use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const RESOURCE_PROPERTIES: &str = "ResourceProperties";
pub const PHYSICAL_RESOURCE_ID: &str = "PhysicalResourceId";
pub const RESOURCE: &str = "Resource";
pub const SERVICE_TOKEN: &str = "ServiceToken";

pub const SOURCE_BUCKET_NAME: &str = "SOURCE_BUCKET_NAME";
pub const SOURCE_PREFIX: &str = "SOURCE_PREFIX";
pub const LOGGING_BUCKET_NAME: &str = "LOGGING_BUCKET_NAME";
pub const DESTINATION_BUCKET_NAME: &str = "DESTINATION_BUCKET_NAME";
pub const DESTINATION_PREFIX: &str = "DESTINATION_PREFIX";

/// CloudFormation rejects response bodies over 4 KiB, so reasons are capped.
pub const MAX_REASON_LEN: usize = 1_024;

pub type ResourceProperties = Map<String, Value>;
pub type ResponseData = Map<String, Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl RequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    #[serde(default)]
    pub resource_type: String,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: ResourceProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<ResourceProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default)]
    pub no_echo: bool,
    #[serde(default)]
    pub data: ResponseData,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn parse_event(payload: Value) -> Result<CustomResourceEvent, ValidationError> {
    if !payload.is_object() {
        return Err(ValidationError::new(
            "Custom resource event must be a JSON object",
        ));
    }

    let event: CustomResourceEvent = serde_json::from_value(payload)
        .map_err(|error| ValidationError::new(format!("Malformed custom resource event: {error}")))?;

    if event.response_url.trim().is_empty() {
        return Err(ValidationError::new("ResponseURL cannot be empty"));
    }

    Ok(event)
}

impl CustomResourceEvent {
    /// Operation name carried in `ResourceProperties.Resource`.
    pub fn operation_name(&self) -> Option<&str> {
        self.property_str(RESOURCE)
    }

    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.resource_properties.get(name).and_then(Value::as_str)
    }

    /// Like [`property_str`](Self::property_str) but rejects missing and blank values.
    pub fn require_property(&self, name: &str) -> Result<&str, ValidationError> {
        match self.property_str(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            Some(_) => Err(ValidationError::new(format!(
                "Resource property '{name}' cannot be empty"
            ))),
            None => Err(ValidationError::new(format!(
                "Missing required resource property '{name}'"
            ))),
        }
    }

    pub fn resolve_physical_id(&self, fallback: &str) -> String {
        match self.physical_resource_id.as_deref() {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl CustomResourceResponse {
    pub fn success(event: &CustomResourceEvent, physical_id: &str, data: ResponseData) -> Self {
        Self {
            status: ResponseStatus::Success,
            reason: None,
            physical_resource_id: event.resolve_physical_id(physical_id),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data,
        }
    }

    pub fn failure(event: &CustomResourceEvent, physical_id: &str, reason: &str) -> Self {
        Self {
            status: ResponseStatus::Failed,
            reason: Some(truncate_reason(reason)),
            physical_resource_id: event.resolve_physical_id(physical_id),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data: ResponseData::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

fn truncate_reason(reason: &str) -> String {
    if reason.len() <= MAX_REASON_LEN {
        return reason.to_string();
    }

    let mut end = MAX_REASON_LEN;
    while !reason.is_char_boundary(end) {
        end -= 1;
    }
    reason[..end].to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_event_json() -> Value {
        json!({
            "RequestType": "Create",
            "ResponseURL": "https://cloudformation-custom-resource-response.example/abc",
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/demo/guid",
            "RequestId": "request-1",
            "ResourceType": "Custom::CopyWebUI",
            "LogicalResourceId": "CopyWebUI",
            "ResourceProperties": {
                "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:cr",
                "Resource": "COPY_WEB_UI",
                "SOURCE_BUCKET_NAME": "my-bucket",
                "SOURCE_PREFIX": "assets/ui.zip"
            }
        })
    }

    #[test]
    fn parses_cloudformation_event_shape() {
        let event = parse_event(sample_event_json()).expect("event should parse");

        assert_eq!(event.request_type, RequestType::Create);
        assert_eq!(event.operation_name(), Some("COPY_WEB_UI"));
        assert_eq!(event.property_str(SOURCE_BUCKET_NAME), Some("my-bucket"));
        assert!(event.physical_resource_id.is_none());
        assert!(event.old_resource_properties.is_none());
    }

    #[test]
    fn rejects_non_object_payload() {
        let error = parse_event(json!("hello")).expect_err("string payload should fail");
        assert_eq!(error.message(), "Custom resource event must be a JSON object");
    }

    #[test]
    fn rejects_event_without_request_type() {
        let mut payload = sample_event_json();
        payload
            .as_object_mut()
            .expect("object payload")
            .remove("RequestType");

        let error = parse_event(payload).expect_err("missing RequestType should fail");
        assert!(error.message().contains("Malformed custom resource event"));
    }

    #[test]
    fn require_property_distinguishes_missing_and_blank() {
        let mut payload = sample_event_json();
        payload[RESOURCE_PROPERTIES][DESTINATION_PREFIX] = json!("  ");
        let event = parse_event(payload).expect("event should parse");

        let blank = event
            .require_property(DESTINATION_PREFIX)
            .expect_err("blank value should fail");
        assert!(blank.message().contains("cannot be empty"));

        let missing = event
            .require_property(DESTINATION_BUCKET_NAME)
            .expect_err("missing value should fail");
        assert!(missing.message().contains("Missing required resource property"));
    }

    #[test]
    fn response_prefers_existing_physical_id() {
        let mut payload = sample_event_json();
        payload[PHYSICAL_RESOURCE_ID] = json!("existing-id");
        payload["RequestType"] = json!("Update");
        let event = parse_event(payload).expect("event should parse");

        let response = CustomResourceResponse::success(&event, "log-stream", ResponseData::new());
        assert_eq!(response.physical_resource_id, "existing-id");

        let created = parse_event(sample_event_json()).expect("event should parse");
        let response = CustomResourceResponse::success(&created, "log-stream", ResponseData::new());
        assert_eq!(response.physical_resource_id, "log-stream");
    }

    #[test]
    fn response_serializes_with_cloudformation_field_names() {
        let event = parse_event(sample_event_json()).expect("event should parse");
        let response = CustomResourceResponse::failure(&event, "log-stream", "boom");
        let value = serde_json::to_value(&response).expect("response should serialize");

        assert_eq!(value["Status"], "FAILED");
        assert_eq!(value["Reason"], "boom");
        assert_eq!(value["LogicalResourceId"], "CopyWebUI");
        assert_eq!(value["NoEcho"], false);
        assert!(value["Data"].as_object().expect("data object").is_empty());
    }

    #[test]
    fn failure_reason_is_truncated_on_char_boundary() {
        let event = parse_event(sample_event_json()).expect("event should parse");
        let reason = "é".repeat(MAX_REASON_LEN);
        let response = CustomResourceResponse::failure(&event, "log-stream", &reason);

        let truncated = response.reason.expect("reason should exist");
        assert!(truncated.len() <= MAX_REASON_LEN);
        assert!(truncated.chars().all(|ch| ch == 'é'));
    }
}
