use std::fmt;

use aws_sdk_s3::error::ProvideErrorMetadata;
use thiserror::Error;

/// Error reported by an object store, keeping the service's error code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ObjectStoreError {
    pub code: String,
    pub message: String,
}

impl ObjectStoreError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn no_such_key(bucket: &str, key: &str) -> Self {
        Self::new(
            "NoSuchKey",
            format!("The specified key does not exist: s3://{bucket}/{key}"),
        )
    }

    /// Keep the service's error code so callers can tell a missing key apart
    /// from other failures. Errors without a code report `Unknown`.
    pub fn from_service_error(error: &(impl ProvideErrorMetadata + fmt::Display)) -> Self {
        let code = error.code().unwrap_or("Unknown").to_string();
        let message = error
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        Self::new(code, message)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.code.as_str(), "NoSuchKey" | "NotFound")
    }
}

pub trait ObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError>;

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), ObjectStoreError>;

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError>;
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::get_object::GetObjectError;
    use aws_sdk_s3::types::error::NoSuchKey;

    use super::*;

    #[test]
    fn keeps_service_code_and_message() {
        let metadata = ErrorMetadata::builder()
            .code("NoSuchKey")
            .message("The specified key does not exist.")
            .build();

        let error = ObjectStoreError::from_service_error(&metadata);
        assert_eq!(error.code, "NoSuchKey");
        assert_eq!(error.message, "The specified key does not exist.");
        assert!(error.is_not_found());
    }

    #[test]
    fn missing_get_object_key_is_not_found() {
        let service_error = GetObjectError::NoSuchKey(
            NoSuchKey::builder()
                .meta(
                    ErrorMetadata::builder()
                        .code("NoSuchKey")
                        .message("The specified key does not exist.")
                        .build(),
                )
                .build(),
        );

        let error = ObjectStoreError::from_service_error(&service_error);
        assert!(error.is_not_found(), "unexpected error: {error}");
        assert_eq!(error.to_string(), "NoSuchKey: The specified key does not exist.");
    }

    #[test]
    fn access_denied_is_not_treated_as_missing() {
        let metadata = ErrorMetadata::builder()
            .code("AccessDenied")
            .message("Access Denied")
            .build();

        let error = ObjectStoreError::from_service_error(&metadata);
        assert!(!error.is_not_found());
        assert_eq!(error.to_string(), "AccessDenied: Access Denied");
    }

    #[test]
    fn missing_code_falls_back_to_unknown() {
        let metadata = ErrorMetadata::builder().build();

        let error = ObjectStoreError::from_service_error(&metadata);
        assert_eq!(error.code, "Unknown");
        assert!(!error.message.is_empty());
        assert!(!error.is_not_found());
    }
}
