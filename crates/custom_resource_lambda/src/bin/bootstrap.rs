use std::time::Duration;

use aws_sdk_s3::primitives::ByteStream;
use custom_resource_core::contract::CustomResourceResponse;
use custom_resource_lambda::adapters::bucket_policy::{BucketPolicyStore, NO_SUCH_BUCKET_POLICY};
use custom_resource_lambda::adapters::object_store::{ObjectStore, ObjectStoreError};
use custom_resource_lambda::adapters::response::ResponseSender;
use custom_resource_lambda::config::RuntimeConfig;
use custom_resource_lambda::handlers::dispatch::{handle_custom_resource_event, OperationDeps};
use custom_resource_lambda::logging::init_tracing;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct S3ObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectStore for S3ObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        let client = self.s3_client.clone();
        let bucket = bucket.to_string();
        let object_key = key.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map_err(|error| {
                        ObjectStoreError::from_service_error(&error.into_service_error())
                    })?;
                let body = output.body.collect().await.map_err(|error| {
                    ObjectStoreError::new(
                        "BodyReadError",
                        format!("failed to read object body from s3: {error}"),
                    )
                })?;
                Ok::<_, ObjectStoreError>(body.into_bytes().to_vec())
            })
        })
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let client = self.s3_client.clone();
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let content_type = content_type.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .content_type(content_type)
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        ObjectStoreError::from_service_error(&error.into_service_error())
                    })
            })
        })
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError> {
        let client = self.s3_client.clone();
        let bucket = bucket.to_string();
        let object_key = key.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .delete_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        ObjectStoreError::from_service_error(&error.into_service_error())
                    })
            })
        })
    }
}

impl BucketPolicyStore for S3ObjectStore {
    fn get_bucket_policy(&self, bucket: &str) -> Result<Option<String>, ObjectStoreError> {
        let client = self.s3_client.clone();
        let bucket = bucket.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                match client.get_bucket_policy().bucket(bucket).send().await {
                    Ok(output) => Ok(output.policy().map(str::to_string)),
                    Err(error) => {
                        let error =
                            ObjectStoreError::from_service_error(&error.into_service_error());
                        if error.code == NO_SUCH_BUCKET_POLICY {
                            Ok(None)
                        } else {
                            Err(error)
                        }
                    }
                }
            })
        })
    }

    fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), ObjectStoreError> {
        let client = self.s3_client.clone();
        let bucket = bucket.to_string();
        let policy = policy.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_bucket_policy()
                    .bucket(bucket)
                    .policy(policy)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        ObjectStoreError::from_service_error(&error.into_service_error())
                    })
            })
        })
    }
}

/// PUTs the response body to the pre-signed URL. The URL is signed without a
/// content type, so none is sent.
struct HttpResponseSender {
    client: reqwest::Client,
}

impl HttpResponseSender {
    fn new(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::from(format!("failed to build response client: {error}")))?;
        Ok(Self { client })
    }
}

impl ResponseSender for HttpResponseSender {
    fn send_response(&self, response_url: &str, body: &[u8]) -> Result<(), String> {
        let client = self.client.clone();
        let url = response_url.to_string();
        let body_bytes = body.to_vec();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .put(url)
                    .header(reqwest::header::CONTENT_TYPE, "")
                    .body(body_bytes)
                    .send()
                    .await
                    .map_err(|error| format!("failed to send response: {error}"))?;
                response
                    .error_for_status()
                    .map(|_| ())
                    .map_err(|error| format!("response endpoint rejected the response: {error}"))
            })
        })
    }
}

async fn handle_request(
    event: LambdaEvent<Value>,
    response_timeout: Duration,
) -> Result<CustomResourceResponse, Error> {
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = S3ObjectStore {
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };
    let sender = HttpResponseSender::new(response_timeout)?;
    let log_stream = event.context.env_config.log_stream.clone();

    handle_custom_resource_event(
        event.payload,
        &OperationDeps { store: &store },
        &sender,
        &log_stream,
    )
    .map_err(|error| Error::from(error.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = RuntimeConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    init_tracing(&config.log_level);

    let response_timeout = config.response_timeout;
    lambda_runtime::run(service_fn(move |event| handle_request(event, response_timeout))).await
}
