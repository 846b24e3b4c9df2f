use custom_resource_core::contract::{
    CustomResourceEvent, RequestType, ResponseData, LOGGING_BUCKET_NAME, SOURCE_BUCKET_NAME,
};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::handlers::dispatch::OperationDeps;
use crate::handlers::error::OperationError;

pub const STATEMENT_ID_KEY: &str = "StatementId";

const POLICY_VERSION: &str = "2012-10-17";
const LOGGING_SERVICE_PRINCIPAL: &str = "logging.s3.amazonaws.com";

/// Allow S3 server access logging from `SOURCE_BUCKET_NAME` to write into
/// `LOGGING_BUCKET_NAME`. The statement is merged into the logging bucket's
/// existing policy, keyed by its `Sid`, so statements owned by others stay
/// untouched and repeated requests do not rewrite the policy. Delete leaves
/// the grant in place; the logging bucket outlives the source.
pub fn update_bucket_policy(
    event: &CustomResourceEvent,
    deps: &OperationDeps<'_>,
) -> Result<ResponseData, OperationError> {
    if event.request_type == RequestType::Delete {
        return Ok(ResponseData::new());
    }

    let logging_bucket = event.require_property(LOGGING_BUCKET_NAME)?;
    let source_bucket = event.require_property(SOURCE_BUCKET_NAME)?;
    let statement = access_log_statement(
        partition_of(&event.stack_id),
        logging_bucket,
        source_bucket,
    );
    let statement_id = statement_id_for(source_bucket);

    let current = deps.store.get_bucket_policy(logging_bucket)?;
    let policy_error = |reason: String| OperationError::BucketPolicy {
        bucket: logging_bucket.to_string(),
        reason,
    };

    match merge_statement(current.as_deref(), statement).map_err(policy_error)? {
        Some(policy) => {
            let document = serde_json::to_string(&policy)
                .map_err(|error| policy_error(error.to_string()))?;
            deps.store.put_bucket_policy(logging_bucket, &document)?;
            info!(
                event = "bucket_policy_updated",
                bucket = logging_bucket,
                statement_id = %statement_id
            );
        }
        None => info!(
            event = "bucket_policy_unchanged",
            bucket = logging_bucket,
            statement_id = %statement_id
        ),
    }

    let mut data = ResponseData::new();
    data.insert(STATEMENT_ID_KEY.to_string(), Value::from(statement_id));
    Ok(data)
}

/// `aws`, `aws-cn` or `aws-us-gov`, read from the stack ARN.
fn partition_of(stack_id: &str) -> &str {
    match stack_id.split(':').nth(1) {
        Some(partition) if stack_id.starts_with("arn:") && !partition.is_empty() => partition,
        _ => "aws",
    }
}

fn statement_id_for(source_bucket: &str) -> String {
    let suffix: String = source_bucket.chars().filter(char::is_ascii_alphanumeric).collect();
    format!("S3ServerAccessLogs{suffix}")
}

fn access_log_statement(partition: &str, logging_bucket: &str, source_bucket: &str) -> Value {
    json!({
        "Sid": statement_id_for(source_bucket),
        "Effect": "Allow",
        "Principal": { "Service": LOGGING_SERVICE_PRINCIPAL },
        "Action": "s3:PutObject",
        "Resource": format!("arn:{partition}:s3:::{logging_bucket}/*"),
        "Condition": {
            "ArnLike": { "aws:SourceArn": format!("arn:{partition}:s3:::{source_bucket}") }
        }
    })
}

/// Returns the policy to write, or `None` when `current` already holds an
/// identical statement.
fn merge_statement(current: Option<&str>, statement: Value) -> Result<Option<Value>, String> {
    let mut policy = match current {
        Some(document) if !document.trim().is_empty() => {
            serde_json::from_str::<Value>(document)
                .map_err(|error| format!("policy is not valid JSON: {error}"))?
        }
        _ => json!({ "Version": POLICY_VERSION }),
    };
    let document = policy
        .as_object_mut()
        .ok_or_else(|| "policy is not a JSON object".to_string())?;

    let mut statements = match document.remove("Statement") {
        None => Vec::new(),
        Some(Value::Array(statements)) => statements,
        Some(single @ Value::Object(_)) => vec![single],
        Some(_) => return Err("policy Statement must be an object or an array".to_string()),
    };

    let sid = statement.get("Sid").cloned();
    match statements.iter().position(|existing| existing.get("Sid") == sid.as_ref()) {
        Some(index) if statements[index] == statement => return Ok(None),
        Some(index) => statements[index] = statement,
        None => statements.push(statement),
    }

    ensure_version(document);
    document.insert("Statement".to_string(), Value::Array(statements));
    Ok(Some(policy))
}

fn ensure_version(document: &mut Map<String, Value>) {
    document.entry("Version").or_insert_with(|| Value::from(POLICY_VERSION));
}
