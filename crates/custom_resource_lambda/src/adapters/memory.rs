//! In-memory adapters for tests and local runs.

use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::bucket_policy::BucketPolicyStore;
use super::object_store::{ObjectStore, ObjectStoreError};
use super::response::ResponseSender;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

type ObjectId = (String, String);

#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<BTreeMap<ObjectId, StoredObject>>,
    denied: Mutex<HashSet<ObjectId>>,
    policies: Mutex<BTreeMap<String, String>>,
    policy_writes: Mutex<usize>,
    denied_policies: Mutex<HashSet<String>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_object(&self, bucket: &str, key: &str, body: &[u8]) {
        lock(&self.objects).insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.to_vec(),
                content_type: "application/octet-stream".to_string(),
            },
        );
    }

    /// Make every request for `bucket`/`key` fail with `AccessDenied`.
    pub fn deny(&self, bucket: &str, key: &str) {
        lock(&self.denied).insert((bucket.to_string(), key.to_string()));
    }

    pub fn seed_bucket_policy(&self, bucket: &str, policy: &str) {
        lock(&self.policies).insert(bucket.to_string(), policy.to_string());
    }

    /// Make policy reads and writes for `bucket` fail with `AccessDenied`.
    pub fn deny_bucket_policy(&self, bucket: &str) {
        lock(&self.denied_policies).insert(bucket.to_string());
    }

    pub fn bucket_policy(&self, bucket: &str) -> Option<String> {
        lock(&self.policies).get(bucket).cloned()
    }

    /// Number of successful `put_bucket_policy` calls.
    pub fn policy_writes(&self) -> usize {
        *lock(&self.policy_writes)
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        lock(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys currently stored in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        lock(&self.objects)
            .keys()
            .filter(|(object_bucket, _)| object_bucket == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }

    fn check_access(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError> {
        if lock(&self.denied).contains(&(bucket.to_string(), key.to_string())) {
            return Err(ObjectStoreError::new("AccessDenied", "Access Denied"));
        }
        Ok(())
    }

    fn check_policy_access(&self, bucket: &str) -> Result<(), ObjectStoreError> {
        if lock(&self.denied_policies).contains(bucket) {
            return Err(ObjectStoreError::new("AccessDenied", "Access Denied"));
        }
        Ok(())
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        self.check_access(bucket, key)?;
        self.object(bucket, key)
            .map(|object| object.body)
            .ok_or_else(|| ObjectStoreError::no_such_key(bucket, key))
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        self.check_access(bucket, key)?;
        lock(&self.objects).insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError> {
        self.check_access(bucket, key)?;
        lock(&self.objects).remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

impl BucketPolicyStore for InMemoryObjectStore {
    fn get_bucket_policy(&self, bucket: &str) -> Result<Option<String>, ObjectStoreError> {
        self.check_policy_access(bucket)?;
        Ok(self.bucket_policy(bucket))
    }

    fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), ObjectStoreError> {
        self.check_policy_access(bucket)?;
        self.seed_bucket_policy(bucket, policy);
        *lock(&self.policy_writes) += 1;
        Ok(())
    }
}

/// Records every response instead of sending it.
#[derive(Debug, Default)]
pub struct CapturingResponseSender {
    sent: Mutex<Vec<(String, Vec<u8>)>>,
    fail_with: Option<String>,
}

impl CapturingResponseSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
        lock(&self.sent).clone()
    }
}

impl ResponseSender for CapturingResponseSender {
    fn send_response(&self, response_url: &str, body: &[u8]) -> Result<(), String> {
        if let Some(message) = &self.fail_with {
            return Err(message.clone());
        }
        lock(&self.sent).push((response_url.to_string(), body.to_vec()));
        Ok(())
    }
}

/// Build a deflated zip archive holding `files` in order.
pub fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, body) in files {
        if name.ends_with('/') {
            writer.add_directory(*name, options).expect("add zip directory");
            continue;
        }
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(body).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn store_keeps_working_after_a_panic_while_locked() {
        let store = InMemoryObjectStore::new();
        store.seed_object("bucket", "before.txt", b"before");

        let outcome = thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = lock(&store.objects);
                    panic!("writer failed while holding the lock");
                })
                .join()
        });
        assert!(outcome.is_err());
        assert!(store.objects.is_poisoned());

        store.seed_object("bucket", "after.txt", b"after");
        assert_eq!(store.keys("bucket"), vec!["after.txt", "before.txt"]);
        let body = store.get_object("bucket", "before.txt").expect("object readable");
        assert_eq!(body, b"before");
    }

    #[test]
    fn bucket_policy_round_trips_and_counts_writes() {
        let store = InMemoryObjectStore::new();
        assert_eq!(store.get_bucket_policy("logs").expect("readable"), None);

        store.put_bucket_policy("logs", r#"{"Statement":[]}"#).expect("policy written");
        assert_eq!(
            store.get_bucket_policy("logs").expect("readable").as_deref(),
            Some(r#"{"Statement":[]}"#)
        );
        assert_eq!(store.policy_writes(), 1);

        store.deny_bucket_policy("logs");
        let error = store.get_bucket_policy("logs").expect_err("denied read should fail");
        assert_eq!(error.code, "AccessDenied");
    }
}
