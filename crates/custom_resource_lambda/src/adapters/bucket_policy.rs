use crate::adapters::object_store::ObjectStoreError;

/// Error code S3 reports for a bucket that has no policy attached.
pub const NO_SUCH_BUCKET_POLICY: &str = "NoSuchBucketPolicy";

pub trait BucketPolicyStore {
    /// The bucket's policy document, or `None` when no policy is attached.
    fn get_bucket_policy(&self, bucket: &str) -> Result<Option<String>, ObjectStoreError>;

    fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), ObjectStoreError>;
}
