pub mod bucket_policy;
pub mod object_store;
pub mod response;

#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;

use bucket_policy::BucketPolicyStore;
use object_store::ObjectStore;

/// Storage capabilities handed to operation handlers.
pub trait StorageBackend: ObjectStore + BucketPolicyStore {}

impl<T: ObjectStore + BucketPolicyStore + ?Sized> StorageBackend for T {}
