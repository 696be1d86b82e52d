use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Bucket, BucketCreation, BucketPolicy, ObjectStorage, StorageError, StorageResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// In-memory object storage for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryObjectStorage {
    objects: RwLock<HashMap<(Bucket, String), StoredObject>>,
    buckets: RwLock<BTreeMap<Bucket, BucketPolicy>>,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: Bucket, path: &str) -> Option<StoredObject> {
        let objects = self.objects.read().ok()?;
        objects.get(&(bucket, path.to_string())).cloned()
    }

    pub fn contains(&self, bucket: Bucket, path: &str) -> bool {
        self.get(bucket, path).is_some()
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn bucket_policy(&self, bucket: Bucket) -> Option<BucketPolicy> {
        self.buckets.read().ok()?.get(&bucket).cloned()
    }
}

fn poisoned() -> StorageError {
    StorageError::Transport("lock poisoned".to_string())
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn put_object(&self, bucket: Bucket, path: &str, content_type: &str, bytes: Vec<u8>) -> StorageResult<()> {
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        let key = (bucket, path.to_string());
        if objects.contains_key(&key) {
            return Err(StorageError::Rejected {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        objects.insert(
            key,
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(())
    }

    /// Removing a missing object succeeds, as the hosted API does.
    async fn remove_object(&self, bucket: Bucket, path: &str) -> StorageResult<()> {
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        objects.remove(&(bucket, path.to_string()));
        Ok(())
    }

    async fn create_bucket(&self, bucket: Bucket, policy: &BucketPolicy) -> StorageResult<BucketCreation> {
        let mut buckets = self.buckets.write().map_err(|_| poisoned())?;
        if buckets.contains_key(&bucket) {
            return Ok(BucketCreation::AlreadyExists);
        }
        buckets.insert(bucket, policy.clone());
        Ok(BucketCreation::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn existing_path_is_not_overwritten() {
        let storage = InMemoryObjectStorage::new();
        storage
            .put_object(Bucket::ProductImages, "a.png", "image/png", vec![1])
            .await
            .unwrap();

        let err = storage
            .put_object(Bucket::ProductImages, "a.png", "image/png", vec![2])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Rejected { status: 409, .. }));
        assert_eq!(storage.get(Bucket::ProductImages, "a.png").unwrap().bytes, vec![1]);
    }

    #[tokio::test]
    async fn same_path_in_different_buckets_is_independent() {
        let storage = InMemoryObjectStorage::new();
        storage.put_object(Bucket::ProductImages, "x", "a/b", vec![]).await.unwrap();
        storage.put_object(Bucket::ProductCharts, "x", "a/b", vec![]).await.unwrap();
        storage.remove_object(Bucket::ProductImages, "x").await.unwrap();

        assert!(!storage.contains(Bucket::ProductImages, "x"));
        assert!(storage.contains(Bucket::ProductCharts, "x"));
    }
}
