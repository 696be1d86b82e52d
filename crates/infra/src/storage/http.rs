//! Client for the hosted storage REST API (`/storage/v1`).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, header};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::{Bucket, BucketCreation, BucketPolicy, ObjectStorage, StorageError, StorageResult, encode_path};

/// Talks to `{base_url}/storage/v1` with the project's API key.
#[derive(Debug, Clone)]
pub struct HttpObjectStorage {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpObjectStorage {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, tail: &str) -> String {
        format!("{}/storage/v1/{tail}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> StorageResult<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(rejection(response).await)
    }
}

async fn rejection(response: Response) -> StorageError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body
        .message
        .or(body.error)
        .unwrap_or_else(|| if text.is_empty() { format!("HTTP {status}") } else { text });
    StorageError::Rejected { status, message }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    #[instrument(skip(self, bytes), fields(bucket = %bucket, size = bytes.len()), err)]
    async fn put_object(&self, bucket: Bucket, path: &str, content_type: &str, bytes: Vec<u8>) -> StorageResult<()> {
        let url = self.endpoint(&format!("object/{}/{}", bucket.as_str(), encode_path(path)));
        let request = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes);
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %bucket), err)]
    async fn remove_object(&self, bucket: Bucket, path: &str) -> StorageResult<()> {
        let url = self.endpoint(&format!("object/{}", bucket.as_str()));
        let request = self.client.delete(url).json(&json!({ "prefixes": [path] }));
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self, policy), fields(bucket = %bucket), err)]
    async fn create_bucket(&self, bucket: Bucket, policy: &BucketPolicy) -> StorageResult<BucketCreation> {
        let request = self.client.post(self.endpoint("bucket")).json(&json!({
            "id": bucket.as_str(),
            "name": bucket.as_str(),
            "public": policy.public,
            "file_size_limit": policy.file_size_limit,
            "allowed_mime_types": policy.allowed_mime_types,
        }));
        match self.send(request).await {
            Ok(_) => Ok(BucketCreation::Created),
            Err(StorageError::Rejected { message, .. }) if message.contains("already exists") => {
                Ok(BucketCreation::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let storage = HttpObjectStorage::new("http://localhost:54321/", "key");
        assert_eq!(storage.endpoint("bucket"), "http://localhost:54321/storage/v1/bucket");
    }

    #[test]
    fn object_paths_are_encoded_per_segment() {
        assert_eq!(encode_path("folder/my file.pdf"), "folder/my%20file.pdf");
    }
}
