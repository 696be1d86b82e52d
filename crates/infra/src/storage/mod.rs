//! Object storage for product and category attachments.
//!
//! Files live in public buckets; records only keep the public URL. Nothing
//! here tracks which URLs are still referenced, so replacing or deleting a
//! product never removes its files.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

pub mod http;
pub mod in_memory;

pub use http::HttpObjectStorage;
pub use in_memory::InMemoryObjectStorage;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("invalid storage URL: {0}")]
    InvalidUrl(String),
    #[error("storage rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("storage transport error: {0}")]
    Transport(String),
    #[error("{0}")]
    Validation(String),
}

const PUBLIC_PREFIX: &str = "/storage/v1/object/public/";

/// Characters escaped inside one path segment of a public URL.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'^')
    .add(b'|')
    .add(b'[')
    .add(b']');

pub const DEFAULT_MAX_UPLOAD_MB: u64 = 50;
/// Largest accepted upload limit, in megabytes.
pub const MAX_UPLOAD_MB_LIMIT: u64 = 1024;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi", "mkv"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    ProductImages,
    ProductVideos,
    ProductDocuments,
    ProductSchematics,
    ProductDimensions,
    ProductCharts,
    ProductModels,
    ProductCatalogues,
    CategoryCatalogues,
}

impl Bucket {
    pub const ALL: [Bucket; 9] = [
        Bucket::ProductImages,
        Bucket::ProductVideos,
        Bucket::ProductDocuments,
        Bucket::ProductSchematics,
        Bucket::ProductDimensions,
        Bucket::ProductCharts,
        Bucket::ProductModels,
        Bucket::ProductCatalogues,
        Bucket::CategoryCatalogues,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::ProductImages => "product-images",
            Bucket::ProductVideos => "product-videos",
            Bucket::ProductDocuments => "product-documents",
            Bucket::ProductSchematics => "product-schematics",
            Bucket::ProductDimensions => "product-dimensions",
            Bucket::ProductCharts => "product-charts",
            Bucket::ProductModels => "product-models",
            Bucket::ProductCatalogues => "product-catalogues",
            Bucket::CategoryCatalogues => "category-catalogues",
        }
    }

    /// Extensions accepted on upload; empty means anything goes.
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            Bucket::ProductImages => IMAGE_EXTENSIONS,
            Bucket::ProductVideos => VIDEO_EXTENSIONS,
            Bucket::ProductDocuments | Bucket::ProductCatalogues | Bucket::CategoryCatalogues => {
                DOCUMENT_EXTENSIONS
            }
            _ => &[],
        }
    }
}

impl core::fmt::Display for Bucket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bucket::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| StorageError::Validation(format!("unknown bucket \"{s}\"")))
    }
}

/// Settings every bucket is created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketPolicy {
    pub public: bool,
    pub file_size_limit: u64,
    pub allowed_mime_types: Vec<String>,
}

impl BucketPolicy {
    pub fn for_max_upload_mb(max_mb: u64) -> Self {
        Self {
            public: true,
            file_size_limit: mb_to_bytes(max_mb),
            allowed_mime_types: [
                "image/*",
                "video/*",
                "application/pdf",
                "application/msword",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

impl Default for BucketPolicy {
    fn default() -> Self {
        Self::for_max_upload_mb(DEFAULT_MAX_UPLOAD_MB)
    }
}

fn mb_to_bytes(mb: u64) -> u64 {
    mb.saturating_mul(1024 * 1024)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketCreation {
    Created,
    AlreadyExists,
}

/// Raw object backend keyed by bucket and bucket-relative path.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store a new object; an existing path is rejected, never overwritten.
    async fn put_object(&self, bucket: Bucket, path: &str, content_type: &str, bytes: Vec<u8>) -> StorageResult<()>;
    async fn remove_object(&self, bucket: Bucket, path: &str) -> StorageResult<()>;
    async fn create_bucket(&self, bucket: Bucket, policy: &BucketPolicy) -> StorageResult<BucketCreation>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Document,
}

/// Classify a file name or URL by its extension.
pub fn file_kind(name: &str) -> FileKind {
    let ext = extension(name.rsplit('/').next().unwrap_or(name)).unwrap_or_default();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Image
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Video
    } else {
        FileKind::Document
    }
}

/// Check size and extension before anything is sent to storage.
pub fn validate_upload(name: &str, size_bytes: u64, allowed_extensions: &[&str], max_mb: u64) -> StorageResult<()> {
    if size_bytes > mb_to_bytes(max_mb) {
        return Err(StorageError::Validation(format!("File size must be less than {max_mb}MB")));
    }
    if !allowed_extensions.is_empty() {
        let ext = extension(name).unwrap_or_default();
        if !allowed_extensions.contains(&ext.as_str()) {
            return Err(StorageError::Validation(format!(
                "File type must be one of: {}",
                allowed_extensions.join(", ")
            )));
        }
    }
    Ok(())
}

/// Lowercased extension, if the name has one.
fn extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext: String = ext.chars().filter(char::is_ascii_alphanumeric).collect();
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// `<unix-millis>-<random>.<ext>` for an uploaded file.
pub fn generate_object_name(original_name: &str) -> String {
    let stem = format!("{}-{}", Utc::now().timestamp_millis(), Uuid::new_v4().simple());
    match extension(original_name) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

/// `{base}/storage/v1/object/public/{bucket}/{path}` with each path segment
/// percent-encoded.
pub fn public_url(base_url: &str, bucket: Bucket, path: &str) -> String {
    format!(
        "{}{PUBLIC_PREFIX}{}/{}",
        base_url.trim_end_matches('/'),
        bucket.as_str(),
        encode_path(path)
    )
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Recover the bucket-relative object path from a public URL.
pub fn object_path_from_url(url: &str, bucket: Bucket) -> StorageResult<String> {
    let raw = match reqwest::Url::parse(url) {
        Ok(parsed) => match parsed.path().find(PUBLIC_PREFIX) {
            Some(index) => parsed.path()[index + PUBLIC_PREFIX.len()..].to_string(),
            None => split_after_prefix(url),
        },
        Err(_) => split_after_prefix(url),
    };

    let decoded = percent_decode_str(&raw)
        .decode_utf8()
        .map_err(|_| StorageError::InvalidUrl(url.to_string()))?
        .into_owned();
    let path = decoded
        .strip_prefix(&format!("{}/", bucket.as_str()))
        .map(str::to_string)
        .unwrap_or(decoded);

    if path.is_empty() {
        return Err(StorageError::InvalidUrl(url.to_string()));
    }
    Ok(path)
}

fn split_after_prefix(url: &str) -> String {
    url.split(PUBLIC_PREFIX).nth(1).unwrap_or_default().to_string()
}

/// Upload/delete front end over an [`ObjectStorage`] backend.
#[derive(Clone)]
pub struct StorageService {
    backend: Arc<dyn ObjectStorage>,
    public_base_url: String,
    max_upload_mb: u64,
}

impl StorageService {
    pub fn new(backend: Arc<dyn ObjectStorage>, public_base_url: impl Into<String>, max_upload_mb: u64) -> Self {
        Self {
            backend,
            public_base_url: public_base_url.into(),
            max_upload_mb,
        }
    }

    pub fn max_upload_mb(&self) -> u64 {
        self.max_upload_mb
    }

    /// Store `bytes` and return the public URL. `object_name` overrides the
    /// generated name.
    #[instrument(skip(self, bytes), fields(bucket = %bucket, size = bytes.len()), err)]
    pub async fn upload(
        &self,
        bucket: Bucket,
        original_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
        object_name: Option<&str>,
    ) -> StorageResult<String> {
        validate_upload(
            original_name,
            bytes.len() as u64,
            bucket.allowed_extensions(),
            self.max_upload_mb,
        )?;

        let path = match object_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.trim_start_matches('/').to_string(),
            None => generate_object_name(original_name),
        };
        self.backend.put_object(bucket, &path, content_type, bytes).await?;

        let url = public_url(&self.public_base_url, bucket, &path);
        tracing::info!(%url, "object uploaded");
        Ok(url)
    }

    #[instrument(skip(self), fields(bucket = %bucket), err)]
    pub async fn delete(&self, bucket: Bucket, url: &str) -> StorageResult<()> {
        let path = object_path_from_url(url, bucket)?;
        self.backend.remove_object(bucket, &path).await?;
        tracing::info!(%path, "object deleted");
        Ok(())
    }

    /// Create every bucket; existing ones are left alone. Failures are logged
    /// per bucket and the first one is returned after all were attempted.
    pub async fn ensure_buckets(&self) -> StorageResult<()> {
        let policy = BucketPolicy::for_max_upload_mb(self.max_upload_mb);
        let mut first_error = None;
        for bucket in Bucket::ALL {
            match self.backend.create_bucket(bucket, &policy).await {
                Ok(BucketCreation::Created) => tracing::info!(%bucket, "bucket created"),
                Ok(BucketCreation::AlreadyExists) => tracing::debug!(%bucket, "bucket already exists"),
                Err(e) => {
                    tracing::error!(%bucket, error = %e, "failed to create bucket");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://abc.supabase.co";

    #[test]
    fn bucket_names_round_trip() {
        for bucket in Bucket::ALL {
            assert_eq!(bucket.as_str().parse::<Bucket>().unwrap(), bucket);
        }
        assert!("avatars".parse::<Bucket>().is_err());
    }

    #[test]
    fn public_url_encodes_segments() {
        let url = public_url("https://abc.supabase.co/", Bucket::ProductImages, "spec sheets/pump #1.png");
        assert_eq!(
            url,
            "https://abc.supabase.co/storage/v1/object/public/product-images/spec%20sheets/pump%20%231.png"
        );
    }

    #[test]
    fn path_is_recovered_from_public_url() {
        let url = public_url(BASE, Bucket::ProductDocuments, "manuals/pump manual.pdf");
        assert_eq!(
            object_path_from_url(&url, Bucket::ProductDocuments).unwrap(),
            "manuals/pump manual.pdf"
        );
    }

    #[test]
    fn path_from_other_bucket_keeps_bucket_segment() {
        let url = public_url(BASE, Bucket::ProductImages, "a.png");
        assert_eq!(
            object_path_from_url(&url, Bucket::ProductVideos).unwrap(),
            "product-images/a.png"
        );
    }

    #[test]
    fn unparseable_url_falls_back_to_string_split() {
        let url = "not a url/storage/v1/object/public/product-charts/flow%20curve.png";
        assert_eq!(object_path_from_url(url, Bucket::ProductCharts).unwrap(), "flow curve.png");
    }

    #[test]
    fn url_without_prefix_is_invalid() {
        let err = object_path_from_url("https://cdn.example.com/a.png", Bucket::ProductImages).unwrap_err();
        assert!(matches!(err, StorageError::InvalidUrl(_)));
        assert!(object_path_from_url(&format!("{BASE}{PUBLIC_PREFIX}"), Bucket::ProductImages).is_err());
    }

    #[test]
    fn file_kind_by_extension() {
        assert_eq!(file_kind("photo.JPG"), FileKind::Image);
        assert_eq!(file_kind("https://x/y/demo.mp4"), FileKind::Video);
        assert_eq!(file_kind("manual.pdf"), FileKind::Document);
        assert_eq!(file_kind("README"), FileKind::Document);
    }

    #[test]
    fn validation_checks_size_then_type() {
        let err = validate_upload("a.png", 51 * 1024 * 1024, IMAGE_EXTENSIONS, 50).unwrap_err();
        assert_eq!(err, StorageError::Validation("File size must be less than 50MB".into()));

        let err = validate_upload("a.exe", 10, IMAGE_EXTENSIONS, 50).unwrap_err();
        assert!(err.to_string().starts_with("File type must be one of: jpg, jpeg"));

        assert!(validate_upload("anything.bin", 10, &[], 50).is_ok());
    }

    #[test]
    fn huge_limits_saturate_instead_of_overflowing() {
        assert!(validate_upload("a.png", u64::MAX, IMAGE_EXTENSIONS, u64::MAX).is_ok());
        assert!(validate_upload("a.png", 1 << 40, IMAGE_EXTENSIONS, 17_592_186_044_417).is_ok());
        assert_eq!(BucketPolicy::for_max_upload_mb(u64::MAX).file_size_limit, u64::MAX);
    }

    #[test]
    fn generated_names_keep_extension_and_differ() {
        let a = generate_object_name("Pump Photo.PNG");
        let b = generate_object_name("Pump Photo.PNG");
        assert!(a.ends_with(".png"));
        assert_ne!(a, b);
        assert!(!generate_object_name("noext").contains('.'));
    }

    #[tokio::test]
    async fn upload_then_delete_through_service() {
        let backend = Arc::new(InMemoryObjectStorage::new());
        let storage = StorageService::new(backend.clone(), BASE, 50);

        let url = storage
            .upload(Bucket::ProductImages, "pump.png", "image/png", vec![1, 2, 3], Some("pumps/main.png"))
            .await
            .unwrap();
        assert_eq!(url, format!("{BASE}{PUBLIC_PREFIX}product-images/pumps/main.png"));
        assert!(backend.contains(Bucket::ProductImages, "pumps/main.png"));

        storage.delete(Bucket::ProductImages, &url).await.unwrap();
        assert!(!backend.contains(Bucket::ProductImages, "pumps/main.png"));
    }

    #[tokio::test]
    async fn upload_rejects_wrong_type_before_storing() {
        let backend = Arc::new(InMemoryObjectStorage::new());
        let storage = StorageService::new(backend.clone(), BASE, 50);

        let err = storage
            .upload(Bucket::ProductVideos, "clip.png", "image/png", vec![0], None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
        assert_eq!(backend.object_count(), 0);
    }

    #[tokio::test]
    async fn ensure_buckets_is_repeatable() {
        let backend = Arc::new(InMemoryObjectStorage::new());
        let storage = StorageService::new(backend.clone(), BASE, 50);

        storage.ensure_buckets().await.unwrap();
        storage.ensure_buckets().await.unwrap();
        assert_eq!(backend.bucket_count(), Bucket::ALL.len());
    }

    #[tokio::test]
    async fn buckets_use_the_configured_upload_limit() {
        let backend = Arc::new(InMemoryObjectStorage::new());
        let storage = StorageService::new(backend.clone(), BASE, 10);

        storage.ensure_buckets().await.unwrap();
        for bucket in Bucket::ALL {
            let policy = backend.bucket_policy(bucket).unwrap();
            assert_eq!(policy.file_size_limit, 10 * 1024 * 1024);
        }
    }
}
