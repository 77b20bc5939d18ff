//! Upload service - file storage through `object_store`.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use object_store::{
    path::Path, Attribute, AttributeValue, Attributes, ObjectStore, PutOptions, PutPayload,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::guard::owner_or_elevated;
use crate::config::{
    StorageConfig, ALLOWED_FILE_TYPES, ERROR_FILE_NOT_FOUND, ERROR_UNAUTHORIZED_FILE_ACCESS,
    KEY_NONCE_LEN, MAX_FILE_SIZE, UPLOAD_KEY_PREFIX,
};
use crate::domain::Account;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// An incoming file
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Stored file description returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "https://default-bucket.s3.us-east-1.amazonaws.com/uploads/550e8400-e29b-41d4-a716-446655440000/20240101_120000_photo.png")]
    pub file_url: String,
    #[schema(example = "uploads/550e8400-e29b-41d4-a716-446655440000/20240101_120000_photo.png")]
    pub file_key: String,
    #[schema(example = "default-bucket")]
    pub bucket_name: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A downloaded file
#[derive(Debug, Clone)]
pub struct Download {
    pub content_type: String,
    pub bytes: Bytes,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UploadService: Send + Sync {
    async fn upload(&self, owner: Account, file: UploadFile) -> AppResult<UploadResponse>;

    async fn download(&self, key: String) -> AppResult<Download>;

    async fn delete(&self, actor: Account, key: String) -> AppResult<()>;
}

pub struct ObjectUploads {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl ObjectUploads {
    pub fn new(store: Arc<dyn ObjectStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            endpoint_url: config
                .endpoint_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    fn file_url(&self, key: &str) -> String {
        match &self.endpoint_url {
            Some(endpoint) => format!("{}/{}/{}", endpoint, self.bucket, key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }

    async fn put(&self, path: &Path, file: UploadFile) -> AppResult<()> {
        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(file.content_type),
        );
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        match self
            .store
            .put_opts(path, PutPayload::from(file.bytes.clone()), opts)
            .await
        {
            Ok(_) => Ok(()),
            // Backends without attribute support (local filesystem)
            Err(object_store::Error::NotImplemented { .. }) => {
                self.store.put(path, PutPayload::from(file.bytes)).await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub fn validate_file_type(content_type: &str) -> AppResult<()> {
    if ALLOWED_FILE_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(AppError::bad_request(format!(
            "File type {} not allowed. Allowed types: {}",
            content_type,
            ALLOWED_FILE_TYPES.join(", ")
        )))
    }
}

pub fn validate_file_size(size: usize) -> AppResult<()> {
    if size > MAX_FILE_SIZE {
        Err(AppError::bad_request(format!(
            "File size {} exceeds maximum allowed size of {} bytes",
            size, MAX_FILE_SIZE
        )))
    } else {
        Ok(())
    }
}

/// Keep the final path segment and replace anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('.');

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// `uploads/{owner_id}/{YYYYmmdd_HHMMSS}_{nonce}_{filename}`
///
/// The nonce is eight random hex digits, so two uploads of one filename
/// in the same second land on different keys.
pub fn generate_file_key(owner_id: Uuid, filename: &str, at: DateTime<Utc>) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "{}/{}/{}_{}_{}",
        UPLOAD_KEY_PREFIX,
        owner_id,
        at.format("%Y%m%d_%H%M%S"),
        &nonce[..KEY_NONCE_LEN],
        sanitize_filename(filename)
    )
}

/// Owner id embedded in an upload key, if the key has the upload layout.
pub fn key_owner(key: &str) -> Option<Uuid> {
    let mut parts = key.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(UPLOAD_KEY_PREFIX), Some(owner), Some(name)) if !name.is_empty() => {
            owner.parse().ok()
        }
        _ => None,
    }
}

fn content_type_from_key(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

fn parse_key(key: &str) -> AppResult<Path> {
    Path::parse(key).map_err(|_| AppError::NotFound(ERROR_FILE_NOT_FOUND.to_string()))
}

fn not_found_or(err: object_store::Error) -> AppError {
    match err {
        object_store::Error::NotFound { .. } => AppError::NotFound(ERROR_FILE_NOT_FOUND.to_string()),
        other => other.into(),
    }
}

#[async_trait]
impl UploadService for ObjectUploads {
    async fn upload(&self, owner: Account, file: UploadFile) -> AppResult<UploadResponse> {
        validate_file_type(&file.content_type)?;
        validate_file_size(file.bytes.len())?;

        let uploaded_at = Utc::now();
        let key = generate_file_key(owner.id, &file.filename, uploaded_at);
        let size = file.bytes.len();
        self.put(&parse_key(&key)?, file).await?;

        tracing::info!(file_key = %key, size, owner_id = %owner.id, "File uploaded");
        Ok(UploadResponse {
            file_url: self.file_url(&key),
            file_key: key,
            bucket_name: self.bucket.clone(),
            uploaded_at,
        })
    }

    async fn download(&self, key: String) -> AppResult<Download> {
        let path = parse_key(&key)?;
        let result = self.store.get(&path).await.map_err(not_found_or)?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string())
            .unwrap_or_else(|| content_type_from_key(&key).to_string());
        let bytes = result.bytes().await.map_err(not_found_or)?;

        Ok(Download {
            content_type,
            bytes,
        })
    }

    async fn delete(&self, actor: Account, key: String) -> AppResult<()> {
        let allowed = match key_owner(&key) {
            Some(owner_id) => owner_or_elevated(owner_id, &actor),
            None => actor.is_elevated(),
        };
        if !allowed {
            tracing::warn!(file_key = %key, account_id = %actor.id, "File access denied");
            return Err(AppError::forbidden(ERROR_UNAUTHORIZED_FILE_ACCESS));
        }

        let path = parse_key(&key)?;
        self.store.head(&path).await.map_err(not_found_or)?;
        self.store.delete(&path).await.map_err(not_found_or)?;

        tracing::info!(file_key = %key, "File deleted");
        Ok(())
    }
}
