//! Narrow storage capabilities consumed by the transport.
//!
//! The transport depends on these traits rather than the concrete SDK client
//! so tests can substitute in-memory doubles that record calls and return
//! scripted responses page by page. The real implementations live here too,
//! on [`aws_sdk_s3::Client`].

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};

use super::error::SyncError;

/// One page of a bucket listing: the keys found plus the continuation
/// cursor for the next page, when the listing is not yet exhausted.
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    pub next: Option<String>,
}

/// Read/delete capability over object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Metadata-only existence probe. `Ok(true)` means the key exists,
    /// `Ok(false)` means the backend reported a recognized not-found.
    async fn head_object(&self, bucket: &str, key: &str) -> Result<bool, SyncError>;

    /// List one page of keys under `prefix`, starting at `cursor`. The page
    /// size is whatever the backend defaults to.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        cursor: Option<String>,
    ) -> Result<ObjectPage, SyncError>;

    /// Batch-delete the given keys. Quiet mode: overall success only, no
    /// per-key acknowledgment.
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), SyncError>;
}

/// Streaming-write capability over object storage.
#[async_trait]
pub trait ObjectSink: Send + Sync {
    /// Stream `body` to `key`, returning the backend ETag when it supplies
    /// one. The ETag is never synthesized locally.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: ByteStream,
        content_type: &str,
    ) -> Result<Option<String>, SyncError>;
}

#[async_trait]
impl ObjectStore for Client {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<bool, SyncError> {
        match self.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let service = err.into_service_error();
                if service.is_not_found() {
                    return Ok(false);
                }
                Err(SyncError::Storage {
                    context: format!("failed to check if {key} exists"),
                    message: service.to_string(),
                })
            }
        }
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        cursor: Option<String>,
    ) -> Result<ObjectPage, SyncError> {
        let response = self
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix((!prefix.is_empty()).then(|| prefix.to_string()))
            .set_continuation_token(cursor)
            .send()
            .await
            .map_err(|err| SyncError::Storage {
                context: "failed to list objects for cleanup".to_string(),
                message: err.into_service_error().to_string(),
            })?;

        let keys = response
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|object| object.key)
            .collect();

        Ok(ObjectPage {
            keys,
            next: response.next_continuation_token,
        })
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), SyncError> {
        let build_error = |err: &dyn std::fmt::Display| SyncError::Storage {
            context: "failed to build delete batch".to_string(),
            message: err.to_string(),
        };

        let identifiers = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| build_error(&err))?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(|err| build_error(&err))?;

        self.delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|err| SyncError::Storage {
                context: "failed to delete objects".to_string(),
                message: err.into_service_error().to_string(),
            })?;

        Ok(())
    }
}

#[async_trait]
impl ObjectSink for Client {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: ByteStream,
        content_type: &str,
    ) -> Result<Option<String>, SyncError> {
        let output = self
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .set_content_type((!content_type.is_empty()).then(|| content_type.to_string()))
            .send()
            .await
            .map_err(|err| SyncError::Storage {
                context: format!("failed to upload to {key}"),
                message: err.into_service_error().to_string(),
            })?;

        Ok(output.e_tag)
    }
}
