//! Cleanup and upload engines bound to one bucket session.

use std::io::SeekFrom;
use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use super::error::{CleanupError, SyncError};
use super::key::normalize_prefix;
use super::mime;
use super::plan::FilePlan;
use super::store::{ObjectSink, ObjectStore};

/// Bytes sampled from the head of a file when sniffing its content type.
const SNIFF_LEN: usize = 512;

/// One completed transfer, reported back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    pub source: String,
    pub key: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// Session state for one cleanup + upload pass against a bucket.
///
/// Holds no mutable state beyond its fixed configuration; every call is
/// self-contained and strictly sequential.
pub struct Transport<S, P> {
    store: S,
    sink: P,
    bucket: String,
    overwrite: bool,
}

impl<S: ObjectStore, P: ObjectSink> Transport<S, P> {
    pub fn new(store: S, sink: P, bucket: impl Into<String>, overwrite: bool) -> Self {
        Self {
            store,
            sink,
            bucket: bucket.into(),
            overwrite,
        }
    }

    /// Remove objects under `prefix`. An empty prefix clears the entire
    /// bucket; a non-empty prefix is scoped with a trailing `/` so that
    /// `builds` does not also match `builds-2`.
    ///
    /// Cleanup is not atomic: on failure the error carries the number of
    /// objects already removed.
    pub async fn cleanup(&self, prefix: &str) -> Result<usize, CleanupError> {
        let mut scope = normalize_prefix(prefix);
        if !scope.is_empty() {
            scope.push('/');
        }

        let mut removed = 0usize;
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .store
                .list_objects(&self.bucket, &scope, cursor.take())
                .await
                .map_err(|source| CleanupError { removed, source })?;

            if page.keys.is_empty() {
                match page.next {
                    // A backend may return an empty page with a live cursor.
                    Some(next) => {
                        cursor = Some(next);
                        continue;
                    }
                    None => return Ok(removed),
                }
            }

            let count = page.keys.len();
            self.store
                .delete_objects(&self.bucket, &page.keys)
                .await
                .map_err(|source| CleanupError { removed, source })?;
            removed += count;
            debug!(count, total = removed, "deleted object batch");

            match page.next {
                Some(next) => cursor = Some(next),
                None => return Ok(removed),
            }
        }
    }

    /// Execute the planned transfers strictly in order.
    ///
    /// The first failure aborts the batch and no results are returned, even
    /// for plans that were already uploaded in the same call. Callers that
    /// need partial-success semantics should upload plan by plan.
    pub async fn upload(&self, plans: &[FilePlan]) -> Result<Vec<UploadResult>, SyncError> {
        if plans.is_empty() {
            return Err(SyncError::InvalidInput(
                "no files provided for upload".to_string(),
            ));
        }

        let mut results = Vec::with_capacity(plans.len());

        for plan in plans {
            if !self.overwrite {
                self.ensure_absent(&plan.key).await?;
            }

            let mut file = File::open(&plan.source)
                .await
                .map_err(|source| SyncError::Io {
                    context: format!("failed to open {}", plan.source),
                    source,
                })?;

            let content_type = match mime::from_extension(Path::new(&plan.source)) {
                Some(value) => value.to_string(),
                None => sniff_content_type(&mut file, &plan.source).await?,
            };

            let body = ByteStream::read_from()
                .file(file)
                .build()
                .await
                .map_err(|err| SyncError::Io {
                    context: format!("failed to read {}", plan.source),
                    source: std::io::Error::other(err),
                })?;

            let etag = self
                .sink
                .put_object(&self.bucket, &plan.key, body, &content_type)
                .await?;
            debug!(key = %plan.key, size = plan.size, content_type = %content_type, "uploaded object");

            results.push(UploadResult {
                source: plan.source.clone(),
                key: plan.key.clone(),
                size: plan.size,
                etag,
            });
        }

        Ok(results)
    }

    /// Existence guard: a single point read, never a list or delete.
    /// A recognized not-found means the key is free to use.
    async fn ensure_absent(&self, key: &str) -> Result<(), SyncError> {
        if self.store.head_object(&self.bucket, key).await? {
            return Err(SyncError::ObjectExists {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

/// Read up to the first 512 bytes, sniff, and rewind so the upload streams
/// the full file from the start.
async fn sniff_content_type(file: &mut File, source: &str) -> Result<String, SyncError> {
    let mut buffer = [0u8; SNIFF_LEN];
    let mut filled = 0usize;
    loop {
        let n = file
            .read(&mut buffer[filled..])
            .await
            .map_err(|err| SyncError::Io {
                context: format!("failed to read {source}"),
                source: err,
            })?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == buffer.len() {
            break;
        }
    }

    file.seek(SeekFrom::Start(0))
        .await
        .map_err(|err| SyncError::Io {
            context: format!("failed to rewind {source}"),
            source: err,
        })?;

    Ok(mime::sniff(&buffer[..filled]).to_string())
}
