use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;

use crate::{
    extension::ExtensionFallback,
    storage::{BoxStream, FileMeta, StorageEngine},
    StorageError, UploadError, UploadedFile,
};

/// Storage engine that buffers every file fully in memory.
///
/// Produced files carry `buffer = Some(..)` and no path; hand them to a
/// [`crate::Relocator`] to persist them.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    extension_fallback: ExtensionFallback,
}

impl MemoryStorage {
    /// Creates a memory storage engine that omits unknown extensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the behavior for content types without a known extension.
    pub fn with_extension_fallback(mut self, fallback: ExtensionFallback) -> Self {
        self.extension_fallback = fallback;
        self
    }
}

#[async_trait::async_trait]
impl StorageEngine for MemoryStorage {
    type Output = UploadedFile;

    async fn store(
        &self,
        meta: FileMeta,
        stream: BoxStream<'_, Result<Bytes, UploadError>>,
    ) -> Result<UploadedFile, StorageError> {
        let extension = self.extension_fallback.resolve(&meta.content_type)?;
        let buffer = stream
            .try_fold(BytesMut::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .map_err(|err| StorageError::Upstream(Box::new(err)))?
            .freeze();

        tracing::debug!(
            field = %meta.field_name,
            size = buffer.len(),
            "buffered upload in memory"
        );

        Ok(UploadedFile {
            field_name: meta.field_name,
            file_name: meta.file_name,
            content_type: meta.content_type,
            extension,
            size: buffer.len() as u64,
            buffer: Some(buffer),
            storage_key: None,
            path: None,
        })
    }
}
