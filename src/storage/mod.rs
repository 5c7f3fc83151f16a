use std::{fmt, path::Path, pin::Pin, sync::Arc};

use bytes::Bytes;
use futures::Stream;
use mime::Mime;

use crate::{StorageError, UploadError};

/// Disk storage engine.
pub mod disk;
/// In-memory buffering engine.
pub mod memory;

pub use disk::{CollisionPolicy, DiskStorage, DiskStorageBuilder, FilenameStrategy};
pub use memory::MemoryStorage;

/// Boxed chunk stream handed to storage engines.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Metadata describing an incoming file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    /// Form field name.
    pub field_name: String,
    /// Client filename, if any.
    pub file_name: Option<String>,
    /// Declared content type.
    pub content_type: Mime,
}

/// Async trait abstraction for file storage backends.
#[async_trait::async_trait]
pub trait StorageEngine: Send + Sync + fmt::Debug {
    /// Value produced for every stored file.
    type Output: Send;

    /// Consumes `stream` and persists it according to the engine's policy.
    async fn store(
        &self,
        meta: FileMeta,
        stream: BoxStream<'_, Result<Bytes, UploadError>>,
    ) -> Result<Self::Output, StorageError>;
}

/// Generates file stems for stored files.
#[derive(Clone)]
pub struct NameGenerator(Arc<dyn Fn() -> String + Send + Sync>);

impl NameGenerator {
    /// Wraps a custom generator.
    pub fn new<F>(generate: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self(Arc::new(generate))
    }

    /// Produces the next name.
    pub fn generate(&self) -> String {
        (self.0)()
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new(|| uuid::Uuid::new_v4().simple().to_string())
    }
}

impl fmt::Debug for NameGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NameGenerator").finish_non_exhaustive()
    }
}

/// Creates `path` and any missing ancestors; an existing directory is not an error.
pub async fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    tracing::trace!(path = %path.display(), "ensuring upload directory");
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| StorageError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        })
}
