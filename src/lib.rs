#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Upload middleware for multipart requests.
//!
//! Three components cover the usual upload flows:
//!
//! - [`memory_buffer`] buffers every uploaded file in memory.
//! - [`disk_storage`] streams every uploaded file into a fixed directory.
//! - [`relocate_buffered`] writes memory-buffered files below the storage root
//!   under generated names.

use bytes::Bytes;
use futures::Stream;

/// Storage locations.
pub mod config;
/// Destination normalization.
pub mod destination;
/// Error types exposed by this crate.
pub mod error;
/// Content type to extension mapping.
pub mod extension;
/// Uploaded file descriptors.
pub mod file;
/// High-level multipart stream type.
pub mod multipart;
/// Parsed multipart part API.
pub mod part;
/// Low-level parser components.
pub mod parser;
/// Relocation of buffered files.
pub mod relocate;
/// Storage engine traits and implementations.
pub mod storage;

#[cfg(feature = "actix")]
pub mod actix;
#[cfg(feature = "axum")]
pub mod axum;

pub use config::UploadConfig;
pub use destination::{normalize_destination, Destination};
pub use error::{ConfigError, ParseError, StorageError, UploadError};
pub use extension::ExtensionFallback;
pub use file::{FileSet, UploadedFile};
pub use multipart::Multipart;
pub use part::{Part, PartBodyReader};
pub use relocate::{PartialFailure, Relocator};
pub use storage::{
    ensure_directory, BoxStream, CollisionPolicy, DiskStorage, DiskStorageBuilder, FileMeta,
    FilenameStrategy, MemoryStorage, NameGenerator, StorageEngine,
};

/// Processed multipart output returned by [`Uploader::parse_and_store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedMultipart<O = UploadedFile> {
    /// File parts persisted through the configured storage engine.
    pub files: Vec<O>,
    /// Text field values collected from the stream.
    pub text_fields: Vec<(String, String)>,
}

impl<O> Default for ProcessedMultipart<O> {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            text_fields: Vec::new(),
        }
    }
}

impl ProcessedMultipart<UploadedFile> {
    /// Returns the stored files as a [`FileSet`], or `None` when no file was uploaded.
    pub fn file_set(self) -> Option<FileSet> {
        if self.files.is_empty() {
            None
        } else {
            Some(FileSet::from_files(self.files))
        }
    }
}

/// Parser configuration bound to a storage engine.
#[derive(Debug, Clone)]
pub struct Uploader<S> {
    storage: S,
}

impl<S> Uploader<S> {
    /// Creates an uploader with the given storage backend.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns an immutable reference to the configured storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S> Uploader<S>
where
    S: StorageEngine,
{
    /// Stores a file part through the configured storage backend.
    ///
    /// A failure of the incoming body surfaces as that failure, not as a storage error.
    pub async fn store(&self, part: Part<'_>) -> Result<S::Output, UploadError> {
        let meta = FileMeta {
            field_name: part.field_name().to_owned(),
            file_name: part.file_name().map(ToOwned::to_owned),
            content_type: part.content_type().clone(),
        };

        self.storage
            .store(meta, Box::pin(part.into_stream()))
            .await
            .map_err(|err| match err {
                StorageError::Upstream(err) => *err,
                other => other.into(),
            })
    }

    /// Parses multipart input and stores all file parts using the active storage backend.
    pub async fn parse_and_store<T>(
        &self,
        boundary: impl Into<String>,
        stream: T,
    ) -> Result<ProcessedMultipart<S::Output>, UploadError>
    where
        T: Stream<Item = Result<Bytes, UploadError>> + Send + Unpin,
    {
        self.drive(Multipart::new(boundary, stream)?).await
    }

    /// Same as [`Uploader::parse_and_store`], reading the boundary from a `Content-Type` value.
    pub async fn parse_request<T>(
        &self,
        content_type: &str,
        stream: T,
    ) -> Result<ProcessedMultipart<S::Output>, UploadError>
    where
        T: Stream<Item = Result<Bytes, UploadError>> + Send + Unpin,
    {
        self.drive(Multipart::from_content_type(content_type, stream)?)
            .await
    }

    async fn drive<T>(&self, mut multipart: Multipart<T>) -> Result<ProcessedMultipart<S::Output>, UploadError>
    where
        T: Stream<Item = Result<Bytes, UploadError>> + Send + Unpin,
    {
        let mut out = ProcessedMultipart::default();

        while let Some(part) = multipart.next_part().await? {
            if part.is_file() {
                out.files.push(self.store(part).await?);
            } else {
                let field_name = part.field_name().to_owned();
                out.text_fields.push((field_name, part.text().await?));
            }
        }

        Ok(out)
    }
}

/// Uploader that keeps every file's bytes in memory.
pub fn memory_buffer() -> Uploader<MemoryStorage> {
    Uploader::new(MemoryStorage::new())
}

/// Uploader that writes files to `<local_storage_dir>/<destination>`.
///
/// With `filename` set every file is stored under that stem and overwrites
/// earlier files of the same name; otherwise each file gets a generated name.
pub fn disk_storage(
    config: &UploadConfig,
    destination: &str,
    filename: Option<&str>,
) -> Result<Uploader<DiskStorage>, ConfigError> {
    let strategy = match filename {
        Some(name) => FilenameStrategy::Fixed(name.to_owned()),
        None => FilenameStrategy::Random,
    };

    let storage = DiskStorage::builder()
        .local_dir(config.local_storage_dir.clone())
        .destination(destination)
        .filename(strategy)
        .build()?;
    Ok(Uploader::new(storage))
}

/// Relocation step writing buffered files to `<storage_root>/<destination>`.
pub fn relocate_buffered(config: &UploadConfig, destination: &str) -> Relocator {
    Relocator::from_config(config, destination)
}
