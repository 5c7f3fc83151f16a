use std::{
    io,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use futures::TryStreamExt;
use tokio::{
    fs::{File, OpenOptions},
    io::AsyncWriteExt,
};
use tokio_util::io::StreamReader;

use crate::{
    config::DEFAULT_LOCAL_DIR,
    destination::{record_path, Destination},
    extension::{with_extension, ExtensionFallback},
    storage::{ensure_directory, BoxStream, FileMeta, NameGenerator, StorageEngine},
    ConfigError, StorageError, UploadError, UploadedFile,
};

/// How stored files are named.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilenameStrategy {
    /// A fresh generated identifier per file.
    #[default]
    Random,
    /// The same stem for every file.
    Fixed(String),
}

/// What happens when the target file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Truncate and replace the existing file; the last write wins.
    #[default]
    Overwrite,
    /// Fail with [`StorageError::FileExists`].
    Reject,
    /// Append `-1`, `-2`, ... to the stem until a free name is found.
    AutoRename,
}

/// Storage engine streaming files into a fixed directory.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    directory: PathBuf,
    destination: Destination,
    filename: FilenameStrategy,
    collision: CollisionPolicy,
    extension_fallback: ExtensionFallback,
    names: NameGenerator,
}

impl DiskStorage {
    /// Creates a builder with default settings.
    pub fn builder() -> DiskStorageBuilder {
        DiskStorageBuilder::default()
    }

    /// Absolute or relative directory files are written to.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Normalized destination below the local storage directory.
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    fn stem(&self) -> String {
        match &self.filename {
            FilenameStrategy::Random => self.names.generate(),
            FilenameStrategy::Fixed(name) => name.clone(),
        }
    }

    async fn open_target(
        &self,
        stem: &str,
        ext: Option<&str>,
    ) -> Result<(File, PathBuf, String), StorageError> {
        match self.collision {
            CollisionPolicy::Overwrite => {
                let name = with_extension(stem, ext);
                let path = self.directory.join(&name);
                let file = File::create(&path)
                    .await
                    .map_err(|source| write_error(&path, source))?;
                Ok((file, path, name))
            }
            CollisionPolicy::Reject => {
                let name = with_extension(stem, ext);
                let path = self.directory.join(&name);
                match create_new(&path).await {
                    Ok(file) => Ok((file, path, name)),
                    Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                        Err(StorageError::FileExists { path })
                    }
                    Err(source) => Err(write_error(&path, source)),
                }
            }
            CollisionPolicy::AutoRename => {
                let mut attempt = 0usize;
                loop {
                    let candidate = if attempt == 0 {
                        stem.to_owned()
                    } else {
                        format!("{stem}-{attempt}")
                    };
                    let name = with_extension(&candidate, ext);
                    let path = self.directory.join(&name);
                    match create_new(&path).await {
                        Ok(file) => return Ok((file, path, name)),
                        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                        Err(source) => return Err(write_error(&path, source)),
                    }
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl StorageEngine for DiskStorage {
    type Output = UploadedFile;

    async fn store(
        &self,
        meta: FileMeta,
        stream: BoxStream<'_, Result<Bytes, UploadError>>,
    ) -> Result<UploadedFile, StorageError> {
        let extension = self.extension_fallback.resolve(&meta.content_type)?;
        ensure_directory(&self.directory).await?;

        let stem = self.stem();
        let (mut file, path, name) = self.open_target(&stem, extension.as_deref()).await?;

        let mut reader = StreamReader::new(stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err)));
        let size = match tokio::io::copy(&mut reader, &mut file).await {
            Ok(size) => size,
            Err(err) => {
                drop(file);
                if let Err(remove) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(path = %path.display(), error = %remove, "failed to remove partial upload");
                }
                return Err(copy_error(&path, err));
            }
        };
        file.flush().await.map_err(|source| write_error(&path, source))?;

        tracing::debug!(
            field = %meta.field_name,
            path = %path.display(),
            size,
            "stored upload on disk"
        );

        Ok(UploadedFile {
            field_name: meta.field_name,
            file_name: meta.file_name,
            content_type: meta.content_type,
            extension,
            size,
            buffer: None,
            storage_key: Some(name),
            path: Some(record_path(&path)),
        })
    }
}

/// Builder for [`DiskStorage`].
#[derive(Debug, Clone)]
pub struct DiskStorageBuilder {
    local_dir: PathBuf,
    destination: Destination,
    filename: FilenameStrategy,
    collision: CollisionPolicy,
    extension_fallback: ExtensionFallback,
    names: NameGenerator,
}

impl Default for DiskStorageBuilder {
    fn default() -> Self {
        Self {
            local_dir: PathBuf::from(DEFAULT_LOCAL_DIR),
            destination: Destination::root(),
            filename: FilenameStrategy::Random,
            collision: CollisionPolicy::Overwrite,
            extension_fallback: ExtensionFallback::Omit,
            names: NameGenerator::default(),
        }
    }
}

impl DiskStorageBuilder {
    /// Sets the local storage directory destinations are resolved under.
    pub fn local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dir = dir.into();
        self
    }

    /// Sets the destination; it is normalized before use.
    pub fn destination(mut self, destination: impl Into<Destination>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Sets the filename strategy.
    pub fn filename(mut self, strategy: FilenameStrategy) -> Self {
        self.filename = strategy;
        self
    }

    /// Uses `name` for every stored file.
    pub fn fixed_filename(self, name: impl Into<String>) -> Self {
        self.filename(FilenameStrategy::Fixed(name.into()))
    }

    /// Sets the collision policy.
    pub fn collision(mut self, policy: CollisionPolicy) -> Self {
        self.collision = policy;
        self
    }

    /// Sets the behavior for content types without a known extension.
    pub fn extension_fallback(mut self, fallback: ExtensionFallback) -> Self {
        self.extension_fallback = fallback;
        self
    }

    /// Replaces the generator used by [`FilenameStrategy::Random`].
    pub fn name_generator(mut self, names: NameGenerator) -> Self {
        self.names = names;
        self
    }

    /// Validates the settings and builds the engine.
    pub fn build(self) -> Result<DiskStorage, ConfigError> {
        if self.local_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath {
                name: "local_dir".to_owned(),
            });
        }

        if let FilenameStrategy::Fixed(name) = &self.filename {
            if !is_plain_filename(name) {
                return Err(ConfigError::InvalidFilename { name: name.clone() });
            }
        }

        Ok(DiskStorage {
            directory: self.destination.resolve(&self.local_dir),
            destination: self.destination,
            filename: self.filename,
            collision: self.collision,
            extension_fallback: self.extension_fallback,
            names: self.names,
        })
    }
}

fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

async fn create_new(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
}

// Errors raised by the incoming stream travel through `StreamReader` wrapped in
// an `io::Error`; unwrap them so they are not reported as write failures.
fn copy_error(path: &Path, err: io::Error) -> StorageError {
    if err.get_ref().is_some_and(|inner| inner.is::<UploadError>()) {
        let kind = err.kind();
        return match err.into_inner().map(|inner| inner.downcast::<UploadError>()) {
            Some(Ok(upstream)) => StorageError::Upstream(upstream),
            _ => write_error(path, io::Error::from(kind)),
        };
    }
    write_error(path, err)
}

fn write_error(path: &Path, source: io::Error) -> StorageError {
    StorageError::Write {
        path: path.to_path_buf(),
        source,
    }
}
