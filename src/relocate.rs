//! Persisting memory-buffered uploads under the storage root.

use std::path::{Path, PathBuf};

use futures::future::join_all;

use crate::{
    destination::{record_path, Destination},
    extension::with_extension,
    storage::{ensure_directory, NameGenerator},
    FileSet, StorageError, UploadConfig, UploadError, UploadedFile,
};

/// What to do with already written files when a multi-file relocation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialFailure {
    /// Leave written files in place.
    #[default]
    Keep,
    /// Remove every file written by the failed relocation.
    Remove,
}

/// Writes buffered files into `<storage_root>/<destination>` under generated names.
#[derive(Debug, Clone)]
pub struct Relocator {
    storage_root: PathBuf,
    destination: Destination,
    on_failure: PartialFailure,
    names: NameGenerator,
}

impl Relocator {
    /// Creates a relocator for `destination` below `storage_root`.
    pub fn new(storage_root: impl Into<PathBuf>, destination: impl Into<Destination>) -> Self {
        Self {
            storage_root: storage_root.into(),
            destination: destination.into(),
            on_failure: PartialFailure::Keep,
            names: NameGenerator::default(),
        }
    }

    /// Creates a relocator rooted at `config.storage_root`.
    pub fn from_config(config: &UploadConfig, destination: impl Into<Destination>) -> Self {
        Self::new(config.storage_root.clone(), destination)
    }

    /// Sets the partial failure policy.
    pub fn on_failure(mut self, policy: PartialFailure) -> Self {
        self.on_failure = policy;
        self
    }

    /// Replaces the file stem generator.
    pub fn with_name_generator(mut self, names: NameGenerator) -> Self {
        self.names = names;
        self
    }

    /// Normalized destination.
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Directory files are written to.
    pub fn target_dir(&self) -> PathBuf {
        self.destination.resolve(&self.storage_root)
    }

    /// Relocates every file of `files`, returning them with `path` and `storage_key` set.
    ///
    /// Writes of a multi-file set run concurrently and all of them settle before
    /// this returns. The first failure in input order is returned; files already
    /// written are handled according to [`PartialFailure`].
    pub async fn relocate(&self, files: FileSet) -> Result<FileSet, UploadError> {
        let dir = self.target_dir();
        ensure_directory(&dir).await?;

        match files {
            FileSet::Single(file) => {
                let name = self.next_name(&file);
                Ok(FileSet::Single(self.write_one(&dir, name, file).await?))
            }
            FileSet::Many(files) => {
                let writes = files.into_iter().map(|file| {
                    let name = self.next_name(&file);
                    self.write_one(&dir, name, file)
                });
                let results = join_all(writes).await;
                self.collect(results).await.map(FileSet::Many)
            }
        }
    }

    /// Relocates a single buffered file.
    pub async fn relocate_one(&self, file: UploadedFile) -> Result<UploadedFile, UploadError> {
        let dir = self.target_dir();
        ensure_directory(&dir).await?;
        let name = self.next_name(&file);
        self.write_one(&dir, name, file).await
    }

    fn next_name(&self, file: &UploadedFile) -> String {
        with_extension(&self.names.generate(), file.extension.as_deref())
    }

    async fn write_one(
        &self,
        dir: &Path,
        name: String,
        file: UploadedFile,
    ) -> Result<UploadedFile, UploadError> {
        let Some(buffer) = file.buffer.as_ref() else {
            return Err(UploadError::MissingBuffer {
                field: file.field_name,
            });
        };

        let path = dir.join(&name);
        tokio::fs::write(&path, buffer)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(
            field = %file.field_name,
            path = %path.display(),
            size = buffer.len(),
            "relocated buffered upload"
        );

        Ok(UploadedFile {
            storage_key: Some(name),
            path: Some(record_path(&path)),
            ..file
        })
    }

    async fn collect(
        &self,
        results: Vec<Result<UploadedFile, UploadError>>,
    ) -> Result<Vec<UploadedFile>, UploadError> {
        if results.iter().all(Result::is_ok) {
            return Ok(results.into_iter().flatten().collect());
        }

        let mut written = Vec::new();
        let mut first_error = None;
        for result in results {
            match result {
                Ok(file) => written.push(file),
                Err(err) if first_error.is_none() => first_error = Some(err),
                Err(_) => {}
            }
        }

        tracing::warn!(
            written = written.len(),
            policy = ?self.on_failure,
            "relocation failed"
        );

        if self.on_failure == PartialFailure::Remove {
            let dir = self.target_dir();
            for key in written.iter().filter_map(|file| file.storage_key.as_deref()) {
                let path = dir.join(key);
                if let Err(err) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(path = %path.display(), error = %err, "failed to remove relocated file");
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(written),
        }
    }
}
