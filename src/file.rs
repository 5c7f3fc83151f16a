//! Descriptors for files produced by the storage engines and relocation.

use bytes::Bytes;
use mime::Mime;

/// Uploaded file descriptor produced by a storage engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Form field the file was submitted under.
    pub field_name: String,
    /// Client supplied filename, if any.
    pub file_name: Option<String>,
    /// Declared content type.
    pub content_type: Mime,
    /// Extension derived from the content type.
    pub extension: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Raw content, present only for memory-buffered files.
    pub buffer: Option<Bytes>,
    /// Final file name on disk.
    pub storage_key: Option<String>,
    /// Recorded path, `/`-rooted with forward slashes.
    pub path: Option<String>,
}

/// One file or an ordered sequence of files attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSet {
    /// A single file field.
    Single(UploadedFile),
    /// A multi-file field, in submission order.
    Many(Vec<UploadedFile>),
}

impl FileSet {
    /// Builds a set from parsed files: one file becomes `Single`, otherwise `Many`.
    pub fn from_files(mut files: Vec<UploadedFile>) -> Self {
        if files.len() == 1 {
            if let Some(file) = files.pop() {
                return Self::Single(file);
            }
        }
        Self::Many(files)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(files) => files.len(),
        }
    }

    /// Returns `true` for an empty `Many` set.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the files in order.
    pub fn iter(&self) -> std::slice::Iter<'_, UploadedFile> {
        match self {
            Self::Single(file) => std::slice::from_ref(file).iter(),
            Self::Many(files) => files.iter(),
        }
    }

    /// Flattens the set into a vector.
    pub fn into_vec(self) -> Vec<UploadedFile> {
        match self {
            Self::Single(file) => vec![file],
            Self::Many(files) => files,
        }
    }
}

impl From<UploadedFile> for FileSet {
    fn from(value: UploadedFile) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<UploadedFile>> for FileSet {
    fn from(value: Vec<UploadedFile>) -> Self {
        Self::Many(value)
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a UploadedFile;
    type IntoIter = std::slice::Iter<'a, UploadedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
