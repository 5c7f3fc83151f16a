use bytes::Bytes;
use futures::{future::poll_fn, Stream};

use crate::{parser::extract_multipart_boundary, parser::MultipartStream, Part, UploadError};

/// High-level multipart stream abstraction.
#[derive(Debug)]
pub struct Multipart<S> {
    inner: MultipartStream<S>,
}

impl<S> Multipart<S> {
    /// Creates a multipart stream from an already extracted boundary and a chunk source.
    pub fn new(boundary: impl Into<String>, stream: S) -> Result<Self, UploadError> {
        Ok(Self {
            inner: MultipartStream::new(boundary, stream)?,
        })
    }

    /// Creates a multipart stream from an HTTP `Content-Type` header value.
    pub fn from_content_type(content_type: &str, stream: S) -> Result<Self, UploadError> {
        let boundary = extract_multipart_boundary(content_type)?;
        Self::new(boundary, stream)
    }
}

impl<S> Multipart<S>
where
    S: Stream<Item = Result<Bytes, UploadError>> + Send + Unpin,
{
    /// Returns the next multipart part, if available.
    ///
    /// Any unread body of the previous part is skipped first.
    pub async fn next_part(&mut self) -> Result<Option<Part<'_>>, UploadError> {
        let headers = poll_fn(|cx| self.inner.poll_next_part_headers(cx)).await?;
        Ok(headers.map(|headers| Part::new(headers, &mut self.inner)))
    }
}
