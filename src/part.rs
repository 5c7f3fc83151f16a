use std::{
    fmt,
    task::{Context, Poll},
};

use bytes::{Bytes, BytesMut};
use futures::{future::poll_fn, stream, Stream};
use http::HeaderMap;
use mime::Mime;

use crate::{
    parser::{MultipartStream, ParsedPartHeaders},
    ParseError, UploadError,
};

/// Source of body chunks for the part currently being read.
pub trait PartBodyReader {
    /// Polls the next body chunk; `None` marks the end of the part.
    fn poll_next_chunk(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<Bytes>, UploadError>>;
}

impl<S> PartBodyReader for MultipartStream<S>
where
    S: Stream<Item = Result<Bytes, UploadError>> + Unpin,
{
    fn poll_next_chunk(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<Bytes>, UploadError>> {
        self.poll_next_part_chunk(cx)
    }
}

/// A single multipart part yielded by [`crate::Multipart`].
///
/// The part borrows its multipart reader, so the body has to be consumed (or
/// the part dropped) before the next part can be requested.
pub struct Part<'a> {
    headers: ParsedPartHeaders,
    body: &'a mut (dyn PartBodyReader + Send + 'a),
}

impl fmt::Debug for Part<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl<'a> Part<'a> {
    pub(crate) fn new(headers: ParsedPartHeaders, body: &'a mut (dyn PartBodyReader + Send + 'a)) -> Self {
        Self { headers, body }
    }

    /// Form field name.
    pub fn field_name(&self) -> &str {
        &self.headers.field_name
    }

    /// Client filename; present for file parts only.
    pub fn file_name(&self) -> Option<&str> {
        self.headers.file_name.as_deref()
    }

    /// Declared content type.
    pub fn content_type(&self) -> &Mime {
        &self.headers.content_type
    }

    /// Raw part headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers.headers
    }

    /// Returns `true` when the part carries a filename.
    pub fn is_file(&self) -> bool {
        self.headers.file_name.is_some()
    }

    /// Reads the next body chunk as soon as the upstream has produced it.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>, UploadError> {
        poll_fn(|cx| self.body.poll_next_chunk(cx)).await
    }

    /// Consumes the part and collects its whole body.
    pub async fn bytes(mut self) -> Result<Bytes, UploadError> {
        let mut body = BytesMut::new();
        while let Some(chunk) = self.chunk().await? {
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }

    /// Consumes the part and decodes its body as UTF-8.
    pub async fn text(self) -> Result<String, UploadError> {
        let body = self.bytes().await?;
        String::from_utf8(body.to_vec())
            .map_err(|_| ParseError::new("text field is not valid UTF-8").into())
    }

    /// Consumes the part and exposes its body as a chunk stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, UploadError>> + Send + 'a {
        let body = self.body;
        stream::poll_fn(move |cx| body.poll_next_chunk(cx).map(Result::transpose))
    }
}
