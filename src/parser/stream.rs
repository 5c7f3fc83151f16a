//! Incremental multipart reader.
//!
//! Part bodies are handed out chunk by chunk as the upstream delivers them.
//! Only the last `delimiter.len() - 1` bytes of a body are held back, since
//! they could be the start of the closing delimiter.

use std::{
    pin::Pin,
    task::{ready, Context, Poll},
};

use bytes::{Buf, Bytes, BytesMut};
use futures::Stream;
use http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::{
    parser::headers::{parse_part_headers, ParsedPartHeaders},
    ParseError, UploadError,
};

const HEADER_END: &[u8] = b"\r\n\r\n";
const CRLF: &[u8] = b"\r\n";
const CLOSE: &[u8] = b"--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Preamble,
    Headers,
    Body,
    End,
    Failed,
}

/// Multipart reader over a chunked byte stream.
#[derive(Debug)]
pub struct MultipartStream<S> {
    stream: S,
    opening: Vec<u8>,
    closing: Vec<u8>,
    delimiter: Vec<u8>,
    buffer: BytesMut,
    scanned: usize,
    state: ReadState,
    upstream_done: bool,
}

impl<S> MultipartStream<S> {
    /// Creates a reader for a known multipart boundary.
    pub fn new(boundary: impl Into<String>, stream: S) -> Result<Self, ParseError> {
        let boundary = boundary.into();
        if boundary.is_empty() {
            return Err(ParseError::new("multipart boundary cannot be empty"));
        }
        if boundary.contains(['\r', '\n']) {
            return Err(ParseError::new("multipart boundary cannot contain CRLF"));
        }

        Ok(Self {
            stream,
            opening: format!("--{boundary}").into_bytes(),
            closing: format!("--{boundary}--").into_bytes(),
            delimiter: format!("\r\n--{boundary}").into_bytes(),
            buffer: BytesMut::new(),
            scanned: 0,
            state: ReadState::Preamble,
            upstream_done: false,
        })
    }

    fn fail(&mut self, err: impl Into<UploadError>) -> UploadError {
        self.state = ReadState::Failed;
        err.into()
    }

    fn truncated(&mut self) -> UploadError {
        self.fail(UploadError::IncompleteStream)
    }
}

impl<S> MultipartStream<S>
where
    S: Stream<Item = Result<Bytes, UploadError>> + Unpin,
{
    /// Reads up to the next part's headers, skipping any unread body of the current part.
    ///
    /// Yields `None` after the closing boundary.
    pub fn poll_next_part_headers(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ParsedPartHeaders>, UploadError>> {
        loop {
            match self.state {
                ReadState::Body => {
                    ready!(self.poll_next_part_chunk(cx))?;
                }
                ReadState::Preamble => {
                    if let Some(end) = find_from(&self.buffer, CRLF, self.scanned) {
                        let line = self.buffer.split_to(end + CRLF.len());
                        self.scanned = 0;
                        if line[..end] == self.opening[..] {
                            self.state = ReadState::Headers;
                        } else if line[..end] == self.closing[..] {
                            self.state = ReadState::End;
                        }
                        continue;
                    }
                    if self.upstream_done {
                        return Poll::Ready(Err(
                            self.fail(ParseError::new("missing opening boundary"))
                        ));
                    }
                    self.scanned = self.buffer.len().saturating_sub(CRLF.len() - 1);
                    ready!(self.poll_fill(cx))?;
                }
                ReadState::Headers => {
                    if let Some(end) = find_from(&self.buffer, HEADER_END, self.scanned) {
                        let block = self.buffer.split_to(end + HEADER_END.len());
                        self.scanned = 0;
                        let headers = match parse_header_block(&block[..end])
                            .and_then(|map| parse_part_headers(&map))
                        {
                            Ok(headers) => headers,
                            Err(err) => return Poll::Ready(Err(self.fail(err))),
                        };
                        self.state = ReadState::Body;
                        return Poll::Ready(Ok(Some(headers)));
                    }
                    if self.upstream_done {
                        return Poll::Ready(Err(self.truncated()));
                    }
                    self.scanned = self.buffer.len().saturating_sub(HEADER_END.len() - 1);
                    ready!(self.poll_fill(cx))?;
                }
                ReadState::End | ReadState::Failed => return Poll::Ready(Ok(None)),
            }
        }
    }

    /// Returns the next available chunk of the current part body.
    ///
    /// Yields `None` once the part's closing delimiter has been consumed.
    pub fn poll_next_part_chunk(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<Bytes>, UploadError>> {
        loop {
            if self.state != ReadState::Body {
                return Poll::Ready(Ok(None));
            }

            let Some(at) = find_from(&self.buffer, &self.delimiter, 0) else {
                let held_back = self.delimiter.len() - 1;
                if self.buffer.len() > held_back {
                    let take = self.buffer.len() - held_back;
                    return Poll::Ready(Ok(Some(self.buffer.split_to(take).freeze())));
                }
                if self.upstream_done {
                    return Poll::Ready(Err(self.truncated()));
                }
                ready!(self.poll_fill(cx))?;
                continue;
            };

            if at > 0 {
                return Poll::Ready(Ok(Some(self.buffer.split_to(at).freeze())));
            }

            let suffix = &self.buffer[self.delimiter.len()..];
            if suffix.starts_with(CRLF) {
                self.buffer.advance(self.delimiter.len() + CRLF.len());
                self.state = ReadState::Headers;
            } else if suffix.starts_with(b"--\r\n") {
                self.buffer.advance(self.delimiter.len() + 4);
                self.state = ReadState::End;
            } else if CRLF.starts_with(suffix) || b"--\r\n".starts_with(suffix) {
                if !self.upstream_done {
                    ready!(self.poll_fill(cx))?;
                    continue;
                }
                if suffix != CLOSE {
                    return Poll::Ready(Err(self.truncated()));
                }
                self.buffer.clear();
                self.state = ReadState::End;
            } else {
                // `--boundary` followed by other bytes is body content.
                let len = self.delimiter.len();
                return Poll::Ready(Ok(Some(self.buffer.split_to(len).freeze())));
            }
        }
    }

    fn poll_fill(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), UploadError>> {
        match Pin::new(&mut self.stream).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                self.buffer.extend_from_slice(&chunk);
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Some(Err(err))) => Poll::Ready(Err(self.fail(err))),
            Poll::Ready(None) => {
                self.upstream_done = true;
                Poll::Ready(Ok(()))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

fn parse_header_block(raw: &[u8]) -> Result<HeaderMap, ParseError> {
    let text = std::str::from_utf8(raw).map_err(|_| ParseError::new("part headers must be UTF-8"))?;

    let mut headers = HeaderMap::new();
    for line in text.split("\r\n").filter(|line| !line.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::new("invalid part header line"))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| ParseError::new("invalid part header name"))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| ParseError::new("invalid part header value"))?;
        headers.append(name, value);
    }

    if headers.contains_key(header::CONTENT_DISPOSITION) {
        Ok(headers)
    } else {
        Err(ParseError::new("missing Content-Disposition header"))
    }
}

fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}
