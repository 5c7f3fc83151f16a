//! Axum integration helpers.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures::{Stream, StreamExt};

use crate::{ParseError, ProcessedMultipart, StorageEngine, UploadError, Uploader};

/// Axum body stream mapped into `uploadgear` chunk errors.
pub type AxumBodyStream<S> =
    futures::stream::Map<S, fn(Result<Bytes, axum::Error>) -> Result<Bytes, UploadError>>;

/// Extracts the raw `Content-Type` header from Axum request headers.
pub fn content_type_from_headers(headers: &HeaderMap) -> Result<&str, UploadError> {
    let value = headers
        .get(header::CONTENT_TYPE)
        .ok_or_else(|| ParseError::new("missing Content-Type header"))?;
    value
        .to_str()
        .map_err(|_| ParseError::new("Content-Type header must be ASCII").into())
}

/// Maps an Axum body stream into the stream shape expected by `uploadgear`.
pub fn map_body_stream<S>(stream: S) -> AxumBodyStream<S>
where
    S: Stream<Item = Result<Bytes, axum::Error>>,
{
    stream.map(axum_item_to_upload)
}

/// Parses and stores a request body with `uploader`.
pub async fn process_body<S>(
    uploader: &Uploader<S>,
    headers: &HeaderMap,
    body: Body,
) -> Result<ProcessedMultipart<S::Output>, UploadError>
where
    S: StorageEngine,
{
    let content_type = content_type_from_headers(headers)?;
    uploader
        .parse_request(content_type, map_body_stream(body.into_data_stream()))
        .await
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match &self {
            UploadError::Parse(_) | UploadError::IncompleteStream => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            _ => {
                tracing::warn!(error = %self, "upload failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn axum_item_to_upload(item: Result<Bytes, axum::Error>) -> Result<Bytes, UploadError> {
    item.map_err(|err| ParseError::new(format!("axum body stream error: {err}")).into())
}
