//! Actix integration helpers.

use actix_web::{
    error::PayloadError,
    http::{header, StatusCode},
    web::{self, Bytes},
    HttpRequest, HttpResponse, ResponseError,
};
use futures::{channel::mpsc, SinkExt, Stream, StreamExt};

use crate::{ParseError, ProcessedMultipart, StorageEngine, UploadError, Uploader};

const PAYLOAD_CHANNEL_CAPACITY: usize = 16;

/// Actix body stream mapped into `uploadgear` chunk errors.
pub type ActixBodyStream<S> =
    futures::stream::Map<S, fn(Result<Bytes, PayloadError>) -> Result<Bytes, UploadError>>;

/// Extracts the raw `Content-Type` header from an Actix request.
pub fn content_type_from_request(request: &HttpRequest) -> Result<&str, UploadError> {
    let value = request
        .headers()
        .get(header::CONTENT_TYPE)
        .ok_or_else(|| ParseError::new("missing Content-Type header"))?;
    value
        .to_str()
        .map_err(|_| ParseError::new("Content-Type header must be ASCII").into())
}

/// Maps an Actix payload stream into the stream shape expected by `uploadgear`.
pub fn map_payload_stream<S>(stream: S) -> ActixBodyStream<S>
where
    S: Stream<Item = Result<Bytes, PayloadError>>,
{
    stream.map(actix_item_to_upload)
}

/// Moves a payload onto a bounded channel so it can feed the `Send` parser.
///
/// `web::Payload` is tied to its worker thread; a local task pumps it into the
/// channel and stops once the receiver is dropped. Must be called from within
/// the Actix runtime.
pub fn bridge_payload(payload: web::Payload) -> mpsc::Receiver<Result<Bytes, UploadError>> {
    let (mut tx, rx) = mpsc::channel(PAYLOAD_CHANNEL_CAPACITY);
    actix_web::rt::spawn(async move {
        let mut body = map_payload_stream(payload);
        while let Some(item) = body.next().await {
            if tx.send(item).await.is_err() {
                break;
            }
        }
    });
    rx
}

/// Parses and stores an Actix payload with `uploader`.
pub async fn process_payload<S>(
    uploader: &Uploader<S>,
    request: &HttpRequest,
    payload: web::Payload,
) -> Result<ProcessedMultipart<S::Output>, UploadError>
where
    S: StorageEngine,
{
    let content_type = content_type_from_request(request)?;
    uploader
        .parse_request(content_type, bridge_payload(payload))
        .await
}

impl ResponseError for UploadError {
    fn status_code(&self) -> StatusCode {
        match self {
            UploadError::Parse(_) | UploadError::IncompleteStream => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status == StatusCode::BAD_REQUEST {
            HttpResponse::build(status).body(self.to_string())
        } else {
            tracing::warn!(error = %self, "upload failed");
            HttpResponse::build(status).finish()
        }
    }
}

fn actix_item_to_upload(item: Result<Bytes, PayloadError>) -> Result<Bytes, UploadError> {
    item.map_err(|err| ParseError::new(format!("actix body stream error: {err}")).into())
}
