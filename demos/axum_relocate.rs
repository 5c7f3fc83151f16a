#![allow(missing_docs)]

use std::{io, net::SocketAddr, sync::Arc};

use axum::{
    body::Body,
    extract::State,
    http::HeaderMap,
    response::Html,
    routing::{get, post},
    Router,
};
use uploadgear::{
    axum::process_body, memory_buffer, relocate_buffered, MemoryStorage, Relocator, UploadConfig,
    UploadError, Uploader,
};

struct AppState {
    uploader: Uploader<MemoryStorage>,
    relocator: Relocator,
}

async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Result<String, UploadError> {
    let processed = process_body(&state.uploader, &headers, body).await?;
    let Some(files) = processed.file_set() else {
        return Ok("no files uploaded\n".to_owned());
    };

    let stored = state.relocator.relocate(files).await?;
    let mut out = format!("stored {} file(s)\n", stored.len());
    for file in &stored {
        out.push_str(&format!(
            "- field={} bytes={} path={}\n",
            file.field_name,
            file.size,
            file.path.as_deref().unwrap_or("<none>")
        ));
    }
    Ok(out)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>uploadgear relocate</title>
</head>
<body>
  <h1>Memory buffer + relocate</h1>
  <form action="/upload" method="post" enctype="multipart/form-data">
    <input type="file" name="photos" multiple />
    <button type="submit">Upload</button>
  </form>
</body>
</html>
"#;

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    let config = UploadConfig::from_env().unwrap_or_else(|_| {
        UploadConfig::new(std::env::temp_dir().join("uploadgear-axum-demo"))
    });
    let state = Arc::new(AppState {
        uploader: memory_buffer(),
        relocator: relocate_buffered(&config, "photos/"),
    });

    let app: Router<()> = Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8084));
    println!("axum-relocate-demo running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
