#![allow(missing_docs)]

use bytes::Bytes;
use futures::stream;
use uploadgear::{disk_storage, UploadConfig, UploadError};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let base = std::env::temp_dir().join("uploadgear-disk-demo");
    let config = UploadConfig::new(base.join("storage")).with_local_storage_dir(&base);
    let uploader = disk_storage(&config, "avatars/", Some("avatar")).expect("valid config");

    let body = concat!(
        "--BOUND\r\n",
        "Content-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\n",
        "Content-Type: image/png\r\n",
        "\r\n",
        "not really a png\r\n",
        "--BOUND--\r\n"
    );
    let output = uploader
        .parse_and_store(
            "BOUND",
            stream::iter([Ok::<Bytes, UploadError>(Bytes::from_static(body.as_bytes()))]),
        )
        .await
        .expect("pipeline should succeed");

    for file in output.files {
        println!(
            "field={} bytes={} path={}",
            file.field_name,
            file.size,
            file.path.as_deref().unwrap_or("<none>")
        );
    }
}
