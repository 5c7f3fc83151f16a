#![allow(missing_docs)]

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use futures::stream;
use uploadgear::{memory_buffer, normalize_destination, UploadError};

fn normalize(c: &mut Criterion) {
    c.bench_function("normalize_destination", |b| {
        b.iter(|| normalize_destination(black_box("./users/../avatars//2024/09/")))
    });
}

fn memory_pipeline(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime should build");
    let uploader = memory_buffer();

    let mut body = Vec::new();
    body.extend_from_slice(
        b"--BOUND\r\nContent-Disposition: form-data; name=\"upload\"; filename=\"a.bin\"\r\n\r\n",
    );
    body.extend_from_slice(&vec![b'x'; 256 * 1024]);
    body.extend_from_slice(b"\r\n--BOUND--\r\n");
    let body = Bytes::from(body);

    c.bench_function("memory_buffer_256k", |b| {
        b.to_async(&runtime).iter(|| async {
            uploader
                .parse_and_store(
                    "BOUND",
                    stream::iter([Ok::<Bytes, UploadError>(body.clone())]),
                )
                .await
                .expect("pipeline should succeed")
        })
    });
}

criterion_group!(benches, normalize, memory_pipeline);
criterion_main!(benches);
