// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use miniserver::{Request, Response};

fn simple_request_parse_benchmark(c: &mut Criterion) {
    let request = b"GET / HTTP/1.1\r\nHost: localhost:4221\r\nUser-Agent: Test\r\n\r\n";

    c.bench_function("simple_request_parse", |b| {
        b.iter(|| {
            let _ = Request::try_from(black_box(request.as_slice()), 0).unwrap();
        });
    });
}

fn complex_request_parse_benchmark(c: &mut Criterion) {
    let request = b"GET /echo/resource?id=123&name=test HTTP/1.1\r\n\
                    Host: localhost:4221\r\n\
                    User-Agent: Mozilla/5.0 (Windows NT 10.0; Win64; x64)\r\n\
                    Accept: text/html,application/xhtml+xml\r\n\
                    Accept-Language: en-US,en;q=0.9\r\n\
                    Accept-Encoding: gzip, deflate, br\r\n\
                    Connection: close\r\n\
                    \r\n";

    c.bench_function("complex_request_parse", |b| {
        b.iter(|| {
            let _ = Request::try_from(black_box(request.as_slice()), 0).unwrap();
        });
    });
}

fn request_parse_body_size_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_parse_body_size");

    for size in [0usize, 1024, 64 * 1024].iter() {
        let mut request = format!(
            "POST /files/upload.bin HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            size
        )
        .into_bytes();
        request.extend(std::iter::repeat(b'x').take(*size));

        group.bench_with_input(BenchmarkId::from_parameter(size), &request, |b, request| {
            b.iter(|| {
                let _ = Request::try_from(black_box(request.as_slice()), 0).unwrap();
            });
        });
    }

    group.finish();
}

fn accept_encoding_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("accept_encoding");

    let requests = [
        ("none", b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n".as_slice()),
        (
            "gzip_only",
            b"GET / HTTP/1.1\r\nHost: localhost\r\nAccept-Encoding: gzip\r\n\r\n".as_slice(),
        ),
        (
            "gzip_last",
            b"GET / HTTP/1.1\r\nHost: localhost\r\nAccept-Encoding: br, deflate, x-custom, gzip\r\n\r\n".as_slice(),
        ),
    ];

    for (name, raw) in requests.iter() {
        let request = Request::try_from(raw, 0).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &request, |b, request| {
            b.iter(|| {
                let _ = black_box(request.header("accept-encoding"));
            });
        });
    }

    group.finish();
}

fn response_serialize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_serialize");

    for size in [0usize, 1024, 64 * 1024].iter() {
        let mut response = Response::new();
        response
            .set_header("Content-Type", "application/octet-stream")
            .set_body(vec![0u8; *size]);

        group.bench_with_input(BenchmarkId::from_parameter(size), &response, |b, response| {
            b.iter(|| {
                let _ = black_box(response.as_bytes());
            });
        });
    }

    group.finish();
}

fn response_parse_benchmark(c: &mut Criterion) {
    let bytes = Response::text("hello world").as_bytes();

    c.bench_function("response_parse", |b| {
        b.iter(|| {
            let _ = Response::parse(black_box(&bytes)).unwrap();
        });
    });
}

criterion_group!(
    benches,
    simple_request_parse_benchmark,
    complex_request_parse_benchmark,
    request_parse_body_size_benchmark,
    accept_encoding_benchmark,
    response_serialize_benchmark,
    response_parse_benchmark
);
criterion_main!(benches);
