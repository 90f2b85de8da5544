//! Benchmarks for canonical request key construction
//!
//! Every `fetch_resource` call builds its URL before the in-flight lookup,
//! so this sits on the hot path for cache hits.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flixdeck_fetch::{Params, RequestDescriptor};

const BASE: &str = "https://api.themoviedb.org/3";

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    let cases = [
        ("bare_path", RequestDescriptor::new("/movie/top_rated", Params::new())),
        (
            "localized",
            RequestDescriptor::new("/movie/top_rated", Params::new().with("language", "en-US")),
        ),
        (
            "absolute_with_query",
            RequestDescriptor::new(
                "https://api.themoviedb.org/3/discover/movie?with_genres=28",
                Params::new().with("language", "en-US").with("page", 2),
            ),
        ),
        (
            "detail_with_videos",
            RequestDescriptor::new(
                "/tv/1399",
                Params::new()
                    .with("language", "en-US")
                    .with("append_to_response", "videos")
                    .with("include_adult", false),
            ),
        ),
    ];

    for (name, descriptor) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), descriptor, |b, d| {
            b.iter(|| black_box(d.resolve(BASE, Some("0123456789abcdef")).unwrap()))
        });
    }

    group.finish();
}

fn bench_search_encoding(c: &mut Criterion) {
    let descriptor = RequestDescriptor::new(
        "/search/multi",
        Params::new().with("query", "the lord of the rings: the return of the king & more"),
    );
    c.bench_function("resolve_search_query", |b| {
        b.iter(|| black_box(descriptor.resolve(BASE, Some("k")).unwrap()))
    });
}

criterion_group!(benches, bench_resolve, bench_search_encoding);
criterion_main!(benches);
