//! Collector 벤치마크
//!
//! Info 응답 파싱 성능 측정

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use asinfo_exporter::cluster::protocol::parse_reply;
use asinfo_exporter::collector::{namespace_names, parse_flat, parse_namespaces, RawReply};

fn statistics_line(fields: usize) -> String {
    (0..fields)
        .map(|i| format!("stat_{}={}", i, i * 7))
        .collect::<Vec<_>>()
        .join(";")
}

fn benchmark_parse_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_flat");

    for fields in [10, 200, 1000] {
        let line = statistics_line(fields);
        group.bench_with_input(BenchmarkId::new("statistics", fields), &line, |b, line| {
            b.iter(|| parse_flat(line))
        });
    }

    group.finish();
}

fn benchmark_parse_namespaces(c: &mut Criterion) {
    let names = namespace_names("test;bar;cache;sessions");
    let reply: RawReply = names
        .iter()
        .map(|n| (format!("namespace/{}", n), statistics_line(300)))
        .collect();

    c.bench_function("parse_namespaces/4x300", |b| {
        b.iter(|| parse_namespaces(&names, &reply))
    });
}

fn benchmark_parse_reply(c: &mut Criterion) {
    let body = format!("node\tBB990C28F270008\nstatistics\t{}\n", statistics_line(500));

    c.bench_function("parse_reply/node+statistics", |b| {
        b.iter(|| parse_reply(body.as_bytes()))
    });
}

criterion_group!(
    benches,
    benchmark_parse_flat,
    benchmark_parse_namespaces,
    benchmark_parse_reply
);
criterion_main!(benches);
