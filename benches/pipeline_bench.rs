use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dump_gen::{DumpConfig, DumpGenerator};
use sql_cleaner::chunker::create_sections;
use sql_cleaner::convert::copy_rows_to_tuples;
use sql_cleaner::normalizer::normalize_values_block;
use sql_cleaner::parser::parse_dump;
use sql_cleaner::pipeline::{Pipeline, PipelineConfig};
use sql_cleaner::rewriter::LocalRewriter;
use std::hint::black_box;

fn generate_dump(tables: usize, rows_per_table: usize) -> String {
    let config = DumpConfig {
        tables,
        rows_per_table,
        ..Default::default()
    };
    DumpGenerator::new(42, config).generate().sql
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_dump");

    for rows in [1_000, 10_000, 50_000] {
        let dump = generate_dump(5, rows / 5);

        group.throughput(Throughput::Bytes(dump.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("parse", format!("{}_rows", rows)),
            &dump,
            |b, dump| b.iter(|| black_box(parse_dump(dump))),
        );
    }

    group.finish();
}

fn bench_chunk(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_sections");
    let parsed = parse_dump(&generate_dump(5, 4_000));

    for chunk_size in [5, 50, 500] {
        group.bench_with_input(
            BenchmarkId::new("chunk", chunk_size),
            &chunk_size,
            |b, &chunk_size| b.iter(|| black_box(create_sections(&parsed, chunk_size))),
        );
    }

    group.finish();
}

fn bench_convert_and_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_normalize");
    let parsed = parse_dump(&generate_dump(3, 2_000));
    let rows: Vec<&str> = parsed
        .data_blocks
        .iter()
        .flat_map(|b| b.data.iter().map(String::as_str))
        .collect();
    let tuples = copy_rows_to_tuples(rows.iter().copied());
    let block = format!("VALUES\n{};", tuples.join(",\n"));

    group.throughput(Throughput::Elements(rows.len() as u64));
    group.bench_function("copy_rows_to_tuples", |b| {
        b.iter(|| black_box(copy_rows_to_tuples(rows.iter().copied())))
    });
    group.bench_function("normalize_values_block", |b| {
        b.iter(|| black_box(normalize_values_block(&block)))
    });

    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    for rows in [1_000, 10_000] {
        let dump = generate_dump(5, rows / 5);
        let rewriter = LocalRewriter::new();

        group.throughput(Throughput::Bytes(dump.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("local_rewriter", format!("{}_rows", rows)),
            &dump,
            |b, dump| {
                b.iter(|| {
                    let mut pipeline = Pipeline::new(&rewriter, PipelineConfig::default());
                    black_box(pipeline.run("bench.sql", dump).map(|o| o.stats))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_chunk,
    bench_convert_and_normalize,
    bench_end_to_end
);
criterion_main!(benches);
