//! パフォーマンスベンチマーク
//!
//! このモジュールは、mdxlsxクレートのパフォーマンスを測定するための
//! ベンチマークを提供します。
//!
//! 実装するベンチマーク:
//! - 変換コア（パース + レイアウト）の速度
//! - エンドツーエンド（XLSXバイト列生成まで）の速度
//!
//! メモリ使用量の測定は別途、valgrindやheaptrackなどのツールを使用してください。

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mdxlsx::ConverterBuilder;

/// ベンチマーク用のMarkdown文書を生成
fn generate_document(paragraphs: usize) -> String {
    let mut source = String::new();
    source.push_str("# Benchmark Document\n\n");
    for i in 0..paragraphs {
        match i % 4 {
            0 => source.push_str(&format!(
                "Paragraph {} with **bold** and *italic* and `code`.\n\n",
                i
            )),
            1 => source.push_str(&format!("- item {}\n  - nested {}\n- tail {}\n\n", i, i, i)),
            2 => source.push_str(&format!("> quote number {}\n\n", i)),
            _ => source.push_str(&format!("```\nlet x = {};\n```\n\n", i)),
        }
    }
    source
}

/// 変換コア（パース + レイアウト）のみの速度
fn benchmark_convert_core(c: &mut Criterion) {
    let converter = ConverterBuilder::new().build().unwrap();
    let source = generate_document(2_000);

    let mut group = c.benchmark_group("convert_core");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("layout_2000_blocks", |b| {
        b.iter(|| {
            let result = converter.convert(black_box(&source)).unwrap();
            black_box(result)
        });
    });
    group.finish();
}

/// エンドツーエンド（XLSXバイト列生成まで）の速度
fn benchmark_convert_to_vec(c: &mut Criterion) {
    let converter = ConverterBuilder::new().build().unwrap();
    let source = generate_document(2_000);

    let mut group = c.benchmark_group("convert_to_vec");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.sample_size(20);
    group.bench_function("workbook_2000_blocks", |b| {
        b.iter(|| {
            let output = converter.convert_to_vec(black_box(&source)).unwrap();
            black_box(output)
        });
    });
    group.finish();
}

/// 入力サイズ別のスケーリング
fn benchmark_scaling(c: &mut Criterion) {
    let converter = ConverterBuilder::new().build().unwrap();

    let mut group = c.benchmark_group("scaling");
    group.sample_size(10);
    for paragraphs in [500, 5_000] {
        let source = generate_document(paragraphs);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(BenchmarkId::new("paragraphs", paragraphs), |b| {
            b.iter(|| {
                let output = converter.convert_to_vec(black_box(&source)).unwrap();
                black_box(output)
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_convert_core,
    benchmark_convert_to_vec,
    benchmark_scaling
);
criterion_main!(benches);
