//! パフォーマンステスト
//!
//! このモジュールは、処理速度の目安を検証するテストを提供します。
//! 正確な測定にはbenches/benchmark.rs（criterion）を使用してください。

use std::time::Instant;

use mdxlsx::ConverterBuilder;

/// ベンチマーク用のMarkdown文書を生成
fn generate_document(paragraphs: usize) -> String {
    let mut source = String::new();
    source.push_str("# Generated Document\n\n");
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

/// 中規模文書の変換速度
///
/// 2,500ブロック規模の文書を数秒以内に変換できることを確認します。
/// 目安のみを提供するテストであり、厳密な閾値は設けません。
#[test]
fn test_medium_document_conversion_speed() {
    let source = generate_document(1_000);
    let converter = ConverterBuilder::new().build().unwrap();

    let start = Instant::now();
    let (bytes, result) = converter.convert_to_vec(&source).unwrap();
    let elapsed = start.elapsed();

    println!(
        "Converted {} rows ({} input bytes -> {} output bytes) in {:?}",
        result.rows.len(),
        source.len(),
        bytes.len(),
        elapsed
    );

    assert!(!result.rows.is_empty());
    // 目安: 中規模文書は10秒以内（CI環境の揺らぎを考慮した緩い上限）
    assert!(
        elapsed.as_secs() < 10,
        "conversion took too long: {:?}",
        elapsed
    );
}

/// 大規模文書の変換速度
///
/// 注意: このテストは時間がかかるため、通常はスキップされます。
/// 実行する場合は `cargo test -- --ignored` を使用してください。
#[test]
#[ignore] // 手動実行用
fn test_large_document_conversion_speed() {
    let source = generate_document(100_000);
    let converter = ConverterBuilder::new().build().unwrap();

    let start = Instant::now();
    let (bytes, result) = converter.convert_to_vec(&source).unwrap();
    let elapsed = start.elapsed();

    println!(
        "Converted {} rows ({} input bytes -> {} output bytes) in {:?}",
        result.rows.len(),
        source.len(),
        bytes.len(),
        elapsed
    );

    assert!(!result.rows.is_empty());
}

/// 変換結果が入力サイズに対して線形に近いことの目安
#[test]
#[ignore] // 手動実行用
fn test_scaling_sanity() {
    let converter = ConverterBuilder::new().build().unwrap();

    for paragraphs in [1_000, 10_000, 50_000] {
        let source = generate_document(paragraphs);
        let start = Instant::now();
        let (_, result) = converter.convert_to_vec(&source).unwrap();
        println!(
            "{} paragraphs -> {} rows in {:?}",
            paragraphs,
            result.rows.len(),
            start.elapsed()
        );
    }
}
