//! Integration Tests for mdxlsx
//!
//! This module contains end-to-end tests: Markdown goes in through the
//! public API, and the produced workbook is verified by reading it back
//! with calamine and by inspecting the raw OOXML parts.

use std::io::{Cursor, Read};

use calamine::{Data, Reader, Xlsx};
use mdxlsx::{ConverterBuilder, LinkStyle, RowKind, UnsupportedKind};

// Helper module for reading produced workbooks back
mod readback {
    use super::*;

    /// Open the produced bytes as an XLSX workbook
    pub fn open_workbook(bytes: &[u8]) -> Xlsx<Cursor<Vec<u8>>> {
        Xlsx::new(Cursor::new(bytes.to_vec())).expect("produced bytes should be a valid workbook")
    }

    /// Read column A of the given sheet as strings (empty cells as "")
    pub fn read_column_a(bytes: &[u8], sheet: &str) -> Vec<String> {
        let mut workbook = open_workbook(bytes);
        let range = workbook
            .worksheet_range(sheet)
            .expect("sheet should be readable");
        range
            .rows()
            .map(|row| match row.first() {
                Some(Data::String(s)) => s.clone(),
                Some(Data::Empty) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect()
    }

    /// Extract a single part of the container as text
    pub fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(bytes.to_vec())).expect("valid zip container");
        let mut file = archive.by_name(name).expect("part should exist");
        let mut content = String::new();
        file.read_to_string(&mut content).expect("utf-8 part");
        content
    }

    /// Check whether a part exists in the container
    pub fn has_part(bytes: &[u8], name: &str) -> bool {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(bytes.to_vec())).expect("valid zip container");
        let exists = archive.by_name(name).is_ok();
        exists
    }
}

#[test]
fn test_simple_document_read_back() {
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, result) = converter
        .convert_to_vec("# Title\n\nbody text\n\n- a\n- b")
        .unwrap();

    assert_eq!(result.rows.len(), 4);
    assert!(result.warnings.is_empty());

    let cells = readback::read_column_a(&bytes, "Sheet1");
    assert_eq!(cells, vec!["Title", "body text", "a", "b"]);
}

#[test]
fn test_round_trip_cell_text_through_file_format() {
    // 各行のセルテキストが実ファイルフォーマットを往復しても一致する
    let source = "\
# Heading One

A paragraph with **bold**, *italic*, `code`, and ~~strike~~.

- item one
  - nested item
- item two

> a quoted line

```
fn main() {
    println!();
}
```
";
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, result) = converter.convert_to_vec(source).unwrap();

    let cells = readback::read_column_a(&bytes, "Sheet1");
    assert_eq!(cells.len(), result.rows.len());
    for (cell, row) in cells.iter().zip(&result.rows) {
        assert_eq!(cell, &row.cell.flatten());
    }
}

#[test]
fn test_heading_rows_are_bold_runs() {
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, result) = converter.convert_to_vec("# Title").unwrap();

    // コア結果では全ランが太字
    assert!(result.rows[0]
        .cell
        .runs()
        .iter()
        .all(|run| run.attrs.bold));

    // 共有文字列のランにも<b/>が出力される
    let sst = readback::read_part(&bytes, "xl/sharedStrings.xml");
    assert!(sst.contains("<b/>"));
    // 見出しレベル1のフォントサイズ
    assert!(sst.contains("sz val=\"26\""));
}

#[test]
fn test_bold_italic_run_boundaries_in_shared_strings() {
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, _) = converter
        .convert_to_vec("**bold *and italic* text**")
        .unwrap();

    let sst = readback::read_part(&bytes, "xl/sharedStrings.xml");
    assert!(sst.contains("<b/>"));
    assert!(sst.contains("<i/>"));
    assert!(sst.contains("<t xml:space=\"preserve\">bold </t>"));
    assert!(sst.contains("<t xml:space=\"preserve\">and italic</t>"));
    assert!(sst.contains("<t xml:space=\"preserve\"> text</t>"));
}

#[test]
fn test_nested_list_indent_styles() {
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, result) = converter.convert_to_vec("- a\n  - nested\n- b").unwrap();

    assert_eq!(
        result
            .rows
            .iter()
            .map(|r| r.indent_level)
            .collect::<Vec<_>>(),
        vec![1, 2, 1]
    );

    let styles = readback::read_part(&bytes, "xl/styles.xml");
    assert!(styles.contains("indent=\"1\""));
    assert!(styles.contains("indent=\"2\""));
}

#[test]
fn test_table_is_skipped_with_warning() {
    let source = "before\n\n| h1 | h2 |\n| -- | -- |\n| a | b |\n\nafter";
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, result) = converter.convert_to_vec(source).unwrap();

    // テーブルは行を生成しない
    let cells = readback::read_column_a(&bytes, "Sheet1");
    assert_eq!(cells, vec!["before", "after"]);

    // 警告が1件、種別はtable
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, UnsupportedKind::Table);
}

#[test]
fn test_hyperlink_annotation_default() {
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, result) = converter
        .convert_to_vec("see [the docs](https://example.com/docs)")
        .unwrap();

    assert_eq!(
        result.rows[0].cell.first_link(),
        Some("https://example.com/docs")
    );

    // セルレベルのハイパーリンク注釈
    let sheet = readback::read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<hyperlinks>"));
    assert!(sheet.contains("ref=\"A1\""));

    // 外部リレーション
    let rels = readback::read_part(&bytes, "xl/worksheets/_rels/sheet1.xml.rels");
    assert!(rels.contains("Target=\"https://example.com/docs\""));
    assert!(rels.contains("TargetMode=\"External\""));

    // ランには視覚的なリンク書式（下線）が付く
    let sst = readback::read_part(&bytes, "xl/sharedStrings.xml");
    assert!(sst.contains("<u/>"));
}

#[test]
fn test_visual_only_drops_hyperlink_but_keeps_text() {
    let converter = ConverterBuilder::new()
        .with_link_style(LinkStyle::VisualOnly)
        .build()
        .unwrap();
    let (bytes, _) = converter
        .convert_to_vec("see [the docs](https://example.com/docs)")
        .unwrap();

    // ハイパーリンク注釈もリレーションも出力されない
    let sheet = readback::read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(!sheet.contains("<hyperlinks>"));
    assert!(!readback::has_part(
        &bytes,
        "xl/worksheets/_rels/sheet1.xml.rels"
    ));

    // テキストは保持される
    let cells = readback::read_column_a(&bytes, "Sheet1");
    assert_eq!(cells, vec!["see the docs"]);
}

#[test]
fn test_byte_identical_output_for_identical_input() {
    let source = "# T\n\npara\n\n- a\n  - n\n- b\n\n| x |\n| - |\n";
    let converter = ConverterBuilder::new().build().unwrap();

    let (first, _) = converter.convert_to_vec(source).unwrap();
    let (second, _) = converter.convert_to_vec(source).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_custom_sheet_name() {
    let converter = ConverterBuilder::new()
        .with_sheet_name("Notes")
        .build()
        .unwrap();
    let (bytes, _) = converter.convert_to_vec("content").unwrap();

    let mut workbook = readback::open_workbook(&bytes);
    assert_eq!(workbook.sheet_names(), vec!["Notes".to_string()]);
    let range = workbook.worksheet_range("Notes").unwrap();
    assert_eq!(range.get_value((0, 0)), Some(&Data::String("content".to_string())));
}

#[test]
fn test_timestamp_emitted_only_when_configured() {
    use chrono::TimeZone;

    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, _) = converter.convert_to_vec("x").unwrap();
    let core = readback::read_part(&bytes, "docProps/core.xml");
    assert!(!core.contains("dcterms:created"));

    let stamped = ConverterBuilder::new()
        .with_creation_timestamp(chrono::Utc.with_ymd_and_hms(2025, 11, 20, 12, 30, 0).unwrap())
        .build()
        .unwrap();
    let (bytes, _) = stamped.convert_to_vec("x").unwrap();
    let core = readback::read_part(&bytes, "docProps/core.xml");
    assert!(core.contains("<dcterms:created xsi:type=\"dcterms:W3CDTF\">2025-11-20T12:30:00Z</dcterms:created>"));
}

#[test]
fn test_code_block_preserves_line_breaks_in_cell() {
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, result) = converter
        .convert_to_vec("```\nline1\nline2\n```")
        .unwrap();

    assert_eq!(result.rows[0].kind, RowKind::Code);

    let cells = readback::read_column_a(&bytes, "Sheet1");
    assert_eq!(cells, vec!["line1\nline2"]);

    // コード行は折り返しあり + Consolas
    let styles = readback::read_part(&bytes, "xl/styles.xml");
    assert!(styles.contains("wrapText=\"1\""));
    assert!(styles.contains("Consolas"));
}

#[test]
fn test_thematic_break_produces_styled_empty_row() {
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, result) = converter.convert_to_vec("a\n\n---\n\nb").unwrap();

    assert_eq!(result.rows.len(), 3);
    assert_eq!(result.rows[1].kind, RowKind::Rule);

    let cells = readback::read_column_a(&bytes, "Sheet1");
    assert_eq!(cells, vec!["a", "", "b"]);

    // 水平線の黒塗り
    let styles = readback::read_part(&bytes, "xl/styles.xml");
    assert!(styles.contains("FF000000"));
}

#[test]
fn test_blockquote_fill_present() {
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, _) = converter.convert_to_vec("> quoted").unwrap();

    let styles = readback::read_part(&bytes, "xl/styles.xml");
    assert!(styles.contains("FFA09BBB"));
}

#[test]
fn test_heading_scale_disabled() {
    let converter = ConverterBuilder::new()
        .with_heading_scale(false)
        .build()
        .unwrap();
    let (bytes, _) = converter.convert_to_vec("# Title").unwrap();

    let sst = readback::read_part(&bytes, "xl/sharedStrings.xml");
    // 太字は維持、サイズは本文のまま
    assert!(sst.contains("<b/>"));
    assert!(sst.contains("sz val=\"11\""));
    assert!(!sst.contains("sz val=\"26\""));
}

#[test]
fn test_unicode_content_round_trip() {
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, _) = converter
        .convert_to_vec("# 見出し\n\n日本語の**太字**テキスト")
        .unwrap();

    let cells = readback::read_column_a(&bytes, "Sheet1");
    assert_eq!(cells, vec!["見出し", "日本語の太字テキスト"]);
}

#[test]
fn test_xml_special_characters_escaped_and_round_tripped() {
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, _) = converter.convert_to_vec("a < b & \"c\" > d").unwrap();

    let cells = readback::read_column_a(&bytes, "Sheet1");
    assert_eq!(cells, vec!["a < b & \"c\" > d"]);
}

#[test]
fn test_shared_strings_deduplicated() {
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, _) = converter
        .convert_to_vec("same\n\nsame\n\nsame")
        .unwrap();

    let sst = readback::read_part(&bytes, "xl/sharedStrings.xml");
    assert!(sst.contains("count=\"3\""));
    assert!(sst.contains("uniqueCount=\"1\""));
}

#[test]
fn test_convert_file_atomic_write() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.md");
    let output_path = dir.path().join("output.xlsx");
    std::fs::write(&input_path, "# File Test\n\n- a\n- b").unwrap();

    let converter = ConverterBuilder::new().build().unwrap();
    let result = converter.convert_file(&input_path, &output_path).unwrap();

    assert_eq!(result.rows.len(), 3);
    assert!(output_path.exists());
    // 一時ファイルは残らない
    assert!(!dir.path().join("output.xlsx.tmp").exists());

    // 書き込まれたファイルが読み戻せる
    let bytes = std::fs::read(&output_path).unwrap();
    let cells = readback::read_column_a(&bytes, "Sheet1");
    assert_eq!(cells, vec!["File Test", "a", "b"]);
}

#[test]
fn test_multiple_links_first_wins_for_cell_annotation() {
    let converter = ConverterBuilder::new().build().unwrap();
    let (bytes, _) = converter
        .convert_to_vec("[one](https://one.example) and [two](https://two.example)")
        .unwrap();

    let sheet = readback::read_part(&bytes, "xl/worksheets/sheet1.xml");
    // セル注釈は1件のみ
    assert_eq!(sheet.matches("<hyperlink ").count(), 1);

    let rels = readback::read_part(&bytes, "xl/worksheets/_rels/sheet1.xml.rels");
    assert!(rels.contains("https://one.example"));
    // 2つ目のリンクはセル注釈には使われない
    assert!(!rels.contains("https://two.example"));
}
