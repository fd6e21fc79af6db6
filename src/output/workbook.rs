//! Workbook Writer Module
//!
//! 変換結果（行・リッチテキストセル・警告）をXLSXコンテナへ書き出す
//! モジュール。リッチテキストランは`xl/sharedStrings.xml`の
//! `<si><r><rPr>`として、インデントはセルフォーマットの`indent`属性
//! として出力されます。テキスト自体に先頭空白を加えないため、セル
//! テキストのラウンドトリップ不変条件が保たれます。

use std::collections::HashMap;
use std::io::{Seek, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use unicode_width::UnicodeWidthStr;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::api::LinkStyle;
use crate::builder::ConversionConfig;
use crate::error::MdToXlsxError;
use crate::limits::WorksheetLimits;
use crate::output::styles::{xml_err, StyleRegistry, BODY_SIZE, HEADING_SIZES};
use crate::types::{ConversionResult, RichTextCell, RowKind};

/// 列幅の下限（文字数基準のおおよその単位）
const MIN_COLUMN_WIDTH: usize = 10;

/// 列幅の上限
const MAX_COLUMN_WIDTH: usize = 120;

/// リンクランの文字色（ARGB）
const LINK_COLOR: &str = "FF382DA0";

/// `[Content_Types].xml`（固定内容）
const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
    r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
    r#"</Types>"#,
);

/// `_rels/.rels`（固定内容）
const ROOT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>"#,
    r#"</Relationships>"#,
);

/// `xl/_rels/workbook.xml.rels`（固定内容）
const WORKBOOK_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
    r#"</Relationships>"#,
);

/// `docProps/app.xml`（固定内容）
const APP_PROPS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
    r#"<Application>mdxlsx</Application>"#,
    r#"</Properties>"#,
);

/// XLSXコンテナライター
///
/// 変換結果を受け取り、OOXML SpreadsheetMLの各パートを組み立てて
/// ZIPアーカイブへ書き込みます。同一入力・同一設定からの出力は
/// バイト単位で一致します（タイムスタンプは設定されたときのみ出力）。
pub(crate) struct WorkbookWriter<'a> {
    config: &'a ConversionConfig,
    limits: WorksheetLimits,
}

impl<'a> WorkbookWriter<'a> {
    /// 新しいライターを生成
    pub fn new(config: &'a ConversionConfig) -> Self {
        Self {
            config,
            limits: WorksheetLimits::default(),
        }
    }

    /// 変換結果をXLSXとして書き込む
    ///
    /// # 引数
    ///
    /// * `result` - レイアウト済みの変換結果
    /// * `writer` - 出力先（Write + Seekトレイトを実装）
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 書き込みに成功した場合
    /// * `Err(MdToXlsxError)` - 容量超過または書き込みエラーが発生した場合
    pub fn write<W: Write + Seek>(
        &self,
        result: &ConversionResult,
        writer: W,
    ) -> Result<(), MdToXlsxError> {
        // 1. 容量チェック（破損ファイルを書き出す前に失敗させる）
        self.limits.check_row_count(result.rows.len() as u64)?;
        for (index, row) in result.rows.iter().enumerate() {
            self.limits
                .check_cell_chars(index, row.cell.char_count() as u64)?;
        }

        // 2. 共有文字列とセルフォーマットの登録（初回使用順で決定的）
        let mut strings = SharedStrings::new();
        let mut styles = StyleRegistry::new(self.config.heading_scale);
        let mut cell_records = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            let scale = match row.kind {
                RowKind::Heading(level) if self.config.heading_scale => Some(level),
                _ => None,
            };
            let string_index = if row.cell.is_empty() {
                None
            } else {
                Some(strings.intern(&row.cell, scale))
            };
            let xf = styles.xf_for_row(row.kind, self.limits.clamp_indent(row.indent_level));
            cell_records.push(CellRecord { string_index, xf });
        }

        // 3. セルレベルのハイパーリンク注釈の収集
        let hyperlinks = self.collect_hyperlinks(result);

        // 4. 各パートをZIPコンテナへ書き込み
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        add_part(&mut zip, "[Content_Types].xml", CONTENT_TYPES_XML.as_bytes(), options)?;
        add_part(&mut zip, "_rels/.rels", ROOT_RELS_XML.as_bytes(), options)?;
        add_part(&mut zip, "docProps/core.xml", &self.core_props_xml()?, options)?;
        add_part(&mut zip, "docProps/app.xml", APP_PROPS_XML.as_bytes(), options)?;
        add_part(&mut zip, "xl/workbook.xml", &self.workbook_xml()?, options)?;
        add_part(
            &mut zip,
            "xl/_rels/workbook.xml.rels",
            WORKBOOK_RELS_XML.as_bytes(),
            options,
        )?;
        add_part(&mut zip, "xl/styles.xml", &styles.write_xml()?, options)?;
        add_part(&mut zip, "xl/sharedStrings.xml", &strings.write_xml()?, options)?;
        add_part(
            &mut zip,
            "xl/worksheets/sheet1.xml",
            &self.sheet_xml(result, &cell_records, &hyperlinks)?,
            options,
        )?;
        if !hyperlinks.targets.is_empty() {
            add_part(
                &mut zip,
                "xl/worksheets/_rels/sheet1.xml.rels",
                &sheet_rels_xml(&hyperlinks)?,
                options,
            )?;
        }

        zip.finish().map_err(zip_err)?;
        Ok(())
    }

    /// リンクを含むセルからハイパーリンク注釈を収集
    ///
    /// `LinkStyle::VisualOnly`の場合は何も収集しない（URLは破棄され、
    /// テキストとランの視覚的書式のみが残る）。
    fn collect_hyperlinks(&self, result: &ConversionResult) -> Hyperlinks {
        let mut hyperlinks = Hyperlinks::default();
        if self.config.link_style != LinkStyle::CellHyperlink {
            return hyperlinks;
        }
        for (index, row) in result.rows.iter().enumerate() {
            if let Some(href) = row.cell.first_link() {
                let rel = hyperlinks.rel_for(href);
                hyperlinks.cells.push((index, rel));
            }
        }
        hyperlinks
    }

    /// `docProps/core.xml`を生成
    fn core_props_xml(&self) -> Result<Vec<u8>, MdToXlsxError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_err)?;

        let mut root = BytesStart::new("cp:coreProperties");
        root.push_attribute((
            "xmlns:cp",
            "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
        ));
        root.push_attribute(("xmlns:dc", "http://purl.org/dc/elements/1.1/"));
        root.push_attribute(("xmlns:dcterms", "http://purl.org/dc/terms/"));
        root.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
        writer.write_event(Event::Start(root)).map_err(xml_err)?;

        writer
            .write_event(Event::Start(BytesStart::new("dc:creator")))
            .map_err(xml_err)?;
        writer
            .write_event(Event::Text(BytesText::new("mdxlsx")))
            .map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("dc:creator")))
            .map_err(xml_err)?;

        // タイムスタンプは設定されたときのみ出力する。デフォルトでは
        // 省略されるため、同一入力からの出力はバイト単位で一致する
        if let Some(timestamp) = &self.config.creation_timestamp {
            let stamp = timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string();
            for element in ["dcterms:created", "dcterms:modified"] {
                let mut start = BytesStart::new(element);
                start.push_attribute(("xsi:type", "dcterms:W3CDTF"));
                writer.write_event(Event::Start(start)).map_err(xml_err)?;
                writer
                    .write_event(Event::Text(BytesText::new(&stamp)))
                    .map_err(xml_err)?;
                writer
                    .write_event(Event::End(BytesEnd::new(element)))
                    .map_err(xml_err)?;
            }
        }

        writer
            .write_event(Event::End(BytesEnd::new("cp:coreProperties")))
            .map_err(xml_err)?;
        Ok(writer.into_inner())
    }

    /// `xl/workbook.xml`を生成
    fn workbook_xml(&self) -> Result<Vec<u8>, MdToXlsxError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_err)?;

        let mut root = BytesStart::new("workbook");
        root.push_attribute((
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        ));
        root.push_attribute((
            "xmlns:r",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        ));
        writer.write_event(Event::Start(root)).map_err(xml_err)?;

        writer
            .write_event(Event::Start(BytesStart::new("sheets")))
            .map_err(xml_err)?;
        let mut sheet = BytesStart::new("sheet");
        sheet.push_attribute(("name", self.config.sheet_name.as_str()));
        sheet.push_attribute(("sheetId", "1"));
        sheet.push_attribute(("r:id", "rId1"));
        writer.write_event(Event::Empty(sheet)).map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("sheets")))
            .map_err(xml_err)?;

        writer
            .write_event(Event::End(BytesEnd::new("workbook")))
            .map_err(xml_err)?;
        Ok(writer.into_inner())
    }

    /// `xl/worksheets/sheet1.xml`を生成
    fn sheet_xml(
        &self,
        result: &ConversionResult,
        cell_records: &[CellRecord],
        hyperlinks: &Hyperlinks,
    ) -> Result<Vec<u8>, MdToXlsxError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_err)?;

        let mut root = BytesStart::new("worksheet");
        root.push_attribute((
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        ));
        root.push_attribute((
            "xmlns:r",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        ));
        writer.write_event(Event::Start(root)).map_err(xml_err)?;

        // 1. 列幅（内容の表示幅から計算）
        let width = column_width(result).to_string();
        writer
            .write_event(Event::Start(BytesStart::new("cols")))
            .map_err(xml_err)?;
        let mut col = BytesStart::new("col");
        col.push_attribute(("min", "1"));
        col.push_attribute(("max", "1"));
        col.push_attribute(("width", width.as_str()));
        col.push_attribute(("customWidth", "1"));
        writer.write_event(Event::Empty(col)).map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("cols")))
            .map_err(xml_err)?;

        // 2. 行データ
        writer
            .write_event(Event::Start(BytesStart::new("sheetData")))
            .map_err(xml_err)?;
        for (index, record) in cell_records.iter().enumerate() {
            let row_number = (index + 1).to_string();
            let mut row = BytesStart::new("row");
            row.push_attribute(("r", row_number.as_str()));
            writer.write_event(Event::Start(row)).map_err(xml_err)?;

            let cell_ref = format!("A{}", index + 1);
            let style_index = record.xf.to_string();
            let mut cell = BytesStart::new("c");
            cell.push_attribute(("r", cell_ref.as_str()));
            cell.push_attribute(("s", style_index.as_str()));
            match record.string_index {
                Some(string_index) => {
                    cell.push_attribute(("t", "s"));
                    writer.write_event(Event::Start(cell)).map_err(xml_err)?;
                    writer
                        .write_event(Event::Start(BytesStart::new("v")))
                        .map_err(xml_err)?;
                    writer
                        .write_event(Event::Text(BytesText::new(&string_index.to_string())))
                        .map_err(xml_err)?;
                    writer
                        .write_event(Event::End(BytesEnd::new("v")))
                        .map_err(xml_err)?;
                    writer
                        .write_event(Event::End(BytesEnd::new("c")))
                        .map_err(xml_err)?;
                }
                // 空セル（水平線など）はスタイルのみ
                None => writer.write_event(Event::Empty(cell)).map_err(xml_err)?,
            }

            writer
                .write_event(Event::End(BytesEnd::new("row")))
                .map_err(xml_err)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("sheetData")))
            .map_err(xml_err)?;

        // 3. ハイパーリンク注釈（存在する場合のみ、sheetDataの後）
        if !hyperlinks.cells.is_empty() {
            writer
                .write_event(Event::Start(BytesStart::new("hyperlinks")))
                .map_err(xml_err)?;
            for (row_index, rel_index) in &hyperlinks.cells {
                let mut link = BytesStart::new("hyperlink");
                let cell_ref = format!("A{}", row_index + 1);
                let rel_id = format!("rId{}", rel_index + 1);
                link.push_attribute(("ref", cell_ref.as_str()));
                link.push_attribute(("r:id", rel_id.as_str()));
                writer.write_event(Event::Empty(link)).map_err(xml_err)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("hyperlinks")))
                .map_err(xml_err)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("worksheet")))
            .map_err(xml_err)?;
        Ok(writer.into_inner())
    }
}

/// 行ごとのセル出力情報
struct CellRecord {
    /// 共有文字列インデックス（空セルはNone）
    string_index: Option<u32>,
    /// セルフォーマット（xf）インデックス
    xf: u32,
}

/// ハイパーリンク注釈の収集結果
#[derive(Default)]
struct Hyperlinks {
    /// 重複排除済みのリンク先URL（リレーション順）
    targets: Vec<String>,
    /// (行インデックス, targetsへのインデックス)
    cells: Vec<(usize, usize)>,
}

impl Hyperlinks {
    /// URLに対応するリレーションインデックスを取得（なければ登録）
    fn rel_for(&mut self, href: &str) -> usize {
        if let Some(index) = self.targets.iter().position(|t| t == href) {
            return index;
        }
        self.targets.push(href.to_string());
        self.targets.len() - 1
    }
}

/// `xl/worksheets/_rels/sheet1.xml.rels`を生成
fn sheet_rels_xml(hyperlinks: &Hyperlinks) -> Result<Vec<u8>, MdToXlsxError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_err)?;

    let mut root = BytesStart::new("Relationships");
    root.push_attribute((
        "xmlns",
        "http://schemas.openxmlformats.org/package/2006/relationships",
    ));
    writer.write_event(Event::Start(root)).map_err(xml_err)?;

    for (index, target) in hyperlinks.targets.iter().enumerate() {
        let mut rel = BytesStart::new("Relationship");
        let rel_id = format!("rId{}", index + 1);
        rel.push_attribute(("Id", rel_id.as_str()));
        rel.push_attribute((
            "Type",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink",
        ));
        rel.push_attribute(("Target", target.as_str()));
        rel.push_attribute(("TargetMode", "External"));
        writer.write_event(Event::Empty(rel)).map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("Relationships")))
        .map_err(xml_err)?;
    Ok(writer.into_inner())
}

/// 列幅を計算
///
/// 全セルの行単位の表示幅（全角文字は2、半角文字は1）の最大値を
/// `[MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH]`へクランプして返します。
fn column_width(result: &ConversionResult) -> usize {
    let content_width = result
        .rows
        .iter()
        .flat_map(|row| {
            let text = row.cell.flatten();
            text.lines().map(|line| line.width()).collect::<Vec<_>>()
        })
        .max()
        .unwrap_or(0);
    (content_width + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

/// パートをZIPアーカイブへ追加
fn add_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    data: &[u8],
    options: FileOptions,
) -> Result<(), MdToXlsxError> {
    zip.start_file(name, options).map_err(zip_err)?;
    zip.write_all(data)?;
    Ok(())
}

/// ZIPエラーをクレートのエラー型へ変換
fn zip_err(e: zip::result::ZipError) -> MdToXlsxError {
    MdToXlsxError::Zip(e.to_string())
}

/// フォントサイズのクラス（行種別から導出）
///
/// 共有文字列はラン書式込みで重複排除されるため、同じテキストでも
/// 見出しと本文では別エントリになる必要があります。
type FontScale = Option<u8>;

/// 共有文字列の登録表
///
/// エントリは初回使用順に登録されるため、同一入力からの出力は
/// 常に同一になります。
struct SharedStrings {
    entries: Vec<(RichTextCell, FontScale)>,
    index: HashMap<(RichTextCell, FontScale), u32>,
    total_refs: u64,
}

impl SharedStrings {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            total_refs: 0,
        }
    }

    /// セル内容を登録してインデックスを取得
    fn intern(&mut self, cell: &RichTextCell, scale: FontScale) -> u32 {
        self.total_refs += 1;
        let key = (cell.clone(), scale);
        if let Some(&index) = self.index.get(&key) {
            return index;
        }
        let index = self.entries.len() as u32;
        self.entries.push(key.clone());
        self.index.insert(key, index);
        index
    }

    /// `xl/sharedStrings.xml`を生成
    fn write_xml(&self) -> Result<Vec<u8>, MdToXlsxError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_err)?;

        let count = self.total_refs.to_string();
        let unique_count = self.entries.len().to_string();
        let mut root = BytesStart::new("sst");
        root.push_attribute((
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        ));
        root.push_attribute(("count", count.as_str()));
        root.push_attribute(("uniqueCount", unique_count.as_str()));
        writer.write_event(Event::Start(root)).map_err(xml_err)?;

        for (cell, scale) in &self.entries {
            writer
                .write_event(Event::Start(BytesStart::new("si")))
                .map_err(xml_err)?;

            let runs = cell.runs();
            let is_simple = scale.is_none() && runs.len() == 1 && runs[0].attrs.is_plain();
            if is_simple {
                // 書式なしの単一ランは単純な<t>として出力
                write_text_element(&mut writer, &runs[0].text)?;
            } else {
                for run in runs {
                    writer
                        .write_event(Event::Start(BytesStart::new("r")))
                        .map_err(xml_err)?;
                    write_run_properties(&mut writer, run, *scale)?;
                    write_text_element(&mut writer, &run.text)?;
                    writer
                        .write_event(Event::End(BytesEnd::new("r")))
                        .map_err(xml_err)?;
                }
            }

            writer
                .write_event(Event::End(BytesEnd::new("si")))
                .map_err(xml_err)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("sst")))
            .map_err(xml_err)?;
        Ok(writer.into_inner())
    }
}

/// `<t xml:space="preserve">`要素を書き込む
///
/// セルテキストは改行や先頭・末尾の空白を含み得るため、常に空白保持を
/// 指定します。
fn write_text_element(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<(), MdToXlsxError> {
    let mut t = BytesStart::new("t");
    t.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(t)).map_err(xml_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("t")))
        .map_err(xml_err)?;
    Ok(())
}

/// ランの`<rPr>`書式プロパティを書き込む
///
/// リッチテキストランのフォント指定はセルフォントへフォールバック
/// しないレンダラーがあるため、常に完全なフォント定義を出力します。
fn write_run_properties(
    writer: &mut Writer<Vec<u8>>,
    run: &crate::types::StyleRun,
    scale: FontScale,
) -> Result<(), MdToXlsxError> {
    writer
        .write_event(Event::Start(BytesStart::new("rPr")))
        .map_err(xml_err)?;

    if run.attrs.bold {
        writer
            .write_event(Event::Empty(BytesStart::new("b")))
            .map_err(xml_err)?;
    }
    if run.attrs.italic {
        writer
            .write_event(Event::Empty(BytesStart::new("i")))
            .map_err(xml_err)?;
    }
    if run.attrs.strikethrough {
        writer
            .write_event(Event::Empty(BytesStart::new("strike")))
            .map_err(xml_err)?;
    }
    if run.attrs.link.is_some() {
        writer
            .write_event(Event::Empty(BytesStart::new("u")))
            .map_err(xml_err)?;
    }

    let size = match scale {
        Some(level) => HEADING_SIZES[usize::from(level.clamp(1, 6)) - 1],
        None => BODY_SIZE,
    };
    let mut sz = BytesStart::new("sz");
    let formatted = if size.fract() == 0.0 {
        format!("{}", size as u64)
    } else {
        format!("{}", size)
    };
    sz.push_attribute(("val", formatted.as_str()));
    writer.write_event(Event::Empty(sz)).map_err(xml_err)?;

    if run.attrs.link.is_some() {
        let mut color = BytesStart::new("color");
        color.push_attribute(("rgb", LINK_COLOR));
        writer.write_event(Event::Empty(color)).map_err(xml_err)?;
    }

    let (font_name, family) = if run.attrs.monospace {
        ("Consolas", "3")
    } else {
        ("Calibri", "2")
    };
    let mut font = BytesStart::new("rFont");
    font.push_attribute(("val", font_name));
    writer.write_event(Event::Empty(font)).map_err(xml_err)?;
    let mut fam = BytesStart::new("family");
    fam.push_attribute(("val", family));
    writer.write_event(Event::Empty(fam)).map_err(xml_err)?;

    writer
        .write_event(Event::End(BytesEnd::new("rPr")))
        .map_err(xml_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Row, StyleAttributeSet, StyleRun};

    fn plain_cell(text: &str) -> RichTextCell {
        RichTextCell::build(vec![StyleRun::plain(text.to_string())])
    }

    #[test]
    fn test_shared_strings_dedup() {
        let mut strings = SharedStrings::new();
        let a = strings.intern(&plain_cell("x"), None);
        let b = strings.intern(&plain_cell("x"), None);
        let c = strings.intern(&plain_cell("y"), None);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(strings.entries.len(), 2);
        assert_eq!(strings.total_refs, 3);
    }

    #[test]
    fn test_shared_strings_distinguish_font_scale() {
        // 同じテキストでも見出しと本文は別エントリになる
        let mut strings = SharedStrings::new();
        let body = strings.intern(&plain_cell("x"), None);
        let heading = strings.intern(&plain_cell("x"), Some(1));
        assert_ne!(body, heading);
    }

    #[test]
    fn test_shared_strings_xml_simple_text() {
        let mut strings = SharedStrings::new();
        strings.intern(&plain_cell("hello"), None);
        let xml = String::from_utf8(strings.write_xml().unwrap()).unwrap();

        assert!(xml.contains("uniqueCount=\"1\""));
        assert!(xml.contains("<t xml:space=\"preserve\">hello</t>"));
        // 書式なしの単一ランはリッチランにならない
        assert!(!xml.contains("<r>"));
    }

    #[test]
    fn test_shared_strings_xml_rich_runs() {
        let cell = RichTextCell::build(vec![
            StyleRun::new("bold".to_string(), StyleAttributeSet::plain().with_bold()),
            StyleRun::plain(" rest".to_string()),
        ]);
        let mut strings = SharedStrings::new();
        strings.intern(&cell, None);
        let xml = String::from_utf8(strings.write_xml().unwrap()).unwrap();

        assert!(xml.contains("<r><rPr><b/>"));
        assert!(xml.contains("<t xml:space=\"preserve\">bold</t>"));
        assert!(xml.contains("<t xml:space=\"preserve\"> rest</t>"));
    }

    #[test]
    fn test_shared_strings_xml_escapes_markup() {
        let mut strings = SharedStrings::new();
        strings.intern(&plain_cell("a < b & c"), None);
        let xml = String::from_utf8(strings.write_xml().unwrap()).unwrap();

        assert!(xml.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_link_run_properties() {
        let cell = RichTextCell::build(vec![StyleRun::new(
            "here".to_string(),
            StyleAttributeSet::plain().with_link("https://example.com"),
        )]);
        let mut strings = SharedStrings::new();
        strings.intern(&cell, None);
        let xml = String::from_utf8(strings.write_xml().unwrap()).unwrap();

        assert!(xml.contains("<u/>"));
        assert!(xml.contains(LINK_COLOR));
    }

    #[test]
    fn test_monospace_run_uses_consolas() {
        let cell = RichTextCell::build(vec![StyleRun::new(
            "code".to_string(),
            StyleAttributeSet::plain().with_monospace(),
        )]);
        let mut strings = SharedStrings::new();
        strings.intern(&cell, None);
        let xml = String::from_utf8(strings.write_xml().unwrap()).unwrap();

        assert!(xml.contains("rFont val=\"Consolas\""));
        assert!(xml.contains("family val=\"3\""));
    }

    #[test]
    fn test_hyperlinks_dedup_targets() {
        let mut hyperlinks = Hyperlinks::default();
        let a = hyperlinks.rel_for("https://example.com");
        let b = hyperlinks.rel_for("https://example.com");
        let c = hyperlinks.rel_for("https://other.example");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(hyperlinks.targets.len(), 2);
    }

    #[test]
    fn test_column_width_clamping() {
        // 空の結果は下限
        let empty = ConversionResult::default();
        assert_eq!(column_width(&empty), MIN_COLUMN_WIDTH);

        // 長い内容は上限でクランプされる
        let long = ConversionResult {
            rows: vec![Row::new(
                0,
                RowKind::Paragraph,
                plain_cell(&"x".repeat(500)),
            )],
            warnings: vec![],
        };
        assert_eq!(column_width(&long), MAX_COLUMN_WIDTH);
    }

    #[test]
    fn test_column_width_uses_longest_line() {
        // 複数行セルは行単位で幅を測る
        let result = ConversionResult {
            rows: vec![Row::new(
                0,
                RowKind::Code,
                plain_cell("short\na much longer line here"),
            )],
            warnings: vec![],
        };
        assert_eq!(column_width(&result), "a much longer line here".len() + 2);
    }

    #[test]
    fn test_column_width_counts_wide_chars() {
        // 全角文字は幅2として数える
        let result = ConversionResult {
            rows: vec![Row::new(0, RowKind::Paragraph, plain_cell("日本語のテキスト"))],
            warnings: vec![],
        };
        assert_eq!(column_width(&result), 8 * 2 + 2);
    }
}
