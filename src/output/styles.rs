//! Cell Styles Module
//!
//! セルレベルのフォーマット（xfレコード）を重複排除しながら登録し、
//! `xl/styles.xml`を生成するモジュール。ランレベルの書式は共有文字列の
//! `<rPr>`に直接書かれるため、ここで扱うのはフォント・塗り・
//! インデント配置といったセル単位のスタイルのみです。

use std::collections::HashMap;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::MdToXlsxError;
use crate::types::RowKind;

/// 見出しレベル1〜6のフォントサイズ（ポイント）
pub(crate) const HEADING_SIZES: [f64; 6] = [26.0, 22.0, 18.0, 16.0, 14.0, 12.0];

/// 本文フォントサイズ（ポイント）
pub(crate) const BODY_SIZE: f64 = 11.0;

/// 引用ブロックの塗り色（ARGB)
const QUOTE_FILL: &str = "FFA09BBB";

/// 水平線の塗り色（ARGB）
const RULE_FILL: &str = "FF000000";

/// セルフォント定義
#[derive(Debug, Clone, PartialEq)]
struct CellFont {
    name: &'static str,
    size: f64,
    family: u8,
}

impl CellFont {
    fn body() -> Self {
        Self {
            name: "Calibri",
            size: BODY_SIZE,
            family: 2,
        }
    }

    fn heading(level: u8) -> Self {
        let index = usize::from(level.clamp(1, 6)) - 1;
        Self {
            name: "Calibri",
            size: HEADING_SIZES[index],
            family: 2,
        }
    }

    fn code() -> Self {
        Self {
            name: "Consolas",
            size: BODY_SIZE,
            family: 3,
        }
    }
}

/// セル塗り定義
#[derive(Debug, Clone, PartialEq, Eq)]
enum Fill {
    None,
    Gray125,
    Solid(&'static str),
}

/// セルフォーマット（xf）レコード
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CellXf {
    font_id: u32,
    fill_id: u32,
    indent: u32,
    wrap_text: bool,
}

/// セルスタイルの登録表
///
/// フォーマットは初回使用順に登録されるため、同一入力からの出力は
/// 常に同一になります。
pub(crate) struct StyleRegistry {
    fonts: Vec<CellFont>,
    fills: Vec<Fill>,
    xfs: Vec<CellXf>,
    xf_index: HashMap<CellXf, u32>,
    heading_scale: bool,
}

impl StyleRegistry {
    /// 新しい登録表を生成
    ///
    /// # 引数
    ///
    /// * `heading_scale` - 見出しレベルに応じたフォントサイズを適用するか
    pub fn new(heading_scale: bool) -> Self {
        // インデックス0のフォント／塗り／xfはデフォルト値として予約される。
        // 塗りのインデックス1（gray125）はOOXMLの慣例で必須
        let default_xf = CellXf {
            font_id: 0,
            fill_id: 0,
            indent: 0,
            wrap_text: false,
        };
        let mut xf_index = HashMap::new();
        xf_index.insert(default_xf.clone(), 0);

        Self {
            fonts: vec![CellFont::body()],
            fills: vec![Fill::None, Fill::Gray125],
            xfs: vec![default_xf],
            xf_index,
            heading_scale,
        }
    }

    /// 行の種別とインデントに対応するxfインデックスを取得（なければ登録）
    ///
    /// # 引数
    ///
    /// * `kind` - 行の種別
    /// * `indent` - クランプ済みのインデントレベル
    pub fn xf_for_row(&mut self, kind: RowKind, indent: u32) -> u32 {
        let font = match kind {
            RowKind::Heading(level) if self.heading_scale => CellFont::heading(level),
            RowKind::Code => CellFont::code(),
            _ => CellFont::body(),
        };
        let fill = match kind {
            RowKind::BlockQuote => Fill::Solid(QUOTE_FILL),
            RowKind::Rule => Fill::Solid(RULE_FILL),
            _ => Fill::None,
        };

        let xf = CellXf {
            font_id: self.font_id(font),
            fill_id: self.fill_id(fill),
            indent,
            wrap_text: kind == RowKind::Code,
        };

        if let Some(&index) = self.xf_index.get(&xf) {
            return index;
        }
        let index = self.xfs.len() as u32;
        self.xfs.push(xf.clone());
        self.xf_index.insert(xf, index);
        index
    }

    fn font_id(&mut self, font: CellFont) -> u32 {
        if let Some(index) = self.fonts.iter().position(|f| f == &font) {
            return index as u32;
        }
        self.fonts.push(font);
        (self.fonts.len() - 1) as u32
    }

    fn fill_id(&mut self, fill: Fill) -> u32 {
        if let Some(index) = self.fills.iter().position(|f| f == &fill) {
            return index as u32;
        }
        self.fills.push(fill);
        (self.fills.len() - 1) as u32
    }

    /// `xl/styles.xml`を生成
    pub fn write_xml(&self) -> Result<Vec<u8>, MdToXlsxError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_err)?;

        let mut root = BytesStart::new("styleSheet");
        root.push_attribute((
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        ));
        writer.write_event(Event::Start(root)).map_err(xml_err)?;

        // 1. フォント
        let font_count = self.fonts.len().to_string();
        let mut fonts = BytesStart::new("fonts");
        fonts.push_attribute(("count", font_count.as_str()));
        writer.write_event(Event::Start(fonts)).map_err(xml_err)?;
        for font in &self.fonts {
            writer
                .write_event(Event::Start(BytesStart::new("font")))
                .map_err(xml_err)?;
            let size = format_size(font.size);
            let mut sz = BytesStart::new("sz");
            sz.push_attribute(("val", size.as_str()));
            writer.write_event(Event::Empty(sz)).map_err(xml_err)?;
            let mut name = BytesStart::new("name");
            name.push_attribute(("val", font.name));
            writer.write_event(Event::Empty(name)).map_err(xml_err)?;
            let family_val = font.family.to_string();
            let mut family = BytesStart::new("family");
            family.push_attribute(("val", family_val.as_str()));
            writer.write_event(Event::Empty(family)).map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new("font")))
                .map_err(xml_err)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("fonts")))
            .map_err(xml_err)?;

        // 2. 塗り
        let fill_count = self.fills.len().to_string();
        let mut fills = BytesStart::new("fills");
        fills.push_attribute(("count", fill_count.as_str()));
        writer.write_event(Event::Start(fills)).map_err(xml_err)?;
        for fill in &self.fills {
            writer
                .write_event(Event::Start(BytesStart::new("fill")))
                .map_err(xml_err)?;
            match fill {
                Fill::None => {
                    let mut pattern = BytesStart::new("patternFill");
                    pattern.push_attribute(("patternType", "none"));
                    writer.write_event(Event::Empty(pattern)).map_err(xml_err)?;
                }
                Fill::Gray125 => {
                    let mut pattern = BytesStart::new("patternFill");
                    pattern.push_attribute(("patternType", "gray125"));
                    writer.write_event(Event::Empty(pattern)).map_err(xml_err)?;
                }
                Fill::Solid(rgb) => {
                    let mut pattern = BytesStart::new("patternFill");
                    pattern.push_attribute(("patternType", "solid"));
                    writer.write_event(Event::Start(pattern)).map_err(xml_err)?;
                    let mut fg = BytesStart::new("fgColor");
                    fg.push_attribute(("rgb", *rgb));
                    writer.write_event(Event::Empty(fg)).map_err(xml_err)?;
                    let mut bg = BytesStart::new("bgColor");
                    bg.push_attribute(("indexed", "64"));
                    writer.write_event(Event::Empty(bg)).map_err(xml_err)?;
                    writer
                        .write_event(Event::End(BytesEnd::new("patternFill")))
                        .map_err(xml_err)?;
                }
            }
            writer
                .write_event(Event::End(BytesEnd::new("fill")))
                .map_err(xml_err)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("fills")))
            .map_err(xml_err)?;

        // 3. 罫線（空の定義1件のみ）
        let mut borders = BytesStart::new("borders");
        borders.push_attribute(("count", "1"));
        writer.write_event(Event::Start(borders)).map_err(xml_err)?;
        writer
            .write_event(Event::Start(BytesStart::new("border")))
            .map_err(xml_err)?;
        for side in ["left", "right", "top", "bottom", "diagonal"] {
            writer
                .write_event(Event::Empty(BytesStart::new(side)))
                .map_err(xml_err)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("border")))
            .map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("borders")))
            .map_err(xml_err)?;

        // 4. cellStyleXfs（デフォルト1件）
        let mut cell_style_xfs = BytesStart::new("cellStyleXfs");
        cell_style_xfs.push_attribute(("count", "1"));
        writer
            .write_event(Event::Start(cell_style_xfs))
            .map_err(xml_err)?;
        let mut xf = BytesStart::new("xf");
        xf.push_attribute(("numFmtId", "0"));
        xf.push_attribute(("fontId", "0"));
        xf.push_attribute(("fillId", "0"));
        xf.push_attribute(("borderId", "0"));
        writer.write_event(Event::Empty(xf)).map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("cellStyleXfs")))
            .map_err(xml_err)?;

        // 5. cellXfs
        let xf_count = self.xfs.len().to_string();
        let mut cell_xfs = BytesStart::new("cellXfs");
        cell_xfs.push_attribute(("count", xf_count.as_str()));
        writer.write_event(Event::Start(cell_xfs)).map_err(xml_err)?;
        for record in &self.xfs {
            let needs_alignment = record.indent > 0 || record.wrap_text;
            let font_id = record.font_id.to_string();
            let fill_id = record.fill_id.to_string();
            let indent = record.indent.to_string();
            let mut xf = BytesStart::new("xf");
            xf.push_attribute(("numFmtId", "0"));
            xf.push_attribute(("fontId", font_id.as_str()));
            xf.push_attribute(("fillId", fill_id.as_str()));
            xf.push_attribute(("borderId", "0"));
            xf.push_attribute(("xfId", "0"));
            if record.font_id != 0 {
                xf.push_attribute(("applyFont", "1"));
            }
            if record.fill_id != 0 {
                xf.push_attribute(("applyFill", "1"));
            }
            if needs_alignment {
                xf.push_attribute(("applyAlignment", "1"));
                writer.write_event(Event::Start(xf)).map_err(xml_err)?;
                let mut alignment = BytesStart::new("alignment");
                if record.indent > 0 {
                    // インデントは水平配置が左のときに有効
                    alignment.push_attribute(("horizontal", "left"));
                    alignment.push_attribute(("indent", indent.as_str()));
                }
                if record.wrap_text {
                    alignment.push_attribute(("wrapText", "1"));
                }
                writer.write_event(Event::Empty(alignment)).map_err(xml_err)?;
                writer
                    .write_event(Event::End(BytesEnd::new("xf")))
                    .map_err(xml_err)?;
            } else {
                writer.write_event(Event::Empty(xf)).map_err(xml_err)?;
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new("cellXfs")))
            .map_err(xml_err)?;

        // 6. cellStyles（Normalのみ）
        let mut cell_styles = BytesStart::new("cellStyles");
        cell_styles.push_attribute(("count", "1"));
        writer
            .write_event(Event::Start(cell_styles))
            .map_err(xml_err)?;
        let mut normal = BytesStart::new("cellStyle");
        normal.push_attribute(("name", "Normal"));
        normal.push_attribute(("xfId", "0"));
        normal.push_attribute(("builtinId", "0"));
        writer.write_event(Event::Empty(normal)).map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("cellStyles")))
            .map_err(xml_err)?;

        writer
            .write_event(Event::End(BytesEnd::new("styleSheet")))
            .map_err(xml_err)?;

        Ok(writer.into_inner())
    }
}

/// フォントサイズの書式化（整数値は小数点なし）
fn format_size(size: f64) -> String {
    if size.fract() == 0.0 {
        format!("{}", size as u64)
    } else {
        format!("{}", size)
    }
}

/// XML書き込みエラーをクレートのエラー型へ変換
pub(crate) fn xml_err<E: std::fmt::Display>(e: E) -> MdToXlsxError {
    MdToXlsxError::Xml(e.to_string())
}
