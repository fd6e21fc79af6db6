//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use chrono::{DateTime, Utc};
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use crate::api::LinkStyle;
use crate::error::MdToXlsxError;
use crate::limits::{validate_sheet_name, WorksheetLimits};
use crate::types::ConversionResult;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// 出力ワークシート名
    pub sheet_name: String,

    /// ハイパーリンク戦略
    pub link_style: LinkStyle,

    /// 見出しレベルに応じたフォントサイズを適用するか
    pub heading_scale: bool,

    /// docProps/core.xmlへ出力する作成タイムスタンプ
    /// （Option: Noneの場合は省略され、出力は決定的になる）
    pub creation_timestamp: Option<DateTime<Utc>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            link_style: LinkStyle::CellHyperlink,
            heading_scale: true,
            creation_timestamp: None,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみを
/// オーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use mdxlsx::{ConverterBuilder, LinkStyle};
///
/// # fn main() -> Result<(), mdxlsx::MdToXlsxError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_name("Notes")
///     .with_link_style(LinkStyle::VisualOnly)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - ワークシート名: `Sheet1`
    /// - ハイパーリンク: セルレベルの注釈を付与
    /// - 見出しフォントサイズ: レベルに応じて拡大
    /// - 作成タイムスタンプ: 省略（出力は決定的）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use mdxlsx::ConverterBuilder;
    ///
    /// let builder = ConverterBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 出力ワークシート名を指定する
    ///
    /// # 引数
    ///
    /// * `name: &str`: ワークシート名
    ///
    /// # 制約
    ///
    /// * 空でなく、31文字以内であること
    /// * `[ ] : * ? / \` のいずれも含まないこと
    /// * 制約違反の場合、`build()`時に`MdToXlsxError::Config`を返す
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use mdxlsx::ConverterBuilder;
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_name("Notes");
    /// ```
    pub fn with_sheet_name(mut self, name: &str) -> Self {
        self.config.sheet_name = name.to_string();
        self
    }

    /// ハイパーリンクの処理戦略を指定する
    ///
    /// # 引数
    ///
    /// * `style: LinkStyle`: ハイパーリンク戦略
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use mdxlsx::{ConverterBuilder, LinkStyle};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_link_style(LinkStyle::VisualOnly);
    /// ```
    pub fn with_link_style(mut self, style: LinkStyle) -> Self {
        self.config.link_style = style;
        self
    }

    /// 見出しレベルに応じたフォントサイズ拡大を有効／無効にする
    ///
    /// # 引数
    ///
    /// * `scale: bool`:
    ///   * `true`: レベル1〜6を26/22/18/16/14/12ptで出力（デフォルト）
    ///   * `false`: すべての見出しを本文サイズで出力（太字は維持される）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use mdxlsx::ConverterBuilder;
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_heading_scale(false);
    /// ```
    pub fn with_heading_scale(mut self, scale: bool) -> Self {
        self.config.heading_scale = scale;
        self
    }

    /// docProps/core.xmlへ出力する作成タイムスタンプを指定する
    ///
    /// デフォルトではタイムスタンプは省略され、バイト単位で同一の入力は
    /// バイト単位で同一の出力を生成します。タイムスタンプを指定すると
    /// `dcterms:created`／`dcterms:modified`が出力されます。
    ///
    /// # 引数
    ///
    /// * `timestamp: DateTime<Utc>`: 出力するタイムスタンプ
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use chrono::{TimeZone, Utc};
    /// use mdxlsx::ConverterBuilder;
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_creation_timestamp(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    /// ```
    pub fn with_creation_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.config.creation_timestamp = Some(timestamp);
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Converter)`: 設定が有効な場合、Converterインスタンス
    /// * `Err(MdToXlsxError::Config)`: 設定が無効な場合（例: 不正なシート名）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use mdxlsx::ConverterBuilder;
    ///
    /// # fn main() -> Result<(), mdxlsx::MdToXlsxError> {
    /// let converter = ConverterBuilder::new()
    ///     .with_sheet_name("Notes")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Converter, MdToXlsxError> {
        // 1. シート名の検証
        validate_sheet_name(&self.config.sheet_name).map_err(MdToXlsxError::Config)?;

        // 2. Converterインスタンス生成
        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// Markdown文書をXLSX形式に変換するためのメインエントリーポイントです。
/// `ConverterBuilder`を使用して構築された設定に基づいて変換処理を実行
/// します。
///
/// 変換呼び出しごとに専有のビルドコンテキストが使われるため、1つの
/// `Converter`を複数スレッドから同時に使用しても同期は不要です。
///
/// # 使用例
///
/// ```rust,no_run
/// use mdxlsx::ConverterBuilder;
///
/// # fn main() -> Result<(), mdxlsx::MdToXlsxError> {
/// let converter = ConverterBuilder::new().build()?;
/// let result = converter.convert_file("input.md", "output.xlsx")?;
/// for warning in &result.warnings {
///     eprintln!("warning: {} at block {}", warning.kind, warning.block_index);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,

    /// ワークシートの容量制限
    limits: WorksheetLimits,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self {
            limits: WorksheetLimits::default(),
            config,
        }
    }

    /// Markdownテキストを変換して行と警告を返す
    ///
    /// 変換のコア（パース + レイアウト）のみを実行します。シリアライズは
    /// 行わないため、結果の検査や独自の出力処理に使用できます。
    ///
    /// # 引数
    ///
    /// * `markdown` - UTF-8のMarkdownテキスト
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionResult)` - 文書順の行列と警告列
    /// * `Err(MdToXlsxError)` - 入力サイズが上限を超えた場合
    ///
    /// # 処理フロー
    ///
    /// 1. 入力サイズの検証
    /// 2. pulldown-cmarkイベントのブロックツリーへの畳み込み
    /// 3. ブロックツリーの行レイアウト（単一走査）
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use mdxlsx::ConverterBuilder;
    ///
    /// # fn main() -> Result<(), mdxlsx::MdToXlsxError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let result = converter.convert("# Title\n\nbody text")?;
    ///
    /// assert_eq!(result.rows.len(), 2);
    /// assert!(result.warnings.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert(&self, markdown: &str) -> Result<ConversionResult, MdToXlsxError> {
        // 1. 入力サイズの検証
        if markdown.len() as u64 > self.limits.max_input_size {
            return Err(MdToXlsxError::InputTooLarge {
                size: markdown.len() as u64,
                max: self.limits.max_input_size,
            });
        }

        // 2. パース（ブロックツリーの構築）
        let blocks = crate::parser::parse_document(markdown);

        // 3. レイアウト（行と警告の生成）
        Ok(crate::layout::layout_document(&blocks))
    }

    /// 変換結果をXLSXとしてライターへ書き込む
    ///
    /// # 引数
    ///
    /// * `result` - `convert`が返した変換結果
    /// * `writer` - 出力先のライター（Write + Seekトレイトを実装）
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 書き込みに成功した場合
    /// * `Err(MdToXlsxError)` - 容量超過または書き込みエラーが発生した場合
    pub fn write_workbook<W: Write + Seek>(
        &self,
        result: &ConversionResult,
        writer: W,
    ) -> Result<(), MdToXlsxError> {
        crate::output::WorkbookWriter::new(&self.config).write(result, writer)
    }

    /// MarkdownテキストをXLSXとしてライターへ変換する
    ///
    /// # 引数
    ///
    /// * `markdown` - UTF-8のMarkdownテキスト
    /// * `writer` - 出力先のライター（Write + Seekトレイトを実装）
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionResult)` - 変換結果（呼び出し元が警告を報告できる）
    /// * `Err(MdToXlsxError)` - エラーが発生した場合
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use std::io::Cursor;
    /// use mdxlsx::ConverterBuilder;
    ///
    /// # fn main() -> Result<(), mdxlsx::MdToXlsxError> {
    /// let converter = ConverterBuilder::new().build()?;
    /// let mut buffer = Cursor::new(Vec::new());
    /// let result = converter.convert_to_writer("# Title", &mut buffer)?;
    ///
    /// assert!(!buffer.into_inner().is_empty());
    /// assert_eq!(result.rows.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert_to_writer<W: Write + Seek>(
        &self,
        markdown: &str,
        writer: W,
    ) -> Result<ConversionResult, MdToXlsxError> {
        let result = self.convert(markdown)?;
        self.write_workbook(&result, writer)?;
        Ok(result)
    }

    /// MarkdownテキストをXLSXバイト列へ変換する
    ///
    /// # 引数
    ///
    /// * `markdown` - UTF-8のMarkdownテキスト
    ///
    /// # 戻り値
    ///
    /// * `Ok((Vec<u8>, ConversionResult))` - XLSXバイト列と変換結果
    /// * `Err(MdToXlsxError)` - エラーが発生した場合
    pub fn convert_to_vec(
        &self,
        markdown: &str,
    ) -> Result<(Vec<u8>, ConversionResult), MdToXlsxError> {
        let mut buffer = Cursor::new(Vec::new());
        let result = self.convert_to_writer(markdown, &mut buffer)?;
        Ok((buffer.into_inner(), result))
    }

    /// MarkdownファイルをXLSXファイルへ変換する
    ///
    /// 出力はアトミックです。一時ファイル（`<出力名>.tmp`）へ書き込んだ
    /// 後にリネームするため、書き込みに失敗しても既存の出力ファイルが
    /// 部分的に上書きされることはありません。
    ///
    /// # 引数
    ///
    /// * `input` - 入力Markdownファイルのパス
    /// * `output` - 出力XLSXファイルのパス
    ///
    /// # 戻り値
    ///
    /// * `Ok(ConversionResult)` - 変換結果（呼び出し元が警告を報告できる）
    /// * `Err(MdToXlsxError)` - 読み込み・変換・書き込みに失敗した場合
    pub fn convert_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<ConversionResult, MdToXlsxError> {
        let input = input.as_ref();
        let output = output.as_ref();

        // 1. 入力サイズの事前チェック（読み込み前）
        let metadata = std::fs::metadata(input)?;
        if metadata.len() > self.limits.max_input_size {
            return Err(MdToXlsxError::InputTooLarge {
                size: metadata.len(),
                max: self.limits.max_input_size,
            });
        }

        // 2. 読み込みと変換
        let markdown = std::fs::read_to_string(input)?;
        let result = self.convert(&markdown)?;

        // 3. 一時ファイルへの書き込みとリネーム
        let file_name = output.file_name().ok_or_else(|| {
            MdToXlsxError::Config(format!("Output path has no file name: {}", output.display()))
        })?;
        let tmp_path = output.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

        let file = std::fs::File::create(&tmp_path)?;
        match self.write_workbook(&result, file) {
            Ok(()) => {
                std::fs::rename(&tmp_path, output)?;
                Ok(result)
            }
            Err(e) => {
                // 失敗した一時ファイルは残さない
                let _ = std::fs::remove_file(&tmp_path);
                Err(e)
            }
        }
    }
}
