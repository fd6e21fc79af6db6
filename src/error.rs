//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// mdxlsxクレート全体で使用するエラー型
///
/// このエラー型は、Markdown入力の読み込み、変換、XLSX出力処理中に発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（ファイル読み込み失敗など）
/// - `Config`: 設定の検証に失敗したエラー（無効なシート名など）
/// - `Zip`: XLSXコンテナ（ZIPアーカイブ）の書き込みエラー
/// - `Xml`: ワークシートXMLの生成エラー
/// - `CapacityExceeded`: XLSXフォーマットの容量制限を超過したエラー
/// - `InputTooLarge`: 入力サイズが上限を超えたエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use mdxlsx::MdToXlsxError;
/// use std::fs;
///
/// fn read_markdown_file(path: &str) -> Result<String, MdToXlsxError> {
///     let text = fs::read_to_string(path)?;  // Ioエラーが自動的に変換される
///     Ok(text)
/// }
/// ```
#[derive(Error, Debug)]
pub enum MdToXlsxError {
    /// I/O操作中に発生したエラー
    ///
    /// ファイルの読み込み失敗、書き込み失敗など、標準ライブラリの
    /// `std::io::Error`が発生した場合に使用されます。
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。例えば、シート名が空または31文字を超える場合や、
    /// シート名に `[ ] : * ? / \` のいずれかが含まれる場合などです。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use mdxlsx::{ConverterBuilder, MdToXlsxError};
    ///
    /// let result = ConverterBuilder::new()
    ///     .with_sheet_name("bad[name]")  // 無効なシート名
    ///     .build();
    ///
    /// match result {
    ///     Err(MdToXlsxError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// ZIPアーカイブの書き込みエラー
    ///
    /// XLSXファイル（ZIPアーカイブ）の書き込み中に発生したエラーです。
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// XMLの生成エラー
    ///
    /// ワークシートXMLパートの生成中に発生したエラーです。
    #[error("XML write error: {0}")]
    Xml(String),

    /// XLSXフォーマットの容量制限を超過したエラー
    ///
    /// XLSXフォーマットには、ワークシートあたり1,048,576行、セルあたり
    /// 32,767文字というハードリミットがあります。これを超える出力が
    /// 要求された場合、破損したファイルを書き出す代わりにこのエラーを
    /// 返します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use mdxlsx::MdToXlsxError;
    ///
    /// let error = MdToXlsxError::CapacityExceeded {
    ///     detail: "cell text at row 3 is 40000 characters".to_string(),
    ///     limit: 32_767,
    /// };
    ///
    /// println!("{}", error);
    /// // 出力: "Worksheet capacity exceeded: cell text at row 3 is 40000 characters (limit: 32767)"
    /// ```
    #[error("Worksheet capacity exceeded: {detail} (limit: {limit})")]
    CapacityExceeded {
        /// 超過内容の詳細メッセージ
        detail: String,
        /// 超過した制限値
        limit: u64,
    },

    /// 入力サイズが上限を超えたエラー
    ///
    /// `convert_file`で読み込む入力ファイルのサイズが上限を超えた場合に
    /// 発生します。
    #[error("Input size exceeds maximum: {size} bytes (max: {max} bytes)")]
    InputTooLarge {
        /// 実際の入力サイズ（バイト）
        size: u64,
        /// 許容される最大サイズ（バイト）
        max: u64,
    },
}
