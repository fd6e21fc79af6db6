//! Output Module
//!
//! 抽象的な行・セル・スタイルラン列をOOXML SpreadsheetML（XLSX）の
//! バイナリコンテナへ直列化するモジュール。外部ライブラリへの依存を
//! 避け、`zip`と`quick-xml`の上に必要最小限のライターを実装します。

mod styles;
mod workbook;

pub(crate) use workbook::WorkbookWriter;
