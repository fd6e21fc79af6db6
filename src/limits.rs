//! Worksheet Limits Module
//!
//! XLSXフォーマットのハードリミットを定義するモジュール。
//! 制限を超える出力が要求された場合、破損したファイルを書き出す代わりに
//! `CapacityExceeded`エラーで予測可能に失敗させるための検証を提供します。

use crate::error::MdToXlsxError;

/// ワークシートの容量制限
///
/// XLSXフォーマット（OOXML SpreadsheetML）自体が定める上限値です。
#[derive(Debug, Clone)]
pub(crate) struct WorksheetLimits {
    /// ワークシートあたりの最大行数
    /// XLSXフォーマットの上限: 1,048,576行
    pub max_rows: u64,
    /// セルあたりの最大文字数
    /// XLSXフォーマットの上限: 32,767文字
    pub max_cell_chars: u64,
    /// セルインデントの最大値
    /// XLSXフォーマットの上限: 250（超過分はクランプされる）
    pub max_indent: u32,
    /// 入力Markdownの最大サイズ（バイト）
    /// デフォルト: 64MB (67_108_864 bytes)
    pub max_input_size: u64,
}

impl Default for WorksheetLimits {
    fn default() -> Self {
        Self {
            max_rows: 1_048_576,
            max_cell_chars: 32_767,
            max_indent: 250,
            max_input_size: 67_108_864, // 64MB
        }
    }
}

impl WorksheetLimits {
    /// 行数が上限以内かを検証
    ///
    /// # 引数
    ///
    /// * `rows` - 出力予定の行数
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 行数が上限以内の場合
    /// * `Err(MdToXlsxError::CapacityExceeded)` - 上限を超えた場合
    pub fn check_row_count(&self, rows: u64) -> Result<(), MdToXlsxError> {
        if rows > self.max_rows {
            return Err(MdToXlsxError::CapacityExceeded {
                detail: format!("row count is {}", rows),
                limit: self.max_rows,
            });
        }
        Ok(())
    }

    /// セルのテキスト長が上限以内かを検証
    ///
    /// # 引数
    ///
    /// * `row_index` - セルの行インデックス（0始まり、エラーメッセージ用）
    /// * `chars` - セルテキストの文字数
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 文字数が上限以内の場合
    /// * `Err(MdToXlsxError::CapacityExceeded)` - 上限を超えた場合
    pub fn check_cell_chars(&self, row_index: usize, chars: u64) -> Result<(), MdToXlsxError> {
        if chars > self.max_cell_chars {
            return Err(MdToXlsxError::CapacityExceeded {
                detail: format!("cell text at row {} is {} characters", row_index, chars),
                limit: self.max_cell_chars,
            });
        }
        Ok(())
    }

    /// インデントレベルをフォーマット上限にクランプ
    ///
    /// インデントはスタイル属性であり、深いネストで変換全体を失敗させる
    /// 理由にはならないため、エラーではなくクランプで処理します。
    pub fn clamp_indent(&self, indent: u32) -> u32 {
        indent.min(self.max_indent)
    }
}

/// シート名の検証
///
/// XLSXフォーマットのシート名規則に従って検証します。
///
/// # 引数
///
/// * `name` - 検証するシート名
///
/// # 戻り値
///
/// * `Ok(())` - シート名が有効な場合
/// * `Err(String)` - シート名が無効な場合（空、31文字超、禁止文字を含む）
pub(crate) fn validate_sheet_name(name: &str) -> Result<(), String> {
    // 空のシート名は拒否
    if name.is_empty() {
        return Err("Sheet name must not be empty".to_string());
    }

    // 31文字を超えるシート名を拒否（XLSXフォーマットの上限）
    if name.chars().count() > 31 {
        return Err(format!(
            "Sheet name exceeds 31 characters: '{}' ({} characters)",
            name,
            name.chars().count()
        ));
    }

    // 禁止文字を含むシート名を拒否
    if let Some(bad) = name.chars().find(|c| matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
    {
        return Err(format!(
            "Sheet name contains forbidden character '{}': '{}'",
            bad, name
        ));
    }

    // 先頭・末尾のアポストロフィを拒否
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(format!(
            "Sheet name must not start or end with an apostrophe: '{}'",
            name
        ));
    }

    Ok(())
}
