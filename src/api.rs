//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// ハイパーリンクの処理戦略
///
/// Markdownのリンクをワークシートセルに変換する際の処理方法を指定します。
/// どちらの戦略でも、リンクテキストのランには視覚的なリンク書式
/// （下線付き・リンク色）が適用されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LinkStyle {
    /// セルレベルのハイパーリンク注釈を付与（デフォルト）
    ///
    /// リンクを含むセルに、XLSXのセルハイパーリンク（クリック可能な
    /// `<hyperlink>`要素）を付与します。1つのセルに複数のリンクがある
    /// 場合、セルハイパーリンクには最初のリンクのURLが使用されます
    /// （各ランの視覚的書式はすべて保持されます）。
    ///
    /// # 利点
    ///
    /// - リンク先がワークシート上でクリック可能
    /// - 元文書のナビゲーションを維持
    CellHyperlink,

    /// 視覚的書式のみ（URLは破棄）
    ///
    /// リンクテキストのランに視覚的なリンク書式のみを適用し、URL自体は
    /// 出力に含めません。テキストは常に保持されます。
    ///
    /// これはエラーではなく、意図的な機能制限です。リンク先情報を
    /// 含めたくない配布用ドキュメントなどで使用します。
    VisualOnly,
}
