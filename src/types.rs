//! Types Module
//!
//! 変換結果を構成する共通データ型を定義するモジュール。
//! ここで定義される型はすべて構築後に変更されない（build-once, read-only）。

use serde::Serialize;

/// インラインツリーのある地点で有効な書式属性の集合
///
/// 書式の合成は集合和（set union）方式です。ネストした書式を結合しても
/// 属性が打ち消されることはありません（太字の中の太字は太字のまま）。
/// 値は不変であり、`with_*`系のメソッドは新しい値を返します。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StyleAttributeSet {
    /// 太字かどうか
    pub bold: bool,
    /// 斜体かどうか
    pub italic: bool,
    /// 等幅（コード）書式かどうか
    pub monospace: bool,
    /// 取り消し線かどうか
    pub strikethrough: bool,
    /// リンク先URL（リンク内のランの場合）
    pub link: Option<String>,
}

impl StyleAttributeSet {
    /// 書式なしの属性集合を生成
    pub fn plain() -> Self {
        Self::default()
    }

    /// 太字を有効にした新しい属性集合を返す
    pub fn with_bold(&self) -> Self {
        Self {
            bold: true,
            ..self.clone()
        }
    }

    /// 斜体を有効にした新しい属性集合を返す
    pub fn with_italic(&self) -> Self {
        Self {
            italic: true,
            ..self.clone()
        }
    }

    /// 等幅書式を有効にした新しい属性集合を返す
    pub fn with_monospace(&self) -> Self {
        Self {
            monospace: true,
            ..self.clone()
        }
    }

    /// 取り消し線を有効にした新しい属性集合を返す
    pub fn with_strikethrough(&self) -> Self {
        Self {
            strikethrough: true,
            ..self.clone()
        }
    }

    /// リンク先URLを設定した新しい属性集合を返す
    pub fn with_link(&self, href: &str) -> Self {
        Self {
            link: Some(href.to_string()),
            ..self.clone()
        }
    }

    /// いずれの書式も有効でないかを判定
    pub fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.monospace && !self.strikethrough && self.link.is_none()
    }
}

/// 同一の書式属性を共有する連続したテキスト範囲（スタイルラン）
///
/// セル内のランの順序は意味を持ち、元文書のテキスト順と一致します。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StyleRun {
    /// テキスト内容（`RichTextCell::build`を通る限り空にならない）
    pub text: String,
    /// 書式属性
    pub attrs: StyleAttributeSet,
}

impl StyleRun {
    /// 新しいStyleRunを生成
    pub fn new(text: String, attrs: StyleAttributeSet) -> Self {
        Self { text, attrs }
    }

    /// 書式なしのランを生成
    pub fn plain(text: String) -> Self {
        Self {
            text,
            attrs: StyleAttributeSet::plain(),
        }
    }
}

/// 1つのセルの内容を表す、スタイルランの不変な順序付き列
///
/// 中心的な不変条件: `flatten()`は構築時に渡されたランのテキストを
/// 順序どおりに連結した文字列と等しい（空ランの除去はテキストを変えない）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct RichTextCell {
    runs: Vec<StyleRun>,
}

impl RichTextCell {
    /// ランの列からセルを構築する
    ///
    /// 空テキストのランは除去されます。除去はテキスト順・内容を一切
    /// 変更しません。
    pub fn build(runs: Vec<StyleRun>) -> Self {
        Self {
            runs: runs.into_iter().filter(|r| !r.text.is_empty()).collect(),
        }
    }

    /// 空のセルを生成
    pub fn empty() -> Self {
        Self { runs: Vec::new() }
    }

    /// ランの列を取得
    pub fn runs(&self) -> &[StyleRun] {
        &self.runs
    }

    /// ランを1つも持たないかを判定
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// すべてのランのテキストを順序どおりに連結して返す
    pub fn flatten(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// セルテキストの文字数（`flatten()`の文字数）
    pub fn char_count(&self) -> usize {
        self.runs.iter().map(|r| r.text.chars().count()).sum()
    }

    /// 最初のリンク付きランのURLを返す
    ///
    /// セルレベルのハイパーリンク注釈に使用されます。1つのセルに複数の
    /// リンクがある場合、最初のもののみが返されます。
    pub fn first_link(&self) -> Option<&str> {
        self.runs.iter().find_map(|r| r.attrs.link.as_deref())
    }
}

/// 行の種別タグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowKind {
    /// 見出し（レベル1〜6）
    Heading(u8),
    /// 段落
    Paragraph,
    /// リスト項目
    ListItem,
    /// 引用ブロック内の段落
    BlockQuote,
    /// コードブロック
    Code,
    /// 水平線
    Rule,
}

/// ワークシートの1行
///
/// ブロックレベル要素1つ（またはリスト項目1つ）に対応します。
/// インデントレベルはセルのインデントスタイル属性として出力され、
/// テキスト自体には含まれません。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// ネスト深度（リスト／引用の包含から導出される非負整数）
    pub indent_level: u32,
    /// 行の種別
    pub kind: RowKind,
    /// セル内容
    pub cell: RichTextCell,
}

impl Row {
    /// 新しいRowを生成
    pub fn new(indent_level: u32, kind: RowKind, cell: RichTextCell) -> Self {
        Self {
            indent_level,
            kind,
            cell,
        }
    }
}

/// サポートされないMarkdown構造の種別
///
/// `Display`は構造の小文字名（`"table"`など）を返します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnsupportedKind {
    /// テーブル
    Table,
    /// 画像
    Image,
    /// HTMLブロック
    HtmlBlock,
    /// インラインHTML
    InlineHtml,
    /// 脚注（定義または参照）
    Footnote,
    /// その他の認識されない構造
    Other,
}

impl std::fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UnsupportedKind::Table => "table",
            UnsupportedKind::Image => "image",
            UnsupportedKind::HtmlBlock => "html-block",
            UnsupportedKind::InlineHtml => "inline-html",
            UnsupportedKind::Footnote => "footnote",
            UnsupportedKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// サポートされない構造をスキップした際の警告
///
/// 警告は致命的ではありません。該当構造のみがスキップされ、前後の
/// 内容は通常どおり変換されます。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    /// スキップされた構造の種別
    pub kind: UnsupportedKind,
    /// 文書順のブロックインデックス（トラバース順、0始まり）
    pub block_index: usize,
    /// 詳細メッセージ
    pub detail: String,
}

impl Warning {
    /// 新しいWarningを生成
    pub fn new(kind: UnsupportedKind, block_index: usize, detail: String) -> Self {
        Self {
            kind,
            block_index,
            detail,
        }
    }
}

/// 変換結果
///
/// 行の列と警告の列を保持します。どちらも文書順です。
/// 変換呼び出しごとに新しく構築され、呼び出し間で共有される状態は
/// ありません。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionResult {
    /// ワークシート行の列（文書順）
    pub rows: Vec<Row>,
    /// 警告の列（文書順）
    pub warnings: Vec<Warning>,
}

impl ConversionResult {
    /// すべての行のセルテキストを改行区切りで連結したプレーンテキスト
    ///
    /// ラウンドトリップ検証に使用します。サポートされる構造のみを含む
    /// 入力では、この値が元文書のフラット化されたプレーンテキストと
    /// 一致します。
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|r| r.cell.flatten())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // StyleAttributeSet のテスト
    #[test]
    fn test_attribute_set_plain() {
        let attrs = StyleAttributeSet::plain();
        assert!(!attrs.bold);
        assert!(!attrs.italic);
        assert!(!attrs.monospace);
        assert!(!attrs.strikethrough);
        assert!(attrs.link.is_none());
        assert!(attrs.is_plain());
    }

    #[test]
    fn test_attribute_set_with_bold() {
        let attrs = StyleAttributeSet::plain().with_bold();
        assert!(attrs.bold);
        assert!(!attrs.italic);
        assert!(!attrs.is_plain());
    }

    #[test]
    fn test_attribute_set_union_semantics() {
        // 太字の中の太字は太字のまま（トグルではなく集合和）
        let attrs = StyleAttributeSet::plain().with_bold().with_bold();
        assert!(attrs.bold);

        // ネストした組み合わせはすべての属性を保持
        let attrs = StyleAttributeSet::plain()
            .with_bold()
            .with_italic()
            .with_strikethrough();
        assert!(attrs.bold);
        assert!(attrs.italic);
        assert!(attrs.strikethrough);
    }

    #[test]
    fn test_attribute_set_immutability() {
        let base = StyleAttributeSet::plain();
        let _derived = base.with_bold();
        // 元の値は変更されない
        assert!(!base.bold);
    }

    #[test]
    fn test_attribute_set_with_link() {
        let attrs = StyleAttributeSet::plain().with_link("https://example.com");
        assert_eq!(attrs.link.as_deref(), Some("https://example.com"));

        // リンク属性は他の属性と共存する
        let attrs = attrs.with_bold();
        assert!(attrs.bold);
        assert_eq!(attrs.link.as_deref(), Some("https://example.com"));
    }

    // StyleRun のテスト
    #[test]
    fn test_style_run_plain() {
        let run = StyleRun::plain("hello".to_string());
        assert_eq!(run.text, "hello");
        assert!(run.attrs.is_plain());
    }

    // RichTextCell のテスト
    #[test]
    fn test_rich_text_cell_build_removes_empty_runs() {
        let runs = vec![
            StyleRun::plain("a".to_string()),
            StyleRun::plain(String::new()),
            StyleRun::plain("b".to_string()),
        ];
        let cell = RichTextCell::build(runs);
        assert_eq!(cell.runs().len(), 2);
        assert_eq!(cell.flatten(), "ab");
    }

    #[test]
    fn test_rich_text_cell_flatten_preserves_order() {
        let runs = vec![
            StyleRun::new("bold ".to_string(), StyleAttributeSet::plain().with_bold()),
            StyleRun::new(
                "and italic".to_string(),
                StyleAttributeSet::plain().with_bold().with_italic(),
            ),
            StyleRun::new(" text".to_string(), StyleAttributeSet::plain().with_bold()),
        ];
        let cell = RichTextCell::build(runs);
        assert_eq!(cell.flatten(), "bold and italic text");
    }

    #[test]
    fn test_rich_text_cell_empty() {
        let cell = RichTextCell::empty();
        assert!(cell.is_empty());
        assert_eq!(cell.flatten(), "");
        assert_eq!(cell.char_count(), 0);
    }

    #[test]
    fn test_rich_text_cell_char_count() {
        let cell = RichTextCell::build(vec![
            StyleRun::plain("abc".to_string()),
            StyleRun::plain("日本語".to_string()),
        ]);
        assert_eq!(cell.char_count(), 6);
    }

    #[test]
    fn test_rich_text_cell_first_link() {
        let cell = RichTextCell::build(vec![
            StyleRun::plain("see ".to_string()),
            StyleRun::new(
                "here".to_string(),
                StyleAttributeSet::plain().with_link("https://first.example"),
            ),
            StyleRun::new(
                "there".to_string(),
                StyleAttributeSet::plain().with_link("https://second.example"),
            ),
        ]);
        // 最初のリンクのみが返される
        assert_eq!(cell.first_link(), Some("https://first.example"));
    }

    #[test]
    fn test_rich_text_cell_first_link_none() {
        let cell = RichTextCell::build(vec![StyleRun::plain("no links".to_string())]);
        assert_eq!(cell.first_link(), None);
    }

    // UnsupportedKind のテスト
    #[test]
    fn test_unsupported_kind_display() {
        assert_eq!(UnsupportedKind::Table.to_string(), "table");
        assert_eq!(UnsupportedKind::Image.to_string(), "image");
        assert_eq!(UnsupportedKind::HtmlBlock.to_string(), "html-block");
        assert_eq!(UnsupportedKind::InlineHtml.to_string(), "inline-html");
        assert_eq!(UnsupportedKind::Footnote.to_string(), "footnote");
        assert_eq!(UnsupportedKind::Other.to_string(), "other");
    }

    // ConversionResult のテスト
    #[test]
    fn test_conversion_result_plain_text() {
        let result = ConversionResult {
            rows: vec![
                Row::new(
                    0,
                    RowKind::Heading(1),
                    RichTextCell::build(vec![StyleRun::plain("Title".to_string())]),
                ),
                Row::new(
                    0,
                    RowKind::Paragraph,
                    RichTextCell::build(vec![StyleRun::plain("Body".to_string())]),
                ),
            ],
            warnings: vec![],
        };
        assert_eq!(result.plain_text(), "Title\nBody");
    }

    #[test]
    fn test_warning_serializes_to_json() {
        let warning = Warning::new(UnsupportedKind::Table, 3, "table skipped".to_string());
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"table\""));
        assert!(json.contains("\"block_index\":3"));
    }

    // プロパティベーステスト
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        // Flatten Round-Trip
        //
        // 任意のラン列について、`build`後の`flatten`が入力テキストの
        // 順序どおりの連結と一致することを検証する（空ランの除去は
        // テキストを変更しない）。
        proptest! {
            #[test]
            fn test_flatten_equals_concatenation(texts in proptest::collection::vec(".*", 0..8)) {
                let expected: String = texts.concat();
                let runs: Vec<StyleRun> = texts
                    .into_iter()
                    .map(StyleRun::plain)
                    .collect();
                let cell = RichTextCell::build(runs);

                prop_assert_eq!(cell.flatten(), expected);
            }

            #[test]
            fn test_build_never_keeps_empty_runs(texts in proptest::collection::vec(".*", 0..8)) {
                let runs: Vec<StyleRun> = texts
                    .into_iter()
                    .map(StyleRun::plain)
                    .collect();
                let cell = RichTextCell::build(runs);

                prop_assert!(cell.runs().iter().all(|r| !r.text.is_empty()));
            }
        }
    }
}
