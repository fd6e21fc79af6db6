//! Document Tree Module
//!
//! パーサーが生成するブロック／インラインの文書ツリーを定義するモジュール。
//! 両カテゴリとも網羅的にマッチされるタグ付きユニオン（sum type）であり、
//! 新しいノード種別の追加漏れはコンパイラが検出します。

use crate::types::UnsupportedKind;

/// ブロックレベルのMarkdownノード
///
/// 文書内で独立した縦位置を占める構造要素。リストと引用はネスト深度を
/// 持つコンテナです。
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Block {
    /// 段落
    Paragraph(Vec<Inline>),
    /// 見出し（レベル1〜6）
    Heading { level: u8, content: Vec<Inline> },
    /// 順序なしリスト（子はListItem）
    UnorderedList(Vec<Block>),
    /// 順序付きリスト（子はListItem）
    OrderedList(Vec<Block>),
    /// リスト項目（子はブロックの順序付き列）
    ListItem(Vec<Block>),
    /// 引用ブロック（子はブロックの順序付き列）
    BlockQuote(Vec<Block>),
    /// コードブロック（内部改行は保持される）
    CodeBlock(String),
    /// 水平線
    ThematicBreak,
    /// サポートされないブロック構造（テーブル、HTMLブロック、脚注定義など）
    Unsupported {
        kind: UnsupportedKind,
        raw: String,
    },
}

/// インラインレベルのMarkdownノード
///
/// ブロック内にネストされる書式・テキスト要素。
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Inline {
    /// プレーンテキスト
    Text(String),
    /// 強調（斜体）
    Emphasis(Vec<Inline>),
    /// 強い強調（太字）
    Strong(Vec<Inline>),
    /// 取り消し線
    Strikethrough(Vec<Inline>),
    /// コードスパン（内容はリテラルテキストとして扱われる）
    CodeSpan(String),
    /// リンク
    Link { href: String, content: Vec<Inline> },
    /// 明示的な改行（ハードブレーク）
    LineBreak,
    /// サポートされないインライン構造（画像、インラインHTMLなど）
    /// テキストは保持され、プレーンテキストとして出力される
    Unsupported {
        kind: UnsupportedKind,
        text: String,
    },
}

impl Inline {
    /// インラインノードのフラット化されたプレーンテキストを返す
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Text(s) => s.clone(),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children) => flatten_inlines(children),
            Inline::CodeSpan(s) => s.clone(),
            Inline::Link { content, .. } => flatten_inlines(content),
            Inline::LineBreak => "\n".to_string(),
            Inline::Unsupported { text, .. } => text.clone(),
        }
    }
}

/// インラインノード列のフラット化されたプレーンテキストを返す
pub(crate) fn flatten_inlines(inlines: &[Inline]) -> String {
    inlines.iter().map(|i| i.plain_text()).collect()
}
