//! Inline Style Compositor Module
//!
//! インラインツリーを順序付きスタイルランの列へ合成するモジュール。
//! 書式状態は可変のトグルではなく、不変な`StyleAttributeSet`として
//! 再帰呼び出しに明示的に受け渡されます。サブツリーを抜けると呼び出し元の
//! 属性集合がそのまま使われるため、合成は順序に依存しません。

use crate::ast::Inline;
use crate::types::{StyleAttributeSet, StyleRun, UnsupportedKind};

/// インラインノード列をスタイルランの列へ合成
///
/// # 引数
///
/// * `inlines` - 合成するインラインノード列
/// * `attrs` - この地点で有効な書式属性（見出しでは太字が強制される）
/// * `unsupported` - 検出されたサポート外インライン構造の種別を収集する
///   バッファ。呼び出し元（レイアウトエンジン）がブロック位置とともに
///   警告へ変換する
///
/// # 戻り値
///
/// 文書順のスタイルラン列。連結したテキストは入力インライン列の
/// フラット化されたプレーンテキストと一致します。隣接する同一書式の
/// ランは透過的にマージされます（テキスト順・内容は不変）。
pub(crate) fn compose(
    inlines: &[Inline],
    attrs: &StyleAttributeSet,
    unsupported: &mut Vec<UnsupportedKind>,
) -> Vec<StyleRun> {
    let mut acc = RunAccumulator::new();
    walk(inlines, attrs, &mut acc, unsupported);
    acc.into_runs()
}

/// インラインツリーを再帰的に走査してランを蓄積
fn walk(
    inlines: &[Inline],
    attrs: &StyleAttributeSet,
    acc: &mut RunAccumulator,
    unsupported: &mut Vec<UnsupportedKind>,
) {
    for inline in inlines {
        match inline {
            // テキスト葉: 現在の属性集合で1ラン（空テキストはラン無し）
            Inline::Text(text) => acc.append(text, attrs),

            // 強調系: サブツリーに限り属性を集合和で追加
            Inline::Emphasis(children) => walk(children, &attrs.with_italic(), acc, unsupported),
            Inline::Strong(children) => walk(children, &attrs.with_bold(), acc, unsupported),
            Inline::Strikethrough(children) => {
                walk(children, &attrs.with_strikethrough(), acc, unsupported)
            }

            // コードスパン: 内容はリテラルテキスト。他の有効な属性に
            // かかわらず等幅が強制される
            Inline::CodeSpan(text) => acc.append(text, &attrs.with_monospace()),

            Inline::Link { href, content } => {
                walk(content, &attrs.with_link(href), acc, unsupported)
            }

            // 明示的改行: 新しいランを作らず隣接するランのテキストへ
            // 連結する（ラン数は書式境界のみを反映する）
            Inline::LineBreak => acc.append_break(attrs),

            Inline::Unsupported { kind, text } => {
                unsupported.push(*kind);
                acc.append(text, attrs);
            }
        }
    }
}

/// スタイルランの蓄積バッファ
///
/// 隣接する同一書式のランをマージしてラン数を抑えます。マージは
/// 連結テキストを一切変更しない純粋な最適化です。
struct RunAccumulator {
    runs: Vec<StyleRun>,
}

impl RunAccumulator {
    fn new() -> Self {
        Self { runs: Vec::new() }
    }

    /// テキストを現在の属性で追加（直前のランと同一書式ならマージ）
    fn append(&mut self, text: &str, attrs: &StyleAttributeSet) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut() {
            if &last.attrs == attrs {
                last.text.push_str(text);
                return;
            }
        }
        self.runs.push(StyleRun::new(text.to_string(), attrs.clone()));
    }

    /// 改行マーカーを隣接するランへ連結
    ///
    /// 直前のランがあればその書式のままテキスト末尾に`\n`を足す。
    /// 先頭での改行（隣接ランが無い縮退ケース）のみ新しいランになる。
    fn append_break(&mut self, attrs: &StyleAttributeSet) {
        match self.runs.last_mut() {
            Some(last) => last.text.push('\n'),
            None => self.append("\n", attrs),
        }
    }

    fn into_runs(self) -> Vec<StyleRun> {
        self.runs
    }
}
