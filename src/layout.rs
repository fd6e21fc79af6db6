//! Block Layout Engine Module
//!
//! ブロックツリーをワークシート行の列へ配置するモジュール。
//! トップダウンの1回の走査で、各ブロック（またはリスト項目）を1行に
//! 割り当て、リスト／引用の包含からインデントレベルを計算します。
//! セル内容の合成は`compose`モジュールへ委譲します。

use crate::ast::{Block, Inline};
use crate::compose::compose;
use crate::types::{
    ConversionResult, RichTextCell, Row, RowKind, StyleAttributeSet, StyleRun, Warning,
};

/// ブロックツリーをレイアウトして変換結果を生成
///
/// # 引数
///
/// * `blocks` - パーサーが生成したトップレベルブロック列
///
/// # 戻り値
///
/// 文書順の行列と警告列。サポートされない構造は行を生成せず警告に
/// なります。1つの構造のスキップが変換全体を中断することはありません。
pub(crate) fn layout_document(blocks: &[Block]) -> ConversionResult {
    // 1. エンジンの初期化（変換呼び出しごとの専有コンテキスト）
    let mut engine = LayoutEngine::new();

    // 2. インデントレベル0からの単一走査
    engine.layout_blocks(blocks, 0);

    // 3. 結果の組み立て（以降は読み取り専用）
    ConversionResult {
        rows: engine.rows,
        warnings: engine.warnings,
    }
}

/// ブロックレイアウトエンジン
///
/// インデントの受け渡しは再帰呼び出しの引数として行われるため、
/// 降下でpush・復帰でpopするスタック規律が呼び出しスタック自体で
/// 保証されます。
struct LayoutEngine {
    /// 生成済みの行（文書順）
    rows: Vec<Row>,
    /// 収集済みの警告（文書順）
    warnings: Vec<Warning>,
    /// 走査順のブロック通し番号（警告の位置情報に使用）
    block_index: usize,
    /// 現在の引用ネスト深度
    quote_depth: u32,
}

impl LayoutEngine {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            warnings: Vec::new(),
            block_index: 0,
            quote_depth: 0,
        }
    }

    /// ブロック列を現在のインデントレベルでレイアウト
    fn layout_blocks(&mut self, blocks: &[Block], indent: u32) {
        for block in blocks {
            self.layout_block(block, indent);
        }
    }

    /// 1ブロックをレイアウト
    fn layout_block(&mut self, block: &Block, indent: u32) {
        let index = self.next_index();

        match block {
            Block::Paragraph(inlines) => {
                // 引用ブロック直下の段落は引用行になる（引用の塗りを運ぶ）
                let kind = if self.quote_depth > 0 {
                    RowKind::BlockQuote
                } else {
                    RowKind::Paragraph
                };
                let cell = self.compose_cell(inlines, &StyleAttributeSet::plain(), index);
                self.rows.push(Row::new(indent, kind, cell));
            }

            Block::Heading { level, content } => {
                // 見出しのランは明示的な強調に関係なく最低でも太字になる
                let cell =
                    self.compose_cell(content, &StyleAttributeSet::plain().with_bold(), index);
                self.rows.push(Row::new(indent, RowKind::Heading(*level), cell));
            }

            // リスト降下で全子行のインデントが+1、復帰で元に戻る
            Block::UnorderedList(items) | Block::OrderedList(items) => {
                self.layout_blocks(items, indent + 1);
            }

            Block::ListItem(children) => self.layout_list_item(children, indent, index),

            Block::BlockQuote(children) => {
                self.quote_depth += 1;
                self.layout_blocks(children, indent + 1);
                self.quote_depth -= 1;
            }

            Block::CodeBlock(text) => {
                // 単一の等幅ラン。内部改行はテキスト中の明示的な改行として
                // 保持される
                let run = StyleRun::new(
                    text.clone(),
                    StyleAttributeSet::plain().with_monospace(),
                );
                self.rows
                    .push(Row::new(indent, RowKind::Code, RichTextCell::build(vec![run])));
            }

            Block::ThematicBreak => {
                self.rows
                    .push(Row::new(indent, RowKind::Rule, RichTextCell::empty()));
            }

            Block::Unsupported { kind, raw } => {
                // 行は生成しない。警告を記録して変換を継続する
                let detail = match raw_preview(raw) {
                    Some(preview) => format!("{} block skipped: {}", kind, preview),
                    None => format!("{} block skipped", kind),
                };
                self.warnings.push(Warning::new(*kind, index, detail));
            }
        }
    }

    /// リスト項目をレイアウト
    ///
    /// 項目はリストのインデントレベルで1行になります。先頭の連続した
    /// 段落は項目の行へ融合され、ネストしたブロックはその直後に
    /// インデント+1の行として続きます。
    ///
    /// 既知の制限（意図的に保持）: ネストしたブロックの後に続く段落は
    /// 元の項目へ再接続されず、項目自身のインデントレベルで新しい
    /// リスト項目として扱われます。新しい外側リストが始まったのと
    /// 同じ挙動であり、仕様が改訂されるまで回帰テストで固定されます。
    fn layout_list_item(&mut self, children: &[Block], indent: u32, item_index: usize) {
        // 1. 先頭の連続した段落を項目の1行へ融合（段落境界は改行）
        let mut runs: Vec<StyleRun> = Vec::new();
        let mut consumed = 0;
        for block in children {
            let Block::Paragraph(inlines) = block else {
                break;
            };
            if !runs.is_empty() {
                if let Some(last) = runs.last_mut() {
                    last.text.push('\n');
                }
            }
            runs.extend(self.compose_runs(inlines, &StyleAttributeSet::plain(), item_index));
            consumed += 1;
        }
        self.rows.push(Row::new(
            indent,
            RowKind::ListItem,
            RichTextCell::build(runs),
        ));

        // 2. 残りの子ブロックを処理
        for block in &children[consumed..] {
            match block {
                Block::Paragraph(inlines) => {
                    // 既知の制限: 新しいリスト項目へ昇格
                    let index = self.next_index();
                    let cell = self.compose_cell(inlines, &StyleAttributeSet::plain(), index);
                    self.rows.push(Row::new(indent, RowKind::ListItem, cell));
                }
                // コンテナは自身でインデントを+1する
                Block::UnorderedList(_) | Block::OrderedList(_) | Block::BlockQuote(_) => {
                    self.layout_block(block, indent);
                }
                // リーフブロックは項目の1段深くに置く
                other => self.layout_block(other, indent + 1),
            }
        }
    }

    /// インライン列をセルへ合成（サポート外構造は警告化）
    fn compose_cell(
        &mut self,
        inlines: &[Inline],
        attrs: &StyleAttributeSet,
        block_index: usize,
    ) -> RichTextCell {
        RichTextCell::build(self.compose_runs(inlines, attrs, block_index))
    }

    /// インライン列をラン列へ合成（サポート外構造は警告化）
    fn compose_runs(
        &mut self,
        inlines: &[Inline],
        attrs: &StyleAttributeSet,
        block_index: usize,
    ) -> Vec<StyleRun> {
        let mut unsupported = Vec::new();
        let runs = compose(inlines, attrs, &mut unsupported);
        for kind in unsupported {
            self.warnings.push(Warning::new(
                kind,
                block_index,
                format!("inline {} replaced by its plain text", kind),
            ));
        }
        runs
    }

    /// 走査順のブロック通し番号を払い出す
    fn next_index(&mut self) -> usize {
        let index = self.block_index;
        self.block_index += 1;
        index
    }
}

/// スキップされた構造の生スパンから警告用のプレビューを作る
fn raw_preview(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut preview: String = trimmed.chars().take(32).collect();
    if trimmed.chars().count() > 32 {
        preview.push('…');
    }
    Some(preview)
}
