//! Markdown Event Folding
//!
//! pulldown-cmarkのイベント列をブロックツリーへ変換する実装。
//! テーブル・脚注・取り消し線の拡張を有効にしてパースし、サポートされない
//! 構造は`Unsupported`ノードとして予測可能に分離します（有効にしないと
//! テーブルが段落として誤変換され、出力が静かに壊れるため）。

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::ast::{flatten_inlines, Block, Inline};
use crate::types::UnsupportedKind;

/// Markdownソースをブロックツリーへパース
///
/// # 引数
///
/// * `source` - UTF-8のMarkdownテキスト
///
/// # 戻り値
///
/// 文書順のトップレベルブロック列。サポートされない構造は
/// `Block::Unsupported`として含まれ、後段のレイアウトエンジンが
/// 警告に変換します。
pub(crate) fn parse_document(source: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options);
    let mut builder = TreeBuilder::new();

    for event in parser {
        builder.handle(event);
    }

    builder.finish()
}

/// ブロックコンテナの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Root,
    UnorderedList,
    OrderedList,
    Item,
    Quote,
}

/// 構築中のブロックコンテナ
#[derive(Debug)]
struct Container {
    kind: ContainerKind,
    children: Vec<Block>,
}

/// 構築中のリーフブロック
#[derive(Debug)]
enum Leaf {
    Paragraph(InlineBuilder),
    Heading { level: u8, inline: InlineBuilder },
    Code(String),
}

/// サポートされないサブツリーのスキップ状態
///
/// 開始タグから対応する終了タグまでのイベントを読み飛ばし、
/// テキスト内容のみを生スパンとして収集します。
#[derive(Debug)]
struct Skip {
    kind: UnsupportedKind,
    depth: usize,
    raw: String,
}

/// イベント列からブロックツリーを組み立てるビルダー
///
/// コンテナのスタック規律（降下でpush、復帰でpop）がネスト深度の
/// 不変条件を保証します。
struct TreeBuilder {
    containers: Vec<Container>,
    leaf: Option<Leaf>,
    skip: Option<Skip>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            containers: vec![Container {
                kind: ContainerKind::Root,
                children: Vec::new(),
            }],
            leaf: None,
            skip: None,
        }
    }

    /// 1イベントを処理
    fn handle(&mut self, event: Event<'_>) {
        // スキップ中はネスト深度のみを追跡し、テキストを生スパンに収集
        if let Some(skip) = self.skip.as_mut() {
            match event {
                Event::Start(_) => skip.depth += 1,
                Event::End(_) => {
                    skip.depth -= 1;
                    if skip.depth == 0 {
                        let skip = self.skip.take().expect("skip state present");
                        self.push_block(Block::Unsupported {
                            kind: skip.kind,
                            raw: skip.raw,
                        });
                    }
                }
                Event::Text(t) | Event::Code(t) | Event::Html(t) | Event::InlineHtml(t) => {
                    skip.raw.push_str(&t);
                }
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.handle_start(tag),
            Event::End(tag) => self.handle_end(tag),

            Event::Text(t) => match self.leaf.as_mut() {
                Some(Leaf::Code(buf)) => buf.push_str(&t),
                Some(Leaf::Paragraph(inline)) | Some(Leaf::Heading { inline, .. }) => {
                    inline.text(&t);
                }
                // タイトなリスト項目はParagraphイベントなしでインラインを
                // 直接生成するため、暗黙の段落を開く
                None => self.inline_target().text(&t),
            },

            Event::Code(t) => self
                .inline_target()
                .push(Inline::CodeSpan(t.into_string())),

            Event::InlineHtml(t) => self.inline_target().push(Inline::Unsupported {
                kind: UnsupportedKind::InlineHtml,
                text: t.into_string(),
            }),

            // HtmlBlockタグの外に現れた生HTML（まれ）もインライン扱い
            Event::Html(t) => self.inline_target().push(Inline::Unsupported {
                kind: UnsupportedKind::InlineHtml,
                text: t.into_string(),
            }),

            Event::FootnoteReference(label) => self.inline_target().push(Inline::Unsupported {
                kind: UnsupportedKind::Footnote,
                text: format!("[^{}]", label),
            }),

            // ソフトブレークは空白1つに正規化（セル内でテキストが自然に
            // 折り返されるため）。ハードブレークのみが明示的改行になる。
            Event::SoftBreak => self.inline_target().push(Inline::Text(" ".to_string())),
            Event::HardBreak => self.inline_target().push(Inline::LineBreak),

            Event::Rule => {
                self.close_leaf();
                self.push_block(Block::ThematicBreak);
            }

            // 有効化していない拡張のイベントはプレーンテキストとして保持
            Event::TaskListMarker(_) => {}
            other => {
                let text = match other {
                    Event::InlineMath(t) | Event::DisplayMath(t) => t.into_string(),
                    _ => String::new(),
                };
                if !text.is_empty() {
                    self.inline_target().push(Inline::Unsupported {
                        kind: UnsupportedKind::Other,
                        text,
                    });
                }
            }
        }
    }

    fn handle_start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.close_leaf();
                self.leaf = Some(Leaf::Paragraph(InlineBuilder::new()));
            }
            Tag::Heading { level, .. } => {
                self.close_leaf();
                self.leaf = Some(Leaf::Heading {
                    level: level as u8,
                    inline: InlineBuilder::new(),
                });
            }
            // フェンス情報（言語タグ）はセル出力に現れないため破棄
            Tag::CodeBlock(_) => {
                self.close_leaf();
                self.leaf = Some(Leaf::Code(String::new()));
            }
            Tag::BlockQuote(_) => {
                self.close_leaf();
                self.push_container(ContainerKind::Quote);
            }
            Tag::List(ordinal) => {
                self.close_leaf();
                let kind = if ordinal.is_some() {
                    ContainerKind::OrderedList
                } else {
                    ContainerKind::UnorderedList
                };
                self.push_container(kind);
            }
            Tag::Item => {
                self.close_leaf();
                self.push_container(ContainerKind::Item);
            }

            Tag::Emphasis => self.inline_target().start(InlineFrameKind::Emphasis),
            Tag::Strong => self.inline_target().start(InlineFrameKind::Strong),
            Tag::Strikethrough => self.inline_target().start(InlineFrameKind::Strikethrough),
            Tag::Link { dest_url, .. } => {
                let href = dest_url.into_string();
                self.inline_target().start(InlineFrameKind::Link(href));
            }
            Tag::Image { .. } => self.inline_target().start(InlineFrameKind::Image),

            Tag::Table(_) => self.begin_skip(UnsupportedKind::Table),
            Tag::HtmlBlock => self.begin_skip(UnsupportedKind::HtmlBlock),
            Tag::FootnoteDefinition(_) => self.begin_skip(UnsupportedKind::Footnote),

            // その他のブロックタグ（定義リスト、メタデータブロックなど）
            _ => self.begin_skip(UnsupportedKind::Other),
        }
    }

    fn handle_end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock => self.close_leaf(),
            TagEnd::BlockQuote(_) | TagEnd::List(_) | TagEnd::Item => self.pop_container(),

            TagEnd::Emphasis => self.inline_target().end(),
            TagEnd::Strong => self.inline_target().end(),
            TagEnd::Strikethrough => self.inline_target().end(),
            TagEnd::Link => self.inline_target().end(),
            TagEnd::Image => self.inline_target().end(),

            // スキップ対象の終了タグはSkip状態で処理済み。ここに到達する
            // 残りのタグは無視してよい
            _ => {}
        }
    }

    /// サポートされないサブツリーの読み飛ばしを開始
    fn begin_skip(&mut self, kind: UnsupportedKind) {
        self.close_leaf();
        self.skip = Some(Skip {
            kind,
            depth: 1,
            raw: String::new(),
        });
    }

    /// インラインイベントの書き込み先を取得（必要なら暗黙の段落を開く）
    fn inline_target(&mut self) -> &mut InlineBuilder {
        match self.leaf {
            Some(Leaf::Paragraph(_)) | Some(Leaf::Heading { .. }) => {}
            _ => {
                // 構築中のコードブロックを失わないよう先に閉じる
                self.close_leaf();
                self.leaf = Some(Leaf::Paragraph(InlineBuilder::new()));
            }
        }
        match self.leaf.as_mut() {
            Some(Leaf::Paragraph(inline)) | Some(Leaf::Heading { inline, .. }) => inline,
            _ => unreachable!("leaf set above"),
        }
    }

    /// 構築中のリーフブロックを閉じて親コンテナへ追加
    fn close_leaf(&mut self) {
        if let Some(leaf) = self.leaf.take() {
            let block = match leaf {
                Leaf::Paragraph(inline) => Block::Paragraph(inline.finish()),
                Leaf::Heading { level, inline } => Block::Heading {
                    level,
                    content: inline.finish(),
                },
                Leaf::Code(mut text) => {
                    // フェンスコードブロックの末尾改行はブロック内部の
                    // 改行ではないため1つだけ取り除く
                    if text.ends_with('\n') {
                        text.pop();
                    }
                    Block::CodeBlock(text)
                }
            };
            self.push_block(block);
        }
    }

    fn push_container(&mut self, kind: ContainerKind) {
        self.containers.push(Container {
            kind,
            children: Vec::new(),
        });
    }

    /// コンテナを閉じて対応するブロックを親へ追加
    fn pop_container(&mut self) {
        self.close_leaf();
        let container = match self.containers.pop() {
            Some(c) => c,
            None => return,
        };
        let block = match container.kind {
            ContainerKind::UnorderedList => Block::UnorderedList(container.children),
            ContainerKind::OrderedList => Block::OrderedList(container.children),
            ContainerKind::Item => Block::ListItem(container.children),
            ContainerKind::Quote => Block::BlockQuote(container.children),
            ContainerKind::Root => {
                // ルートはpopされない。防御的に復元する
                self.containers.insert(0, container);
                return;
            }
        };
        self.push_block(block);
    }

    /// 完成したブロックを現在のコンテナへ追加
    fn push_block(&mut self, block: Block) {
        self.containers
            .last_mut()
            .expect("root container present")
            .children
            .push(block);
    }

    /// 残りの状態を畳んでトップレベルブロック列を返す
    fn finish(mut self) -> Vec<Block> {
        self.close_leaf();
        // 不整合なイベント列でも壊れないよう、開いたままのコンテナを畳む
        while self.containers.len() > 1 {
            self.pop_container();
        }
        self.containers.pop().expect("root container").children
    }
}

/// インラインフレームの種別
#[derive(Debug)]
enum InlineFrameKind {
    Root,
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
    Image,
}

/// 構築中のインラインフレーム
#[derive(Debug)]
struct InlineFrame {
    kind: InlineFrameKind,
    children: Vec<Inline>,
}

/// ネストしたインライン書式タグからインラインツリーを組み立てるビルダー
#[derive(Debug)]
struct InlineBuilder {
    stack: Vec<InlineFrame>,
}

impl InlineBuilder {
    fn new() -> Self {
        Self {
            stack: vec![InlineFrame {
                kind: InlineFrameKind::Root,
                children: Vec::new(),
            }],
        }
    }

    fn text(&mut self, text: &str) {
        self.push(Inline::Text(text.to_string()));
    }

    fn push(&mut self, inline: Inline) {
        self.stack
            .last_mut()
            .expect("root frame present")
            .children
            .push(inline);
    }

    fn start(&mut self, kind: InlineFrameKind) {
        self.stack.push(InlineFrame {
            kind,
            children: Vec::new(),
        });
    }

    fn end(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let frame = self.stack.pop().expect("checked above");
        let inline = match frame.kind {
            InlineFrameKind::Emphasis => Inline::Emphasis(frame.children),
            InlineFrameKind::Strong => Inline::Strong(frame.children),
            InlineFrameKind::Strikethrough => Inline::Strikethrough(frame.children),
            InlineFrameKind::Link(href) => Inline::Link {
                href,
                content: frame.children,
            },
            // 画像はaltテキストのみを保持するプレーンテキストになる
            InlineFrameKind::Image => Inline::Unsupported {
                kind: UnsupportedKind::Image,
                text: flatten_inlines(&frame.children),
            },
            InlineFrameKind::Root => return,
        };
        self.push(inline);
    }

    /// 残りのフレームを畳んでインライン列を返す
    fn finish(mut self) -> Vec<Inline> {
        while self.stack.len() > 1 {
            self.end();
        }
        self.stack.pop().expect("root frame").children
    }
}
