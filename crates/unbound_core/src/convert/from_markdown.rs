//! Markdown source -> rich document.
//!
//! # Responsibility
//! - Build a `RichDoc` from the pulldown-cmark event stream.
//!
//! # Invariants
//! - Never fails: unterminated markers stay literal text (pulldown-cmark
//!   already follows CommonMark here) and constructs without a rich
//!   counterpart degrade to their text.
//! - Events are well nested, so every `End` closes the frame its `Start`
//!   opened; the end tag itself is never inspected.

use crate::model::rich::{Block, Inline, InlineStyle, ListItem, RichDoc};
use log::debug;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

/// Converts Markdown text into a rich document.
pub fn markdown_to_rich(markdown: &str) -> RichDoc {
    let mut builder = RichBuilder::new();
    for event in Parser::new_ext(markdown, markdown_options()) {
        builder.handle(event);
    }
    builder.finish()
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Root,
    Quote,
    Item,
}

#[derive(Debug, Clone, PartialEq)]
enum Mark {
    Bold,
    Italic,
    Strike,
    Link(String),
}

#[derive(Debug)]
enum Frame {
    Container {
        kind: ContainerKind,
        blocks: Vec<Block>,
        /// Inline content outside a paragraph (tight list items).
        loose: Vec<Inline>,
    },
    List {
        start: Option<u64>,
        tight: bool,
        items: Vec<ListItem>,
    },
    Inlines {
        heading: Option<u8>,
        inlines: Vec<Inline>,
    },
    Code {
        language: Option<String>,
        code: String,
    },
    Style,
    Image {
        alt: String,
    },
    Transparent,
}

struct RichBuilder {
    stack: Vec<Frame>,
    marks: Vec<Mark>,
}

impl RichBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame::Container {
                kind: ContainerKind::Root,
                blocks: Vec::new(),
                loose: Vec::new(),
            }],
            marks: Vec::new(),
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.push_text(&text, false),
            Event::Code(code) => self.push_text(&code, true),
            Event::Html(html) | Event::InlineHtml(html) => {
                debug!("event=conversion_degraded module=convert construct=raw_html");
                self.push_text(&html, false);
            }
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::HardBreak),
            Event::Rule => self.push_block(Block::Rule),
            Event::FootnoteReference(label) => self.push_text(&format!("[^{label}]"), false),
            Event::TaskListMarker(checked) => {
                self.push_text(if checked { "[x] " } else { "[ ] " }, false)
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.mark_enclosing_list_loose();
                self.stack.push(Frame::Inlines {
                    heading: None,
                    inlines: Vec::new(),
                });
            }
            Tag::Heading { level, .. } => self.stack.push(Frame::Inlines {
                heading: Some(level as u8),
                inlines: Vec::new(),
            }),
            Tag::HtmlBlock => self.stack.push(Frame::Inlines {
                heading: None,
                inlines: Vec::new(),
            }),
            Tag::BlockQuote(_) => {
                self.flush_loose();
                self.stack.push(Frame::Container {
                    kind: ContainerKind::Quote,
                    blocks: Vec::new(),
                    loose: Vec::new(),
                });
            }
            Tag::CodeBlock(kind) => {
                self.flush_loose();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.stack.push(Frame::Code {
                    language,
                    code: String::new(),
                });
            }
            Tag::List(start) => {
                self.flush_loose();
                self.stack.push(Frame::List {
                    start,
                    tight: true,
                    items: Vec::new(),
                });
            }
            Tag::Item => self.stack.push(Frame::Container {
                kind: ContainerKind::Item,
                blocks: Vec::new(),
                loose: Vec::new(),
            }),
            Tag::Emphasis => self.push_mark(Mark::Italic),
            Tag::Strong => self.push_mark(Mark::Bold),
            Tag::Strikethrough => self.push_mark(Mark::Strike),
            Tag::Link { dest_url, .. } => self.push_mark(Mark::Link(dest_url.to_string())),
            Tag::Image { .. } => {
                debug!("event=conversion_degraded module=convert construct=image");
                self.stack.push(Frame::Image { alt: String::new() });
            }
            _ => self.stack.push(Frame::Transparent),
        }
    }

    fn end(&mut self) {
        // The root container is never popped by an End event.
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        self.close(frame);
    }

    fn close(&mut self, frame: Frame) {
        match frame {
            Frame::Inlines { heading, inlines } => {
                let block = match heading {
                    Some(level) => Block::heading(level, inlines),
                    None => Block::paragraph(inlines),
                };
                self.push_block(block);
            }
            Frame::Code { language, code } => self.push_block(Block::CodeBlock { language, code }),
            Frame::List {
                start,
                tight,
                items,
            } => self.push_block(Block::List {
                start,
                tight,
                items,
            }),
            Frame::Container {
                kind,
                mut blocks,
                loose,
            } => {
                if !loose.is_empty() {
                    blocks.push(Block::paragraph(loose));
                }
                match kind {
                    ContainerKind::Item => {
                        if let Some(Frame::List { items, .. }) = self.stack.last_mut() {
                            items.push(ListItem { blocks });
                        }
                    }
                    ContainerKind::Quote => self.push_block(Block::Quote { blocks }),
                    ContainerKind::Root => {}
                }
            }
            Frame::Style => {
                self.marks.pop();
            }
            Frame::Image { alt } => self.push_text(&alt, false),
            Frame::Transparent => {}
        }
    }

    fn finish(mut self) -> RichDoc {
        while self.stack.len() > 1 {
            if let Some(frame) = self.stack.pop() {
                self.close(frame);
            }
        }
        self.flush_loose();
        match self.stack.pop() {
            Some(Frame::Container { blocks, .. }) => RichDoc::new(blocks),
            _ => RichDoc::default(),
        }
    }

    fn push_mark(&mut self, mark: Mark) {
        self.marks.push(mark);
        self.stack.push(Frame::Style);
    }

    fn current_style(&self, code: bool) -> InlineStyle {
        let mut style = InlineStyle {
            code,
            ..InlineStyle::default()
        };
        for mark in &self.marks {
            match mark {
                Mark::Bold => style.bold = true,
                Mark::Italic => style.italic = true,
                Mark::Strike => style.strikethrough = true,
                Mark::Link(url) => style.link = Some(url.clone()),
            }
        }
        style
    }

    fn push_text(&mut self, text: &str, code: bool) {
        if text.is_empty() {
            return;
        }
        let style = self.current_style(code);
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Style | Frame::Transparent => continue,
                Frame::Image { alt } => alt.push_str(text),
                Frame::Code { code, .. } => code.push_str(text),
                _ => push_inline_into(frame, Inline::styled(text, style)),
            }
            return;
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Style | Frame::Transparent => continue,
                Frame::Image { alt } => alt.push(' '),
                Frame::Code { code, .. } => code.push('\n'),
                _ => push_inline_into(frame, inline),
            }
            return;
        }
    }

    /// Appends a finished block to the nearest container.
    fn push_block(&mut self, block: Block) {
        for frame in self.stack.iter_mut().rev() {
            if let Frame::Container { blocks, loose, .. } = frame {
                if !loose.is_empty() {
                    blocks.push(Block::paragraph(std::mem::take(loose)));
                }
                blocks.push(block);
                return;
            }
        }
    }

    /// Turns pending tight-list text into a paragraph before a nested block.
    fn flush_loose(&mut self) {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Style | Frame::Transparent => continue,
                Frame::Container { blocks, loose, .. } => {
                    if !loose.is_empty() {
                        blocks.push(Block::paragraph(std::mem::take(loose)));
                    }
                }
                _ => {}
            }
            return;
        }
    }

    /// A paragraph directly inside a list item makes the list loose.
    fn mark_enclosing_list_loose(&mut self) {
        let len = self.stack.len();
        if len < 2 {
            return;
        }
        if let Frame::Container {
            kind: ContainerKind::Item,
            ..
        } = self.stack[len - 1]
        {
            if let Frame::List { tight, .. } = &mut self.stack[len - 2] {
                *tight = false;
            }
        }
    }
}

fn push_inline_into(frame: &mut Frame, inline: Inline) {
    match frame {
        Frame::Inlines { inlines, .. } => inlines.push(inline),
        Frame::Container { loose, .. } => loose.push(inline),
        Frame::List { items, .. } => items.push(ListItem {
            blocks: vec![Block::paragraph(vec![inline])],
        }),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rich::BlockFormat;

    fn paragraph(inlines: Vec<Inline>) -> Block {
        Block::Paragraph {
            inlines,
            format: BlockFormat::default(),
        }
    }

    #[test]
    fn bold_text_becomes_styled_run() {
        let doc = markdown_to_rich("Hello **world**");
        assert_eq!(
            doc.blocks,
            vec![paragraph(vec![
                Inline::text("Hello "),
                Inline::styled("world", InlineStyle::bold()),
            ])]
        );
    }

    #[test]
    fn heading_levels_and_code_fences_are_kept() {
        let doc = markdown_to_rich("### Title\n\n```rust\nfn main() {}\n```");
        assert_eq!(doc.blocks[0], Block::heading(3, vec![Inline::text("Title")]));
        assert_eq!(
            doc.blocks[1],
            Block::CodeBlock {
                language: Some("rust".to_string()),
                code: "fn main() {}\n".to_string(),
            }
        );
    }

    #[test]
    fn tight_list_items_hold_paragraphs() {
        let doc = markdown_to_rich("- one\n- two");
        let Block::List { start, tight, items } = &doc.blocks[0] else {
            panic!("expected list, got {:?}", doc.blocks[0]);
        };
        assert_eq!(*start, None);
        assert!(*tight);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].blocks, vec![paragraph(vec![Inline::text("two")])]);
    }

    #[test]
    fn loose_and_ordered_lists_are_detected() {
        let doc = markdown_to_rich("3. one\n\n4. two");
        assert!(matches!(
            doc.blocks[0],
            Block::List {
                start: Some(3),
                tight: false,
                ..
            }
        ));
    }

    #[test]
    fn unmatched_emphasis_stays_literal() {
        let doc = markdown_to_rich("a **b and c");
        assert_eq!(doc.plain_text(), "a **b and c");
    }

    #[test]
    fn unterminated_fence_keeps_following_text() {
        let doc = markdown_to_rich("intro\n\n```\nlet x = 1;\nmore text");
        assert_eq!(doc.blocks.len(), 2);
        let Block::CodeBlock { language, code } = &doc.blocks[1] else {
            panic!("expected code block, got {:?}", doc.blocks[1]);
        };
        assert_eq!(*language, None);
        assert_eq!(code.trim_end(), "let x = 1;\nmore text");
    }

    #[test]
    fn images_degrade_to_alt_text() {
        let doc = markdown_to_rich("see ![a cat](cat.png) here");
        assert_eq!(doc.plain_text(), "see a cat here");
    }

    #[test]
    fn links_keep_target() {
        let doc = markdown_to_rich("[site](https://example.com)");
        let Block::Paragraph { inlines, .. } = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        let Inline::Text(run) = &inlines[0] else {
            panic!("expected text run");
        };
        assert_eq!(run.text, "site");
        assert_eq!(run.style.link.as_deref(), Some("https://example.com"));
    }
}
