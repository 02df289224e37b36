//! Rich document model used by the rich-text editing mode.
//!
//! # Responsibility
//! - Describe formatted content as a block tree with styled inline runs.
//! - Provide the plain-text projection a rich surface displays.
//!
//! # Invariants
//! - After `normalize()`, adjacent text runs never share the same style and
//!   empty runs are removed.
//! - Heading levels are always clamped to `1..=6`.
//!
//! HTML serialization lives in `convert::html`.

use serde::{Deserialize, Serialize};

/// Horizontal alignment of a paragraph or heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Block-level presentation that Markdown cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockFormat {
    pub alignment: Alignment,
    /// Indent steps applied outside of list nesting.
    pub indent: u8,
}

impl BlockFormat {
    pub fn is_plain(&self) -> bool {
        self.alignment == Alignment::Left && self.indent == 0
    }
}

/// Character-level formatting for one text run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    /// Link target when the run is part of a hyperlink.
    pub link: Option<String>,
    /// CSS color value, e.g. `#ff0000`.
    pub color: Option<String>,
    pub highlight: Option<String>,
    pub font_family: Option<String>,
    /// Point size.
    pub font_size: Option<f32>,
}

impl InlineStyle {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    pub fn code() -> Self {
        Self {
            code: true,
            ..Self::default()
        }
    }

    /// Returns whether the style carries anything Markdown cannot represent.
    pub fn has_rich_only_features(&self) -> bool {
        self.underline
            || self.color.is_some()
            || self.highlight.is_some()
            || self.font_family.is_some()
            || self.font_size.is_some()
    }

    /// Copy of this style restricted to what Markdown can express.
    pub fn markdown_subset(&self) -> Self {
        Self {
            bold: self.bold,
            italic: self.italic,
            strikethrough: self.strikethrough,
            code: self.code,
            link: self.link.clone(),
            ..Self::default()
        }
    }
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub style: InlineStyle,
}

/// Inline content of a paragraph or heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    Text(TextRun),
    /// Line break inside a paragraph that a renderer may reflow.
    SoftBreak,
    /// Forced line break.
    HardBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Self::styled(text, InlineStyle::default())
    }

    pub fn styled(text: impl Into<String>, style: InlineStyle) -> Self {
        Self::Text(TextRun {
            text: text.into(),
            style,
        })
    }
}

/// One list entry holding nested blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListItem {
    pub blocks: Vec<Block>,
}

/// Block-level node of a rich document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Paragraph {
        inlines: Vec<Inline>,
        format: BlockFormat,
    },
    Heading {
        level: u8,
        inlines: Vec<Inline>,
        format: BlockFormat,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    List {
        /// `Some(start)` for ordered lists.
        start: Option<u64>,
        /// Tight lists separate items without blank lines.
        tight: bool,
        items: Vec<ListItem>,
    },
    Quote {
        blocks: Vec<Block>,
    },
    Rule,
}

impl Block {
    pub fn paragraph(inlines: Vec<Inline>) -> Self {
        Self::Paragraph {
            inlines,
            format: BlockFormat::default(),
        }
    }

    pub fn heading(level: u8, inlines: Vec<Inline>) -> Self {
        Self::Heading {
            level: level.clamp(1, 6),
            inlines,
            format: BlockFormat::default(),
        }
    }

    fn normalize(&mut self) {
        match self {
            Self::Paragraph { inlines, .. } => normalize_inlines(inlines),
            Self::Heading { level, inlines, .. } => {
                *level = (*level).clamp(1, 6);
                normalize_inlines(inlines);
            }
            Self::List { items, .. } => {
                for item in items {
                    item.blocks.iter_mut().for_each(Block::normalize);
                }
            }
            Self::Quote { blocks } => blocks.iter_mut().for_each(Block::normalize),
            Self::CodeBlock { .. } | Self::Rule => {}
        }
    }

    fn write_plain_text(&self, out: &mut String) {
        match self {
            Self::Paragraph { inlines, .. } | Self::Heading { inlines, .. } => {
                write_inline_text(inlines, out);
            }
            Self::CodeBlock { code, .. } => out.push_str(code.trim_end_matches('\n')),
            Self::List { items, .. } => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push('\n');
                    }
                    write_blocks_text(&item.blocks, "\n", out);
                }
            }
            Self::Quote { blocks } => write_blocks_text(blocks, "\n\n", out),
            Self::Rule => {}
        }
    }
}

/// Rich-text document: an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RichDoc {
    pub blocks: Vec<Block>,
}

impl RichDoc {
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut doc = Self { blocks };
        doc.normalize();
        doc
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Merges adjacent same-style runs and drops empty runs, recursively.
    pub fn normalize(&mut self) {
        self.blocks.iter_mut().for_each(Block::normalize);
    }

    /// Text as a rich surface would display it: blocks separated by blank
    /// lines, list items by single newlines, formatting removed.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        write_blocks_text(&self.blocks, "\n\n", &mut out);
        out
    }
}

fn write_blocks_text(blocks: &[Block], separator: &str, out: &mut String) {
    for (index, block) in blocks.iter().enumerate() {
        if index > 0 {
            out.push_str(separator);
        }
        block.write_plain_text(out);
    }
}

fn write_inline_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(run) => out.push_str(&run.text),
            Inline::SoftBreak | Inline::HardBreak => out.push('\n'),
        }
    }
}

/// Merges adjacent runs with equal style and removes empty runs.
pub fn normalize_inlines(inlines: &mut Vec<Inline>) {
    let mut merged: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines.drain(..) {
        match inline {
            Inline::Text(run) if run.text.is_empty() => {}
            Inline::Text(run) => match merged.last_mut() {
                Some(Inline::Text(previous)) if previous.style == run.style => {
                    previous.text.push_str(&run.text);
                }
                _ => merged.push(Inline::Text(run)),
            },
            other => merged.push(other),
        }
    }
    *inlines = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_merges_equal_runs_and_drops_empty_ones() {
        let doc = RichDoc::new(vec![Block::paragraph(vec![
            Inline::text("Hello"),
            Inline::text(""),
            Inline::text(" "),
            Inline::styled("world", InlineStyle::bold()),
            Inline::styled("!", InlineStyle::bold()),
        ])]);

        assert_eq!(
            doc.blocks,
            vec![Block::paragraph(vec![
                Inline::text("Hello "),
                Inline::styled("world!", InlineStyle::bold()),
            ])]
        );
    }

    #[test]
    fn heading_level_is_clamped() {
        assert!(matches!(Block::heading(9, vec![]), Block::Heading { level: 6, .. }));
        assert!(matches!(Block::heading(0, vec![]), Block::Heading { level: 1, .. }));
    }

    #[test]
    fn plain_text_separates_blocks_and_items() {
        let doc = RichDoc::new(vec![
            Block::heading(1, vec![Inline::text("Title")]),
            Block::List {
                start: None,
                tight: true,
                items: vec![
                    ListItem {
                        blocks: vec![Block::paragraph(vec![Inline::text("a")])],
                    },
                    ListItem {
                        blocks: vec![Block::paragraph(vec![Inline::text("b")])],
                    },
                ],
            },
        ]);
        assert_eq!(doc.plain_text(), "Title\n\na\nb");
    }

    #[test]
    fn markdown_subset_drops_rich_only_fields() {
        let style = InlineStyle {
            bold: true,
            color: Some("#ff0000".to_string()),
            font_size: Some(14.0),
            ..InlineStyle::default()
        };
        assert!(style.has_rich_only_features());
        let subset = style.markdown_subset();
        assert!(subset.bold);
        assert!(!subset.has_rich_only_features());
    }
}
