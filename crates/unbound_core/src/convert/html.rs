//! Rich document <-> HTML.
//!
//! # Responsibility
//! - Render a `RichDoc` as the HTML fragment a rich editor surface loads.
//! - Parse HTML produced by rich editor surfaces back into a `RichDoc`.
//!
//! # Invariants
//! - Parsing never fails. Stray close tags are ignored, unclosed tags are
//!   closed at the end of input and unknown tags keep their text.
//! - `head`, `style`, `script` and `title` contents never reach the document.
//! - CSS on `html`/`body` is ignored; surfaces put their default font there.

use crate::model::rich::{
    Alignment, Block, BlockFormat, Inline, InlineStyle, ListItem, RichDoc, TextRun,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TAG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*").expect("valid tag name regex"));
static ATTRIBUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute regex")
});
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("valid entity regex")
});
static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\r\n\x0C]+").expect("valid whitespace regex"));

const SKIPPED_ELEMENTS: &[&str] = &["head", "style", "script", "title", "template"];
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "col", "embed", "input", "link", "meta", "param", "source", "track", "wbr",
];
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "tbody", "td", "th", "thead", "tr", "ul",
];
const HIGHLIGHT_MARK: &str = "yellow";

impl RichDoc {
    /// Renders the document as an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_blocks(&self.blocks, &mut out);
        out
    }

    /// Parses an HTML fragment or full document.
    pub fn from_html(html: &str) -> RichDoc {
        let mut builder = HtmlBuilder::new();
        for token in tokenize(html) {
            match token {
                Token::Open {
                    name,
                    attributes,
                    self_closing,
                } => builder.open(name, &attributes, self_closing),
                Token::Close(name) => builder.close_tag(&name),
                Token::Text(text) => builder.text(&text),
            }
        }
        builder.finish()
    }
}

fn write_blocks(blocks: &[Block], out: &mut String) {
    for (index, block) in blocks.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        write_block(block, out);
    }
}

fn write_block(block: &Block, out: &mut String) {
    match block {
        Block::Paragraph { inlines, format } => {
            out.push_str("<p");
            write_block_style(format, out);
            out.push('>');
            write_inlines(inlines, out);
            out.push_str("</p>");
        }
        Block::Heading {
            level,
            inlines,
            format,
        } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!("<h{level}"));
            write_block_style(format, out);
            out.push('>');
            write_inlines(inlines, out);
            out.push_str(&format!("</h{level}>"));
        }
        Block::CodeBlock { language, code } => {
            out.push_str("<pre><code");
            if let Some(language) = language {
                out.push_str(&format!(" class=\"language-{}\"", escape_attribute(language)));
            }
            out.push('>');
            out.push_str(&escape_text(code));
            out.push_str("</code></pre>");
        }
        Block::List {
            start,
            tight,
            items,
        } => {
            let tag = match start {
                Some(1) => {
                    out.push_str("<ol>");
                    "ol"
                }
                Some(first) => {
                    out.push_str(&format!("<ol start=\"{first}\">"));
                    "ol"
                }
                None => {
                    out.push_str("<ul>");
                    "ul"
                }
            };
            for item in items {
                out.push_str("\n<li>");
                write_list_item(item, *tight, out);
                out.push_str("</li>");
            }
            out.push_str(&format!("\n</{tag}>"));
        }
        Block::Quote { blocks } => {
            out.push_str("<blockquote>\n");
            write_blocks(blocks, out);
            out.push_str("\n</blockquote>");
        }
        Block::Rule => out.push_str("<hr />"),
    }
}

/// Tight items render their leading paragraph without a `<p>` wrapper.
fn write_list_item(item: &ListItem, tight: bool, out: &mut String) {
    let mut blocks = item.blocks.as_slice();
    if tight {
        if let Some((Block::Paragraph { inlines, format }, rest)) = blocks.split_first() {
            if format.is_plain() {
                write_inlines(inlines, out);
                blocks = rest;
            }
        }
    }
    for block in blocks {
        out.push('\n');
        write_block(block, out);
    }
}

fn write_block_style(format: &BlockFormat, out: &mut String) {
    if format.is_plain() {
        return;
    }
    let mut declarations = Vec::new();
    match format.alignment {
        Alignment::Left => {}
        Alignment::Center => declarations.push("text-align:center".to_string()),
        Alignment::Right => declarations.push("text-align:right".to_string()),
        Alignment::Justify => declarations.push("text-align:justify".to_string()),
    }
    if format.indent > 0 {
        declarations.push(format!("margin-left:{}px", u32::from(format.indent) * 40));
    }
    out.push_str(&format!(" style=\"{}\"", declarations.join("; ")));
}

fn write_inlines(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(run) => write_run(run, out),
            Inline::SoftBreak => out.push('\n'),
            Inline::HardBreak => out.push_str("<br />"),
        }
    }
}

fn write_run(run: &TextRun, out: &mut String) {
    let style = &run.style;
    let mut closing: Vec<&str> = Vec::new();

    if let Some(url) = &style.link {
        out.push_str(&format!("<a href=\"{}\">", escape_attribute(url)));
        closing.push("</a>");
    }
    for (enabled, open, close) in [
        (style.strikethrough, "<s>", "</s>"),
        (style.bold, "<strong>", "</strong>"),
        (style.italic, "<em>", "</em>"),
        (style.underline, "<u>", "</u>"),
        (style.code, "<code>", "</code>"),
    ] {
        if enabled {
            out.push_str(open);
            closing.push(close);
        }
    }

    let mut css = Vec::new();
    if let Some(color) = &style.color {
        css.push(format!("color:{color}"));
    }
    if let Some(highlight) = &style.highlight {
        css.push(format!("background-color:{highlight}"));
    }
    if let Some(family) = &style.font_family {
        css.push(format!("font-family:'{family}'"));
    }
    if let Some(size) = style.font_size {
        css.push(format!("font-size:{size}pt"));
    }
    if !css.is_empty() {
        out.push_str(&format!("<span style=\"{}\">", escape_attribute(&css.join("; "))));
        closing.push("</span>");
    }

    out.push_str(&escape_text(&run.text));
    for close in closing.iter().rev() {
        out.push_str(close);
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
    Text(String),
}

fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = html;
    while let Some(lt) = rest.find('<') {
        if lt > 0 {
            tokens.push(Token::Text(decode_entities(&rest[..lt])));
        }
        let tail = &rest[lt..];
        if let Some(after) = tail.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |end| &after[end + 3..]);
            continue;
        }
        if tail.starts_with("<!") || tail.starts_with("<?") {
            rest = tail.find('>').map_or("", |end| &tail[end + 1..]);
            continue;
        }
        match parse_tag(tail) {
            Some((token, consumed)) => {
                tokens.push(token);
                rest = &tail[consumed..];
            }
            None => {
                tokens.push(Token::Text("<".to_string()));
                rest = &tail[1..];
            }
        }
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(decode_entities(rest)));
    }
    tokens
}

/// Parses the tag at the start of `tail`; returns the token and the number of
/// bytes it spans. `None` means the `<` is literal text.
fn parse_tag(tail: &str) -> Option<(Token, usize)> {
    let closing = tail.starts_with("</");
    let name_start = if closing { 2 } else { 1 };
    let name_match = TAG_NAME_RE.find(&tail[name_start..])?;
    let name = name_match.as_str().to_ascii_lowercase();
    let body_start = name_start + name_match.end();
    let end = body_start + find_tag_end(&tail[body_start..])?;
    if closing {
        return Some((Token::Close(name), end + 1));
    }

    let body = &tail[body_start..end];
    let self_closing = body.trim_end().ends_with('/');
    let attributes = ATTRIBUTE_RE
        .captures_iter(body)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |value| value.as_str());
            Some((key, decode_entities(value)))
        })
        .collect();
    Some((
        Token::Open {
            name,
            attributes,
            self_closing,
        },
        end + 1,
    ))
}

fn find_tag_end(body: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (index, ch) in body.char_indices() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '>' => return Some(index),
                _ => {}
            },
        }
    }
    None
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(number) = entity.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        let ch = match code {
            0 => char::REPLACEMENT_CHARACTER,
            _ => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
        };
        return Some(ch.to_string());
    }
    let ch = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        "middot" => '\u{b7}',
        "bull" => '\u{2022}',
        _ => return None,
    };
    Some(ch.to_string())
}

fn attribute<'a>(attributes: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

fn css_declarations(css: &str) -> impl Iterator<Item = (String, String)> + '_ {
    css.split(';').filter_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        Some((
            property.trim().to_ascii_lowercase(),
            value.trim().to_string(),
        ))
    })
}

fn parse_alignment(value: &str) -> Option<Alignment> {
    match value.trim().to_ascii_lowercase().as_str() {
        "left" | "start" => Some(Alignment::Left),
        "center" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "justify" => Some(Alignment::Justify),
        _ => None,
    }
}

fn parse_number_with_unit(value: &str, unit: &str) -> Option<f32> {
    value
        .trim()
        .to_ascii_lowercase()
        .strip_suffix(unit)?
        .trim()
        .parse::<f32>()
        .ok()
}

/// Font size in points from `12pt` or `16px`.
fn parse_point_size(value: &str) -> Option<f32> {
    parse_number_with_unit(value, "pt")
        .or_else(|| parse_number_with_unit(value, "px").map(|px| px * 0.75))
        .filter(|size| *size > 0.0)
}

fn block_format(attributes: &[(String, String)]) -> BlockFormat {
    let mut format = BlockFormat::default();
    if let Some(alignment) = attribute(attributes, "align").and_then(parse_alignment) {
        format.alignment = alignment;
    }
    let Some(css) = attribute(attributes, "style") else {
        return format;
    };
    for (property, value) in css_declarations(css) {
        match property.as_str() {
            "text-align" => {
                if let Some(alignment) = parse_alignment(&value) {
                    format.alignment = alignment;
                }
            }
            "margin-left" => {
                if let Some(px) = parse_number_with_unit(&value, "px") {
                    let steps = (px / 40.0).round().clamp(0.0, f32::from(u8::MAX)) as u8;
                    format.indent = format.indent.max(steps);
                }
            }
            "-qt-block-indent" => {
                if let Ok(steps) = value.parse::<u8>() {
                    format.indent = format.indent.max(steps);
                }
            }
            _ => {}
        }
    }
    format
}

fn apply_css(style: &mut InlineStyle, css: &str) {
    for (property, value) in css_declarations(css) {
        let keyword = value.to_ascii_lowercase();
        match property.as_str() {
            "font-weight" => {
                style.bold = match keyword.as_str() {
                    "bold" | "bolder" => true,
                    "normal" | "lighter" => false,
                    weight => weight.parse::<u16>().map_or(style.bold, |weight| weight >= 600),
                };
            }
            "font-style" => style.italic = matches!(keyword.as_str(), "italic" | "oblique"),
            "text-decoration" | "text-decoration-line" => {
                if keyword.contains("none") {
                    style.underline = false;
                    style.strikethrough = false;
                }
                if keyword.contains("underline") {
                    style.underline = true;
                }
                if keyword.contains("line-through") {
                    style.strikethrough = true;
                }
            }
            "color" if !value.is_empty() => style.color = Some(value),
            "background-color" | "background" if keyword != "transparent" && !value.is_empty() => {
                style.highlight = Some(value);
            }
            "font-family" => {
                let family = value
                    .split(',')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .trim_matches(['\'', '"']);
                if !family.is_empty() {
                    style.font_family = Some(family.to_string());
                }
            }
            "font-size" => {
                if let Some(size) = parse_point_size(&value) {
                    style.font_size = Some(size);
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Root,
    Quote,
    Item,
}

#[derive(Debug)]
enum Frame {
    Container {
        kind: ContainerKind,
        blocks: Vec<Block>,
        /// Inline content outside a paragraph element.
        loose: Vec<Inline>,
    },
    List {
        start: Option<u64>,
        tight: bool,
        items: Vec<ListItem>,
    },
    Inlines {
        heading: Option<u8>,
        format: BlockFormat,
        inlines: Vec<Inline>,
    },
    Code {
        language: Option<String>,
        code: String,
        fresh: bool,
    },
}

#[derive(Debug)]
struct OpenElement {
    name: String,
    pushed_frame: bool,
}

struct HtmlBuilder {
    frames: Vec<Frame>,
    elements: Vec<OpenElement>,
    /// One entry per open element on top of the base style.
    styles: Vec<InlineStyle>,
    skipping: Option<String>,
}

impl HtmlBuilder {
    fn new() -> Self {
        Self {
            frames: vec![Frame::Container {
                kind: ContainerKind::Root,
                blocks: Vec::new(),
                loose: Vec::new(),
            }],
            elements: Vec::new(),
            styles: vec![InlineStyle::default()],
            skipping: None,
        }
    }

    fn open(&mut self, name: String, attributes: &[(String, String)], self_closing: bool) {
        if self.skipping.is_some() {
            return;
        }
        if SKIPPED_ELEMENTS.contains(&name.as_str()) {
            if !self_closing {
                self.skipping = Some(name);
            }
            return;
        }
        match name.as_str() {
            "br" => return self.push_inline(Inline::HardBreak),
            "hr" => {
                self.close_open_paragraph();
                return self.push_block(Block::Rule);
            }
            "img" => {
                if let Some(alt) = attribute(attributes, "alt") {
                    self.text(alt);
                }
                return;
            }
            void if VOID_ELEMENTS.contains(&void) => return,
            _ => {}
        }

        if BLOCK_ELEMENTS.contains(&name.as_str()) {
            self.close_open_paragraph();
            self.flush_loose();
        }
        if name == "li" {
            self.close_open_item();
        }

        let style = self.style_for(&name, attributes);
        let pushed_frame = self.push_frame_for(&name, attributes);
        if self_closing {
            if pushed_frame {
                self.pop_frame();
            }
            return;
        }
        self.elements.push(OpenElement { name, pushed_frame });
        self.styles.push(style);
    }

    fn push_frame_for(&mut self, name: &str, attributes: &[(String, String)]) -> bool {
        let frame = match name {
            "p" => {
                self.mark_enclosing_list_loose();
                Frame::Inlines {
                    heading: None,
                    format: block_format(attributes),
                    inlines: Vec::new(),
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Frame::Inlines {
                heading: name[1..].parse::<u8>().ok(),
                format: block_format(attributes),
                inlines: Vec::new(),
            },
            "ul" => Frame::List {
                start: None,
                tight: true,
                items: Vec::new(),
            },
            "ol" => Frame::List {
                start: Some(
                    attribute(attributes, "start")
                        .and_then(|start| start.trim().parse::<u64>().ok())
                        .unwrap_or(1),
                ),
                tight: true,
                items: Vec::new(),
            },
            "li" => Frame::Container {
                kind: ContainerKind::Item,
                blocks: Vec::new(),
                loose: Vec::new(),
            },
            "blockquote" => Frame::Container {
                kind: ContainerKind::Quote,
                blocks: Vec::new(),
                loose: Vec::new(),
            },
            "pre" => Frame::Code {
                language: None,
                code: String::new(),
                fresh: true,
            },
            "code" => {
                if let Some(Frame::Code { language, code, .. }) = self.frames.last_mut() {
                    if language.is_none() && code.is_empty() {
                        *language = attribute(attributes, "class").and_then(|class| {
                            class
                                .split_whitespace()
                                .find_map(|entry| entry.strip_prefix("language-"))
                                .map(str::to_string)
                        });
                    }
                }
                return false;
            }
            _ => return false,
        };
        self.frames.push(frame);
        true
    }

    fn style_for(&self, name: &str, attributes: &[(String, String)]) -> InlineStyle {
        let mut style = self.styles.last().cloned().unwrap_or_default();
        match name {
            "html" | "body" => return style,
            "b" | "strong" => style.bold = true,
            "i" | "em" | "cite" | "dfn" | "var" => style.italic = true,
            "s" | "strike" | "del" => style.strikethrough = true,
            "u" | "ins" => style.underline = true,
            "code" | "tt" | "kbd" | "samp" => style.code = true,
            "mark" => style.highlight = Some(HIGHLIGHT_MARK.to_string()),
            "a" => {
                if let Some(href) = attribute(attributes, "href") {
                    style.link = Some(href.to_string());
                }
            }
            "font" => {
                if let Some(color) = attribute(attributes, "color") {
                    style.color = Some(color.to_string());
                }
                if let Some(face) = attribute(attributes, "face") {
                    style.font_family = Some(face.to_string());
                }
            }
            _ => {}
        }
        if let Some(css) = attribute(attributes, "style") {
            apply_css(&mut style, css);
        }
        style
    }

    fn close_tag(&mut self, name: &str) {
        if let Some(skipped) = &self.skipping {
            if skipped == name {
                self.skipping = None;
            }
            return;
        }
        let Some(index) = self.elements.iter().rposition(|element| element.name == name) else {
            return;
        };
        self.close_elements_from(index);
        if BLOCK_ELEMENTS.contains(&name) {
            self.flush_loose();
        }
    }

    fn close_elements_from(&mut self, index: usize) {
        while self.elements.len() > index {
            let Some(element) = self.elements.pop() else {
                break;
            };
            self.styles.pop();
            if element.pushed_frame {
                self.pop_frame();
            }
        }
    }

    fn close_open_paragraph(&mut self) {
        if !matches!(self.frames.last(), Some(Frame::Inlines { .. })) {
            return;
        }
        if let Some(index) = self.elements.iter().rposition(|element| element.pushed_frame) {
            self.close_elements_from(index);
        }
    }

    /// A new `<li>` closes the previous item of the same list.
    fn close_open_item(&mut self) {
        let nearest = self
            .elements
            .iter()
            .rposition(|element| matches!(element.name.as_str(), "li" | "ul" | "ol"));
        if let Some(index) = nearest {
            if self.elements[index].name == "li" {
                self.close_elements_from(index);
            }
        }
    }

    fn pop_frame(&mut self) {
        // The root container only closes in `finish`.
        if self.frames.len() <= 1 {
            return;
        }
        if let Some(frame) = self.frames.pop() {
            self.close_frame(frame);
        }
    }

    fn close_frame(&mut self, frame: Frame) {
        match frame {
            Frame::Inlines {
                heading,
                format,
                mut inlines,
            } => {
                trim_trailing_space(&mut inlines);
                if !has_visible_text(&inlines) {
                    return;
                }
                let block = match heading {
                    Some(level) => Block::Heading {
                        level: level.clamp(1, 6),
                        inlines,
                        format,
                    },
                    None => Block::Paragraph { inlines, format },
                };
                self.push_block(block);
            }
            Frame::Code { language, code, .. } => {
                self.push_block(Block::CodeBlock { language, code });
            }
            Frame::List {
                start,
                tight,
                items,
            } => {
                if !items.is_empty() {
                    self.push_block(Block::List {
                        start,
                        tight,
                        items,
                    });
                }
            }
            Frame::Container {
                kind,
                mut blocks,
                loose,
            } => {
                if let Some(paragraph) = loose_paragraph(loose) {
                    blocks.push(paragraph);
                }
                match kind {
                    ContainerKind::Item => {
                        if let Some(Frame::List { items, .. }) = self.frames.last_mut() {
                            items.push(ListItem { blocks });
                        } else {
                            blocks.into_iter().for_each(|block| self.push_block(block));
                        }
                    }
                    ContainerKind::Quote => self.push_block(Block::Quote { blocks }),
                    ContainerKind::Root => {}
                }
            }
        }
    }

    fn finish(mut self) -> RichDoc {
        self.close_elements_from(0);
        while self.frames.len() > 1 {
            self.pop_frame();
        }
        match self.frames.pop() {
            Some(Frame::Container {
                mut blocks, loose, ..
            }) => {
                if let Some(paragraph) = loose_paragraph(loose) {
                    blocks.push(paragraph);
                }
                RichDoc::new(blocks)
            }
            _ => RichDoc::default(),
        }
    }

    fn text(&mut self, text: &str) {
        if self.skipping.is_some() || text.is_empty() {
            return;
        }
        let style = self.styles.last().cloned().unwrap_or_default();
        match self.frames.last_mut() {
            Some(Frame::Code { code, fresh, .. }) => {
                let text = if *fresh {
                    text.strip_prefix("\r\n")
                        .or_else(|| text.strip_prefix('\n'))
                        .unwrap_or(text)
                } else {
                    text
                };
                *fresh = false;
                code.push_str(text);
            }
            Some(Frame::Inlines { inlines, .. }) => push_collapsed(inlines, text, style),
            Some(Frame::Container { loose, .. }) => push_collapsed(loose, text, style),
            Some(Frame::List { .. }) | None => {}
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        match self.frames.last_mut() {
            Some(Frame::Code { code, fresh, .. }) => {
                *fresh = false;
                code.push('\n');
            }
            Some(Frame::Inlines { inlines, .. }) => inlines.push(inline),
            Some(Frame::Container { loose, .. }) => {
                if !loose.is_empty() {
                    loose.push(inline);
                }
            }
            Some(Frame::List { .. }) | None => {}
        }
    }

    /// Appends a finished block to the nearest container.
    fn push_block(&mut self, block: Block) {
        for frame in self.frames.iter_mut().rev() {
            if let Frame::Container { blocks, loose, .. } = frame {
                if let Some(paragraph) = loose_paragraph(std::mem::take(loose)) {
                    blocks.push(paragraph);
                }
                blocks.push(block);
                return;
            }
        }
    }

    fn flush_loose(&mut self) {
        if let Some(Frame::Container { blocks, loose, .. }) = self.frames.last_mut() {
            if let Some(paragraph) = loose_paragraph(std::mem::take(loose)) {
                blocks.push(paragraph);
            }
        }
    }

    /// A `<p>` directly inside a list item makes the list loose.
    fn mark_enclosing_list_loose(&mut self) {
        let len = self.frames.len();
        if len < 2 {
            return;
        }
        if let Frame::Container {
            kind: ContainerKind::Item,
            ..
        } = self.frames[len - 1]
        {
            if let Frame::List { tight, .. } = &mut self.frames[len - 2] {
                *tight = false;
            }
        }
    }
}

/// Appends text with HTML whitespace collapsing.
fn push_collapsed(inlines: &mut Vec<Inline>, text: &str, style: InlineStyle) {
    let collapsed = WHITESPACE_RUN_RE.replace_all(text, " ");
    let after_space = match inlines.last() {
        None => true,
        Some(Inline::Text(run)) => run.text.ends_with(' '),
        Some(_) => true,
    };
    let text = if after_space {
        collapsed.trim_start_matches(' ')
    } else {
        collapsed.as_ref()
    };
    if !text.is_empty() {
        inlines.push(Inline::styled(text, style));
    }
}

fn trim_trailing_space(inlines: &mut Vec<Inline>) {
    while let Some(Inline::Text(run)) = inlines.last_mut() {
        let trimmed = run.text.trim_end_matches(' ').len();
        run.text.truncate(trimmed);
        if !run.text.is_empty() {
            break;
        }
        inlines.pop();
    }
}

fn has_visible_text(inlines: &[Inline]) -> bool {
    inlines
        .iter()
        .any(|inline| matches!(inline, Inline::Text(run) if !run.text.trim().is_empty()))
}

fn loose_paragraph(mut loose: Vec<Inline>) -> Option<Block> {
    trim_trailing_space(&mut loose);
    has_visible_text(&loose).then(|| Block::paragraph(loose))
}
