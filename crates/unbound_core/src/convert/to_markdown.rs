//! Rich document -> Markdown source.
//!
//! # Responsibility
//! - Serialize a `RichDoc` back to canonical Markdown.
//! - Report which rich-only features a serialization drops.
//!
//! # Invariants
//! - Output never ends with a newline and uses `- ` bullets, `1. ` ordered
//!   markers, ATX headings, backtick fences and `---` rules.
//! - Rich-only styling is dropped; the text it decorated is always kept.
//! - Literal text that would read as Markdown syntax is backslash-escaped.
//! - Every emphasis marker written can open or close where it stands;
//!   emphasis that cannot is dropped from its runs.

use crate::model::rich::{Alignment, Block, Inline, InlineStyle, ListItem, RichDoc, TextRun};
use log::debug;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::ops::Range;

/// Rich-only feature that has no Markdown counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LossyFeature {
    TextColor,
    Highlight,
    FontFamily,
    FontSize,
    Underline,
    Alignment,
    Indent,
}

/// Converts a rich document into Markdown text.
pub fn rich_to_markdown(doc: &RichDoc) -> String {
    let dropped = lossy_features(doc);
    if !dropped.is_empty() {
        debug!(
            "event=conversion_degraded module=convert direction=rich_to_markdown dropped={:?}",
            dropped
        );
    }

    let mut out = render_blocks(&doc.blocks, false).join("\n");
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Lists the rich-only features present in `doc`, i.e. what a Markdown
/// conversion will drop.
pub fn lossy_features(doc: &RichDoc) -> BTreeSet<LossyFeature> {
    let mut found = BTreeSet::new();
    collect_lossy(&doc.blocks, &mut found);
    found
}

fn collect_lossy(blocks: &[Block], found: &mut BTreeSet<LossyFeature>) {
    for block in blocks {
        match block {
            Block::Paragraph { inlines, format } | Block::Heading { inlines, format, .. } => {
                if format.alignment != Alignment::Left {
                    found.insert(LossyFeature::Alignment);
                }
                if format.indent > 0 {
                    found.insert(LossyFeature::Indent);
                }
                for inline in inlines {
                    if let Inline::Text(run) = inline {
                        collect_style_loss(&run.style, found);
                    }
                }
            }
            Block::List { items, .. } => {
                for item in items {
                    collect_lossy(&item.blocks, found);
                }
            }
            Block::Quote { blocks } => collect_lossy(blocks, found),
            Block::CodeBlock { .. } | Block::Rule => {}
        }
    }
}

fn collect_style_loss(style: &InlineStyle, found: &mut BTreeSet<LossyFeature>) {
    if style.color.is_some() {
        found.insert(LossyFeature::TextColor);
    }
    if style.highlight.is_some() {
        found.insert(LossyFeature::Highlight);
    }
    if style.font_family.is_some() {
        found.insert(LossyFeature::FontFamily);
    }
    if style.font_size.is_some() {
        found.insert(LossyFeature::FontSize);
    }
    if style.underline {
        found.insert(LossyFeature::Underline);
    }
}

fn render_blocks(blocks: &[Block], tight: bool) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut previous: Option<&Block> = None;
    let mut alternate_list = false;

    for block in blocks {
        alternate_list = match (previous, block) {
            (
                Some(Block::List { start: before, .. }),
                Block::List { start: current, .. },
            ) if before.is_some() == current.is_some() => !alternate_list,
            _ => false,
        };
        let rendered = render_block(block, alternate_list);
        if rendered.is_empty() {
            continue;
        }
        if let Some(previous) = previous {
            if !(tight && joins_tightly(previous, block)) {
                lines.push(String::new());
            }
        }
        lines.extend(rendered);
        previous = Some(block);
    }
    lines
}

/// Inside tight list items blocks follow each other without a blank line,
/// except where that would merge two paragraphs or turn text into a setext
/// heading.
fn joins_tightly(previous: &Block, next: &Block) -> bool {
    !matches!(
        (previous, next),
        (Block::Paragraph { .. }, Block::Paragraph { .. } | Block::Rule)
    )
}

fn render_block(block: &Block, alternate_list: bool) -> Vec<String> {
    match block {
        Block::Paragraph { inlines, .. } => {
            let text = render_inlines(inlines, false);
            if text.is_empty() {
                return Vec::new();
            }
            text.split('\n').map(str::to_string).collect()
        }
        Block::Heading { level, inlines, .. } => {
            let mut text = render_inlines(inlines, true);
            if text.ends_with('#') {
                text.pop();
                text.push_str("\\#");
            }
            let hashes = "#".repeat(usize::from((*level).clamp(1, 6)));
            if text.is_empty() {
                vec![hashes]
            } else {
                vec![format!("{hashes} {text}")]
            }
        }
        Block::CodeBlock { language, code } => render_code_block(language.as_deref(), code),
        Block::List { start, tight, items } => render_list(*start, *tight, items, alternate_list),
        Block::Quote { blocks } => {
            let inner = render_blocks(blocks, false);
            if inner.is_empty() {
                return vec![">".to_string()];
            }
            inner
                .into_iter()
                .map(|line| {
                    if line.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {line}")
                    }
                })
                .collect()
        }
        Block::Rule => vec!["---".to_string()],
    }
}

fn render_code_block(language: Option<&str>, code: &str) -> Vec<String> {
    let fence = "`".repeat(longest_backtick_run(code).max(2) + 1);
    let info = language.map(|value| value.replace('`', "")).unwrap_or_default();
    let mut lines = vec![format!("{fence}{info}")];
    if !code.is_empty() {
        let body = code.strip_suffix('\n').unwrap_or(code);
        lines.extend(body.split('\n').map(str::to_string));
    }
    lines.push(fence);
    lines
}

fn render_list(
    start: Option<u64>,
    tight: bool,
    items: &[ListItem],
    alternate: bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let marker = match start {
            Some(first) => format!(
                "{}{} ",
                first.saturating_add(index as u64),
                if alternate { ')' } else { '.' }
            ),
            None if alternate => "* ".to_string(),
            None => "- ".to_string(),
        };
        if index > 0 && !tight {
            lines.push(String::new());
        }

        let body = render_blocks(&item.blocks, tight);
        if body.is_empty() {
            lines.push(marker.trim_end().to_string());
            continue;
        }
        let indent = " ".repeat(marker.len());
        for (line_index, line) in body.into_iter().enumerate() {
            if line_index == 0 {
                lines.push(format!("{marker}{line}"));
            } else if line.is_empty() {
                lines.push(line);
            } else {
                lines.push(format!("{indent}{line}"));
            }
        }
    }
    lines
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn render_inlines(inlines: &[Inline], single_line: bool) -> String {
    let mut inlines = Cow::Borrowed(inlines);
    loop {
        let (out, spans) = write_inlines(&inlines, single_line);
        let Some(span) = spans.iter().find(|span| !span.is_flanked(&out)) else {
            return out;
        };
        debug!(
            "event=emphasis_dropped module=convert marker={:?} runs={}",
            span.marker,
            span.runs.len()
        );
        drop_emphasis(inlines.to_mut(), span);
    }
}

fn write_inlines(inlines: &[Inline], single_line: bool) -> (String, Vec<EmphasisSpan>) {
    let mut writer = InlineWriter::new(single_line);
    for (index, inline) in inlines.iter().enumerate() {
        writer.current = index;
        match inline {
            Inline::Text(run) => writer.write_run(run),
            Inline::SoftBreak => writer.pending.soft = true,
            Inline::HardBreak => writer.pending.hard = true,
        }
    }
    writer.current = inlines.len();
    writer.finish()
}

/// Removes the span's emphasis from every run it covered. Run `runs.start`
/// always carries it, so each call makes progress.
fn drop_emphasis(inlines: &mut [Inline], span: &EmphasisSpan) {
    for inline in &mut inlines[span.runs.clone()] {
        if let Inline::Text(run) = inline {
            match span.marker {
                Marker::Strike => run.style.strikethrough = false,
                Marker::Bold => run.style.bold = false,
                Marker::Italic => run.style.italic = false,
                Marker::Link(_) => {}
            }
        }
    }
}

/// Where one emphasis marker pair landed in the output.
#[derive(Debug)]
struct EmphasisSpan {
    marker: Marker,
    open_at: usize,
    close_at: usize,
    /// Inline indexes written while the marker was open.
    runs: Range<usize>,
}

impl EmphasisSpan {
    fn is_flanked(&self, out: &str) -> bool {
        let width = self.marker.opening().len();
        let (before, after) = delimiter_run_neighbors(out, self.open_at, width);
        if !left_flanking(before, after) {
            return false;
        }
        let (before, after) = delimiter_run_neighbors(out, self.close_at, width);
        right_flanking(before, after)
    }
}

/// Characters around the whole delimiter run containing `out[at..at + width]`.
/// Adjacent unescaped copies of the delimiter join the run.
fn delimiter_run_neighbors(out: &str, at: usize, width: usize) -> (Option<char>, Option<char>) {
    let bytes = out.as_bytes();
    let delimiter = bytes[at];
    let mut start = at;
    while start > 0 && bytes[start - 1] == delimiter && !is_escaped(bytes, start - 1) {
        start -= 1;
    }
    let mut end = at + width;
    while end < bytes.len() && bytes[end] == delimiter {
        end += 1;
    }
    (out[..start].chars().next_back(), out[end..].chars().next())
}

fn is_escaped(bytes: &[u8], index: usize) -> bool {
    bytes[..index]
        .iter()
        .rev()
        .take_while(|byte| **byte == b'\\')
        .count()
        % 2
        == 1
}

/// CommonMark left-flanking rule; line edges count as whitespace.
fn left_flanking(before: Option<char>, after: Option<char>) -> bool {
    match after {
        None => false,
        Some(next) if next.is_whitespace() => false,
        Some(next) if is_punctuation(next) => {
            before.map_or(true, |prev| prev.is_whitespace() || is_punctuation(prev))
        }
        Some(_) => true,
    }
}

fn right_flanking(before: Option<char>, after: Option<char>) -> bool {
    left_flanking(after, before)
}

fn is_punctuation(ch: char) -> bool {
    ch.is_ascii_punctuation() || (!ch.is_ascii() && !ch.is_alphanumeric() && !ch.is_whitespace())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Marker {
    Link(String),
    Strike,
    Bold,
    Italic,
}

impl Marker {
    fn opening(&self) -> &'static str {
        match self {
            Self::Link(_) => "[",
            Self::Strike => "~~",
            Self::Bold => "**",
            Self::Italic => "*",
        }
    }

    fn write_closing(&self, out: &mut String) {
        match self {
            Self::Link(url) => {
                out.push_str("](");
                out.push_str(&link_destination(url));
                out.push(')');
            }
            other => out.push_str(other.opening()),
        }
    }
}

/// Markers for a style, outermost first.
fn markers_for(style: &InlineStyle) -> Vec<Marker> {
    let mut markers = Vec::new();
    if let Some(url) = &style.link {
        markers.push(Marker::Link(url.clone()));
    }
    if style.strikethrough {
        markers.push(Marker::Strike);
    }
    if style.bold {
        markers.push(Marker::Bold);
    }
    if style.italic {
        markers.push(Marker::Italic);
    }
    markers
}

fn link_destination(url: &str) -> String {
    if url.contains([' ', '(', ')']) {
        format!("<{}>", url.replace('<', "%3C").replace('>', "%3E"))
    } else {
        url.to_string()
    }
}

#[derive(Debug, Default)]
struct PendingSpace {
    spaces: String,
    soft: bool,
    hard: bool,
}

/// Writes styled runs, keeping whitespace outside emphasis markers so the
/// markers stay left/right-flanking.
struct InlineWriter {
    out: String,
    open: Vec<Marker>,
    /// Output offset and opening inline index, parallel to `open`.
    opened: Vec<(usize, usize)>,
    spans: Vec<EmphasisSpan>,
    current: usize,
    pending: PendingSpace,
    line_start: bool,
    single_line: bool,
}

impl InlineWriter {
    fn new(single_line: bool) -> Self {
        Self {
            out: String::new(),
            open: Vec::new(),
            opened: Vec::new(),
            spans: Vec::new(),
            current: 0,
            pending: PendingSpace::default(),
            line_start: !single_line,
            single_line,
        }
    }

    fn write_run(&mut self, run: &TextRun) {
        let desired = markers_for(&run.style);
        if run.style.code {
            if run.text.is_empty() {
                return;
            }
            self.close_to(&desired);
            self.flush_pending();
            self.open_markers(&desired);
            self.out.push_str(&code_span(&run.text));
            self.line_start = false;
            return;
        }

        let without_leading = run.text.trim_start();
        let leading = &run.text[..run.text.len() - without_leading.len()];
        let core = without_leading.trim_end();
        let trailing = &without_leading[core.len()..];

        self.pend_whitespace(leading);
        if core.is_empty() {
            return;
        }
        self.close_to(&desired);
        self.flush_pending();
        self.open_markers(&desired);
        self.write_escaped(core);
        self.pend_whitespace(trailing);
    }

    fn finish(mut self) -> (String, Vec<EmphasisSpan>) {
        self.close_to(&[]);
        (self.out, self.spans)
    }

    fn pend_whitespace(&mut self, whitespace: &str) {
        for ch in whitespace.chars() {
            match ch {
                '\n' => self.pending.soft = true,
                '\r' => {}
                other => self.pending.spaces.push(other),
            }
        }
    }

    fn flush_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if self.out.is_empty() {
            return;
        }
        if pending.soft || pending.hard {
            if self.single_line {
                self.out.push(' ');
                return;
            }
            self.trim_trailing_spaces();
            if pending.hard {
                self.out.push('\\');
            }
            self.out.push('\n');
            self.line_start = true;
        } else {
            self.out.push_str(&pending.spaces);
        }
    }

    fn close_to(&mut self, desired: &[Marker]) {
        let keep = self
            .open
            .iter()
            .take_while(|marker| desired.contains(marker))
            .count();
        while self.open.len() > keep {
            let (Some(marker), Some((open_at, start))) = (self.open.pop(), self.opened.pop())
            else {
                break;
            };
            let close_at = self.out.len();
            marker.write_closing(&mut self.out);
            if !matches!(marker, Marker::Link(_)) {
                self.spans.push(EmphasisSpan {
                    marker,
                    open_at,
                    close_at,
                    runs: start..self.current,
                });
            }
        }
    }

    fn open_markers(&mut self, desired: &[Marker]) {
        for marker in desired {
            if !self.open.contains(marker) {
                self.opened.push((self.out.len(), self.current));
                self.out.push_str(marker.opening());
                self.open.push(marker.clone());
                self.line_start = false;
            }
        }
    }

    fn trim_trailing_spaces(&mut self) {
        let trimmed = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(trimmed);
    }

    fn inside_link(&self) -> bool {
        self.open.iter().any(|marker| matches!(marker, Marker::Link(_)))
    }

    fn write_escaped(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let mut index = 0;
        while index < chars.len() {
            let ch = chars[index];
            let prev = index.checked_sub(1).map(|i| chars[i]);
            let next = chars.get(index + 1).copied();

            if ch == '\n' {
                self.trim_trailing_spaces();
                if self.single_line {
                    self.out.push(' ');
                } else {
                    self.out.push('\n');
                    self.line_start = true;
                }
                index += 1;
                continue;
            }
            if ch == '\r' {
                index += 1;
                continue;
            }

            if self.line_start {
                if ch == ' ' || ch == '\t' {
                    self.out.push(ch);
                    index += 1;
                    continue;
                }
                self.line_start = false;
                if matches!(ch, '#' | '>' | '-' | '+' | '=') {
                    self.out.push('\\');
                    self.out.push(ch);
                    index += 1;
                    continue;
                }
                if ch.is_ascii_digit() {
                    let digits_end = chars[index..]
                        .iter()
                        .position(|c| !c.is_ascii_digit())
                        .map_or(chars.len(), |offset| index + offset);
                    if digits_end - index <= 9
                        && matches!(chars.get(digits_end), Some('.') | Some(')'))
                    {
                        self.out.extend(&chars[index..digits_end]);
                        self.out.push('\\');
                        self.out.push(chars[digits_end]);
                        index = digits_end + 1;
                        continue;
                    }
                }
            }

            let escape = match ch {
                '\\' => next.map_or(true, |c| c.is_ascii_punctuation()),
                '*' => !(is_space(prev) && is_space(next)),
                '_' => {
                    let intraword = prev.is_some_and(char::is_alphanumeric)
                        && next.is_some_and(char::is_alphanumeric);
                    !(intraword || (is_space(prev) && is_space(next)))
                }
                '`' | '~' => true,
                '[' => chars[index + 1..].contains(&']'),
                ']' => self.inside_link(),
                '<' => {
                    next.is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
                }
                '&' => looks_like_entity(&chars[index + 1..]),
                _ => false,
            };
            if escape {
                self.out.push('\\');
            }
            self.out.push(ch);
            index += 1;
        }
    }
}

fn is_space(ch: Option<char>) -> bool {
    ch.is_some_and(char::is_whitespace)
}

fn looks_like_entity(rest: &[char]) -> bool {
    let body = match rest.first() {
        Some('#') => &rest[1..],
        _ => rest,
    };
    let name_len = body
        .iter()
        .take_while(|c| c.is_ascii_alphanumeric())
        .count();
    name_len > 0 && body.get(name_len) == Some(&';')
}

fn code_span(text: &str) -> String {
    let mut fence_len = 1;
    while contains_backtick_run(text, fence_len) {
        fence_len += 1;
    }
    let fence = "`".repeat(fence_len);
    let needs_padding = text.starts_with('`')
        || text.ends_with('`')
        || (text.starts_with(' ') && text.ends_with(' ') && !text.trim().is_empty());
    if needs_padding {
        format!("{fence} {text} {fence}")
    } else {
        format!("{fence}{text}{fence}")
    }
}

fn contains_backtick_run(text: &str, len: usize) -> bool {
    let mut current = 0;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
        } else {
            if current == len {
                return true;
            }
            current = 0;
        }
    }
    current == len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rich::BlockFormat;

    fn para(inlines: Vec<Inline>) -> Block {
        Block::paragraph(inlines)
    }

    fn md(blocks: Vec<Block>) -> String {
        rich_to_markdown(&RichDoc::new(blocks))
    }

    #[test]
    fn whitespace_moves_outside_emphasis() {
        let out = md(vec![para(vec![
            Inline::text("Hello"),
            Inline::styled(" world ", InlineStyle::bold()),
            Inline::text("again"),
        ])]);
        assert_eq!(out, "Hello **world** again");
    }

    #[test]
    fn nested_styles_share_markers() {
        let bold_italic = InlineStyle {
            bold: true,
            italic: true,
            ..InlineStyle::default()
        };
        let out = md(vec![para(vec![
            Inline::styled("a", InlineStyle::bold()),
            Inline::styled("b", bold_italic),
        ])]);
        assert_eq!(out, "**a*b***");
    }

    #[test]
    fn emphasis_that_cannot_flank_is_dropped() {
        let strike = InlineStyle {
            strikethrough: true,
            ..InlineStyle::default()
        };
        let bold = InlineStyle::bold;
        let cases = [
            (
                vec![Inline::text("a"), Inline::styled("(b)", bold()), Inline::text("c")],
                "a(b)c",
            ),
            (
                vec![
                    Inline::text("say"),
                    Inline::styled("\"hi\"", InlineStyle::italic()),
                    Inline::text("now"),
                ],
                "say\"hi\"now",
            ),
            (
                vec![Inline::styled("end.", bold()), Inline::text("next")],
                "end.next",
            ),
            (
                vec![Inline::text("pre"), Inline::styled("*star", bold())],
                "pre\\*star",
            ),
            (
                vec![Inline::text("a"), Inline::styled("(b)", strike), Inline::text("c")],
                "a(b)c",
            ),
        ];
        for (inlines, expected) in cases {
            assert_eq!(md(vec![para(inlines)]), expected);
        }
    }

    #[test]
    fn only_the_unflanked_span_loses_emphasis() {
        let out = md(vec![para(vec![
            Inline::text("x"),
            Inline::styled("(y)", InlineStyle::bold()),
            Inline::text("z "),
            Inline::styled("w", InlineStyle::italic()),
        ])]);
        assert_eq!(out, "x(y)z *w*");
    }

    #[test]
    fn flanked_emphasis_next_to_punctuation_is_kept() {
        let out = md(vec![para(vec![
            Inline::text("a "),
            Inline::styled("(b)", InlineStyle::bold()),
            Inline::text(" un"),
            Inline::styled("believ", InlineStyle::italic()),
            Inline::text("able"),
        ])]);
        assert_eq!(out, "a **(b)** un*believ*able");

        let linked_bold = InlineStyle {
            bold: true,
            link: Some("u".to_string()),
            ..InlineStyle::default()
        };
        let out = md(vec![para(vec![
            Inline::text("a"),
            Inline::styled("(b)", linked_bold),
            Inline::text("c"),
        ])]);
        assert_eq!(out, "a[**(b)**](u)c");
    }

    #[test]
    fn literal_markdown_syntax_is_escaped() {
        let out = md(vec![para(vec![Inline::text("# not a heading *and* 1. item")])]);
        assert_eq!(out, "\\# not a heading \\*and\\* 1. item");

        let out = md(vec![para(vec![Inline::text("2. second")])]);
        assert_eq!(out, "2\\. second");
    }

    #[test]
    fn lone_operators_and_snake_case_are_left_alone() {
        let out = md(vec![para(vec![Inline::text("2 * 3 with snake_case")])]);
        assert_eq!(out, "2 * 3 with snake_case");
    }

    #[test]
    fn code_spans_pick_a_safe_fence() {
        assert_eq!(code_span("a`b"), "``a`b``");
        assert_eq!(code_span("`x`"), "`` `x` ``");
        assert_eq!(code_span("plain"), "`plain`");
    }

    #[test]
    fn code_block_fence_outgrows_content() {
        let out = md(vec![Block::CodeBlock {
            language: Some("md".to_string()),
            code: "```\ninner\n```\n".to_string(),
        }]);
        assert_eq!(out, "````md\n```\ninner\n```\n````");
    }

    #[test]
    fn lists_and_quotes_prefix_continuation_lines() {
        let out = md(vec![
            Block::List {
                start: Some(9),
                tight: true,
                items: vec![
                    ListItem {
                        blocks: vec![para(vec![Inline::text("nine")])],
                    },
                    ListItem {
                        blocks: vec![
                            para(vec![Inline::text("ten")]),
                            Block::List {
                                start: None,
                                tight: true,
                                items: vec![ListItem {
                                    blocks: vec![para(vec![Inline::text("nested")])],
                                }],
                            },
                        ],
                    },
                ],
            },
            Block::Quote {
                blocks: vec![
                    para(vec![Inline::text("quoted")]),
                    para(vec![Inline::text("twice")]),
                ],
            },
        ]);
        assert_eq!(
            out,
            "9. nine\n10. ten\n    - nested\n\n> quoted\n>\n> twice"
        );
    }

    #[test]
    fn adjacent_lists_alternate_markers() {
        let item = |text: &str| ListItem {
            blocks: vec![para(vec![Inline::text(text)])],
        };
        let out = md(vec![
            Block::List {
                start: None,
                tight: true,
                items: vec![item("a")],
            },
            Block::List {
                start: None,
                tight: true,
                items: vec![item("b")],
            },
        ]);
        assert_eq!(out, "- a\n\n* b");
    }

    #[test]
    fn rich_only_styling_is_dropped_but_text_kept() {
        let fancy = InlineStyle {
            underline: true,
            color: Some("#ff0000".to_string()),
            highlight: Some("yellow".to_string()),
            font_family: Some("Georgia".to_string()),
            font_size: Some(18.0),
            ..InlineStyle::default()
        };
        let doc = RichDoc::new(vec![Block::Paragraph {
            inlines: vec![Inline::text("keep "), Inline::styled("this", fancy)],
            format: BlockFormat {
                alignment: Alignment::Justify,
                indent: 2,
            },
        }]);

        assert_eq!(rich_to_markdown(&doc), "keep this");
        let lost = lossy_features(&doc);
        assert_eq!(lost.len(), 7);
        assert!(lost.contains(&LossyFeature::Alignment));
        assert!(lost.contains(&LossyFeature::FontSize));
    }

    #[test]
    fn hard_breaks_use_backslash_and_trailing_break_is_dropped() {
        let out = md(vec![para(vec![
            Inline::text("line one"),
            Inline::HardBreak,
            Inline::text("line two"),
            Inline::HardBreak,
        ])]);
        assert_eq!(out, "line one\\\nline two");
    }

    #[test]
    fn links_render_with_destination() {
        let link = InlineStyle {
            link: Some("https://example.com/a b".to_string()),
            ..InlineStyle::default()
        };
        let out = md(vec![para(vec![
            Inline::text("see "),
            Inline::styled("here", link),
        ])]);
        assert_eq!(out, "see [here](<https://example.com/a b>)");
    }
}
