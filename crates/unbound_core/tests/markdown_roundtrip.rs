use unbound_core::{
    lossy_features, markdown_to_html, markdown_to_rich, rich_to_markdown, Alignment, Block,
    BlockFormat, Inline, InlineStyle, LossyFeature, RichDoc,
};

fn roundtrip(markdown: &str) -> String {
    rich_to_markdown(&markdown_to_rich(markdown))
}

#[test]
fn supported_constructs_survive_markdown_roundtrip() {
    let cases = [
        "Hello **world**",
        "# Title\n\nSome *italic* and ~~struck~~ text with `code`.",
        "- one\n- two\n\n1. first\n2. second",
        "> quoted line\n\n---\n\n```rust\nfn main() {}\n```",
        "## Sub heading\n\n- nested\n  - inner\n- back",
        "[link](https://example.com) and **bold *nested* text**",
        "###### Deepest\n\n3. three\n4. four",
    ];
    for markdown in cases {
        assert_eq!(roundtrip(markdown), markdown, "round trip of {markdown:?}");
    }
}

#[test]
fn roundtrip_normalizes_alternative_syntax() {
    assert_eq!(roundtrip("* star\n* list"), "- star\n- list");
    assert_eq!(roundtrip("__strong__ and _em_"), "**strong** and *em*");
    assert_eq!(roundtrip("Title\n====="), "# Title");
    assert_eq!(roundtrip("***"), "---");
    assert_eq!(roundtrip("text\n\n\n\nmore  \n"), "text\n\nmore");
}

#[test]
fn unmatched_markers_stay_literal_across_roundtrips() {
    let source = "a **b and c";
    let once = roundtrip(source);
    assert_eq!(markdown_to_rich(&once).plain_text(), source);
    assert_eq!(roundtrip(&once), once);
}

#[test]
fn unterminated_fence_keeps_all_text() {
    let doc = markdown_to_rich("intro\n\n```\nunterminated\nstill code");
    let markdown = rich_to_markdown(&doc);
    assert!(markdown.starts_with("intro\n\n```\nunterminated\nstill code"));
    assert!(markdown.ends_with("```"));
}

#[test]
fn rich_only_features_are_dropped_without_touching_text() {
    let colored = InlineStyle {
        bold: true,
        color: Some("#aa0000".to_string()),
        font_size: Some(20.0),
        ..InlineStyle::default()
    };
    let doc = RichDoc::new(vec![Block::Paragraph {
        inlines: vec![
            Inline::text("Before "),
            Inline::styled("loud", colored),
            Inline::text(" after"),
        ],
        format: BlockFormat {
            alignment: Alignment::Right,
            indent: 0,
        },
    }]);

    assert_eq!(rich_to_markdown(&doc), "Before **loud** after");
    let lost: Vec<LossyFeature> = lossy_features(&doc).into_iter().collect();
    assert_eq!(
        lost,
        vec![
            LossyFeature::TextColor,
            LossyFeature::FontSize,
            LossyFeature::Alignment
        ]
    );
}

#[test]
fn markdown_from_supported_set_has_no_lossy_features() {
    let doc = markdown_to_rich("# T\n\n**b** *i* ~~s~~ `c` [l](u)\n\n> q");
    assert!(lossy_features(&doc).is_empty());
}

#[test]
fn html_view_of_markdown_reads_back_to_same_markdown() {
    let markdown = "# Title\n\nHello **world** and *you*\n\n- a\n- b\n\n> quote\n\n```\ncode\n```";
    let html = markdown_to_html(markdown);
    assert_eq!(rich_to_markdown(&RichDoc::from_html(&html)), markdown);
}

fn link_to(url: &str) -> InlineStyle {
    InlineStyle {
        link: Some(url.to_string()),
        ..InlineStyle::default()
    }
}

fn struck() -> InlineStyle {
    InlineStyle {
        strikethrough: true,
        ..InlineStyle::default()
    }
}

#[test]
fn rich_styles_glued_to_words_keep_their_text() {
    let doc = RichDoc::new(vec![Block::paragraph(vec![
        Inline::text("a"),
        Inline::styled("(b)", InlineStyle::bold()),
        Inline::text("c, say"),
        Inline::styled("\"hi\"", InlineStyle::italic()),
        Inline::text("now "),
        Inline::styled("gone.", struck()),
        Inline::text("next "),
        Inline::styled("(site)", link_to("https://example.com")),
        Inline::text("!"),
    ])]);

    let markdown = rich_to_markdown(&doc);
    assert_eq!(
        markdown,
        "a(b)c, say\"hi\"now gone.next [(site)](https://example.com)!"
    );
    let reparsed = markdown_to_rich(&markdown);
    assert_eq!(reparsed.plain_text(), doc.plain_text());
    assert_eq!(rich_to_markdown(&reparsed), markdown);
}

#[test]
fn rich_styles_next_to_punctuation_survive_when_flanked() {
    let doc = RichDoc::new(vec![Block::paragraph(vec![
        Inline::text("Say "),
        Inline::styled("\"hi\"", InlineStyle::bold()),
        Inline::text(" and "),
        Inline::styled("(wave)", InlineStyle::italic()),
        Inline::text(", "),
        Inline::styled("no.", struck()),
        Inline::text(" "),
        Inline::styled("link!", link_to("https://example.com")),
    ])]);

    let markdown = rich_to_markdown(&doc);
    assert_eq!(
        markdown,
        "Say **\"hi\"** and *(wave)*, ~~no.~~ [link!](https://example.com)"
    );
    assert_eq!(markdown_to_rich(&markdown), doc);
}
