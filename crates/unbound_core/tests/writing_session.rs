use std::cell::RefCell;
use std::rc::Rc;
use unbound_core::{
    ChapterStore, DocumentSnapshot, EditorError, EditorMode, EditorModeController, EditorSurface,
    ExportWarning, LiveContent, LiveEdit, ModeChange, OutlineError, SectionKind, SessionConfig,
    WritingSession,
};

fn markdown(text: &str) -> LiveEdit {
    LiveEdit::Markdown(text.to_string())
}

#[test]
fn hello_world_survives_rich_mode() {
    let mut editor = EditorModeController::default();
    editor.set_content("Hello **world**");
    editor.set_mode(EditorMode::RichText);
    editor.set_mode(EditorMode::Markdown);
    assert_eq!(editor.content(), "Hello **world**");
}

#[test]
fn mode_switch_cycle_is_stable() {
    let mut editor = EditorModeController::default();
    editor.set_content("# Notes\n\n- a\n- b\n\nSome *text* with `code`");
    editor.set_mode(EditorMode::RichText);
    let first = editor.live_content().clone();
    editor.set_mode(EditorMode::Markdown);
    editor.set_mode(EditorMode::RichText);
    assert_eq!(editor.live_content(), &first);
    assert!(matches!(first, LiveContent::Rich(_)));
}

#[test]
fn empty_store_creates_chapter_on_get() {
    let mut store = ChapterStore::new();
    let chapter = store.get("ch1");
    assert_eq!(chapter.title, "ch1");
    assert_eq!(chapter.content, "");
}

#[test]
fn switching_chapters_keeps_draft() {
    let mut session = WritingSession::default();
    session.item_selected("ch1");
    session.content_changed(markdown("draft")).unwrap();
    let second = session.item_selected("ch2");
    assert_eq!(second.content, "");

    let first = session.item_selected("ch1");
    assert_eq!(first.content, "draft");
    assert_eq!(session.editor().content(), "draft");
}

#[test]
fn switching_without_autosave_still_flushes() {
    let config = SessionConfig {
        autosave_on_change: false,
        ..SessionConfig::default()
    };
    let mut session = WritingSession::new(config);
    session.item_selected("ch1");
    session.content_changed(markdown("kept on switch")).unwrap();
    session.item_selected("ch2");
    assert_eq!(session.item_selected("ch1").content, "kept on switch");
}

#[test]
fn rich_edits_are_stored_as_markdown() {
    let config = SessionConfig {
        initial_mode: EditorMode::RichText,
        ..SessionConfig::default()
    };
    let mut session = WritingSession::new(config);
    session.item_selected("ch1");
    let stats = session
        .content_changed(LiveEdit::Html(
            "<p>Hello <b>world</b></p><p>second paragraph</p>".to_string(),
        ))
        .unwrap();
    assert_eq!(stats.words, 4);
    assert_eq!(stats.paragraphs, 2);

    session.item_selected("ch2");
    let view = session.item_selected("ch1");
    assert_eq!(view.content, "Hello **world**\n\nsecond paragraph");
    assert_eq!(session.mode(), EditorMode::RichText);
}

#[test]
fn wrong_representation_is_rejected_and_nothing_saved() {
    let mut session = WritingSession::default();
    session.item_selected("ch1");
    let err = session
        .content_changed(LiveEdit::Html("<p>x</p>".to_string()))
        .unwrap_err();
    assert!(matches!(err, EditorError::ModeMismatch { .. }));
    assert_eq!(session.store().find("ch1").unwrap().content, "");
}

#[test]
fn statistics_follow_content_changes() {
    let mut session = WritingSession::default();
    session.item_selected("ch1");
    let stats = session.content_changed(markdown("one two\n\nthree")).unwrap();
    assert_eq!(stats.words, 3);
    assert_eq!(stats.paragraphs, 2);
    assert_eq!(stats.avg_words_per_paragraph, 1.5);
    assert_eq!(session.statistics(), stats);
}

#[test]
fn empty_export_reports_warning() {
    let mut session = WritingSession::default();
    session.item_selected("ch1");
    assert_eq!(session.export_markdown(), Err(ExportWarning::EmptyContent));
    assert_eq!(
        ExportWarning::EmptyContent.to_string(),
        "No content to export."
    );

    session.import_markdown("imported *text*");
    assert_eq!(session.export_markdown().unwrap(), "imported *text*");
    assert_eq!(session.store().find("ch1").unwrap().content, "imported *text*");
}

#[test]
fn mode_changes_reach_host_callback() {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let mut session = WritingSession::default();
    session.set_mode_change_callback(move |change| sink.borrow_mut().push(change));

    session.toggle_mode();
    assert!(!session.set_mode(EditorMode::RichText));
    assert!(session.editor().formatting_enabled());
    session.toggle_mode();

    assert_eq!(
        *changes.borrow(),
        vec![
            ModeChange {
                from: EditorMode::Markdown,
                to: EditorMode::RichText,
            },
            ModeChange {
                from: EditorMode::RichText,
                to: EditorMode::Markdown,
            },
        ]
    );
}

#[test]
fn renaming_outline_item_renames_chapter() {
    let mut session = WritingSession::default();
    assert_eq!(session.item_selected("item_9").title, "Untitled Chapter");
    session.rename_item("item_9", "Chapter One").unwrap();
    assert_eq!(session.store().find("item_9").unwrap().title, "Chapter One");

    assert_eq!(
        session.rename_item("missing", "x"),
        Err(OutlineError::ItemNotFound("missing".to_string()))
    );
    assert_eq!(
        session.move_item("item_14", 0),
        Err(OutlineError::NotReorderable {
            id: "item_14".to_string(),
            section: SectionKind::BackMatter,
        })
    );
}

#[test]
fn added_items_become_chapters_on_selection() {
    let mut session = WritingSession::default();
    let id = session.add_item(SectionKind::Body, "Chapter Two").unwrap();
    session.move_item(&id, 3).unwrap();
    let view = session.item_selected(&id);
    assert_eq!(view.title, "Chapter Two");
    let body = &session.outline().sections()[1];
    assert_eq!(body.items[3].id, id);
}

#[test]
fn total_word_count_includes_live_buffer() {
    let config = SessionConfig {
        autosave_on_change: false,
        ..SessionConfig::default()
    };
    let mut session = WritingSession::new(config);
    session.item_selected("a");
    session.content_changed(markdown("one two three")).unwrap();
    session.item_selected("b");
    session.content_changed(markdown("four five")).unwrap();
    assert_eq!(session.total_word_count(), 5);
}

#[test]
fn snapshot_orders_chapters_and_serializes_records() {
    let mut session = WritingSession::default();
    session.set_project_title("My Novel");
    session.item_selected("zeta");
    session.content_changed(markdown("loose")).unwrap();
    session.item_selected("item_9");
    session.content_changed(markdown("body")).unwrap();
    session.rename_item("item_9", "Chapter One").unwrap();
    session.item_selected("item_7");
    session.content_changed(markdown("pro")).unwrap();

    let snapshot = session.snapshot();
    let ids: Vec<&str> = snapshot.chapters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["item_7", "item_9", "zeta"]);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["project_title"], "My Novel");
    assert_eq!(
        json["chapters"][0],
        serde_json::json!({ "id": "item_7", "title": "Prologue", "content": "pro" })
    );

    let decoded: DocumentSnapshot = serde_json::from_value(json).unwrap();
    let mut reopened = WritingSession::from_snapshot(SessionConfig::default(), decoded);
    assert_eq!(reopened.project_title(), "My Novel");
    assert_eq!(reopened.outline().select("item_9").unwrap().title, "Chapter One");
    assert_eq!(reopened.active_id(), None);
    assert_eq!(reopened.item_selected("item_9").content, "body");
    assert_eq!(reopened.total_word_count(), 3);
}

#[test]
fn rich_buffer_cycle_keeps_text_and_settles() {
    let mut editor = EditorModeController::new(EditorMode::RichText);
    editor
        .apply_edit(LiveEdit::Html(
            "<p>a<b>(b)</b>c and <i>\"quoted\"</i>, <s>gone</s>.</p>".to_string(),
        ))
        .unwrap();
    let before = editor.plain_text();

    editor.set_mode(EditorMode::Markdown);
    editor.set_mode(EditorMode::RichText);
    let settled = editor.live_content().clone();
    assert_eq!(editor.plain_text(), before);
    assert_eq!(editor.content(), "a(b)c and *\"quoted\"*, ~~gone~~.");

    editor.set_mode(EditorMode::Markdown);
    editor.set_mode(EditorMode::RichText);
    assert_eq!(editor.live_content(), &settled);
}

#[test]
fn flanked_rich_buffer_survives_mode_cycle_unchanged() {
    let mut editor = EditorModeController::new(EditorMode::RichText);
    editor
        .apply_edit(LiveEdit::Html(
            "<p>Say <b>\"hi\"</b> and <i>(wave)</i>, <s>no.</s> <a href=\"u\">link!</a></p>"
                .to_string(),
        ))
        .unwrap();
    let original = editor.live_content().clone();

    editor.set_mode(EditorMode::Markdown);
    editor.set_mode(EditorMode::RichText);
    assert_eq!(editor.live_content(), &original);
}
