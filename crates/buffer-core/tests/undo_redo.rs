use buffer_core::{Buffer, EditorConfig, Motion, Position, View};
use pretty_assertions::assert_eq;

fn setup(text: &str) -> (Buffer, View) {
    let mut buffer = Buffer::from_text(text);
    let view = View::new(&mut buffer, &EditorConfig::default());
    (buffer, view)
}

#[test]
fn test_undo_redo_single_insert() {
    let (mut buffer, mut view) = setup("");

    view.insert_text(&mut buffer, "a");
    assert_eq!(buffer.text(), "a");
    assert!(view.history().can_undo());
    assert!(!view.history().can_redo());

    assert!(view.undo(&mut buffer));
    assert_eq!(buffer.text(), "");
    assert!(!view.history().can_undo());
    assert!(view.history().can_redo());

    assert!(view.redo(&mut buffer));
    assert_eq!(buffer.text(), "a");
    assert!(view.history().can_undo());
    assert!(!view.history().can_redo());
}

#[test]
fn test_consecutive_inserts_coalesce() {
    let (mut buffer, mut view) = setup("");
    for ch in ["a", "b", "c"] {
        view.insert_text(&mut buffer, ch);
    }
    assert_eq!(buffer.text(), "abc");
    assert_eq!(view.history().undo_depth(), 1);

    // One undo reverts the whole group.
    assert!(view.undo(&mut buffer));
    assert_eq!(buffer.text(), "");
    assert_eq!(view.history().undo_depth(), 0);
    assert_eq!(view.history().redo_depth(), 1);

    // One redo re-applies it.
    assert!(view.redo(&mut buffer));
    assert_eq!(buffer.text(), "abc");
    assert_eq!(view.history().redo_depth(), 0);
}

#[test]
fn test_moving_away_starts_a_new_step() {
    let (mut buffer, mut view) = setup("first\nsecond");
    view.move_cursor(&mut buffer, Motion::LineEnd, false);
    view.insert_text(&mut buffer, "!");
    view.move_cursor(&mut buffer, Motion::BufferEnd, false);
    view.insert_text(&mut buffer, "?");
    assert_eq!(buffer.text(), "first!\nsecond?");

    assert!(view.undo(&mut buffer));
    assert_eq!(buffer.text(), "first!\nsecond");
    assert_eq!(view.cursor(&buffer), Some(Position::new(2, 6)));
    assert!(view.undo(&mut buffer));
    assert_eq!(buffer.text(), "first\nsecond");
    assert_eq!(view.cursor(&buffer), Some(Position::new(1, 5)));
}

#[test]
fn test_backspace_run_is_one_step() {
    let (mut buffer, mut view) = setup("hello world");
    view.move_cursor(&mut buffer, Motion::LineEnd, false);
    for _ in 0..6 {
        assert!(view.delete_backward(&mut buffer));
    }
    assert_eq!(buffer.text(), "hello");

    assert!(view.undo(&mut buffer));
    assert_eq!(buffer.text(), "hello world");
    assert_eq!(view.cursor(&buffer), Some(Position::new(1, 11)));
    assert!(!view.undo(&mut buffer));
}

#[test]
fn test_new_edit_discards_redo() {
    let (mut buffer, mut view) = setup("");
    view.insert_text(&mut buffer, "abc");
    view.undo(&mut buffer);
    assert!(view.history().can_redo());

    view.insert_text(&mut buffer, "x");
    assert!(!view.history().can_redo());
    assert!(!view.redo(&mut buffer));
    assert_eq!(buffer.text(), "x");
}

#[test]
fn test_modified_tracks_save_point() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("doc.txt");
    std::fs::write(&path, "text\n").unwrap();

    let mut buffer = Buffer::open(&path).unwrap();
    let mut view = View::new(&mut buffer, &EditorConfig::default());
    assert!(!view.modified());

    view.insert_text(&mut buffer, "my ");
    assert!(view.modified());
    view.save(&mut buffer).unwrap();
    assert!(!view.modified());
    assert!(!buffer.modified());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "my text\n");

    view.insert_text(&mut buffer, "new ");
    assert!(view.modified());
    assert!(view.undo(&mut buffer));
    assert!(!view.modified());
    assert!(view.undo(&mut buffer));
    assert!(view.modified());
    assert_eq!(buffer.text(), "text");
    assert!(view.redo(&mut buffer));
    assert!(!view.modified());
}

#[test]
fn test_multi_line_selection_round_trip() {
    let (mut buffer, mut view) = setup("alpha\nbeta\ngamma\ndelta");
    view.set_cursor(&mut buffer, Position::new(1, 2), false);
    view.set_cursor(&mut buffer, Position::new(3, 3), true);
    assert_eq!(
        view.selected_text(&buffer).as_deref(),
        Some("pha\nbeta\ngam")
    );

    view.insert_text(&mut buffer, "X\nY");
    assert_eq!(buffer.text(), "alX\nYma\ndelta");

    assert!(view.undo(&mut buffer));
    assert!(view.undo(&mut buffer));
    assert_eq!(buffer.text(), "alpha\nbeta\ngamma\ndelta");
    assert!(view.redo(&mut buffer));
    assert!(view.redo(&mut buffer));
    assert_eq!(buffer.text(), "alX\nYma\ndelta");
}

#[test]
fn test_undo_limit_from_config() {
    let config = EditorConfig::from_toml_str("undo_limit = 1").unwrap();
    let mut buffer = Buffer::create();
    let mut view = View::new(&mut buffer, &config);

    view.insert_text(&mut buffer, "one");
    view.set_cursor(&mut buffer, Position::new(1, 1), false);
    view.insert_text(&mut buffer, "X");
    assert_eq!(buffer.text(), "oXne");
    assert_eq!(view.history().undo_depth(), 1);

    assert!(view.undo(&mut buffer));
    assert!(!view.undo(&mut buffer));
    assert_eq!(buffer.text(), "one");
}
