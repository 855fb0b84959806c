//! Edit session example
//!
//! Opens a file through `Buffers`, edits it through a `View`, walks the undo history and
//! saves the result.

use buffer_core::{Buffers, EditorConfig, Motion, Position, View};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "shopping\r\n- milk\r\n- bread\r\n")?;

    let config = EditorConfig::from_toml_str("undo_limit = 100")?;
    let mut buffers = Buffers::new(config.clone());
    let id = buffers.open_file(&path)?;
    let buffer = buffers.get_mut(id).ok_or("buffer vanished")?;
    println!("opened '{}' with {} lines", buffer.name(), buffer.line_count());

    let mut view = View::new(buffer, &config);

    // 1. Typing
    view.move_cursor(buffer, Motion::BufferEnd, false);
    view.insert_text(buffer, "- eggs");
    view.break_line(buffer);
    view.insert_text(buffer, "- tea");
    println!("\n1. after typing:\n{}", buffer.text());

    // 2. Replacing a selection
    view.set_cursor(buffer, Position::new(1, 0), false);
    view.move_cursor(buffer, Motion::LineEnd, true);
    println!("\n2. selected: {:?}", view.selected_text(buffer));
    view.insert_text(buffer, "Shopping list");
    println!("{}", buffer.text());

    // 3. Undo and redo
    view.undo(buffer);
    view.undo(buffer);
    println!("\n3. after two undos:\n{}", buffer.text());
    view.redo(buffer);
    view.redo(buffer);
    println!("after two redos (modified: {}):\n{}", view.modified(), buffer.text());

    // 4. Saving
    view.save(buffer)?;
    println!("\n4. saved, modified: {}", view.modified());
    print!("{}", std::fs::read_to_string(&path)?);

    view.release(buffer);
    let closed = buffers.close(id)?;
    println!("\nclosed '{}', {} buffers open", closed.name(), buffers.len());
    Ok(())
}
