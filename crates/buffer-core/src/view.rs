//! Editing surface state.
//!
//! A [`View`] is what one editor pane needs on top of a [`Buffer`]: an insertion point,
//! a selection anchor, the first visible line and an [`Undo`] log. Its methods are the
//! editing gestures of a front end, without any rendering.

use crate::buffer::{Buffer, BufferId};
use crate::config::EditorConfig;
use crate::error::BufferError;
use crate::point::{PointId, PointRole, Position};
use crate::undo::Undo;

/// Cursor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    /// One character left, wrapping to the previous line.
    Left,
    /// One character right, wrapping to the next line.
    Right,
    /// One line up.
    Up,
    /// One line down.
    Down,
    /// Start of the line.
    LineStart,
    /// End of the line.
    LineEnd,
    /// Start of the buffer.
    BufferStart,
    /// End of the buffer.
    BufferEnd,
}

/// Cursor, selection and history of one editor pane.
///
/// The selection is the text between the insertion point and the selection point; it is
/// empty when both are at the same position.
#[derive(Debug)]
pub struct View {
    buffer: BufferId,
    insertion: PointId,
    selection: PointId,
    page_top: PointId,
    undo: Undo,
}

impl View {
    /// Create a view at the start of `buffer`.
    pub fn new(buffer: &mut Buffer, config: &EditorConfig) -> Self {
        let start = Position::new(1, 0);
        let insertion = buffer.new_point_at(PointRole::Interactive, start);
        let selection = buffer.new_point_at(PointRole::Interactive, start);
        let page_top = buffer.new_point_at(PointRole::Interactive, start);
        let mut undo = Undo::with_config(buffer, config);
        undo.set_unmodified();
        Self {
            buffer: buffer.id(),
            insertion,
            selection,
            page_top,
            undo,
        }
    }

    /// The buffer this view edits.
    pub fn buffer_id(&self) -> BufferId {
        self.buffer
    }

    /// The insertion point (the cursor).
    pub fn insertion_point(&self) -> PointId {
        self.insertion
    }

    /// The selection anchor.
    pub fn selection_point(&self) -> PointId {
        self.selection
    }

    /// The point marking the first visible line.
    pub fn page_top(&self) -> PointId {
        self.page_top
    }

    /// The view's history.
    pub fn history(&self) -> &Undo {
        &self.undo
    }

    fn check(&self, buffer: &Buffer) {
        assert_eq!(
            buffer.id(),
            self.buffer,
            "view used with a different buffer"
        );
    }

    /// Where the cursor is.
    pub fn cursor(&self, buffer: &Buffer) -> Option<Position> {
        self.check(buffer);
        buffer.point(self.insertion).position()
    }

    /// First visible line.
    pub fn page_top_line(&self, buffer: &Buffer) -> Option<usize> {
        self.check(buffer);
        buffer.point(self.page_top).line_number()
    }

    /// Scroll so that `line` is the first visible line.
    pub fn scroll_to(&mut self, buffer: &mut Buffer, line: usize) -> bool {
        self.check(buffer);
        buffer.point_mut(self.page_top).set_line_number(line)
    }

    /// Whether some text is selected.
    pub fn has_selection(&self, buffer: &Buffer) -> bool {
        self.check(buffer);
        !buffer.point(self.insertion).same_position_as(self.selection)
    }

    /// The selected text, if any.
    pub fn selected_text(&self, buffer: &Buffer) -> Option<String> {
        if !self.has_selection(buffer) {
            return None;
        }
        buffer.point(self.insertion).content_to(self.selection)
    }

    fn collapse_selection(&mut self, buffer: &mut Buffer) {
        buffer.point_mut(self.selection).move_to(self.insertion);
    }

    /// Move the cursor. Unless `extend_selection` is set the selection collapses onto it.
    pub fn move_cursor(
        &mut self,
        buffer: &mut Buffer,
        motion: Motion,
        extend_selection: bool,
    ) -> bool {
        self.check(buffer);
        let line_count = buffer.line_count();
        let mut point = buffer.point_mut(self.insertion);
        let moved = match motion {
            Motion::Left => point.move_left(),
            Motion::Right => point.move_right(),
            Motion::Up => point.move_up(),
            Motion::Down => point.move_down(),
            Motion::LineStart => point.move_to_line_start(),
            Motion::LineEnd => point.move_to_line_end(),
            Motion::BufferStart => point.move_to_position(Position::new(1, 0)),
            Motion::BufferEnd => point.move_to_position(Position::new(line_count, usize::MAX)),
        };
        if !extend_selection {
            self.collapse_selection(buffer);
        }
        moved
    }

    /// Put the cursor at `position`, clamped into the buffer.
    pub fn set_cursor(
        &mut self,
        buffer: &mut Buffer,
        position: Position,
        extend_selection: bool,
    ) -> bool {
        self.check(buffer);
        let moved = buffer.point_mut(self.insertion).move_to_position(position);
        if !extend_selection {
            self.collapse_selection(buffer);
        }
        moved
    }

    /// Delete the selection, if any. Returns whether there was one.
    fn delete_selection(&mut self, buffer: &mut Buffer) -> bool {
        if !self.has_selection(buffer) {
            return false;
        }
        buffer
            .point_mut(self.insertion)
            .delete_to(self.selection, Some(&mut self.undo))
    }

    /// Type `text` at the cursor, replacing the selection.
    pub fn insert_text(&mut self, buffer: &mut Buffer, text: &str) -> bool {
        self.check(buffer);
        self.delete_selection(buffer);
        let inserted = buffer
            .point_mut(self.insertion)
            .insert_before(text, Some(&mut self.undo));
        self.collapse_selection(buffer);
        inserted
    }

    /// Break the line at the cursor, replacing the selection.
    pub fn break_line(&mut self, buffer: &mut Buffer) -> bool {
        self.insert_text(buffer, "\n")
    }

    /// Delete the selection, or else the character before the cursor.
    pub fn delete_backward(&mut self, buffer: &mut Buffer) -> bool {
        self.check(buffer);
        let deleted = self.delete_selection(buffer)
            || buffer
                .point_mut(self.insertion)
                .delete_char_before(Some(&mut self.undo));
        self.collapse_selection(buffer);
        deleted
    }

    /// Delete the selection, or else the character after the cursor.
    pub fn delete_forward(&mut self, buffer: &mut Buffer) -> bool {
        self.check(buffer);
        let deleted = self.delete_selection(buffer)
            || buffer
                .point_mut(self.insertion)
                .delete_char_after(Some(&mut self.undo));
        self.collapse_selection(buffer);
        deleted
    }

    /// Undo the latest step, moving the cursor to it.
    pub fn undo(&mut self, buffer: &mut Buffer) -> bool {
        self.check(buffer);
        let undone = self.undo.undo(buffer, self.insertion);
        self.collapse_selection(buffer);
        undone
    }

    /// Redo the latest undone step, moving the cursor to it.
    pub fn redo(&mut self, buffer: &mut Buffer) -> bool {
        self.check(buffer);
        let redone = self.undo.redo(buffer, self.insertion);
        self.collapse_selection(buffer);
        redone
    }

    /// Whether the buffer changed since the view was created or last saved.
    pub fn modified(&self) -> bool {
        self.undo.modified()
    }

    /// Save the buffer and mark the current state as unmodified.
    pub fn save(&mut self, buffer: &mut Buffer) -> Result<(), BufferError> {
        self.check(buffer);
        buffer.save()?;
        self.undo.set_unmodified();
        Ok(())
    }

    /// Give the view's points and history back to the buffer.
    pub fn release(self, buffer: &mut Buffer) {
        self.check(buffer);
        self.undo.release(buffer);
        for id in [self.insertion, self.selection, self.page_top] {
            buffer.release_point(id);
        }
    }
}
