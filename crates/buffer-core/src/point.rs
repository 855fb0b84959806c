//! Live positions.
//!
//! A point is a (line, column) position that follows the text it sits in. Points are
//! owned by their [`Buffer`] and addressed by [`PointId`]; [`PointRef`] and [`PointMut`]
//! borrow the buffer to query or edit through a point.
//!
//! [`PointRole::Content`] and [`PointRole::Interactive`] points register with their line,
//! so every edit relocates them. [`PointRole::Temp`] points never register and are only
//! meaningful until the next edit that touches their line.

use crate::buffer::{Buffer, Lines, byte_index};
use crate::delta_tree::{NodeId, Side};
use crate::undo::{RecordMode, Recorder, Undo};
use std::cmp::Ordering;

/// What a point is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointRole {
    /// Undo bookmark. Parks with deleted lines so the text can be restored around it.
    Content,
    /// User-visible anchor such as a cursor, selection end or viewport top.
    Interactive,
    /// Scratch position, not relocated by edits.
    Temp,
}

impl PointRole {
    /// Whether points with this role register with their line.
    pub fn registers(self) -> bool {
        !matches!(self, PointRole::Temp)
    }
}

/// Handle to a point owned by a [`Buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(pub(crate) usize);

/// A 1-based line number and a character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// Column in characters.
    pub column: usize,
}

impl Position {
    /// Create a position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Point {
    pub(crate) line: Option<NodeId>,
    pub(crate) column: usize,
    pub(crate) role: PointRole,
    /// Slot in the line's point list while registered.
    pub(crate) index_in_line: usize,
    /// Bookmark of a record on the redo stack.
    pub(crate) on_redo: bool,
}

impl Point {
    pub(crate) fn new(role: PointRole) -> Self {
        Self {
            line: None,
            column: 0,
            role,
            index_in_line: 0,
            on_redo: false,
        }
    }
}

/// A position on an attached line, used by the editing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Location {
    pub(crate) line: NodeId,
    pub(crate) column: usize,
}

impl Location {
    pub(crate) fn new(line: NodeId, column: usize) -> Self {
        Self { line, column }
    }
}

/// Shared access to a point.
#[derive(Clone, Copy)]
pub struct PointRef<'a> {
    buffer: &'a Buffer,
    id: PointId,
}

impl<'a> PointRef<'a> {
    pub(crate) fn new(buffer: &'a Buffer, id: PointId) -> Self {
        Self { buffer, id }
    }

    /// The point's handle.
    pub fn id(&self) -> PointId {
        self.id
    }

    /// The point's role.
    pub fn role(&self) -> PointRole {
        self.buffer.point_value(self.id).role
    }

    /// Whether the point is on a line of the document.
    pub fn is_valid(&self) -> bool {
        self.buffer.location(self.id).is_some()
    }

    /// Whether the point rides on a deleted line held by an undo record.
    pub fn is_parked(&self) -> bool {
        self.buffer
            .point_value(self.id)
            .line
            .is_some_and(|line| {
                self.buffer.tree.contains(line) && !self.buffer.tree.is_attached(line)
            })
    }

    /// Column in characters. Meaningless for an invalid point.
    pub fn column(&self) -> usize {
        match self.buffer.location(self.id) {
            Some(location) => location.column,
            None => self.buffer.point_value(self.id).column,
        }
    }

    /// 1-based line number.
    pub fn line_number(&self) -> Option<usize> {
        let location = self.buffer.location(self.id)?;
        self.buffer.line_number_of(location.line)
    }

    /// Line number and column.
    pub fn position(&self) -> Option<Position> {
        let location = self.buffer.location(self.id)?;
        let line = self.buffer.line_number_of(location.line)?;
        Some(Position::new(line, location.column))
    }

    /// Content of the point's line.
    pub fn line_content(&self) -> Option<&'a str> {
        let location = self.buffer.location(self.id)?;
        Some(self.buffer.content(location.line))
    }

    /// Whether both points are valid and on the same line.
    pub fn same_line_as(&self, other: PointId) -> bool {
        match (self.buffer.location(self.id), self.buffer.location(other)) {
            (Some(a), Some(b)) => a.line == b.line,
            _ => false,
        }
    }

    /// Whether both points are valid and at the same position.
    pub fn same_position_as(&self, other: PointId) -> bool {
        match (self.buffer.location(self.id), self.buffer.location(other)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Text between this point and `other`, in document order, lines joined by `'\n'`.
    pub fn content_to(&self, other: PointId) -> Option<String> {
        let a = self.buffer.location(self.id)?;
        let b = self.buffer.location(other)?;
        let (from, to) = self.buffer.order(a, b);
        Some(self.buffer.text_between(from, to))
    }

    /// Lines from the point's line to the end of the buffer.
    pub fn lines_forwards(&self) -> Lines<'a> {
        self.buffer.lines_from(self.line_number().unwrap_or(0))
    }
}

/// Exclusive access to a point for motion and editing.
///
/// Editing methods take an optional [`Undo`] log that records the edit.
pub struct PointMut<'a> {
    buffer: &'a mut Buffer,
    id: PointId,
}

impl<'a> PointMut<'a> {
    pub(crate) fn new(buffer: &'a mut Buffer, id: PointId) -> Self {
        Self { buffer, id }
    }

    /// Read-only access to the point.
    pub fn read(&self) -> PointRef<'_> {
        PointRef::new(self.buffer, self.id)
    }

    fn location(&self) -> Option<Location> {
        self.buffer.location(self.id)
    }

    fn set_column(&mut self, column: usize) {
        self.buffer.point_value_mut(self.id).column = column;
    }

    /// Move to line `number`, clamped to the buffer. Makes an invalid point valid.
    pub fn set_line_number(&mut self, number: usize) -> bool {
        let number = number.clamp(1, self.buffer.line_count());
        let line = self.buffer.line_node(number);
        self.buffer.set_point_line(self.id, line);
        line.is_some()
    }

    /// Set the column, clamped to the line length.
    pub fn set_column_number(&mut self, column: usize) -> bool {
        let Some(location) = self.location() else {
            return false;
        };
        let column = column.min(self.buffer.line_len(location.line));
        self.set_column(column);
        true
    }

    /// Move to where `other` is. An invalid `other` makes this point invalid too.
    pub fn move_to(&mut self, other: PointId) -> bool {
        match self.buffer.location(other) {
            Some(location) => {
                self.buffer.place(self.id, location);
                true
            }
            None => {
                self.reset();
                false
            }
        }
    }

    /// Move to a position, clamped into the buffer.
    pub fn move_to_position(&mut self, position: Position) -> bool {
        self.set_line_number(position.line) && self.set_column_number(position.column)
    }

    /// Take the point off its line.
    pub fn reset(&mut self) {
        self.buffer.set_point_line(self.id, None);
        self.set_column(0);
    }

    /// Move to column 0.
    pub fn move_to_line_start(&mut self) -> bool {
        self.set_column_number(0)
    }

    /// Move past the last character of the line.
    pub fn move_to_line_end(&mut self) -> bool {
        self.set_column_number(usize::MAX)
    }

    /// Move to the previous line, clamping the column.
    pub fn move_up(&mut self) -> bool {
        self.move_vertically(Side::Left)
    }

    /// Move to the next line, clamping the column.
    pub fn move_down(&mut self) -> bool {
        self.move_vertically(Side::Right)
    }

    fn move_vertically(&mut self, side: Side) -> bool {
        let Some(location) = self.location() else {
            return false;
        };
        match self.buffer.tree.adjacent(location.line, side) {
            Some(line) => {
                self.buffer.set_point_line(self.id, Some(line));
                true
            }
            None => false,
        }
    }

    /// Move one character left, wrapping to the end of the previous line.
    pub fn move_left(&mut self) -> bool {
        let Some(location) = self.location() else {
            return false;
        };
        match self.buffer.step(location, Side::Left) {
            Some(location) => {
                self.buffer.place(self.id, location);
                true
            }
            None => false,
        }
    }

    /// Move one character right, wrapping to the start of the next line.
    pub fn move_right(&mut self) -> bool {
        let Some(location) = self.location() else {
            return false;
        };
        match self.buffer.step(location, Side::Right) {
            Some(location) => {
                self.buffer.place(self.id, location);
                true
            }
            None => false,
        }
    }

    /// Insert `text` at the point. `'\n'` in `text` breaks the line. The point ends up
    /// after the inserted text.
    pub fn insert_before(&mut self, text: &str, undo: Option<&mut Undo>) -> bool {
        let Some(at) = self.location() else {
            return false;
        };
        let end = self.buffer.insert_at(at, text, undo.map(Recorder::normal));
        self.buffer.place(self.id, end);
        true
    }

    /// Break the line at the point.
    pub fn insert_line_break_before(&mut self, undo: Option<&mut Undo>) -> bool {
        self.insert_before("\n", undo)
    }

    /// Delete the character (or line break) before the point.
    pub fn delete_char_before(&mut self, undo: Option<&mut Undo>) -> bool {
        self.delete_char(Side::Left, undo)
    }

    /// Delete the character (or line break) after the point.
    pub fn delete_char_after(&mut self, undo: Option<&mut Undo>) -> bool {
        self.delete_char(Side::Right, undo)
    }

    fn delete_char(&mut self, side: Side, undo: Option<&mut Undo>) -> bool {
        let Some(at) = self.location() else {
            return false;
        };
        let Some(other) = self.buffer.step(at, side) else {
            return false;
        };
        let from = self
            .buffer
            .delete_between(at, other, undo.map(Recorder::normal));
        self.buffer.place(self.id, from);
        true
    }

    /// Delete the text between this point and `other`. Both end up at the start of the
    /// deleted span.
    pub fn delete_to(&mut self, other: PointId, undo: Option<&mut Undo>) -> bool {
        let (Some(a), Some(b)) = (self.location(), self.buffer.location(other)) else {
            return false;
        };
        let from = self
            .buffer
            .delete_between(a, b, undo.map(Recorder::normal));
        self.buffer.place(self.id, from);
        self.buffer.place(other, from);
        true
    }
}

impl Buffer {
    /// Where a point is, if it is on an attached line.
    ///
    /// TEMP points are not relocated, so their line may be gone and their column may lie
    /// past the end of the line; the column is clamped.
    pub(crate) fn location(&self, id: PointId) -> Option<Location> {
        let point = self.point_value(id);
        let line = point.line.filter(|&line| self.tree.contains(line))?;
        if !self.tree.is_attached(line) {
            return None;
        }
        Some(Location::new(line, point.column.min(self.line_len(line))))
    }

    /// Convert a position into a location, clamped into the buffer.
    pub(crate) fn location_at(&self, position: Position) -> Location {
        let number = position.line.clamp(1, self.line_count());
        let line = self
            .line_node(number)
            .expect("a buffer always has at least one line");
        Location::new(line, position.column.min(self.line_len(line)))
    }

    pub(crate) fn compare(&self, a: Location, b: Location) -> Ordering {
        if a.line == b.line {
            a.column.cmp(&b.column)
        } else {
            self.tree
                .key(a.line, Side::Left)
                .cmp(&self.tree.key(b.line, Side::Left))
        }
    }

    /// Sort two locations into document order.
    pub(crate) fn order(&self, a: Location, b: Location) -> (Location, Location) {
        match self.compare(a, b) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        }
    }

    /// The location one character away, crossing line breaks.
    pub(crate) fn step(&self, at: Location, side: Side) -> Option<Location> {
        match side {
            Side::Left if at.column > 0 => Some(Location::new(at.line, at.column - 1)),
            Side::Left => {
                let line = self.tree.adjacent(at.line, Side::Left)?;
                Some(Location::new(line, self.line_len(line)))
            }
            Side::Right if at.column < self.line_len(at.line) => {
                Some(Location::new(at.line, at.column + 1))
            }
            Side::Right => {
                let line = self.tree.adjacent(at.line, Side::Right)?;
                Some(Location::new(line, 0))
            }
        }
    }

    pub(crate) fn text_between(&self, from: Location, to: Location) -> String {
        let first = self.content(from.line);
        if from.line == to.line {
            return first[byte_index(first, from.column)..byte_index(first, to.column)]
                .to_string();
        }
        let mut text = first[byte_index(first, from.column)..].to_string();
        let mut line = from.line;
        while let Some(next) = self.tree.adjacent(line, Side::Right) {
            text.push('\n');
            let content = self.content(next);
            if next == to.line {
                text.push_str(&content[..byte_index(content, to.column)]);
                break;
            }
            text.push_str(content);
            line = next;
        }
        text
    }

    /// Insert `text` at `at` and return the location after it.
    pub(crate) fn insert_at(
        &mut self,
        at: Location,
        text: &str,
        recorder: Option<Recorder<'_>>,
    ) -> Location {
        if text.is_empty() {
            return at;
        }
        let lines = text
            .split('\n')
            .map(|segment| self.new_detached_line(segment.to_string()))
            .collect();
        let end = self.insert_lines(at, lines, None);
        if let Some(mut recorder) = recorder {
            recorder.record_insertion(self, at, end);
        }
        end
    }

    /// Splice detached lines into the document at `at` and return the location after
    /// them.
    ///
    /// The first line's text joins the line at `at` and the last line takes the text
    /// after `at`; the lines in between are attached as they are. Points on the spliced
    /// lines come along, and points at or after `at` move to stay after the insertion.
    ///
    /// When `replay` restores recorded text, CONTENT points exactly at `at` that belong in
    /// front of it stay where they are: all of them for an undo, and the bookmarks of the
    /// redo stack for a redo.
    pub(crate) fn insert_lines(
        &mut self,
        at: Location,
        lines: Vec<NodeId>,
        replay: Option<RecordMode>,
    ) -> Location {
        let (&first, rest) = lines
            .split_first()
            .expect("splicing needs at least one line");
        let holds = |point: &Point| {
            point.role == PointRole::Content
                && match replay {
                    Some(RecordMode::Undo) => true,
                    Some(RecordMode::Redo) => point.on_redo,
                    Some(RecordMode::Normal) | None => false,
                }
        };
        let shifts =
            |point: &Point| point.column > at.column || (point.column == at.column && !holds(point));

        let Some(&last) = rest.last() else {
            let len = self.line_len(first);
            let moved = self.take_points(first);
            let text = self.tree.remove_node(first).content;
            let content = self.content_mut(at.line);
            let split = byte_index(content, at.column);
            content.insert_str(split, &text);
            for id in self.registered_points(at.line).to_vec() {
                let point = self.point_value_mut(id);
                if shifts(point) {
                    point.column += len;
                }
            }
            self.adopt_points(moved, at.line, at.column);
            return Location::new(at.line, at.column + len);
        };

        let last_len = self.line_len(last);
        let moved = self.take_points(first);
        let text = self.tree.remove_node(first).content;
        let content = self.content_mut(at.line);
        let split = byte_index(content, at.column);
        let tail = content.split_off(split);
        content.push_str(&text);
        self.tree.value_mut(last).content.push_str(&tail);

        let mut i = 0;
        while i < self.registered_points(at.line).len() {
            let id = self.registered_points(at.line)[i];
            let point = self.point_value(id);
            if shifts(point) {
                let column = point.column - at.column + last_len;
                // Swaps the last registered point into slot `i`.
                self.place(id, Location::new(last, column));
            } else {
                i += 1;
            }
        }
        self.adopt_points(moved, at.line, at.column);

        let number = self
            .line_number_of(at.line)
            .expect("insertion point is on an attached line");
        for (offset, &line) in rest.iter().enumerate() {
            self.attach_line(line, number + 1 + offset);
        }
        Location::new(last, last_len)
    }

    /// Delete the text between two locations and return the start of the deleted span.
    pub(crate) fn delete_between(
        &mut self,
        a: Location,
        b: Location,
        recorder: Option<Recorder<'_>>,
    ) -> Location {
        let (from, to) = self.order(a, b);
        if from == to {
            return from;
        }
        match recorder {
            Some(mut recorder) => {
                let target = recorder.deletion_target(self, from, to);
                let saved = self.delete_span(from, to, Some(recorder.mode()));
                recorder.record_deletion(self, target, from, saved);
            }
            None => {
                self.delete_span(from, to, None);
            }
        }
        from
    }

    /// Whether the point goes into the removed text instead of collapsing onto the start
    /// of the deletion. `at_end` is set for points exactly at the end of the span.
    ///
    /// An undone insertion pushed the undo stack's bookmarks at its end there, so those
    /// collapse back onto its start. Every other CONTENT point in the span parks.
    fn parks(&self, id: PointId, at_end: bool, recording: Option<RecordMode>) -> bool {
        let point = self.point_value(id);
        point.role == PointRole::Content
            && match recording {
                None => false,
                Some(RecordMode::Undo) => !at_end || point.on_redo,
                Some(RecordMode::Normal | RecordMode::Redo) => true,
            }
    }

    /// Remove `from..to`. When `recording`, the removed text is returned as detached
    /// lines carrying the CONTENT points that park in it; otherwise nothing is returned.
    fn delete_span(
        &mut self,
        from: Location,
        to: Location,
        recording: Option<RecordMode>,
    ) -> Vec<NodeId> {
        let keep = recording.is_some();
        if from.line == to.line {
            let content = self.content_mut(from.line);
            let range = byte_index(content, from.column)..byte_index(content, to.column);
            let removed: String = content.drain(range).collect();
            let saved = keep.then(|| self.new_detached_line(removed));
            let span = to.column - from.column;
            for id in self.registered_points(from.line).to_vec() {
                let column = self.point_value(id).column;
                if column > to.column {
                    self.point_value_mut(id).column -= span;
                } else if column > from.column {
                    match saved {
                        Some(line) if self.parks(id, column == to.column, recording) => {
                            self.place(id, Location::new(line, column - from.column));
                        }
                        _ => self.point_value_mut(id).column = from.column,
                    }
                }
            }
            return saved.into_iter().collect();
        }

        let content = self.content_mut(from.line);
        let split = byte_index(content, from.column);
        let first_tail = content.split_off(split);
        let mut saved = Vec::new();
        if keep {
            saved.push(self.new_detached_line(first_tail));
        }
        for id in self.registered_points(from.line).to_vec() {
            let column = self.point_value(id).column;
            if column <= from.column {
                continue;
            }
            match saved.first() {
                Some(&line) if self.parks(id, false, recording) => {
                    self.place(id, Location::new(line, column - from.column));
                }
                _ => self.point_value_mut(id).column = from.column,
            }
        }

        loop {
            let line = self
                .tree
                .adjacent(from.line, Side::Right)
                .expect("deletion end lies after its start");

            if line == to.line {
                let content = std::mem::take(self.content_mut(line));
                let (head, rest) = content.split_at(byte_index(&content, to.column));
                self.content_mut(from.line).push_str(rest);
                let head = keep.then(|| self.new_detached_line(head.to_string()));
                for id in self.take_points(line) {
                    let column = self.point_value(id).column;
                    let target = if column > to.column {
                        Location::new(from.line, column - to.column + from.column)
                    } else {
                        match head {
                            Some(head) if self.parks(id, column == to.column, recording) => {
                                Location::new(head, column)
                            }
                            _ => from,
                        }
                    };
                    self.place(id, target);
                }
                self.detach_line(line);
                self.free_line(line);
                saved.extend(head);
                return saved;
            }

            let mut i = 0;
            while i < self.registered_points(line).len() {
                let id = self.registered_points(line)[i];
                if self.parks(id, false, recording) {
                    i += 1;
                } else {
                    self.place(id, from);
                }
            }
            self.detach_line(line);
            if keep {
                saved.push(line);
            } else {
                self.free_line(line);
            }
        }
    }
}
