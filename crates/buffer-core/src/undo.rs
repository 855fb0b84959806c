//! Undo log.
//!
//! An [`Undo`] keeps two stacks of edit records for one buffer. Records hold CONTENT
//! points as bookmarks, so they stay correct while later edits move the text around them.
//! Deleted text is kept as detached lines, together with the bookmarks of other records
//! that sat inside it.
//!
//! Consecutive edits that touch each other coalesce into one record until the record is
//! sealed by [`Undo::end_group`] or [`Undo::set_unmodified`].

use crate::buffer::{Buffer, BufferId};
use crate::config::EditorConfig;
use crate::delta_tree::NodeId;
use crate::point::{Location, PointId, PointRole, Position};

/// Why an edit is being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordMode {
    /// A fresh edit. Recorded on the undo stack; clears the redo stack.
    Normal,
    /// The inverse of an undo. Recorded on the redo stack.
    Undo,
    /// The inverse of a redo. Recorded on the undo stack.
    Redo,
}

#[derive(Debug)]
enum OpKind {
    /// Text was inserted between two bookmarks.
    Insertion { start: PointId, end: PointId },
    /// Text was deleted at `start`; `saved` holds it as detached lines.
    Deletion { start: PointId, saved: Vec<NodeId> },
}

#[derive(Debug)]
struct UndoOp {
    id: u64,
    kind: OpKind,
    sealed: bool,
}

/// Where a pending deletion will be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeletionTarget {
    /// After the text of the top record.
    Append,
    /// Before the text of the top record.
    Prepend,
    /// In a record of its own.
    New,
}

/// Undo and redo history of one buffer.
///
/// Owns CONTENT points and parked lines inside its buffer; call [`Undo::release`] before
/// dropping it to give them back. A log dropped with records still in it leaves them
/// allocated in the buffer and logs a warning.
#[derive(Debug)]
pub struct Undo {
    buffer: BufferId,
    undo_stack: Vec<UndoOp>,
    redo_stack: Vec<UndoOp>,
    next_op_id: u64,
    unmodified: bool,
    /// Record whose reversal brings the buffer back to the unmodified state.
    unmodified_op: Option<u64>,
    limit: Option<usize>,
}

impl Undo {
    /// Create an empty log for `buffer`, starting out unmodified.
    pub fn new(buffer: &Buffer) -> Self {
        Self {
            buffer: buffer.id(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            next_op_id: 0,
            unmodified: true,
            unmodified_op: None,
            limit: None,
        }
    }

    /// Create a log that honors [`EditorConfig::undo_limit`].
    pub fn with_config(buffer: &Buffer, config: &EditorConfig) -> Self {
        let mut undo = Self::new(buffer);
        undo.limit = config.undo_limit;
        undo
    }

    /// Whether there is a step to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether there is a step to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable steps.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable steps.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether the buffer differs from the state marked by [`set_unmodified`](Self::set_unmodified).
    pub fn modified(&self) -> bool {
        !self.unmodified
    }

    /// Mark the current state as unmodified, typically after a save.
    pub fn set_unmodified(&mut self) {
        self.unmodified = true;
        self.unmodified_op = None;
        self.seal(RecordMode::Normal);
        self.seal(RecordMode::Undo);
    }

    /// Stop the latest step from absorbing further edits.
    pub fn end_group(&mut self) {
        self.seal(RecordMode::Normal);
    }

    /// Undo the latest step. `point_out` is moved to where the step happened.
    ///
    /// Returns false if there is nothing to undo.
    pub fn undo(&mut self, buffer: &mut Buffer, point_out: PointId) -> bool {
        self.revert_last(buffer, RecordMode::Undo, point_out)
    }

    /// Redo the latest undone step. `point_out` is moved to where the step happened.
    ///
    /// Returns false if there is nothing to redo.
    pub fn redo(&mut self, buffer: &mut Buffer, point_out: PointId) -> bool {
        self.revert_last(buffer, RecordMode::Redo, point_out)
    }

    /// Record that the text between `start` and `end` was inserted by some other means.
    pub fn record_insertion(
        &mut self,
        buffer: &mut Buffer,
        mode: RecordMode,
        start: Position,
        end: Position,
    ) {
        let start = buffer.location_at(start);
        let end = buffer.location_at(end);
        self.record_insertion_at(buffer, mode, start, end);
    }

    /// Forget all history.
    pub fn clear(&mut self, buffer: &mut Buffer) {
        self.check(buffer);
        for op in self.undo_stack.drain(..).chain(self.redo_stack.drain(..)) {
            release_op(buffer, op);
        }
        self.unmodified_op = None;
        log::trace!("cleared undo history of {:?}", self.buffer);
    }

    /// Forget all history and give the log's points and lines back to the buffer.
    pub fn release(mut self, buffer: &mut Buffer) {
        self.clear(buffer);
    }

    fn check(&self, buffer: &Buffer) {
        assert_eq!(
            buffer.id(),
            self.buffer,
            "undo log used with a different buffer"
        );
    }

    fn stack(&self, mode: RecordMode) -> &Vec<UndoOp> {
        match mode {
            RecordMode::Normal | RecordMode::Redo => &self.undo_stack,
            RecordMode::Undo => &self.redo_stack,
        }
    }

    fn stack_mut(&mut self, mode: RecordMode) -> &mut Vec<UndoOp> {
        match mode {
            RecordMode::Normal | RecordMode::Redo => &mut self.undo_stack,
            RecordMode::Undo => &mut self.redo_stack,
        }
    }

    /// The top record of the stack `mode` records onto, if it may still absorb edits.
    fn open_top(&mut self, mode: RecordMode) -> Option<&mut UndoOp> {
        self.stack_mut(mode).last_mut().filter(|op| !op.sealed)
    }

    fn seal(&mut self, mode: RecordMode) {
        if let Some(op) = self.stack_mut(mode).last_mut() {
            op.sealed = true;
        }
    }

    fn clear_redo(&mut self, buffer: &mut Buffer) {
        for op in self.redo_stack.drain(..) {
            release_op(buffer, op);
        }
    }

    fn push(&mut self, buffer: &mut Buffer, mode: RecordMode, kind: OpKind) {
        let id = self.next_op_id;
        self.next_op_id += 1;
        if self.unmodified {
            self.unmodified = false;
            self.unmodified_op = Some(id);
        }
        log::trace!("recording {mode:?} op {id}: {kind:?}");
        self.stack_mut(mode).push(UndoOp {
            id,
            kind,
            sealed: false,
        });
        if mode != RecordMode::Undo
            && let Some(limit) = self.limit
        {
            while self.undo_stack.len() > limit {
                let op = self.undo_stack.remove(0);
                log::trace!("undo limit {limit} reached, dropping op {}", op.id);
                release_op(buffer, op);
            }
        }
    }

    pub(crate) fn record_insertion_at(
        &mut self,
        buffer: &mut Buffer,
        mode: RecordMode,
        start: Location,
        end: Location,
    ) {
        self.check(buffer);
        if mode == RecordMode::Normal {
            self.clear_redo(buffer);
        }
        if let Some(op) = self.open_top(mode)
            && let OpKind::Insertion {
                start: op_start,
                end: op_end,
            } = op.kind
        {
            let op_start_at = buffer.location(op_start);
            let op_end_at = buffer.location(op_end);
            if op_start_at == Some(end) {
                log::trace!("insertion extends op {} backwards", op.id);
                buffer.place(op_start, start);
                return;
            }
            if op_end_at == Some(end) {
                log::trace!("insertion already covered by op {}", op.id);
                return;
            }
            if op_end_at == Some(start) {
                log::trace!("insertion extends op {} forwards", op.id);
                buffer.place(op_end, end);
                return;
            }
            if op_start_at == Some(start) {
                log::trace!("insertion already covered by op {}", op.id);
                return;
            }
        }
        let start = content_point(buffer, mode, start);
        let end = content_point(buffer, mode, end);
        self.push(buffer, mode, OpKind::Insertion { start, end });
    }

    pub(crate) fn deletion_target(
        &self,
        buffer: &Buffer,
        mode: RecordMode,
        from: Location,
        to: Location,
    ) -> DeletionTarget {
        let Some(op) = self.stack(mode).last().filter(|op| !op.sealed) else {
            return DeletionTarget::New;
        };
        let OpKind::Deletion { start, .. } = op.kind else {
            return DeletionTarget::New;
        };
        match buffer.location(start) {
            Some(at) if at == from => DeletionTarget::Append,
            Some(at) if at == to => DeletionTarget::Prepend,
            _ => DeletionTarget::New,
        }
    }

    pub(crate) fn record_deletion(
        &mut self,
        buffer: &mut Buffer,
        mode: RecordMode,
        target: DeletionTarget,
        from: Location,
        saved: Vec<NodeId>,
    ) {
        self.check(buffer);
        if mode == RecordMode::Normal {
            self.clear_redo(buffer);
        }
        let unmerged = match target {
            DeletionTarget::New => Some(saved),
            DeletionTarget::Append | DeletionTarget::Prepend => match self.open_top(mode) {
                Some(UndoOp {
                    id,
                    kind: OpKind::Deletion { start, saved: existing },
                    ..
                }) => {
                    merge_saved(buffer, target, existing, saved);
                    // A backspace run carries the old start along; it belongs at `from`.
                    buffer.place(*start, from);
                    log::trace!("deletion merged into op {id} ({target:?})");
                    None
                }
                _ => Some(saved),
            },
        };
        if let Some(saved) = unmerged {
            let start = content_point(buffer, mode, from);
            self.push(buffer, mode, OpKind::Deletion { start, saved });
        }
    }

    fn revert_last(&mut self, buffer: &mut Buffer, mode: RecordMode, point_out: PointId) -> bool {
        self.check(buffer);
        let popped = match mode {
            RecordMode::Undo => self.undo_stack.pop(),
            RecordMode::Redo => self.redo_stack.pop(),
            RecordMode::Normal => None,
        };
        let Some(op) = popped else {
            return false;
        };
        log::trace!("{mode:?} replaying op {}", op.id);

        // A replay is one step of its own on the other stack.
        self.seal(mode);
        let replayed = match op.kind {
            OpKind::Insertion { start, end } => {
                let result = match (buffer.location(start), buffer.location(end)) {
                    (Some(a), Some(b)) => {
                        Some(buffer.delete_between(a, b, Some(Recorder::new(self, mode))))
                    }
                    _ => None,
                };
                buffer.release_point(start);
                buffer.release_point(end);
                result
            }
            OpKind::Deletion { start, saved } => {
                let result = match buffer.location(start) {
                    Some(at) => {
                        let end = buffer.insert_lines(at, saved, Some(mode));
                        self.record_insertion_at(buffer, mode, at, end);
                        Some(end)
                    }
                    None => {
                        for line in saved {
                            buffer.free_line(line);
                        }
                        None
                    }
                };
                buffer.release_point(start);
                result
            }
        };
        self.seal(mode);

        if self.unmodified_op == Some(op.id) {
            self.unmodified = true;
            self.unmodified_op = None;
        }

        match replayed {
            Some(location) => {
                buffer.place(point_out, location);
                true
            }
            None => {
                log::warn!(
                    "dropping op {} of {:?}: its bookmarks are no longer in the buffer",
                    op.id,
                    self.buffer
                );
                false
            }
        }
    }
}

impl Drop for Undo {
    fn drop(&mut self) {
        let held = self.undo_stack.len() + self.redo_stack.len();
        if held > 0 {
            log::warn!(
                "undo log of {:?} dropped with {held} records; their points and lines stay allocated",
                self.buffer
            );
        }
    }
}

/// Records edits made through points into an [`Undo`] log.
pub(crate) struct Recorder<'a> {
    undo: &'a mut Undo,
    mode: RecordMode,
}

impl<'a> Recorder<'a> {
    pub(crate) fn new(undo: &'a mut Undo, mode: RecordMode) -> Self {
        Self { undo, mode }
    }

    /// Record a fresh user edit.
    pub(crate) fn normal(undo: &'a mut Undo) -> Self {
        Self::new(undo, RecordMode::Normal)
    }

    pub(crate) fn mode(&self) -> RecordMode {
        self.mode
    }

    pub(crate) fn record_insertion(&mut self, buffer: &mut Buffer, start: Location, end: Location) {
        self.undo.record_insertion_at(buffer, self.mode, start, end);
    }

    /// Decide, before the text is removed, where the deletion of `from..to` goes.
    pub(crate) fn deletion_target(
        &self,
        buffer: &Buffer,
        from: Location,
        to: Location,
    ) -> DeletionTarget {
        self.undo.deletion_target(buffer, self.mode, from, to)
    }

    pub(crate) fn record_deletion(
        &mut self,
        buffer: &mut Buffer,
        target: DeletionTarget,
        from: Location,
        saved: Vec<NodeId>,
    ) {
        self.undo
            .record_deletion(buffer, self.mode, target, from, saved);
    }
}

/// Join newly deleted lines onto the saved lines of an existing record.
fn merge_saved(
    buffer: &mut Buffer,
    target: DeletionTarget,
    existing: &mut Vec<NodeId>,
    mut added: Vec<NodeId>,
) {
    if target == DeletionTarget::Append {
        if let (Some(&last), Some(&first)) = (existing.last(), added.first()) {
            buffer.join_detached(last, first);
        }
        existing.extend(added.drain(..).skip(1));
    } else {
        if let (Some(&last), Some(&first)) = (added.last(), existing.first()) {
            buffer.join_detached(last, first);
        }
        added.extend(existing.drain(..).skip(1));
        *existing = added;
    }
}

/// A bookmark for a record pushed onto the stack `mode` records onto.
fn content_point(buffer: &mut Buffer, mode: RecordMode, location: Location) -> PointId {
    let id = buffer.new_point(PointRole::Content);
    buffer.point_value_mut(id).on_redo = mode == RecordMode::Undo;
    buffer.place(id, location);
    id
}

fn release_op(buffer: &mut Buffer, op: UndoOp) {
    match op.kind {
        OpKind::Insertion { start, end } => {
            buffer.release_point(start);
            buffer.release_point(end);
        }
        OpKind::Deletion { start, saved } => {
            buffer.release_point(start);
            for line in saved {
                buffer.free_line(line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn setup(text: &str, line: usize, column: usize) -> (Buffer, Undo, PointId) {
        let mut buffer = Buffer::from_text(text);
        let cursor = buffer.new_point_at(PointRole::Interactive, Position::new(line, column));
        let undo = Undo::new(&buffer);
        (buffer, undo, cursor)
    }

    fn type_text(buffer: &mut Buffer, undo: &mut Undo, cursor: PointId, text: &str) {
        for ch in text.chars() {
            let mut s = [0u8; 4];
            assert!(
                buffer
                    .point_mut(cursor)
                    .insert_before(ch.encode_utf8(&mut s), Some(undo))
            );
        }
    }

    fn pos(buffer: &Buffer, id: PointId) -> Option<Position> {
        buffer.point(id).position()
    }

    #[test]
    fn test_typing_coalesces_into_one_step() {
        let (mut buffer, mut undo, cursor) = setup("", 1, 0);
        type_text(&mut buffer, &mut undo, cursor, "abc");
        assert_eq!(undo.undo_depth(), 1);
        assert!(undo.modified());

        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "");
        assert_eq!(pos(&buffer, cursor), Some(Position::new(1, 0)));
        assert!(!undo.modified());
        assert!(!undo.can_undo());

        assert!(undo.redo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "abc");
        assert_eq!(pos(&buffer, cursor), Some(Position::new(1, 3)));
        assert!(undo.modified());
        assert!(!undo.can_redo());
    }

    #[test]
    fn test_insertion_before_op_start_coalesces() {
        let (mut buffer, mut undo, cursor) = setup("xy", 1, 1);
        let fixed = buffer.new_point_at(PointRole::Temp, Position::new(1, 1));
        type_text(&mut buffer, &mut undo, cursor, "a");
        // Insert repeatedly at the same spot, in front of the recorded text.
        for text in ["b", "c"] {
            buffer.point_mut(fixed).move_to_position(Position::new(1, 1));
            assert!(buffer.point_mut(fixed).insert_before(text, Some(&mut undo)));
        }
        assert_eq!(buffer.text(), "xcbay");
        assert_eq!(undo.undo_depth(), 1);
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "xy");
    }

    #[test]
    fn test_separate_insertions_are_separate_steps() {
        let (mut buffer, mut undo, cursor) = setup("one\ntwo", 1, 3);
        type_text(&mut buffer, &mut undo, cursor, "!");
        buffer.point_mut(cursor).move_to_position(Position::new(2, 0));
        type_text(&mut buffer, &mut undo, cursor, ">");
        assert_eq!(undo.undo_depth(), 2);

        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "one!\ntwo");
        assert_eq!(pos(&buffer, cursor), Some(Position::new(2, 0)));
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "one\ntwo");
        assert!(!undo.undo(&mut buffer, cursor));
    }

    #[test]
    fn test_backspace_coalesces_and_restores() {
        let (mut buffer, mut undo, cursor) = setup("hello", 1, 5);
        for _ in 0..3 {
            assert!(buffer.point_mut(cursor).delete_char_before(Some(&mut undo)));
        }
        assert_eq!(buffer.text(), "he");
        assert_eq!(undo.undo_depth(), 1);

        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "hello");
        assert_eq!(pos(&buffer, cursor), Some(Position::new(1, 5)));
    }

    #[test]
    fn test_forward_delete_coalesces() {
        let (mut buffer, mut undo, cursor) = setup("hello", 1, 0);
        for _ in 0..2 {
            assert!(buffer.point_mut(cursor).delete_char_after(Some(&mut undo)));
        }
        assert_eq!(buffer.text(), "llo");
        assert_eq!(undo.undo_depth(), 1);
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "hello");
    }

    #[test]
    fn test_backspace_across_line_break() {
        let (mut buffer, mut undo, cursor) = setup("ab\ncd", 2, 1);
        for _ in 0..2 {
            assert!(buffer.point_mut(cursor).delete_char_before(Some(&mut undo)));
        }
        assert_eq!(buffer.text(), "abd");
        assert_eq!(undo.undo_depth(), 1);
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "ab\ncd");
        assert_eq!(pos(&buffer, cursor), Some(Position::new(2, 1)));
        buffer.tree.assert_invariants();
    }

    #[test]
    fn test_bookmarks_survive_multi_line_delete() {
        let (mut buffer, mut undo, cursor) = setup("one\ntwo\nthree", 2, 3);
        type_text(&mut buffer, &mut undo, cursor, "!");
        undo.end_group();

        let a = buffer.new_point_at(PointRole::Interactive, Position::new(1, 1));
        let b = buffer.new_point_at(PointRole::Interactive, Position::new(3, 2));
        assert!(buffer.point_mut(a).delete_to(b, Some(&mut undo)));
        assert_eq!(buffer.text(), "oree");
        assert_eq!(pos(&buffer, cursor), Some(Position::new(1, 1)));
        assert_eq!(undo.undo_depth(), 2);

        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "one\ntwo!\nthree");
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "one\ntwo\nthree");
        assert_eq!(pos(&buffer, cursor), Some(Position::new(2, 3)));
        assert!(!undo.modified());

        assert!(undo.redo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "one\ntwo!\nthree");
        assert!(undo.redo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "oree");
        assert!(!undo.can_redo());
        buffer.tree.assert_invariants();
    }

    #[test]
    fn test_delete_overlapping_earlier_insertion() {
        let (mut buffer, mut undo, cursor) = setup("xxxx", 1, 2);
        type_text(&mut buffer, &mut undo, cursor, "abc");
        undo.end_group();

        let a = buffer.new_point_at(PointRole::Interactive, Position::new(1, 4));
        let b = buffer.new_point_at(PointRole::Interactive, Position::new(1, 6));
        assert!(buffer.point_mut(a).delete_to(b, Some(&mut undo)));
        assert_eq!(buffer.text(), "xxabx");

        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "xxabcxx");
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "xxxx");
        assert!(undo.redo(&mut buffer, cursor));
        assert!(undo.redo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "xxabx");
    }

    #[test]
    fn test_typing_after_forward_delete() {
        let (mut buffer, mut undo, cursor) = setup("_z", 1, 1);
        type_text(&mut buffer, &mut undo, cursor, "abc");
        undo.end_group();
        assert!(buffer.point_mut(cursor).delete_char_after(Some(&mut undo)));
        undo.end_group();
        type_text(&mut buffer, &mut undo, cursor, "X");
        assert_eq!(buffer.text(), "_abcX");
        assert_eq!(undo.undo_depth(), 3);

        for expected in ["_abc", "_abcz", "_z"] {
            assert!(undo.undo(&mut buffer, cursor));
            assert_eq!(buffer.text(), expected);
        }
        for expected in ["_abcz", "_abc", "_abcX"] {
            assert!(undo.redo(&mut buffer, cursor));
            assert_eq!(buffer.text(), expected);
        }
    }

    #[test]
    fn test_redo_after_typing_then_backspace() {
        let (mut buffer, mut undo, cursor) = setup("hello", 1, 5);
        type_text(&mut buffer, &mut undo, cursor, "x");
        assert!(buffer.point_mut(cursor).delete_char_before(Some(&mut undo)));
        assert_eq!(buffer.text(), "hello");

        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "hellox");
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "hello");
        assert!(undo.redo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "hellox");
        assert!(undo.redo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "hello");

        // A second round trip over the re-recorded steps.
        assert!(undo.undo(&mut buffer, cursor));
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "hello");
        assert!(undo.redo(&mut buffer, cursor));
        assert!(undo.redo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "hello");
    }

    #[test]
    fn test_redo_backspace_run_into_typed_text() {
        let (mut buffer, mut undo, cursor) = setup("hello", 1, 4);
        type_text(&mut buffer, &mut undo, cursor, "ab");
        for _ in 0..3 {
            assert!(buffer.point_mut(cursor).delete_char_before(Some(&mut undo)));
        }
        assert_eq!(buffer.text(), "helo");
        assert_eq!(undo.undo_depth(), 2);

        for expected in ["hellabo", "hello"] {
            assert!(undo.undo(&mut buffer, cursor));
            assert_eq!(buffer.text(), expected);
        }
        for expected in ["hellabo", "helo"] {
            assert!(undo.redo(&mut buffer, cursor));
            assert_eq!(buffer.text(), expected);
        }
    }

    #[test]
    fn test_redo_restores_bookmarks_at_span_edges() {
        let (mut buffer, mut undo, cursor) = setup("hello", 1, 5);
        type_text(&mut buffer, &mut undo, cursor, "x");
        buffer.point_mut(cursor).move_to_position(Position::new(1, 5));
        assert!(buffer.point_mut(cursor).delete_char_before(Some(&mut undo)));
        assert_eq!(buffer.text(), "hellx");

        for expected in ["hellox", "hello"] {
            assert!(undo.undo(&mut buffer, cursor));
            assert_eq!(buffer.text(), expected);
        }
        for expected in ["hellox", "hellx"] {
            assert!(undo.redo(&mut buffer, cursor));
            assert_eq!(buffer.text(), expected);
        }
    }

    #[test]
    fn test_release_returns_points_and_lines() {
        let (mut buffer, mut undo, cursor) = setup("one\ntwo\nthree", 2, 3);
        let points = buffer.point_count();
        type_text(&mut buffer, &mut undo, cursor, "!");
        undo.end_group();
        let a = buffer.new_point_at(PointRole::Interactive, Position::new(1, 1));
        assert!(buffer.point_mut(a).delete_to(cursor, Some(&mut undo)));
        undo.end_group();
        type_text(&mut buffer, &mut undo, cursor, "?");
        assert_eq!(buffer.text(), "o?ree");
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "oree");
        assert!(undo.can_undo() && undo.can_redo());
        assert!(buffer.point_count() > points + 1);
        assert!(buffer.parked_line_count() > 0);

        undo.release(&mut buffer);
        buffer.release_point(a);
        assert_eq!(buffer.point_count(), points);
        assert_eq!(buffer.parked_line_count(), 0);
    }

    #[test]
    fn test_set_unmodified_boundary() {
        let (mut buffer, mut undo, cursor) = setup("", 1, 0);
        type_text(&mut buffer, &mut undo, cursor, "a");
        undo.set_unmodified();
        assert!(!undo.modified());

        type_text(&mut buffer, &mut undo, cursor, "b");
        assert!(undo.modified());
        assert_eq!(undo.undo_depth(), 2);

        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "a");
        assert!(!undo.modified());
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "");
        assert!(undo.modified());
        assert!(undo.redo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "a");
        assert!(!undo.modified());
        assert!(undo.redo(&mut buffer, cursor));
        assert!(undo.modified());
    }

    #[test]
    fn test_normal_edit_clears_redo() {
        let (mut buffer, mut undo, cursor) = setup("", 1, 0);
        type_text(&mut buffer, &mut undo, cursor, "a");
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(undo.redo_depth(), 1);
        type_text(&mut buffer, &mut undo, cursor, "x");
        assert_eq!(undo.redo_depth(), 0);
        assert!(!undo.redo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "x");
        assert!(undo.undo(&mut buffer, cursor));
        assert!(!undo.modified());
    }

    #[test]
    fn test_replays_do_not_coalesce() {
        let (mut buffer, mut undo, cursor) = setup("", 1, 0);
        type_text(&mut buffer, &mut undo, cursor, "ab");
        undo.end_group();
        type_text(&mut buffer, &mut undo, cursor, "cd");
        assert_eq!(undo.undo_depth(), 2);

        assert!(undo.undo(&mut buffer, cursor));
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "");
        assert_eq!(undo.redo_depth(), 2);

        assert!(undo.redo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "ab");
        assert!(undo.redo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "abcd");
        assert_eq!(undo.undo_depth(), 2);
    }

    #[test]
    fn test_undo_limit_drops_oldest() {
        let mut buffer = Buffer::create();
        let cursor = buffer.new_point_at(PointRole::Interactive, Position::new(1, 0));
        let config = EditorConfig {
            undo_limit: Some(2),
            ..EditorConfig::default()
        };
        let mut undo = Undo::with_config(&buffer, &config);
        for text in ["a", "b", "c"] {
            type_text(&mut buffer, &mut undo, cursor, text);
            undo.end_group();
        }
        assert_eq!(undo.undo_depth(), 2);
        assert!(undo.undo(&mut buffer, cursor));
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "a");
        assert!(!undo.undo(&mut buffer, cursor));
    }

    #[test]
    fn test_empty_stacks() {
        let (mut buffer, mut undo, cursor) = setup("text", 1, 2);
        assert!(!undo.undo(&mut buffer, cursor));
        assert!(!undo.redo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "text");
        assert_eq!(pos(&buffer, cursor), Some(Position::new(1, 2)));
    }

    #[test]
    fn test_record_insertion_by_position() {
        let (mut buffer, mut undo, cursor) = setup("ab", 1, 0);
        assert!(buffer.insert_line(2));
        buffer.point_mut(cursor).move_to_position(Position::new(2, 0));
        assert!(buffer.point_mut(cursor).insert_before("new", None));
        undo.record_insertion(
            &mut buffer,
            RecordMode::Normal,
            Position::new(1, 2),
            Position::new(2, 3),
        );
        assert!(undo.undo(&mut buffer, cursor));
        assert_eq!(buffer.text(), "ab");
    }

    #[test]
    fn test_clear_and_release() {
        let (mut buffer, mut undo, cursor) = setup("", 1, 0);
        type_text(&mut buffer, &mut undo, cursor, "abc");
        assert!(undo.undo(&mut buffer, cursor));
        undo.clear(&mut buffer);
        assert!(!undo.can_undo());
        assert!(!undo.can_redo());
        undo.release(&mut buffer);
    }

    #[test]
    #[should_panic(expected = "different buffer")]
    fn test_wrong_buffer_panics() {
        let (_, mut undo, _) = setup("", 1, 0);
        let mut other = Buffer::create();
        let cursor = other.new_point_at(PointRole::Interactive, Position::new(1, 0));
        undo.undo(&mut other, cursor);
    }
}
