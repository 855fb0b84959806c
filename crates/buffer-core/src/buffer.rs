//! Line store.
//!
//! A [`Buffer`] keeps its text as one [`Line`] per tree node in a [`DeltaTree`] where every
//! node has delta 1, so a line's key is its index and the tree's total delta is the line
//! count. Inserting or removing a line renumbers everything after it in O(log n).
//!
//! Line numbers are 1-based at the API. A buffer always has at least one line.

use crate::config::EditorConfig;
use crate::delta_tree::{DeltaTree, Iter, NodeId, Options, Side};
use crate::error::BufferError;
use crate::point::{Location, Point, PointId, PointMut, PointRef, PointRole, Position};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(u64);

impl BufferId {
    fn next() -> Self {
        Self(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// One line of text, without its terminator, plus the points registered on it.
#[derive(Debug, Default)]
pub(crate) struct Line {
    pub(crate) content: String,
    pub(crate) points: Vec<PointId>,
}

impl Line {
    fn new(content: String) -> Self {
        Self {
            content,
            points: Vec::new(),
        }
    }
}

/// A borrowed view of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRef<'a> {
    /// 1-based line number.
    pub number: usize,
    /// Line content without the terminator.
    pub content: &'a str,
}

/// Forward iterator over lines, see [`Buffer::lines_from`].
pub struct Lines<'a> {
    inner: Option<Iter<'a, usize, Line>>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = LineRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (entry, line) = self.inner.as_mut()?.next()?;
        Some(LineRef {
            number: entry.key + 1,
            content: &line.content,
        })
    }
}

/// An editable document: ordered lines, live points and an optional backing file.
#[derive(Debug)]
pub struct Buffer {
    id: BufferId,
    name: String,
    path: Option<PathBuf>,
    modified: bool,
    pub(crate) tree: DeltaTree<usize, Line>,
    points: Vec<Option<Point>>,
    free_points: Vec<usize>,
}

impl Buffer {
    fn with_lines<I>(name: String, path: Option<PathBuf>, lines: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut buffer = Self {
            id: BufferId::next(),
            name,
            path,
            modified: false,
            tree: DeltaTree::new(),
            points: Vec::new(),
            free_points: Vec::new(),
        };
        for content in lines {
            let number = buffer.line_count() + 1;
            buffer.insert_line_node(number, content);
        }
        if buffer.tree.is_empty() {
            buffer.insert_line_node(1, String::new());
        }
        buffer.modified = false;
        buffer
    }

    /// Create an unnamed buffer holding a single empty line.
    pub fn create() -> Self {
        Self::with_lines("untitled".to_string(), None, [])
    }

    /// Create an unnamed buffer from in-memory text.
    ///
    /// Lines are split on `'\n'` (a preceding `'\r'` is dropped); a trailing newline does
    /// not start an extra line.
    pub fn from_text(text: &str) -> Self {
        Self::with_lines(
            "untitled".to_string(),
            None,
            text.lines().map(str::to_string),
        )
    }

    /// Read a buffer from any reader.
    pub fn from_reader<R: BufRead>(
        mut reader: R,
        name: impl Into<String>,
        config: &EditorConfig,
    ) -> std::io::Result<Self> {
        let mut lines = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            if line.ends_with('\n') {
                line.pop();
                if config.strip_carriage_returns && line.ends_with('\r') {
                    line.pop();
                }
            }
            lines.push(line.clone());
        }
        Ok(Self::with_lines(name.into(), None, lines))
    }

    /// Open a file with the default [`EditorConfig`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BufferError> {
        Self::open_with(path, &EditorConfig::default())
    }

    /// Open a file. The buffer is named after the file.
    pub fn open_with<P: AsRef<Path>>(path: P, config: &EditorConfig) -> Result<Self, BufferError> {
        let path = path.as_ref();
        let io_error = |source| BufferError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_error)?;
        let mut buffer =
            Self::from_reader(BufReader::new(file), name_for(path), config).map_err(io_error)?;
        buffer.path = Some(path.to_path_buf());
        log::debug!(
            "opened {} ({} lines) as {:?}",
            path.display(),
            buffer.line_count(),
            buffer.id
        );
        Ok(buffer)
    }

    /// Write every line followed by `'\n'` to the buffer's file, and clear the modified flag.
    pub fn save(&mut self) -> Result<(), BufferError> {
        let path = self.path.clone().ok_or(BufferError::NoPath)?;
        self.save_to(&path)
    }

    /// Save to a new file and associate the buffer with it. On failure the buffer keeps
    /// its name and file.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<(), BufferError> {
        let path = path.as_ref();
        self.save_to(path)?;
        self.name = name_for(path);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn save_to(&mut self, path: &Path) -> Result<(), BufferError> {
        let io_error = |source| BufferError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer).map_err(io_error)?;
        writer.flush().map_err(io_error)?;
        self.modified = false;
        log::debug!("saved {:?} to {}", self.id, path.display());
        Ok(())
    }

    /// Write the buffer's lines, each followed by `'\n'`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (_, line) in self.tree.iter() {
            writer.write_all(line.content.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Identity of this buffer.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Display name: the file's base name, or `untitled`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the text changed since it was opened or last saved.
    pub fn modified(&self) -> bool {
        self.modified
    }

    /// Number of lines. Never zero.
    pub fn line_count(&self) -> usize {
        self.tree.total_delta()
    }

    /// Content of the given 1-based line.
    pub fn line(&self, number: usize) -> Option<&str> {
        let node = self.line_node(number)?;
        Some(&self.tree.value(node).content)
    }

    /// Insert an empty line so that it becomes line `number`.
    ///
    /// Valid numbers are `1..=line_count() + 1`.
    pub fn insert_line(&mut self, number: usize) -> bool {
        if number == 0 || number > self.line_count() + 1 {
            return false;
        }
        self.insert_line_node(number, String::new());
        self.modified = true;
        true
    }

    /// Iterate forward from line `number`. Empty when the line does not exist.
    pub fn lines_from(&self, number: usize) -> Lines<'_> {
        let inner = number
            .checked_sub(1)
            .and_then(|key| self.tree.get(key, Options::exact()))
            .map(|entry| self.tree.iter_from(entry, Side::Right));
        Lines { inner }
    }

    /// Iterate over every line.
    pub fn lines(&self) -> Lines<'_> {
        self.lines_from(1)
    }

    /// The whole text, lines joined by `'\n'`.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for (i, line) in self.lines().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(line.content);
        }
        text
    }

    /// Number of allocated points, including the bookmarks of undo logs.
    pub fn point_count(&self) -> usize {
        self.points.len() - self.free_points.len()
    }

    /// Number of deleted lines kept for undo.
    pub fn parked_line_count(&self) -> usize {
        self.tree.allocated() - self.tree.len()
    }

    /// Allocate a point with the given role. It starts out invalid (on no line).
    pub fn new_point(&mut self, role: PointRole) -> PointId {
        let point = Point::new(role);
        match self.free_points.pop() {
            Some(slot) => {
                self.points[slot] = Some(point);
                PointId(slot)
            }
            None => {
                self.points.push(Some(point));
                PointId(self.points.len() - 1)
            }
        }
    }

    /// Allocate a point and place it at `position`, clamped into the buffer.
    pub fn new_point_at(&mut self, role: PointRole, position: Position) -> PointId {
        let id = self.new_point(role);
        let mut point = self.point_mut(id);
        point.set_line_number(position.line);
        point.set_column_number(position.column);
        id
    }

    /// Unregister and free a point. The id must not be used afterwards.
    pub fn release_point(&mut self, id: PointId) {
        self.set_point_line(id, None);
        self.points[id.0] = None;
        self.free_points.push(id.0);
    }

    /// Read access to a point.
    ///
    /// # Panics
    ///
    /// If the point was released.
    pub fn point(&self, id: PointId) -> PointRef<'_> {
        self.point_value(id);
        PointRef::new(self, id)
    }

    /// Move and edit through a point.
    ///
    /// # Panics
    ///
    /// If the point was released.
    pub fn point_mut(&mut self, id: PointId) -> PointMut<'_> {
        self.point_value(id);
        PointMut::new(self, id)
    }

    pub(crate) fn point_value(&self, id: PointId) -> &Point {
        match self.points.get(id.0) {
            Some(Some(point)) => point,
            _ => panic!("released point {id:?}"),
        }
    }

    pub(crate) fn point_value_mut(&mut self, id: PointId) -> &mut Point {
        match self.points.get_mut(id.0) {
            Some(Some(point)) => point,
            _ => panic!("released point {id:?}"),
        }
    }

    /// Move a point to `line`, keeping registrations in sync and clamping its column.
    pub(crate) fn set_point_line(&mut self, id: PointId, line: Option<NodeId>) {
        let point = self.point_value(id);
        let old = point.line;
        let registers = point.role.registers();
        if old != line && registers {
            if let Some(old) = old {
                self.unregister(id, old);
            }
            if let Some(new) = line {
                let points = &mut self.tree.value_mut(new).points;
                points.push(id);
                let index = points.len() - 1;
                self.point_value_mut(id).index_in_line = index;
            }
        }
        let len = line.map(|node| self.line_len(node));
        let point = self.point_value_mut(id);
        point.line = line;
        if let Some(len) = len {
            point.column = point.column.min(len);
        }
    }

    fn unregister(&mut self, id: PointId, line: NodeId) {
        let index = self.point_value(id).index_in_line;
        let points = &mut self.tree.value_mut(line).points;
        assert_eq!(
            points.get(index),
            Some(&id),
            "point registry out of sync for {id:?}"
        );
        points.swap_remove(index);
        if let Some(&moved) = points.get(index) {
            self.point_value_mut(moved).index_in_line = index;
        }
    }

    pub(crate) fn line_node(&self, number: usize) -> Option<NodeId> {
        let key = number.checked_sub(1)?;
        self.tree.get(key, Options::exact()).map(|entry| entry.node)
    }

    /// 1-based number of an attached line, `None` for parked lines.
    pub(crate) fn line_number_of(&self, node: NodeId) -> Option<usize> {
        self.tree
            .is_attached(node)
            .then(|| self.tree.key(node, Side::Left) + 1)
    }

    pub(crate) fn content(&self, node: NodeId) -> &str {
        &self.tree.value(node).content
    }

    pub(crate) fn content_mut(&mut self, node: NodeId) -> &mut String {
        self.modified = true;
        &mut self.tree.value_mut(node).content
    }

    /// Length of a line in characters.
    pub(crate) fn line_len(&self, node: NodeId) -> usize {
        self.content(node).chars().count()
    }

    pub(crate) fn registered_points(&self, node: NodeId) -> &[PointId] {
        &self.tree.value(node).points
    }

    /// Allocate a detached line.
    pub(crate) fn new_detached_line(&mut self, content: String) -> NodeId {
        self.tree.insert_node(Line::new(content))
    }

    fn insert_line_node(&mut self, number: usize, content: String) -> NodeId {
        let node = self.new_detached_line(content);
        self.attach_line(node, number);
        node
    }

    /// Attach a detached line so that it becomes line `number`.
    pub(crate) fn attach_line(&mut self, node: NodeId, number: usize) {
        self.tree
            .attach(node, number - 1, Options::exact().with_repeats(Side::Left));
        self.tree.set_delta(node, 1);
        self.modified = true;
    }

    /// Detach a line, keeping it (and any points on it) allocated.
    pub(crate) fn detach_line(&mut self, node: NodeId) {
        match self.tree.detach(node) {
            Some(previous) => self.tree.set_delta(previous, 1),
            None => self.tree.set_extreme_delta(Side::Left, 0),
        }
        self.modified = true;
    }

    /// Free a detached line. Points still registered on it become invalid.
    pub(crate) fn free_line(&mut self, node: NodeId) {
        let line = self.tree.remove_node(node);
        for id in line.points {
            if let Some(Some(point)) = self.points.get_mut(id.0) {
                point.line = None;
            }
        }
    }

    /// Put a point at `location`, re-registering it if the line changes.
    pub(crate) fn place(&mut self, id: PointId, location: Location) {
        self.set_point_line(id, Some(location.line));
        self.point_value_mut(id).column = location.column;
    }

    /// Empty a line's point list. The points keep their columns but are on no line.
    pub(crate) fn take_points(&mut self, node: NodeId) -> Vec<PointId> {
        let ids = std::mem::take(&mut self.tree.value_mut(node).points);
        for &id in &ids {
            self.point_value_mut(id).line = None;
        }
        ids
    }

    /// Register points taken with [`take_points`](Self::take_points) on `target`, shifted
    /// right by `offset`.
    pub(crate) fn adopt_points(&mut self, ids: Vec<PointId>, target: NodeId, offset: usize) {
        for id in ids {
            let column = self.point_value(id).column + offset;
            self.place(
                id,
                Location {
                    line: target,
                    column,
                },
            );
        }
    }

    /// Join two detached lines: `tail`'s content and points are appended to `head`.
    pub(crate) fn join_detached(&mut self, head: NodeId, tail: NodeId) {
        let offset = self.line_len(head);
        let ids = self.take_points(tail);
        let line = self.tree.remove_node(tail);
        self.tree.value_mut(head).content.push_str(&line.content);
        self.adopt_points(ids, head, offset);
    }
}

fn name_for(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string())
}

/// Byte offset of character column `column` in `text`, clamped to its end.
pub(crate) fn byte_index(text: &str, column: usize) -> usize {
    text.char_indices()
        .nth(column)
        .map_or(text.len(), |(index, _)| index)
}
