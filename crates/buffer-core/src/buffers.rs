//! Registry of open buffers.

use crate::buffer::{Buffer, BufferId};
use crate::config::EditorConfig;
use crate::error::BufferError;
use std::collections::BTreeMap;
use std::path::Path;

/// The buffers of an editing session, addressed by [`BufferId`].
#[derive(Debug, Default)]
pub struct Buffers {
    config: EditorConfig,
    buffers: BTreeMap<BufferId, Buffer>,
}

impl Buffers {
    /// Create an empty registry. Files are read with `config`.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            buffers: BTreeMap::new(),
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Number of open buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether no buffer is open.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Create an empty, unnamed buffer.
    pub fn new_buffer(&mut self) -> BufferId {
        let id = self.insert(Buffer::create());
        log::debug!("created {id:?}");
        id
    }

    /// Take ownership of an existing buffer.
    pub fn insert(&mut self, buffer: Buffer) -> BufferId {
        let id = buffer.id();
        self.buffers.insert(id, buffer);
        id
    }

    /// Open a file, or return the buffer that already has it open.
    pub fn open_file<P: AsRef<Path>>(&mut self, path: P) -> Result<BufferId, BufferError> {
        let path = path.as_ref();
        if let Some(id) = self.find_by_path(path) {
            return Ok(id);
        }
        let buffer = Buffer::open_with(path, &self.config)?;
        Ok(self.insert(buffer))
    }

    /// The buffer whose backing file is `path`.
    pub fn find_by_path<P: AsRef<Path>>(&self, path: P) -> Option<BufferId> {
        let path = path.as_ref();
        self.buffers
            .values()
            .find(|buffer| buffer.path() == Some(path))
            .map(Buffer::id)
    }

    /// Look up a buffer.
    pub fn get(&self, id: BufferId) -> Option<&Buffer> {
        self.buffers.get(&id)
    }

    /// Look up a buffer for editing.
    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut Buffer> {
        self.buffers.get_mut(&id)
    }

    /// Remove a buffer from the registry and hand it back.
    pub fn close(&mut self, id: BufferId) -> Result<Buffer, BufferError> {
        let buffer = self
            .buffers
            .remove(&id)
            .ok_or(BufferError::UnknownBuffer(id))?;
        log::debug!("closed {id:?} ({})", buffer.name());
        Ok(buffer)
    }

    /// Open buffers in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Buffer> {
        self.buffers.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_and_close() {
        let mut buffers = Buffers::default();
        assert!(buffers.is_empty());
        let a = buffers.new_buffer();
        let b = buffers.new_buffer();
        assert_ne!(a, b);
        assert_eq!(buffers.len(), 2);
        assert_eq!(buffers.get(a).map(Buffer::line_count), Some(1));

        let closed = buffers.close(a).unwrap();
        assert_eq!(closed.id(), a);
        assert!(buffers.get(a).is_none());
        assert!(matches!(
            buffers.close(a),
            Err(BufferError::UnknownBuffer(id)) if id == a
        ));
        let ids: Vec<_> = buffers.iter().map(Buffer::id).collect();
        assert_eq!(ids, vec![b]);
    }

    #[test]
    fn test_open_file_reuses_open_buffer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "one\ntwo\n").unwrap();

        let mut buffers = Buffers::new(EditorConfig::default());
        let id = buffers.open_file(&path).unwrap();
        assert_eq!(buffers.open_file(&path).unwrap(), id);
        assert_eq!(buffers.len(), 1);
        assert_eq!(buffers.find_by_path(&path), Some(id));

        let buffer = buffers.get_mut(id).unwrap();
        assert_eq!(buffer.name(), "notes");
        assert!(buffer.insert_line(3));
        assert_eq!(buffer.line_count(), 3);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut buffers = Buffers::default();
        let err = buffers.open_file(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, BufferError::Io { .. }));
        assert!(buffers.is_empty());
    }
}
