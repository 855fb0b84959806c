#![warn(missing_docs)]
//! Buffer Core - Line-Indexed Text Buffer with Live Points
//!
//! # Overview
//!
//! `buffer-core` is the document layer of a headless text editor. It stores text as lines,
//! keeps positions ("points") correct while the text changes underneath them, and records
//! edits for undo and redo. Rendering and input handling are left to the front end.
//!
//! # Core Features
//!
//! - **Line Store**: one tree node per line in a delta-encoded red-black tree, O(log n)
//!   line lookup, insertion and removal, with renumbering of the following lines for free
//! - **Live Points**: cursors, selection anchors and undo bookmarks relocate on every edit
//! - **Coalescing Undo**: consecutive typing or deleting becomes one undo step; deleted
//!   text keeps the bookmarks that were inside it
//! - **Views and Buffers**: cursor/selection gestures and a registry of open files
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  View (gestures) & Buffers (registry)       │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Undo Log                                   │  ← History
//! ├─────────────────────────────────────────────┤
//! │  Points                                     │  ← Live positions, editing
//! ├─────────────────────────────────────────────┤
//! │  Line Store (Buffer)                        │  ← Lines, files
//! ├─────────────────────────────────────────────┤
//! │  Delta Tree                                 │  ← Ordered storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use buffer_core::{Buffer, EditorConfig, Motion, Position, View};
//!
//! let mut buffer = Buffer::from_text("fn main() {\n}");
//! let mut view = View::new(&mut buffer, &EditorConfig::default());
//!
//! view.move_cursor(&mut buffer, Motion::LineEnd, false);
//! view.break_line(&mut buffer);
//! view.insert_text(&mut buffer, "    println!(\"Hello\");");
//! assert_eq!(buffer.line_count(), 3);
//! assert_eq!(view.cursor(&buffer), Some(Position::new(2, 22)));
//!
//! // The whole typing session is one undo step.
//! view.undo(&mut buffer);
//! assert_eq!(buffer.text(), "fn main() {\n}");
//! assert!(!view.modified());
//! ```
//!
//! ## Working with points directly
//!
//! ```rust
//! use buffer_core::{Buffer, PointRole, Position};
//!
//! let mut buffer = Buffer::from_text("ab\ncd");
//! let mark = buffer.new_point_at(PointRole::Interactive, Position::new(2, 1));
//! let cursor = buffer.new_point_at(PointRole::Interactive, Position::new(1, 0));
//!
//! buffer.point_mut(cursor).insert_before("new line\n", None);
//! assert_eq!(buffer.point(mark).position(), Some(Position::new(3, 1)));
//! ```
//!
//! # Module Description
//!
//! - [`delta_tree`] - Delta-encoded red-black tree
//! - [`buffer`] - Line store and file IO
//! - [`point`] - Live positions and the editing algorithms
//! - [`undo`] - Undo/redo log with coalescing
//! - [`view`] - Editing gestures of one pane
//! - [`buffers`] - Registry of open buffers
//! - [`config`] - TOML configuration
//! - [`error`] - Error types
//!
//! # Unicode Support
//!
//! - UTF-8 internal encoding
//! - Columns count Unicode scalar values

pub mod buffer;
pub mod buffers;
pub mod config;
pub mod delta_tree;
pub mod error;
pub mod point;
pub mod undo;
pub mod view;

pub use buffer::{Buffer, BufferId, LineRef, Lines};
pub use buffers::Buffers;
pub use config::EditorConfig;
pub use delta_tree::{DeltaTree, Entry, NodeId, Options, Side};
pub use error::{BufferError, ConfigError};
pub use point::{PointId, PointMut, PointRef, PointRole, Position};
pub use undo::{RecordMode, Undo};
pub use view::{Motion, View};
