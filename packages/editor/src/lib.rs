//! # Pagecraft Editor
//!
//! Core editing model for the Pagecraft page builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI: palette, canvas, property panels        │
//! └─────────────────────────────────────────────┘
//!           ↓ drag-end / mutation / command
//! ┌─────────────────────────────────────────────┐
//! │ editor: Editor context                      │
//! │  - Drag reconciler → Mutation               │
//! │  - Mutations validated against registry     │
//! │  - Block tree store                         │
//! │  - Snapshot history, clipboard, selection   │
//! └─────────────────────────────────────────────┘
//!           ↓ blocks snapshot
//! ┌─────────────────────────────────────────────┐
//! │ workspace: auto-save → page store           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Flat list is source of truth**: Tree structure is derived from
//!    parent ids and sort order, exactly as the backend stores it
//! 2. **All-or-nothing edits**: A rejected edit never mutates state
//! 3. **Explicit context**: All editing state lives in an [`Editor`] value
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{DragEnd, DropTarget, Editor, StaticRegistry};
//! use std::sync::Arc;
//!
//! let mut editor = Editor::new(Arc::new(StaticRegistry::builtin()));
//! let section = editor.insert("Section", None, None)?;
//!
//! // Drop a palette item into the section
//! let drop = DropTarget::Container { block_id: section.clone() };
//! editor.handle_drag_end(&DragEnd::palette("Hero", drop))?;
//!
//! editor.undo();
//! ```

mod block;
mod clipboard;
mod drag;
mod editor;
mod errors;
mod history;
mod mutations;
mod registry;
mod tree;

pub use block::{
    Block, BlockId, FabPosition, FabSettings, FooterLink, FooterSettings, Page, PageStatus, Props,
    SeoSettings, TypographySettings,
};
pub use clipboard::{Clipboard, ClipboardEntry};
pub use drag::{reconcile, DragEnd, DragSource, DropRejection, DropTarget, CANVAS_ZONE_ID, CONTAINER_ZONE_PREFIX};
pub use editor::Editor;
pub use errors::EditorError;
pub use history::{History, HistoryEntry, DEFAULT_MAX_LEVELS};
pub use mutations::{Mutation, MutationError, MutationOutcome};
pub use registry::{ComponentEntry, ComponentRegistry, FieldKind, PropField, StaticRegistry};
pub use tree::BlockTree;
