//! # Editor Context
//!
//! Explicit editing state for one page: the block tree, undo history,
//! clipboard and selection. Every editing operation goes through an
//! [`Editor`] value, so there is no ambient global state and tests can build
//! as many isolated editors as they like.
//!
//! A failed operation leaves tree, history, selection and version untouched.

use crate::block::{Block, BlockId, Props};
use crate::clipboard::Clipboard;
use crate::drag::{reconcile, DragEnd};
use crate::errors::EditorError;
use crate::history::{History, DEFAULT_MAX_LEVELS};
use crate::mutations::{Mutation, MutationError, MutationOutcome};
use crate::registry::ComponentRegistry;
use crate::tree::BlockTree;
use serde_json::Value;
use std::sync::Arc;

pub struct Editor {
    tree: BlockTree,
    history: History,
    clipboard: Clipboard,
    selection: Option<BlockId>,
    registry: Arc<dyn ComponentRegistry>,

    /// Increments on every change to the tree
    version: u64,

    /// Last version known to be persisted
    saved_version: u64,
}

impl Editor {
    pub fn new(registry: Arc<dyn ComponentRegistry>) -> Self {
        Self::with_max_history(registry, DEFAULT_MAX_LEVELS)
    }

    pub fn with_max_history(registry: Arc<dyn ComponentRegistry>, max_levels: usize) -> Self {
        Self {
            tree: BlockTree::new(),
            history: History::with_max_levels(max_levels),
            clipboard: Clipboard::new(),
            selection: None,
            registry,
            version: 0,
            saved_version: 0,
        }
    }

    /// Editor over persisted blocks, considered saved
    pub fn load(blocks: Vec<Block>, registry: Arc<dyn ComponentRegistry>) -> Result<Self, EditorError> {
        let mut editor = Self::new(registry);
        editor.replace_blocks(blocks)?;
        Ok(editor)
    }

    /// Swap in a fresh block list (e.g. after reloading the page). History
    /// and selection are reset; the clipboard survives.
    pub fn replace_blocks(&mut self, blocks: Vec<Block>) -> Result<(), EditorError> {
        self.tree = BlockTree::from_blocks(blocks)?;
        self.history.clear();
        self.selection = None;
        self.version += 1;
        self.saved_version = self.version;
        Ok(())
    }

    pub fn tree(&self) -> &BlockTree {
        &self.tree
    }

    pub fn blocks(&self) -> &[Block] {
        self.tree.blocks()
    }

    pub fn snapshot(&self) -> Vec<Block> {
        self.tree.snapshot()
    }

    pub fn registry(&self) -> &dyn ComponentRegistry {
        self.registry.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_dirty(&self) -> bool {
        self.version != self.saved_version
    }

    /// Record that `version` reached the backend
    pub fn mark_saved(&mut self, version: u64) {
        self.saved_version = self.saved_version.max(version).min(self.version);
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Apply a mutation as one undo step
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationOutcome, EditorError> {
        let snapshot = self.tree.snapshot();

        match mutation.apply(&mut self.tree, self.registry.as_ref()) {
            Ok(outcome) => {
                self.commit(snapshot, mutation.name());
                self.forget_removed(&outcome.removed);
                Ok(outcome)
            }
            Err(err) => {
                self.tree.restore(snapshot);
                tracing::warn!(mutation = mutation.name(), error = %err, "mutation rejected");
                Err(err.into())
            }
        }
    }

    pub fn insert(
        &mut self,
        component_name: &str,
        parent_id: Option<&BlockId>,
        index: Option<usize>,
    ) -> Result<BlockId, EditorError> {
        let outcome = self.apply(Mutation::InsertBlock {
            component_name: component_name.to_string(),
            parent_id: parent_id.cloned(),
            index,
            props: Props::new(),
        })?;
        created(outcome)
    }

    pub fn move_block(
        &mut self,
        block_id: &BlockId,
        new_parent_id: Option<&BlockId>,
        index: Option<usize>,
    ) -> Result<(), EditorError> {
        self.apply(Mutation::MoveBlock {
            block_id: block_id.clone(),
            new_parent_id: new_parent_id.cloned(),
            index,
        })?;
        Ok(())
    }

    pub fn reorder(
        &mut self,
        parent_id: Option<&BlockId>,
        old_index: usize,
        new_index: usize,
    ) -> Result<(), EditorError> {
        self.apply(Mutation::ReorderBlocks {
            parent_id: parent_id.cloned(),
            old_index,
            new_index,
        })?;
        Ok(())
    }

    /// Delete a block with its descendants, returning the removed ids
    pub fn delete(&mut self, block_id: &BlockId) -> Result<Vec<BlockId>, EditorError> {
        let outcome = self.apply(Mutation::DeleteBlock { block_id: block_id.clone() })?;
        Ok(outcome.removed)
    }

    pub fn duplicate(&mut self, block_id: &BlockId) -> Result<BlockId, EditorError> {
        let outcome = self.apply(Mutation::DuplicateBlock { block_id: block_id.clone() })?;
        created(outcome)
    }

    pub fn update_props(&mut self, block_id: &BlockId, props: Props) -> Result<(), EditorError> {
        self.apply(Mutation::UpdateProps { block_id: block_id.clone(), props })?;
        Ok(())
    }

    pub fn set_prop(&mut self, block_id: &BlockId, key: &str, value: Value) -> Result<(), EditorError> {
        self.apply(Mutation::SetProp {
            block_id: block_id.clone(),
            key: key.to_string(),
            value,
        })?;
        Ok(())
    }

    pub fn set_visibility(&mut self, block_id: &BlockId, visible: bool) -> Result<(), EditorError> {
        self.apply(Mutation::SetVisibility { block_id: block_id.clone(), visible })?;
        Ok(())
    }

    pub fn set_custom_css(&mut self, block_id: &BlockId, css: Option<String>) -> Result<(), EditorError> {
        self.apply(Mutation::SetCustomCss { block_id: block_id.clone(), css })?;
        Ok(())
    }

    pub fn set_custom_classes(&mut self, block_id: &BlockId, classes: Option<String>) -> Result<(), EditorError> {
        self.apply(Mutation::SetCustomClasses { block_id: block_id.clone(), classes })?;
        Ok(())
    }

    // =========================================================================
    // Drag and drop
    // =========================================================================

    /// Reconcile and apply a drop. Returns the block the drop created or
    /// moved, `None` for a no-op drop. Newly inserted blocks are selected.
    pub fn handle_drag_end(&mut self, drag: &DragEnd) -> Result<Option<BlockId>, EditorError> {
        let mutation = match reconcile(&self.tree, self.registry.as_ref(), drag) {
            Ok(Some(mutation)) => mutation,
            Ok(None) => return Ok(None),
            Err(rejection) => {
                tracing::warn!(reason = %rejection, "drop rejected");
                return Err(rejection.into());
            }
        };

        let is_insert = matches!(mutation, Mutation::InsertBlock { .. });
        let outcome = self.apply(mutation)?;
        if is_insert {
            self.selection = outcome.block_id.clone();
        }
        Ok(outcome.block_id)
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    pub fn copy(&mut self, block_id: &BlockId) -> Result<(), EditorError> {
        self.clipboard.copy(&self.tree, block_id)?;
        Ok(())
    }

    /// Copy and delete in a single undo step
    pub fn cut(&mut self, block_id: &BlockId) -> Result<Vec<BlockId>, EditorError> {
        self.clipboard.cut(&self.tree, block_id)?;
        self.delete(block_id)
    }

    /// Paste as the last child of `parent_id` (root when `None`)
    pub fn paste(&mut self, parent_id: Option<&BlockId>) -> Result<BlockId, EditorError> {
        let snapshot = self.tree.snapshot();

        match self.clipboard.paste(&mut self.tree, self.registry.as_ref(), parent_id) {
            Ok(Some(root)) => {
                self.commit(snapshot, "Paste");
                self.selection = Some(root.clone());
                Ok(root)
            }
            Ok(None) => Err(EditorError::ClipboardEmpty),
            Err(err) => {
                self.tree.restore(snapshot);
                Err(err.into())
            }
        }
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Returns `false` when there was nothing to undo. An open batch is
    /// closed first, so the whole batch is undone as one step.
    pub fn undo(&mut self) -> bool {
        self.close_batch();
        match self.history.undo(self.tree.snapshot()) {
            Some(entry) => {
                self.tree.restore(entry.blocks);
                self.after_history_step();
                true
            }
            None => false,
        }
    }

    /// Returns `false` when there was nothing to redo
    pub fn redo(&mut self) -> bool {
        self.close_batch();
        match self.history.redo(self.tree.snapshot()) {
            Some(entry) => {
                self.tree.restore(entry.blocks);
                self.after_history_step();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Group the following edits into one undo step
    pub fn begin_batch(&mut self, description: &str) {
        self.history.begin_batch(self.tree.snapshot(), Some(description));
    }

    /// Closing a batch that changed nothing leaves no undo step behind.
    /// No-op when no batch is open.
    pub fn end_batch(&mut self) {
        if !self.history.in_batch() {
            return;
        }
        self.history.end_batch();
        if self.history.in_batch() {
            return;
        }
        let unchanged = self
            .history
            .peek_undo()
            .map(|entry| entry.blocks == self.tree.blocks())
            .unwrap_or(false);
        if unchanged {
            self.history.discard_last();
        }
    }

    fn close_batch(&mut self) {
        while self.history.in_batch() {
            self.end_batch();
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selection(&self) -> Option<&BlockId> {
        self.selection.as_ref()
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.selection.as_ref().and_then(|id| self.tree.get(id))
    }

    /// Select a block, or clear the selection with `None`
    pub fn select(&mut self, block_id: Option<&BlockId>) -> Result<(), EditorError> {
        if let Some(id) = block_id {
            if !self.tree.contains(id) {
                return Err(MutationError::BlockNotFound(id.clone()).into());
            }
        }
        self.selection = block_id.cloned();
        Ok(())
    }

    fn commit(&mut self, snapshot: Vec<Block>, description: &str) {
        self.history.record(snapshot, Some(description));
        self.version += 1;
        tracing::debug!(version = self.version, description, "editor change committed");
    }

    fn forget_removed(&mut self, removed: &[BlockId]) {
        if let Some(selected) = &self.selection {
            if removed.contains(selected) {
                self.selection = None;
            }
        }
    }

    fn after_history_step(&mut self) {
        self.version += 1;
        if let Some(selected) = &self.selection {
            if !self.tree.contains(selected) {
                self.selection = None;
            }
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("blocks", &self.tree.len())
            .field("version", &self.version)
            .field("dirty", &self.is_dirty())
            .field("selection", &self.selection)
            .finish()
    }
}

fn created(outcome: MutationOutcome) -> Result<BlockId, EditorError> {
    outcome
        .block_id
        .ok_or_else(|| MutationError::InvalidTree("mutation created no block".to_string()).into())
}
