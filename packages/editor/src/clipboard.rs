//! Single-slot clipboard holding one detached subtree.

use crate::block::{Block, BlockId};
use crate::mutations::MutationError;
use crate::registry::ComponentRegistry;
use crate::tree::BlockTree;

/// A copied or cut subtree, root first. The root has no parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    pub blocks: Vec<Block>,
    pub is_cut: bool,
}

impl ClipboardEntry {
    pub fn root(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    entry: Option<ClipboardEntry>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self) -> Option<&ClipboardEntry> {
        self.entry.as_ref()
    }

    pub fn has_content(&self) -> bool {
        self.entry.is_some()
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// Store a deep copy of the subtree rooted at `id`
    pub fn copy(&mut self, tree: &BlockTree, id: &BlockId) -> Result<&ClipboardEntry, MutationError> {
        self.store(tree, id, false)
    }

    /// Store the subtree flagged as cut. Removing the source is the caller's
    /// job so that it lands in the same undo step.
    pub fn cut(&mut self, tree: &BlockTree, id: &BlockId) -> Result<&ClipboardEntry, MutationError> {
        self.store(tree, id, true)
    }

    fn store(&mut self, tree: &BlockTree, id: &BlockId, is_cut: bool) -> Result<&ClipboardEntry, MutationError> {
        let mut blocks = tree.subtree(id)?;
        blocks[0].parent_block_id = None;
        blocks[0].sort_order = 0;
        let entry = self.entry.insert(ClipboardEntry { blocks, is_cut });
        Ok(&*entry)
    }

    /// Append the stored subtree under `parent` (root when `None`) with fresh
    /// ids. Returns `Ok(None)` when the clipboard is empty.
    ///
    /// Content stays on the clipboard so it can be pasted again; a cut entry
    /// becomes a plain copy after its first paste.
    pub fn paste(
        &mut self,
        tree: &mut BlockTree,
        registry: &dyn ComponentRegistry,
        parent: Option<&BlockId>,
    ) -> Result<Option<BlockId>, MutationError> {
        let Some(entry) = self.entry.as_mut() else {
            return Ok(None);
        };

        if let Some(parent) = parent {
            let target = tree
                .get(parent)
                .ok_or_else(|| MutationError::ParentNotFound(parent.clone()))?;
            if !registry.supports_children(&target.component_name) {
                return Err(MutationError::ChildrenNotSupported(target.component_name.clone()));
            }
        }

        let root = tree.insert_subtree(entry.blocks.clone(), parent, None)?;
        entry.is_cut = false;
        Ok(Some(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticRegistry;

    fn sample() -> BlockTree {
        let mut tree = BlockTree::new();
        let s = tree.insert(Block::new("Section").with_id("s"), None, None).unwrap();
        tree.insert(Block::new("Heading").with_id("h"), Some(&s), None).unwrap();
        tree.insert(Block::new("Text").with_id("t"), Some(&s), None).unwrap();
        tree.insert(Block::new("Section").with_id("target"), None, None).unwrap();
        tree
    }

    #[test]
    fn test_copy_detaches_root() {
        let tree = sample();
        let mut clipboard = Clipboard::new();

        let entry = clipboard.copy(&tree, &BlockId::new("h")).unwrap();
        assert_eq!(entry.len(), 1);
        assert!(entry.root().is_root());
        assert!(!entry.is_cut);
    }

    #[test]
    fn test_paste_regenerates_ids() {
        let mut tree = sample();
        let registry = StaticRegistry::builtin();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&tree, &BlockId::new("s")).unwrap();

        let target = BlockId::new("target");
        let pasted = clipboard.paste(&mut tree, &registry, Some(&target)).unwrap().unwrap();

        assert_ne!(pasted, BlockId::new("s"));
        let children = tree.children(Some(&pasted));
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|b| b.id != BlockId::new("h") && b.id != BlockId::new("t")));
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn test_paste_twice() {
        let mut tree = sample();
        let registry = StaticRegistry::builtin();
        let mut clipboard = Clipboard::new();
        clipboard.cut(&tree, &BlockId::new("t")).unwrap();

        let first = clipboard.paste(&mut tree, &registry, None).unwrap().unwrap();
        assert!(!clipboard.entry().unwrap().is_cut);
        let second = clipboard.paste(&mut tree, &registry, None).unwrap().unwrap();

        assert_ne!(first, second);
        assert_eq!(tree.roots().len(), 4);
    }

    #[test]
    fn test_paste_into_leaf_rejected() {
        let mut tree = sample();
        let registry = StaticRegistry::builtin();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&tree, &BlockId::new("t")).unwrap();
        let before = tree.clone();

        let err = clipboard
            .paste(&mut tree, &registry, Some(&BlockId::new("h")))
            .unwrap_err();
        assert_eq!(err, MutationError::ChildrenNotSupported("Heading".into()));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_paste_empty_clipboard() {
        let mut tree = sample();
        let registry = StaticRegistry::builtin();
        let mut clipboard = Clipboard::new();

        assert_eq!(clipboard.paste(&mut tree, &registry, None).unwrap(), None);
    }
}
