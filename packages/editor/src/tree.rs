//! # Block Tree Store
//!
//! Ordered, nested collection of blocks stored as a flat list. Structure is
//! derived from `parent_block_id`; sibling order from `sort_order`.
//!
//! ## Invariants
//!
//! - Block ids are unique
//! - Every `parent_block_id` references a block in the tree (or is `None`)
//! - No block is its own ancestor
//! - `sort_order` is dense (`0..n`) within every sibling group
//!
//! Every operation validates before it touches state, so a failed operation
//! leaves the tree exactly as it was.

use crate::block::{Block, BlockId};
use crate::mutations::MutationError;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockTree {
    blocks: Vec<Block>,
}

impl BlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from persisted blocks, validating structure and
    /// normalizing sibling order. Ties in `sort_order` keep list order.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, MutationError> {
        let mut seen = HashSet::new();
        for block in &blocks {
            if !seen.insert(block.id.clone()) {
                return Err(MutationError::DuplicateId(block.id.clone()));
            }
        }
        for block in &blocks {
            if let Some(parent) = &block.parent_block_id {
                if !seen.contains(parent) {
                    return Err(MutationError::ParentNotFound(parent.clone()));
                }
            }
        }

        let mut tree = Self { blocks };
        for block in &tree.blocks {
            tree.ancestors(&block.id)?;
        }

        let parents: HashSet<Option<BlockId>> =
            tree.blocks.iter().map(|b| b.parent_block_id.clone()).collect();
        for parent in parents {
            let ids = tree.group_ids(parent.as_ref());
            tree.renumber(&ids);
        }

        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    /// Replace contents with a snapshot previously taken from this tree
    pub fn restore(&mut self, snapshot: Vec<Block>) {
        self.blocks = snapshot;
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| &b.id == id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.get(id).is_some()
    }

    /// Children of `parent` (root when `None`) in display order
    pub fn children(&self, parent: Option<&BlockId>) -> Vec<&Block> {
        let mut children: Vec<&Block> = self
            .blocks
            .iter()
            .filter(|b| b.parent_block_id.as_ref() == parent)
            .collect();
        children.sort_by_key(|b| b.sort_order);
        children
    }

    pub fn roots(&self) -> Vec<&Block> {
        self.children(None)
    }

    pub fn child_ids(&self, parent: Option<&BlockId>) -> Vec<BlockId> {
        self.group_ids(parent)
    }

    /// Position of a block within its sibling group
    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        let block = self.get(id)?;
        self.group_ids(block.parent_block_id.as_ref())
            .iter()
            .position(|b| b == id)
    }

    /// Ids of every descendant, depth-first in display order
    pub fn descendants(&self, id: &BlockId) -> Vec<BlockId> {
        let mut out = Vec::new();
        let mut stack: Vec<BlockId> = self.group_ids(Some(id)).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            stack.extend(self.group_ids(Some(&next)).into_iter().rev());
            out.push(next);
        }
        out
    }

    /// The block and all its descendants, root first
    pub fn subtree(&self, id: &BlockId) -> Result<Vec<Block>, MutationError> {
        let root = self
            .get(id)
            .ok_or_else(|| MutationError::BlockNotFound(id.clone()))?;

        let mut out = vec![root.clone()];
        for desc in self.descendants(id) {
            if let Some(block) = self.get(&desc) {
                out.push(block.clone());
            }
        }
        Ok(out)
    }

    /// Ancestor chain of `id`, nearest first. The walk is bounded by the
    /// block count so a corrupted parent chain can't loop forever.
    pub fn ancestors(&self, id: &BlockId) -> Result<Vec<BlockId>, MutationError> {
        let mut chain = Vec::new();
        let mut current = self
            .get(id)
            .ok_or_else(|| MutationError::BlockNotFound(id.clone()))?
            .parent_block_id
            .clone();

        while let Some(parent) = current {
            if chain.len() >= self.blocks.len() || parent == *id || chain.contains(&parent) {
                return Err(MutationError::InvalidTree(format!(
                    "parent chain of {} loops",
                    id
                )));
            }
            current = self
                .get(&parent)
                .ok_or_else(|| MutationError::ParentNotFound(parent.clone()))?
                .parent_block_id
                .clone();
            chain.push(parent);
        }

        Ok(chain)
    }

    /// Whether `ancestor` appears on the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: &BlockId, id: &BlockId) -> Result<bool, MutationError> {
        Ok(self.ancestors(id)?.contains(ancestor))
    }

    /// Moving `id` under `new_parent` would make it its own ancestor
    pub fn would_create_cycle(
        &self,
        id: &BlockId,
        new_parent: Option<&BlockId>,
    ) -> Result<bool, MutationError> {
        match new_parent {
            None => Ok(false),
            Some(parent) if parent == id => Ok(true),
            Some(parent) => self.is_ancestor(id, parent),
        }
    }

    /// Insert a detached block under `parent` at `index` (append when `None`).
    /// The index is clamped to the sibling count.
    pub fn insert(
        &mut self,
        mut block: Block,
        parent: Option<&BlockId>,
        index: Option<usize>,
    ) -> Result<BlockId, MutationError> {
        if self.contains(&block.id) {
            return Err(MutationError::DuplicateId(block.id));
        }
        self.check_parent(parent)?;

        let mut group = self.group_ids(parent);
        let at = index.unwrap_or(group.len()).min(group.len());
        let id = block.id.clone();
        group.insert(at, id.clone());

        block.parent_block_id = parent.cloned();
        self.blocks.push(block);
        self.renumber(&group);

        tracing::debug!(block = %id, index = at, "inserted block");
        Ok(id)
    }

    /// Move a block (with its subtree) under `new_parent` at `index`.
    /// `index` is the position in the destination group after the move.
    pub fn move_block(
        &mut self,
        id: &BlockId,
        new_parent: Option<&BlockId>,
        index: Option<usize>,
    ) -> Result<(), MutationError> {
        let old_parent = self
            .get(id)
            .ok_or_else(|| MutationError::BlockNotFound(id.clone()))?
            .parent_block_id
            .clone();
        self.check_parent(new_parent)?;
        if self.would_create_cycle(id, new_parent)? {
            return Err(MutationError::CycleDetected);
        }

        let mut old_group = self.group_ids(old_parent.as_ref());
        old_group.retain(|b| b != id);

        let mut new_group = if old_parent.as_ref() == new_parent {
            old_group.clone()
        } else {
            self.group_ids(new_parent)
        };
        let at = index.unwrap_or(new_group.len()).min(new_group.len());
        new_group.insert(at, id.clone());

        if let Some(block) = self.get_mut(id) {
            block.parent_block_id = new_parent.cloned();
        }
        self.renumber(&old_group);
        self.renumber(&new_group);

        tracing::debug!(block = %id, index = at, "moved block");
        Ok(())
    }

    /// Reorder within one sibling group, `old_index` moves to `new_index`
    pub fn reorder(
        &mut self,
        parent: Option<&BlockId>,
        old_index: usize,
        new_index: usize,
    ) -> Result<(), MutationError> {
        self.check_parent(parent)?;
        let mut group = self.group_ids(parent);
        let len = group.len();
        for index in [old_index, new_index] {
            if index >= len {
                return Err(MutationError::IndexOutOfRange { index, len });
            }
        }

        let id = group.remove(old_index);
        group.insert(new_index, id);
        self.renumber(&group);
        Ok(())
    }

    /// Remove a block and all of its descendants, returning them root first
    pub fn delete(&mut self, id: &BlockId) -> Result<Vec<Block>, MutationError> {
        let removed = self.subtree(id)?;
        let parent = removed[0].parent_block_id.clone();
        let doomed: HashSet<&BlockId> = removed.iter().map(|b| &b.id).collect();

        self.blocks.retain(|b| !doomed.contains(&b.id));
        let group = self.group_ids(parent.as_ref());
        self.renumber(&group);

        tracing::debug!(block = %id, count = removed.len(), "deleted subtree");
        Ok(removed)
    }

    /// Deep-clone a subtree with fresh ids, placed right after the source
    pub fn duplicate(&mut self, id: &BlockId) -> Result<BlockId, MutationError> {
        let subtree = self.subtree(id)?;
        let parent = subtree[0].parent_block_id.clone();
        let index = self.index_of(id).map(|i| i + 1);
        self.insert_subtree(subtree, parent.as_ref(), index)
    }

    /// Insert a detached subtree (root first) under `parent`. All ids are
    /// regenerated so the same subtree can be inserted repeatedly.
    pub fn insert_subtree(
        &mut self,
        blocks: Vec<Block>,
        parent: Option<&BlockId>,
        index: Option<usize>,
    ) -> Result<BlockId, MutationError> {
        if blocks.is_empty() {
            return Err(MutationError::InvalidTree("empty subtree".to_string()));
        }
        self.check_parent(parent)?;

        let mut fresh = clone_with_fresh_ids(&blocks);
        let root = fresh.remove(0);
        let root_id = self.insert(root, parent, index)?;
        self.blocks.extend(fresh);
        Ok(root_id)
    }

    /// Re-validate every invariant
    pub fn check_invariants(&self) -> Result<(), MutationError> {
        let mut ids = HashSet::new();
        for block in &self.blocks {
            if !ids.insert(&block.id) {
                return Err(MutationError::DuplicateId(block.id.clone()));
            }
        }

        let mut groups: HashMap<Option<&BlockId>, HashSet<i64>> = HashMap::new();
        for block in &self.blocks {
            if let Some(parent) = &block.parent_block_id {
                if !ids.contains(parent) {
                    return Err(MutationError::ParentNotFound(parent.clone()));
                }
            }
            self.ancestors(&block.id)?;

            let orders = groups.entry(block.parent_block_id.as_ref()).or_default();
            if !orders.insert(block.sort_order) {
                return Err(MutationError::InvalidTree(format!(
                    "duplicate sort_order {} among siblings of {}",
                    block.sort_order, block.id
                )));
            }
        }

        Ok(())
    }

    fn check_parent(&self, parent: Option<&BlockId>) -> Result<(), MutationError> {
        match parent {
            Some(p) if !self.contains(p) => Err(MutationError::ParentNotFound(p.clone())),
            _ => Ok(()),
        }
    }

    /// Sibling ids in display order (stable on ties)
    fn group_ids(&self, parent: Option<&BlockId>) -> Vec<BlockId> {
        self.children(parent).into_iter().map(|b| b.id.clone()).collect()
    }

    fn renumber(&mut self, ordered: &[BlockId]) {
        let positions: HashMap<&BlockId, i64> = ordered
            .iter()
            .enumerate()
            .map(|(i, id)| (id, i as i64))
            .collect();
        for block in &mut self.blocks {
            if let Some(order) = positions.get(&block.id) {
                block.sort_order = *order;
            }
        }
    }
}

/// Copy blocks with every id replaced. Parent links inside the set follow
/// the new ids; links leaving the set are kept as-is.
pub(crate) fn clone_with_fresh_ids(blocks: &[Block]) -> Vec<Block> {
    let mapping: HashMap<&BlockId, BlockId> =
        blocks.iter().map(|b| (&b.id, BlockId::generate())).collect();

    blocks
        .iter()
        .map(|b| {
            let mut copy = b.clone();
            copy.id = mapping[&b.id].clone();
            if let Some(parent) = &b.parent_block_id {
                if let Some(new_parent) = mapping.get(parent) {
                    copy.parent_block_id = Some(new_parent.clone());
                }
            }
            copy
        })
        .collect()
}
