//! # Drag Reconciler
//!
//! Maps one drag-end event onto at most one tree mutation.
//!
//! | Source        | Drop target               | Mutation                                  |
//! |---------------|---------------------------|-------------------------------------------|
//! | palette item  | none / canvas             | insert at end of root                     |
//! | palette item  | container zone            | insert as last child of the container     |
//! | palette item  | block                     | insert before the block                   |
//! | block         | container zone            | move into the container                   |
//! | block         | block, same parent        | reorder within the sibling group          |
//! | block         | block, different parent   | move to target's parent at its position   |
//! | block         | canvas                    | move to end of root                       |
//!
//! The produced mutation is validated before it is returned, so a rejection
//! never leaves a partial edit behind.

use crate::block::{BlockId, Props};
use crate::mutations::{Mutation, MutationError};
use crate::registry::ComponentRegistry;
use crate::tree::BlockTree;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Droppable id of the empty canvas
pub const CANVAS_ZONE_ID: &str = "canvas";

const CANVAS_ZONE_ALIASES: &[&str] = &[CANVAS_ZONE_ID, "canvas-drop-zone", "empty-canvas"];

/// Prefix of container drop-zone ids, followed by the block id
pub const CONTAINER_ZONE_PREFIX: &str = "container-";

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragSource {
    /// A component from the palette, creating a new block
    Palette { component_name: String },
    /// An existing block
    Block { block_id: BlockId },
}

/// Where it was dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropTarget {
    None,
    Canvas,
    /// Child drop-zone of a container block
    Container { block_id: BlockId },
    /// An existing block (insert before it)
    Block { block_id: BlockId },
}

impl DropTarget {
    /// Decode a droppable id reported by the UI
    pub fn from_zone_id(zone_id: Option<&str>) -> Self {
        match zone_id.map(str::trim) {
            None | Some("") => DropTarget::None,
            Some(id) if CANVAS_ZONE_ALIASES.contains(&id) => DropTarget::Canvas,
            Some(id) => match id.strip_prefix(CONTAINER_ZONE_PREFIX) {
                Some(block_id) if !block_id.is_empty() => DropTarget::Container {
                    block_id: BlockId::new(block_id),
                },
                _ => DropTarget::Block { block_id: BlockId::new(id) },
            },
        }
    }

    /// Droppable id for this target, inverse of [`DropTarget::from_zone_id`]
    pub fn zone_id(&self) -> Option<String> {
        match self {
            DropTarget::None => None,
            DropTarget::Canvas => Some(CANVAS_ZONE_ID.to_string()),
            DropTarget::Container { block_id } => Some(format!("{}{}", CONTAINER_ZONE_PREFIX, block_id)),
            DropTarget::Block { block_id } => Some(block_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub source: DragSource,
    pub target: DropTarget,
}

impl DragEnd {
    pub fn new(source: DragSource, target: DropTarget) -> Self {
        Self { source, target }
    }

    pub fn palette(component_name: impl Into<String>, target: DropTarget) -> Self {
        Self::new(DragSource::Palette { component_name: component_name.into() }, target)
    }

    pub fn block(block_id: impl Into<BlockId>, target: DropTarget) -> Self {
        Self::new(DragSource::Block { block_id: block_id.into() }, target)
    }
}

/// A drop the editor refuses. Displays as the warning shown to the user.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct DropRejection {
    pub reason: MutationError,
}

impl From<MutationError> for DropRejection {
    fn from(reason: MutationError) -> Self {
        Self { reason }
    }
}

/// Translate a drag-end into a validated mutation.
/// `Ok(None)` means the drop changes nothing.
pub fn reconcile(
    tree: &BlockTree,
    registry: &dyn ComponentRegistry,
    drag: &DragEnd,
) -> Result<Option<Mutation>, DropRejection> {
    let mutation = match (&drag.source, &drag.target) {
        (DragSource::Palette { component_name }, DropTarget::None | DropTarget::Canvas) => {
            Some(insert(component_name, None, None))
        }

        (DragSource::Palette { component_name }, DropTarget::Container { block_id }) => {
            require_container(tree, registry, block_id)?;
            Some(insert(component_name, Some(block_id.clone()), None))
        }

        (DragSource::Palette { component_name }, DropTarget::Block { block_id }) => {
            let target = tree
                .get(block_id)
                .ok_or_else(|| MutationError::BlockNotFound(block_id.clone()))?;
            Some(insert(
                component_name,
                target.parent_block_id.clone(),
                tree.index_of(block_id),
            ))
        }

        (DragSource::Block { .. }, DropTarget::None) => None,

        (DragSource::Block { block_id }, DropTarget::Canvas) => {
            let source = existing(tree, block_id)?;
            let roots = tree.roots();
            let already_last = source.is_root() && roots.last().map(|b| &b.id) == Some(block_id);
            (!already_last).then(|| Mutation::MoveBlock {
                block_id: block_id.clone(),
                new_parent_id: None,
                index: None,
            })
        }

        (DragSource::Block { block_id }, DropTarget::Container { block_id: container }) => {
            existing(tree, block_id)?;
            if tree.would_create_cycle(block_id, Some(container))? {
                return Err(MutationError::CycleDetected.into());
            }
            require_container(tree, registry, container)?;
            Some(Mutation::MoveBlock {
                block_id: block_id.clone(),
                new_parent_id: Some(container.clone()),
                index: None,
            })
        }

        (DragSource::Block { block_id }, DropTarget::Block { block_id: over }) => {
            if block_id == over {
                return Ok(None);
            }
            let source = existing(tree, block_id)?;
            let target = existing(tree, over)?;
            let target_index = tree
                .index_of(over)
                .ok_or_else(|| MutationError::BlockNotFound(over.clone()))?;

            if source.parent_block_id == target.parent_block_id {
                let old_index = tree
                    .index_of(block_id)
                    .ok_or_else(|| MutationError::BlockNotFound(block_id.clone()))?;
                Some(Mutation::ReorderBlocks {
                    parent_id: target.parent_block_id.clone(),
                    old_index,
                    new_index: target_index,
                })
            } else {
                Some(Mutation::MoveBlock {
                    block_id: block_id.clone(),
                    new_parent_id: target.parent_block_id.clone(),
                    index: Some(target_index),
                })
            }
        }
    };

    if let Some(mutation) = &mutation {
        mutation.validate(tree, registry)?;
    }

    tracing::debug!(?drag, ?mutation, "reconciled drop");
    Ok(mutation)
}

fn insert(component_name: &str, parent_id: Option<BlockId>, index: Option<usize>) -> Mutation {
    Mutation::InsertBlock {
        component_name: component_name.to_string(),
        parent_id,
        index,
        props: Props::new(),
    }
}

fn existing<'a>(tree: &'a BlockTree, id: &BlockId) -> Result<&'a crate::block::Block, MutationError> {
    tree.get(id).ok_or_else(|| MutationError::BlockNotFound(id.clone()))
}

fn require_container(
    tree: &BlockTree,
    registry: &dyn ComponentRegistry,
    id: &BlockId,
) -> Result<(), MutationError> {
    let block = existing(tree, id)?;
    if registry.supports_children(&block.component_name) {
        Ok(())
    } else {
        Err(MutationError::ChildrenNotSupported(block.component_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::registry::StaticRegistry;

    /// root: [section(c) -> [x, y], hero(h), text(t)]
    fn sample() -> BlockTree {
        let mut tree = BlockTree::new();
        let c = tree.insert(Block::new("Section").with_id("c"), None, None).unwrap();
        tree.insert(Block::new("Hero").with_id("h"), None, None).unwrap();
        tree.insert(Block::new("Text").with_id("t"), None, None).unwrap();
        tree.insert(Block::new("Text").with_id("x"), Some(&c), None).unwrap();
        tree.insert(Block::new("Text").with_id("y"), Some(&c), None).unwrap();
        tree
    }

    fn run(drag: DragEnd) -> Result<Option<Mutation>, DropRejection> {
        reconcile(&sample(), &StaticRegistry::builtin(), &drag)
    }

    #[test]
    fn test_zone_id_decoding() {
        assert_eq!(DropTarget::from_zone_id(None), DropTarget::None);
        assert_eq!(DropTarget::from_zone_id(Some("canvas-drop-zone")), DropTarget::Canvas);
        assert_eq!(
            DropTarget::from_zone_id(Some("container-abc")),
            DropTarget::Container { block_id: BlockId::new("abc") }
        );
        assert_eq!(
            DropTarget::from_zone_id(Some("abc")),
            DropTarget::Block { block_id: BlockId::new("abc") }
        );

        let target = DropTarget::Container { block_id: BlockId::new("q") };
        assert_eq!(DropTarget::from_zone_id(target.zone_id().as_deref()), target);
    }

    #[test]
    fn test_palette_without_target_appends_to_root() {
        for target in [DropTarget::None, DropTarget::Canvas] {
            let mutation = run(DragEnd::palette("Hero", target)).unwrap().unwrap();
            assert_eq!(mutation, insert("Hero", None, None));
        }
    }

    #[test]
    fn test_palette_into_container() {
        let drop = DropTarget::Container { block_id: BlockId::new("c") };
        let mutation = run(DragEnd::palette("Hero", drop)).unwrap().unwrap();
        assert_eq!(mutation, insert("Hero", Some(BlockId::new("c")), None));
    }

    #[test]
    fn test_palette_into_leaf_rejected() {
        let drop = DropTarget::Container { block_id: BlockId::new("h") };
        let err = run(DragEnd::palette("Text", drop)).unwrap_err();
        assert_eq!(err.reason, MutationError::ChildrenNotSupported("Hero".into()));
        assert_eq!(err.to_string(), "Hero cannot contain other blocks");
    }

    #[test]
    fn test_palette_before_block() {
        let drop = DropTarget::Block { block_id: BlockId::new("y") };
        let mutation = run(DragEnd::palette("Button", drop)).unwrap().unwrap();
        assert_eq!(mutation, insert("Button", Some(BlockId::new("c")), Some(1)));
    }

    #[test]
    fn test_unknown_palette_item_rejected() {
        let err = run(DragEnd::palette("Nope", DropTarget::Canvas)).unwrap_err();
        assert_eq!(err.reason, MutationError::UnknownComponent("Nope".into()));
    }

    #[test]
    fn test_block_into_container() {
        let drop = DropTarget::Container { block_id: BlockId::new("c") };
        let mutation = run(DragEnd::block("t", drop)).unwrap().unwrap();
        assert_eq!(
            mutation,
            Mutation::MoveBlock {
                block_id: BlockId::new("t"),
                new_parent_id: Some(BlockId::new("c")),
                index: None,
            }
        );
    }

    #[test]
    fn test_block_into_itself_rejected() {
        let drop = DropTarget::Container { block_id: BlockId::new("c") };
        let err = run(DragEnd::block("c", drop)).unwrap_err();
        assert_eq!(err.reason, MutationError::CycleDetected);
    }

    #[test]
    fn test_container_onto_own_child_rejected() {
        // Target x lives inside c, so c would move under itself
        let drop = DropTarget::Block { block_id: BlockId::new("x") };
        let err = run(DragEnd::block("c", drop)).unwrap_err();
        assert_eq!(err.reason, MutationError::CycleDetected);
    }

    #[test]
    fn test_block_same_parent_reorders() {
        let drop = DropTarget::Block { block_id: BlockId::new("t") };
        let mutation = run(DragEnd::block("c", drop)).unwrap().unwrap();
        assert_eq!(
            mutation,
            Mutation::ReorderBlocks { parent_id: None, old_index: 0, new_index: 2 }
        );
    }

    #[test]
    fn test_block_different_parent_moves() {
        let drop = DropTarget::Block { block_id: BlockId::new("y") };
        let mutation = run(DragEnd::block("h", drop)).unwrap().unwrap();
        assert_eq!(
            mutation,
            Mutation::MoveBlock {
                block_id: BlockId::new("h"),
                new_parent_id: Some(BlockId::new("c")),
                index: Some(1),
            }
        );
    }

    #[test]
    fn test_noop_drops() {
        assert_eq!(run(DragEnd::block("h", DropTarget::None)).unwrap(), None);
        let over_self = DropTarget::Block { block_id: BlockId::new("h") };
        assert_eq!(run(DragEnd::block("h", over_self)).unwrap(), None);
        assert_eq!(run(DragEnd::block("t", DropTarget::Canvas)).unwrap(), None);
    }

    #[test]
    fn test_missing_source_rejected() {
        let err = run(DragEnd::block("ghost", DropTarget::Canvas)).unwrap_err();
        assert_eq!(err.reason, MutationError::BlockNotFound(BlockId::new("ghost")));
    }
}
